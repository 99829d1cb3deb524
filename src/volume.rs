use crate::enums::PlaneAxis;

use ndarray::{Array3, ArrayView2, s};

/// Calibrated scalar volume, axes (depth, row, column).
///
/// Immutable once constructed; a new load replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    value_range: (f32, f32),
}

impl Volume {
    /// Wrap a stacked array. Returns `None` if any axis is empty.
    pub fn new(data: Array3<f32>) -> Option<Self> {
        let (depth, rows, columns) = data.dim();
        if depth == 0 || rows == 0 || columns == 0 {
            return None;
        }
        let value_range = Self::finite_range(&data);
        Some(Self { data, value_range })
    }

    /// Get the dimensions of the volume (depth, rows, columns)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Smallest and largest non-NaN values, `(0.0, 0.0)` if every voxel is NaN.
    pub fn value_range(&self) -> (f32, f32) {
        self.value_range
    }

    /// Number of slices available along `axis`.
    pub fn extent(&self, axis: PlaneAxis) -> usize {
        let dim = self.data.dim();
        match axis {
            PlaneAxis::Axial => dim.0,
            PlaneAxis::Coronal => dim.1,
            PlaneAxis::Sagittal => dim.2,
        }
    }

    /// Clamp any signed index into `[0, extent - 1]`.
    pub fn clamp_index(&self, axis: PlaneAxis, index: i64) -> usize {
        let last = self.extent(axis) - 1;
        index.clamp(0, last as i64) as usize
    }

    /// Extract the plane at `index` along `axis`, clamping out-of-range indices.
    pub fn extract_slice(&self, axis: PlaneAxis, index: i64) -> ArrayView2<'_, f32> {
        let index = self.clamp_index(axis, index);
        match axis {
            PlaneAxis::Axial => self.data.slice(s![index, .., ..]),
            PlaneAxis::Coronal => self.data.slice(s![.., index, ..]),
            PlaneAxis::Sagittal => self.data.slice(s![.., .., index]),
        }
    }

    /// Natural (width, height) of a slice along `axis`.
    pub fn slice_size(&self, axis: PlaneAxis) -> (usize, usize) {
        let (depth, rows, columns) = self.data.dim();
        match axis {
            PlaneAxis::Axial => (columns, rows),
            PlaneAxis::Coronal => (columns, depth),
            PlaneAxis::Sagittal => (rows, depth),
        }
    }

    fn finite_range(data: &Array3<f32>) -> (f32, f32) {
        data.iter()
            .filter(|v| !v.is_nan())
            .fold(None, |range, &v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f32::min(lo, v), f32::max(hi, v))),
            })
            .unwrap_or((0.0, 0.0))
    }
}
