use crate::{
    slice_parser::{CalibratedSlice, SliceParser},
    volume::Volume,
};

use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extensions accepted by the image stack fallback.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

pub const DEFAULT_CALIBRATED_MODALITY: &str = "DICOM";
pub const IMAGE_STACK_MODALITY: &str = "IMGSTACK";

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No readable DICOM files found in {}", .dir.display())]
    NoReadableCalibrated { dir: PathBuf },

    #[error(
        "No supported files found in {}, and no DICOM support available. Provide a folder with PNG/JPG/TIFF/BMP images",
        .dir.display()
    )]
    NoSupportedFiles { dir: PathBuf },

    #[error(
        "Inconsistent image dimensions: {} is {found:?}, expected {expected:?}",
        .path.display()
    )]
    InconsistentDimensions {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Volume has an empty axis")]
    EmptyVolume,

    #[error("Could not decode image {}: {source}", .path.display())]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Best-effort description of a loaded series.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub modality: String,
    pub rows: usize,
    pub columns: usize,
    pub slice_thickness: f64,
    pub num_slices: usize,
}

/// Builds volumes from a directory, preferring calibrated slices and
/// falling back to a plain image stack.
pub struct VolumeLoader {
    parser: Option<Box<dyn SliceParser>>,
}

impl Default for VolumeLoader {
    /// Loader with DICOM support when the `dicom` feature is enabled.
    fn default() -> Self {
        #[cfg(feature = "dicom")]
        let parser: Option<Box<dyn SliceParser>> =
            Some(Box::new(crate::slice_parser::DicomSliceParser));
        #[cfg(not(feature = "dicom"))]
        let parser: Option<Box<dyn SliceParser>> = None;
        Self { parser }
    }
}

impl VolumeLoader {
    pub fn new(parser: Option<Box<dyn SliceParser>>) -> Self {
        Self { parser }
    }

    /// Loader that only understands plain image stacks.
    pub fn image_stack_only() -> Self {
        Self { parser: None }
    }

    pub fn has_calibrated_support(&self) -> bool {
        self.parser.is_some()
    }

    /// Load a volume from a directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be listed, no usable files are
    /// found or slice dimensions are inconsistent
    pub fn load_from_directory(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(Volume, Metadata), VolumeLoaderError> {
        let dir = path.as_ref();
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        if let Some(parser) = self.parser.as_deref() {
            let candidates: Vec<_> = paths.iter().filter(|path| parser.accepts(path)).collect();
            if !candidates.is_empty() {
                return Self::load_calibrated(dir, parser, &candidates);
            }
        }

        Self::load_image_stack(dir, &paths)
    }

    fn load_calibrated(
        dir: &Path,
        parser: &dyn SliceParser,
        candidates: &[&PathBuf],
    ) -> Result<(Volume, Metadata), VolumeLoaderError> {
        let mut parsed: Vec<_> = candidates
            .par_iter()
            .filter_map(|path| match parser.parse(path) {
                Ok(slice) => {
                    debug!(path = %path.display(), "Parsed calibrated slice");
                    Some(((*path).clone(), slice))
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "Skipping unreadable slice");
                    None
                }
            })
            .collect();

        if parsed.is_empty() {
            return Err(VolumeLoaderError::NoReadableCalibrated {
                dir: dir.to_path_buf(),
            });
        }

        Self::sort_slices(&mut parsed);

        let attributes = parsed[0].1.attributes.clone();
        let images: Vec<_> = parsed
            .into_iter()
            .map(|(path, slice)| (path, Self::calibrate_slice(slice)))
            .collect();

        Self::validate_dimensions(&images)?;
        let volume = Volume::new(Self::build_volume_array(&images))
            .ok_or(VolumeLoaderError::EmptyVolume)?;

        let metadata = Metadata {
            modality: attributes
                .modality
                .unwrap_or_else(|| DEFAULT_CALIBRATED_MODALITY.to_owned()),
            rows: attributes.rows.unwrap_or(0),
            columns: attributes.columns.unwrap_or(0),
            slice_thickness: attributes.slice_thickness.unwrap_or(0.0),
            num_slices: images.len(),
        };
        info!(
            slices = metadata.num_slices,
            rows = metadata.rows,
            columns = metadata.columns,
            modality = %metadata.modality,
            "Loaded calibrated series"
        );
        Ok((volume, metadata))
    }

    fn load_image_stack(
        dir: &Path,
        paths: &[PathBuf],
    ) -> Result<(Volume, Metadata), VolumeLoaderError> {
        let image_paths: Vec<_> = paths.iter().filter(|path| is_image_file(path)).collect();
        if image_paths.is_empty() {
            return Err(VolumeLoaderError::NoSupportedFiles {
                dir: dir.to_path_buf(),
            });
        }

        let images = image_paths
            .par_iter()
            .map(|path| decode_luma(path).map(|image| ((*path).clone(), image)))
            .collect::<Result<Vec<_>, VolumeLoaderError>>()?;

        Self::validate_dimensions(&images)?;
        let volume = Volume::new(Self::build_volume_array(&images))
            .ok_or(VolumeLoaderError::EmptyVolume)?;

        let (num_slices, rows, columns) = volume.dim();
        info!(slices = num_slices, rows, columns, "Loaded image stack");
        Ok((
            volume,
            Metadata {
                modality: IMAGE_STACK_MODALITY.to_owned(),
                rows,
                columns,
                slice_thickness: 0.0,
                num_slices,
            },
        ))
    }

    /// Stable sort on (sequence number, spatial location).
    fn sort_slices(slices: &mut [(PathBuf, CalibratedSlice)]) {
        slices.sort_by(|(_, a), (_, b)| {
            let (a_seq, a_loc) = a.attributes.sort_key();
            let (b_seq, b_loc) = b.attributes.sort_key();
            a_seq
                .cmp(&b_seq)
                .then(a_loc.partial_cmp(&b_loc).unwrap_or(Ordering::Equal))
        });
    }

    fn calibrate_slice(slice: CalibratedSlice) -> Array2<f32> {
        let (slope, intercept) = slice.attributes.rescale();
        calibrate(slice.pixels, slope, intercept)
    }

    fn validate_dimensions(images: &[(PathBuf, Array2<f32>)]) -> Result<(), VolumeLoaderError> {
        let expected = images[0].1.dim();
        match images.iter().find(|(_, image)| image.dim() != expected) {
            Some((path, image)) => Err(VolumeLoaderError::InconsistentDimensions {
                path: path.clone(),
                expected,
                found: image.dim(),
            }),
            None => Ok(()),
        }
    }

    fn build_volume_array(images: &[(PathBuf, Array2<f32>)]) -> Array3<f32> {
        let (height, width) = images[0].1.dim();
        let depth = images.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, (_, image)) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }
}

/// Apply the affine rescale `raw * slope + intercept`.
pub fn calibrate(mut raw: Array2<f32>, slope: f64, intercept: f64) -> Array2<f32> {
    raw.mapv_inplace(|v| (f64::from(v) * slope + intercept) as f32);
    raw
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Decode any supported image to 8-bit luminance as floats.
fn decode_luma(path: &Path) -> Result<Array2<f32>, VolumeLoaderError> {
    let gray = image::open(path)
        .map_err(|source| VolumeLoaderError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();
    let (width, height) = gray.dimensions();
    Ok(Array2::from_shape_fn(
        (height as usize, width as usize),
        |(row, col)| f32::from(gray.get_pixel(col as u32, row as u32).0[0]),
    ))
}
