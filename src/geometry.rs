use crate::enums::PlaneAxis;

/// Uniform scale and centering of a slice inside a fixed canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub scale: f64,
    pub content_width: u32,
    pub content_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl DisplayGeometry {
    /// Letterbox `natural` (width, height) into `canvas` (width, height).
    ///
    /// Content is scaled uniformly and centered, never cropped. Zero natural
    /// dimensions are treated as 1.
    pub fn fit(natural: (usize, usize), canvas: (u32, u32)) -> Self {
        let width = natural.0.max(1) as f64;
        let height = natural.1.max(1) as f64;
        let scale = (f64::from(canvas.0) / width).min(f64::from(canvas.1) / height);
        let content_width = ((width * scale).floor() as u32).min(canvas.0);
        let content_height = ((height * scale).floor() as u32).min(canvas.1);
        Self {
            scale,
            content_width,
            content_height,
            offset_x: (canvas.0 - content_width) / 2,
            offset_y: (canvas.1 - content_height) / 2,
        }
    }

    fn project(&self, offset: u32, index: usize) -> u32 {
        offset + (index as f64 * self.scale).round() as u32
    }
}

/// Position of another plane drawn over a view, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorLine {
    Vertical { x: u32, y_start: u32, y_end: u32 },
    Horizontal { y: u32, x_start: u32, x_end: u32 },
}

/// Locate the line where `secondary` at `index` crosses a `primary` view.
///
/// Returns `None` when both views show the same plane.
pub fn cross_plane_indicator(
    primary: PlaneAxis,
    secondary: PlaneAxis,
    index: usize,
    geometry: &DisplayGeometry,
) -> Option<IndicatorLine> {
    if primary == secondary {
        return None;
    }
    let vertical = secondary.volume_axis() == column_axis(primary);

    Some(if vertical {
        IndicatorLine::Vertical {
            x: geometry.project(geometry.offset_x, index),
            y_start: geometry.offset_y,
            y_end: geometry.offset_y + geometry.content_height,
        }
    } else {
        IndicatorLine::Horizontal {
            y: geometry.project(geometry.offset_y, index),
            x_start: geometry.offset_x,
            x_end: geometry.offset_x + geometry.content_width,
        }
    })
}

/// Volume axis running along the columns of a slice image.
fn column_axis(plane: PlaneAxis) -> usize {
    match plane {
        PlaneAxis::Axial | PlaneAxis::Coronal => 2,
        PlaneAxis::Sagittal => 1,
    }
}
