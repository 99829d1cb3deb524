//! Intensity windowing and tone mapping of calibrated slices to 8 bits.
//!
//! Stages run in a fixed order: window clip, normalise, brightness/contrast,
//! gamma, final clamp and quantisation. Reordering them changes the output.

use ndarray::{Array2, ArrayView2, Zip};
use serde::Deserialize;

/// Guards normalisation against a degenerate window.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

pub const MIN_WINDOW_WIDTH: f32 = 1.0;
pub const BRIGHTNESS_RANGE: (f32, f32) = (-100.0, 100.0);
pub const CONTRAST_RANGE: (f32, f32) = (0.1, 3.0);
pub const GAMMA_RANGE: (f32, f32) = (0.1, 3.0);

/// Margin added around the value range when sizing the center control.
const CENTER_RANGE_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub center: f32,
    pub width: f32,
    /// Additive offset in percent of the display range
    pub brightness: f32,
    pub contrast: f32,
    pub gamma: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            center: 0.0,
            width: 400.0,
            brightness: 0.0,
            contrast: 1.0,
            gamma: 1.0,
        }
    }
}

impl WindowSettings {
    /// Window spanning `[min, max]` with neutral adjustments.
    pub fn from_value_range(min: f32, max: f32) -> Self {
        Self {
            center: (min + max) / 2.0,
            width: (max - min).max(MIN_WINDOW_WIDTH),
            ..Self::default()
        }
    }

    /// Force every parameter into its documented range.
    pub fn clamped(self) -> Self {
        Self {
            center: if self.center.is_finite() {
                self.center
            } else {
                Self::default().center
            },
            width: self.width.max(MIN_WINDOW_WIDTH),
            brightness: self.brightness.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1),
            contrast: self.contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1),
            gamma: self.gamma.clamp(GAMMA_RANGE.0, GAMMA_RANGE.1),
        }
    }

    pub fn bounds(&self) -> (f32, f32) {
        let half = self.width / 2.0;
        (self.center - half, self.center + half)
    }

    /// Map one calibrated value to a display intensity.
    #[inline]
    pub fn map_value(&self, value: f32) -> u8 {
        let (lower, upper) = self.bounds();
        // max/min rather than clamp: bounds may be NaN or inverted
        let clipped = value.max(lower).min(upper);
        let normalized = (clipped - lower) / (upper - lower).max(NORMALIZE_EPSILON);
        let mut adjusted = normalized * self.contrast + self.brightness / 100.0;
        if self.gamma != 1.0 && self.gamma > 0.0 {
            adjusted = adjusted.clamp(0.0, 1.0).powf(1.0 / self.gamma);
        }
        // NaN saturates to 0 in the cast
        (adjusted.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Suggested control ranges for a loaded volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRanges {
    pub center: (f32, f32),
    pub width: (f32, f32),
}

impl WindowRanges {
    pub fn from_value_range(min: f32, max: f32) -> Self {
        Self {
            center: (
                min.floor() - CENTER_RANGE_MARGIN,
                max.ceil() + CENTER_RANGE_MARGIN,
            ),
            width: (
                MIN_WINDOW_WIDTH,
                ((max - min).ceil() * 2.0).max(MIN_WINDOW_WIDTH),
            ),
        }
    }
}

/// Tone-map a slice to 8-bit intensities of the same shape.
pub fn tone_map(slice: ArrayView2<'_, f32>, settings: &WindowSettings) -> Array2<u8> {
    let mut output = Array2::<u8>::zeros(slice.raw_dim());
    Zip::from(&mut output)
        .and(&slice)
        .par_for_each(|out, &value| *out = settings.map_value(value));
    output
}
