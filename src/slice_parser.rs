//! Per-file parsing of calibrated slices.
//!
//! A [`SliceParser`] turns one file into raw pixel intensities plus the
//! optional attributes needed to order and rescale it. The DICOM
//! implementation is available behind the `dicom` feature.

use ndarray::Array2;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[cfg(feature = "dicom")]
    #[error("DICOM read error: {0}")]
    Read(#[from] dicom::object::ReadError),

    #[cfg(feature = "dicom")]
    #[error("Pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),

    #[error("Unreadable slice: {0}")]
    Unreadable(String),
}

/// Optional per-file attributes of a calibrated slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceAttributes {
    pub sequence_number: Option<i64>,
    pub spatial_location: Option<f64>,
    pub rescale_slope: Option<f64>,
    pub rescale_intercept: Option<f64>,
    pub modality: Option<String>,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub slice_thickness: Option<f64>,
}

impl SliceAttributes {
    /// Ordering key: sequence number first, spatial location to break ties.
    pub fn sort_key(&self) -> (i64, f64) {
        (
            self.sequence_number.unwrap_or(0),
            self.spatial_location.unwrap_or(0.0),
        )
    }

    /// Affine rescale `(slope, intercept)`, identity when absent.
    pub fn rescale(&self) -> (f64, f64) {
        (
            self.rescale_slope.unwrap_or(1.0),
            self.rescale_intercept.unwrap_or(0.0),
        )
    }
}

/// Raw, uncalibrated pixels of one file together with its attributes.
#[derive(Debug, Clone)]
pub struct CalibratedSlice {
    pub pixels: Array2<f32>,
    pub attributes: SliceAttributes,
}

pub trait SliceParser: Send + Sync {
    /// Whether `path` is a candidate for this parser, judged by name only.
    fn accepts(&self, path: &Path) -> bool;

    fn parse(&self, path: &Path) -> Result<CalibratedSlice, ParseError>;
}

#[cfg(feature = "dicom")]
pub use self::dicom_parser::DicomSliceParser;

#[cfg(feature = "dicom")]
mod dicom_parser {
    use super::{CalibratedSlice, ParseError, SliceAttributes, SliceParser};

    use dicom::{
        object::{DefaultDicomObject, open_file},
        pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
    };
    use dicom_dictionary_std::tags;
    use ndarray::{Array2, s};
    use std::path::Path;

    /// Reads single-frame DICOM files with a `.dcm` extension.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DicomSliceParser;

    impl SliceParser for DicomSliceParser {
        fn accepts(&self, path: &Path) -> bool {
            path.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
        }

        fn parse(&self, path: &Path) -> Result<CalibratedSlice, ParseError> {
            let dicom_object = open_file(path)?;
            let pixels = Self::decode_image(&dicom_object)?;
            let attributes = Self::read_attributes(&dicom_object);
            Ok(CalibratedSlice { pixels, attributes })
        }
    }

    impl DicomSliceParser {
        /// First frame, first sample, without the modality LUT applied.
        fn decode_image(dicom_object: &DefaultDicomObject) -> Result<Array2<f32>, ParseError> {
            let pixel_data = dicom_object.decode_pixel_data()?;
            let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
            let array = pixel_data.to_ndarray_with_options::<f32>(&options)?;
            Ok(array.slice_move(s![0, .., .., 0]))
        }

        fn read_attributes(dicom_object: &DefaultDicomObject) -> SliceAttributes {
            let float = |tag| {
                dicom_object
                    .element(tag)
                    .ok()
                    .and_then(|element| element.to_float64().ok())
            };
            let int = |tag| {
                dicom_object
                    .element(tag)
                    .ok()
                    .and_then(|element| element.to_int::<i64>().ok())
            };

            SliceAttributes {
                sequence_number: int(tags::INSTANCE_NUMBER),
                spatial_location: float(tags::SLICE_LOCATION),
                rescale_slope: float(tags::RESCALE_SLOPE),
                rescale_intercept: float(tags::RESCALE_INTERCEPT),
                modality: dicom_object
                    .element(tags::MODALITY)
                    .ok()
                    .and_then(|element| element.to_str().ok())
                    .map(|modality| modality.trim().to_owned())
                    .filter(|modality| !modality.is_empty()),
                rows: int(tags::ROWS).and_then(|n| usize::try_from(n).ok()),
                columns: int(tags::COLUMNS).and_then(|n| usize::try_from(n).ok()),
                slice_thickness: float(tags::SLICE_THICKNESS),
            }
        }
    }
}
