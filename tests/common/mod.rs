#![allow(dead_code)]

use std::{fs, path::Path, str::FromStr};

use dicom_mpr::slice_parser::{CalibratedSlice, ParseError, SliceAttributes, SliceParser};
use image::{GrayImage, Luma};
use ndarray::{Array2, Array3};

use dicom_mpr::Volume;

/// Reads `.dcm` files written by [`write_fake_slice`]: `key=value` lines
/// describing a constant-valued slice.
pub struct TextSliceParser;

impl SliceParser for TextSliceParser {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "dcm")
    }

    fn parse(&self, path: &Path) -> Result<CalibratedSlice, ParseError> {
        let text = fs::read_to_string(path).map_err(|e| ParseError::Unreadable(e.to_string()))?;
        let mut attributes = SliceAttributes::default();
        let mut shape = (2, 2);
        let mut value = 0.0f32;

        for line in text.lines() {
            let (key, val) = line
                .split_once('=')
                .ok_or_else(|| ParseError::Unreadable(format!("bad line {line:?}")))?;
            match key {
                "seq" => attributes.sequence_number = Some(field(key, val)?),
                "loc" => attributes.spatial_location = Some(field(key, val)?),
                "slope" => attributes.rescale_slope = Some(field(key, val)?),
                "intercept" => attributes.rescale_intercept = Some(field(key, val)?),
                "modality" => attributes.modality = Some(val.to_owned()),
                "thickness" => attributes.slice_thickness = Some(field(key, val)?),
                "rows" => shape.0 = field(key, val)?,
                "cols" => shape.1 = field(key, val)?,
                "value" => value = field(key, val)?,
                _ => return Err(ParseError::Unreadable(format!("unknown key {key}"))),
            }
        }
        attributes.rows = Some(shape.0);
        attributes.columns = Some(shape.1);

        Ok(CalibratedSlice {
            pixels: Array2::from_elem(shape, value),
            attributes,
        })
    }
}

fn field<T: FromStr>(key: &str, val: &str) -> Result<T, ParseError> {
    val.trim()
        .parse()
        .map_err(|_| ParseError::Unreadable(format!("bad value for {key}")))
}

pub fn write_fake_slice(dir: &Path, name: &str, lines: &[&str]) {
    fs::write(dir.join(name), lines.join("\n")).unwrap();
}

/// Write a `width` x `height` grayscale PNG filled with `value`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, value: u8) {
    GrayImage::from_pixel(width, height, Luma([value]))
        .save(dir.join(name))
        .unwrap();
}

/// Volume whose voxel at (d, r, c) holds `d * 100 + r * 10 + c`.
pub fn coded_volume(depth: usize, rows: usize, columns: usize) -> Volume {
    let data = Array3::from_shape_fn((depth, rows, columns), |(d, r, c)| {
        (d * 100 + r * 10 + c) as f32
    });
    Volume::new(data).unwrap()
}
