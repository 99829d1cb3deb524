use crate::{geometry::IndicatorLine, session::RenderedView};

use image::{
    DynamicImage, GrayImage, Luma, Rgb, RgbImage,
    imageops::{self, FilterType},
};

pub const INDICATOR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const INDICATOR_WIDTH: u32 = 2;

/// Paint a view onto a black canvas of `canvas` (width, height).
///
/// The slice is resized to the content size from the view's geometry and
/// placed at its offsets; the indicator line, if any, is drawn on top.
pub fn compose(view: &RenderedView, canvas: (u32, u32)) -> RgbImage {
    let mut target = RgbImage::new(canvas.0, canvas.1);
    let geometry = &view.geometry;

    if geometry.content_width > 0 && geometry.content_height > 0 {
        let (width, height) = view.natural_size();
        let slice = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            Luma([view.pixels[[y as usize, x as usize]]])
        });
        let resized = imageops::resize(
            &slice,
            geometry.content_width,
            geometry.content_height,
            FilterType::CatmullRom,
        );
        let resized = DynamicImage::ImageLuma8(resized).to_rgb8();
        imageops::overlay(
            &mut target,
            &resized,
            i64::from(geometry.offset_x),
            i64::from(geometry.offset_y),
        );
    }

    if let Some(line) = view.indicator {
        draw_indicator(&mut target, line);
    }
    target
}

fn draw_indicator(target: &mut RgbImage, line: IndicatorLine) {
    let (width, height) = target.dimensions();
    let (xs, ys) = match line {
        IndicatorLine::Vertical { x, y_start, y_end } => (x..x + INDICATOR_WIDTH, y_start..y_end + 1),
        IndicatorLine::Horizontal { y, x_start, x_end } => (x_start..x_end + 1, y..y + INDICATOR_WIDTH),
    };
    for y in ys.start.min(height)..ys.end.min(height) {
        for x in xs.start.min(width)..xs.end.min(width) {
            target.put_pixel(x, y, INDICATOR_COLOR);
        }
    }
}
