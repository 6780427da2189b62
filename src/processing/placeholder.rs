//! Picture stored when the camera cannot deliver a frame.

use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

use crate::config::{CameraSettings, ImageSettings};
use crate::error::WebcamResult;

const BACKGROUND: Rgb<u8> = Rgb([48, 48, 48]);
const CROSS: Rgb<u8> = Rgb([200, 200, 200]);

/// Built-in placeholder: a dark frame crossed by both diagonals.
pub fn builtin_no_camera_picture(width: u32, height: u32) -> RgbImage {
    let (w, h) = (i64::from(width), i64::from(height));
    let diagonal = ((w * w + h * h) as f64).sqrt();
    let half_thickness = (w.min(h) as f64 / 80.0).max(1.0);

    RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (i64::from(x), i64::from(y));
        // Distance to each diagonal, scaled by its length.
        let falling = (y * w - x * h).abs() as f64 / diagonal;
        let rising = (y * w - (h - 1 - x) * h).abs() as f64 / diagonal;
        if falling.min(rising) <= half_thickness {
            CROSS
        } else {
            BACKGROUND
        }
    })
}

/// Open and decode a no-camera picture asset.
pub fn open_no_camera_picture(path: &Path) -> WebcamResult<DynamicImage> {
    Ok(image::open(path)?)
}

/// The configured no-camera picture, or the built-in one at camera size.
pub fn load_no_camera_picture(
    image_settings: &ImageSettings,
    camera: &CameraSettings,
) -> DynamicImage {
    if let Some(path) = &image_settings.no_camera_picture {
        match open_no_camera_picture(path) {
            Ok(picture) => return picture,
            Err(e) => log::warn!(
                "[IMAGE] Cannot load no-camera picture {:?}, using built-in: {}",
                path,
                e
            ),
        }
    }
    DynamicImage::ImageRgb8(builtin_no_camera_picture(
        camera.picture_width,
        camera.picture_height,
    ))
}
