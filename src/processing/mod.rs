//! Picture post-processing.
//!
//! Runs between frame capture and storage: applies the configured edits,
//! encodes the picture and hands it to the picture storage strategy. The
//! post-processor does not know how or where pictures end up.

pub mod placeholder;
pub mod yuv;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ImageSettings, PictureFormat, RootSettings, SettingsStore};
use crate::error::{OptionExt, WebcamError, WebcamResult};
use crate::storage::EncodedPicture;

/// Apply the configured edits to a captured picture.
pub fn apply_edits(settings: &ImageSettings, image: DynamicImage) -> DynamicImage {
    if settings.grayscale {
        DynamicImage::ImageLuma8(image.to_luma8())
    } else {
        image
    }
}

/// Encode a picture in the configured format.
pub fn encode_picture(settings: &ImageSettings, image: &DynamicImage) -> WebcamResult<EncodedPicture> {
    let mut bytes = Vec::new();

    match settings.picture_format {
        PictureFormat::Jpeg => {
            // JPEG has no alpha channel
            let opaque = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
                _ => DynamicImage::ImageRgb8(image.to_rgb8()),
            };
            let encoder = JpegEncoder::new_with_quality(&mut bytes, settings.jpeg_quality);
            opaque
                .write_with_encoder(encoder)
                .map_err(|e| WebcamError::EncodingError(e.to_string()))?;
        }
        PictureFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| WebcamError::EncodingError(e.to_string()))?;
        }
    }

    Ok(EncodedPicture {
        bytes,
        extension: settings.picture_format.extension(),
    })
}

/// Turns captured frames into stored pictures.
pub struct PostProcessor {
    settings: Arc<SettingsStore>,
}

impl PostProcessor {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }

    /// Edit, encode and store a captured picture. Returns where it was stored.
    pub fn postprocess_image(&self, image: DynamicImage) -> WebcamResult<PathBuf> {
        let settings = self.settings.snapshot();
        self.process(&settings, image)
    }

    /// Decode a raw NV21 camera frame, then post-process it.
    pub fn postprocess_yuv_frame(&self, yuv420sp: &[u8], width: u32, height: u32) -> WebcamResult<PathBuf> {
        let settings = self.settings.snapshot();
        let grayscale = settings.image().grayscale;

        let required = if grayscale {
            yuv::luma_len(width, height)
        } else {
            yuv::nv21_len(width, height)
        };
        let reason = match required {
            None => Some(format!("{}x{} frame is too large", width, height)),
            Some(_) if width == 0 || height == 0 => {
                Some(format!("{}x{} frame has no pixels", width, height))
            }
            Some(required) if yuv420sp.len() < required => Some(format!(
                "{}x{} frame needs {} bytes, got {}",
                width,
                height,
                required,
                yuv420sp.len()
            )),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            log::error!("[IMAGE] Rejected camera frame: {}", reason);
            return Err(WebcamError::InvalidFrame(reason));
        }

        let argb = if grayscale {
            yuv::decode_yuv420sp_grayscale(yuv420sp, width, height)
        } else {
            yuv::decode_yuv420sp_rgb(yuv420sp, width, height)
        };
        let frame = yuv::argb_to_rgb_image(&argb, width, height)
            .context("Decoded frame does not match its dimensions")?;

        self.process(&settings, DynamicImage::ImageRgb8(frame))
    }

    /// Store the no-camera picture after the camera failed to deliver a frame.
    pub fn postprocess_nocam_image(&self) -> WebcamResult<PathBuf> {
        let settings = self.settings.snapshot();
        log::info!("[IMAGE] Camera unavailable, storing no-camera picture");

        let picture = placeholder::load_no_camera_picture(settings.image(), settings.camera());
        self.process(&settings, picture)
    }

    fn process(&self, settings: &RootSettings, image: DynamicImage) -> WebcamResult<PathBuf> {
        if image.width() == 0 || image.height() == 0 {
            log::error!("[IMAGE] Rejected empty picture");
            return Err(WebcamError::InvalidFrame("picture has no pixels".to_string()));
        }

        let edited = apply_edits(settings.image(), image);
        let picture = encode_picture(settings.image(), &edited)?;

        let storage = settings.picture_storage();
        match storage.store_picture(&picture) {
            Ok(path) => {
                log::info!("[IMAGE] Picture stored at {:?}", path);
                Ok(path)
            }
            Err(e) => {
                log::error!(
                    "[IMAGE] {} failed to store picture: {}",
                    storage.storage_type_name(),
                    e
                );
                Err(e)
            }
        }
    }
}
