//! Image configuration.
//!
//! Edits and encoding applied by the post-processor to every picture before
//! it is handed to storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Encoding of stored pictures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PictureFormat {
    #[serde(rename = "JPEG")]
    Jpeg,
    #[serde(rename = "PNG")]
    Png,
}

impl Default for PictureFormat {
    fn default() -> Self {
        Self::Jpeg
    }
}

impl PictureFormat {
    /// File extension for pictures in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Jpeg => "jpg",
            PictureFormat::Png => "png",
        }
    }
}

/// Per-picture edits and output encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Convert pictures to grayscale before storing them.
    #[serde(rename = "Grayscale")]
    pub grayscale: bool,

    /// JPEG quality (1-100). Ignored for PNG.
    #[serde(rename = "JPEG Quality")]
    pub jpeg_quality: u8,

    /// Picture stored when the camera fails. None = built-in placeholder.
    #[serde(rename = "No Camera Picture")]
    pub no_camera_picture: Option<PathBuf>,

    /// Encoding of the stored picture.
    #[serde(rename = "Picture Format")]
    pub picture_format: PictureFormat,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            grayscale: false,
            jpeg_quality: 85,
            no_camera_picture: None,
            picture_format: PictureFormat::default(),
        }
    }
}

impl ImageSettings {
    /// Clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
    }
}

impl fmt::Display for ImageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\tConvert to grayscale? {}", self.grayscale)?;
        writeln!(f, "\t\tPicture format: {:?}", self.picture_format)?;
        writeln!(f, "\t\tJPEG quality: {}", self.jpeg_quality)?;
        match &self.no_camera_picture {
            Some(path) => writeln!(f, "\t\tNo camera picture: {}", path.display()),
            None => writeln!(f, "\t\tNo camera picture: built-in"),
        }
    }
}
