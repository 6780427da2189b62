//! Camera configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capture device selection and requested picture size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Index of the camera to open (0 = back camera on most devices).
    #[serde(rename = "Camera Index")]
    pub camera_index: usize,

    /// Picture height in pixels (16-8192).
    #[serde(rename = "Picture Height")]
    pub picture_height: u32,

    /// Picture width in pixels (16-8192).
    #[serde(rename = "Picture Width")]
    pub picture_width: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            picture_height: 480,
            picture_width: 640,
        }
    }
}

impl CameraSettings {
    /// Clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.picture_width = self.picture_width.clamp(16, 8192);
        self.picture_height = self.picture_height.clamp(16, 8192);
    }
}

impl fmt::Display for CameraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\tCamera index: {}", self.camera_index)?;
        writeln!(
            f,
            "\t\tPicture size: {}x{}",
            self.picture_width, self.picture_height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CameraSettings::default();
        assert_eq!(config.camera_index, 0);
        assert_eq!(config.picture_width, 640);
        assert_eq!(config.picture_height, 480);
    }

    #[test]
    fn test_config_validation() {
        let mut config = CameraSettings {
            picture_width: 0,
            picture_height: 100_000,
            ..Default::default()
        };
        config.validate();

        assert_eq!(config.picture_width, 16);
        assert_eq!(config.picture_height, 8192);
    }
}
