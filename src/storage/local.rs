//! Local filesystem storage.
//!
//! Writes each picture as a single file in a configured directory.

use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::EncodedPicture;
use crate::config::StorageSettings;
use crate::error::WebcamResult;

/// Picture directory used when the platform reports none.
const FALLBACK_PICTURE_DIR: &str = "/sdcard/DCIM/MobileWebcam";
/// Log directory used when the platform reports none.
const FALLBACK_LOG_DIR: &str = "/sdcard/MobileWebcam/logs";

/// Pictures/MobileWebcam, falling back to the SD card camera folder.
pub fn default_picture_directory() -> PathBuf {
    dirs::picture_dir()
        .map(|dir| dir.join("MobileWebcam"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_PICTURE_DIR))
}

/// <local data>/MobileWebcam/logs, falling back to the SD card.
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("MobileWebcam").join("logs"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_LOG_DIR))
}

/// Saves pictures on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalStorage {
    /// Directory receiving the files. Created on first write. Empty when the
    /// node had none, until validation fills in the default of its role.
    #[serde(rename = "Directory", default)]
    pub(super) directory: PathBuf,

    #[serde(rename = "Settings", default)]
    pub(super) settings: StorageSettings,
}

impl LocalStorage {
    pub fn new(directory: impl Into<PathBuf>, settings: StorageSettings) -> Self {
        Self {
            directory: directory.into(),
            settings,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    /// Use `default_directory` when no directory is configured.
    pub fn fill_default_directory(&mut self, default_directory: impl FnOnce() -> PathBuf) {
        if self.directory.as_os_str().is_empty() {
            self.directory = default_directory();
        }
    }

    /// Full path of a file created at `timestamp` with the given extension.
    pub fn destination(&self, timestamp: &DateTime<Local>, extension: &str) -> WebcamResult<PathBuf> {
        let file_name = self.settings.file_name(timestamp, extension)?;
        Ok(self.directory.join(file_name))
    }

    /// Write the picture to its destination, replacing any previous file.
    pub fn store_picture_at(
        &self,
        picture: &EncodedPicture,
        timestamp: &DateTime<Local>,
    ) -> WebcamResult<PathBuf> {
        let path = self.destination(timestamp, picture.extension)?;

        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }
        fs::write(&path, &picture.bytes)?;

        log::debug!(
            "[STORAGE] Stored {} bytes at {:?}",
            picture.bytes.len(),
            path
        );
        Ok(path)
    }
}
