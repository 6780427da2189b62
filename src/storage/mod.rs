//! Picture storage strategies.
//!
//! A `StorageStrategy` decides where a finished picture ends up. Only local
//! disk storage is implemented; the FTP and social media variants exist so
//! configuration files naming them keep parsing.
//!
//! On disk a strategy is a JSON object whose `"Storage Type"` key names the
//! variant and whose `"Settings"` key holds the naming policy.

mod local;


pub use local::{default_log_directory, default_picture_directory, LocalStorage};

use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

use crate::config::StorageSettings;
use crate::error::{WebcamError, WebcamResult};

/// Discriminator of the local disk strategy.
pub const STORAGE_LOCAL: &str = "Local Storage (Save on disk)";
/// Discriminator of the FTP upload strategy.
pub const STORAGE_FTP: &str = "FTP Storage (Upload)";
/// Discriminator of the social media sharing strategy.
pub const STORAGE_SOCIAL_MEDIA: &str = "Social Media Storage (Sharing)";

/// An encoded picture ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPicture {
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// File extension matching the encoding, without the dot.
    pub extension: &'static str,
}

/// Picture upload over FTP. Declared but not implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FtpStorage {
    #[serde(rename = "Settings", default)]
    pub settings: StorageSettings,
}

/// Picture sharing through social media. Declared but not implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SocialMediaStorage {
    #[serde(rename = "Settings", default)]
    pub settings: StorageSettings,
}

/// Where and how a picture is persisted.
///
/// Serialized by hand so `"Storage Type"` lands after the variant's own keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "Storage Type")]
pub enum StorageStrategy {
    #[serde(rename = "Local Storage (Save on disk)", alias = "Local Storage")]
    Local(LocalStorage),
    #[serde(rename = "FTP Storage (Upload)", alias = "FTP Storage")]
    Ftp(FtpStorage),
    #[serde(
        rename = "Social Media Storage (Sharing)",
        alias = "Social Media Storage"
    )]
    SocialMedia(SocialMediaStorage),
}

impl StorageStrategy {
    /// Local disk storage in `directory` with the given naming policy.
    pub fn local(directory: impl Into<PathBuf>, settings: StorageSettings) -> Self {
        Self::Local(LocalStorage::new(directory, settings))
    }

    /// Default picture storage: `current_<timestamp>.<ext>` in the picture directory.
    pub fn default_pictures() -> Self {
        Self::local(default_picture_directory(), StorageSettings::default())
    }

    /// Default log storage: one `mobilewebcam_<date>.log` per day.
    pub fn default_logs() -> Self {
        let settings = StorageSettings {
            timestamp_format: "%Y-%m-%d".to_string(),
            ..StorageSettings::with_base_name("mobilewebcam")
        };
        Self::local(default_log_directory(), settings)
    }

    /// Discriminator string written to the `"Storage Type"` key.
    pub fn storage_type_name(&self) -> &'static str {
        match self {
            StorageStrategy::Local(_) => STORAGE_LOCAL,
            StorageStrategy::Ftp(_) => STORAGE_FTP,
            StorageStrategy::SocialMedia(_) => STORAGE_SOCIAL_MEDIA,
        }
    }

    /// Naming policy of this strategy.
    pub fn settings(&self) -> &StorageSettings {
        match self {
            StorageStrategy::Local(local) => local.settings(),
            StorageStrategy::Ftp(ftp) => &ftp.settings,
            StorageStrategy::SocialMedia(social) => &social.settings,
        }
    }

    fn settings_mut(&mut self) -> &mut StorageSettings {
        match self {
            StorageStrategy::Local(local) => &mut local.settings,
            StorageStrategy::Ftp(ftp) => &mut ftp.settings,
            StorageStrategy::SocialMedia(social) => &mut social.settings,
        }
    }

    pub fn add_timestamp(&self) -> bool {
        self.settings().add_timestamp
    }

    pub fn timestamp_at_beginning(&self) -> bool {
        self.settings().timestamp_at_beginning
    }

    pub fn timestamp_format(&self) -> &str {
        &self.settings().timestamp_format
    }

    /// The local variant, if this strategy writes to disk.
    pub fn as_local(&self) -> Option<&LocalStorage> {
        match self {
            StorageStrategy::Local(local) => Some(local),
            _ => None,
        }
    }

    /// Repair settings that cannot produce a file name. A local strategy
    /// without a directory gets `default_directory`.
    pub fn validate(&mut self, default_directory: impl FnOnce() -> PathBuf) {
        if let StorageStrategy::Local(local) = self {
            local.fill_default_directory(default_directory);
        }
        self.settings_mut().validate();
    }

    /// Store a picture named with the current local time.
    pub fn store_picture(&self, picture: &EncodedPicture) -> WebcamResult<PathBuf> {
        self.store_picture_at(picture, &Local::now())
    }

    /// Store a picture named with `timestamp`. Returns where it was written.
    pub fn store_picture_at(
        &self,
        picture: &EncodedPicture,
        timestamp: &DateTime<Local>,
    ) -> WebcamResult<PathBuf> {
        match self {
            StorageStrategy::Local(local) => local.store_picture_at(picture, timestamp),
            StorageStrategy::Ftp(_) | StorageStrategy::SocialMedia(_) => {
                log::warn!(
                    "[STORAGE] {} is not implemented, picture dropped",
                    self.storage_type_name()
                );
                Err(WebcamError::UnsupportedStorage(
                    self.storage_type_name().to_string(),
                ))
            }
        }
    }
}

impl Serialize for StorageStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let StorageStrategy::Local(local) = self {
            map.serialize_entry("Directory", local.directory())?;
        }
        map.serialize_entry("Settings", self.settings())?;
        map.serialize_entry("Storage Type", self.storage_type_name())?;
        map.end()
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\tStorage Type: {}", self.storage_type_name())?;
        if let StorageStrategy::Local(local) = self {
            writeln!(f, "\t\tDirectory: {}", local.directory().display())?;
        }
        write!(f, "{}", self.settings())
    }
}
