//! Application settings tree.
//!
//! This module owns the JSON-persisted configuration of the webcam. One
//! `RootSettings` aggregates a settings node per subsystem, and a
//! `SettingsStore` holds the resident tree and reads/writes the config file.
//!
//! ## Architecture
//!
//! - `ImageSettings`: edits and encoding applied to every picture
//! - `CameraSettings`: capture device and picture size
//! - `StorageSettings`: file naming policy shared by all storage strategies
//! - `TriggerSettings`: when pictures are taken
//! - `RootSettings` / `SettingsStore`: the tree and its persistence
//!
//! On disk every node is wrapped in a `{"Settings": ...}` object. The wrapper
//! is written by the [`envelope`] adapter rather than by each struct.

pub mod camera;
pub mod image;
pub mod root;
pub mod storage;
pub mod triggers;

pub use camera::CameraSettings;
pub use image::{ImageSettings, PictureFormat};
pub use root::{RootSettings, SettingsStore, DEFAULT_SETTINGS_DIR, SETTINGS_FILE_NAME};
pub use storage::StorageSettings;
pub use triggers::TriggerSettings;

use serde::{Deserialize, Serialize};

/// Borrowed `{"Settings": value}` wrapper used when writing.
#[derive(Serialize)]
pub(crate) struct SettingsEnvelopeRef<'a, T> {
    #[serde(rename = "Settings")]
    pub settings: &'a T,
}

/// Owned `{"Settings": value}` wrapper used when reading.
#[derive(Deserialize)]
pub(crate) struct SettingsEnvelope<T> {
    #[serde(rename = "Settings")]
    pub settings: T,
}

/// Serde adapter for `#[serde(with = "envelope")]` fields.
pub(crate) mod envelope {
    use super::{SettingsEnvelope, SettingsEnvelopeRef};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        SettingsEnvelopeRef { settings: value }.serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        SettingsEnvelope::<T>::deserialize(deserializer).map(|envelope| envelope.settings)
    }
}
