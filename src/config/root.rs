//! The settings tree and its persistence.
//!
//! `RootSettings` aggregates one node per subsystem. `SettingsStore` owns the
//! resident tree for the lifetime of the process and is shared by `Arc`.
//! Reloading parses into a fresh tree and swaps it in, so readers holding a
//! snapshot never observe a half-applied configuration.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    envelope, CameraSettings, ImageSettings, SettingsEnvelope, SettingsEnvelopeRef,
    TriggerSettings,
};
use crate::error::{WebcamError, WebcamResult};
use crate::storage::{default_log_directory, default_picture_directory, StorageStrategy};

/// Name of the configuration file inside the settings directory.
pub const SETTINGS_FILE_NAME: &str = "mbw2_config.txt";

/// Settings directory used when none is given.
pub const DEFAULT_SETTINGS_DIR: &str = "/sdcard/";

/// Configuration of every subsystem.
///
/// Fields are declared in alphabetical order of their JSON keys so the
/// written file is sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSettings {
    #[serde(rename = "Camera", with = "envelope")]
    camera: CameraSettings,

    #[serde(rename = "Image", with = "envelope")]
    image: ImageSettings,

    #[serde(rename = "Log Storage")]
    log_storage: StorageStrategy,

    #[serde(rename = "Picture Storage")]
    picture_storage: StorageStrategy,

    #[serde(rename = "Settings File Path")]
    settings_file_path: PathBuf,

    #[serde(rename = "Take Picture Triggers", with = "envelope")]
    take_picture_triggers: TriggerSettings,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            image: ImageSettings::default(),
            log_storage: StorageStrategy::default_logs(),
            picture_storage: StorageStrategy::default_pictures(),
            settings_file_path: PathBuf::from(DEFAULT_SETTINGS_DIR),
            take_picture_triggers: TriggerSettings::default(),
        }
    }
}

impl RootSettings {
    pub fn camera(&self) -> &CameraSettings {
        &self.camera
    }

    pub fn image(&self) -> &ImageSettings {
        &self.image
    }

    pub fn log_storage(&self) -> &StorageStrategy {
        &self.log_storage
    }

    pub fn picture_storage(&self) -> &StorageStrategy {
        &self.picture_storage
    }

    pub fn settings_file_path(&self) -> &Path {
        &self.settings_file_path
    }

    pub fn take_picture_triggers(&self) -> &TriggerSettings {
        &self.take_picture_triggers
    }

    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_image(mut self, image: ImageSettings) -> Self {
        self.image = image;
        self
    }

    pub fn with_log_storage(mut self, storage: StorageStrategy) -> Self {
        self.log_storage = storage;
        self
    }

    pub fn with_picture_storage(mut self, storage: StorageStrategy) -> Self {
        self.picture_storage = storage;
        self
    }

    pub fn with_settings_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file_path = path.into();
        self
    }

    pub fn with_take_picture_triggers(mut self, triggers: TriggerSettings) -> Self {
        self.take_picture_triggers = triggers;
        self
    }

    /// Validate and clamp every node.
    pub fn validate(&mut self) {
        self.camera.validate();
        self.image.validate();
        self.log_storage.validate(default_log_directory);
        self.picture_storage.validate(default_picture_directory);
        self.take_picture_triggers.validate();
    }

    /// Serialize as the pretty-printed `{"Settings": {...}}` document.
    pub fn to_json(&self) -> WebcamResult<String> {
        serde_json::to_string_pretty(&SettingsEnvelopeRef { settings: self })
            .map_err(WebcamError::ConfigSerialize)
    }

    /// Parse a `{"Settings": {...}}` document. The result is not validated.
    pub fn from_json(json: &str) -> WebcamResult<Self> {
        serde_json::from_str::<SettingsEnvelope<RootSettings>>(json)
            .map(|envelope| envelope.settings)
            .map_err(WebcamError::ConfigParse)
    }
}

impl fmt::Display for RootSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n******\nSettings Overview:\n")?;
        write!(f, "\n\tImage Settings:\n{}", self.image)?;
        write!(f, "\n\tCamera Settings:\n{}", self.camera)?;
        write!(f, "\n\tPictures Storage Settings:\n{}", self.picture_storage)?;
        write!(f, "\n\tLogs Storage Settings:\n{}", self.log_storage)?;
        write!(
            f,
            "\n\tPicture Triggers Settings:\n{}",
            self.take_picture_triggers
        )?;
        writeln!(
            f,
            "\n\tSettings File Path: {}",
            self.settings_file_path.display()
        )?;
        writeln!(f, "******")
    }
}

/// Owner of the resident settings tree.
pub struct SettingsStore {
    settings_dir: PathBuf,
    current: RwLock<Arc<RootSettings>>,
}

impl SettingsStore {
    /// Store with default settings, reading and writing `settings_dir`.
    pub fn new(settings_dir: impl Into<PathBuf>) -> Self {
        let settings_dir = settings_dir.into();
        let settings = RootSettings::default().with_settings_file_path(settings_dir.clone());
        Self::with_settings(settings_dir, settings)
    }

    /// Store holding `settings`, reading and writing `settings_dir`.
    pub fn with_settings(settings_dir: impl Into<PathBuf>, mut settings: RootSettings) -> Self {
        settings.validate();
        Self {
            settings_dir: settings_dir.into(),
            current: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Full path of the configuration file.
    pub fn settings_file(&self) -> PathBuf {
        self.settings_dir.join(SETTINGS_FILE_NAME)
    }

    /// The resident settings. Cheap; later reloads do not affect it.
    pub fn snapshot(&self) -> Arc<RootSettings> {
        self.current.read().clone()
    }

    /// Validate `settings` and make them resident.
    pub fn replace(&self, mut settings: RootSettings) -> Arc<RootSettings> {
        settings.validate();
        let settings = Arc::new(settings);
        *self.current.write() = Arc::clone(&settings);
        log::debug!("[SETTINGS] Settings replaced: {:?}", settings);
        settings
    }

    /// Read and parse the configuration file, then make it resident.
    ///
    /// On any failure the resident settings are left untouched. A missing
    /// file is reported as `WebcamError::ConfigNotFound` so callers can tell
    /// "no file yet" apart from a corrupt one.
    pub fn read_settings_file(&self) -> WebcamResult<Arc<RootSettings>> {
        let path = self.settings_file();

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("[SETTINGS] Configuration file not found at {:?}", path);
                return Err(WebcamError::ConfigNotFound { path });
            }
            Err(source) => {
                log::error!(
                    "[SETTINGS] Failed to read configuration file {:?}: {}",
                    path,
                    source
                );
                return Err(WebcamError::ConfigRead { path, source });
            }
        };

        let settings = RootSettings::from_json(&text).map_err(|e| {
            log::error!("[SETTINGS] Invalid configuration file {:?}: {}", path, e);
            e
        })?;

        log::info!("[SETTINGS] Loaded settings from {:?}", path);
        Ok(self.replace(settings))
    }

    /// Read the configuration file, keeping the resident settings on failure.
    pub fn load_or_default(&self) -> Arc<RootSettings> {
        match self.read_settings_file() {
            Ok(settings) => settings,
            Err(e) if e.is_config_missing() => {
                log::info!("[SETTINGS] No configuration file yet, using defaults");
                self.snapshot()
            }
            Err(e) => {
                log::error!("[SETTINGS] Keeping previous settings: {}", e);
                self.snapshot()
            }
        }
    }

    /// Write the resident settings to the configuration file.
    pub fn write_settings_file(&self) -> WebcamResult<PathBuf> {
        let path = self.settings_file();
        let json = self.snapshot().to_json().map_err(|e| {
            log::error!("[SETTINGS] {}", e);
            e
        })?;

        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&self.settings_dir)?;
            fs::write(&path, json.as_bytes())
        };
        if let Err(source) = write() {
            log::error!(
                "[SETTINGS] Failed to write configuration file {:?}: {}",
                path,
                source
            );
            return Err(WebcamError::ConfigWrite { path, source });
        }

        log::info!("[SETTINGS] Settings written to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PictureFormat, StorageSettings};
    use crate::storage::{FtpStorage, STORAGE_LOCAL};
    use tempfile::tempdir;

    fn custom_settings() -> RootSettings {
        RootSettings::default()
            .with_camera(CameraSettings {
                camera_index: 1,
                picture_width: 1280,
                picture_height: 720,
            })
            .with_image(ImageSettings {
                grayscale: true,
                jpeg_quality: 70,
                no_camera_picture: Some(PathBuf::from("/sdcard/nocam.png")),
                picture_format: PictureFormat::Png,
            })
            .with_picture_storage(StorageStrategy::local(
                "/sdcard/DCIM/cam",
                StorageSettings {
                    add_timestamp: true,
                    timestamp_at_beginning: true,
                    timestamp_format: "%H%M%S".to_string(),
                    ..StorageSettings::with_base_name("shot")
                },
            ))
            .with_log_storage(StorageStrategy::Ftp(FtpStorage::default()))
            .with_take_picture_triggers(TriggerSettings {
                enabled: false,
                interval_secs: 60,
            })
    }

    #[test]
    fn test_json_round_trip() {
        let settings = custom_settings();
        let json = settings.to_json().unwrap();
        let restored = RootSettings::from_json(&json).unwrap();
        assert_eq!(restored, settings);
        assert_eq!(restored.log_storage().storage_type_name(), "FTP Storage (Upload)");
    }

    #[test]
    fn test_document_layout() {
        let json = RootSettings::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let top = value.as_object().unwrap();
        assert_eq!(top.len(), 1);
        let root = top["Settings"].as_object().unwrap();

        for node in ["Camera", "Image", "Take Picture Triggers"] {
            let wrapped = root[node].as_object().unwrap();
            assert_eq!(wrapped.len(), 1, "{} must only hold Settings", node);
            assert!(wrapped.contains_key("Settings"));
        }
        for node in ["Picture Storage", "Log Storage"] {
            assert_eq!(root[node]["Storage Type"], STORAGE_LOCAL);
            assert!(root[node]["Settings"].is_object());
        }
        assert_eq!(root["Settings File Path"], "/sdcard/");
    }

    #[test]
    fn test_keys_are_alphabetical() {
        let json = RootSettings::default().to_json().unwrap();
        let keys = [
            "\"Camera\"",
            "\"Image\"",
            "\"Log Storage\"",
            "\"Picture Storage\"",
            "\"Settings File Path\"",
            "\"Take Picture Triggers\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_storage_node_keys_are_alphabetical() {
        let json = RootSettings::default().to_json().unwrap();
        for (node, next) in [
            ("\"Log Storage\"", "\"Picture Storage\""),
            ("\"Picture Storage\"", "\"Settings File Path\""),
        ] {
            let start = json.find(node).unwrap();
            let end = json.find(next).unwrap();
            let body = &json[start + node.len()..end];
            let positions: Vec<usize> = ["\"Directory\"", "\"Settings\"", "\"Storage Type\""]
                .iter()
                .map(|k| body.find(k).unwrap())
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            assert_eq!(positions, sorted, "{} keys out of order", node);
        }
    }

    #[test]
    fn test_parse_example_document() {
        let json = r#"{"Settings": {
            "Settings File Path": "/sdcard/",
            "Image": {"Settings": {"Grayscale": false}},
            "Camera": {"Settings": {}},
            "Picture Storage": {
                "Storage Type": "Local Storage (Save on disk)",
                "Directory": "/sdcard/DCIM/MobileWebcam",
                "Settings": {
                    "Add Timestamp": true,
                    "Base Name": "current",
                    "Timestamp At Beginning": true,
                    "Timestamp Format": "%Y%m%d"
                }
            },
            "Log Storage": {"Storage Type": "Local Storage", "Settings": {}},
            "Take Picture Triggers": {"Settings": {"Interval Seconds": 30}}
        }}"#;

        let settings = RootSettings::from_json(json).unwrap();
        let storage = settings.picture_storage();
        assert!(storage.as_local().is_some());
        assert!(storage.add_timestamp());
        assert!(storage.timestamp_at_beginning());
        assert_eq!(storage.timestamp_format(), "%Y%m%d");
        assert_eq!(settings.take_picture_triggers().interval_secs, 30);
    }

    #[test]
    fn test_missing_directories_follow_node_role() {
        let json = r#"{"Settings": {
            "Log Storage": {"Settings": {}, "Storage Type": "Local Storage"},
            "Picture Storage": {"Settings": {}, "Storage Type": "Local Storage"}
        }}"#;
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), json).unwrap();
        let store = SettingsStore::new(dir.path());

        let settings = store.read_settings_file().unwrap();
        let logs = settings.log_storage().as_local().unwrap();
        let pictures = settings.picture_storage().as_local().unwrap();
        assert_eq!(logs.directory(), default_log_directory());
        assert_eq!(pictures.directory(), default_picture_directory());
        assert_ne!(logs.directory(), pictures.directory());
    }

    #[test]
    fn test_unknown_storage_type_fails_parse() {
        let json = r#"{"Settings": {
            "Picture Storage": {"Storage Type": "Pigeon", "Settings": {}}
        }}"#;
        let err = RootSettings::from_json(json).unwrap_err();
        assert!(matches!(err, WebcamError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file_keeps_resident_settings() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::with_settings(dir.path(), custom_settings());
        let before = store.snapshot();

        let err = store.read_settings_file().unwrap_err();
        assert!(err.is_config_missing());
        assert_eq!(*store.snapshot(), *before);

        let loaded = store.load_or_default();
        assert_eq!(*loaded, *before);
    }

    #[test]
    fn test_corrupt_file_keeps_resident_settings() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        fs::write(store.settings_file(), "{\"Settings\": [").unwrap();
        let before = store.snapshot();

        let err = store.read_settings_file().unwrap_err();
        assert!(matches!(err, WebcamError::ConfigParse(_)));
        assert!(!err.is_config_missing());
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_write_then_read_publishes_settings() {
        let dir = tempdir().unwrap();
        let writer = SettingsStore::with_settings(dir.path(), custom_settings());
        let path = writer.write_settings_file().unwrap();
        assert_eq!(path, dir.path().join(SETTINGS_FILE_NAME));

        let reader = SettingsStore::new(dir.path());
        let loaded = reader.read_settings_file().unwrap();
        assert_eq!(*loaded, *writer.snapshot());
        assert_eq!(*reader.snapshot(), *loaded);
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = tempdir().unwrap();
        SettingsStore::with_settings(dir.path(), custom_settings())
            .write_settings_file()
            .unwrap();

        let store = SettingsStore::new(dir.path());
        let first = store.read_settings_file().unwrap();
        let second = store.read_settings_file().unwrap();
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let old = store.snapshot();

        store.replace(custom_settings());

        assert_eq!(*old, RootSettings::default().with_settings_file_path(dir.path()));
        assert_eq!(store.snapshot().camera().picture_width, 1280);
    }

    #[test]
    fn test_loaded_settings_are_validated() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let json = r#"{"Settings": {"Image": {"Settings": {"JPEG Quality": 0}}}}"#;
        fs::write(store.settings_file(), json).unwrap();

        let loaded = store.read_settings_file().unwrap();
        assert_eq!(loaded.image().jpeg_quality, 1);
    }

    #[test]
    fn test_overview_sections() {
        let text = RootSettings::default().to_string();
        for section in [
            "Settings Overview:",
            "Image Settings:",
            "Camera Settings:",
            "Pictures Storage Settings:",
            "Logs Storage Settings:",
            "Picture Triggers Settings:",
            "Settings File Path: /sdcard/",
        ] {
            assert!(text.contains(section), "missing {:?}", section);
        }
    }
}
