//! Settings and picture post-processing core of MobileWebcam.
//!
//! The camera layer hands captured frames to a [`PostProcessor`], which edits
//! and encodes them and passes them to the configured [`StorageStrategy`].
//! All of it is driven by the JSON settings tree held in a [`SettingsStore`].

pub mod config;
pub mod error;
pub mod logging;
pub mod processing;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

pub use config::{RootSettings, SettingsStore};
pub use error::{WebcamError, WebcamResult};
pub use processing::PostProcessor;
pub use storage::StorageStrategy;

/// Components wired together at start-up.
pub struct App {
    pub settings: Arc<SettingsStore>,
    pub processor: PostProcessor,
    /// Log file in use, None when logging to stderr.
    pub log_file: Option<PathBuf>,
}

/// Load settings, install logging and build the post-processor.
///
/// A missing or unreadable configuration file is not fatal: the defaults
/// stay resident and the failure is logged once logging is up.
pub fn run(settings_dir: Option<PathBuf>) -> WebcamResult<App> {
    let settings_dir = settings_dir.unwrap_or_else(|| PathBuf::from(config::DEFAULT_SETTINGS_DIR));
    let store = Arc::new(SettingsStore::new(settings_dir));

    // Logging depends on the log storage node, so the file is read first.
    let loaded = store.read_settings_file();
    let settings = store.snapshot();

    let log_file = match logging::init_logging(settings.log_storage()) {
        Ok(path) => path,
        Err(e) => {
            logging::init_stderr_logging()?;
            log::warn!("[LOGGING] Falling back to stderr: {}", e);
            None
        }
    };

    match loaded {
        Ok(_) => log::info!("[SETTINGS] Using {:?}", store.settings_file()),
        Err(e) if e.is_config_missing() => {
            log::info!("[SETTINGS] No configuration file yet, using defaults")
        }
        Err(e) => log::error!("[SETTINGS] Keeping default settings: {}", e),
    }
    log::info!("[SETTINGS] {}", settings);

    Ok(App {
        processor: PostProcessor::new(Arc::clone(&store)),
        settings: store,
        log_file,
    })
}
