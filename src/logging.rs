//! Logging setup.
//!
//! Installs `env_logger` as the backend of the `log` facade. When the log
//! storage strategy is local, output goes to a file in its directory named
//! by the node's timestamp format (one per day by default). The writer moves
//! to a new file when that name changes and old files are cleaned up.
//! Otherwise output goes to stderr.

use chrono::{DateTime, Local};
use env_logger::{Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ResultExt, WebcamResult};
use crate::storage::{LocalStorage, StorageStrategy};

/// Maximum number of log files to keep
pub const MAX_LOG_FILES: usize = 5;

const LOG_EXTENSION: &str = "log";

fn builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder
}

/// Initialize logging from the log storage strategy.
///
/// Returns the log file in use, or None when logging to stderr.
pub fn init_logging(log_storage: &StorageStrategy) -> WebcamResult<Option<PathBuf>> {
    let mut builder = builder();

    let log_path = match log_storage.as_local() {
        Some(local) => {
            let writer = RotatingLogFile::open(local.clone(), &Local::now())?;
            let path = writer.path().to_path_buf();
            builder.target(Target::Pipe(Box::new(writer)));
            cleanup_old_logs(local.directory(), MAX_LOG_FILES);
            Some(path)
        }
        None => None,
    };

    builder.try_init().context("Failed to install logger")?;

    match &log_path {
        Some(path) => log::info!("[LOGGING] Logging system initialized, writing to {:?}", path),
        None => log::warn!(
            "[LOGGING] {} cannot hold log files, logging to stderr",
            log_storage.storage_type_name()
        ),
    }
    Ok(log_path)
}

/// Initialize stderr-only logging.
pub fn init_stderr_logging() -> WebcamResult<()> {
    builder()
        .target(Target::Stderr)
        .try_init()
        .context("Failed to install logger")
}

/// Open (append) the log file for `now`, creating the directory if needed.
pub fn open_log_file(local: &LocalStorage, now: &DateTime<Local>) -> WebcamResult<(File, PathBuf)> {
    let path = local.destination(now, LOG_EXTENSION)?;
    fs::create_dir_all(local.directory())
        .with_context(|| format!("Failed to create log directory {:?}", local.directory()))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    Ok((file, path))
}

/// Log file that follows the naming policy of its storage node.
///
/// Before each write the destination for the current time is computed again;
/// when it differs from the open file, the new file is opened and old logs
/// are cleaned up.
pub struct RotatingLogFile {
    storage: LocalStorage,
    path: PathBuf,
    file: File,
}

impl RotatingLogFile {
    pub fn open(storage: LocalStorage, now: &DateTime<Local>) -> WebcamResult<Self> {
        let (file, path) = open_log_file(&storage, now)?;
        Ok(Self {
            storage,
            path,
            file,
        })
    }

    /// File currently written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Switch to the file named for `now`. Returns true if the file changed.
    pub fn rotate_if_needed(&mut self, now: &DateTime<Local>) -> WebcamResult<bool> {
        if self.storage.destination(now, LOG_EXTENSION)? == self.path {
            return Ok(false);
        }

        let (file, path) = open_log_file(&self.storage, now)?;
        self.file = file;
        self.path = path;
        cleanup_old_logs(self.storage.directory(), MAX_LOG_FILES);
        Ok(true)
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // On failure the previous file stays in use.
        self.rotate_if_needed(&Local::now()).ok();
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Remove old log files, keeping only the `keep` most recent. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == LOG_EXTENSION)
                .unwrap_or(false)
        })
        .collect();

    // Sort by modification time (newest first)
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time)
    });

    log_files
        .into_iter()
        .skip(keep)
        .filter(|file| fs::remove_file(file.path()).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageSettings;
    use chrono::TimeZone;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn test_open_log_file_uses_naming_policy() {
        let dir = tempdir().unwrap();
        let settings = StorageSettings {
            timestamp_format: "%Y-%m-%d".to_string(),
            ..StorageSettings::with_base_name("mobilewebcam")
        };
        let local = LocalStorage::new(dir.path().join("logs"), settings);
        let now = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        let (mut file, path) = open_log_file(&local, &now).unwrap();
        writeln!(file, "hello").unwrap();
        drop(file);

        assert_eq!(path, dir.path().join("logs").join("mobilewebcam_2024-01-15.log"));
        let (mut file, _) = open_log_file(&local, &now).unwrap();
        writeln!(file, "again").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\nagain\n");
    }

    #[test]
    fn test_log_file_moves_to_next_day() {
        let dir = tempdir().unwrap();
        let settings = StorageSettings {
            timestamp_format: "%Y-%m-%d".to_string(),
            ..StorageSettings::with_base_name("mobilewebcam")
        };
        let local = LocalStorage::new(dir.path(), settings);
        let evening = Local.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap();
        let morning = Local.with_ymd_and_hms(2024, 1, 16, 0, 1, 0).unwrap();

        let mut log = RotatingLogFile::open(local, &evening).unwrap();
        log.file.write_all(b"late\n").unwrap();
        assert!(!log.rotate_if_needed(&evening).unwrap());

        assert!(log.rotate_if_needed(&morning).unwrap());
        log.file.write_all(b"early\n").unwrap();
        log.flush().unwrap();

        assert_eq!(log.path(), dir.path().join("mobilewebcam_2024-01-16.log"));
        assert_eq!(
            fs::read_to_string(dir.path().join("mobilewebcam_2024-01-15.log")).unwrap(),
            "late\n"
        );
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "early\n");
    }

    #[test]
    fn test_writer_follows_current_time() {
        let dir = tempdir().unwrap();
        let settings = StorageSettings {
            timestamp_format: "%Y-%m-%d".to_string(),
            ..StorageSettings::with_base_name("mobilewebcam")
        };
        let local = LocalStorage::new(dir.path(), settings);
        let long_ago = Local.with_ymd_and_hms(2020, 6, 1, 8, 0, 0).unwrap();

        let mut log = RotatingLogFile::open(local, &long_ago).unwrap();
        writeln!(log, "now").unwrap();
        log.flush().unwrap();

        assert!(!log.path().to_string_lossy().contains("2020-06-01"));
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "now\n");
    }

    #[test]
    fn test_cleanup_keeps_newest_logs() {
        let dir = tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        for i in 0..7u64 {
            let path = dir.path().join(format!("day{}.log", i));
            let file = File::create(&path).unwrap();
            file.set_modified(base + Duration::from_secs(i * 60)).unwrap();
        }
        fs::write(dir.path().join("current.jpg"), b"x").unwrap();

        let removed = cleanup_old_logs(dir.path(), MAX_LOG_FILES);

        assert_eq!(removed, 2);
        assert!(!dir.path().join("day0.log").exists());
        assert!(!dir.path().join("day1.log").exists());
        assert!(dir.path().join("day6.log").exists());
        assert!(dir.path().join("current.jpg").exists());
    }

    #[test]
    fn test_cleanup_missing_directory() {
        assert_eq!(cleanup_old_logs(Path::new("/definitely/not/here"), 1), 0);
    }
}
