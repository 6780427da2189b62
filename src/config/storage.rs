//! Storage naming configuration.
//!
//! Every storage strategy names its files with the same policy: a base name,
//! optionally joined with a formatted timestamp placed before or after it.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

use crate::error::{WebcamError, WebcamResult};

/// Base name used when a policy would otherwise produce an empty name.
pub const DEFAULT_BASE_NAME: &str = "current";

/// Timestamp format used when none is configured.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// File naming policy of a storage strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Add the timestamp to the file name.
    #[serde(rename = "Add Timestamp", alias = "Add the timestamp to the picture name?")]
    pub add_timestamp: bool,

    /// File name without timestamp or extension.
    #[serde(rename = "Base Name")]
    pub base_name: String,

    /// Put the timestamp before the base name (false = after it).
    #[serde(
        rename = "Timestamp At Beginning",
        alias = "Add the timestap to the beginning or the end of the name?"
    )]
    pub timestamp_at_beginning: bool,

    /// chrono strftime format of the timestamp.
    #[serde(
        rename = "Timestamp Format",
        alias = "Format string for the timestamp: "
    )]
    pub timestamp_format: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            add_timestamp: true,
            base_name: DEFAULT_BASE_NAME.to_string(),
            timestamp_at_beginning: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl StorageSettings {
    /// Policy with the given base name and default timestamp handling.
    pub fn with_base_name(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            ..Default::default()
        }
    }

    /// Repair settings that cannot produce a file name.
    ///
    /// An empty timestamp format is kept: it stamps nothing.
    pub fn validate(&mut self) {
        let stamps = self.add_timestamp && !self.timestamp_format.trim().is_empty();
        if !stamps && self.base_name.trim().is_empty() {
            self.base_name = DEFAULT_BASE_NAME.to_string();
        }
    }

    /// Format `timestamp` with the configured strftime string.
    ///
    /// Path separators in the result are replaced with `-` so the timestamp
    /// never introduces directories. Unknown specifiers are an error.
    pub fn format_timestamp(&self, timestamp: &DateTime<Local>) -> WebcamResult<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.timestamp_format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(WebcamError::InvalidTimestampFormat(
                self.timestamp_format.clone(),
            ));
        }

        let mut formatted = String::new();
        write!(formatted, "{}", timestamp.format_with_items(items.iter()))
            .map_err(|_| WebcamError::InvalidTimestampFormat(self.timestamp_format.clone()))?;

        Ok(formatted.replace(|c: char| c == '/' || c == '\\', "-"))
    }

    /// File name for a file created at `timestamp` with the given extension.
    pub fn file_name(&self, timestamp: &DateTime<Local>, extension: &str) -> WebcamResult<String> {
        let stamp = if self.add_timestamp {
            self.format_timestamp(timestamp)?
        } else {
            String::new()
        };

        let stem = match (stamp.is_empty(), self.base_name.is_empty()) {
            (true, _) => self.base_name.clone(),
            (false, true) => stamp,
            (false, false) if self.timestamp_at_beginning => {
                format!("{}_{}", stamp, self.base_name)
            }
            (false, false) => format!("{}_{}", self.base_name, stamp),
        };

        if stem.is_empty() {
            return Err(WebcamError::Other(
                "Storage naming policy produced an empty file name".to_string(),
            ));
        }

        Ok(format!("{}.{}", stem, extension))
    }
}

impl fmt::Display for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\tBase name: {}", self.base_name)?;
        writeln!(f, "\t\tAdd timestamp to picture name? {}", self.add_timestamp)?;
        writeln!(
            f,
            "\t\tAdd timestamp at the beginning of the picture name (if false, at the end)? {}",
            self.timestamp_at_beginning
        )?;
        writeln!(f, "\t\tTimestamp format string: {}", self.timestamp_format)
    }
}
