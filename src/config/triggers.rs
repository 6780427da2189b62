//! Take-picture trigger configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// When the camera subsystem should take a picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSettings {
    /// Take pictures on a fixed interval.
    #[serde(rename = "Enabled")]
    pub enabled: bool,

    /// Seconds between two pictures (1-86400).
    #[serde(rename = "Interval Seconds")]
    pub interval_secs: u32,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
        }
    }
}

impl TriggerSettings {
    /// Clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.interval_secs = self.interval_secs.clamp(1, 86_400);
    }

    /// Interval between pictures, or None when the trigger is off.
    pub fn interval(&self) -> Option<Duration> {
        self.enabled
            .then(|| Duration::from_secs(u64::from(self.interval_secs)))
    }
}

impl fmt::Display for TriggerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\tInterval trigger enabled? {}", self.enabled)?;
        writeln!(f, "\t\tInterval (seconds): {}", self.interval_secs)
    }
}
