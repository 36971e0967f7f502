//! Engine configuration (`~/.followup/config.json`).
//!
//! Every field has a default so an absent or partial file is valid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub submission_timeout_secs: u64,
    /// Used when no participant carries a parseable timezone.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default)]
    pub working_hours: WorkingHours,
    #[serde(default = "default_slot_step_minutes")]
    pub slot_step_minutes: u32,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

/// Local working day, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_slot_step_minutes() -> u32 {
    30
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_timeout_secs(),
            submission_timeout_secs: default_timeout_secs(),
            default_timezone: default_timezone(),
            working_hours: WorkingHours::default(),
            slot_step_minutes: default_slot_step_minutes(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl EngineConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_secs)
    }

    pub fn default_tz(&self) -> Option<Tz> {
        self.default_timezone.parse::<Tz>().ok()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_timeout_secs == 0 || self.submission_timeout_secs == 0 {
            return Err("Timeouts must be at least one second".into());
        }
        let hours = self.working_hours;
        if hours.start_hour >= hours.end_hour || hours.end_hour > 24 {
            return Err(format!(
                "Invalid working hours: {}-{}",
                hours.start_hour, hours.end_hour
            ));
        }
        if self.slot_step_minutes == 0 {
            return Err("slotStepMinutes must be positive".into());
        }
        if self.max_suggestions == 0 {
            return Err("maxSuggestions must be positive".into());
        }
        if self.default_tz().is_none() {
            return Err(format!("Unknown timezone: {}", self.default_timezone));
        }
        Ok(())
    }
}

/// Default config location.
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".followup").join("config.json"))
}

/// Load config from the default location, falling back to defaults when absent.
pub fn load_config() -> Result<EngineConfig, String> {
    load_config_from(&config_path()?)
}

/// Load config from an explicit path, falling back to defaults when absent.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, String> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: EngineConfig =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    config.validate()?;
    Ok(config)
}
