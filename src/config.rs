use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::Result;
use crate::timer::TimerKind;

pub const MIN_MINUTES: u64 = 1;
pub const MAX_MINUTES: u64 = 60;

// ============================================================================
// Config
// ============================================================================

/// Per-type durations, keyed in the file by the preset labels.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimerTable {
    #[serde(rename = "Focus-Short")]
    pub focus_short: u64,
    #[serde(rename = "Focus-Long")]
    pub focus_long: u64,
    #[serde(rename = "Break-Short")]
    pub break_short: u64,
    #[serde(rename = "Break-Long")]
    pub break_long: u64,
}

impl TimerTable {
    pub fn minutes(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::FocusShort => self.focus_short,
            TimerKind::FocusLong => self.focus_long,
            TimerKind::BreakShort => self.break_short,
            TimerKind::BreakLong => self.break_long,
        }
    }

    pub fn set_minutes(&mut self, kind: TimerKind, minutes: u64) {
        match kind {
            TimerKind::FocusShort => self.focus_short = minutes,
            TimerKind::FocusLong => self.focus_long = minutes,
            TimerKind::BreakShort => self.break_short = minutes,
            TimerKind::BreakLong => self.break_long = minutes,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Config {
    pub timer: TimerTable,
    /// Alarm sound by base filename, extension stripped.
    pub alarm: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerTable {
                focus_short: 25,
                focus_long: 50,
                break_short: 5,
                break_long: 15,
            },
            alarm: "alarm".into(),
        }
    }
}

impl Config {
    /// Load the config, writing defaults on the very first run. Read and
    /// parse failures are fatal to startup and propagate to main.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Persist wholesale, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Validate a settings-form duration field. The message is user-facing.
pub fn parse_minutes(input: &str) -> std::result::Result<u64, String> {
    let minutes: u64 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of minutes", input.trim()))?;
    if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        return Err(format!(
            "duration must be {MIN_MINUTES}-{MAX_MINUTES} minutes, got {minutes}"
        ));
    }
    Ok(minutes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // Second load reads what the first wrote.
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn file_uses_preset_labels_as_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["timer"]["Focus-Short"], 25);
        assert_eq!(value["timer"]["Focus-Long"], 50);
        assert_eq!(value["timer"]["Break-Short"], 5);
        assert_eq!(value["timer"]["Break-Long"], 15);
        assert_eq!(value["alarm"], "alarm");
    }

    #[test]
    fn corrupt_config_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn minutes_lookup_by_kind() {
        let mut table = Config::default().timer;
        assert_eq!(table.minutes(TimerKind::FocusShort), 25);
        assert_eq!(table.minutes(TimerKind::BreakLong), 15);
        table.set_minutes(TimerKind::BreakLong, 20);
        assert_eq!(table.minutes(TimerKind::BreakLong), 20);
    }

    #[test]
    fn duration_validation_bounds() {
        assert_eq!(parse_minutes("1"), Ok(1));
        assert_eq!(parse_minutes("60"), Ok(60));
        assert_eq!(parse_minutes(" 25 "), Ok(25));
        assert!(parse_minutes("0").is_err());
        assert!(parse_minutes("61").is_err());
        assert!(parse_minutes("-5").is_err());
        assert!(parse_minutes("2.5").is_err());
        assert!(parse_minutes("ten").is_err());
    }
}
