//! `config.json`: remembered ports and logging preference.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

pub const CONFIG_FILE: &str = "config.json";

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

/// Where relay diagnostics go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsOutput {
    /// Timestamped, colored lines on stdout.
    #[default]
    Console,
    /// `tracing` events, filtered by `RUST_LOG` like the rest of the logs.
    Tracing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Substring of the input port name to pick without asking.
    #[serde(default)]
    pub input_port: Option<String>,
    /// Substring of the output port name to pick without asking.
    #[serde(default)]
    pub output_port: Option<String>,
    #[serde(default)]
    pub log_midi_events: bool,
    #[serde(default = "default_true")]
    pub report_dropped_notes: bool,
    /// How often the device list is checked for hot-plug changes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub diagnostics: DiagnosticsOutput,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_port: None,
            output_port: None,
            log_midi_events: false,
            report_dropped_notes: true,
            poll_interval_ms: default_poll_interval_ms(),
            diagnostics: DiagnosticsOutput::Console,
        }
    }
}

impl Config {
    /// Reads the config, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "input_port": "MRCC" }"#).unwrap();
        assert_eq!(config.input_port.as_deref(), Some("MRCC"));
        assert_eq!(config.output_port, None);
        assert!(!config.log_midi_events);
        assert!(config.report_dropped_notes);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.diagnostics, DiagnosticsOutput::Console);
    }

    #[test]
    fn diagnostics_can_go_to_tracing() {
        let config: Config = serde_json::from_str(r#"{ "diagnostics": "tracing" }"#).unwrap();
        assert_eq!(config.diagnostics, DiagnosticsOutput::Tracing);
        assert!(serde_json::from_str::<Config>(r#"{ "diagnostics": "syslog" }"#).is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("midi-mirror-{}.json", std::process::id()));
        let config = Config {
            input_port: Some("Keys".to_string()),
            output_port: Some("Synth".to_string()),
            log_midi_events: true,
            ..Config::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_default() {
        let path = Path::new("definitely/not/here/config.json");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("midi-mirror-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let result = Config::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(crate::Error::Json(_))));
    }
}
