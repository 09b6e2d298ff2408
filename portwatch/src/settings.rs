//! Application settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use port_detect::ScannerConfig;
use port_watch::WatcherConfig;
use serde::{Deserialize, Serialize};

/// Default tracing filter covering all of our crates
pub const DEFAULT_LOG_FILTER: &str = "portwatch=info,port_detect=info,port_watch=info";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// How often the port list is polled for changes (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on a single metadata lookup (ms)
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
    /// Capacity of the event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Ports whose name contains one of these are ignored
    #[serde(default = "ScannerConfig::default_skip_patterns")]
    pub skip_patterns: Vec<String>,
    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_resolve_timeout_ms() -> u64 {
    2000
}

fn default_event_buffer() -> usize {
    256
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
            event_buffer: default_event_buffer(),
            skip_patterns: ScannerConfig::default_skip_patterns(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for portwatch
    /// Uses $XDG_CONFIG_HOME/portwatch on Linux/macOS, falls back to ~/.config/portwatch
    fn config_dir() -> Option<PathBuf> {
        // First try XDG_CONFIG_HOME environment variable
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("portwatch"));
            }
        }

        // Fall back to ~/.config/portwatch (XDG default)
        dirs::home_dir().map(|h| h.join(".config").join("portwatch"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults if it is missing
    /// or unreadable
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;

        Ok(())
    }

    /// Poll interval for the change source
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Scanner configuration derived from these settings
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            skip_patterns: self.skip_patterns.clone(),
        }
    }

    /// Watcher configuration derived from these settings
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            resolve_timeout: Duration::from_millis(self.resolve_timeout_ms),
            event_buffer: self.event_buffer,
            ..WatcherConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("portwatch-test-{}-{}", std::process::id(), name))
            .join("settings.json")
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "poll_interval_ms": 1000 }"#).unwrap();
        assert_eq!(settings.poll_interval_ms, 1000);
        assert_eq!(settings.resolve_timeout_ms, 2000);
        assert_eq!(settings.skip_patterns, vec!["Bluetooth", "debug"]);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let path = scratch_path("missing");
        assert_eq!(Settings::load_from(&path), Settings::default());

        let path = scratch_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn save_then_load() {
        let path = scratch_path("save");
        let settings = Settings {
            poll_interval_ms: 100,
            skip_patterns: vec!["ttyS".to_string()],
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn derived_configs() {
        let settings = Settings {
            resolve_timeout_ms: 500,
            event_buffer: 16,
            poll_interval_ms: 0,
            ..Default::default()
        };

        let watcher = settings.watcher_config();
        assert_eq!(watcher.resolve_timeout, Duration::from_millis(500));
        assert_eq!(watcher.event_buffer, 16);
        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
        assert_eq!(settings.scanner_config().skip_patterns, vec!["Bluetooth", "debug"]);
    }
}
