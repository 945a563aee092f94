use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Framework container classes that behave as clickable widgets even though
/// their tags carry no click semantics. Angular Material and Bootstrap
/// classes cover the enterprise UIs this engine is pointed at; extend via
/// the config file for in-house design systems.
fn default_clickable_classes() -> Vec<String> {
    [
        "mat-button",
        "mat-icon-button",
        "mat-raised-button",
        "mat-menu-item",
        "mat-list-item",
        "btn",
        "dropdown-item",
        "nav-link",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Engine tuning knobs. Every field has a default; a config file only needs
/// the keys it overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Budget for one descriptor attempt (locate + one click tier / fill).
    pub per_attempt_timeout_ms: u64,
    /// Overall budget for semantic waits.
    pub wait_timeout_ms: u64,
    /// Budget for each iframe-resolution step.
    pub frame_timeout_ms: u64,
    /// Interval between polls in waits and element lookups.
    pub poll_interval_ms: u64,
    /// Visible text is truncated to this many characters in snapshots.
    pub text_truncate: usize,
    /// Attribute used by the test-id locating strategy.
    pub test_id_attribute: String,
    /// Case-insensitive name matching in semantic waits.
    pub case_insensitive_names: bool,
    /// Class names treated as clickable widgets during inspection.
    pub clickable_classes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout_ms: 5_000,
            wait_timeout_ms: 10_000,
            frame_timeout_ms: 5_000,
            poll_interval_ms: 500,
            text_truncate: 120,
            test_id_attribute: "data-testid".to_string(),
            case_insensitive_names: true,
            clickable_classes: default_clickable_classes(),
        }
    }
}

impl EngineConfig {
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.per_attempt_timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Default location of the user config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("webgrip").join("config.json"))
    }

    /// Load from an explicit path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the user config if one exists, else defaults. An explicit path
    /// must exist; the default path is allowed to be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = Self::default_path()
            && path.exists()
        {
            return Self::from_file(&path);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
