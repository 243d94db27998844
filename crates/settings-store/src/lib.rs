use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracker_core::WatchlistEntry;

/// Everything user-visible that survives a restart, as one JSON document.
/// Written on every state change, read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    pub watchlist: Vec<WatchlistEntry>,
    pub timeframe: String,
    pub chart_type: String,
    pub indicators: BTreeMap<String, bool>,
    pub view_mode: u8,
    pub news_tickers: Vec<String>,
    pub popup_duration_s: u64,
    pub ssl_verify: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            timeframe: "1y".to_string(),
            chart_type: "candle".to_string(),
            indicators: BTreeMap::from([("rsi".to_string(), false)]),
            view_mode: 1,
            news_tickers: [
                "GC=F", "CL=F", "^GSPC", "NVDA", "MSFT", "GOOGL", "TSLA", "AAPL",
            ]
            .map(str::to_string)
            .to_vec(),
            popup_duration_s: 5,
            ssl_verify: true,
        }
    }
}

impl SettingsSnapshot {
    /// Flyout popup duration, clamped to the dialog's 2..=30s range.
    pub fn popup_duration_clamped(&self) -> u64 {
        self.popup_duration_s.clamp(2, 30)
    }
}

/// Loads and saves the settings snapshot. A missing or malformed file never
/// fails startup; it just means defaults.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> SettingsSnapshot {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::info!("no settings file at {}, using defaults", self.path.display());
                return SettingsSnapshot::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "malformed settings file {} ({}), using defaults",
                    self.path.display(),
                    e
                );
                SettingsSnapshot::default()
            }
        }
    }

    /// Write via a temp file in the same directory, then rename, so a crash
    /// mid-write never leaves a truncated snapshot behind.
    pub fn save(&self, snapshot: &SettingsSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
