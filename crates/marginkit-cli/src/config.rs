use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use marginkit_core::PricingPreset;
use serde::Deserialize;
use tracing::{debug, warn};

pub const CONFIG_ENV: &str = "MARGINKIT_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Preset selected when `--model` is not given.
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub show_advanced: bool,
    #[serde(default)]
    pub locale: Option<String>,
    /// Force colors on or off; unset means auto.
    #[serde(default)]
    pub color: Option<bool>,
    /// Extra models appended to the built-in catalog.
    #[serde(default)]
    pub presets: Vec<PricingPreset>,
}

impl Config {
    /// Load from an explicit path, `$MARGINKIT_CONFIG`, or the first
    /// readable file among the default locations.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load_from(Path::new(&path));
        }

        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("skipping config {}: {:#}", path.display(), e),
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), presets = config.presets.len(), "loaded config");
        Ok(config)
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG-style: ~/.config/marginkit/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("marginkit").join("config.toml"));
        }

        // 2. Platform config dir (Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("marginkit").join("config.toml");
            if !paths.contains(&platform) {
                paths.push(platform);
            }
        }

        // 3. ~/.marginkit.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".marginkit.toml"));
        }

        paths
    }
}
