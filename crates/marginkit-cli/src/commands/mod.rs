pub mod calc;
pub mod interactive;
pub mod models;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use colored::Colorize;
use marginkit_core::{Catalog, DEFAULT_PRESET_ID};
use marginkit_report::format::NumberFormat;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Html,
}

/// Everything a command needs, resolved once from config and global flags.
pub struct Context {
    pub catalog: Catalog,
    pub default_model: String,
    pub show_advanced: bool,
    pub nf: NumberFormat,
}

impl Context {
    pub fn from_config(config: Config, locale: Option<&str>) -> Result<Self> {
        let extra = config.presets.len();
        let catalog = Catalog::builtin()
            .with_extra(config.presets)
            .context("invalid [[presets]] in config")?;
        if extra > 0 {
            info!("added {} model(s) from config", extra);
        }

        let nf = NumberFormat::from_locale(locale.or(config.locale.as_deref()))?;

        let default_model = config
            .default_model
            .unwrap_or_else(|| DEFAULT_PRESET_ID.to_string());
        match catalog.find_preset(&default_model) {
            None => warn!("default_model '{}' is not in the catalog, falling back", default_model),
            Some(p) if p.advanced && !config.show_advanced => warn!(
                "default_model '{}' is an advanced model; it applies only with --advanced or show_advanced = true",
                default_model
            ),
            Some(_) => {}
        }

        Ok(Self {
            catalog,
            default_model,
            show_advanced: config.show_advanced,
            nf,
        })
    }
}

pub fn write_or_print(content: &str, out: Option<&Path>, default_file: Option<&str>) -> Result<()> {
    let target = out.map(Path::to_path_buf).or_else(|| default_file.map(PathBuf::from));
    match target {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} Written to {}", "✓".green(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginkit_core::PricingPreset;

    #[test]
    fn context_defaults() {
        let ctx = Context::from_config(Config::default(), None).unwrap();
        assert_eq!(ctx.default_model, DEFAULT_PRESET_ID);
        assert!(!ctx.show_advanced);
        assert_eq!(ctx.nf, NumberFormat::default());
        assert_eq!(ctx.catalog.len(), Catalog::builtin().len());
    }

    #[test]
    fn flag_locale_overrides_config() {
        let config = Config {
            locale: Some("xx".to_string()),
            ..Default::default()
        };
        let ctx = Context::from_config(config, Some("de")).unwrap();
        assert_eq!(ctx.nf, NumberFormat::from_locale(Some("de")).unwrap());
    }

    #[test]
    fn invalid_config_presets_are_rejected() {
        let config = Config {
            presets: vec![PricingPreset::new("gpt-4o", "dup", 1.0, 1.0, false)],
            ..Default::default()
        };
        let err = Context::from_config(config, None).err().unwrap();
        assert!(format!("{:#}", err).contains("duplicate preset id 'gpt-4o'"));
    }

    #[test]
    fn write_or_print_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_or_print("{}", Some(&path), None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
