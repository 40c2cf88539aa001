//! Host configuration
//!
//! Resolves the simulation configuration the host starts with.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. `variant` key in the config file
//! 2. Environment variable: `JENGA_VARIANT=gentle`
//! 3. Config file: `$JENGA_CONFIG`, else `jenga.toml` in the working directory
//! 4. Built-in defaults (standard variant)
//!
//! # Example Config File
//!
//! ```toml
//! variant = "standard"  # standard, gentle
//!
//! [tower]
//! rows = 18
//! columns = 3
//!
//! [interaction]
//! removal_delay_ms = 150
//!
//! [view]
//! max_pixel_ratio = 2.0
//! ```

use std::path::{Path, PathBuf};

use jenga_sim::{SimConfig, Variant};

use crate::error::{AppError, Result};

/// Default config file name
pub const CONFIG_FILE: &str = "jenga.toml";
/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "JENGA_CONFIG";
/// Environment variable naming the base variant
pub const VARIANT_ENV: &str = "JENGA_VARIANT";

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

/// Configuration the host runs with
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub sim: SimConfig,
    pub variant: Variant,
    pub source: ConfigSource,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            variant: Variant::Standard,
            source: ConfigSource::Defaults,
        }
    }
}

impl HostConfig {
    /// Load from the environment and the working directory
    ///
    /// Falls back to defaults with a warning when anything is wrong.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let variant = std::env::var(VARIANT_ENV).ok();

        match Self::load_from(&path, variant.as_deref()) {
            Ok(config) => {
                match &config.source {
                    ConfigSource::File(path) => {
                        log::info!("Loaded config from {} ({} variant)", path.display(), config.variant)
                    }
                    ConfigSource::Defaults => {
                        log::info!("No config file at {}, using {} defaults", path.display(), config.variant)
                    }
                }
                config
            }
            Err(e) => {
                log::warn!("Config ignored: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path` if it exists, with `variant` as the base when the file names none
    pub fn load_from(path: &Path, variant: Option<&str>) -> Result<Self> {
        if !path.exists() {
            return Self::resolve(None, variant, ConfigSource::Defaults);
        }
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::resolve(Some(&text), variant, ConfigSource::File(path.to_path_buf()))
    }

    /// Build from optional file contents and an optional variant name
    pub fn resolve(file: Option<&str>, variant: Option<&str>, source: ConfigSource) -> Result<Self> {
        let fallback = match variant {
            Some(name) => name.parse()?,
            None => Variant::Standard,
        };
        let (sim, variant) = SimConfig::from_toml_str_with_variant(file.unwrap_or_default(), fallback)?;
        Ok(Self { sim, variant, source })
    }

    pub fn print_summary(&self) {
        let tower = &self.sim.tower;
        log::info!("=== Jenga Config ===");
        log::info!("  Variant: {}", self.variant);
        log::info!("  Tower: {} rows x {} columns", tower.rows, tower.columns);
        log::info!("  Gravity: {:?}", self.sim.physics.gravity);
        log::info!("  Removal delay: {} ms", self.sim.interaction.removal_delay_ms);
        log::info!("====================");
    }
}

/// Value of the `variant` parameter in a URL query string such as `?variant=gentle`
pub fn variant_from_query(query: &str) -> Option<&str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "variant")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_no_variant_is_default() {
        let config = HostConfig::resolve(None, None, ConfigSource::Defaults).unwrap();
        assert_eq!(config.variant, Variant::Standard);
        assert_eq!(config.sim, SimConfig::default());
    }

    #[test]
    fn test_env_variant_is_base() {
        let config = HostConfig::resolve(Some("[tower]\nrows = 5\n"), Some("gentle"), ConfigSource::Defaults).unwrap();
        assert_eq!(config.variant, Variant::Gentle);
        assert_eq!(config.sim.tower.rows, 5);
        assert_eq!(config.sim.interaction.removal_delay_ms, 500);
    }

    #[test]
    fn test_file_variant_wins() {
        let config = HostConfig::resolve(Some("variant = \"standard\"\n"), Some("gentle"), ConfigSource::Defaults).unwrap();
        assert_eq!(config.variant, Variant::Standard);
    }

    #[test]
    fn test_bad_variant_is_error() {
        assert!(HostConfig::resolve(None, Some("wobbly"), ConfigSource::Defaults).is_err());
        assert!(HostConfig::resolve(Some("variant = 3\n"), None, ConfigSource::Defaults).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = HostConfig::load_from(Path::new("definitely/not/here/jenga.toml"), None).unwrap();
        assert_eq!(config.source, ConfigSource::Defaults);
    }

    #[test]
    fn test_variant_from_query() {
        assert_eq!(variant_from_query("?variant=gentle"), Some("gentle"));
        assert_eq!(variant_from_query("?debug=1&variant=standard"), Some("standard"));
        assert_eq!(variant_from_query("?variant="), None);
        assert_eq!(variant_from_query(""), None);
        assert_eq!(variant_from_query("?variants=gentle"), None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = HostConfig::resolve(Some("[interaction]\nremoval_delay_ms = 9000\n"), None, ConfigSource::Defaults);
        assert!(matches!(result, Err(AppError::Sim(_))));
    }
}
