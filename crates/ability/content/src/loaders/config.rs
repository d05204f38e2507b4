//! Core configuration loader.

use std::path::Path;

use ability_core::CoreConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CoreConfig`] from TOML files. Missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<CoreConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CoreConfig> {
        let config: CoreConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if !config.default_effect_level.is_finite() {
            anyhow::bail!(
                "config.toml: default_effect_level must be finite, got {}",
                config.default_effect_level
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("default_effect_level = 2.0\n").unwrap();
        assert_eq!(config.default_effect_level, 2.0);
        assert_eq!(
            config.reclamp_on_max_change,
            CoreConfig::default().reclamp_on_max_change
        );
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(ConfigLoader::parse("default_effect_level = \"high\"").is_err());
    }
}
