//! Sandbox configuration loaded from the environment.

use std::env;
use std::path::PathBuf;

use ability_content::ContentFactory;
use ability_core::attributes::names;

/// Where content comes from and which attribute drives movement.
#[derive(Clone, Debug)]
pub struct SandboxConfig {
    pub data_dir: PathBuf,
    pub move_speed_attribute: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            data_dir: ContentFactory::bundled().data_dir().to_path_buf(),
            move_speed_attribute: names::MOVE_SPEED.to_owned(),
        }
    }
}

impl SandboxConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ABILITY_DATA_DIR` - Content directory (default: the data bundled with ability-content)
    /// - `SANDBOX_MOVE_SPEED_ATTRIBUTE` - Attribute mirrored into the walk speed cap (default: `MoveSpeed`)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("ABILITY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(name) = env::var("SANDBOX_MOVE_SPEED_ATTRIBUTE") {
            if !name.is_empty() {
                config.move_speed_attribute = name;
            }
        }

        config
    }
}
