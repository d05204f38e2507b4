//! Input action binding loader.

use std::path::Path;

use ability_core::{InputBinding, InputConfig, TagRegistry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, file_name, read_file, resolve_tag};

/// One action binding as written in `input.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindingSpec {
    pub action: String,
    pub tag: String,
}

/// Input config structure for RON files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfigFile {
    pub ability_actions: Vec<BindingSpec>,
}

/// Loader for [`InputConfig`] from RON files.
pub struct InputLoader;

impl InputLoader {
    pub fn load(path: &Path, tags: &TagRegistry) -> LoadResult<InputConfig> {
        let content = read_file(path)?;
        Self::parse(&content, path, tags)
    }

    pub(crate) fn parse(content: &str, path: &Path, tags: &TagRegistry) -> LoadResult<InputConfig> {
        let file: InputConfigFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse input config RON: {}", e))?;

        let mut bindings: Vec<InputBinding> = Vec::with_capacity(file.ability_actions.len());
        for spec in file.ability_actions {
            if bindings.iter().any(|binding| binding.action == spec.action) {
                anyhow::bail!("{}: action '{}' is bound twice", file_name(path), spec.action);
            }
            let tag = resolve_tag(tags, path, &spec.tag)?;
            bindings.push(InputBinding {
                action: spec.action,
                tag,
            });
        }

        Ok(InputConfig::new(bindings))
    }
}
