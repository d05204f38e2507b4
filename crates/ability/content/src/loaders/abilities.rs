//! Ability catalog and startup grant loader.

use std::path::Path;

use ability_core::{AbilityCatalog, AbilityClassId, ActorRole, InstancingPolicy, TagHandle, TagRegistry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, file_name, read_file, resolve_tag};

/// One ability class as written in `abilities.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityClassSpec {
    pub name: String,
    #[serde(default)]
    pub ability_tag: Option<String>,
    #[serde(default)]
    pub instancing: InstancingPolicy,
    #[serde(default)]
    pub startup_input_tag: Option<String>,
}

/// Abilities every actor of `role` starts with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartupSpec {
    pub role: ActorRole,
    pub abilities: Vec<String>,
    #[serde(default)]
    pub status_tags: Vec<String>,
}

/// Ability catalog structure for RON files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityCatalogFile {
    pub classes: Vec<AbilityClassSpec>,
    #[serde(default)]
    pub startup: Vec<StartupSpec>,
}

/// Resolved startup grants for one role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartupGrants {
    pub role: ActorRole,
    pub classes: Vec<AbilityClassId>,
    pub status_tags: Vec<TagHandle>,
}

/// Everything `abilities.ron` produces.
#[derive(Clone, Debug, Default)]
pub struct AbilityContent {
    pub catalog: AbilityCatalog,
    pub startup: Vec<StartupGrants>,
}

impl AbilityContent {
    /// Startup grants for `role`, if the data lists any.
    pub fn startup_for(&self, role: ActorRole) -> Option<&StartupGrants> {
        self.startup.iter().find(|grants| grants.role == role)
    }
}

/// Loader for ability classes and startup grants from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path, tags: &TagRegistry) -> LoadResult<AbilityContent> {
        let content = read_file(path)?;
        Self::parse(&content, path, tags)
    }

    pub(crate) fn parse(content: &str, path: &Path, tags: &TagRegistry) -> LoadResult<AbilityContent> {
        let file: AbilityCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        let mut catalog = AbilityCatalog::new();
        for spec in &file.classes {
            let ability_tag = spec
                .ability_tag
                .as_deref()
                .map(|name| resolve_tag(tags, path, name))
                .transpose()?;
            let startup_input_tag = spec
                .startup_input_tag
                .as_deref()
                .map(|name| resolve_tag(tags, path, name))
                .transpose()?;

            let class = catalog
                .register(&spec.name)
                .map_err(|e| anyhow::anyhow!("{}: {}", file_name(path), e))?;
            class.with_instancing(spec.instancing);
            if let Some(tag) = ability_tag {
                class.with_ability_tag(tag);
            }
            if let Some(tag) = startup_input_tag {
                class.with_startup_input_tag(tag);
            }
        }

        let mut startup = Vec::with_capacity(file.startup.len());
        for spec in &file.startup {
            if startup.iter().any(|grants: &StartupGrants| grants.role == spec.role) {
                anyhow::bail!("{}: startup grants for {} listed twice", file_name(path), spec.role);
            }
            let classes = spec
                .abilities
                .iter()
                .map(|name| {
                    catalog.find(name).map(|class| class.id).ok_or_else(|| {
                        anyhow::anyhow!(
                            "{}: startup grant for {} names unknown ability '{}'",
                            file_name(path),
                            spec.role,
                            name
                        )
                    })
                })
                .collect::<LoadResult<Vec<_>>>()?;
            let status_tags = spec
                .status_tags
                .iter()
                .map(|name| resolve_tag(tags, path, name))
                .collect::<LoadResult<Vec<_>>>()?;
            startup.push(StartupGrants {
                role: spec.role,
                classes,
                status_tags,
            });
        }

        tracing::debug!(
            classes = catalog.len(),
            roles = startup.len(),
            "ability catalog loaded"
        );
        Ok(AbilityContent { catalog, startup })
    }
}
