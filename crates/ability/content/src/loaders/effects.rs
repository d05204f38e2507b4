//! Effect library loader.

use std::path::Path;

use ability_core::{
    AttributeSchema, EffectDescriptor, EffectDuration, EffectLibrary, ModifierInfo, ModifierOp,
    TagRegistry,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, file_name, read_file, resolve_tag};

/// One modifier as written in `effects.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub attribute: String,
    #[serde(default)]
    pub op: ModifierOp,
    pub magnitude: f32,
}

/// One effect as written in `effects.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub name: String,
    #[serde(default)]
    pub duration: EffectDuration,
    #[serde(default)]
    pub modifiers: Vec<ModifierSpec>,
    #[serde(default)]
    pub granted_tags: Vec<String>,
}

/// Effect catalog structure for RON files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<EffectEntry>,
}

/// Loader for the effect library from RON files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load every effect, resolving attribute names against `schema` and tag
    /// names against `tags`. Each descriptor is validated before it is
    /// accepted.
    pub fn load(path: &Path, schema: &AttributeSchema, tags: &TagRegistry) -> LoadResult<EffectLibrary> {
        let content = read_file(path)?;
        Self::parse(&content, path, schema, tags)
    }

    pub(crate) fn parse(
        content: &str,
        path: &Path,
        schema: &AttributeSchema,
        tags: &TagRegistry,
    ) -> LoadResult<EffectLibrary> {
        let catalog: EffectCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;

        let mut library = EffectLibrary::new();
        for entry in catalog.effects {
            if library.contains(&entry.name) {
                anyhow::bail!("{}: effect '{}' is defined twice", file_name(path), entry.name);
            }

            let mut descriptor = EffectDescriptor::new(entry.name.as_str(), entry.duration);
            for modifier in &entry.modifiers {
                let attribute = schema.find(&modifier.attribute).ok_or_else(|| {
                    anyhow::anyhow!(
                        "{}: effect '{}' modifies unknown attribute '{}'",
                        file_name(path),
                        entry.name,
                        modifier.attribute
                    )
                })?;
                descriptor = descriptor.with_modifier(ModifierInfo::new(
                    attribute,
                    modifier.op,
                    modifier.magnitude,
                ));
            }
            for tag in &entry.granted_tags {
                descriptor = descriptor.granting(resolve_tag(tags, path, tag)?);
            }

            descriptor
                .validate(schema)
                .map_err(|e| anyhow::anyhow!("{}: {}", file_name(path), e))?;
            library.insert(descriptor);
        }

        tracing::debug!(effects = library.len(), "effect library loaded");
        Ok(library)
    }
}
