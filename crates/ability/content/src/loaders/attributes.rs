//! Attribute schema loader.

use std::path::Path;

use ability_core::{AttributeBound, AttributeDescriptor, AttributeSchema, TagRegistry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, file_name, read_file, resolve_tag};

/// Upper bound of an attribute, naming the max attribute by string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MaxSpec {
    #[default]
    Unbounded,
    Fixed(f32),
    /// Name of a previously declared max attribute.
    Paired(String),
}

/// One attribute as written in `attributes.ron`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    pub default: f32,
    #[serde(default)]
    pub min: f32,
    #[serde(default)]
    pub max: MaxSpec,
    #[serde(default)]
    pub replicated: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Attribute catalog structure for RON files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<AttributeSpec>,
}

/// Loader for the attribute schema from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load the schema. Attributes are declared in file order, so a paired
    /// max must appear before the attribute that references it.
    pub fn load(path: &Path, tags: &TagRegistry) -> LoadResult<AttributeSchema> {
        let content = read_file(path)?;
        Self::parse(&content, path, tags)
    }

    pub(crate) fn parse(content: &str, path: &Path, tags: &TagRegistry) -> LoadResult<AttributeSchema> {
        let catalog: AttributeCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute catalog RON: {}", e))?;

        let mut schema = AttributeSchema::new();
        for spec in catalog.attributes {
            let mut descriptor =
                AttributeDescriptor::new(spec.name.as_str(), spec.default).with_min(spec.min);
            if let Some(tag) = &spec.tag {
                descriptor = descriptor.with_tag(resolve_tag(tags, path, tag)?);
            }
            descriptor = match &spec.max {
                MaxSpec::Unbounded => descriptor.with_max(AttributeBound::Unbounded),
                MaxSpec::Fixed(max) => descriptor.capped_at(*max),
                MaxSpec::Paired(max) => {
                    let max_id = schema.find(max).ok_or_else(|| {
                        anyhow::anyhow!(
                            "{}: attribute '{}' pairs with unknown attribute '{}'",
                            file_name(path),
                            spec.name,
                            max
                        )
                    })?;
                    descriptor.paired_with(max_id)
                }
            };
            if spec.replicated {
                descriptor = descriptor.replicated();
            }
            if spec.meta {
                descriptor = descriptor.meta();
            }

            schema
                .declare(descriptor)
                .map_err(|e| anyhow::anyhow!("{}: {}", file_name(path), e))?;
        }

        tracing::debug!(attributes = schema.len(), "attribute schema loaded");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::AttributeFlags;

    fn tags() -> TagRegistry {
        let mut tags = TagRegistry::new();
        tags.register("Attributes.Vital.Health", "").unwrap();
        tags.register("Attributes.Max.MaxHealth", "").unwrap();
        tags
    }

    #[test]
    fn pairs_and_flags_are_resolved() {
        let ron = r#"
            AttributeCatalog(attributes: [
                (name: "MaxHealth", tag: Some("Attributes.Max.MaxHealth"), default: 100.0, replicated: true),
                (name: "Health", tag: Some("Attributes.Vital.Health"), default: 100.0,
                 max: Paired("MaxHealth"), replicated: true),
                (name: "IncomingDamage", default: 0.0, meta: true),
            ])
        "#;
        let schema = AttributeLoader::parse(ron, Path::new("attributes.ron"), &tags()).unwrap();

        let max_health = schema.find("MaxHealth").unwrap();
        let health = schema.resolve("Health").unwrap();
        let health = schema.descriptor(health).unwrap();
        assert_eq!(health.max, AttributeBound::Paired(max_health));
        assert!(health.flags.contains(AttributeFlags::REPLICATED));
        assert!(schema.descriptor(schema.find("IncomingDamage").unwrap()).unwrap().is_meta());
    }

    #[test]
    fn unknown_pairing_names_file_and_attribute() {
        let ron = r#"
            AttributeCatalog(attributes: [
                (name: "Health", default: 100.0, max: Paired("MaxHealth")),
            ])
        "#;
        let err = AttributeLoader::parse(ron, Path::new("attributes.ron"), &tags()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("attributes.ron"));
        assert!(message.contains("MaxHealth"));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let ron = r#"
            AttributeCatalog(attributes: [
                (name: "Mana", tag: Some("Attributes.Vital.Mana"), default: 50.0),
            ])
        "#;
        let err = AttributeLoader::parse(ron, Path::new("attributes.ron"), &tags()).unwrap_err();
        assert!(err.to_string().contains("Attributes.Vital.Mana"));
    }
}
