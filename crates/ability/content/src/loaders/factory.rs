//! Content factory for building core types from data files.

use std::path::{Path, PathBuf};

use ability_core::{AttributeSchema, CoreConfig, EffectLibrary, InputConfig, TagRegistry};

use crate::loaders::{
    AbilityContent, AbilityLoader, AttributeLoader, ConfigLoader, EffectLoader, InputLoader,
    LoadResult,
};

/// Content factory that loads all ability content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attributes.ron
/// ├── effects.ron
/// ├── abilities.ron
/// └── input.ron
/// ```
///
/// Tags are never created from data: every tag a file names must already be
/// registered (normally by [`ability_core::NativeTags::initialize`]).
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load core configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CoreConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the attribute schema from `attributes.ron`.
    pub fn load_attributes(&self, tags: &TagRegistry) -> LoadResult<AttributeSchema> {
        AttributeLoader::load(&self.data_dir.join("attributes.ron"), tags)
    }

    /// Load the effect library from `effects.ron`.
    pub fn load_effects(&self, schema: &AttributeSchema, tags: &TagRegistry) -> LoadResult<EffectLibrary> {
        EffectLoader::load(&self.data_dir.join("effects.ron"), schema, tags)
    }

    /// Load ability classes and startup grants from `abilities.ron`.
    pub fn load_abilities(&self, tags: &TagRegistry) -> LoadResult<AbilityContent> {
        AbilityLoader::load(&self.data_dir.join("abilities.ron"), tags)
    }

    /// Load input action bindings from `input.ron`.
    pub fn load_input(&self, tags: &TagRegistry) -> LoadResult<InputConfig> {
        InputLoader::load(&self.data_dir.join("input.ron"), tags)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::{ActorRole, AttributeBound, NativeTags, attributes::names};
    use tempfile::TempDir;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_content_loads_against_native_tags() {
        let factory = ContentFactory::bundled();
        let config = factory.load_config().unwrap();
        let mut tags = TagRegistry::with_config(&config);
        let native = NativeTags::initialize(&mut tags).unwrap();

        let schema = factory.load_attributes(&tags).unwrap();
        let health = schema.resolve(names::HEALTH).unwrap();
        assert_eq!(schema.descriptor(health).unwrap().tag, Some(native.attributes_vital_health));
        assert!(schema.find(names::MOVE_SPEED).is_some());

        let effects = factory.load_effects(&schema, &tags).unwrap();
        let sprint = effects.require("GE_Sprint").unwrap();
        assert!(sprint.granted_tags.has_exact(native.state_sprint));

        let abilities = factory.load_abilities(&tags).unwrap();
        let sprint_class = abilities.catalog.resolve("GA_Sprint").unwrap();
        assert_eq!(sprint_class.startup_input_tag, Some(native.input_sprint));
        assert!(abilities.startup_for(ActorRole::Player).is_some());
        assert!(abilities.startup_for(ActorRole::Enemy).is_some());

        let input = factory.load_input(&tags).unwrap();
        assert_eq!(input.find_tag_for_action("IA_Sprint"), Some(native.input_sprint));
    }

    /// `max` with paired ids replaced by the paired attribute's name.
    fn bound_by_name(schema: &AttributeSchema, bound: AttributeBound) -> String {
        match bound {
            AttributeBound::Paired(id) => schema
                .descriptor(id)
                .map(|d| format!("Paired({})", d.name))
                .unwrap_or_default(),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn bundled_attributes_match_the_character_schema() {
        let mut tags = TagRegistry::new();
        let native = NativeTags::initialize(&mut tags).unwrap();
        let declared = AttributeSchema::character(&native).unwrap();
        let loaded = ContentFactory::bundled().load_attributes(&tags).unwrap();

        assert_eq!(loaded.len(), declared.len());
        for (_, expected) in declared.iter() {
            let id = loaded.resolve(&expected.name).unwrap();
            let actual = loaded.descriptor(id).unwrap();
            assert_eq!(actual.tag, expected.tag, "{}", expected.name);
            assert_eq!(actual.default_value, expected.default_value, "{}", expected.name);
            assert_eq!(actual.min_value, expected.min_value, "{}", expected.name);
            assert_eq!(actual.flags, expected.flags, "{}", expected.name);
            assert_eq!(
                bound_by_name(&loaded, actual.max),
                bound_by_name(&declared, expected.max),
                "{}",
                expected.name
            );
        }
    }

    #[test]
    fn missing_file_names_its_path() {
        let temp_dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(temp_dir.path());

        let err = factory.load_config().unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn loads_from_a_written_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "default_effect_level = 3.0\nreclamp_on_max_change = false\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("attributes.ron"),
            r#"AttributeCatalog(attributes: [(name: "Stamina", default: 100.0)])"#,
        )
        .unwrap();

        let factory = ContentFactory::new(temp_dir.path());
        let config = factory.load_config().unwrap();
        assert_eq!(config.default_effect_level, 3.0);
        assert!(!config.reclamp_on_max_change);

        let schema = factory.load_attributes(&TagRegistry::new()).unwrap();
        assert_eq!(schema.len(), 1);
    }
}
