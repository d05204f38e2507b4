//! Content loaders for reading ability data from files.

pub mod abilities;
pub mod attributes;
pub mod config;
pub mod effects;
pub mod factory;
pub mod input;

pub use abilities::{AbilityContent, AbilityLoader, StartupGrants};
pub use attributes::AttributeLoader;
pub use config::ConfigLoader;
pub use effects::EffectLoader;
pub use factory::ContentFactory;
pub use input::InputLoader;

use std::path::Path;

use ability_core::{TagHandle, TagRegistry};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Resolves a tag named in a data file.
pub(crate) fn resolve_tag(tags: &TagRegistry, path: &Path, name: &str) -> LoadResult<TagHandle> {
    tags.find(name).ok_or_else(|| {
        anyhow::anyhow!("{}: unknown gameplay tag '{}'", file_name(path), name)
    })
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
