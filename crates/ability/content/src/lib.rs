//! Data-driven ability content and its loaders.
//!
//! Turns RON/TOML data assets into `ability-core` types:
//! - Core tunables (TOML)
//! - The attribute schema (RON)
//! - The effect library (RON)
//! - Ability classes and per-role startup grants (RON)
//! - Input action bindings (RON)
//!
//! Data files name tags and attributes by string. Loaders resolve every name
//! against an already initialized [`ability_core::TagRegistry`] or the loaded
//! [`ability_core::AttributeSchema`] and fail with a message naming the file
//! and the identifier when one is unknown.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityContent, AbilityLoader, AttributeLoader, ConfigLoader, ContentFactory, EffectLoader,
    InputLoader, LoadResult, StartupGrants,
};
