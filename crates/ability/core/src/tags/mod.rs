//! Hierarchical gameplay tags.
//!
//! A tag is a dotted identifier (`State.IFrame`, `Attributes.Vital.Health`)
//! interned into a [`TagRegistry`] and referred to everywhere else by a
//! [`TagHandle`]. Handles compare in O(1); ancestor matching walks the parent
//! links recorded at registration time and never touches strings.
//!
//! # Lifecycle
//!
//! 1. Build a registry and call [`NativeTags::initialize`] (plus any content
//!    tags) once at session start.
//! 2. Wrap the registry in `Arc` and hand it to every consumer.
//! 3. From then on the registry is read-only, so concurrent reads need no lock.

mod container;
mod native;

use std::collections::HashMap;

pub use container::TagContainer;
pub use native::NativeTags;

use crate::config::CoreConfig;
use crate::error::{CoreError, ErrorSeverity};

/// Canonical handle to a registered tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagHandle(u32);

impl TagHandle {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Exact match: same registered identifier.
    #[inline]
    pub fn matches_exact(self, other: TagHandle) -> bool {
        self == other
    }
}

/// Why a tag name was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidTagReason {
    Empty,
    /// Leading, trailing, or doubled separator.
    EmptySegment,
    InvalidCharacter(char),
    TooDeep { depth: usize },
}

impl core::fmt::Display for InvalidTagReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "name is empty"),
            Self::EmptySegment => write!(f, "name contains an empty segment"),
            Self::InvalidCharacter(c) => write!(f, "invalid character {c:?}"),
            Self::TooDeep { depth } => write!(
                f,
                "depth {depth} exceeds the maximum of {}",
                CoreConfig::MAX_TAG_DEPTH
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("invalid tag name '{name}': {reason}")]
    InvalidTagName {
        name: String,
        reason: InvalidTagReason,
    },

    #[error("tag '{0}' is not registered")]
    NotFound(String),
}

impl CoreError for TagError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTagName { .. } => ErrorSeverity::Internal,
            Self::NotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTagName { .. } => "invalid_tag_name",
            Self::NotFound(_) => "tag_not_found",
        }
    }
}

#[derive(Clone, Debug)]
struct TagNode {
    name: String,
    comment: String,
    parent: Option<TagHandle>,
}

/// Interning table from dotted names to [`TagHandle`]s.
#[derive(Clone, Debug)]
pub struct TagRegistry {
    nodes: Vec<TagNode>,
    by_name: HashMap<String, TagHandle>,
    log_registration: bool,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::with_config(&CoreConfig::default())
    }

    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            log_registration: config.log_tag_registration,
        }
    }

    /// Registers `name`, returning the existing handle if it is already known.
    ///
    /// Ancestors (`A` and `A.B` for `A.B.C`) are registered implicitly with an
    /// empty comment. A malformed name leaves the registry untouched.
    pub fn register(&mut self, name: &str, comment: &str) -> Result<TagHandle, TagError> {
        if let Err(err) = validate_name(name) {
            tracing::error!(tag = name, error = %err, "rejected malformed gameplay tag");
            return Err(err);
        }

        if let Some(&handle) = self.by_name.get(name) {
            let node = &mut self.nodes[handle.index()];
            if node.comment.is_empty() && !comment.is_empty() {
                node.comment = comment.to_owned();
            }
            return Ok(handle);
        }

        let mut parent = None;
        for (end, _) in name.match_indices('.') {
            parent = Some(self.intern(&name[..end], "", parent));
        }
        let handle = self.intern(name, comment, parent);

        if self.log_registration {
            tracing::debug!(tag = name, comment, "gameplay tag registered");
        }
        Ok(handle)
    }

    fn intern(&mut self, name: &str, comment: &str, parent: Option<TagHandle>) -> TagHandle {
        if let Some(&handle) = self.by_name.get(name) {
            return handle;
        }
        let handle = TagHandle(self.nodes.len() as u32);
        self.nodes.push(TagNode {
            name: name.to_owned(),
            comment: comment.to_owned(),
            parent,
        });
        self.by_name.insert(name.to_owned(), handle);
        handle
    }

    /// Looks up a registered name.
    pub fn resolve(&self, name: &str) -> Result<TagHandle, TagError> {
        self.find(name)
            .ok_or_else(|| TagError::NotFound(name.to_owned()))
    }

    pub fn find(&self, name: &str) -> Option<TagHandle> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, tag: TagHandle) -> Option<&str> {
        self.nodes.get(tag.index()).map(|node| node.name.as_str())
    }

    pub fn comment(&self, tag: TagHandle) -> Option<&str> {
        self.nodes.get(tag.index()).map(|node| node.comment.as_str())
    }

    pub fn parent(&self, tag: TagHandle) -> Option<TagHandle> {
        self.nodes.get(tag.index()).and_then(|node| node.parent)
    }

    pub fn matches_exact(&self, a: TagHandle, b: TagHandle) -> bool {
        a.matches_exact(b)
    }

    /// True if `child` equals `parent` or lies beneath it in the hierarchy.
    pub fn matches_ancestor(&self, parent: TagHandle, child: TagHandle) -> bool {
        let mut current = Some(child);
        while let Some(tag) = current {
            if tag == parent {
                return true;
            }
            current = self.parent(tag);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates `(handle, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TagHandle, &str)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (TagHandle(index as u32), node.name.as_str()))
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> Result<(), TagError> {
    let invalid = |reason| TagError::InvalidTagName {
        name: name.to_owned(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid(InvalidTagReason::Empty));
    }

    let mut depth = 0;
    for segment in name.split('.') {
        depth += 1;
        if segment.is_empty() {
            return Err(invalid(InvalidTagReason::EmptySegment));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(invalid(InvalidTagReason::InvalidCharacter(c)));
        }
    }

    if depth > CoreConfig::MAX_TAG_DEPTH {
        return Err(invalid(InvalidTagReason::TooDeep { depth }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut registry = TagRegistry::new();
        let first = registry.register("State.IFrame", "invulnerable").unwrap();
        let second = registry.register("State.IFrame", "").unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.comment(first), Some("invulnerable"));
    }

    #[test]
    fn distinct_names_get_distinct_handles() {
        let mut registry = TagRegistry::new();
        let a = registry.register("State.IFrame", "").unwrap();
        let b = registry.register("State.HyperArmor", "").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.resolve("State.IFrame"), Ok(a));
        assert_eq!(registry.resolve("State.HyperArmor"), Ok(b));
    }

    #[test]
    fn ancestors_are_registered_implicitly() {
        let mut registry = TagRegistry::new();
        let health = registry
            .register("Attributes.Vital.Health", "current health")
            .unwrap();
        let vital = registry.resolve("Attributes.Vital").unwrap();
        let root = registry.resolve("Attributes").unwrap();

        assert_eq!(registry.parent(health), Some(vital));
        assert_eq!(registry.parent(vital), Some(root));
        assert_eq!(registry.comment(vital), Some(""));

        // Explicit registration of an implicit ancestor fills in its comment.
        let again = registry.register("Attributes.Vital", "vital pools").unwrap();
        assert_eq!(again, vital);
        assert_eq!(registry.comment(vital), Some("vital pools"));
    }

    #[test]
    fn ancestor_matching_follows_hierarchy() {
        let mut registry = TagRegistry::new();
        let burn = registry.register("Effect.DOT.Fire.Burn", "").unwrap();
        let dot = registry.resolve("Effect.DOT").unwrap();
        let data = registry.register("Effect.Data", "").unwrap();

        assert!(registry.matches_ancestor(dot, burn));
        assert!(registry.matches_ancestor(burn, burn));
        assert!(!registry.matches_ancestor(burn, dot));
        assert!(!registry.matches_ancestor(data, burn));
        assert!(registry.matches_exact(burn, burn));
        assert!(!registry.matches_exact(dot, burn));
    }

    #[test]
    fn prefix_without_separator_is_not_an_ancestor() {
        let mut registry = TagRegistry::new();
        let state = registry.register("State", "").unwrap();
        let statement = registry.register("Statement.Sprint", "").unwrap();
        assert!(!registry.matches_ancestor(state, statement));
    }

    #[test]
    fn malformed_names_are_rejected_without_mutation() {
        let mut registry = TagRegistry::new();
        for name in ["", ".State", "State.", "State..IFrame", "State.I Frame", "A.B.C.D.E.F.G"] {
            let err = registry.register(name, "").unwrap_err();
            assert!(matches!(err, TagError::InvalidTagName { .. }), "{name}");
            assert_eq!(err.severity(), ErrorSeverity::Internal);
        }
        assert!(registry.is_empty());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn malformed_name_is_logged_as_error() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut registry = TagRegistry::new();
            assert!(registry.register("State..IFrame", "").is_err());
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("State..IFrame"), "{output}");
    }

    #[test]
    fn resolve_unknown_name_is_not_found() {
        let registry = TagRegistry::new();
        assert_eq!(
            registry.resolve("InputTag.Sprint"),
            Err(TagError::NotFound("InputTag.Sprint".to_owned()))
        );
    }
}
