use super::{TagHandle, TagRegistry};

/// Ordered set of tag handles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagContainer {
    tags: Vec<TagHandle>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns false if it was already present.
    pub fn add(&mut self, tag: TagHandle) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(pos) => {
                self.tags.insert(pos, tag);
                true
            }
        }
    }

    /// Removes a tag. Returns false if it was not present.
    pub fn remove(&mut self, tag: TagHandle) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(pos) => {
                self.tags.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn has_exact(&self, tag: TagHandle) -> bool {
        self.tags.binary_search(&tag).is_ok()
    }

    /// True if any contained tag is `parent` or one of its descendants.
    pub fn has_matching(&self, registry: &TagRegistry, parent: TagHandle) -> bool {
        self.tags
            .iter()
            .any(|&tag| registry.matches_ancestor(parent, tag))
    }

    pub fn extend(&mut self, tags: impl IntoIterator<Item = TagHandle>) {
        for tag in tags {
            self.add(tag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = TagHandle> + '_ {
        self.tags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<TagHandle> for TagContainer {
    fn from_iter<I: IntoIterator<Item = TagHandle>>(iter: I) -> Self {
        let mut container = Self::new();
        container.extend(iter);
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_keep_set_semantics() {
        let mut registry = TagRegistry::new();
        let sprint = registry.register("State.Sprint", "").unwrap();
        let dead = registry.register("State.Dead", "").unwrap();

        let mut tags = TagContainer::new();
        assert!(tags.add(sprint));
        assert!(!tags.add(sprint));
        assert!(tags.add(dead));
        assert_eq!(tags.len(), 2);

        assert!(tags.remove(sprint));
        assert!(!tags.remove(sprint));
        assert!(!tags.has_exact(sprint));
        assert!(tags.has_exact(dead));
    }

    #[test]
    fn has_matching_accepts_descendants() {
        let mut registry = TagRegistry::new();
        let heavy = registry.register("State.Movement.Weight.Heavy", "").unwrap();
        let weight = registry.resolve("State.Movement.Weight").unwrap();
        let state = registry.resolve("State").unwrap();
        let damage = registry.register("Damage.Type.Fire", "").unwrap();

        let tags: TagContainer = [heavy].into_iter().collect();
        assert!(tags.has_matching(&registry, weight));
        assert!(tags.has_matching(&registry, state));
        assert!(!tags.has_matching(&registry, damage));
        assert!(!tags.has_exact(weight));
    }
}
