use std::collections::BTreeMap;
use std::sync::Arc;

use super::{EffectDescriptor, EffectError};

/// Named effect descriptors, shared by every spec built from them.
#[derive(Clone, Debug, Default)]
pub struct EffectLibrary {
    effects: BTreeMap<String, Arc<EffectDescriptor>>,
}

impl EffectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor under its own name, replacing any previous one.
    pub fn insert(&mut self, descriptor: EffectDescriptor) -> Arc<EffectDescriptor> {
        let descriptor = Arc::new(descriptor);
        if let Some(previous) = self
            .effects
            .insert(descriptor.name.clone(), Arc::clone(&descriptor))
        {
            tracing::warn!(effect = %previous.name, "effect descriptor replaced");
        }
        descriptor
    }

    pub fn get(&self, name: &str) -> Option<Arc<EffectDescriptor>> {
        self.effects.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<EffectDescriptor>, EffectError> {
        self.get(name).ok_or_else(|| {
            tracing::error!(effect = name, "effect is not in the library");
            EffectError::UnknownEffect(name.to_owned())
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Descriptors ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EffectDescriptor>> + '_ {
        self.effects.values()
    }
}

impl FromIterator<EffectDescriptor> for EffectLibrary {
    fn from_iter<I: IntoIterator<Item = EffectDescriptor>>(iter: I) -> Self {
        let mut library = Self::new();
        for descriptor in iter {
            library.insert(descriptor);
        }
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let library: EffectLibrary = [
            EffectDescriptor::infinite("GE_Sprint"),
            EffectDescriptor::instant("GE_LightAttack"),
        ]
        .into_iter()
        .collect();

        assert_eq!(library.len(), 2);
        assert!(library.get("GE_Sprint").is_some());
        assert_eq!(
            library.require("GE_Missing"),
            Err(EffectError::UnknownEffect("GE_Missing".into()))
        );
        let names: Vec<_> = library.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["GE_LightAttack", "GE_Sprint"]);
    }
}
