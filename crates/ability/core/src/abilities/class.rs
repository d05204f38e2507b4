use std::collections::HashMap;

use super::AbilityError;
use crate::tags::TagHandle;

/// Index of an ability class inside its [`AbilityCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityClassId(pub(crate) u32);

impl AbilityClassId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How live instances of a granted ability are created.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstancingPolicy {
    /// One instance per owner, created at grant time and reused.
    #[default]
    InstancedPerActor,
    /// A new instance per activation.
    InstancedPerExecution,
}

/// Static description of an ability implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityClass {
    pub id: AbilityClassId,
    pub name: String,
    pub ability_tag: Option<TagHandle>,
    pub instancing: InstancingPolicy,
    /// Input tag the class is granted with when no other is given.
    pub startup_input_tag: Option<TagHandle>,
}

impl AbilityClass {
    pub fn with_ability_tag(&mut self, tag: TagHandle) -> &mut Self {
        self.ability_tag = Some(tag);
        self
    }

    pub fn with_instancing(&mut self, policy: InstancingPolicy) -> &mut Self {
        self.instancing = policy;
        self
    }

    pub fn with_startup_input_tag(&mut self, tag: TagHandle) -> &mut Self {
        self.startup_input_tag = Some(tag);
        self
    }
}

/// Every ability class known to the session.
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalog {
    classes: Vec<AbilityClass>,
    by_name: HashMap<String, AbilityClassId>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class and returns it for further configuration.
    pub fn register(&mut self, name: &str) -> Result<&mut AbilityClass, AbilityError> {
        if self.by_name.contains_key(name) {
            return Err(AbilityError::DuplicateClass(name.to_owned()));
        }
        let id = AbilityClassId(self.classes.len() as u32);
        self.by_name.insert(name.to_owned(), id);
        self.classes.push(AbilityClass {
            id,
            name: name.to_owned(),
            ability_tag: None,
            instancing: InstancingPolicy::default(),
            startup_input_tag: None,
        });
        tracing::debug!(class = name, "ability class registered");
        Ok(&mut self.classes[id.index()])
    }

    pub fn get(&self, id: AbilityClassId) -> Option<&AbilityClass> {
        self.classes.get(id.index())
    }

    pub fn find(&self, name: &str) -> Option<&AbilityClass> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn resolve(&self, name: &str) -> Result<&AbilityClass, AbilityError> {
        self.find(name)
            .ok_or_else(|| AbilityError::UnknownClass(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityClass> + '_ {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut catalog = AbilityCatalog::new();
        let sprint = catalog
            .register("GA_Sprint")
            .unwrap()
            .with_instancing(InstancingPolicy::InstancedPerActor)
            .id;
        let attack = catalog
            .register("GA_LightAttack")
            .unwrap()
            .with_instancing(InstancingPolicy::InstancedPerExecution)
            .id;

        assert_ne!(sprint, attack);
        assert_eq!(catalog.resolve("GA_Sprint").unwrap().id, sprint);
        assert_eq!(
            catalog.get(attack).unwrap().instancing,
            InstancingPolicy::InstancedPerExecution
        );
        assert!(matches!(
            catalog.register("GA_Sprint"),
            Err(AbilityError::DuplicateClass(_))
        ));
        assert!(matches!(
            catalog.resolve("GA_Parry"),
            Err(AbilityError::UnknownClass(_))
        ));
    }
}
