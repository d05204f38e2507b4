use arrayvec::ArrayVec;

use super::{AbilityClassId, InstancingPolicy, PredictionKey};
use crate::config::CoreConfig;
use crate::tags::TagHandle;

/// Stable handle to a granted ability.
///
/// The generation is bumped whenever the slot is freed, so a handle to a
/// revoked spec never aliases a later grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpecHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl core::fmt::Display for AbilitySpecHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "spec#{}.{}", self.index, self.generation)
    }
}

/// Lifecycle of a granted ability.
///
/// ```text
/// GrantedInactive → Activating → Active → Ending → GrantedInactive
///                        └── refused ──→ GrantedInactive
/// ```
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
pub enum AbilityState {
    #[default]
    GrantedInactive,
    Activating,
    Active,
    Ending,
}

/// One live execution of an ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityInstance {
    pub key: PredictionKey,
    pub active: bool,
}

pub(crate) type SpecTags = ArrayVec<TagHandle, { CoreConfig::MAX_SPEC_TAGS }>;
type Instances = ArrayVec<AbilityInstance, { CoreConfig::MAX_INSTANCES_PER_SPEC }>;

/// A granted ability: class, dynamic tags, lifecycle and live instances.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilitySpec {
    pub(crate) handle: AbilitySpecHandle,
    pub(crate) class: AbilityClassId,
    pub(crate) instancing: InstancingPolicy,
    pub(crate) input_tag: Option<TagHandle>,
    /// Input tag first (if any), then status tags.
    pub(crate) dynamic_tags: SpecTags,
    pub(crate) state: AbilityState,
    pub(crate) input_pressed: bool,
    /// Per-actor instance, created at grant time.
    pub(crate) primary: Option<AbilityInstance>,
    /// Per-execution instances, one per live activation.
    pub(crate) instances: Instances,
    pub(crate) activation_count: u32,
}

impl AbilitySpec {
    pub(crate) fn new(
        handle: AbilitySpecHandle,
        class: AbilityClassId,
        instancing: InstancingPolicy,
        input_tag: Option<TagHandle>,
        dynamic_tags: SpecTags,
    ) -> Self {
        Self {
            handle,
            class,
            instancing,
            input_tag,
            dynamic_tags,
            state: AbilityState::GrantedInactive,
            input_pressed: false,
            primary: match instancing {
                InstancingPolicy::InstancedPerActor => Some(AbilityInstance::default()),
                InstancingPolicy::InstancedPerExecution => None,
            },
            instances: Instances::new(),
            activation_count: 0,
        }
    }

    pub fn handle(&self) -> AbilitySpecHandle {
        self.handle
    }

    pub fn class(&self) -> AbilityClassId {
        self.class
    }

    pub fn instancing(&self) -> InstancingPolicy {
        self.instancing
    }

    pub fn input_tag(&self) -> Option<TagHandle> {
        self.input_tag
    }

    pub fn dynamic_tags(&self) -> &[TagHandle] {
        &self.dynamic_tags
    }

    /// Exact membership in the spec's dynamic tag set.
    pub fn has_dynamic_tag(&self, tag: TagHandle) -> bool {
        self.dynamic_tags.iter().any(|t| t.matches_exact(tag))
    }

    pub fn state(&self) -> AbilityState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AbilityState::Active
    }

    /// Set by a press, cleared when the ability returns to inactive.
    pub fn input_pressed(&self) -> bool {
        self.input_pressed
    }

    pub fn activation_count(&self) -> u32 {
        self.activation_count
    }

    pub fn primary_instance(&self) -> Option<&AbilityInstance> {
        self.primary.as_ref()
    }

    pub fn instances(&self) -> &[AbilityInstance] {
        &self.instances
    }

    /// Number of executions currently running.
    pub fn live_instances(&self) -> usize {
        self.primary.iter().filter(|i| i.active).count()
            + self.instances.iter().filter(|i| i.active).count()
    }

    /// True if a live instance holds `key`.
    pub fn has_live_instance(&self, key: PredictionKey) -> bool {
        self.primary
            .iter()
            .chain(self.instances.iter())
            .any(|instance| instance.active && instance.key == key)
    }

    /// Current correlation key.
    ///
    /// Prefers the primary instance's key, then any live per-execution
    /// instance holding a valid key, else [`PredictionKey::NONE`].
    pub fn prediction_key(&self) -> PredictionKey {
        if let Some(primary) = &self.primary {
            if primary.key.is_valid() {
                return primary.key;
            }
        }
        self.instances
            .iter()
            .map(|instance| instance.key)
            .find(|key| key.is_valid())
            .unwrap_or(PredictionKey::NONE)
    }

    /// Whether another activation can start from the current state.
    pub(crate) fn can_activate(&self) -> bool {
        match self.state {
            AbilityState::GrantedInactive => {
                self.instancing == InstancingPolicy::InstancedPerActor || !self.instances.is_full()
            }
            AbilityState::Active => {
                self.instancing == InstancingPolicy::InstancedPerExecution
                    && !self.instances.is_full()
            }
            AbilityState::Activating | AbilityState::Ending => false,
        }
    }

    /// Installs a live instance for `key`.
    pub(crate) fn push_instance(&mut self, key: PredictionKey) -> bool {
        let instance = AbilityInstance { key, active: true };
        match self.instancing {
            InstancingPolicy::InstancedPerActor => {
                self.primary = Some(instance);
                true
            }
            InstancingPolicy::InstancedPerExecution => self.instances.try_push(instance).is_ok(),
        }
    }

    /// Ends the live instance holding `key`. Returns false if none does.
    pub(crate) fn end_instance(&mut self, key: PredictionKey) -> bool {
        if let Some(primary) = self.primary.as_mut() {
            if primary.active && primary.key == key {
                *primary = AbilityInstance::default();
                return true;
            }
        }
        match self.instances.iter().position(|i| i.active && i.key == key) {
            Some(index) => {
                self.instances.remove(index);
                true
            }
            None => false,
        }
    }

    /// State after the last instance change outside of a transition.
    pub(crate) fn settle(&mut self) {
        self.state = if self.live_instances() > 0 {
            AbilityState::Active
        } else {
            self.input_pressed = false;
            AbilityState::GrantedInactive
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(policy: InstancingPolicy) -> AbilitySpec {
        AbilitySpec::new(
            AbilitySpecHandle {
                index: 0,
                generation: 0,
            },
            AbilityClassId(0),
            policy,
            None,
            SpecTags::new(),
        )
    }

    #[test]
    fn primary_key_is_preferred() {
        let mut spec = spec(InstancingPolicy::InstancedPerActor);
        assert_eq!(spec.prediction_key(), PredictionKey::NONE);

        assert!(spec.push_instance(PredictionKey(7)));
        assert_eq!(spec.prediction_key(), PredictionKey(7));

        assert!(spec.end_instance(PredictionKey(7)));
        assert_eq!(spec.prediction_key(), PredictionKey::NONE);
        assert!(spec.primary_instance().is_some());
    }

    #[test]
    fn per_execution_searches_every_instance() {
        let mut spec = spec(InstancingPolicy::InstancedPerExecution);
        assert!(spec.primary_instance().is_none());

        spec.instances.push(AbilityInstance {
            key: PredictionKey::NONE,
            active: true,
        });
        spec.instances.push(AbilityInstance {
            key: PredictionKey(3),
            active: true,
        });
        assert_eq!(spec.prediction_key(), PredictionKey(3));
        assert_eq!(spec.live_instances(), 2);
    }

    #[test]
    fn instance_capacity_limits_activation() {
        let mut spec = spec(InstancingPolicy::InstancedPerExecution);
        for raw in 1..=CoreConfig::MAX_INSTANCES_PER_SPEC as u32 {
            assert!(spec.can_activate());
            assert!(spec.push_instance(PredictionKey(raw)));
            spec.state = AbilityState::Active;
        }
        assert!(!spec.can_activate());
        assert!(!spec.push_instance(PredictionKey(99)));
    }
}
