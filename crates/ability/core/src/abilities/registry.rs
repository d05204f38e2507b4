use std::ops::{Deref, DerefMut};

use super::spec::SpecTags;
use super::{
    AbilityClass, AbilityClassId, AbilityError, AbilitySpec, AbilitySpecHandle, AbilityState,
    PredictionKey, PredictionKeyGenerator,
};
use crate::config::CoreConfig;
use crate::tags::TagHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    None,
    /// Granted while the list was locked; invisible to scans until flushed.
    Grant,
    /// Revoked while the list was locked; freed on flush.
    Revoke,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    spec: Option<AbilitySpec>,
    pending: Pending,
}

/// Arena of granted abilities owned by one actor.
///
/// Specs live in generational slots addressed by [`AbilitySpecHandle`].
/// Revocation frees the slot and bumps its generation instead of shifting
/// the list, so outstanding handles either resolve to their own spec or to
/// nothing.
///
/// While an [`AbilityListLock`] is held, grants and revokes are recorded but
/// not applied to the visible list; they take effect when the outermost lock
/// is released.
#[derive(Clone, Debug, Default)]
pub struct AbilityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    lock_depth: u32,
    keys: PredictionKeyGenerator,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== grant / revoke =====

    /// Grants `class` bound to `input_tag`, carrying `status_tags`.
    ///
    /// Granting the same class with the same input tag twice is rejected with
    /// [`AbilityError::AlreadyGranted`]; no duplicate spec is created.
    pub fn grant(
        &mut self,
        class: &AbilityClass,
        input_tag: Option<TagHandle>,
        status_tags: &[TagHandle],
    ) -> Result<AbilitySpecHandle, AbilityError> {
        if let Some(existing) = self.find_granted(class.id, input_tag) {
            tracing::warn!(class = %class.name, %existing, "ability already granted");
            return Err(AbilityError::AlreadyGranted { existing });
        }

        let mut dynamic_tags = SpecTags::new();
        for tag in input_tag.iter().chain(status_tags) {
            if dynamic_tags.contains(tag) {
                continue;
            }
            dynamic_tags
                .try_push(*tag)
                .map_err(|_| AbilityError::TooManyTags {
                    limit: CoreConfig::MAX_SPEC_TAGS,
                })?;
        }

        let (index, generation) = self.allocate_slot();
        let handle = AbilitySpecHandle { index, generation };
        let slot = &mut self.slots[index as usize];
        slot.spec = Some(AbilitySpec::new(
            handle,
            class.id,
            class.instancing,
            input_tag,
            dynamic_tags,
        ));
        slot.pending = if self.lock_depth > 0 {
            Pending::Grant
        } else {
            Pending::None
        };

        tracing::debug!(
            class = %class.name,
            %handle,
            deferred = self.lock_depth > 0,
            "ability granted"
        );
        Ok(handle)
    }

    /// Revokes a granted ability. Deferred while the list is locked.
    pub fn revoke(&mut self, handle: AbilitySpecHandle) -> Result<(), AbilityError> {
        let locked = self.lock_depth > 0;
        let slot = self
            .slot_mut(handle)
            .ok_or(AbilityError::InvalidHandle(handle))?;
        if slot.pending == Pending::Revoke {
            return Err(AbilityError::InvalidHandle(handle));
        }

        // A grant made under the same lock was never visible; drop it now.
        if locked && slot.pending == Pending::None {
            slot.pending = Pending::Revoke;
        } else {
            self.free_slot(handle.index);
        }
        tracing::debug!(%handle, deferred = locked, "ability revoked");
        Ok(())
    }

    fn allocate_slot(&mut self) -> (u32, u32) {
        if let Some(index) = self.free.pop() {
            return (index, self.slots[index as usize].generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            spec: None,
            pending: Pending::None,
        });
        (index, 0)
    }

    fn free_slot(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.spec = None;
        slot.pending = Pending::None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    // ===== lookup =====

    fn slot(&self, handle: AbilitySpecHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.spec.is_some())
    }

    fn slot_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.spec.is_some())
    }

    /// Spec behind `handle`, including grants and revokes still deferred by a lock.
    pub fn spec(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        self.slot(handle).and_then(|slot| slot.spec.as_ref())
    }

    pub(crate) fn spec_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut AbilitySpec> {
        self.slot_mut(handle).and_then(|slot| slot.spec.as_mut())
    }

    /// True if `handle` resolves to a spec visible to scans.
    ///
    /// The visible list does not change while locked: deferred grants are
    /// hidden and deferred revokes are still listed.
    pub fn is_live(&self, handle: AbilitySpecHandle) -> bool {
        self.slot(handle)
            .is_some_and(|slot| slot.pending != Pending::Grant)
    }

    /// True if `handle` was revoked under a lock that has not been released.
    pub fn is_pending_revoke(&self, handle: AbilitySpecHandle) -> bool {
        self.slot(handle)
            .is_some_and(|slot| slot.pending == Pending::Revoke)
    }

    /// Specs visible to scans, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &AbilitySpec> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.pending != Pending::Grant)
            .filter_map(|slot| slot.spec.as_ref())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Live or pending-grant spec for `(class, input_tag)`.
    pub fn find_granted(
        &self,
        class: AbilityClassId,
        input_tag: Option<TagHandle>,
    ) -> Option<AbilitySpecHandle> {
        self.slots
            .iter()
            .filter(|slot| slot.pending != Pending::Revoke)
            .filter_map(|slot| slot.spec.as_ref())
            .find(|spec| spec.class == class && spec.input_tag == input_tag)
            .map(|spec| spec.handle)
    }

    /// First live spec of `class`, whatever its input tag.
    pub fn find_by_class(&self, class: AbilityClassId) -> Option<AbilitySpecHandle> {
        self.iter()
            .find(|spec| spec.class == class)
            .map(|spec| spec.handle)
    }

    /// Live specs whose dynamic tags contain exactly `tag`.
    pub fn handles_matching_input(&self, tag: TagHandle) -> Vec<AbilitySpecHandle> {
        self.iter()
            .filter(|spec| spec.has_dynamic_tag(tag))
            .map(|spec| spec.handle)
            .collect()
    }

    /// Correlation key of the spec, or [`PredictionKey::NONE`] for stale handles.
    pub fn prediction_key_for(&self, handle: AbilitySpecHandle) -> PredictionKey {
        self.spec(handle)
            .map(AbilitySpec::prediction_key)
            .unwrap_or(PredictionKey::NONE)
    }

    // ===== lifecycle =====

    /// `GrantedInactive | Active (per-execution)` → `Activating`, issuing the
    /// attempt's prediction key.
    pub(crate) fn begin_activation(
        &mut self,
        handle: AbilitySpecHandle,
    ) -> Result<PredictionKey, AbilityError> {
        let spec = self
            .spec_mut(handle)
            .ok_or(AbilityError::InvalidHandle(handle))?;
        if !spec.can_activate() {
            let from = spec.state;
            return Err(if from == AbilityState::Active {
                AbilityError::InstanceLimit { handle }
            } else {
                AbilityError::InvalidTransition {
                    handle,
                    from,
                    to: AbilityState::Activating,
                }
            });
        }
        spec.state = AbilityState::Activating;
        Ok(self.keys.next_key())
    }

    /// `Activating` → `Active` with a live instance holding `key`.
    pub(crate) fn confirm_activation(
        &mut self,
        handle: AbilitySpecHandle,
        key: PredictionKey,
    ) -> Result<(), AbilityError> {
        let spec = self.activating_spec(handle)?;
        if !spec.push_instance(key) {
            spec.settle();
            return Err(AbilityError::InstanceLimit { handle });
        }
        spec.state = AbilityState::Active;
        spec.activation_count += 1;
        Ok(())
    }

    /// `Activating` → back to where the spec was before the attempt.
    pub(crate) fn cancel_activation(&mut self, handle: AbilitySpecHandle) -> Result<(), AbilityError> {
        self.activating_spec(handle)?.settle();
        Ok(())
    }

    fn activating_spec(&mut self, handle: AbilitySpecHandle) -> Result<&mut AbilitySpec, AbilityError> {
        let spec = self
            .spec_mut(handle)
            .ok_or(AbilityError::InvalidHandle(handle))?;
        if spec.state != AbilityState::Activating {
            return Err(AbilityError::InvalidTransition {
                handle,
                from: spec.state,
                to: AbilityState::Active,
            });
        }
        Ok(spec)
    }

    pub(crate) fn set_input_pressed(&mut self, handle: AbilitySpecHandle) {
        if let Some(spec) = self.spec_mut(handle) {
            spec.input_pressed = true;
        }
    }

    /// Ends the execution correlated by `key`.
    ///
    /// `Active → Ending`; once no live instance remains the spec returns to
    /// `GrantedInactive`, immediately or, while the list is locked, when the
    /// lock is released. Returns the resulting state.
    pub fn end_ability(
        &mut self,
        handle: AbilitySpecHandle,
        key: PredictionKey,
    ) -> Result<AbilityState, AbilityError> {
        let locked = self.lock_depth > 0;
        let spec = self
            .spec_mut(handle)
            .ok_or(AbilityError::InvalidHandle(handle))?;
        if spec.state != AbilityState::Active {
            return Err(AbilityError::InvalidTransition {
                handle,
                from: spec.state,
                to: AbilityState::Ending,
            });
        }
        if !spec.end_instance(key) {
            return Err(AbilityError::UnknownPredictionKey { handle, key });
        }

        if spec.live_instances() > 0 {
            spec.state = AbilityState::Active;
        } else {
            spec.state = AbilityState::Ending;
            if !locked {
                spec.settle();
            }
        }
        tracing::debug!(%handle, %key, state = %spec.state, "ability ended");
        Ok(spec.state)
    }

    // ===== list lock =====

    /// Locks the list for a scan. Grants and revokes made through the guard
    /// are deferred until the outermost guard drops.
    pub fn lock(&mut self) -> AbilityListLock<'_> {
        self.lock_depth += 1;
        AbilityListLock { registry: self }
    }

    pub fn is_locked(&self) -> bool {
        self.lock_depth > 0
    }

    fn flush(&mut self) {
        let mut granted = 0usize;
        let mut revoked = 0usize;
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            match slot.pending {
                Pending::None => {}
                Pending::Grant => {
                    slot.pending = Pending::None;
                    granted += 1;
                }
                Pending::Revoke => {
                    self.free_slot(index as u32);
                    revoked += 1;
                    continue;
                }
            }
            if let Some(spec) = slot.spec.as_mut() {
                if spec.state == AbilityState::Ending {
                    spec.settle();
                }
            }
        }
        if granted + revoked > 0 {
            tracing::debug!(granted, revoked, "deferred ability list changes applied");
        }
    }
}

/// Scoped exclusive lock over an [`AbilityRegistry`].
///
/// Dereferences to the registry. Dropping the outermost lock (including
/// during unwinding) applies deferred grants and revokes.
#[derive(Debug)]
pub struct AbilityListLock<'a> {
    registry: &'a mut AbilityRegistry,
}

impl Deref for AbilityListLock<'_> {
    type Target = AbilityRegistry;

    fn deref(&self) -> &Self::Target {
        self.registry
    }
}

impl DerefMut for AbilityListLock<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.registry
    }
}

impl Drop for AbilityListLock<'_> {
    fn drop(&mut self) {
        self.registry.lock_depth -= 1;
        if self.registry.lock_depth == 0 {
            self.registry.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityCatalog, InstancingPolicy};
    use crate::tags::TagRegistry;

    struct Fixture {
        catalog: AbilityCatalog,
        sprint: AbilityClassId,
        attack: AbilityClassId,
        input_sprint: TagHandle,
        input_attack: TagHandle,
        equipped: TagHandle,
    }

    fn fixture() -> Fixture {
        let mut tags = TagRegistry::new();
        let mut catalog = AbilityCatalog::new();
        let sprint = catalog.register("GA_Sprint").unwrap().id;
        let attack = catalog
            .register("GA_LightAttack")
            .unwrap()
            .with_instancing(InstancingPolicy::InstancedPerExecution)
            .id;
        Fixture {
            catalog,
            sprint,
            attack,
            input_sprint: tags.register("InputTag.Sprint", "").unwrap(),
            input_attack: tags.register("InputTag.Attack.Main", "").unwrap(),
            equipped: tags.register("Ability.Status.Equipped", "").unwrap(),
        }
    }

    impl Fixture {
        fn class(&self, id: AbilityClassId) -> &AbilityClass {
            self.catalog.get(id).unwrap()
        }
    }

    #[test]
    fn grant_rejects_duplicate_class_and_input() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();

        let first = registry
            .grant(f.class(f.sprint), Some(f.input_sprint), &[f.equipped])
            .unwrap();
        assert_eq!(
            registry.grant(f.class(f.sprint), Some(f.input_sprint), &[]),
            Err(AbilityError::AlreadyGranted { existing: first })
        );
        // Same class on another input is a distinct grant.
        registry
            .grant(f.class(f.sprint), Some(f.input_attack), &[])
            .unwrap();
        assert_eq!(registry.len(), 2);

        let spec = registry.spec(first).unwrap();
        assert_eq!(spec.state(), AbilityState::GrantedInactive);
        assert_eq!(spec.dynamic_tags(), &[f.input_sprint, f.equipped]);
    }

    #[test]
    fn revoked_handles_never_alias_new_grants() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();

        let old = registry
            .grant(f.class(f.sprint), Some(f.input_sprint), &[])
            .unwrap();
        registry.revoke(old).unwrap();
        assert!(registry.spec(old).is_none());
        assert_eq!(registry.revoke(old), Err(AbilityError::InvalidHandle(old)));

        let new = registry
            .grant(f.class(f.attack), Some(f.input_attack), &[])
            .unwrap();
        assert_eq!(new.index, old.index);
        assert_ne!(new, old);
        assert!(registry.spec(old).is_none());
        assert_eq!(registry.prediction_key_for(old), PredictionKey::NONE);
    }

    #[test]
    fn lock_defers_grants_and_revokes() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let sprint = registry
            .grant(f.class(f.sprint), Some(f.input_sprint), &[])
            .unwrap();

        let attack = {
            let mut lock = registry.lock();
            lock.revoke(sprint).unwrap();
            let attack = lock
                .grant(f.class(f.attack), Some(f.input_attack), &[])
                .unwrap();

            // Neither change is visible to scans yet.
            assert_eq!(lock.handles_matching_input(f.input_sprint), vec![sprint]);
            assert!(lock.handles_matching_input(f.input_attack).is_empty());
            assert!(!lock.is_live(attack));
            assert!(lock.is_pending_revoke(sprint));

            {
                let nested = lock.lock();
                assert!(nested.is_locked());
            }
            assert!(lock.is_live(sprint));
            attack
        };

        assert!(!registry.is_locked());
        assert!(registry.spec(sprint).is_none());
        assert_eq!(registry.handles_matching_input(f.input_attack), vec![attack]);
    }

    #[test]
    fn lifecycle_round_trip() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let handle = registry
            .grant(f.class(f.sprint), Some(f.input_sprint), &[])
            .unwrap();

        let key = registry.begin_activation(handle).unwrap();
        assert_eq!(registry.spec(handle).unwrap().state(), AbilityState::Activating);
        assert!(matches!(
            registry.begin_activation(handle),
            Err(AbilityError::InvalidTransition { .. })
        ));

        registry.confirm_activation(handle, key).unwrap();
        assert_eq!(registry.prediction_key_for(handle), key);

        assert_eq!(
            registry.end_ability(handle, PredictionKey::NONE),
            Err(AbilityError::UnknownPredictionKey {
                handle,
                key: PredictionKey::NONE
            })
        );
        assert_eq!(
            registry.end_ability(handle, key),
            Ok(AbilityState::GrantedInactive)
        );
        assert_eq!(registry.prediction_key_for(handle), PredictionKey::NONE);
        assert_eq!(registry.spec(handle).unwrap().activation_count(), 1);
    }

    #[test]
    fn ending_under_lock_settles_on_release() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let handle = registry
            .grant(f.class(f.sprint), Some(f.input_sprint), &[])
            .unwrap();
        let key = registry.begin_activation(handle).unwrap();
        registry.confirm_activation(handle, key).unwrap();

        {
            let mut lock = registry.lock();
            assert_eq!(lock.end_ability(handle, key), Ok(AbilityState::Ending));
        }
        assert_eq!(
            registry.spec(handle).unwrap().state(),
            AbilityState::GrantedInactive
        );
    }

    #[test]
    fn cancelled_activation_returns_to_inactive() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let handle = registry
            .grant(f.class(f.attack), Some(f.input_attack), &[])
            .unwrap();

        registry.begin_activation(handle).unwrap();
        registry.cancel_activation(handle).unwrap();
        let spec = registry.spec(handle).unwrap();
        assert_eq!(spec.state(), AbilityState::GrantedInactive);
        assert_eq!(spec.live_instances(), 0);
    }

    #[test]
    fn too_many_status_tags_is_rejected() {
        let f = fixture();
        let mut tags = TagRegistry::new();
        let status: Vec<_> = (0..=CoreConfig::MAX_SPEC_TAGS)
            .map(|i| tags.register(&format!("Status.S{i}"), "").unwrap())
            .collect();
        let mut registry = AbilityRegistry::new();

        assert_eq!(
            registry.grant(f.class(f.sprint), None, &status),
            Err(AbilityError::TooManyTags {
                limit: CoreConfig::MAX_SPEC_TAGS
            })
        );
        assert!(registry.is_empty());
    }
}
