use std::sync::Arc;

use super::{
    EffectContext, EffectDescriptor, EffectDuration, EffectError, EffectSpec, InvalidEffectReason,
};
use crate::actor::ActorId;
use crate::attributes::{AttributeId, AttributeStore, clamp_between};
use crate::config::CoreConfig;
use crate::tags::{TagContainer, TagHandle};

// ============================================================================
// Handles and active set
// ============================================================================

/// Handle to an applied infinite or duration effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEffectHandle(u64);

impl AppliedEffectHandle {
    /// Returned for instant effects; never refers to an active effect.
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Default for AppliedEffectHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Clone, Debug)]
struct ActiveEffect {
    handle: AppliedEffectHandle,
    spec: EffectSpec,
    /// Seconds left for `HasDuration`; `None` for infinite effects.
    remaining: Option<f32>,
    /// Deltas actually committed, in application order.
    contributions: Vec<(AttributeId, f32)>,
}

/// Effects currently applied to one owner.
#[derive(Clone, Debug, Default)]
pub struct ActiveEffects {
    last_handle: u64,
    effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn contains(&self, handle: AppliedEffectHandle) -> bool {
        self.position(handle).is_some()
    }

    pub fn handles(&self) -> impl Iterator<Item = AppliedEffectHandle> + '_ {
        self.effects.iter().map(|e| e.handle)
    }

    pub fn spec(&self, handle: AppliedEffectHandle) -> Option<&EffectSpec> {
        self.get(handle).map(|e| &e.spec)
    }

    /// Seconds left on a duration effect.
    pub fn remaining(&self, handle: AppliedEffectHandle) -> Option<f32> {
        self.get(handle).and_then(|e| e.remaining)
    }

    /// Union of the tags granted by every active effect.
    pub fn granted_tags(&self) -> TagContainer {
        self.effects
            .iter()
            .flat_map(|e| e.spec.descriptor().granted_tags.iter())
            .collect()
    }

    pub fn has_granted_tag(&self, tag: TagHandle) -> bool {
        self.effects
            .iter()
            .any(|e| e.spec.descriptor().granted_tags.has_exact(tag))
    }

    fn get(&self, handle: AppliedEffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    fn position(&self, handle: AppliedEffectHandle) -> Option<usize> {
        if !handle.is_valid() {
            return None;
        }
        self.effects.iter().position(|e| e.handle == handle)
    }

    fn allocate(&mut self) -> AppliedEffectHandle {
        self.last_handle += 1;
        AppliedEffectHandle(self.last_handle)
    }
}

/// Mutable view of the owner an effect lands on.
///
/// Cross-actor effects are applied through the victim's own target so every
/// store keeps a single writer.
#[derive(Debug)]
pub struct EffectTarget<'a> {
    pub store: &'a mut AttributeStore,
    pub active: &'a mut ActiveEffects,
}

impl<'a> EffectTarget<'a> {
    pub fn new(store: &'a mut AttributeStore, active: &'a mut ActiveEffects) -> Self {
        Self { store, active }
    }

    /// Shorter-lived copy of this view, for passing to several calls.
    pub fn reborrow(&mut self) -> EffectTarget<'_> {
        EffectTarget {
            store: self.store,
            active: self.active,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Builds effect specs and applies them to targets.
#[derive(Clone, Debug)]
pub struct EffectEngine {
    default_level: f32,
}

impl EffectEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            default_level: config.default_effect_level,
        }
    }

    pub fn default_level(&self) -> f32 {
        self.default_level
    }

    /// Captures the actor that causes the effect.
    pub fn make_context(&self, source: Option<ActorId>) -> EffectContext {
        EffectContext::new(source)
    }

    pub fn make_spec(
        &self,
        descriptor: Arc<EffectDescriptor>,
        level: f32,
        context: EffectContext,
    ) -> Result<EffectSpec, EffectError> {
        if !level.is_finite() {
            let err = EffectError::InvalidEffectClass {
                effect: descriptor.name.clone(),
                reason: InvalidEffectReason::NonFiniteLevel(level),
            };
            tracing::error!(error = %err, "effect spec rejected");
            return Err(err);
        }
        Ok(EffectSpec::new(descriptor, level, context))
    }

    /// [`EffectEngine::make_spec`] at the configured default level.
    pub fn make_default_spec(
        &self,
        descriptor: Arc<EffectDescriptor>,
        context: EffectContext,
    ) -> Result<EffectSpec, EffectError> {
        self.make_spec(descriptor, self.default_level, context)
    }

    /// Applies `spec` to `target`.
    ///
    /// Every modifier computes `magnitude × level`, combines it with the
    /// current value, clamps into `[min, resolved max]` and commits. Returns
    /// [`AppliedEffectHandle::INVALID`] for instant effects.
    pub fn apply(
        &self,
        spec: &EffectSpec,
        target: Option<EffectTarget<'_>>,
    ) -> Result<AppliedEffectHandle, EffectError> {
        let Some(target) = target else {
            tracing::error!(effect = spec.name(), "effect applied to an unavailable target");
            return Err(EffectError::InvalidTarget);
        };
        if let Err(err) = spec.descriptor().validate(target.store.schema()) {
            tracing::error!(error = %err, "effect rejected");
            return Err(err);
        }

        let mut contributions = Vec::with_capacity(spec.descriptor().modifiers.len());
        for modifier in &spec.descriptor().modifiers {
            let attr = modifier.attribute;
            let current = target.store.get_value(attr);
            let proposed = modifier.op.evaluate(current, spec.scaled_magnitude(modifier));
            let committed = Self::clamp(target.store, attr, proposed);
            let delta = committed - current;
            if !committed.is_finite() || !delta.is_finite() {
                Self::revert_contributions(target.store, &contributions);
                let err = EffectError::InvalidEffectClass {
                    effect: spec.name().to_owned(),
                    reason: InvalidEffectReason::NonFiniteResult(attr),
                };
                tracing::error!(error = %err, "effect rejected");
                return Err(err);
            }
            target.store.commit(attr, committed);
            contributions.push((attr, delta));
        }

        let duration = spec.descriptor().duration;
        let handle = match duration {
            EffectDuration::Instant => AppliedEffectHandle::INVALID,
            EffectDuration::Infinite | EffectDuration::HasDuration(_) => {
                let handle = target.active.allocate();
                target.active.effects.push(ActiveEffect {
                    handle,
                    spec: spec.clone(),
                    remaining: match duration {
                        EffectDuration::HasDuration(seconds) => Some(seconds),
                        _ => None,
                    },
                    contributions,
                });
                handle
            }
        };

        tracing::debug!(
            effect = spec.name(),
            level = spec.level(),
            duration = %duration.kind(),
            ?handle,
            "effect applied"
        );
        Ok(handle)
    }

    /// Removes an active effect and reverts the deltas it committed.
    ///
    /// Returns `Ok(false)` for handles that are not active (instant effects,
    /// already removed or expired).
    pub fn remove(
        &self,
        target: Option<EffectTarget<'_>>,
        handle: AppliedEffectHandle,
    ) -> Result<bool, EffectError> {
        let Some(target) = target else {
            tracing::error!(?handle, "effect removed from an unavailable target");
            return Err(EffectError::InvalidTarget);
        };
        let Some(index) = target.active.position(handle) else {
            return Ok(false);
        };
        let effect = target.active.effects.remove(index);
        Self::revert(target.store, &effect);
        tracing::debug!(effect = effect.spec.name(), ?handle, "effect removed");
        Ok(true)
    }

    /// Advances duration effects by `elapsed` seconds, reverting the ones
    /// that expire. Returns the expired handles in application order.
    ///
    /// A negative or non-finite `elapsed` advances nothing.
    pub fn advance(&self, target: EffectTarget<'_>, elapsed: f32) -> Vec<AppliedEffectHandle> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            tracing::warn!(elapsed, "ignoring invalid effect time step");
            return Vec::new();
        }
        let mut expired = Vec::new();
        let mut index = 0;
        while index < target.active.effects.len() {
            let effect = &mut target.active.effects[index];
            let Some(remaining) = effect.remaining.as_mut() else {
                index += 1;
                continue;
            };
            *remaining -= elapsed;
            if *remaining > 0.0 {
                index += 1;
                continue;
            }

            let effect = target.active.effects.remove(index);
            Self::revert(target.store, &effect);
            tracing::debug!(effect = effect.spec.name(), handle = ?effect.handle, "effect expired");
            expired.push(effect.handle);
        }
        expired
    }

    fn revert(store: &mut AttributeStore, effect: &ActiveEffect) {
        Self::revert_contributions(store, &effect.contributions);
    }

    fn revert_contributions(store: &mut AttributeStore, contributions: &[(AttributeId, f32)]) {
        for &(attr, delta) in contributions.iter().rev() {
            if delta == 0.0 {
                continue;
            }
            let restored = Self::clamp(store, attr, store.get_value(attr) - delta);
            store.commit(attr, restored);
        }
    }

    fn clamp(store: &AttributeStore, attr: AttributeId, proposed: f32) -> f32 {
        match store.bounds(attr) {
            Some((min, max)) => clamp_between(proposed, min, max),
            None => proposed,
        }
    }
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}
