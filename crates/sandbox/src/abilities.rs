//! Reference ability implementations driven by the sandbox.
//!
//! These stand in for the external ability-execution engine: the core decides
//! whether an ability starts or is notified, these decide what it does.

use std::collections::HashMap;
use std::sync::Arc;

use ability_core::{
    AbilityActivator, AbilityClassId, AbilityError, ActivationContext, ActivationFailure,
    ActivationOutcome, ActivationRequest, AppliedEffectHandle, EffectDescriptor, EffectEngine,
    EffectTarget, TagHandle,
};

/// Dispatches each request to the implementation registered for its class.
#[derive(Default)]
pub struct Kit<'a> {
    abilities: HashMap<AbilityClassId, Box<dyn AbilityActivator + 'a>>,
}

impl<'a> Kit<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: AbilityClassId, ability: impl AbilityActivator + 'a) -> Self {
        self.abilities.insert(class, Box::new(ability));
        self
    }

    fn ability(
        &mut self,
        request: &ActivationRequest,
    ) -> Result<&mut (dyn AbilityActivator + 'a), ActivationFailure> {
        match self.abilities.get_mut(&request.class) {
            Some(ability) => Ok(ability.as_mut()),
            None => Err(AbilityError::UnknownClass(format!("#{}", request.class.index())).into()),
        }
    }
}

impl AbilityActivator for Kit<'_> {
    fn try_activate(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<ActivationOutcome, ActivationFailure> {
        self.ability(request)?.try_activate(request, ctx)
    }

    fn input_pressed(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<(), ActivationFailure> {
        self.ability(request)?.input_pressed(request, ctx)
    }
}

// ============================================================================
// Sprint
// ============================================================================

/// Toggle: the first press applies the sprint effect, the next press removes
/// it and ends the ability.
pub struct SprintAbility {
    engine: EffectEngine,
    effect: Arc<EffectDescriptor>,
    applied: AppliedEffectHandle,
}

impl SprintAbility {
    pub fn new(engine: EffectEngine, effect: Arc<EffectDescriptor>) -> Self {
        Self {
            engine,
            effect,
            applied: AppliedEffectHandle::INVALID,
        }
    }
}

impl AbilityActivator for SprintAbility {
    fn try_activate(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<ActivationOutcome, ActivationFailure> {
        let context = self
            .engine
            .make_context(Some(request.owner))
            .with_source_ability(request.handle);
        let spec = self
            .engine
            .make_default_spec(Arc::clone(&self.effect), context)?;
        self.applied = self.engine.apply(&spec, ctx.target())?;
        tracing::info!(owner = %request.owner, key = %request.key, "sprint started");
        Ok(ActivationOutcome::Ongoing)
    }

    fn input_pressed(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<(), ActivationFailure> {
        let handle = std::mem::take(&mut self.applied);
        self.engine.remove(ctx.target(), handle)?;
        ctx.abilities.end_ability(request.handle, request.key)?;
        tracing::info!(owner = %request.owner, key = %request.key, "sprint stopped");
        Ok(())
    }
}

// ============================================================================
// Melee
// ============================================================================

/// Single hit on a victim, applied through the victim's own effect target.
///
/// Refuses to start while the attacker carries `blocked_by`.
pub struct MeleeAbility<'a> {
    engine: EffectEngine,
    effect: Arc<EffectDescriptor>,
    blocked_by: Option<TagHandle>,
    victim: Option<EffectTarget<'a>>,
}

impl<'a> MeleeAbility<'a> {
    pub fn new(engine: EffectEngine, effect: Arc<EffectDescriptor>, victim: Option<EffectTarget<'a>>) -> Self {
        Self {
            engine,
            effect,
            blocked_by: None,
            victim,
        }
    }

    pub fn blocked_by(mut self, tag: TagHandle) -> Self {
        self.blocked_by = Some(tag);
        self
    }
}

impl AbilityActivator for MeleeAbility<'_> {
    fn try_activate(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<ActivationOutcome, ActivationFailure> {
        if let Some(tag) = self.blocked_by {
            let blocked = ctx
                .target()
                .is_some_and(|target| target.active.has_granted_tag(tag));
            if blocked {
                return Err(ActivationFailure::BlockedByTag(tag));
            }
        }

        let spec = self.engine.make_default_spec(
            Arc::clone(&self.effect),
            self.engine.make_context(Some(request.owner)),
        )?;
        let victim = self.victim.as_mut().map(EffectTarget::reborrow);
        self.engine.apply(&spec, victim)?;
        tracing::info!(owner = %request.owner, effect = spec.name(), "melee hit landed");
        Ok(ActivationOutcome::Completed)
    }
}
