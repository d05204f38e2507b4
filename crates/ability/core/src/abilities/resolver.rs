use super::{
    AbilityClassId, AbilityError, AbilityRegistry, AbilitySpecHandle, AbilityState, PredictionKey,
};
use crate::actor::ActorId;
use crate::effects::{EffectError, EffectTarget};
use crate::error::{CoreError, ErrorSeverity};
use crate::tags::TagHandle;

// ============================================================================
// Ability execution boundary
// ============================================================================

/// Everything an ability implementation learns about one activation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationRequest {
    pub owner: ActorId,
    pub handle: AbilitySpecHandle,
    pub class: AbilityClassId,
    /// Key issued for this attempt; valid for every request.
    pub key: PredictionKey,
    /// Input that triggered the request, `None` for AI-driven activation.
    pub input_tag: Option<TagHandle>,
}

/// Mutable state an ability implementation may touch while it runs.
///
/// `abilities` is the owner's registry behind the scan lock, so grants and
/// revokes made here are deferred until the scan finishes.
#[derive(Debug)]
pub struct ActivationContext<'a> {
    pub abilities: &'a mut AbilityRegistry,
    /// The owner's own attributes and active effects, if still available.
    pub target: Option<EffectTarget<'a>>,
}

impl ActivationContext<'_> {
    /// Shorter-lived view of the owner's effect target.
    pub fn target(&mut self) -> Option<EffectTarget<'_>> {
        self.target.as_mut().map(EffectTarget::reborrow)
    }
}

/// Result of a successful activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The ability keeps running until it calls
    /// [`AbilityRegistry::end_ability`].
    #[default]
    Ongoing,
    /// The ability finished inside `try_activate` (a single hit).
    Completed,
}

/// Why an ability implementation refused or failed to start.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ActivationFailure {
    #[error("blocked by tag {0:?}")]
    BlockedByTag(TagHandle),

    #[error("cannot afford cost: {0}")]
    CannotAfford(String),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Ability(#[from] AbilityError),
}

impl CoreError for ActivationFailure {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BlockedByTag(_) | Self::CannotAfford(_) => ErrorSeverity::Recoverable,
            Self::Effect(err) => err.severity(),
            Self::Ability(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BlockedByTag(_) => "activation_blocked",
            Self::CannotAfford(_) => "activation_cost",
            Self::Effect(err) => err.error_code(),
            Self::Ability(err) => err.error_code(),
        }
    }
}

/// The external ability-execution engine.
///
/// The resolver decides *whether* to start or notify an ability; the
/// activator decides *how* it runs.
pub trait AbilityActivator {
    /// Starts the ability described by `request`.
    fn try_activate(
        &mut self,
        request: &ActivationRequest,
        ctx: &mut ActivationContext<'_>,
    ) -> Result<ActivationOutcome, ActivationFailure>;

    /// The bound input was pressed again while the ability is active.
    ///
    /// `request.key` is the spec's current correlation key. Default: ignore.
    fn input_pressed(
        &mut self,
        _request: &ActivationRequest,
        _ctx: &mut ActivationContext<'_>,
    ) -> Result<(), ActivationFailure> {
        Ok(())
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Outcome of one resolver step, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum AbilityEvent {
    Activated {
        handle: AbilitySpecHandle,
        key: PredictionKey,
    },
    ActivationFailed {
        handle: AbilitySpecHandle,
        reason: ActivationFailure,
    },
    /// Replicated to the authority: input pressed on an already active ability.
    InputPressed {
        handle: AbilitySpecHandle,
        key: PredictionKey,
    },
    Ended {
        handle: AbilitySpecHandle,
        key: PredictionKey,
    },
}

/// Routes input tags to granted abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivationResolver {
    owner: ActorId,
}

impl ActivationResolver {
    pub fn new(owner: ActorId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Handles a press of `tag`.
    ///
    /// The ability list stays locked for the whole scan. For every spec whose
    /// dynamic tags contain exactly `tag`:
    /// - `Active`: emit [`AbilityEvent::InputPressed`] with the spec's current
    ///   key, then forward the press to the activator. Never re-activates.
    /// - `GrantedInactive`: activate through the activator.
    /// - `Activating` / `Ending`: ignored.
    ///
    /// A tag with no bound ability yields no events.
    pub fn on_input_tag_pressed(
        &self,
        registry: &mut AbilityRegistry,
        mut target: Option<EffectTarget<'_>>,
        tag: TagHandle,
        activator: &mut dyn AbilityActivator,
    ) -> Vec<AbilityEvent> {
        let mut events = Vec::new();
        let mut lock = registry.lock();

        let handles = lock.handles_matching_input(tag);
        tracing::trace!(?tag, matches = handles.len(), "input pressed");

        for handle in handles {
            if lock.is_pending_revoke(handle) {
                continue;
            }
            lock.set_input_pressed(handle);
            let Some(state) = lock.spec(handle).map(|spec| spec.state()) else {
                continue;
            };

            match state {
                AbilityState::Active => {
                    let key = lock.prediction_key_for(handle);
                    events.push(AbilityEvent::InputPressed { handle, key });

                    let Some(request) = self.request(&lock, handle, key, Some(tag)) else {
                        continue;
                    };
                    let mut ctx = ActivationContext {
                        abilities: &mut lock,
                        target: target.as_mut().map(EffectTarget::reborrow),
                    };
                    if let Err(failure) = activator.input_pressed(&request, &mut ctx) {
                        tracing::warn!(%handle, %failure, "input press handling failed");
                    }
                    Self::collect_end(&lock, handle, key, &mut events);
                }
                AbilityState::GrantedInactive => {
                    let target = target.as_mut().map(EffectTarget::reborrow);
                    if let Err(err) =
                        self.activate(&mut lock, target, handle, Some(tag), activator, &mut events)
                    {
                        tracing::warn!(%handle, error = %err, "activation rejected");
                    }
                }
                AbilityState::Activating | AbilityState::Ending => {
                    tracing::trace!(%handle, %state, "press ignored");
                }
            }
        }

        events
    }

    /// Release hook. Press/release semantics belong to the ability itself.
    pub fn on_input_tag_released(&self, tag: TagHandle) {
        tracing::trace!(?tag, "input released");
    }

    /// Held hook. Press/release semantics belong to the ability itself.
    pub fn on_input_tag_held(&self, tag: TagHandle) {
        tracing::trace!(?tag, "input held");
    }

    /// Activates one spec directly, without an input tag (AI-driven).
    pub fn try_activate_handle(
        &self,
        registry: &mut AbilityRegistry,
        target: Option<EffectTarget<'_>>,
        handle: AbilitySpecHandle,
        activator: &mut dyn AbilityActivator,
    ) -> Result<Vec<AbilityEvent>, AbilityError> {
        let mut events = Vec::new();
        let mut lock = registry.lock();
        self.activate(&mut lock, target, handle, None, activator, &mut events)?;
        Ok(events)
    }

    fn activate(
        &self,
        registry: &mut AbilityRegistry,
        target: Option<EffectTarget<'_>>,
        handle: AbilitySpecHandle,
        input_tag: Option<TagHandle>,
        activator: &mut dyn AbilityActivator,
        events: &mut Vec<AbilityEvent>,
    ) -> Result<(), AbilityError> {
        let key = registry.begin_activation(handle)?;
        let request = self
            .request(registry, handle, key, input_tag)
            .ok_or(AbilityError::InvalidHandle(handle))?;

        let mut ctx = ActivationContext {
            abilities: registry,
            target,
        };
        let outcome = activator.try_activate(&request, &mut ctx);

        match outcome {
            Ok(outcome) => {
                registry.confirm_activation(handle, key)?;
                tracing::debug!(%handle, %key, ?outcome, "ability activated");
                events.push(AbilityEvent::Activated { handle, key });
                if outcome == ActivationOutcome::Completed {
                    registry.end_ability(handle, key)?;
                }
                Self::collect_end(registry, handle, key, events);
            }
            Err(reason) => {
                registry.cancel_activation(handle)?;
                tracing::debug!(%handle, %reason, "ability refused to activate");
                events.push(AbilityEvent::ActivationFailed { handle, reason });
            }
        }
        Ok(())
    }

    fn request(
        &self,
        registry: &AbilityRegistry,
        handle: AbilitySpecHandle,
        key: PredictionKey,
        input_tag: Option<TagHandle>,
    ) -> Option<ActivationRequest> {
        let spec = registry.spec(handle)?;
        Some(ActivationRequest {
            owner: self.owner,
            handle,
            class: spec.class(),
            key,
            input_tag,
        })
    }

    /// Records [`AbilityEvent::Ended`] if the execution keyed by `key` is gone.
    fn collect_end(
        registry: &AbilityRegistry,
        handle: AbilitySpecHandle,
        key: PredictionKey,
        events: &mut Vec<AbilityEvent>,
    ) {
        let ended = key.is_valid()
            && !registry
                .spec(handle)
                .is_some_and(|spec| spec.has_live_instance(key));
        if ended {
            events.push(AbilityEvent::Ended { handle, key });
        }
    }
}
