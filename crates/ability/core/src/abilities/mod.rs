//! Ability registry and input-driven activation.
//!
//! - [`AbilityCatalog`]: every ability class known to the session
//! - [`AbilityRegistry`]: one per actor; generational arena of granted specs
//! - [`ActivationResolver`]: maps input tags to specs and decides between
//!   activating and notifying an already active ability
//! - [`AbilityActivator`]: the ability-execution boundary
//!
//! Correlation keys follow one rule everywhere: the primary instance's key
//! if valid, else any live instance's valid key, else [`PredictionKey::NONE`].

mod class;
mod prediction;
mod registry;
mod resolver;
mod spec;

pub use class::{AbilityCatalog, AbilityClass, AbilityClassId, InstancingPolicy};
pub use prediction::{PredictionKey, PredictionKeyGenerator};
pub use registry::{AbilityListLock, AbilityRegistry};
pub use resolver::{
    AbilityActivator, AbilityEvent, ActivationContext, ActivationFailure, ActivationOutcome,
    ActivationRequest, ActivationResolver,
};
pub use spec::{AbilityInstance, AbilitySpec, AbilitySpecHandle, AbilityState};

use crate::error::{CoreError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbilityError {
    #[error("ability already granted as {existing}")]
    AlreadyGranted { existing: AbilitySpecHandle },

    #[error("ability handle {0} is stale or was never granted")]
    InvalidHandle(AbilitySpecHandle),

    #[error("ability {handle} cannot go from {from} to {to}")]
    InvalidTransition {
        handle: AbilitySpecHandle,
        from: AbilityState,
        to: AbilityState,
    },

    #[error("ability {handle} has no free instance slot")]
    InstanceLimit { handle: AbilitySpecHandle },

    #[error("ability {handle} has no live instance keyed {key}")]
    UnknownPredictionKey {
        handle: AbilitySpecHandle,
        key: PredictionKey,
    },

    #[error("spec carries more than {limit} dynamic tags")]
    TooManyTags { limit: usize },

    #[error("ability class '{0}' is registered twice")]
    DuplicateClass(String),

    #[error("ability class '{0}' is not in the catalog")]
    UnknownClass(String),
}

impl CoreError for AbilityError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InstanceLimit { .. } => ErrorSeverity::Recoverable,
            Self::AlreadyGranted { .. }
            | Self::InvalidHandle(_)
            | Self::UnknownPredictionKey { .. }
            | Self::UnknownClass(_) => ErrorSeverity::Validation,
            Self::InvalidTransition { .. } | Self::TooManyTags { .. } | Self::DuplicateClass(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyGranted { .. } => "ability_already_granted",
            Self::InvalidHandle(_) => "invalid_ability_handle",
            Self::InvalidTransition { .. } => "invalid_ability_transition",
            Self::InstanceLimit { .. } => "ability_instance_limit",
            Self::UnknownPredictionKey { .. } => "unknown_prediction_key",
            Self::TooManyTags { .. } => "too_many_spec_tags",
            Self::DuplicateClass(_) => "duplicate_ability_class",
            Self::UnknownClass(_) => "unknown_ability_class",
        }
    }
}
