//! Effect application engine.
//!
//! An effect is a described mutation of one or more attributes:
//!
//! ```text
//! EffectDescriptor ──make_spec(level, context)──> EffectSpec
//!                                                    ↓ apply
//!                              EffectTarget { AttributeStore, ActiveEffects }
//! ```
//!
//! Instant effects commit and are forgotten ([`AppliedEffectHandle::INVALID`]).
//! Infinite and duration effects record the delta they actually committed, so
//! [`EffectEngine::remove`] restores the attribute exactly.

mod context;
mod descriptor;
mod engine;
mod library;
mod spec;

pub use context::EffectContext;
pub use descriptor::{EffectDescriptor, EffectDuration, EffectDurationKind, ModifierInfo, ModifierOp};
pub use engine::{ActiveEffects, AppliedEffectHandle, EffectEngine, EffectTarget};
pub use library::EffectLibrary;
pub use spec::EffectSpec;

use crate::attributes::AttributeId;
use crate::error::{CoreError, ErrorSeverity};

/// Why an effect descriptor was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidEffectReason {
    EmptyName,
    /// Neither modifiers nor granted tags.
    NoModifiers,
    UnknownAttribute(AttributeId),
    NonFiniteMagnitude(f32),
    NonPositiveDuration(f32),
    NonFiniteLevel(f32),
    /// A modifier would commit (or record) a non-finite value.
    NonFiniteResult(AttributeId),
}

impl core::fmt::Display for InvalidEffectReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "descriptor has no name"),
            Self::NoModifiers => write!(f, "descriptor has no modifiers and grants no tags"),
            Self::UnknownAttribute(attr) => {
                write!(f, "modifier targets {attr:?}, which the target does not declare")
            }
            Self::NonFiniteMagnitude(m) => write!(f, "modifier magnitude {m} is not finite"),
            Self::NonPositiveDuration(s) => write!(f, "duration {s}s must be positive"),
            Self::NonFiniteLevel(l) => write!(f, "level {l} is not finite"),
            Self::NonFiniteResult(attr) => write!(f, "modifier on {attr:?} produces a non-finite value"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// The target store is unavailable (actor destroyed mid-application).
    #[error("effect target is unavailable")]
    InvalidTarget,

    #[error("invalid effect '{effect}': {reason}")]
    InvalidEffectClass {
        effect: String,
        reason: InvalidEffectReason,
    },

    #[error("effect '{0}' is not in the library")]
    UnknownEffect(String),
}

impl CoreError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTarget | Self::InvalidEffectClass { .. } => ErrorSeverity::Internal,
            Self::UnknownEffect(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_effect_target",
            Self::InvalidEffectClass { .. } => "invalid_effect_class",
            Self::UnknownEffect(_) => "unknown_effect",
        }
    }
}
