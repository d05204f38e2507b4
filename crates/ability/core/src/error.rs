//! Common error infrastructure for ability-core.
//!
//! Domain errors (`TagError`, `AttributeError`, `EffectError`, `AbilityError`)
//! live next to the module that raises them. This module holds the shared
//! classification every one of them implements.
//!
//! # Taxonomy
//!
//! - **Programming errors** (malformed tag name, missing effect class, target
//!   store gone): [`ErrorSeverity::Internal`]. They surface as `Err` values
//!   and an `error` log, never as a silent no-op.
//! - **Expected empty results** (no ability bound to a tag, no valid
//!   prediction key): not errors at all. They are `Option`s or sentinel
//!   values such as [`crate::PredictionKey::NONE`].
//! - **Idempotency violations** (double grant): [`ErrorSeverity::Validation`].

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// Can retry with the same or an alternative request.
    ///
    /// Examples: ability refused to activate because of a cooldown.
    Recoverable,

    /// Invalid input that should not be retried without changes.
    ///
    /// Examples: granting an ability that is already granted, stale handle.
    Validation,

    /// Misconfiguration caught during development.
    ///
    /// Examples: malformed tag name, effect descriptor without modifiers,
    /// effect applied to an actor whose store is gone.
    Internal,

    /// Runtime state can no longer be trusted.
    Fatal,
}

impl ErrorSeverity {
    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or misconfiguration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all ability-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by recoverability, not by gameplay impact
/// - Return a stable snake_case code from [`CoreError::error_code`]
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_and_fatal_are_internal() {
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
    }

    #[test]
    fn severity_renders_snake_case() {
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "recoverable");
        assert_eq!(ErrorSeverity::Internal.as_ref(), "internal");
    }
}
