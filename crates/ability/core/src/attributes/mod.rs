//! Attribute schema and per-actor attribute stores.
//!
//! - [`AttributeSchema`]: declared once from code or data, immutable afterwards
//! - [`AttributeStore`]: one per actor, the only place attribute values live
//!
//! Every committed change is reported synchronously, exactly once, to the
//! store's listeners. Redundant writes (new == old) report nothing.

mod descriptor;
mod store;

pub use descriptor::{AttributeBound, AttributeDescriptor, AttributeFlags, AttributeId, AttributeSchema, names};
pub use store::{AttributeChange, AttributeStore, AttributeValue, ListenerId};
pub(crate) use store::clamp_between;

use crate::error::{CoreError, ErrorSeverity};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("attribute {0:?} is not declared in this schema")]
    UnknownAttribute(AttributeId),

    #[error("attribute '{0}' is not declared in this schema")]
    UnknownName(String),

    #[error("attribute '{0}' is declared twice")]
    DuplicateName(String),

    #[error("attribute '{attribute}' pairs with undeclared max {max:?}")]
    InvalidPairing { attribute: String, max: AttributeId },
}

impl CoreError for AttributeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAttribute(_) => "unknown_attribute",
            Self::UnknownName(_) => "unknown_attribute_name",
            Self::DuplicateName(_) => "duplicate_attribute",
            Self::InvalidPairing { .. } => "invalid_attribute_pairing",
        }
    }
}
