use super::{EffectError, InvalidEffectReason};
use crate::attributes::{AttributeId, AttributeSchema};
use crate::tags::{TagContainer, TagHandle};

// ============================================================================
// Modifiers
// ============================================================================

/// How a modifier combines its scaled magnitude with the current value.
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
pub enum ModifierOp {
    /// `value + magnitude × level`
    #[default]
    Add,
    /// `value × (magnitude × level)`
    Multiply,
    /// `magnitude × level`
    Override,
}

impl ModifierOp {
    pub fn evaluate(self, current: f32, scaled: f32) -> f32 {
        match self {
            Self::Add => current + scaled,
            Self::Multiply => current * scaled,
            Self::Override => scaled,
        }
    }
}

/// One attribute mutation inside an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierInfo {
    pub attribute: AttributeId,
    pub op: ModifierOp,
    /// Base magnitude at level 1.
    pub magnitude: f32,
}

impl ModifierInfo {
    pub fn new(attribute: AttributeId, op: ModifierOp, magnitude: f32) -> Self {
        Self {
            attribute,
            op,
            magnitude,
        }
    }

    pub fn add(attribute: AttributeId, magnitude: f32) -> Self {
        Self::new(attribute, ModifierOp::Add, magnitude)
    }
}

// ============================================================================
// Duration
// ============================================================================

/// Lifetime of an applied effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(EffectDurationKind),
    derive(strum::Display, strum::EnumString, strum::AsRefStr, Hash)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Commits once; nothing to remove later.
    #[default]
    Instant,
    /// Active until explicitly removed.
    Infinite,
    /// Active for the given number of seconds of [`crate::EffectEngine::advance`].
    HasDuration(f32),
}

impl EffectDuration {
    pub fn kind(self) -> EffectDurationKind {
        self.into()
    }

    pub fn is_instant(self) -> bool {
        matches!(self, Self::Instant)
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Static definition of an effect, usually loaded from content.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDescriptor {
    pub name: String,
    pub duration: EffectDuration,
    pub modifiers: Vec<ModifierInfo>,
    /// Tags the owner carries while the effect is active. Ignored for
    /// instant effects.
    pub granted_tags: TagContainer,
}

impl EffectDescriptor {
    pub fn new(name: impl Into<String>, duration: EffectDuration) -> Self {
        Self {
            name: name.into(),
            duration,
            modifiers: Vec::new(),
            granted_tags: TagContainer::new(),
        }
    }

    pub fn instant(name: impl Into<String>) -> Self {
        Self::new(name, EffectDuration::Instant)
    }

    pub fn infinite(name: impl Into<String>) -> Self {
        Self::new(name, EffectDuration::Infinite)
    }

    pub fn timed(name: impl Into<String>, seconds: f32) -> Self {
        Self::new(name, EffectDuration::HasDuration(seconds))
    }

    pub fn with_modifier(mut self, modifier: ModifierInfo) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn add(self, attribute: AttributeId, magnitude: f32) -> Self {
        self.with_modifier(ModifierInfo::add(attribute, magnitude))
    }

    pub fn granting(mut self, tag: TagHandle) -> Self {
        self.granted_tags.add(tag);
        self
    }

    /// Checks the descriptor against the schema of the store it will touch.
    pub fn validate(&self, schema: &AttributeSchema) -> Result<(), EffectError> {
        let invalid = |reason| EffectError::InvalidEffectClass {
            effect: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid(InvalidEffectReason::EmptyName));
        }
        if self.modifiers.is_empty() && self.granted_tags.is_empty() {
            return Err(invalid(InvalidEffectReason::NoModifiers));
        }
        if let EffectDuration::HasDuration(seconds) = self.duration {
            if !(seconds.is_finite() && seconds > 0.0) {
                return Err(invalid(InvalidEffectReason::NonPositiveDuration(seconds)));
            }
        }
        for modifier in &self.modifiers {
            if !schema.contains(modifier.attribute) {
                return Err(invalid(InvalidEffectReason::UnknownAttribute(
                    modifier.attribute,
                )));
            }
            if !modifier.magnitude.is_finite() {
                return Err(invalid(InvalidEffectReason::NonFiniteMagnitude(
                    modifier.magnitude,
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::attributes::AttributeDescriptor;

    fn schema() -> (AttributeSchema, AttributeId) {
        let mut schema = AttributeSchema::new();
        let speed = schema
            .declare(AttributeDescriptor::new("MoveSpeed", 600.0))
            .unwrap();
        (schema, speed)
    }

    #[test]
    fn op_evaluation() {
        assert_eq!(ModifierOp::Add.evaluate(600.0, 50.0), 650.0);
        assert_eq!(ModifierOp::Multiply.evaluate(600.0, 1.5), 900.0);
        assert_eq!(ModifierOp::Override.evaluate(600.0, 300.0), 300.0);
        assert_eq!(ModifierOp::from_str("Multiply"), Ok(ModifierOp::Multiply));
    }

    #[test]
    fn duration_kind_names() {
        assert_eq!(EffectDuration::HasDuration(3.0).kind(), EffectDurationKind::HasDuration);
        assert_eq!(EffectDurationKind::Infinite.to_string(), "Infinite");
    }

    #[test]
    fn validate_rejects_malformed_descriptors() {
        let (schema, speed) = schema();

        assert!(EffectDescriptor::infinite("Sprint").add(speed, 150.0).validate(&schema).is_ok());

        let cases = [
            (EffectDescriptor::instant("").add(speed, 1.0), InvalidEffectReason::EmptyName),
            (EffectDescriptor::instant("Nothing"), InvalidEffectReason::NoModifiers),
            (
                EffectDescriptor::timed("Haste", 0.0).add(speed, 1.0),
                InvalidEffectReason::NonPositiveDuration(0.0),
            ),
            (
                EffectDescriptor::instant("Inf").add(speed, f32::INFINITY),
                InvalidEffectReason::NonFiniteMagnitude(f32::INFINITY),
            ),
        ];
        for (descriptor, expected) in cases {
            match descriptor.validate(&schema) {
                Err(EffectError::InvalidEffectClass { reason, .. }) => assert_eq!(reason, expected),
                other => panic!("expected {expected:?}, got {other:?}"),
            }
        }
    }
}
