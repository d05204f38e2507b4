use std::sync::Arc;

use super::{EffectContext, EffectDescriptor, ModifierInfo};

/// One pending application of an effect at a given level.
///
/// Specs are cheap to clone; the descriptor is shared.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSpec {
    descriptor: Arc<EffectDescriptor>,
    level: f32,
    context: EffectContext,
}

impl EffectSpec {
    pub(crate) fn new(descriptor: Arc<EffectDescriptor>, level: f32, context: EffectContext) -> Self {
        Self {
            descriptor,
            level,
            context,
        }
    }

    pub fn descriptor(&self) -> &EffectDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn context(&self) -> &EffectContext {
        &self.context
    }

    /// `magnitude × level` for one modifier.
    pub fn scaled_magnitude(&self, modifier: &ModifierInfo) -> f32 {
        modifier.magnitude * self.level
    }
}
