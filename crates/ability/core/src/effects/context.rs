use crate::abilities::AbilitySpecHandle;
use crate::actor::ActorId;

/// Who caused an effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectContext {
    /// Actor responsible for the effect (the attacker, the sprinter).
    pub instigator: Option<ActorId>,
    /// Actor that physically delivered it, when different (a projectile owner).
    pub causer: Option<ActorId>,
    /// Ability whose execution produced the effect.
    pub source_ability: Option<AbilitySpecHandle>,
}

impl EffectContext {
    pub fn new(instigator: Option<ActorId>) -> Self {
        Self {
            instigator,
            causer: instigator,
            source_ability: None,
        }
    }

    pub fn with_causer(mut self, causer: ActorId) -> Self {
        self.causer = Some(causer);
        self
    }

    pub fn with_source_ability(mut self, handle: AbilitySpecHandle) -> Self {
        self.source_ability = Some(handle);
        self
    }
}
