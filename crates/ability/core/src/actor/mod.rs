//! Actor capabilities and per-role strategies.
//!
//! Instead of a character class hierarchy, an actor exposes what it owns
//! through two capability traits. Role-specific behavior lives in small
//! strategies: [`PlayerInput`] routes input events, [`ai::activate_by_class`]
//! drives abilities without input.

pub mod ai;
mod character;
mod player;

pub use ai::activate_by_class;
pub use character::{ActorInfo, Character};
pub use player::PlayerInput;

use crate::abilities::AbilityRegistry;
use crate::attributes::AttributeStore;
use crate::effects::EffectTarget;

/// Unique identifier of an actor in the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl ActorId {
    /// Reserved identifier for the locally controlled player.
    pub const PLAYER: Self = Self(0);

    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Which strategy drives an actor's abilities.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActorRole {
    /// Input-driven.
    #[default]
    Player,
    /// AI-driven.
    Enemy,
}

/// An actor that owns attributes and the effects active on them.
pub trait HasAttributeStore {
    fn actor_id(&self) -> ActorId;

    fn attribute_store(&self) -> &AttributeStore;

    fn attribute_store_mut(&mut self) -> &mut AttributeStore;

    /// Where effects aimed at this actor land. `None` once the actor is gone.
    fn effect_target(&mut self) -> Option<EffectTarget<'_>>;
}

/// An actor that owns granted abilities.
pub trait HasAbilityRegistry: HasAttributeStore {
    fn ability_registry(&self) -> &AbilityRegistry;

    fn ability_registry_mut(&mut self) -> &mut AbilityRegistry;

    /// The registry and the effect target, borrowed together for an
    /// activation that may touch both.
    fn ability_parts(&mut self) -> (&mut AbilityRegistry, Option<EffectTarget<'_>>);
}
