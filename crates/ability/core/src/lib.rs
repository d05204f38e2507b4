//! Tag-driven ability activation and attribute mutation runtime.
//!
//! `ability-core` is the application layer a character sits on: a tag
//! registry, per-actor attribute stores, an effect application engine, an
//! ability registry with an input-driven activation resolver, and bridges
//! that mirror attribute changes into other subsystems.
//!
//! # Flow
//!
//! ```text
//! input {tag, phase}
//!      ↓
//! [ ActivationResolver ] ── lookup by input tag ──> [ AbilityRegistry ]
//!      ↓ activate / notify
//! [ AbilityActivator ] (external ability execution)
//!      ↓
//! [ EffectEngine ] ──> [ AttributeStore ] ──> change listeners
//!                                               ├─ AttributeBridge (movement, ...)
//!                                               └─ ReplicationOutbox (transport)
//! ```
//!
//! All operations are synchronous. Each store and registry has exactly one
//! writer: the owning actor's update path.
pub mod abilities;
pub mod actor;
pub mod attributes;
pub mod bridge;
pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod replication;
pub mod tags;

pub use abilities::{
    AbilityActivator, AbilityCatalog, AbilityClass, AbilityClassId, AbilityError, AbilityEvent,
    AbilityInstance, AbilityListLock, AbilityRegistry, AbilitySpec, AbilitySpecHandle,
    AbilityState, ActivationContext, ActivationFailure, ActivationOutcome, ActivationRequest,
    ActivationResolver, InstancingPolicy, PredictionKey, PredictionKeyGenerator,
};
pub use actor::{
    ActorId, ActorInfo, ActorRole, Character, HasAbilityRegistry, HasAttributeStore, PlayerInput,
    activate_by_class,
};
pub use attributes::{
    AttributeBound, AttributeChange, AttributeDescriptor, AttributeError, AttributeFlags,
    AttributeId, AttributeSchema, AttributeStore, AttributeValue, ListenerId,
};
pub use bridge::{AttributeBridge, MovementLimits, SharedMovement, bind_move_speed};
pub use config::CoreConfig;
pub use effects::{
    ActiveEffects, AppliedEffectHandle, EffectContext, EffectDescriptor, EffectDuration,
    EffectDurationKind, EffectEngine, EffectError, EffectLibrary, EffectSpec, EffectTarget,
    ModifierInfo, ModifierOp,
};
pub use error::{CoreError, ErrorSeverity};
pub use input::{InputBinding, InputConfig, InputEvent, InputPhase};
pub use replication::{ReplicatedEvent, ReplicationOutbox};
pub use tags::{NativeTags, TagContainer, TagError, TagHandle, TagRegistry};
