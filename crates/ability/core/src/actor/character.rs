use std::sync::Arc;

use super::{ActorId, ActorRole, HasAbilityRegistry, HasAttributeStore};
use crate::abilities::{AbilityCatalog, AbilityClassId, AbilityError, AbilityRegistry, AbilitySpecHandle};
use crate::attributes::{AttributeId, AttributeSchema, AttributeStore};
use crate::bridge::{AttributeBridge, SharedMovement, bind_move_speed};
use crate::config::CoreConfig;
use crate::effects::{ActiveEffects, AppliedEffectHandle, EffectEngine, EffectTarget};
use crate::tags::{TagContainer, TagHandle};

/// Who owns an actor's ability state and which actor it is applied to.
///
/// For a player the owner is the player-state; for an enemy both are the
/// character itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorInfo {
    pub owner: ActorId,
    pub avatar: ActorId,
}

/// A character: attributes, active effects and granted abilities under one
/// owner.
#[derive(Debug)]
pub struct Character {
    id: ActorId,
    role: ActorRole,
    store: AttributeStore,
    effects: ActiveEffects,
    abilities: AbilityRegistry,
    info: Option<ActorInfo>,
    move_speed_bridge: Option<AttributeBridge>,
    destroyed: bool,
}

impl Character {
    pub fn new(id: ActorId, role: ActorRole, schema: Arc<AttributeSchema>, config: &CoreConfig) -> Self {
        Self {
            id,
            role,
            store: AttributeStore::with_config(schema, config),
            effects: ActiveEffects::new(),
            abilities: AbilityRegistry::new(),
            info: None,
            move_speed_bridge: None,
            destroyed: false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    pub fn info(&self) -> Option<ActorInfo> {
        self.info
    }

    pub fn active_effects(&self) -> &ActiveEffects {
        &self.effects
    }

    /// Binds the actor to its owner and mirrors `move_speed` into `movement`.
    ///
    /// Both possession and player-state replication reach this, so it runs
    /// once: the first call returns `true`, later calls return `false` and
    /// bind nothing.
    pub fn init_ability_actor_info(
        &mut self,
        owner: ActorId,
        move_speed: AttributeId,
        movement: &SharedMovement,
    ) -> bool {
        if let Some(info) = self.info {
            tracing::trace!(actor = %self.id, owner = %info.owner, "actor info already initialized");
            return false;
        }
        self.info = Some(ActorInfo {
            owner,
            avatar: self.id,
        });
        self.move_speed_bridge = Some(bind_move_speed(&mut self.store, move_speed, movement));
        tracing::debug!(actor = %self.id, %owner, role = %self.role, "ability actor info initialized");
        true
    }

    /// Grants every class at its startup input tag, carrying `status_tags`.
    pub fn grant_startup_abilities(
        &mut self,
        catalog: &AbilityCatalog,
        classes: &[AbilityClassId],
        status_tags: &[TagHandle],
    ) -> Result<Vec<AbilitySpecHandle>, AbilityError> {
        let mut handles = Vec::with_capacity(classes.len());
        for &id in classes {
            let class = catalog
                .get(id)
                .ok_or_else(|| AbilityError::UnknownClass(format!("#{}", id.index())))?;
            handles.push(
                self.abilities
                    .grant(class, class.startup_input_tag, status_tags)?,
            );
        }
        tracing::debug!(actor = %self.id, granted = handles.len(), "startup abilities granted");
        Ok(handles)
    }

    /// Ticks duration effects. Returns the handles that expired.
    pub fn advance_effects(&mut self, engine: &EffectEngine, elapsed: f32) -> Vec<AppliedEffectHandle> {
        match self.effect_target() {
            Some(target) => engine.advance(target, elapsed),
            None => Vec::new(),
        }
    }

    /// Tags granted by active effects.
    pub fn owned_tags(&self) -> TagContainer {
        self.effects.granted_tags()
    }

    /// Marks the actor gone. Its store no longer accepts effects.
    pub fn destroy(&mut self) {
        if let Some(bridge) = self.move_speed_bridge.take() {
            bridge.unbind(&mut self.store);
        }
        self.destroyed = true;
        tracing::debug!(actor = %self.id, "actor destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl HasAttributeStore for Character {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn attribute_store(&self) -> &AttributeStore {
        &self.store
    }

    fn attribute_store_mut(&mut self) -> &mut AttributeStore {
        &mut self.store
    }

    fn effect_target(&mut self) -> Option<EffectTarget<'_>> {
        if self.destroyed {
            return None;
        }
        Some(EffectTarget::new(&mut self.store, &mut self.effects))
    }
}

impl HasAbilityRegistry for Character {
    fn ability_registry(&self) -> &AbilityRegistry {
        &self.abilities
    }

    fn ability_registry_mut(&mut self) -> &mut AbilityRegistry {
        &mut self.abilities
    }

    fn ability_parts(&mut self) -> (&mut AbilityRegistry, Option<EffectTarget<'_>>) {
        let target = if self.destroyed {
            None
        } else {
            Some(EffectTarget::new(&mut self.store, &mut self.effects))
        };
        (&mut self.abilities, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::InstancingPolicy;
    use crate::attributes::AttributeDescriptor;
    use crate::bridge::MovementLimits;
    use crate::effects::EffectDescriptor;
    use crate::tags::TagRegistry;

    fn character() -> (Character, AttributeId) {
        let mut schema = AttributeSchema::new();
        let speed = schema
            .declare(AttributeDescriptor::new("MoveSpeed", 600.0))
            .unwrap();
        let character = Character::new(
            ActorId(7),
            ActorRole::Player,
            Arc::new(schema),
            &CoreConfig::default(),
        );
        (character, speed)
    }

    #[test]
    fn actor_info_initializes_once() {
        let (mut character, speed) = character();
        let movement = SharedMovement::default();

        assert!(character.init_ability_actor_info(ActorId::PLAYER, speed, &movement));
        assert!(!character.init_ability_actor_info(ActorId(99), speed, &movement));
        assert_eq!(
            character.info(),
            Some(ActorInfo {
                owner: ActorId::PLAYER,
                avatar: ActorId(7),
            })
        );
        // One bridge, so one listener.
        assert_eq!(character.attribute_store().listener_count(), 1);
        assert_eq!(
            *movement.lock().unwrap(),
            MovementLimits {
                max_walk_speed: 600.0
            }
        );
    }

    #[test]
    fn startup_abilities_use_their_startup_input_tag() {
        let mut tags = TagRegistry::new();
        let input = tags.register("InputTag.Sprint", "").unwrap();
        let equipped = tags.register("Ability.Status.Equipped", "").unwrap();
        let mut catalog = AbilityCatalog::new();
        let sprint = catalog
            .register("GA_Sprint")
            .unwrap()
            .with_startup_input_tag(input)
            .with_instancing(InstancingPolicy::InstancedPerActor)
            .id;

        let (mut character, _) = character();
        let handles = character
            .grant_startup_abilities(&catalog, &[sprint], &[equipped])
            .unwrap();
        let spec = character.ability_registry().spec(handles[0]).unwrap();
        assert_eq!(spec.input_tag(), Some(input));
        assert!(spec.has_dynamic_tag(equipped));

        assert!(matches!(
            character.grant_startup_abilities(&catalog, &[sprint], &[]),
            Err(AbilityError::AlreadyGranted { .. })
        ));
    }

    #[test]
    fn destroyed_actor_rejects_effects() {
        let (mut character, speed) = character();
        let engine = EffectEngine::default();
        let haste = Arc::new(EffectDescriptor::instant("Haste").add(speed, 50.0));
        let spec = engine
            .make_default_spec(haste, engine.make_context(None))
            .unwrap();

        character.destroy();
        assert!(character.effect_target().is_none());
        assert!(engine.apply(&spec, character.effect_target()).is_err());
        assert_eq!(character.attribute_store().get_value(speed), 600.0);
    }
}
