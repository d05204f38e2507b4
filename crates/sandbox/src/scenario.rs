//! The scripted session: one player, one enemy, a handful of presses.

use std::sync::{Arc, Mutex, PoisonError};

use ability_content::ContentFactory;
use ability_core::attributes::names;
use ability_core::{
    AbilityEvent, ActorId, ActorRole, AttributeSchema, Character, CoreConfig, EffectEngine, HasAttributeStore,
    InputEvent, MovementLimits, NativeTags, PlayerInput, ReplicatedEvent, ReplicationOutbox,
    SharedMovement, TagRegistry, activate_by_class,
};
use anyhow::{Context, Result};

use crate::abilities::{Kit, MeleeAbility, SprintAbility};
use crate::config::SandboxConfig;

/// What the session left behind.
#[derive(Debug)]
pub struct Report {
    pub events: Vec<AbilityEvent>,
    pub replicated: Vec<ReplicatedEvent>,
    pub player_health: f32,
    pub enemy_health: f32,
    pub max_walk_speed: f32,
}

/// Player presses, in order.
const SCRIPT: [&str; 4] = ["IA_Sprint", "IA_LightAttack", "IA_Sprint", "IA_LightAttack"];

pub fn run(config: &SandboxConfig) -> Result<Report> {
    let factory = ContentFactory::new(&config.data_dir);
    let core_config = factory.load_config()?;

    let mut tags = TagRegistry::with_config(&core_config);
    let native = NativeTags::initialize(&mut tags)?;
    let schema = Arc::new(factory.load_attributes(&tags)?);
    let effects = factory.load_effects(&schema, &tags)?;
    let content = factory.load_abilities(&tags)?;
    let input = factory.load_input(&tags)?;

    let move_speed = schema
        .find(&config.move_speed_attribute)
        .with_context(|| format!("unknown move speed attribute '{}'", config.move_speed_attribute))?;
    let health = schema.resolve(names::HEALTH)?;

    let engine = EffectEngine::new(&core_config);
    let outbox = ReplicationOutbox::new();
    let player_movement: SharedMovement = Arc::new(Mutex::new(MovementLimits::default()));
    let enemy_movement: SharedMovement = Arc::new(Mutex::new(MovementLimits::default()));

    let mut player = spawn(ActorId::PLAYER, ActorRole::Player, &schema, &core_config);
    let mut enemy = spawn(ActorId(1), ActorRole::Enemy, &schema, &core_config);

    // Possession and player-state replication both initialize the player.
    player.init_ability_actor_info(ActorId::PLAYER, move_speed, &player_movement);
    player.init_ability_actor_info(ActorId::PLAYER, move_speed, &player_movement);
    enemy.init_ability_actor_info(enemy.id(), move_speed, &enemy_movement);

    outbox.attach(player.attribute_store_mut());
    outbox.attach(enemy.attribute_store_mut());

    for character in [&mut player, &mut enemy] {
        match content.startup_for(character.role()) {
            Some(grants) => {
                character.grant_startup_abilities(&content.catalog, &grants.classes, &grants.status_tags)?;
            }
            None => tracing::warn!(actor = %character.id(), role = %character.role(), "no startup grants"),
        }
    }

    let sprint_class = content.catalog.resolve("GA_Sprint")?.id;
    let light_attack_class = content.catalog.resolve("GA_LightAttack")?.id;
    let sprint_effect = effects.require("GE_Sprint")?;
    let light_hit = effects.require("GE_LightHit")?;

    let mut events = Vec::new();
    {
        let controls = PlayerInput::new(ActorId::PLAYER, input, outbox.clone());
        let mut kit = Kit::new()
            .with(sprint_class, SprintAbility::new(engine.clone(), Arc::clone(&sprint_effect)))
            .with(
                light_attack_class,
                MeleeAbility::new(engine.clone(), Arc::clone(&light_hit), enemy.effect_target())
                    .blocked_by(native.state_sprint),
            );

        for action in SCRIPT {
            let produced = controls.handle(&mut player, &InputEvent::pressed(action), &mut kit);
            for event in &produced {
                log_event(ActorId::PLAYER, action, event);
            }
            tracing::info!(
                action,
                max_walk_speed = max_walk_speed(&player_movement),
                "input handled"
            );
            events.extend(produced);
        }
    }

    {
        let mut kit = Kit::new().with(
            light_attack_class,
            MeleeAbility::new(engine.clone(), light_hit, player.effect_target()),
        );
        let produced = activate_by_class(&mut enemy, light_attack_class, &mut kit)?;
        for event in &produced {
            log_event(enemy.id(), "ai", event);
        }
        events.extend(produced);
    }

    let replicated = outbox.drain();
    for record in &replicated {
        tracing::debug!(?record, "replicated");
    }

    Ok(Report {
        events,
        replicated,
        player_health: player.attribute_store().get_value(health),
        enemy_health: enemy.attribute_store().get_value(health),
        max_walk_speed: max_walk_speed(&player_movement),
    })
}

fn spawn(id: ActorId, role: ActorRole, schema: &Arc<AttributeSchema>, config: &CoreConfig) -> Character {
    Character::new(id, role, Arc::clone(schema), config)
}

fn max_walk_speed(movement: &SharedMovement) -> f32 {
    movement
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .max_walk_speed
}

fn log_event(actor: ActorId, source: &str, event: &AbilityEvent) {
    match event {
        AbilityEvent::ActivationFailed { handle, reason } => {
            tracing::info!(%actor, source, ?handle, %reason, "activation refused");
        }
        other => tracing::info!(%actor, source, event = ?other, "ability event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ability_core::ActivationFailure;

    #[test]
    fn bundled_session_plays_out() {
        let report = run(&SandboxConfig::default()).unwrap();

        assert_eq!(report.enemy_health, 70.0);
        assert_eq!(report.player_health, 70.0);
        assert_eq!(report.max_walk_speed, 600.0);

        assert!(matches!(report.events[0], AbilityEvent::Activated { .. }));
        assert!(matches!(
            report.events[1],
            AbilityEvent::ActivationFailed {
                reason: ActivationFailure::BlockedByTag(_),
                ..
            }
        ));
        assert!(matches!(report.events[2], AbilityEvent::InputPressed { .. }));
        assert!(matches!(report.events[3], AbilityEvent::Ended { .. }));

        assert!(
            report
                .replicated
                .iter()
                .any(|record| matches!(record, ReplicatedEvent::AbilityInputPressed { .. }))
        );
        assert!(
            report
                .replicated
                .iter()
                .any(|record| matches!(record, ReplicatedEvent::Attribute { new, .. } if *new == 70.0))
        );
    }

    #[test]
    fn unknown_move_speed_attribute_fails() {
        let config = SandboxConfig {
            move_speed_attribute: "WalkSpeed".to_owned(),
            ..SandboxConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert!(err.to_string().contains("WalkSpeed"));
    }
}
