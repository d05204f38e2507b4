use super::{ActorId, HasAbilityRegistry};
use crate::abilities::{AbilityActivator, AbilityEvent, ActivationResolver};
use crate::input::{InputConfig, InputEvent, InputPhase};
use crate::replication::{ReplicatedEvent, ReplicationOutbox};

/// Input-driven strategy for a player-controlled actor.
///
/// Translates `{action, phase}` events into input tags, hands presses to the
/// [`ActivationResolver`] and forwards `InputPressed` events to the outbox.
#[derive(Clone, Debug)]
pub struct PlayerInput {
    config: InputConfig,
    resolver: ActivationResolver,
    outbox: ReplicationOutbox,
}

impl PlayerInput {
    pub fn new(owner: ActorId, config: InputConfig, outbox: ReplicationOutbox) -> Self {
        Self {
            config,
            resolver: ActivationResolver::new(owner),
            outbox,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ActivationResolver {
        &self.resolver
    }

    /// Routes one input event. Unbound actions yield no events.
    pub fn handle<A>(
        &self,
        actor: &mut A,
        event: &InputEvent,
        activator: &mut dyn AbilityActivator,
    ) -> Vec<AbilityEvent>
    where
        A: HasAbilityRegistry + ?Sized,
    {
        let Some(tag) = self.config.find_tag_for_action(&event.action) else {
            return Vec::new();
        };

        match event.phase {
            InputPhase::Pressed => {
                let (registry, target) = actor.ability_parts();
                let events = self
                    .resolver
                    .on_input_tag_pressed(registry, target, tag, activator);
                for event in &events {
                    if let AbilityEvent::InputPressed { handle, key } = *event {
                        self.outbox
                            .push(ReplicatedEvent::AbilityInputPressed { handle, key });
                    }
                }
                events
            }
            InputPhase::Released => {
                self.resolver.on_input_tag_released(tag);
                Vec::new()
            }
            InputPhase::Held => {
                self.resolver.on_input_tag_held(tag);
                Vec::new()
            }
        }
    }
}
