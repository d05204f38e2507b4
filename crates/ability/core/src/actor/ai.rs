//! AI-driven activation: abilities picked by class, no input tag involved.

use super::HasAbilityRegistry;
use crate::abilities::{AbilityActivator, AbilityClassId, AbilityError, AbilityEvent, ActivationResolver};

/// Activates the first granted spec of `class` on `actor`.
///
/// A class the actor was never granted is a normal "nothing to do" result:
/// it logs a warning and yields no events.
pub fn activate_by_class<A>(
    actor: &mut A,
    class: AbilityClassId,
    activator: &mut dyn AbilityActivator,
) -> Result<Vec<AbilityEvent>, AbilityError>
where
    A: HasAbilityRegistry + ?Sized,
{
    let resolver = ActivationResolver::new(actor.actor_id());
    let Some(handle) = actor.ability_registry().find_by_class(class) else {
        tracing::warn!(actor = %actor.actor_id(), class = class.index(), "class not granted");
        return Ok(Vec::new());
    };
    let (registry, target) = actor.ability_parts();
    resolver.try_activate_handle(registry, target, handle, activator)
}
