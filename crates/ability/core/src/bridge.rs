//! Mirrors attribute changes into systems outside the ability core.
//!
//! A bridge is one more store listener: it runs synchronously inside the
//! commit that produced the change, so the dependent system is updated before
//! the effect application that caused it returns.

use std::sync::{Arc, Mutex, PoisonError};

use crate::attributes::{AttributeId, AttributeStore, ListenerId};

/// A bound `callback(old, new)` for one attribute.
///
/// Binding is not deduplicated: binding the same attribute twice runs both
/// callbacks for every change. Owners bind once per lifetime (see
/// [`crate::Character::init_ability_actor_info`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBridge {
    attribute: AttributeId,
    listener: ListenerId,
}

impl AttributeBridge {
    pub fn bind<F>(store: &mut AttributeStore, attribute: AttributeId, mut callback: F) -> Self
    where
        F: FnMut(f32, f32) + Send + 'static,
    {
        let listener = store.on_change(attribute, move |change| {
            callback(change.old_value, change.new_value)
        });
        tracing::debug!(attribute = attribute.index(), "attribute bridge bound");
        Self {
            attribute,
            listener,
        }
    }

    pub fn attribute(&self) -> AttributeId {
        self.attribute
    }

    /// Detaches the callback. Returns false if it was already detached.
    pub fn unbind(self, store: &mut AttributeStore) -> bool {
        store.unsubscribe(self.listener)
    }
}

// ============================================================================
// Movement
// ============================================================================

/// The movement system's view of its limits.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementLimits {
    pub max_walk_speed: f32,
}

/// Movement limits shared between the ability core and the movement system.
pub type SharedMovement = Arc<Mutex<MovementLimits>>;

/// Mirrors `move_speed` into `movement.max_walk_speed`.
///
/// The cap is synced to the current value immediately, then on every change.
pub fn bind_move_speed(
    store: &mut AttributeStore,
    move_speed: AttributeId,
    movement: &SharedMovement,
) -> AttributeBridge {
    let initial = store.value(move_speed).unwrap_or_default();
    set_max_walk_speed(movement, initial);

    let movement = Arc::clone(movement);
    AttributeBridge::bind(store, move_speed, move |old, new| {
        tracing::trace!(old, new, "max walk speed updated");
        set_max_walk_speed(&movement, new);
    })
}

fn set_max_walk_speed(movement: &SharedMovement, speed: f32) {
    // A poisoned lock still holds plain data; keep mirroring.
    let mut limits = movement.lock().unwrap_or_else(PoisonError::into_inner);
    limits.max_walk_speed = speed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributeDescriptor, AttributeSchema};

    fn store() -> (AttributeStore, AttributeId) {
        let mut schema = AttributeSchema::new();
        let speed = schema
            .declare(AttributeDescriptor::new("MoveSpeed", 600.0))
            .unwrap();
        (AttributeStore::new(Arc::new(schema)), speed)
    }

    #[test]
    fn move_speed_syncs_on_bind_and_on_change() {
        let (mut store, speed) = store();
        let movement = SharedMovement::default();

        bind_move_speed(&mut store, speed, &movement);
        assert_eq!(movement.lock().unwrap().max_walk_speed, 600.0);

        store.set_value(speed, 650.0).unwrap();
        assert_eq!(movement.lock().unwrap().max_walk_speed, 650.0);
    }

    #[test]
    fn double_binding_runs_twice() {
        let (mut store, speed) = store();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let mut bridges = Vec::new();
        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            bridges.push(AttributeBridge::bind(&mut store, speed, move |old, new| {
                calls.lock().unwrap().push((old, new));
            }));
        }
        store.set_value(speed, 700.0).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec![(600.0, 700.0), (600.0, 700.0)]);

        assert!(bridges[1].unbind(&mut store));
        assert!(!bridges[1].unbind(&mut store));
        store.set_value(speed, 500.0).unwrap();
        assert_eq!(calls.lock().unwrap().len(), 3);
    }
}
