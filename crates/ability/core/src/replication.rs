//! Records bound for the network-replication transport.
//!
//! The outbox is an ordinary store subscriber: attribute replication is not a
//! special case per attribute, only a listener that keeps changes flagged
//! [`AttributeFlags::REPLICATED`](crate::AttributeFlags::REPLICATED).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::abilities::{AbilitySpecHandle, PredictionKey};
use crate::attributes::{AttributeId, AttributeStore, ListenerId};

/// Payload handed to the transport. The wire format is the transport's.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplicatedEvent {
    Attribute {
        attribute: AttributeId,
        old: f32,
        new: f32,
    },
    /// Input pressed on an already active ability.
    AbilityInputPressed {
        handle: AbilitySpecHandle,
        key: PredictionKey,
    },
}

/// Shared, ordered queue of [`ReplicatedEvent`]s.
///
/// Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct ReplicationOutbox {
    records: Arc<Mutex<Vec<ReplicatedEvent>>>,
}

impl ReplicationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `store`, recording every replicated attribute change.
    pub fn attach(&self, store: &mut AttributeStore) -> ListenerId {
        let outbox = self.clone();
        store.on_any_change(move |change| {
            if change.replicated {
                outbox.push(ReplicatedEvent::Attribute {
                    attribute: change.attribute,
                    old: change.old_value,
                    new: change.new_value,
                });
            }
        })
    }

    pub fn push(&self, event: ReplicatedEvent) {
        self.records().push(event);
    }

    /// Takes every pending record, oldest first.
    pub fn drain(&self) -> Vec<ReplicatedEvent> {
        std::mem::take(&mut *self.records())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, Vec<ReplicatedEvent>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
