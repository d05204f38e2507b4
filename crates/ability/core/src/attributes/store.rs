use std::fmt;
use std::sync::Arc;

use super::{AttributeBound, AttributeError, AttributeId, AttributeSchema};
use crate::config::CoreConfig;

/// Committed value of one attribute plus the value it replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    pub current: f32,
    pub previous: f32,
}

impl AttributeValue {
    fn initial(value: f32) -> Self {
        Self {
            current: value,
            previous: value,
        }
    }
}

/// Notification payload for one committed, distinct value change.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChange {
    pub attribute: AttributeId,
    pub old_value: f32,
    pub new_value: f32,
    /// Copied from the descriptor so transport subscribers need no schema.
    pub replicated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&AttributeChange) + Send>;

struct ListenerEntry {
    id: ListenerId,
    filter: Option<AttributeId>,
    callback: Listener,
}

/// Per-actor attribute values.
///
/// The store is the single writer of its values. Every distinct change goes
/// through [`AttributeStore::commit`], which records the previous value and
/// notifies listeners synchronously in subscription order.
pub struct AttributeStore {
    schema: Arc<AttributeSchema>,
    values: Vec<AttributeValue>,
    listeners: Vec<ListenerEntry>,
    next_listener: u64,
    reclamp_on_max_change: bool,
}

impl AttributeStore {
    pub fn new(schema: Arc<AttributeSchema>) -> Self {
        Self::with_config(schema, &CoreConfig::default())
    }

    /// Creates a store with every attribute at its declared default.
    pub fn with_config(schema: Arc<AttributeSchema>, config: &CoreConfig) -> Self {
        let values = schema
            .iter()
            .map(|(_, d)| AttributeValue::initial(d.default_value))
            .collect();
        Self {
            schema,
            values,
            listeners: Vec::new(),
            next_listener: 0,
            reclamp_on_max_change: config.reclamp_on_max_change,
        }
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    /// Current value of `attr`.
    ///
    /// # Panics
    ///
    /// Panics if `attr` was not declared in this store's schema. Use
    /// [`AttributeStore::value`] for ids of unknown origin.
    pub fn get_value(&self, attr: AttributeId) -> f32 {
        self.values[attr.index()].current
    }

    pub fn value(&self, attr: AttributeId) -> Option<f32> {
        self.values.get(attr.index()).map(|v| v.current)
    }

    /// Value replaced by the most recent commit.
    pub fn previous_value(&self, attr: AttributeId) -> Option<f32> {
        self.values.get(attr.index()).map(|v| v.previous)
    }

    pub fn attribute_value(&self, attr: AttributeId) -> Option<AttributeValue> {
        self.values.get(attr.index()).copied()
    }

    /// Sets a value without clamping or notification. Construction only.
    pub fn init_value(&mut self, attr: AttributeId, value: f32) -> Result<(), AttributeError> {
        let slot = self
            .values
            .get_mut(attr.index())
            .ok_or(AttributeError::UnknownAttribute(attr))?;
        *slot = AttributeValue::initial(value);
        Ok(())
    }

    /// Re-initializes every attribute to its declared default. No notifications.
    pub fn reset_to_defaults(&mut self) {
        for ((_, descriptor), slot) in self.schema.iter().zip(self.values.iter_mut()) {
            *slot = AttributeValue::initial(descriptor.default_value);
        }
    }

    /// Current upper bound of `attr`, if it has one.
    pub fn resolved_max(&self, attr: AttributeId) -> Option<f32> {
        match self.schema.descriptor(attr)?.max {
            AttributeBound::Unbounded => None,
            AttributeBound::Fixed(max) => Some(max),
            AttributeBound::Paired(max) => self.value(max),
        }
    }

    /// `[min, resolved max]` for `attr`.
    pub fn bounds(&self, attr: AttributeId) -> Option<(f32, Option<f32>)> {
        let descriptor = self.schema.descriptor(attr)?;
        Some((descriptor.min_value, self.resolved_max(attr)))
    }

    /// Clamp hook for direct (non-effect) writes.
    pub fn pre_change_clamp(&self, attr: AttributeId, proposed: f32) -> f32 {
        match self.bounds(attr) {
            Some((min, max)) => clamp_between(proposed, min, max),
            None => proposed,
        }
    }

    /// Clamps `value` through [`AttributeStore::pre_change_clamp`] and commits
    /// it. Returns the change, or `None` if the clamped value equals the
    /// current one.
    pub fn set_value(
        &mut self,
        attr: AttributeId,
        value: f32,
    ) -> Result<Option<AttributeChange>, AttributeError> {
        if !self.schema.contains(attr) {
            return Err(AttributeError::UnknownAttribute(attr));
        }
        let clamped = self.pre_change_clamp(attr, value);
        Ok(self.commit(attr, clamped))
    }

    /// Writes an already-clamped value and notifies listeners.
    ///
    /// When `attr` is a max attribute, attributes paired to it are re-clamped
    /// through this same path after the max's own notification.
    pub(crate) fn commit(&mut self, attr: AttributeId, new_value: f32) -> Option<AttributeChange> {
        let slot = self.values.get_mut(attr.index())?;
        let old_value = slot.current;
        if new_value == old_value {
            return None;
        }
        slot.previous = old_value;
        slot.current = new_value;

        let change = AttributeChange {
            attribute: attr,
            old_value,
            new_value,
            replicated: self
                .schema
                .descriptor(attr)
                .is_some_and(|d| d.is_replicated()),
        };
        tracing::trace!(
            attribute = attr.index(),
            old = old_value,
            new = new_value,
            "attribute committed"
        );
        self.notify(&change);

        if self.reclamp_on_max_change {
            let schema = Arc::clone(&self.schema);
            for dependent in schema.paired_to(attr) {
                let current = self.get_value(dependent);
                let clamped = self.pre_change_clamp(dependent, current);
                self.commit(dependent, clamped);
            }
        }

        Some(change)
    }

    fn notify(&mut self, change: &AttributeChange) {
        for entry in &mut self.listeners {
            if entry.filter.is_none_or(|attr| attr == change.attribute) {
                (entry.callback)(change);
            }
        }
    }

    /// Subscribes to changes of one attribute.
    pub fn on_change<F>(&mut self, attr: AttributeId, listener: F) -> ListenerId
    where
        F: FnMut(&AttributeChange) + Send + 'static,
    {
        self.subscribe(Some(attr), Box::new(listener))
    }

    /// Subscribes to every change in this store.
    pub fn on_any_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&AttributeChange) + Send + 'static,
    {
        self.subscribe(None, Box::new(listener))
    }

    fn subscribe(&mut self, filter: Option<AttributeId>, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(ListenerEntry {
            id,
            filter,
            callback,
        });
        id
    }

    /// Removes a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|entry| entry.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Iterates `(id, current value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeId, f32)> + '_ {
        self.schema
            .iter()
            .zip(self.values.iter())
            .map(|((id, _), value)| (id, value.current))
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .field("reclamp_on_max_change", &self.reclamp_on_max_change)
            .finish()
    }
}

/// Clamps into `[min, max]`. The max is applied last, so a max below the
/// floor still caps the value.
pub(crate) fn clamp_between(value: f32, min: f32, max: Option<f32>) -> f32 {
    let value = value.max(min);
    match max {
        Some(max) => value.min(max),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::attributes::AttributeDescriptor;

    struct Fixture {
        store: AttributeStore,
        health: AttributeId,
        max_health: AttributeId,
        resistance: AttributeId,
        speed: AttributeId,
    }

    fn fixture(config: &CoreConfig) -> Fixture {
        let mut schema = AttributeSchema::new();
        let max_health = schema
            .declare(AttributeDescriptor::new("MaxHealth", 100.0).replicated())
            .unwrap();
        let health = schema
            .declare(
                AttributeDescriptor::new("Health", 100.0)
                    .paired_with(max_health)
                    .replicated(),
            )
            .unwrap();
        let resistance = schema
            .declare(AttributeDescriptor::new("PhysicalResistance", 0.0).capped_at(100.0))
            .unwrap();
        let speed = schema
            .declare(AttributeDescriptor::new("MoveSpeed", 600.0))
            .unwrap();
        Fixture {
            store: AttributeStore::with_config(Arc::new(schema), config),
            health,
            max_health,
            resistance,
            speed,
        }
    }

    fn record(store: &mut AttributeStore) -> Arc<Mutex<Vec<AttributeChange>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.on_any_change(move |change| sink.lock().unwrap().push(*change));
        seen
    }

    #[test]
    fn set_value_clamps_into_paired_range() {
        let mut f = fixture(&CoreConfig::default());

        f.store.set_value(f.health, 250.0).unwrap();
        assert_eq!(f.store.get_value(f.health), 100.0);

        let change = f.store.set_value(f.health, -20.0).unwrap().unwrap();
        assert_eq!(f.store.get_value(f.health), 0.0);
        assert_eq!(change.old_value, 100.0);
        assert_eq!(change.new_value, 0.0);
        assert_eq!(f.store.previous_value(f.health), Some(100.0));

        f.store.set_value(f.resistance, 140.0).unwrap();
        assert_eq!(f.store.get_value(f.resistance), 100.0);
    }

    #[test]
    fn redundant_set_is_silent() {
        let mut f = fixture(&CoreConfig::default());
        let seen = record(&mut f.store);

        assert_eq!(f.store.set_value(f.health, 100.0).unwrap(), None);
        // Clamps back to the current value, so nothing changes.
        assert_eq!(f.store.set_value(f.health, 130.0).unwrap(), None);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn each_distinct_change_notifies_once() {
        let mut f = fixture(&CoreConfig::default());
        let seen = record(&mut f.store);

        f.store.set_value(f.health, 40.0).unwrap();
        f.store.set_value(f.speed, 650.0).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            AttributeChange {
                attribute: f.health,
                old_value: 100.0,
                new_value: 40.0,
                replicated: true,
            }
        );
        assert!(!seen[1].replicated);
    }

    #[test]
    fn init_value_bypasses_clamp_and_listeners() {
        let mut f = fixture(&CoreConfig::default());
        let seen = record(&mut f.store);

        f.store.init_value(f.health, 500.0).unwrap();
        assert_eq!(f.store.get_value(f.health), 500.0);
        assert_eq!(f.store.previous_value(f.health), Some(500.0));
        assert!(seen.lock().unwrap().is_empty());

        f.store.reset_to_defaults();
        assert_eq!(f.store.get_value(f.health), 100.0);
    }

    #[test]
    fn filtered_listener_only_sees_its_attribute() {
        let mut f = fixture(&CoreConfig::default());
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hits);
        let id = f
            .store
            .on_change(f.speed, move |c| sink.lock().unwrap().push((c.old_value, c.new_value)));

        f.store.set_value(f.health, 10.0).unwrap();
        f.store.set_value(f.speed, 650.0).unwrap();
        assert_eq!(*hits.lock().unwrap(), vec![(600.0, 650.0)]);

        assert!(f.store.unsubscribe(id));
        assert!(!f.store.unsubscribe(id));
        f.store.set_value(f.speed, 700.0).unwrap();
        assert_eq!(hits.lock().unwrap().len(), 1);
    }

    #[test]
    fn lowering_max_reclamps_paired_attribute() {
        let mut f = fixture(&CoreConfig::default());
        let seen = record(&mut f.store);

        f.store.set_value(f.max_health, 60.0).unwrap();
        assert_eq!(f.store.get_value(f.health), 60.0);

        let seen = seen.lock().unwrap();
        let order: Vec<_> = seen.iter().map(|c| c.attribute).collect();
        assert_eq!(order, vec![f.max_health, f.health]);
    }

    #[test]
    fn max_below_floor_still_caps() {
        let mut schema = AttributeSchema::new();
        let max_health = schema
            .declare(AttributeDescriptor::new("MaxHealth", 100.0))
            .unwrap();
        let health = schema
            .declare(
                AttributeDescriptor::new("Health", 100.0)
                    .with_min(10.0)
                    .paired_with(max_health),
            )
            .unwrap();
        let mut store = AttributeStore::with_config(Arc::new(schema), &CoreConfig::default());

        store.set_value(max_health, 5.0).unwrap();
        store.set_value(health, 1000.0).unwrap();
        assert_eq!(store.get_value(health), 5.0);
        assert_eq!(store.pre_change_clamp(health, 1000.0), 5.0);
        assert!(store.get_value(health) <= store.get_value(max_health));
    }

    #[test]
    fn reclamp_can_be_disabled() {
        let config = CoreConfig::default().with_reclamp_on_max_change(false);
        let mut f = fixture(&config);

        f.store.set_value(f.max_health, 60.0).unwrap();
        assert_eq!(f.store.get_value(f.health), 100.0);
        // The next write still respects the new max.
        f.store.set_value(f.health, 90.0).unwrap();
        assert_eq!(f.store.get_value(f.health), 60.0);
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut f = fixture(&CoreConfig::default());
        let mut other = AttributeSchema::new();
        for name in ["A", "B", "C", "D", "E"] {
            other.declare(AttributeDescriptor::new(name, 0.0)).unwrap();
        }
        let foreign = other.resolve("E").unwrap();

        assert_eq!(
            f.store.set_value(foreign, 1.0),
            Err(AttributeError::UnknownAttribute(foreign))
        );
        assert_eq!(f.store.value(foreign), None);
    }
}
