use std::collections::HashMap;

use super::AttributeError;
use crate::tags::{NativeTags, TagHandle};

/// Index of an attribute inside its [`AttributeSchema`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeId(u16);

impl AttributeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-attribute behavior flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AttributeFlags: u8 {
        /// Changes are handed to the replication transport.
        const REPLICATED = 1 << 0;
        /// Scratch value consumed by effect processing (incoming damage/xp).
        const META = 1 << 1;
    }
}

/// Upper bound of an attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeBound {
    #[default]
    Unbounded,
    /// Static cap, e.g. resistances at 100.
    Fixed(f32),
    /// Capped by the current value of another attribute (Health ≤ MaxHealth).
    Paired(AttributeId),
}

/// Declaration of one numeric attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub tag: Option<TagHandle>,
    pub default_value: f32,
    pub min_value: f32,
    pub max: AttributeBound,
    pub flags: AttributeFlags,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, default_value: f32) -> Self {
        Self {
            name: name.into(),
            tag: None,
            default_value,
            min_value: 0.0,
            max: AttributeBound::Unbounded,
            flags: AttributeFlags::empty(),
        }
    }

    pub fn with_tag(mut self, tag: TagHandle) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_min(mut self, min_value: f32) -> Self {
        self.min_value = min_value;
        self
    }

    pub fn with_max(mut self, max: AttributeBound) -> Self {
        self.max = max;
        self
    }

    pub fn paired_with(self, max: AttributeId) -> Self {
        self.with_max(AttributeBound::Paired(max))
    }

    pub fn capped_at(self, max: f32) -> Self {
        self.with_max(AttributeBound::Fixed(max))
    }

    pub fn replicated(mut self) -> Self {
        self.flags |= AttributeFlags::REPLICATED;
        self
    }

    pub fn meta(mut self) -> Self {
        self.flags |= AttributeFlags::META;
        self
    }

    pub fn is_replicated(&self) -> bool {
        self.flags.contains(AttributeFlags::REPLICATED)
    }

    pub fn is_meta(&self) -> bool {
        self.flags.contains(AttributeFlags::META)
    }
}

/// Attribute names used by [`AttributeSchema::character`].
pub mod names {
    pub const HEALTH: &str = "Health";
    pub const MANA: &str = "Mana";
    pub const STAMINA: &str = "Stamina";
    pub const TOUGHNESS: &str = "Toughness";
    pub const STRENGTH: &str = "Strength";
    pub const INTELLIGENCE: &str = "Intelligence";
    pub const DEXTERITY: &str = "Dexterity";
    pub const MAX_HEALTH: &str = "MaxHealth";
    pub const MAX_MANA: &str = "MaxMana";
    pub const MAX_STAMINA: &str = "MaxStamina";
    pub const MAX_TOUGHNESS: &str = "MaxToughness";
    pub const PHYSICAL_RESISTANCE: &str = "PhysicalResistance";
    pub const MAGIC_RESISTANCE: &str = "MagicResistance";
    pub const HEALTH_REGEN_RATE: &str = "HealthRegenRate";
    pub const MANA_REGEN_RATE: &str = "ManaRegenRate";
    pub const STAMINA_REGEN_RATE: &str = "StaminaRegenRate";
    pub const TOUGHNESS_REGEN_RATE: &str = "ToughnessRegenRate";
    pub const DODGE_STAMINA_COST_MULTIPLIER: &str = "DodgeStaminaCostMultiplier";
    pub const SPRINT_STAMINA_COST_MULTIPLIER: &str = "SprintStaminaCostMultiplier";
    pub const HEALTH_STEAL: &str = "HealthSteal";
    pub const MANA_STEAL: &str = "ManaSteal";
    pub const STAMINA_STEAL: &str = "StaminaSteal";
    pub const CRITICAL_CHANCE: &str = "CriticalChance";
    pub const CRITICAL_DAMAGE: &str = "CriticalDamage";
    pub const MOVE_SPEED: &str = "MoveSpeed";
    pub const MAX_EQUIPMENT_LOAD: &str = "MaxEquipmentLoad";
    pub const INCOMING_DAMAGE: &str = "IncomingDamage";
    pub const INCOMING_XP: &str = "IncomingXP";
}

/// Immutable set of attribute declarations shared by every store built from it.
#[derive(Clone, Debug, Default)]
pub struct AttributeSchema {
    descriptors: Vec<AttributeDescriptor>,
    by_name: HashMap<String, AttributeId>,
}

impl AttributeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute. A paired max must already be declared.
    pub fn declare(&mut self, descriptor: AttributeDescriptor) -> Result<AttributeId, AttributeError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(AttributeError::DuplicateName(descriptor.name));
        }
        if let AttributeBound::Paired(max) = descriptor.max {
            if !self.contains(max) {
                return Err(AttributeError::InvalidPairing {
                    attribute: descriptor.name,
                    max,
                });
            }
        }

        let id = AttributeId(self.descriptors.len() as u16);
        self.by_name.insert(descriptor.name.clone(), id);
        self.descriptors.push(descriptor);
        Ok(id)
    }

    pub fn descriptor(&self, id: AttributeId) -> Option<&AttributeDescriptor> {
        self.descriptors.get(id.index())
    }

    pub fn find(&self, name: &str) -> Option<AttributeId> {
        self.by_name.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<AttributeId, AttributeError> {
        self.find(name)
            .ok_or_else(|| AttributeError::UnknownName(name.to_owned()))
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        id.index() < self.descriptors.len()
    }

    /// Attributes whose cap is the current value of `max`.
    pub fn paired_to(&self, max: AttributeId) -> impl Iterator<Item = AttributeId> + '_ {
        self.iter()
            .filter(move |(_, d)| d.max == AttributeBound::Paired(max))
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeId, &AttributeDescriptor)> + '_ {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(index, d)| (AttributeId(index as u16), d))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The character attribute set used by players and enemies.
    ///
    /// Max attributes are declared first so the vitals can pair with them.
    pub fn character(tags: &NativeTags) -> Result<Self, AttributeError> {
        let mut schema = Self::new();
        let mut declare = |d: AttributeDescriptor| schema.declare(d);

        let max_health = declare(
            AttributeDescriptor::new(names::MAX_HEALTH, 100.0)
                .with_tag(tags.attributes_max_health)
                .replicated(),
        )?;
        let max_mana = declare(
            AttributeDescriptor::new(names::MAX_MANA, 50.0)
                .with_tag(tags.attributes_max_mana)
                .replicated(),
        )?;
        let max_stamina = declare(
            AttributeDescriptor::new(names::MAX_STAMINA, 100.0)
                .with_tag(tags.attributes_max_stamina)
                .replicated(),
        )?;
        let max_toughness = declare(
            AttributeDescriptor::new(names::MAX_TOUGHNESS, 50.0)
                .with_tag(tags.attributes_max_toughness)
                .replicated(),
        )?;

        declare(
            AttributeDescriptor::new(names::HEALTH, 100.0)
                .with_tag(tags.attributes_vital_health)
                .paired_with(max_health)
                .replicated(),
        )?;
        declare(
            AttributeDescriptor::new(names::MANA, 50.0)
                .with_tag(tags.attributes_vital_mana)
                .paired_with(max_mana)
                .replicated(),
        )?;
        declare(
            AttributeDescriptor::new(names::STAMINA, 100.0)
                .with_tag(tags.attributes_vital_stamina)
                .paired_with(max_stamina)
                .replicated(),
        )?;
        declare(
            AttributeDescriptor::new(names::TOUGHNESS, 50.0)
                .with_tag(tags.attributes_vital_toughness)
                .paired_with(max_toughness)
                .replicated(),
        )?;

        for (name, tag) in [
            (names::STRENGTH, tags.attributes_vital_strength),
            (names::INTELLIGENCE, tags.attributes_vital_intelligence),
            (names::DEXTERITY, tags.attributes_vital_dexterity),
        ] {
            declare(AttributeDescriptor::new(name, 10.0).with_tag(tag).replicated())?;
        }

        for (name, tag, default) in [
            (names::PHYSICAL_RESISTANCE, tags.attributes_resistance_physical, 0.0),
            (names::MAGIC_RESISTANCE, tags.attributes_resistance_magical, 0.0),
            (names::HEALTH_STEAL, tags.attributes_steal_health, 0.0),
            (names::MANA_STEAL, tags.attributes_steal_mana, 0.0),
            (names::STAMINA_STEAL, tags.attributes_steal_stamina, 0.0),
            (names::CRITICAL_CHANCE, tags.attributes_critical_chance, 5.0),
        ] {
            declare(
                AttributeDescriptor::new(name, default)
                    .with_tag(tag)
                    .capped_at(100.0),
            )?;
        }

        for (name, tag, default) in [
            (names::HEALTH_REGEN_RATE, tags.attributes_regen_health, 1.0),
            (names::MANA_REGEN_RATE, tags.attributes_regen_mana, 1.0),
            (names::STAMINA_REGEN_RATE, tags.attributes_regen_stamina, 10.0),
            (names::TOUGHNESS_REGEN_RATE, tags.attributes_regen_toughness, 5.0),
            (names::DODGE_STAMINA_COST_MULTIPLIER, tags.attributes_cost_dodge, 1.0),
            (names::SPRINT_STAMINA_COST_MULTIPLIER, tags.attributes_cost_sprint, 1.0),
            (names::CRITICAL_DAMAGE, tags.attributes_critical_damage, 1.5),
            (names::MAX_EQUIPMENT_LOAD, tags.attributes_max_equipment_load, 60.0),
        ] {
            declare(AttributeDescriptor::new(name, default).with_tag(tag))?;
        }

        declare(
            AttributeDescriptor::new(names::MOVE_SPEED, 600.0)
                .with_tag(tags.attributes_move_speed)
                .replicated(),
        )?;

        declare(AttributeDescriptor::new(names::INCOMING_DAMAGE, 0.0).meta())?;
        declare(
            AttributeDescriptor::new(names::INCOMING_XP, 0.0)
                .with_tag(tags.attributes_meta_incoming_xp)
                .meta(),
        )?;

        Ok(schema)
    }
}
