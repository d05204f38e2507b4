//! The project's canonical tag set.
//!
//! [`NativeTags::initialize`] registers every tag below into an explicitly
//! constructed registry and returns the handles as plain fields, so gameplay
//! code writes `tags.state_iframe` instead of looking names up at runtime.

use super::{TagError, TagHandle, TagRegistry};

macro_rules! native_tags {
    ($( $(#[$meta:meta])* $field:ident => $name:literal, $comment:literal; )*) => {
        /// Handles for every natively declared tag.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct NativeTags {
            $( $(#[$meta])* pub $field: TagHandle, )*
        }

        impl NativeTags {
            /// Every native `(name, comment)` pair in registration order.
            pub const DECLARED: &'static [(&'static str, &'static str)] = &[
                $( ($name, $comment), )*
            ];

            /// Registers the native tag set. Safe to call more than once on
            /// the same registry; later calls return the same handles.
            pub fn initialize(registry: &mut TagRegistry) -> Result<Self, TagError> {
                let tags = Self {
                    $( $field: registry.register($name, $comment)?, )*
                };
                tracing::info!(
                    declared = Self::DECLARED.len(),
                    registered = registry.len(),
                    "native gameplay tags initialized"
                );
                Ok(tags)
            }
        }
    };
}

native_tags! {
    // ===== Vital attributes =====
    attributes_vital_health => "Attributes.Vital.Health", "Current health, within [0, MaxHealth]";
    attributes_vital_mana => "Attributes.Vital.Mana", "Current mana, within [0, MaxMana]";
    attributes_vital_stamina => "Attributes.Vital.Stamina", "Current stamina, spent by dodge and sprint";
    attributes_vital_toughness => "Attributes.Vital.Toughness", "Current poise, prevents interrupts";
    attributes_vital_strength => "Attributes.Vital.Strength", "Physical damage scaling and carry load";
    attributes_vital_intelligence => "Attributes.Vital.Intelligence", "Magic damage scaling and mana pool";
    attributes_vital_dexterity => "Attributes.Vital.Dexterity", "Move speed, critical chance and dodge";

    // ===== Max attributes =====
    attributes_max_health => "Attributes.Max.MaxHealth", "Health cap";
    attributes_max_mana => "Attributes.Max.MaxMana", "Mana cap";
    attributes_max_stamina => "Attributes.Max.MaxStamina", "Stamina cap";
    attributes_max_toughness => "Attributes.Max.Toughness", "Toughness cap";

    // ===== Resistances =====
    attributes_resistance_physical => "Attributes.Resistance.Physical", "Physical resistance percentage [0-100]";
    attributes_resistance_magical => "Attributes.Resistance.Magical", "Magic resistance percentage [0-100]";

    // ===== Regeneration =====
    attributes_regen_health => "Attributes.RegenRate.Health", "Health per second out of combat";
    attributes_regen_mana => "Attributes.RegenRate.Mana", "Mana per second";
    attributes_regen_stamina => "Attributes.RegenRate.Stamina", "Stamina per second";
    attributes_regen_toughness => "Attributes.RegenRate.Toughness", "Toughness per second";

    // ===== Cost multipliers =====
    attributes_cost_dodge => "Attributes.StaminaCostMultiplier.Dodge", "Dodge stamina cost multiplier";
    attributes_cost_sprint => "Attributes.StaminaCostMultiplier.Sprint", "Sprint stamina cost multiplier";

    // ===== Combat =====
    attributes_steal_health => "Attributes.Steal.Health", "Life steal percentage [0-100]";
    attributes_steal_mana => "Attributes.Steal.Mana", "Mana steal percentage [0-100]";
    attributes_steal_stamina => "Attributes.Steal.Stamina", "Stamina steal percentage [0-100]";
    attributes_critical_chance => "Attributes.Critical.Chance", "Critical hit chance [0-100]";
    attributes_critical_damage => "Attributes.Critical.Damage", "Bonus damage multiplier on critical hits";

    // ===== Movement / load =====
    attributes_move_speed => "Attributes.Stats.MoveSpeed", "Walk speed in cm/s, mirrored into movement";
    attributes_max_equipment_load => "Attributes.Stats.MaxEquipmentLoad", "Equipment load before the Over state";

    // ===== Meta =====
    attributes_meta_incoming_xp => "Attributes.Meta.IncomingXP", "Experience staged for processing";

    // ===== Input =====
    input_attack_main => "InputTag.Attack.Main", "Primary attack";
    input_dodge => "InputTag.Dodge", "Dodge roll";
    input_block => "InputTag.Block", "Hold to block";
    input_sprint => "InputTag.Sprint", "Sprint toggle";
    input_rune_1 => "InputTag.Rune.1", "Rune slot 1";
    input_rune_2 => "InputTag.Rune.2", "Rune slot 2";
    input_rune_3 => "InputTag.Rune.3", "Rune slot 3";
    input_rune_4 => "InputTag.Rune.4", "Rune slot 4";
    input_interaction => "InputTag.Interaction", "Interact with NPCs, chests and waypoints";
    input_target_lock => "InputTag.TargetLock", "Toggle target lock";
    input_menus => "InputTag.Menus", "Open or close menus";
    input_consumable => "InputTag.Consumable", "Use the quick-slot consumable";

    // ===== Abilities =====
    ability_attack_light => "Ability.Attack.Light", "Light attack";
    ability_attack_heavy => "Ability.Attack.Heavy", "Heavy attack";
    ability_dodge => "Ability.Dodge", "Dodge";
    ability_block => "Ability.Block", "Block";
    ability_parry => "Ability.Parry", "Precise block with counter";
    ability_rune => "Ability.Rune", "Parent of every rune ability";
    ability_sprint => "Ability.Sprint", "Sprint";

    // ===== States =====
    state_iframe => "State.IFrame", "Immune to all damage";
    state_hyper_armor => "State.HyperArmor", "Cannot be interrupted, still takes damage";
    state_blocking => "State.Blocking", "Actively blocking";
    state_staggered => "State.Staggered", "Cannot act after a heavy hit";
    state_guard_broken => "State.GuardBroken", "Guard broken, defense halved";
    state_can_cancel => "State.CanCancel", "Current action may be cancelled";
    state_hit_window_active => "State.HitWindowActive", "Attack damage frames are open";
    state_parry_window_active => "State.ParryWindowActive", "Attack can be parried";
    state_attacking => "State.Attacking", "Attack in progress";
    state_dodging => "State.Dodging", "Dodge in progress";
    state_sprint => "State.Sprint", "Sprinting, abilities blocked";
    state_dead => "State.Dead", "Dead";
    state_in_combat => "State.InCombat", "In combat";
    state_executability => "State.Executability", "Can be executed";
    state_weight_light => "State.Movement.Weight.Light", "Load below 30 percent";
    state_weight_medium => "State.Movement.Weight.Medium", "Medium load";
    state_weight_heavy => "State.Movement.Weight.Heavy", "Heavy load";
    state_weight_over => "State.Movement.Weight.Over", "Overloaded, cannot roll";

    // ===== Damage =====
    damage_physical => "Damage.Type.Physical", "Physical damage";
    damage_magical => "Damage.Type.Magical", "Magic damage";
    damage_fire => "Damage.Type.Fire", "Fire damage";
    damage_ice => "Damage.Type.Ice", "Ice damage";

    // ===== Hit reactions =====
    hit_react_light => "HitReact.Light", "Light flinch";
    hit_react_medium => "HitReact.Medium", "Medium flinch";
    hit_react_heavy => "HitReact.Heavy", "Heavy stagger";
    hit_react_knockback => "HitReact.Knockback", "Knocked back";
    hit_react_knockdown => "HitReact.Knockdown", "Knocked down";

    // ===== Effects =====
    effect_dot => "Effect.DOT", "Damage over time";
    effect_dot_burn => "Effect.DOT.Fire.Burn", "Burning";
    effect_dot_frozen => "Effect.DOT.Ice.Frozen", "Frozen";
    effect_dot_bloodshed => "Effect.DOT.Physical.Bloodshed", "Bleeding";
    effect_dot_knockback => "Effect.DOT.Magic.Knockback", "Magic knockback";
    effect_data => "Effect.Data", "Set-by-caller data";
    effect_data_chance => "Effect.Data.Chance", "Proc chance";
    debuff_data_damage => "Debuff.Data.Damage", "Debuff damage per tick";
    debuff_data_frequency => "Debuff.Data.Frequency", "Debuff tick frequency";
    debuff_data_duration => "Debuff.Data.Duration", "Debuff duration";

    // ===== Equipment =====
    equipment_main_hand => "Equipment.Slot.MainHand", "Main hand";
    equipment_off_hand => "Equipment.Slot.OffHand", "Off hand";
    equipment_head => "Equipment.Slot.Head", "Head";
    equipment_chest => "Equipment.Slot.Chest", "Chest";
    equipment_gloves => "Equipment.Slot.Gloves", "Gloves";
    equipment_legs => "Equipment.Slot.Legs", "Legs";

    // ===== Weapons =====
    weapon_sword => "Weapon.Type.Sword", "Sword";
    weapon_greatsword => "Weapon.Type.Greatsword", "Greatsword";
    weapon_staff => "Weapon.Type.Staff", "Staff";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_registers_every_declared_tag() {
        let mut registry = TagRegistry::new();
        let tags = NativeTags::initialize(&mut registry).unwrap();

        for (name, _) in NativeTags::DECLARED {
            assert!(registry.find(name).is_some(), "{name} missing");
        }
        assert_eq!(
            registry.resolve("State.IFrame").unwrap(),
            tags.state_iframe
        );
    }

    #[test]
    fn initialize_twice_returns_same_handles() {
        let mut registry = TagRegistry::new();
        let first = NativeTags::initialize(&mut registry).unwrap();
        let count = registry.len();
        let second = NativeTags::initialize(&mut registry).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn native_hierarchy_supports_category_queries() {
        let mut registry = TagRegistry::new();
        let tags = NativeTags::initialize(&mut registry).unwrap();
        let input_root = registry.resolve("InputTag").unwrap();
        let dot = tags.effect_dot;

        assert!(registry.matches_ancestor(input_root, tags.input_rune_3));
        assert!(registry.matches_ancestor(dot, tags.effect_dot_burn));
        assert!(!registry.matches_ancestor(dot, tags.effect_data_chance));
    }
}
