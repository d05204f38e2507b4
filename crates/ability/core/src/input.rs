//! Input actions and their ability input tags.

use crate::tags::TagHandle;

/// Phase of a discrete input event.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum InputPhase {
    #[default]
    Pressed,
    Released,
    Held,
}

/// One event from the input-mapping collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputEvent {
    pub action: String,
    pub phase: InputPhase,
}

impl InputEvent {
    pub fn new(action: impl Into<String>, phase: InputPhase) -> Self {
        Self {
            action: action.into(),
            phase,
        }
    }

    pub fn pressed(action: impl Into<String>) -> Self {
        Self::new(action, InputPhase::Pressed)
    }

    pub fn released(action: impl Into<String>) -> Self {
        Self::new(action, InputPhase::Released)
    }
}

/// Binds a named input action to an ability input tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBinding {
    pub action: String,
    pub tag: TagHandle,
}

/// Action-to-tag table for ability inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputConfig {
    pub ability_actions: Vec<InputBinding>,
}

impl InputConfig {
    pub fn new(ability_actions: Vec<InputBinding>) -> Self {
        Self { ability_actions }
    }

    pub fn bind(&mut self, action: impl Into<String>, tag: TagHandle) -> &mut Self {
        self.ability_actions.push(InputBinding {
            action: action.into(),
            tag,
        });
        self
    }

    /// Tag bound to `action`. Logs an error when none is.
    pub fn find_tag_for_action(&self, action: &str) -> Option<TagHandle> {
        let found = self
            .ability_actions
            .iter()
            .find(|binding| binding.action == action)
            .map(|binding| binding.tag);
        if found.is_none() {
            tracing::error!(action, "no input tag bound to action");
        }
        found
    }

    /// Action bound to `tag`. Logs an error when none is.
    pub fn find_action_for_tag(&self, tag: TagHandle) -> Option<&str> {
        let found = self
            .ability_actions
            .iter()
            .find(|binding| binding.tag.matches_exact(tag))
            .map(|binding| binding.action.as_str());
        if found.is_none() {
            tracing::error!(?tag, "no input action bound to tag");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.ability_actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ability_actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagRegistry;

    #[test]
    fn lookups_in_both_directions() {
        let mut tags = TagRegistry::new();
        let sprint = tags.register("InputTag.Sprint", "").unwrap();
        let dodge = tags.register("InputTag.Dodge", "").unwrap();

        let mut config = InputConfig::default();
        config.bind("IA_Sprint", sprint);

        assert_eq!(config.find_tag_for_action("IA_Sprint"), Some(sprint));
        assert_eq!(config.find_action_for_tag(sprint), Some("IA_Sprint"));
        assert_eq!(config.find_tag_for_action("IA_Jump"), None);
        assert_eq!(config.find_action_for_tag(dodge), None);
    }

    #[test]
    fn phase_parses_case_insensitively() {
        assert_eq!("Held".parse::<InputPhase>().unwrap(), InputPhase::Held);
        assert_eq!(InputPhase::Released.to_string(), "released");
    }
}
