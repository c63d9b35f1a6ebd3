//! Action bindings and the profile that owns them.
//!
//! A [`Profile`] is produced by an external profile reader; this crate only walks it.
//! Remap operations mutate bindings in place and flag the profile as modified.

use crate::device::{Device, DeviceType};
use crate::input::{is_cleared, DeviceClass, InputCode};
use serde::{Deserialize, Serialize};

/// Activation modes a binding may carry.
pub const ACTIVATION_MODES: &[&str] = &["press", "release", "hold", "double_tap", "tap"];

/// `true` when `mode` is absent or one of [`ACTIVATION_MODES`].
pub fn is_valid_activation_mode(mode: Option<&str>) -> bool {
    mode.map_or(true, |m| ACTIVATION_MODES.contains(&m))
}

/// Maps an action to one physical input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub action_name: String,
    /// Canonical input code; empty or a bare device prefix when cleared.
    #[serde(default)]
    pub input_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
}

impl ActionBinding {
    pub fn new(action_name: impl Into<String>, input_code: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            input_code: input_code.into(),
            activation_mode: None,
            custom_label: None,
        }
    }

    pub fn with_custom_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }

    /// Parsed input, or `None` when cleared or outside the grammar.
    pub fn input(&self) -> Option<InputCode> {
        if is_cleared(&self.input_code) {
            return None;
        }
        InputCode::parse(&self.input_code)
    }

    /// Custom label with surrounding whitespace removed; blank counts as unset.
    pub fn custom_label(&self) -> Option<&str> {
        self.custom_label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// A named group of related actions (e.g. `spaceship_weapons`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMap {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<ActionBinding>,
}

/// Serializable binding profile: declared devices plus action maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub action_maps: Vec<ActionMap>,
    #[serde(skip)]
    modified: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>, devices: Vec<Device>, action_maps: Vec<ActionMap>) -> Self {
        Self {
            name: name.into(),
            devices,
            action_maps,
            modified: false,
        }
    }

    /// Every binding across all action maps, in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = &ActionBinding> {
        self.action_maps.iter().flat_map(|m| m.actions.iter())
    }

    /// Bindings whose input belongs to joystick `instance`.
    pub fn joystick_bindings(&self, instance: u32) -> Vec<&ActionBinding> {
        self.bindings()
            .filter(|b| {
                b.input()
                    .is_some_and(|c| c.device == DeviceClass::Joystick && c.instance == instance)
            })
            .collect()
    }

    /// Joystick devices sorted by instance.
    pub fn joysticks(&self) -> Vec<&Device> {
        let mut sticks: Vec<&Device> = self
            .devices
            .iter()
            .filter(|d| d.device_type == DeviceType::Joystick)
            .collect();
        sticks.sort_by_key(|d| d.instance);
        sticks
    }

    /// Joystick instance for a product name.
    ///
    /// Tries an exact match, then a case-insensitive one, then a substring match in
    /// either direction. `None` when no joystick matches.
    pub fn joystick_instance_for(&self, product_name: &str) -> Option<u32> {
        let wanted = product_name.trim();
        if wanted.is_empty() {
            return None;
        }
        let sticks = self.joysticks();
        let named = || {
            sticks
                .iter()
                .filter_map(|d| Some((d.instance, d.raw_name.as_deref()?.trim())))
        };

        if let Some((instance, _)) = named().find(|(_, name)| *name == wanted) {
            return Some(instance);
        }
        let wanted = wanted.to_lowercase();
        if let Some((instance, _)) = named().find(|(_, name)| name.to_lowercase() == wanted) {
            return Some(instance);
        }
        named()
            .find(|(_, name)| {
                let name = name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
            .map(|(instance, _)| instance)
    }

    fn binding_mut(&mut self, action_name: &str) -> Option<&mut ActionBinding> {
        self.action_maps
            .iter_mut()
            .flat_map(|m| m.actions.iter_mut())
            .find(|b| b.action_name == action_name)
    }

    /// Moves an action to a new input. Returns `false` if the action is unknown.
    pub fn rebind(&mut self, action_name: &str, input_code: &str) -> bool {
        let Some(binding) = self.binding_mut(action_name) else {
            return false;
        };
        binding.input_code = input_code.to_string();
        self.modified = true;
        true
    }

    /// Clears an action's input. Returns `false` if the action is unknown.
    pub fn clear(&mut self, action_name: &str) -> bool {
        self.rebind(action_name, "")
    }

    /// Sets (or with `None`, removes) the per-binding label.
    ///
    /// Returns `false` if the action is unknown.
    pub fn set_custom_label(&mut self, action_name: &str, label: Option<&str>) -> bool {
        let Some(binding) = self.binding_mut(action_name) else {
            return false;
        };
        binding.custom_label = label.map(str::to_string);
        self.modified = true;
        true
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            "test",
            vec![
                Device::joystick(2, "VKBsim Gladiator EVO L"),
                Device::joystick(1, "VKBsim Gladiator EVO R SEM"),
                Device {
                    device_type: DeviceType::Keyboard,
                    instance: 1,
                    raw_name: None,
                },
            ],
            vec![ActionMap {
                name: "spaceship_weapons".into(),
                actions: vec![
                    ActionBinding::new("v_attack1", "js1_button1"),
                    ActionBinding::new("v_attack2", "js2_button1"),
                    ActionBinding::new("v_strafe_up", "js1_ "),
                    ActionBinding::new("v_boost", "kb1_lshift"),
                ],
            }],
        )
    }

    #[test]
    fn test_joystick_bindings_filters_instance_and_cleared() {
        let p = profile();
        let names: Vec<_> = p
            .joystick_bindings(1)
            .iter()
            .map(|b| b.action_name.as_str())
            .collect();
        assert_eq!(names, vec!["v_attack1"]);
    }

    #[test]
    fn test_joysticks_sorted() {
        let p = profile();
        let instances: Vec<_> = p.joysticks().iter().map(|d| d.instance).collect();
        assert_eq!(instances, vec![1, 2]);
    }

    #[test]
    fn test_joystick_instance_lookup() {
        let p = profile();
        assert_eq!(p.joystick_instance_for("VKBsim Gladiator EVO L"), Some(2));
        assert_eq!(p.joystick_instance_for("vkbsim gladiator evo l"), Some(2));
        assert_eq!(p.joystick_instance_for("Gladiator EVO R"), Some(1));
        assert_eq!(p.joystick_instance_for("Thrustmaster"), None);
        assert_eq!(p.joystick_instance_for(""), None);
    }

    #[test]
    fn test_remap_operations_mark_modified() {
        let mut p = profile();
        assert!(!p.is_modified());
        assert!(p.rebind("v_strafe_up", "js1_button4"));
        assert!(p.is_modified());
        assert_eq!(p.joystick_bindings(1).len(), 2);

        assert!(p.clear("v_attack1"));
        assert!(p.set_custom_label("v_strafe_up", Some("Up")));
        assert!(!p.rebind("missing", "js1_button1"));

        let bound = p.joystick_bindings(1);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].custom_label(), Some("Up"));

        p.mark_saved();
        assert!(!p.is_modified());
    }

    #[test]
    fn test_activation_modes() {
        assert!(is_valid_activation_mode(None));
        assert!(is_valid_activation_mode(Some("double_tap")));
        assert!(!is_valid_activation_mode(Some("smash")));
    }
}
