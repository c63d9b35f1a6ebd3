//! Generated labels.
//!
//! The last tier of label resolution: when neither the binding nor the override
//! store names an action, a label is derived from the action name itself.

use crate::input::{Axis, InputCode, InputKind};

/// Action-name prefixes replaced by a category marker (first match wins).
const ACTION_PREFIXES: &[(&str, &str)] = &[
    ("v_", ""),
    ("pc_", ""),
    ("foip_", "FOIP: "),
    ("turret_", "Turret: "),
];

/// Human-readable label for an action name.
///
/// `v_attack1_group1` becomes `"Attack1 Group1"`, `foip_recalibrate` becomes
/// `"FOIP: Recalibrate"`.
pub fn generate_action_label(action_name: &str) -> String {
    let (marker, rest) = ACTION_PREFIXES
        .iter()
        .find_map(|(prefix, marker)| Some((*marker, action_name.strip_prefix(prefix)?)))
        .unwrap_or(("", action_name));

    let words: Vec<String> = rest.split('_').map(capitalize).collect();
    format!("{marker}{}", words.join(" "))
}

/// Human-readable action-map name (`spaceship_weapons` → `"Spaceship Weapons"`).
pub fn generate_actionmap_label(actionmap_name: &str) -> String {
    actionmap_name
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Display name for a keyboard key or mouse control token (`lshift`, `mouse1`, `mwheel_up`).
///
/// Unknown keys fall back to the upper-cased token.
pub fn key_name(key: &str) -> String {
    let lower = key.to_lowercase();
    let known = match lower.as_str() {
        "up" => "Up Arrow",
        "down" => "Down Arrow",
        "left" => "Left Arrow",
        "right" => "Right Arrow",
        "escape" | "esc" => "Escape",
        "tab" => "Tab",
        "capslock" => "Caps Lock",
        "lshift" => "Left Shift",
        "rshift" => "Right Shift",
        "lctrl" => "Left Ctrl",
        "rctrl" => "Right Ctrl",
        "lalt" => "Left Alt",
        "ralt" => "Right Alt",
        "space" => "Space",
        "enter" | "return" => "Enter",
        "backspace" => "Backspace",
        "delete" => "Delete",
        "insert" => "Insert",
        "home" => "Home",
        "end" => "End",
        "pageup" => "Page Up",
        "pagedown" => "Page Down",
        "np_multiply" => "Numpad *",
        "np_add" => "Numpad +",
        "np_subtract" => "Numpad -",
        "np_divide" => "Numpad /",
        "np_period" => "Numpad .",
        "minus" => "-",
        "equals" => "=",
        "lbracket" => "[",
        "rbracket" => "]",
        "semicolon" => ";",
        "apostrophe" => "'",
        "grave" => "`",
        "backslash" => "\\",
        "comma" => ",",
        "period" => ".",
        "slash" => "/",
        "mouse1" => "Left Click",
        "mouse2" => "Right Click",
        "mouse3" => "Middle Click",
        "mwheel_up" => "Mouse Wheel Up",
        "mwheel_down" => "Mouse Wheel Down",
        _ => "",
    };
    if !known.is_empty() {
        return known.to_string();
    }
    if let Some(n) = lower.strip_prefix("np_").filter(|n| is_digit_token(n)) {
        return format!("Numpad {n}");
    }
    if let Some(n) = lower.strip_prefix("mouse").filter(|n| is_digit_token(n)) {
        return format!("Mouse Button {n}");
    }
    if lower.len() > 1 && lower.starts_with('f') && is_digit_token(&lower[1..]) {
        return lower.to_uppercase();
    }
    key.to_uppercase()
}

fn is_digit_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Long description of an input, including its device.
pub(crate) fn describe_input(code: &InputCode) -> String {
    let i = code.instance;
    match &code.kind {
        InputKind::Button(n) => format!("Joystick {i}: Button {n}"),
        InputKind::Hat(n, dir) => format!("Joystick {i}: Hat {n} {}", dir.title()),
        InputKind::Axis(Axis::Slider(n)) => format!("Joystick {i}: Slider {n}"),
        InputKind::Axis(axis) => format!("Joystick {i}: Axis {}", axis.to_string().to_uppercase()),
        InputKind::Key(key) => format!("Keyboard: {}", key_name(key)),
        InputKind::MouseButton(_) | InputKind::MouseWheel(_) => {
            format!("Mouse: {}", code.kind.short_label())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_label_prefixes() {
        assert_eq!(generate_action_label("v_attack1"), "Attack1");
        assert_eq!(generate_action_label("v_toggle_landing_system"), "Toggle Landing System");
        assert_eq!(generate_action_label("foip_recalibrate"), "FOIP: Recalibrate");
        assert_eq!(generate_action_label("turret_change_position"), "Turret: Change Position");
        assert_eq!(generate_action_label("pc_focus"), "Focus");
        assert_eq!(generate_action_label("ui_MENU"), "Ui Menu");
    }

    #[test]
    fn test_actionmap_label() {
        assert_eq!(generate_actionmap_label("spaceship_weapons"), "Spaceship Weapons");
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name("lshift"), "Left Shift");
        assert_eq!(key_name("np_7"), "Numpad 7");
        assert_eq!(key_name("f11"), "F11");
        assert_eq!(key_name("mouse5"), "Mouse Button 5");
        assert_eq!(key_name("q"), "Q");
    }

    #[test]
    fn test_describe_input() {
        let describe = |s: &str| InputCode::parse(s).unwrap().describe();
        assert_eq!(describe("js1_button5"), "Joystick 1: Button 5");
        assert_eq!(describe("js2_hat1_up"), "Joystick 2: Hat 1 Up");
        assert_eq!(describe("js1_rotz"), "Joystick 1: Axis ROTZ");
        assert_eq!(describe("js1_slider1"), "Joystick 1: Slider 1");
        assert_eq!(describe("kb1_lshift"), "Keyboard: Left Shift");
        assert_eq!(describe("mouse1"), "Mouse: Left Click");
        assert_eq!(describe("mwheel_up"), "Mouse: Mouse Wheel Up");
    }
}
