use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical device family as declared by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Keyboard,
    Mouse,
    Joystick,
}

/// One physical unit declared by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_type: DeviceType,
    /// 1-based instance (`js1`, `js2`, ...).
    pub instance: u32,
    /// Product name as reported by the profile, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
}

impl Device {
    pub fn joystick(instance: u32, raw_name: impl Into<String>) -> Self {
        Self {
            device_type: DeviceType::Joystick,
            instance,
            raw_name: Some(raw_name.into()),
        }
    }

    /// Raw name, or `"Joystick {instance}"` style fallback for unnamed devices.
    pub fn display_name(&self) -> String {
        match self.raw_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.device_type, self.instance),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceType::Keyboard => "Keyboard",
            DeviceType::Mouse => "Mouse",
            DeviceType::Joystick => "Joystick",
        })
    }
}

/// Splits a trailing instance marker (`"... #2"`) off a device name.
///
/// Returns the trimmed base name and the marker (`"#2"`), if present. Only a
/// whitespace-separated `#` followed by digits counts.
pub fn split_instance_suffix(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim();
    if let Some((base, tail)) = trimmed.rsplit_once(char::is_whitespace) {
        let is_marker = tail
            .strip_prefix('#')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if is_marker && !base.trim().is_empty() {
            return (base.trim_end(), Some(tail));
        }
    }
    (trimmed, None)
}
