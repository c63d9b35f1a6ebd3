//! Template metadata snapshot.
//!
//! [`TemplateMeta`] is a lightweight, cloneable description of the device a template
//! depicts, suitable for UI display and diagnostics. Registry entries populate what
//! they know; unknown fields remain `None`.
//!
//! # Conventions
//! - `manufacturer` is a short, human-readable vendor name like `"VKB"` or `"Virpil"`.
//! - Control counts describe the *template surface*, not the live device. A template
//!   may depict fewer controls than the hardware exposes.
//! - `default_joystick_index` is a hint only; the profile's declared instance wins.
//!
//! Metadata never takes part in matching or field resolution.

use serde::{Deserialize, Serialize};

/// Descriptive fields of a template registry entry.
///
/// All fields are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMeta {
    /// Vendor name (e.g., `"VKB"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Number of buttons depicted on the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_count: Option<u32>,

    /// Number of axes depicted on the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_count: Option<u32>,

    /// Number of POV hats depicted on the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat_count: Option<u32>,

    /// Joystick instance this template is usually bound to, if the author knows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_joystick_index: Option<u32>,

    /// Free-form authoring notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TemplateMeta {
    /// One-line summary like `"VKB, 40 buttons, 4 axes, 2 hats"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(m) = &self.manufacturer {
            parts.push(m.clone());
        }
        for (count, noun) in [
            (self.button_count, "buttons"),
            (self.axis_count, "axes"),
            (self.hat_count, "hats"),
        ] {
            if let Some(n) = count {
                parts.push(format!("{n} {noun}"));
            }
        }
        parts.join(", ")
    }
}
