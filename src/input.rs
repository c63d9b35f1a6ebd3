//! Canonical input codes.
//!
//! Every component joins on one string key per physical control. This module is the
//! only place that parses that string; everything else consumes [`InputCode`] /
//! [`InputKind`].
//!
//! ## Grammar (bit-exact)
//! - `js{instance}_button{n}`
//! - `js{instance}_hat{n}_{up|down|left|right}`
//! - `js{instance}_{x|y|z|rotx|roty|rotz|slider{n}}`
//! - `kb{instance}_{key}`
//! - `mouse{n}`
//! - `mwheel_{up|down}`
//!
//! A device prefix followed by nothing (`js1`, `js1_`, `js1_ `) is the *unbound*
//! sentinel: the binding was explicitly cleared. See [`is_cleared`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device family encoded in the code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Joystick,
    Keyboard,
    Mouse,
}

impl DeviceClass {
    pub fn prefix(self) -> &'static str {
        match self {
            DeviceClass::Joystick => "js",
            DeviceClass::Keyboard => "kb",
            DeviceClass::Mouse => "mouse",
        }
    }
}

/// POV hat direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HatDirection {
    Up,
    Down,
    Left,
    Right,
}

impl HatDirection {
    pub const ALL: [HatDirection; 4] = [
        HatDirection::Up,
        HatDirection::Down,
        HatDirection::Left,
        HatDirection::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HatDirection::Up => "up",
            HatDirection::Down => "down",
            HatDirection::Left => "left",
            HatDirection::Right => "right",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }

    /// Capitalized form used in display labels ("Up").
    pub fn title(self) -> &'static str {
        match self {
            HatDirection::Up => "Up",
            HatDirection::Down => "Down",
            HatDirection::Left => "Left",
            HatDirection::Right => "Right",
        }
    }
}

/// Mouse wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDirection {
    Up,
    Down,
}

impl WheelDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            WheelDirection::Up => "up",
            WheelDirection::Down => "down",
        }
    }
}

/// Joystick axis names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    RotX,
    RotY,
    RotZ,
    Slider(u32),
}

impl Axis {
    /// Parses the lowercase grammar name (`x`, `rotz`, `slider1`).
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "x" => Axis::X,
            "y" => Axis::Y,
            "z" => Axis::Z,
            "rotx" => Axis::RotX,
            "roty" => Axis::RotY,
            "rotz" => Axis::RotZ,
            _ => Axis::Slider(parse_number(s.strip_prefix("slider")?)?),
        })
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
            Axis::Z => f.write_str("z"),
            Axis::RotX => f.write_str("rotx"),
            Axis::RotY => f.write_str("roty"),
            Axis::RotZ => f.write_str("rotz"),
            Axis::Slider(n) => write!(f, "slider{n}"),
        }
    }
}

/// What kind of physical control a code names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Button(u32),
    Hat(u32, HatDirection),
    Axis(Axis),
    Key(String),
    MouseButton(u32),
    MouseWheel(WheelDirection),
}

/// Coarse grouping used for deterministic overlay ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KindGroup {
    Button,
    Hat,
    Other,
}

impl InputKind {
    /// The button/hat/slider/mouse-button number, when the kind carries one.
    pub fn number(&self) -> Option<u32> {
        match self {
            InputKind::Button(n) | InputKind::Hat(n, _) | InputKind::MouseButton(n) => Some(*n),
            InputKind::Axis(Axis::Slider(n)) => Some(*n),
            _ => None,
        }
    }

    /// Button number for `Button` kinds only.
    pub fn button(&self) -> Option<u32> {
        match self {
            InputKind::Button(n) => Some(*n),
            _ => None,
        }
    }

    pub fn group(&self) -> KindGroup {
        match self {
            InputKind::Button(_) => KindGroup::Button,
            InputKind::Hat(..) => KindGroup::Hat,
            _ => KindGroup::Other,
        }
    }

    /// Short, device-less label: `"Button 7"`, `"Hat 1 Up"`, `"Axis ROTZ"`.
    ///
    /// This is the text used in template tags (`{{ Button 7 }}`) and in the
    /// "Input" column of the unplaced-entries table.
    pub fn short_label(&self) -> String {
        match self {
            InputKind::Button(n) => format!("Button {n}"),
            InputKind::Hat(n, dir) => format!("Hat {n} {}", dir.title()),
            InputKind::Axis(Axis::Slider(n)) => format!("Slider {n}"),
            InputKind::Axis(axis) => format!("Axis {}", axis.to_string().to_uppercase()),
            InputKind::Key(key) => crate::label::key_name(key),
            InputKind::MouseButton(n) => crate::label::key_name(&format!("mouse{n}")),
            InputKind::MouseWheel(dir) => {
                crate::label::key_name(&format!("mwheel_{}", dir.as_str()))
            }
        }
    }

    /// Additional tag spellings templates use for the same control.
    ///
    /// Hats appear as `"Hat up"` (no number) and `"Hat1 up"` (no space) on some sheets.
    pub fn tag_aliases(&self) -> Vec<String> {
        match self {
            InputKind::Hat(n, dir) => vec![
                format!("Hat {}", dir.as_str()),
                format!("Hat{n} {}", dir.as_str()),
            ],
            _ => Vec::new(),
        }
    }
}

/// A parsed canonical input code. Serializes as its canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputCode {
    pub device: DeviceClass,
    /// Device instance (1-based). Mouse codes are always instance 1.
    pub instance: u32,
    pub kind: InputKind,
}

impl InputCode {
    pub fn joystick(instance: u32, kind: InputKind) -> Self {
        Self {
            device: DeviceClass::Joystick,
            instance,
            kind,
        }
    }

    /// Parses a canonical code. Surrounding whitespace is ignored.
    ///
    /// Returns `None` for anything outside the grammar, including the unbound sentinel.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();

        if let Some(dir) = code.strip_prefix("mwheel_") {
            let dir = match dir {
                "up" => WheelDirection::Up,
                "down" => WheelDirection::Down,
                _ => return None,
            };
            return Some(Self {
                device: DeviceClass::Mouse,
                instance: 1,
                kind: InputKind::MouseWheel(dir),
            });
        }

        if let Some(rest) = code.strip_prefix("mouse") {
            return Some(Self {
                device: DeviceClass::Mouse,
                instance: 1,
                kind: InputKind::MouseButton(parse_number(rest)?),
            });
        }

        if let Some(rest) = code.strip_prefix("kb") {
            let (instance, key) = split_instance(rest)?;
            if key.is_empty() || key.trim() != key {
                return None;
            }
            return Some(Self {
                device: DeviceClass::Keyboard,
                instance,
                kind: InputKind::Key(key.to_string()),
            });
        }

        let rest = code.strip_prefix("js")?;
        let (instance, control) = split_instance(rest)?;
        let kind = if let Some(n) = control.strip_prefix("button") {
            InputKind::Button(parse_number(n)?)
        } else if let Some(hat) = control.strip_prefix("hat") {
            let (n, dir) = hat.split_once('_')?;
            InputKind::Hat(parse_number(n)?, HatDirection::parse(dir)?)
        } else {
            InputKind::Axis(Axis::parse(control)?)
        };
        Some(Self::joystick(instance, kind))
    }

    /// `"js1"`, `"kb1"`, or `"mouse"`.
    pub fn device_prefix(&self) -> String {
        match self.device {
            DeviceClass::Mouse => "mouse".to_string(),
            class => format!("{}{}", class.prefix(), self.instance),
        }
    }

    /// Long description including the device: `"Joystick 1: Button 5"`.
    pub fn describe(&self) -> String {
        crate::label::describe_input(self)
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let i = self.instance;
        match &self.kind {
            InputKind::Button(n) => write!(f, "js{i}_button{n}"),
            InputKind::Hat(n, dir) => write!(f, "js{i}_hat{n}_{}", dir.as_str()),
            InputKind::Axis(axis) => write!(f, "js{i}_{axis}"),
            InputKind::Key(key) => write!(f, "kb{i}_{key}"),
            InputKind::MouseButton(n) => write!(f, "mouse{n}"),
            InputKind::MouseWheel(dir) => write!(f, "mwheel_{}", dir.as_str()),
        }
    }
}

impl TryFrom<String> for InputCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("invalid input code `{raw}`"))
    }
}

impl From<InputCode> for String {
    fn from(code: InputCode) -> Self {
        code.to_string()
    }
}

/// `true` when a raw binding input denotes "no input": empty, whitespace, or a bare
/// device prefix (`js1`, `js1_`, `kb2_ `, `mouse1_ `).
pub fn is_cleared(raw: &str) -> bool {
    let code = raw.trim_end();
    if code.trim().is_empty() {
        return true;
    }
    // `mouse{n}` is itself a valid code, so a bare mouse prefix needs the underscore.
    const WITH_SEPARATOR: &[&str] = &["js", "kb", "mouse"];
    const WITHOUT_SEPARATOR: &[&str] = &["js", "kb"];
    let (bare, prefixes) = match code.strip_suffix('_') {
        Some(bare) => (bare, WITH_SEPARATOR),
        None => (code, WITHOUT_SEPARATOR),
    };
    prefixes.iter().any(|prefix| {
        bare.strip_prefix(prefix)
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Splits `"{N}_{rest}"` into `(N, rest)`.
fn split_instance(s: &str) -> Option<(u32, &str)> {
    let (n, rest) = s.split_once('_')?;
    Some((parse_number(n)?, rest))
}

fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
