//! Template field identifiers ↔ canonical input codes.
//!
//! Templates either name their placeholders with canonical codes directly
//! (*direct-mapping*) or carry a [`FieldMapping`] translating native field ids into
//! button numbers. Dual-column sheets repeat each field with a `_1`/`_2` suffix; both
//! columns resolve to the same input and must both receive its label.

use crate::aggregate::InputLabelEntry;
use crate::error::{Error, Result};
use crate::input::{Axis, DeviceClass, InputCode, InputKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Suffixes marking the first/second device column on a shared template.
pub const COLUMN_SUFFIXES: [&str; 2] = ["_1", "_2"];

/// A `button_mapping` value: a real button number, or an annotation kept for authors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedValue {
    Button(u32),
    Annotation(serde_json::Value),
}

impl MappedValue {
    pub fn button(&self) -> Option<u32> {
        match self {
            MappedValue::Button(n) => Some(*n),
            MappedValue::Annotation(_) => None,
        }
    }
}

/// Per-template field-mapping file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub button_mapping: BTreeMap<String, MappedValue>,
    /// Field id → axis name (`x`, `rotz`, `slider1`).
    #[serde(default)]
    pub axis_mapping: BTreeMap<String, String>,
}

impl FieldMapping {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&text).map_err(|e| Error::json(path, e))
    }

    /// Field ids that appear in both tables, which would give one field two kinds.
    pub fn conflicting_fields(&self) -> Vec<&str> {
        self.axis_mapping
            .keys()
            .filter(|id| {
                self.button_mapping
                    .get(id.as_str())
                    .is_some_and(|v| v.button().is_some())
            })
            .map(String::as_str)
            .collect()
    }

    fn lookup_button(&self, field_id: &str) -> Option<u32> {
        self.button_mapping.get(field_id).and_then(MappedValue::button)
    }

    fn lookup_axis(&self, field_id: &str) -> Option<Axis> {
        Axis::parse(&self.axis_mapping.get(field_id)?.to_lowercase())
    }
}

/// Removes a trailing column suffix, if any.
pub fn strip_column_suffix(field_id: &str) -> Option<&str> {
    COLUMN_SUFFIXES
        .iter()
        .find_map(|suffix| field_id.strip_suffix(suffix))
        .filter(|base| !base.is_empty())
}

/// Resolves template field ids for one joystick instance.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    mapping: Option<&'a FieldMapping>,
    instance: u32,
}

impl<'a> FieldMapper<'a> {
    /// `mapping == None` means a direct-mapping template.
    pub fn new(mapping: Option<&'a FieldMapping>, instance: u32) -> Self {
        Self { mapping, instance }
    }

    pub fn is_direct(&self) -> bool {
        self.mapping.is_none()
    }

    /// Canonical input code for a field id, or `None` if the field maps to nothing.
    ///
    /// Direct-mapping templates return the id verbatim. Mapped templates try the id,
    /// then the id without its column suffix; integer values become
    /// `js{instance}_button{n}`, axis entries `js{instance}_{axis}`, and ids that are
    /// already canonical codes pass through.
    pub fn resolve(&self, field_id: &str) -> Option<String> {
        let Some(mapping) = self.mapping else {
            return Some(field_id.to_string());
        };

        let stripped = strip_column_suffix(field_id);
        let candidates = std::iter::once(field_id).chain(stripped);

        for candidate in candidates {
            if let Some(n) = mapping.lookup_button(candidate) {
                return Some(InputCode::joystick(self.instance, InputKind::Button(n)).to_string());
            }
            if let Some(axis) = mapping.lookup_axis(candidate) {
                return Some(InputCode::joystick(self.instance, InputKind::Axis(axis)).to_string());
            }
        }

        if InputCode::parse(field_id).is_some() {
            return Some(field_id.to_string());
        }
        debug!(field_id, "field has no mapping");
        None
    }

    /// Every field id that resolves to `input_code`.
    ///
    /// Mapped fields yield the table id plus its `_1`/`_2` column siblings; a canonical
    /// code also yields itself, since such ids pass through [`resolve`](Self::resolve).
    pub fn inverse(&self, input_code: &str) -> Vec<String> {
        let Some(mapping) = self.mapping else {
            return vec![input_code.to_string()];
        };
        let Some(code) = InputCode::parse(input_code) else {
            return Vec::new();
        };
        // Other devices never appear in the table but still pass through `resolve`.
        if code.device != DeviceClass::Joystick || code.instance != self.instance {
            return vec![input_code.trim().to_string()];
        }

        let mut fields: Vec<String> = match &code.kind {
            InputKind::Button(n) => mapping
                .button_mapping
                .iter()
                .filter(|(_, v)| v.button() == Some(*n))
                .map(|(id, _)| id.clone())
                .collect(),
            InputKind::Axis(axis) => mapping
                .axis_mapping
                .keys()
                .filter(|id| mapping.lookup_axis(id) == Some(*axis))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };

        let siblings: Vec<String> = fields
            .iter()
            .filter(|id| strip_column_suffix(id).is_none())
            .flat_map(|id| COLUMN_SUFFIXES.iter().map(move |s| format!("{id}{s}")))
            .filter(|sibling| !mapping.button_mapping.contains_key(sibling))
            .collect();
        fields.extend(siblings);
        fields.push(input_code.trim().to_string());
        fields.sort();
        fields.dedup();
        fields
    }

    /// `(field_id, display_text)` pairs for every field each entry should be written to.
    pub fn placements(&self, entries: &[InputLabelEntry]) -> Vec<(String, String)> {
        entries
            .iter()
            .flat_map(|entry| {
                self.inverse(&entry.input_code)
                    .into_iter()
                    .map(|field| (field, entry.display_label.clone()))
            })
            .collect()
    }
}

/// Loads a mapping file, degrading to `None` (direct mapping) when it is malformed.
pub fn load_or_direct(path: &Path) -> Option<FieldMapping> {
    match FieldMapping::load(path) {
        Ok(mapping) => Some(mapping),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "field mapping unavailable, using direct mapping"
            );
            None
        }
    }
}
