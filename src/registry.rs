//! Template registry.
//!
//! An ordered, read-only list of device templates loaded once from a JSON document.
//! Order matters: [`TemplateRegistry::find`] returns the *first* non-deprecated
//! template whose pattern matches, so earlier entries win ties.
//!
//! # Document shape
//! ```json
//! {
//!   "schema_version": "2.0",
//!   "templates": [
//!     {
//!       "id": "vkb_gladiator_evo_r",
//!       "name": "VKB Gladiator EVO (Right)",
//!       "device_match_patterns": ["Gladiator EVO R"],
//!       "type": "joystick",
//!       "button_range": [1, 40],
//!       "field_mapping_file": "vkb/field_mapping.json"
//!     }
//!   ],
//!   "composite_devices": []
//! }
//! ```

use crate::error::{Error, Result};
use crate::field_map::{self, FieldMapping};
use crate::input::InputKind;
use crate::metadata::TemplateMeta;
use crate::resolver::CompositeRule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Inclusive button-number range a template (or composite partition) owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct InputRange {
    pub min: u32,
    pub max: u32,
}

impl InputRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: u32) -> bool {
        self.min <= n && n <= self.max
    }

    pub fn overlaps(&self, other: &InputRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// The partition that starts at button 1 also owns axes, hats and other non-button inputs.
    pub fn owns_non_buttons(&self) -> bool {
        self.min <= 1
    }

    /// Whether an input of this kind falls in the partition.
    pub fn admits(&self, kind: &InputKind) -> bool {
        match kind.button() {
            Some(n) => self.contains(n),
            None => self.owns_non_buttons(),
        }
    }
}

impl From<[u32; 2]> for InputRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<InputRange> for [u32; 2] {
    fn from(r: InputRange) -> Self {
        [r.min, r.max]
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub device_match_patterns: Vec<String>,
    #[serde(rename = "type", default = "default_template_type")]
    pub device_type: String,
    #[serde(flatten)]
    pub meta: TemplateMeta,
    #[serde(default)]
    pub deprecated: bool,
    /// Restricts which button numbers belong to this template.
    #[serde(default, rename = "button_range", skip_serializing_if = "Option::is_none")]
    pub input_range: Option<InputRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mapping_file: Option<PathBuf>,
    /// Loaded contents of `field_mapping_file`.
    #[serde(skip)]
    pub field_mapping: Option<FieldMapping>,
}

fn default_template_type() -> String {
    "joystick".to_string()
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_match_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            device_type: default_template_type(),
            meta: TemplateMeta::default(),
            deprecated: false,
            input_range: None,
            field_mapping_file: None,
            field_mapping: None,
        }
    }

    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.input_range = Some(InputRange::new(min, max));
        self
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.field_mapping = Some(mapping);
        self
    }

    /// Case-insensitive substring match of any pattern against `device_name`.
    pub fn matches(&self, device_name: &str) -> bool {
        let name = device_name.to_lowercase();
        self.device_match_patterns
            .iter()
            .map(|p| p.trim().to_lowercase())
            .any(|p| !p.is_empty() && name.contains(&p))
    }

    /// Like [`matches`](Self::matches) but also accepts a name contained in a pattern.
    fn matches_loosely(&self, device_name: &str) -> bool {
        let name = device_name.trim().to_lowercase();
        !name.is_empty()
            && self
                .device_match_patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .any(|p| !p.is_empty() && (name.contains(&p) || p.contains(&name)))
    }

    fn validate(&self) -> Result<()> {
        if let Some(range) = self.input_range {
            if range.min == 0 || range.min > range.max {
                return Err(Error::invariant(
                    &self.id,
                    format!(
                        "button_range [{}, {}] is not a valid 1-based range",
                        range.min, range.max
                    ),
                ));
            }
        }
        if let Some(mapping) = &self.field_mapping {
            let conflicts = mapping.conflicting_fields();
            if !conflicts.is_empty() {
                return Err(Error::invariant(
                    &self.id,
                    format!("fields mapped as both button and axis: {}", conflicts.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    schema_version: Option<String>,
    #[serde(default)]
    templates: Vec<Template>,
    #[serde(default)]
    composite_devices: Option<Vec<CompositeRule>>,
}

/// Ordered template collection plus composite-device rules.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
    composites: Vec<CompositeRule>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            composites: CompositeRule::defaults(),
        }
    }
}

impl TemplateRegistry {
    /// Builds a registry from in-memory templates using the default composite rules.
    pub fn new(templates: Vec<Template>) -> Result<Self> {
        Self::with_composites(templates, CompositeRule::defaults())
    }

    /// Builds and validates a registry.
    ///
    /// Fails with [`Error::Invariant`] on duplicate ids, invalid ranges, fields mapped
    /// to two kinds, or composite partitions that overlap.
    pub fn with_composites(
        templates: Vec<Template>,
        composites: Vec<CompositeRule>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.id.as_str()) {
                return Err(Error::invariant(&template.id, "duplicate template id"));
            }
            template.validate()?;
        }
        let registry = Self {
            templates,
            composites,
        };
        for rule in &registry.composites {
            rule.validate(&registry)?;
        }
        Ok(registry)
    }

    /// Parses a registry document. Mapping files are resolved against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: &Path) -> Result<Self> {
        let doc: RegistryDocument =
            serde_json::from_str(json).map_err(|e| Error::json(base_dir, e))?;
        Self::from_document(doc, base_dir)
    }

    /// Loads and validates a registry file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let doc: RegistryDocument = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let registry = Self::from_document(doc, base_dir)?;
        info!(path = %path.display(), count = registry.templates.len(), "Loaded template registry");
        Ok(registry)
    }

    /// Like [`load`](Self::load), but an unreadable or unparseable file yields an empty
    /// registry. Invariant violations are still returned.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(err) if err.is_malformed() => {
                warn!(path = %path.display(), error = %err, "template registry unavailable");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn from_document(doc: RegistryDocument, base_dir: &Path) -> Result<Self> {
        if let Some(version) = &doc.schema_version {
            debug!(schema_version = %version, "registry schema");
        }
        let templates = doc
            .templates
            .into_iter()
            .map(|mut template| {
                if let Some(file) = &template.field_mapping_file {
                    template.field_mapping = field_map::load_or_direct(&base_dir.join(file));
                }
                template
            })
            .collect();
        let composites = doc.composite_devices.unwrap_or_else(CompositeRule::defaults);
        Self::with_composites(templates, composites)
    }

    /// First non-deprecated template whose pattern matches `device_name`.
    pub fn find(&self, device_name: &str) -> Option<&Template> {
        if device_name.trim().is_empty() {
            return None;
        }
        let found = self.active().find(|t| t.matches(device_name));
        match found {
            Some(t) => debug!(device = device_name, template = %t.name, "matched template"),
            None => debug!(device = device_name, "no template found"),
        }
        found
    }

    /// Every non-deprecated template that matches, in registry order.
    ///
    /// Matching is looser than [`find`](Self::find): a name contained in a pattern
    /// also counts. Used to offer template choices for one device.
    pub fn find_all_matching(&self, device_name: &str) -> Vec<&Template> {
        self.active().filter(|t| t.matches_loosely(device_name)).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Non-deprecated templates in registry order.
    pub fn active(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter().filter(|t| !t.deprecated)
    }

    /// All templates, deprecated included.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn composites(&self) -> &[CompositeRule] {
        &self.composites
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REGISTRY: &str = r#"{
        "schema_version": "2.0",
        "templates": [
            {
                "id": "old_gladiator",
                "name": "Gladiator (old)",
                "device_match_patterns": ["Gladiator"],
                "type": "joystick",
                "deprecated": true
            },
            {
                "id": "vkb_gladiator_evo_r",
                "name": "VKB Gladiator EVO (Right)",
                "device_match_patterns": ["Gladiator EVO R", "Gladiator EVO  R"],
                "type": "joystick",
                "manufacturer": "VKB",
                "button_count": 29,
                "button_range": [1, 40]
            },
            {
                "id": "vkb_gladiator_any",
                "name": "VKB Gladiator (Generic)",
                "device_match_patterns": ["gladiator"],
                "type": "joystick"
            },
            {
                "id": "vkb_sem",
                "name": "VKB SEM",
                "device_match_patterns": ["VKB SEM"],
                "type": "module",
                "button_range": [41, 64]
            }
        ]
    }"#;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_json_str(REGISTRY, Path::new(".")).unwrap()
    }

    #[test]
    fn test_first_match_wins_and_deprecated_skipped() {
        let r = registry();
        assert_eq!(r.find("VKBsim Gladiator EVO R").unwrap().id, "vkb_gladiator_evo_r");
        assert_eq!(r.find("vkbsim GLADIATOR evo l").unwrap().id, "vkb_gladiator_any");
        assert!(r.find("Thrustmaster T.16000M").is_none());
        assert!(r.find("   ").is_none());
    }

    #[test]
    fn test_metadata_and_range_parsed() {
        let r = registry();
        let t = r.get_by_id("vkb_gladiator_evo_r").unwrap();
        assert_eq!(t.meta.manufacturer.as_deref(), Some("VKB"));
        assert_eq!(t.meta.button_count, Some(29));
        assert_eq!(t.input_range, Some(InputRange::new(1, 40)));
        assert_eq!(r.find_by_name("VKB SEM").unwrap().device_type, "module");
    }

    #[test]
    fn test_find_all_matching_in_order() {
        let r = registry();
        let ids: Vec<_> = r
            .find_all_matching("VKBsim Gladiator EVO R")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["vkb_gladiator_evo_r", "vkb_gladiator_any"]);
        assert_eq!(r.active().count(), 3);
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = TemplateRegistry::new(vec![
            Template::new("a", "A", &["a"]),
            Template::new("a", "A again", &["b"]),
        ])
        .unwrap_err();
        assert!(!err.is_malformed());
        assert!(err.to_string().contains("duplicate template id"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let bad = Template::new("bad", "Bad", &["x"]).with_range(50, 40);
        let err = TemplateRegistry::new(vec![bad]).unwrap_err();
        assert!(err.to_string().starts_with("template `bad`"));
    }

    #[test]
    fn test_conflicting_field_kinds_rejected() {
        let mapping = FieldMapping::from_json_str(
            r#"{"button_mapping": {"hat": 3}, "axis_mapping": {"hat": "x"}}"#,
        )
        .unwrap();
        let err = TemplateRegistry::new(vec![Template::new("m", "M", &["m"]).with_mapping(mapping)])
            .unwrap_err();
        assert!(err.to_string().contains("both button and axis"));
    }

    #[test]
    fn test_load_from_disk_with_mapping_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vkb")).unwrap();
        std::fs::write(
            dir.path().join("vkb/field_mapping.json"),
            r#"{"button_mapping": {"trigger": 1}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("template_registry.json"),
            r#"{"templates": [{"id": "t", "name": "T", "device_match_patterns": ["T"],
                "type": "joystick", "field_mapping_file": "vkb/field_mapping.json"},
                {"id": "u", "name": "U", "device_match_patterns": ["U"],
                "field_mapping_file": "missing.json"}]}"#,
        )
        .unwrap();

        let r = TemplateRegistry::load(&dir.path().join("template_registry.json")).unwrap();
        let mapping = r.get_by_id("t").unwrap().field_mapping.as_ref().unwrap();
        assert_eq!(mapping.button_mapping.len(), 1);
        assert!(r.get_by_id("u").unwrap().field_mapping.is_none());
    }

    #[test]
    fn test_load_or_empty_degrades_on_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template_registry.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(TemplateRegistry::load(&path).unwrap_err().is_malformed());
        assert!(TemplateRegistry::load_or_empty(&path).unwrap().is_empty());
        assert!(TemplateRegistry::load_or_empty(&dir.path().join("absent.json"))
            .unwrap()
            .is_empty());
    }
}
