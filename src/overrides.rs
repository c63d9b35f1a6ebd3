//! Two-tier label overrides.
//!
//! A shipped *global* file and a user-writable *custom* file, both plain
//! `action_name → label` JSON objects in one directory. Lookups try custom, then
//! global. The first custom write seeds the custom tier with a copy of the global tier.

use crate::binding::ActionBinding;
use crate::error::{Error, Result};
use crate::label::generate_action_label;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const GLOBAL_OVERRIDE_FILE: &str = "label_overrides.json";
pub const CUSTOM_OVERRIDE_FILE: &str = "label_overrides_custom.json";

/// `action_name → label`.
pub type LabelMap = BTreeMap<String, String>;

#[derive(Debug, Clone)]
struct StorePaths {
    global: PathBuf,
    custom: PathBuf,
}

/// Custom → global → generated label store.
#[derive(Debug, Clone, Default)]
pub struct LabelOverrideStore {
    global: LabelMap,
    custom: LabelMap,
    /// Whether the custom tier has been written (or existed on disk) yet.
    custom_created: bool,
    /// `None` for a purely in-memory store.
    paths: Option<StorePaths>,
}

impl LabelOverrideStore {
    /// Opens the store in `dir`. Missing or malformed files load as empty tiers.
    pub fn open(dir: &Path) -> Self {
        let paths = StorePaths {
            global: dir.join(GLOBAL_OVERRIDE_FILE),
            custom: dir.join(CUSTOM_OVERRIDE_FILE),
        };
        let mut store = Self {
            paths: Some(paths),
            ..Self::default()
        };
        store.reload();
        store
    }

    /// In-memory store; nothing is persisted.
    pub fn in_memory(global: LabelMap, custom: LabelMap) -> Self {
        let custom_created = !custom.is_empty();
        Self {
            global,
            custom,
            custom_created,
            paths: None,
        }
    }

    /// Re-reads both tiers from disk. No-op for in-memory stores.
    pub fn reload(&mut self) {
        let Some(paths) = &self.paths else {
            return;
        };
        self.global = read_tier(&paths.global);
        self.custom = read_tier(&paths.custom);
        self.custom_created = paths.custom.exists();
        info!(global = self.global.len(), custom = self.custom.len(), "Loaded label overrides");
    }

    /// Override for an action, custom tier first.
    pub fn lookup(&self, action_name: &str) -> Option<&str> {
        self.custom
            .get(action_name)
            .or_else(|| self.global.get(action_name))
            .map(String::as_str)
    }

    /// What an action shows without a custom override: global, else generated.
    pub fn fallback_label(&self, action_name: &str) -> String {
        self.global
            .get(action_name)
            .cloned()
            .unwrap_or_else(|| generate_action_label(action_name))
    }

    /// Display label for an action: override if any, else generated.
    pub fn label_for_action(&self, action_name: &str) -> String {
        self.lookup(action_name)
            .map(str::to_string)
            .unwrap_or_else(|| generate_action_label(action_name))
    }

    /// Display label for a binding. The binding's own custom label wins.
    pub fn resolve_label(&self, binding: &ActionBinding) -> String {
        match binding.custom_label() {
            Some(label) => label.to_string(),
            None => self.label_for_action(&binding.action_name),
        }
    }

    /// Stores a custom label.
    ///
    /// A label equal to [`fallback_label`](Self::fallback_label), or a blank one,
    /// removes the custom entry instead. Returns whether an override is now stored.
    pub fn set_custom_label(&mut self, action_name: &str, label: &str) -> Result<bool> {
        let label = label.trim();
        if label.is_empty() || label == self.fallback_label(action_name) {
            debug!(action = action_name, "label matches fallback, dropping custom override");
            self.remove_custom(action_name)?;
            return Ok(false);
        }

        self.ensure_custom_tier();
        self.custom.insert(action_name.to_string(), label.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Removes an action's custom entry. Returns whether one existed.
    pub fn remove_custom(&mut self, action_name: &str) -> Result<bool> {
        if self.custom.remove(action_name).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// The raw custom-tier entry, if any.
    pub fn custom_override(&self, action_name: &str) -> Option<&str> {
        self.custom.get(action_name).map(String::as_str)
    }

    /// `true` when the custom tier holds a label that differs from the fallback.
    ///
    /// Entries copied from the global tier on first write do not count.
    pub fn is_customized(&self, action_name: &str) -> bool {
        self.custom_override(action_name)
            .is_some_and(|label| label != self.fallback_label(action_name))
    }

    /// Global tier overlaid with the custom tier.
    pub fn merged(&self) -> LabelMap {
        let mut merged = self.global.clone();
        merged.extend(self.custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    fn ensure_custom_tier(&mut self) {
        if self.custom_created {
            return;
        }
        for (action, label) in &self.global {
            self.custom.entry(action.clone()).or_insert_with(|| label.clone());
        }
        self.custom_created = true;
        debug!(copied = self.global.len(), "seeded custom overrides from global");
    }

    fn persist(&self) -> Result<()> {
        let Some(paths) = &self.paths else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.custom)
            .map_err(|e| Error::json(&paths.custom, e))?;
        std::fs::write(&paths.custom, json).map_err(|e| Error::io(&paths.custom, e))?;
        info!(
            path = %paths.custom.display(),
            count = self.custom.len(),
            "Saved custom label overrides"
        );
        Ok(())
    }
}

fn read_tier(path: &Path) -> LabelMap {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "override file not found");
            return LabelMap::new();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read override file");
            return LabelMap::new();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "invalid override file, ignoring");
        LabelMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, &str)]) -> LabelMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_lookup_precedence() {
        let store = LabelOverrideStore::in_memory(
            map(&[("v_attack1", "Fire"), ("v_boost", "Boost")]),
            map(&[("v_attack1", "Guns")]),
        );
        assert_eq!(store.lookup("v_attack1"), Some("Guns"));
        assert_eq!(store.lookup("v_boost"), Some("Boost"));
        assert_eq!(store.lookup("v_strafe_up"), None);
        assert_eq!(store.label_for_action("v_strafe_up"), "Strafe Up");
    }

    #[test]
    fn test_binding_custom_label_wins() {
        let store = LabelOverrideStore::in_memory(map(&[("v_attack1", "Fire")]), LabelMap::new());
        let plain = ActionBinding::new("v_attack1", "js1_button1");
        let custom = plain.clone().with_custom_label("  Lasers ");
        assert_eq!(store.resolve_label(&plain), "Fire");
        assert_eq!(store.resolve_label(&custom), "Lasers");
        assert_eq!(store.resolve_label(&plain.clone().with_custom_label("  ")), "Fire");
    }

    #[test]
    fn test_override_equal_to_generated_is_removed() {
        let mut store = LabelOverrideStore::default();
        assert!(store.set_custom_label("v_strafe_up", "Thrust Up").unwrap());
        assert!(store.is_customized("v_strafe_up"));

        assert!(!store.set_custom_label("v_strafe_up", "Strafe Up").unwrap());
        assert_eq!(store.custom_override("v_strafe_up"), None);
        assert!(!store.is_customized("v_strafe_up"));
        assert_eq!(store.label_for_action("v_strafe_up"), "Strafe Up");
    }

    #[test]
    fn test_override_equal_to_global_is_removed() {
        let mut store =
            LabelOverrideStore::in_memory(map(&[("v_attack1", "Fire")]), LabelMap::new());
        assert!(!store.set_custom_label("v_attack1", "Fire").unwrap());
        assert_eq!(store.custom_override("v_attack1"), None);
        // Equal to the generated label, but the global tier says otherwise.
        assert!(store.set_custom_label("v_attack1", "Attack1").unwrap());
        assert_eq!(store.lookup("v_attack1"), Some("Attack1"));
    }

    #[test]
    fn test_first_write_copies_global() {
        let mut store = LabelOverrideStore::in_memory(
            map(&[("v_attack1", "Fire"), ("v_boost", "Boost")]),
            LabelMap::new(),
        );
        store.set_custom_label("v_attack1", "Guns").unwrap();
        assert_eq!(store.custom_override("v_boost"), Some("Boost"));
        assert!(!store.is_customized("v_boost"));
        assert_eq!(
            store.merged(),
            map(&[("v_attack1", "Guns"), ("v_boost", "Boost")])
        );
    }

    #[test]
    fn test_on_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(GLOBAL_OVERRIDE_FILE),
            r#"{"v_attack1": "Fire", "v_boost": "Boost"}"#,
        )
        .unwrap();

        let mut store = LabelOverrideStore::open(dir.path());
        assert!(!dir.path().join(CUSTOM_OVERRIDE_FILE).exists());
        store.set_custom_label("v_boost", "Afterburner").unwrap();

        let written = std::fs::read_to_string(dir.path().join(CUSTOM_OVERRIDE_FILE)).unwrap();
        assert!(written.contains("\n  \"v_attack1\": \"Fire\""));

        let reopened = LabelOverrideStore::open(dir.path());
        assert_eq!(reopened.lookup("v_boost"), Some("Afterburner"));
        assert_eq!(reopened.lookup("v_attack1"), Some("Fire"));
        assert!(reopened.is_customized("v_boost"));
    }

    #[test]
    fn test_malformed_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GLOBAL_OVERRIDE_FILE), "[1, 2").unwrap();
        let store = LabelOverrideStore::open(dir.path());
        assert!(store.merged().is_empty());
        assert_eq!(store.label_for_action("foip_recalibrate"), "FOIP: Recalibrate");
    }
}
