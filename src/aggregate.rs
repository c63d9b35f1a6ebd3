//! Binding aggregation.
//!
//! Groups a component's bindings by input, resolves one label per binding, and
//! joins the distinct labels into a single display string.

use crate::binding::{ActionBinding, Profile};
use crate::input::InputCode;
use crate::overrides::LabelOverrideStore;
use crate::registry::InputRange;
use crate::resolver::ResolvedComponent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Separator between labels sharing one input.
pub const LABEL_SEPARATOR: &str = " / ";

/// All labels bound to one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLabelEntry {
    pub input_code: String,
    /// Distinct labels joined with [`LABEL_SEPARATOR`], untruncated.
    pub display_label: String,
    /// Distinct labels in first-seen order.
    pub source_labels: Vec<String>,
}

impl InputLabelEntry {
    pub fn new(input_code: impl Into<String>, labels: Vec<String>) -> Self {
        let mut source_labels: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !source_labels.contains(&label) {
                source_labels.push(label);
            }
        }
        Self {
            input_code: input_code.into(),
            display_label: source_labels.join(LABEL_SEPARATOR),
            source_labels,
        }
    }

    pub fn input(&self) -> Option<InputCode> {
        InputCode::parse(&self.input_code)
    }
}

/// Builds [`InputLabelEntry`] lists from bindings.
#[derive(Debug, Clone, Copy)]
pub struct BindingAggregator<'s> {
    store: &'s LabelOverrideStore,
}

impl<'s> BindingAggregator<'s> {
    pub fn new(store: &'s LabelOverrideStore) -> Self {
        Self { store }
    }

    /// One entry per distinct input, in order of first appearance.
    ///
    /// Cleared bindings and codes outside the grammar are skipped, as are inputs the
    /// `partition` does not admit.
    pub fn aggregate<'b>(
        &self,
        bindings: impl IntoIterator<Item = &'b ActionBinding>,
        partition: Option<InputRange>,
    ) -> Vec<InputLabelEntry> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();

        for binding in bindings {
            let Some(code) = binding.input() else {
                continue;
            };
            if partition.is_some_and(|range| !range.admits(&code.kind)) {
                continue;
            }
            let key = code.to_string();
            let label = self.store.resolve_label(binding);
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(label);
        }

        order
            .into_iter()
            .filter_map(|code| {
                let labels = groups.remove(&code)?;
                let entry = InputLabelEntry::new(code, labels);
                debug!(input = %entry.input_code, labels = entry.source_labels.len(), "aggregated");
                Some(entry)
            })
            .collect()
    }

    /// Entries for a resolved component: its joystick's bindings, limited to its partition.
    pub fn aggregate_component(
        &self,
        profile: &Profile,
        component: &ResolvedComponent<'_>,
    ) -> Vec<InputLabelEntry> {
        self.aggregate(
            profile.joystick_bindings(component.device.instance),
            component.partition,
        )
    }
}

/// Input → label lookup for template tags.
///
/// Tags may be a canonical code (`js1_button7`), a short label (`Button 7`) or a hat
/// alias (`Hat1 up`).
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: Vec<InputLabelEntry>,
    by_tag: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new(entries: Vec<InputLabelEntry>) -> Self {
        let mut by_tag = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_tag.entry(entry.input_code.clone()).or_insert(idx);
            if let Some(code) = entry.input() {
                let tags = std::iter::once(code.kind.short_label()).chain(code.kind.tag_aliases());
                for tag in tags {
                    by_tag.entry(tag.to_lowercase()).or_insert(idx);
                }
            }
        }
        Self { entries, by_tag }
    }

    pub fn get(&self, tag: &str) -> Option<&InputLabelEntry> {
        let tag = tag.trim();
        self.by_tag
            .get(tag)
            .or_else(|| self.by_tag.get(&tag.to_lowercase()))
            .map(|&idx| &self.entries[idx])
    }

    pub fn display_label(&self, tag: &str) -> Option<&str> {
        self.get(tag).map(|e| e.display_label.as_str())
    }

    pub fn entries(&self) -> &[InputLabelEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
