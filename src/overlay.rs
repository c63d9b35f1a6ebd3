//! End-to-end overlay composition for one resolved component.
//!
//! ```text
//! profile bindings ──► BindingAggregator ──► entries ──┬─► placed annotations ─┐
//!                                                      │                        ├─► OverlayEngine
//! template fields ──► FieldMapper ─────────────────────┴─► unplaced entries ───┘
//! ```
//!
//! The unplaced table is laid out with placeholder cells and filled in a second
//! pass, so the same layout can be re-filled after labels change.

use crate::aggregate::{BindingAggregator, InputLabelEntry, LabelTable};
use crate::binding::Profile;
use crate::field_map::FieldMapper;
use crate::layout::placeholder;
use crate::layout::table::ActionCells;
use crate::layout::text::{condense_labels, BoxSize};
use crate::layout::{Annotation, OverlayEngine, OverlayLayout, Surface};
use crate::overrides::LabelOverrideStore;
use crate::resolver::ResolvedComponent;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// A placeholder found on a template surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceField {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub max_size: Option<BoxSize>,
}

impl SurfaceField {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            max_size: None,
        }
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.max_size = Some(BoxSize { width, height });
        self
    }
}

#[derive(Debug, Clone)]
pub struct Overlay {
    pub component_name: String,
    pub layout: OverlayLayout,
    /// Field id → condensed text written to it.
    pub field_values: BTreeMap<String, String>,
    /// Input code → every distinct label, for hover detail.
    pub full_labels: BTreeMap<String, Vec<String>>,
    /// Fields whose id maps to no input.
    pub unresolved_fields: Vec<String>,
    labels: LabelTable,
    label_width: usize,
}

impl Overlay {
    /// Condensed label for a tag (code, short label or hat alias).
    pub fn label(&self, tag: &str) -> Option<String> {
        self.labels
            .get(tag)
            .map(|entry| condense_labels(&entry.source_labels, self.label_width))
    }

    /// Replaces `{{ tag }}` tokens in externally authored text.
    pub fn substitute_tags(&self, text: &str) -> String {
        placeholder::substitute(text, |tag| self.label(tag))
    }

    /// Re-fills the unplaced table, e.g. after labels were edited.
    pub fn refill_table(&mut self, entries: Vec<InputLabelEntry>) {
        self.labels = LabelTable::new(entries);
        let (labels, width) = (&self.labels, self.label_width);
        if let Some(table) = self.layout.table_mut() {
            table.substitute(|code| {
                labels
                    .get(code)
                    .map(|e| condense_labels(&e.source_labels, width))
            });
        }
    }
}

/// Builds the overlay for `component`.
pub fn compose(
    component: &ResolvedComponent<'_>,
    profile: &Profile,
    store: &LabelOverrideStore,
    fields: &[SurfaceField],
    surface: Surface,
    engine: &OverlayEngine,
) -> Overlay {
    let entries = BindingAggregator::new(store).aggregate_component(profile, component);
    let label_width = engine.style().label_width;
    let labels = LabelTable::new(entries.clone());
    let mapper = FieldMapper::new(
        component.template.and_then(|t| t.field_mapping.as_ref()),
        component.device.instance,
    );

    let mut placed: HashSet<&str> = HashSet::new();
    let mut annotations = Vec::new();
    let mut field_values = BTreeMap::new();
    let mut unresolved_fields = Vec::new();

    for field in fields {
        let Some(code) = mapper.resolve(&field.id) else {
            unresolved_fields.push(field.id.clone());
            continue;
        };
        let Some(entry) = labels.get(&code) else {
            continue;
        };
        let text = condense_labels(&entry.source_labels, label_width);
        placed.insert(entry.input_code.as_str());
        field_values.insert(field.id.clone(), text.clone());
        annotations.push(Annotation {
            text,
            anchor_x: field.x,
            anchor_y: field.y,
            max_size: field.max_size,
            input_code: Some(entry.input_code.clone()),
            style: None,
        });
    }

    let unplaced: Vec<InputLabelEntry> = entries
        .iter()
        .filter(|e| !placed.contains(e.input_code.as_str()))
        .cloned()
        .collect();

    let mut layout = engine.layout(surface, &annotations, &unplaced, ActionCells::Placeholders);
    if let Some(table) = layout.table_mut() {
        table.substitute(|code| {
            labels
                .get(code)
                .map(|e| condense_labels(&e.source_labels, label_width))
        });
    }
    if !unresolved_fields.is_empty() {
        debug!(fields = ?unresolved_fields, "template fields without a mapping");
    }
    info!(
        component = %component.effective_name,
        placed = annotations.len(),
        unplaced = unplaced.len(),
        "composed overlay"
    );

    let full_labels = entries
        .iter()
        .map(|e| (e.input_code.clone(), e.source_labels.clone()))
        .collect();

    Overlay {
        component_name: component.effective_name.clone(),
        layout,
        field_values,
        full_labels,
        unresolved_fields,
        labels,
        label_width,
    }
}

/// Field id → condensed text for every field the component's bindings reach.
///
/// For form-style templates filled by field name rather than position; duplicate
/// `_1`/`_2` columns all receive the label.
pub fn form_values(
    component: &ResolvedComponent<'_>,
    profile: &Profile,
    store: &LabelOverrideStore,
    label_width: usize,
) -> BTreeMap<String, String> {
    let entries: Vec<InputLabelEntry> = BindingAggregator::new(store)
        .aggregate_component(profile, component)
        .into_iter()
        .map(|mut e| {
            e.display_label = condense_labels(&e.source_labels, label_width);
            e
        })
        .collect();
    let mapper = FieldMapper::new(
        component.template.and_then(|t| t.field_mapping.as_ref()),
        component.device.instance,
    );
    mapper.placements(&entries).into_iter().collect()
}
