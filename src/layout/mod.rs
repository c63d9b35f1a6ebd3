//! Overlay layout.
//!
//! Turns positioned annotations plus a list of unplaced inputs into draw
//! instructions for an external renderer. Nothing here touches pixels or a document
//! format; sizes come from the heuristics in [`text`].

pub mod placeholder;
pub mod style;
pub mod table;
pub mod text;

use crate::aggregate::InputLabelEntry;
use crate::input::{InputCode, KindGroup};
use serde::Serialize;
use style::{Border, LayoutStyle, TextAnchor, TextStyle};
use table::{ActionCells, TableLayout};
use text::BoxSize;
use tracing::debug;

/// Drawing surface size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

/// Text to place at an anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub anchor_x: f32,
    pub anchor_y: f32,
    /// Box to auto-shrink into; `None` keeps the configured font size.
    pub max_size: Option<BoxSize>,
    /// Input this annotation labels, used for ordering.
    pub input_code: Option<String>,
    /// Replaces the layout's text style for this annotation.
    pub style: Option<TextStyle>,
}

impl Annotation {
    pub fn new(text: impl Into<String>, anchor_x: f32, anchor_y: f32) -> Self {
        Self {
            text: text.into(),
            anchor_x,
            anchor_y,
            max_size: None,
            input_code: None,
            style: None,
        }
    }

    pub fn with_max_size(mut self, width: f32, height: f32) -> Self {
        self.max_size = Some(BoxSize { width, height });
        self
    }

    pub fn for_input(mut self, input_code: impl Into<String>) -> Self {
        self.input_code = Some(input_code.into());
        self
    }

    fn order_key(&self) -> (KindGroup, u32) {
        let Some(code) = self.input_code.as_deref().and_then(InputCode::parse) else {
            return (KindGroup::Other, 0);
        };
        let group = code.kind.group();
        let n = match group {
            KindGroup::Button => code.kind.number().unwrap_or(0),
            _ => 0,
        };
        (group, n)
    }
}

/// A positioned, possibly multi-line text run. `y` is the first line's baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub anchor: TextAnchor,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub fill_opacity: f32,
    pub corner_radius: Option<f32>,
    pub border: Option<Border>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawInstruction {
    Text(TextRun),
    Rect(Rect),
    Line(Line),
    Table(TableLayout),
}

/// Output of [`OverlayEngine::layout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayout {
    pub surface: Surface,
    /// Buttons by number, then hats, then everything else, then the table.
    pub instructions: Vec<DrawInstruction>,
    /// Unplaced entries in table order, listed even when the table is disabled.
    pub unplaced: Vec<InputLabelEntry>,
}

impl OverlayLayout {
    pub fn table(&self) -> Option<&TableLayout> {
        self.instructions.iter().find_map(|i| match i {
            DrawInstruction::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn table_mut(&mut self) -> Option<&mut TableLayout> {
        self.instructions.iter_mut().find_map(|i| match i {
            DrawInstruction::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.instructions.iter().filter_map(|i| match i {
            DrawInstruction::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Lays out overlays with one [`LayoutStyle`].
#[derive(Debug, Clone, Default)]
pub struct OverlayEngine {
    style: LayoutStyle,
}

impl OverlayEngine {
    pub fn new(style: LayoutStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &LayoutStyle {
        &self.style
    }

    /// Lays out placed annotations and the unplaced-entries table.
    ///
    /// The table's Action cells hold placeholders when `cells` is
    /// [`ActionCells::Placeholders`]; fill them later with [`TableLayout::substitute`].
    pub fn layout(
        &self,
        surface: Surface,
        annotations: &[Annotation],
        unplaced: &[InputLabelEntry],
        cells: ActionCells,
    ) -> OverlayLayout {
        let mut ordered: Vec<&Annotation> = annotations
            .iter()
            .filter(|a| !a.text.trim().is_empty())
            .collect();
        ordered.sort_by_key(|a| a.order_key());

        let mut instructions: Vec<DrawInstruction> =
            ordered.into_iter().flat_map(|a| self.place(a)).collect();

        let mut unplaced = unplaced.to_vec();
        table::sort_unplaced(&mut unplaced);
        if self.style.table.enabled {
            if let Some(table) = table::build_table(&unplaced, &self.style.table, cells) {
                instructions.push(DrawInstruction::Table(table));
            }
        }
        debug!(
            instructions = instructions.len(),
            unplaced = unplaced.len(),
            "overlay laid out"
        );

        OverlayLayout {
            surface,
            instructions,
            unplaced,
        }
    }

    /// Instructions for one annotation: an optional background, then the text.
    pub fn place(&self, annotation: &Annotation) -> Vec<DrawInstruction> {
        let style = annotation.style.as_ref().unwrap_or(&self.style.text);
        let wrap = &self.style.wrap;
        let lines = if wrap.enabled {
            text::wrap_words(&annotation.text, wrap.max_words_per_line)
        } else {
            vec![annotation.text.clone()]
        };

        let font_size = match annotation.max_size {
            Some(max) => {
                let measured = text::measure(&lines, style.font_size, &self.style.shrink);
                text::shrink_font(style.font_size, measured, max, &self.style.shrink)
            }
            None => style.font_size,
        };

        let line_height = font_size * wrap.line_spacing;
        let y_start = if lines.len() > 1 {
            annotation.anchor_y - line_height * (lines.len() - 1) as f32 / 2.0
        } else {
            annotation.anchor_y
        };

        let mut out = Vec::with_capacity(2);
        if self.style.background.enabled {
            out.push(DrawInstruction::Rect(text::background_rect(
                annotation.anchor_x,
                y_start,
                &lines,
                font_size,
                &self.style.background,
                &self.style.shrink,
            )));
        }
        out.push(DrawInstruction::Text(TextRun {
            x: annotation.anchor_x,
            y: y_start,
            lines,
            line_height,
            font_family: style.font_family.clone(),
            font_size,
            fill: style.fill.clone(),
            anchor: style.text_anchor,
            stroke: style.stroke.clone(),
            stroke_width: style.stroke.as_ref().and(style.stroke_width),
            bold: false,
        }));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SURFACE: Surface = Surface {
        width: 800.0,
        height: 600.0,
    };

    fn first_text(instructions: &[DrawInstruction]) -> &TextRun {
        instructions
            .iter()
            .find_map(|i| match i {
                DrawInstruction::Text(t) => Some(t),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_ordering_buttons_hats_others() {
        let engine = OverlayEngine::default();
        let annotations = vec![
            Annotation::new("Roll", 0.0, 0.0).for_input("js1_x"),
            Annotation::new("Boost", 0.0, 0.0).for_input("js1_hat1_up"),
            Annotation::new("Missiles", 0.0, 0.0).for_input("js1_button10"),
            Annotation::new("Free text", 0.0, 0.0),
            Annotation::new("Fire", 0.0, 0.0).for_input("js1_button2"),
            Annotation::new("   ", 0.0, 0.0).for_input("js1_button1"),
        ];
        let layout = engine.layout(SURFACE, &annotations, &[], ActionCells::Labels);
        let texts: Vec<_> = layout.text_runs().map(|t| t.lines[0].as_str()).collect();
        assert_eq!(texts, vec!["Fire", "Missiles", "Boost", "Roll", "Free text"]);
        assert!(layout.table().is_none());
    }

    #[test]
    fn test_wrap_centres_block() {
        let mut style = LayoutStyle::default();
        style.wrap.enabled = true;
        let engine = OverlayEngine::new(style);
        let out = engine.place(&Annotation::new("Cycle Missile Type Forward", 100.0, 50.0));
        let run = first_text(&out);
        assert_eq!(run.lines, vec!["Cycle Missile", "Type Forward"]);
        assert!((run.line_height - 12.0).abs() < 1e-4);
        assert!((run.y - 44.0).abs() < 1e-4);
    }

    #[test]
    fn test_auto_shrink_only_when_sized() {
        let engine = OverlayEngine::default();
        let long = "Target Nearest Hostile Ship";

        let plain = engine.place(&Annotation::new(long, 0.0, 0.0));
        assert_eq!(first_text(&plain).font_size, 10.0);

        // 27 glyphs measure 162 x 12 at size 10.
        let sized = engine.place(&Annotation::new(long, 0.0, 0.0).with_max_size(129.6, 20.0));
        let font = first_text(&sized).font_size;
        assert!((font - 10.0 * 0.8 * 0.9).abs() < 1e-3);

        let tiny = engine.place(&Annotation::new(long, 0.0, 0.0).with_max_size(81.0, 20.0));
        assert_eq!(first_text(&tiny).font_size, 6.0);
    }

    #[test]
    fn test_background_precedes_text() {
        let mut style = LayoutStyle::default();
        style.background.enabled = true;
        let out = OverlayEngine::new(style).place(&Annotation::new("Fire", 10.0, 10.0));
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], DrawInstruction::Rect(_)));
    }

    #[test]
    fn test_table_emitted_last_and_only_when_needed() {
        let mut style = LayoutStyle::default();
        style.table.enabled = true;
        let engine = OverlayEngine::new(style);
        let unplaced = vec![
            InputLabelEntry::new("js1_button3", vec!["Fire".into()]),
            InputLabelEntry::new("js1_x", vec!["Roll".into()]),
            InputLabelEntry::new("js1_button1", vec!["Boost".into()]),
        ];
        let annotations = vec![Annotation::new("Pitch", 0.0, 0.0).for_input("js1_y")];

        let layout = engine.layout(SURFACE, &annotations, &unplaced, ActionCells::Placeholders);
        assert!(matches!(layout.instructions.last(), Some(DrawInstruction::Table(_))));
        let table = layout.table().unwrap();
        let inputs: Vec<_> = table.rows.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["Button 1", "Button 3", "Axis X"]);

        let empty = engine.layout(SURFACE, &annotations, &[], ActionCells::Placeholders);
        assert!(empty.table().is_none());
    }

    #[test]
    fn test_unplaced_listed_when_table_disabled() {
        let engine = OverlayEngine::default();
        let unplaced = vec![
            InputLabelEntry::new("js1_rotz", vec!["Yaw".into()]),
            InputLabelEntry::new("js1_button4", vec!["Scan".into()]),
        ];
        let layout = engine.layout(SURFACE, &[], &unplaced, ActionCells::Labels);
        assert!(layout.table().is_none());
        let codes: Vec<_> = layout.unplaced.iter().map(|e| e.input_code.as_str()).collect();
        assert_eq!(codes, vec!["js1_button4", "js1_rotz"]);
    }
}
