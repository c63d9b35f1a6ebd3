//! Fallback table for inputs without a placeholder on the template.
//!
//! Built in two phases. [`build_table`] lays out geometry with each Action cell either
//! a [`Cell::Placeholder`] keyed by input code or final text. [`TableLayout::substitute`]
//! later swaps placeholders for labels without touching geometry.

use super::placeholder;
use super::style::{TablePolicy, TextAnchor};
use super::{DrawInstruction, Line, Rect, TextRun};
use crate::aggregate::InputLabelEntry;
use serde::Serialize;
use std::cmp::Ordering;

pub const HEADERS: [&str; 2] = ["Action", "Input"];

/// Left inset of cell text.
const CELL_PADDING: f32 = 5.0;

/// Content of an Action cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cell {
    /// Waiting for the label of this input code.
    Placeholder(String),
    Text(String),
}

impl Cell {
    /// Renderable text; placeholders render as `{{ code }}`.
    pub fn text(&self) -> String {
        match self {
            Cell::Placeholder(code) => placeholder::token(code),
            Cell::Text(text) => text.clone(),
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Cell::Text(_))
    }
}

/// How [`build_table`] fills the Action column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCells {
    Placeholders,
    Labels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub input_code: String,
    pub action: Cell,
    /// Input column text (`"Button 7"`).
    pub input: String,
    pub action_x: f32,
    pub input_x: f32,
    /// Text baseline.
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub row_height: f32,
    pub column_widths: [f32; 2],
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub stroke: Option<String>,
    pub stroke_width: f32,
    pub header: Vec<TextRun>,
    pub rows: Vec<TableRow>,
    pub background: Option<Rect>,
    /// Header separator and column separator.
    pub rules: Vec<Line>,
}

/// Input column text for an entry: the short input label, else the raw code.
pub fn input_label(entry: &InputLabelEntry) -> String {
    entry
        .input()
        .map(|code| code.kind.short_label())
        .unwrap_or_else(|| entry.input_code.clone())
}

fn first_number(label: &str) -> Option<u64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Numbered labels first by their first number, then the rest alphabetically.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (first_number(a), first_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts unplaced entries by their input label; see [`compare_labels`].
pub fn sort_unplaced(entries: &mut [InputLabelEntry]) {
    entries.sort_by(|a, b| compare_labels(&input_label(a), &input_label(b)));
}

/// Lays out the table. Entries are used in the order given. `None` when empty.
pub fn build_table(
    entries: &[InputLabelEntry],
    policy: &TablePolicy,
    cells: ActionCells,
) -> Option<TableLayout> {
    if entries.is_empty() {
        return None;
    }
    let (x, y, rh, font) = (policy.x, policy.y, policy.row_height, policy.font_size);
    let [col0, col1] = policy.column_widths;
    let width = col0 + col1;
    let height = (entries.len() as f32 + 1.0) * rh;

    let run = |text: &str, tx: f32, ty: f32, anchor: TextAnchor, bold: bool| TextRun {
        x: tx,
        y: ty,
        lines: vec![text.to_string()],
        line_height: rh,
        font_family: policy.font_family.clone(),
        font_size: font,
        fill: policy.fill.clone(),
        anchor,
        stroke: policy.stroke.clone(),
        stroke_width: policy.stroke.as_ref().map(|_| policy.stroke_width),
        bold,
    };

    let header_y = y + rh / 2.0 + font / 3.0;
    let header = vec![
        run(HEADERS[0], x + col0 / 2.0, header_y, TextAnchor::Middle, true),
        run(HEADERS[1], x + col0 + col1 / 2.0, header_y, TextAnchor::Middle, true),
    ];

    let rows = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| TableRow {
            input_code: entry.input_code.clone(),
            action: match cells {
                ActionCells::Placeholders => Cell::Placeholder(entry.input_code.clone()),
                ActionCells::Labels => Cell::Text(entry.display_label.clone()),
            },
            input: input_label(entry),
            action_x: x + CELL_PADDING,
            input_x: x + col0 + CELL_PADDING,
            y: y + (i as f32 + 2.0) * rh - rh / 2.0 + font / 3.0,
        })
        .collect();

    let bg = &policy.background;
    let (background, rules) = if bg.enabled {
        let line = |x1: f32, y1: f32, x2: f32, y2: f32| Line {
            x1,
            y1,
            x2,
            y2,
            color: bg.border_color.clone(),
            width: bg.border_width,
        };
        (
            Some(Rect {
                x,
                y,
                width,
                height,
                fill: bg.fill.clone(),
                fill_opacity: bg.fill_opacity,
                corner_radius: None,
                border: bg.border(),
            }),
            vec![
                line(x, y + rh, x + width, y + rh),
                line(x + col0, y, x + col0, y + height),
            ],
        )
    } else {
        (None, Vec::new())
    };

    Some(TableLayout {
        x,
        y,
        width,
        height,
        row_height: rh,
        column_widths: policy.column_widths,
        font_family: policy.font_family.clone(),
        font_size: font,
        fill: policy.fill.clone(),
        stroke: policy.stroke.clone(),
        stroke_width: policy.stroke_width,
        header,
        rows,
        background,
        rules,
    })
}

impl TableLayout {
    /// Replaces placeholder cells whose code `lookup` knows. Others stay placeholders.
    pub fn substitute<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for row in &mut self.rows {
            if let Cell::Placeholder(code) = &row.action {
                if let Some(label) = lookup(code) {
                    row.action = Cell::Text(label);
                }
            }
        }
    }

    /// Input codes still waiting for a label.
    pub fn pending(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match &row.action {
                Cell::Placeholder(code) => Some(code.as_str()),
                Cell::Text(_) => None,
            })
            .collect()
    }

    fn cell_run(&self, text: String, x: f32, y: f32) -> TextRun {
        TextRun {
            x,
            y,
            lines: vec![text],
            line_height: self.row_height,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            fill: self.fill.clone(),
            anchor: TextAnchor::Start,
            stroke: self.stroke.clone(),
            stroke_width: self.stroke.as_ref().map(|_| self.stroke_width),
            bold: false,
        }
    }

    /// Flattens the table into primitive instructions, background first.
    pub fn instructions(&self) -> Vec<DrawInstruction> {
        let mut out = Vec::new();
        out.extend(self.background.clone().map(DrawInstruction::Rect));
        out.extend(self.header.iter().cloned().map(DrawInstruction::Text));
        out.extend(self.rules.first().cloned().map(DrawInstruction::Line));
        for row in &self.rows {
            out.push(DrawInstruction::Text(self.cell_run(row.action.text(), row.action_x, row.y)));
            out.push(DrawInstruction::Text(self.cell_run(row.input.clone(), row.input_x, row.y)));
        }
        out.extend(self.rules.iter().skip(1).cloned().map(DrawInstruction::Line));
        out
    }
}
