//! Text measurement heuristics.
//!
//! There are no font metrics here: glyph width is `font_size * glyph_width_factor`
//! and line height is `font_size * line_height_factor`.

use super::style::{BackgroundPolicy, ShrinkPolicy};
use super::Rect;
use crate::aggregate::LABEL_SEPARATOR;
use tracing::debug;

/// Approximate rendered size of a block of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}

/// Maximum box an annotation must fit into.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

/// Splits text into lines of at most `max_words` words.
///
/// Text that already fits on one line is returned unchanged.
pub fn wrap_words(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return vec![text.to_string()];
    }
    words.chunks(max_words).map(|chunk| chunk.join(" ")).collect()
}

fn longest_line(lines: &[String]) -> usize {
    lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}

pub fn measure(lines: &[String], font_size: f32, policy: &ShrinkPolicy) -> TextMetrics {
    TextMetrics {
        width: longest_line(lines) as f32 * font_size * policy.glyph_width_factor,
        height: font_size * policy.line_height_factor * lines.len() as f32,
    }
}

/// Fit ratio for `measured` inside `max`, or `None` when it already fits.
pub fn shrink_factor(measured: TextMetrics, max: BoxSize) -> Option<f32> {
    if measured.width <= max.width && measured.height <= max.height {
        return None;
    }
    let wr = if measured.width > 0.0 { max.width / measured.width } else { 1.0 };
    let hr = if measured.height > 0.0 { max.height / measured.height } else { 1.0 };
    Some(wr.min(hr))
}

/// Font size that makes `measured` fit `max`.
///
/// Scales by the fit ratio times the safety factor, floored at the minimum font size.
/// Never returns more than `font_size`.
pub fn shrink_font(
    font_size: f32,
    measured: TextMetrics,
    max: BoxSize,
    policy: &ShrinkPolicy,
) -> f32 {
    let Some(factor) = shrink_factor(measured, max) else {
        return font_size;
    };
    let shrunk = (font_size * factor * policy.safety_factor).max(policy.min_font_size);
    debug!(font_size, shrunk, factor, "auto-shrink");
    shrunk.min(font_size)
}

/// Background rectangle for a text block centred on `anchor_x`.
///
/// `y_start` is the baseline of the first line.
pub fn background_rect(
    anchor_x: f32,
    y_start: f32,
    lines: &[String],
    font_size: f32,
    background: &BackgroundPolicy,
    shrink: &ShrinkPolicy,
) -> Rect {
    let metrics = measure(lines, font_size, shrink);
    let pad = background.padding;
    Rect {
        x: anchor_x - metrics.width / 2.0 - pad,
        y: y_start - font_size * 0.8 - pad,
        width: metrics.width + pad * 2.0,
        height: metrics.height + pad * 2.0,
        fill: background.fill.clone(),
        fill_opacity: background.fill_opacity,
        corner_radius: background.corner_radius(),
        border: background.border(),
    }
}

/// Fits several labels into `max_width` characters.
///
/// The first label is always shown. A lone label that is too long is cut and
/// ellipsised. Otherwise further labels are appended while they fit alongside a
/// `" (+N)"` count of the ones left out.
pub fn condense_labels(labels: &[String], max_width: usize) -> String {
    let Some(first) = labels.first() else {
        return String::new();
    };
    if labels.len() == 1 {
        if first.chars().count() <= max_width {
            return first.clone();
        }
        let cut: String = first.chars().take(max_width.saturating_sub(3)).collect();
        return format!("{cut}...");
    }

    let mut shown = 1;
    let mut length = first.chars().count();
    for (i, label) in labels.iter().enumerate().skip(1) {
        let remaining_after = labels.len() - i - 1;
        let indicator = if remaining_after > 0 {
            format!(" (+{remaining_after})").len()
        } else {
            0
        };
        let candidate = length + LABEL_SEPARATOR.len() + label.chars().count();
        if candidate + indicator > max_width {
            break;
        }
        length = candidate;
        shown += 1;
    }

    let mut text = labels[..shown].join(LABEL_SEPARATOR);
    let hidden = labels.len() - shown;
    if hidden > 0 {
        text.push_str(&format!(" (+{hidden})"));
    }
    debug!(shown, hidden, "condensed labels");
    text
}
