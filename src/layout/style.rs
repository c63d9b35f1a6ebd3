//! Layout style configuration.
//!
//! Every policy is explicit and every field has a default, so a partial TOML or JSON
//! document only needs to name what it changes:
//!
//! ```toml
//! label_width = 24
//!
//! [text]
//! font_size = 12
//!
//! [wrap]
//! enabled = true
//! max_words_per_line = 3
//!
//! [table]
//! enabled = true
//! column_widths = [220, 120]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Horizontal alignment of a text run relative to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// Font and paint for placed annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub text_anchor: TextAnchor,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 10.0,
            fill: "black".to_string(),
            text_anchor: TextAnchor::Middle,
            stroke: None,
            stroke_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapPolicy {
    pub enabled: bool,
    /// Words per line; `0` behaves like `1`.
    pub max_words_per_line: usize,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for WrapPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_words_per_line: 2,
            line_spacing: 1.2,
        }
    }
}

/// Optional border drawn around a rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: String,
    pub width: f32,
    pub opacity: f32,
}

/// Background rectangle behind each placed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundPolicy {
    pub enabled: bool,
    pub fill: String,
    pub fill_opacity: f32,
    pub padding: f32,
    /// Corner radius; `0` draws square corners.
    pub border_radius: f32,
    /// `"none"` disables the border.
    pub border_color: String,
    pub border_width: f32,
    pub stroke_opacity: f32,
}

impl Default for BackgroundPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            fill: "white".to_string(),
            fill_opacity: 0.0,
            padding: 2.0,
            border_radius: 2.0,
            border_color: "none".to_string(),
            border_width: 0.0,
            stroke_opacity: 1.0,
        }
    }
}

impl BackgroundPolicy {
    pub fn corner_radius(&self) -> Option<f32> {
        (self.border_radius > 0.0).then_some(self.border_radius)
    }

    pub fn border(&self) -> Option<Border> {
        border(&self.border_color, self.border_width, self.stroke_opacity)
    }
}

/// Auto-shrink and text-measurement heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkPolicy {
    /// Multiplier (< 1) applied on top of the fit ratio.
    pub safety_factor: f32,
    /// Smallest font size auto-shrink will produce.
    pub min_font_size: f32,
    /// Approximate glyph width as a multiple of the font size.
    pub glyph_width_factor: f32,
    /// Approximate line height as a multiple of the font size.
    pub line_height_factor: f32,
}

impl Default for ShrinkPolicy {
    fn default() -> Self {
        Self {
            safety_factor: 0.9,
            min_font_size: 6.0,
            glyph_width_factor: 0.6,
            line_height_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableBackground {
    pub enabled: bool,
    pub fill: String,
    pub fill_opacity: f32,
    pub border_color: String,
    pub border_width: f32,
    pub stroke_opacity: f32,
}

impl Default for TableBackground {
    fn default() -> Self {
        Self {
            enabled: true,
            fill: "white".to_string(),
            fill_opacity: 0.9,
            border_color: "black".to_string(),
            border_width: 1.0,
            stroke_opacity: 1.0,
        }
    }
}

impl TableBackground {
    pub fn border(&self) -> Option<Border> {
        border(&self.border_color, self.border_width, self.stroke_opacity)
    }
}

/// Fallback table listing unplaced inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePolicy {
    pub enabled: bool,
    pub x: f32,
    pub y: f32,
    pub font_family: String,
    pub font_size: f32,
    pub fill: String,
    pub stroke: Option<String>,
    pub stroke_width: f32,
    pub row_height: f32,
    /// Action and Input column widths.
    pub column_widths: [f32; 2],
    pub background: TableBackground,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            x: 20.0,
            y: 20.0,
            font_family: "Arial".to_string(),
            font_size: 9.0,
            fill: "black".to_string(),
            stroke: Some("white".to_string()),
            stroke_width: 1.0,
            row_height: 18.0,
            column_widths: [200.0, 150.0],
            background: TableBackground::default(),
        }
    }
}

/// Complete style for one overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub text: TextStyle,
    pub wrap: WrapPolicy,
    pub background: BackgroundPolicy,
    pub shrink: ShrinkPolicy,
    pub table: TablePolicy,
    /// Character budget for condensed multi-action labels.
    pub label_width: usize,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            text: TextStyle::default(),
            wrap: WrapPolicy::default(),
            background: BackgroundPolicy::default(),
            shrink: ShrinkPolicy::default(),
            table: TablePolicy::default(),
            label_width: 30,
        }
    }
}

impl LayoutStyle {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Toml {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::json(origin, e))
    }

    /// Loads a `.toml` file, or JSON for any other extension.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&text, path),
            _ => Self::from_json_str(&text, path),
        }
    }

    /// Like [`load`](Self::load), falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using default layout style");
            Self::default()
        })
    }
}

fn border(color: &str, width: f32, opacity: f32) -> Option<Border> {
    if color.is_empty() || color.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(Border {
        color: color.to_string(),
        width,
        opacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let style = LayoutStyle::from_toml_str(
            r#"
            label_width = 24

            [text]
            font_size = 12

            [wrap]
            enabled = true

            [table]
            enabled = true
            column_widths = [220, 120]

            [table.background]
            fill_opacity = 0.5
            "#,
            Path::new("style.toml"),
        )
        .unwrap();

        assert_eq!(style.label_width, 24);
        assert_eq!(style.text.font_size, 12.0);
        assert_eq!(style.text.font_family, "Arial");
        assert!(style.wrap.enabled);
        assert_eq!(style.wrap.max_words_per_line, 2);
        assert_eq!(style.table.column_widths, [220.0, 120.0]);
        assert_eq!(style.table.row_height, 18.0);
        assert_eq!(style.table.background.fill_opacity, 0.5);
        assert_eq!(style.table.background.border_color, "black");
    }

    #[test]
    fn test_json_style() {
        let style = LayoutStyle::from_json_str(
            r#"{"background": {"enabled": true, "border_color": "red", "border_width": 2}}"#,
            Path::new("style.json"),
        )
        .unwrap();
        let border = style.background.border().unwrap();
        assert_eq!(border.color, "red");
        assert_eq!(border.width, 2.0);
        assert_eq!(style.background.corner_radius(), Some(2.0));
        assert!(LayoutStyle::default().background.border().is_none());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("style.toml");
        std::fs::write(&toml_path, "[shrink]\nmin_font_size = 4\n").unwrap();
        assert_eq!(LayoutStyle::load(&toml_path).unwrap().shrink.min_font_size, 4.0);

        let bad = dir.path().join("style.json");
        std::fs::write(&bad, "min_font_size = 4").unwrap();
        assert!(LayoutStyle::load(&bad).unwrap_err().is_malformed());
        assert_eq!(LayoutStyle::load_or_default(&bad), LayoutStyle::default());
    }
}
