//! Inline style resolution.
//!
//! [`resolve`] turns the value of a `style="..."` attribute into a
//! [`StyleAttributes`] bag. Only the handful of properties the export
//! pipeline understands are extracted; everything else is ignored, and a
//! property that is absent or malformed stays `None` rather than being
//! guessed.
//!
//! ```
//! use folio::style::{resolve, Alignment};
//!
//! let style = resolve("color: rgb(255,0,0); font-weight: bold; text-align: center");
//! assert_eq!(style.color.as_deref(), Some("FF0000"));
//! assert_eq!(style.alignment, Some(Alignment::Center));
//! assert_eq!(style.bold, Some(true));
//! ```

pub mod color;
mod resolver;
pub mod units;

pub use resolver::resolve;

use serde::Deserialize;

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map a `text-align` keyword; anything unrecognised is `Left`.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }

    /// WordprocessingML `w:jc` value.
    pub fn as_ooxml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// A CSS length as written, before conversion to a target unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CssLength {
    Px(f32),
    Pt(f32),
    Em(f32),
    Percent(f32),
}

impl CssLength {
    pub(crate) fn from_dimension(value: f32, unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "px" => Some(CssLength::Px(value)),
            "pt" => Some(CssLength::Pt(value)),
            "em" | "rem" => Some(CssLength::Em(value)),
            _ => None,
        }
    }

    /// Indent units (twentieths of a point); percentages have no meaning here.
    pub fn to_indent_units(self) -> Option<i32> {
        match self {
            CssLength::Px(v) => units::to_indent_units(v, "px"),
            CssLength::Pt(v) => units::to_indent_units(v, "pt"),
            CssLength::Em(v) => units::to_indent_units(v, "em"),
            CssLength::Percent(_) => None,
        }
    }

    /// Image pixels; `%` resolves against `reference_px`.
    pub fn to_image_px(self, reference_px: f32) -> Option<f32> {
        match self {
            CssLength::Px(v) => Some(v),
            CssLength::Pt(v) => Some(v * units::IMAGE_PX_PER_PT),
            CssLength::Percent(p) => Some(reference_px * p / 100.0),
            CssLength::Em(_) => None,
        }
    }
}

/// Attributes extracted from one inline style declaration.
///
/// Derived and immutable: resolving the same string twice yields equal bags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAttributes {
    /// Text colour, 6-digit uppercase hex.
    pub color: Option<String>,
    /// Background/shading colour, 6-digit uppercase hex.
    pub background_color: Option<String>,
    pub font_size_pt: Option<f32>,
    /// First family of `font-family`, unquoted.
    pub font_family: Option<String>,
    pub alignment: Option<Alignment>,
    /// `margin-left` in indent units.
    pub indent_left_units: Option<i32>,
    /// `text-indent` in indent units.
    pub indent_first_line_units: Option<i32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub width: Option<CssLength>,
    pub height: Option<CssLength>,
}

impl StyleAttributes {
    pub fn is_empty(&self) -> bool {
        *self == StyleAttributes::default()
    }
}
