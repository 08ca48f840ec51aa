//! Unit conversion constants.
//!
//! Indents are expressed in twentieths of a point ("units"), the measure the
//! document model uses for paragraph geometry.

/// Indent units per CSS pixel.
pub const UNITS_PER_PX: f32 = 15.0;
/// Indent units per em.
pub const UNITS_PER_EM: f32 = 240.0;
/// Indent units per point.
pub const UNITS_PER_PT: f32 = 20.0;

/// Divisor turning CSS pixels into points for font sizes.
pub const PX_PER_PT: f32 = 1.33;

/// Pixels per point for image geometry (96 dpi over 72 dpi).
pub const IMAGE_PX_PER_PT: f32 = 4.0 / 3.0;

/// English Metric Units per pixel at 96 dpi.
pub const EMU_PER_PX: i64 = 9525;

pub const MM_PER_INCH: f64 = 25.4;
pub const PT_PER_INCH: f64 = 72.0;

/// Convert a length to indent units, if the unit is one we understand.
pub fn to_indent_units(value: f32, unit: &str) -> Option<i32> {
    let factor = match unit.to_ascii_lowercase().as_str() {
        "px" => UNITS_PER_PX,
        "em" | "rem" => UNITS_PER_EM,
        "pt" => UNITS_PER_PT,
        _ => return None,
    };
    Some((value * factor).round() as i32)
}

/// Convert a font size to points, rounded to the half point.
pub fn to_font_points(value: f32, unit: &str) -> Option<f32> {
    let pt = match unit.to_ascii_lowercase().as_str() {
        "pt" => value,
        "px" => value / PX_PER_PT,
        _ => return None,
    };
    Some((pt * 2.0).round() / 2.0)
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * PT_PER_INCH
}
