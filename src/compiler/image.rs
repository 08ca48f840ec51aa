//! Data-URI image decoding and display sizing.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;

use super::RichTextNode;
use crate::ir::ImageElement;
use crate::style::{Alignment, CssLength, resolve};
use crate::util::MediaFormat;

/// Reference width for percentage sizes, in pixels.
pub const CONTENT_WIDTH_PX: f32 = 640.0;

const MIN_WIDTH: f32 = 80.0;
const MAX_WIDTH: f32 = 640.0;
const MIN_HEIGHT: f32 = 80.0;
const MAX_HEIGHT: f32 = 900.0;

/// Fallback when the payload's own dimensions cannot be read.
const DEFAULT_SIZE: (u32, u32) = (400, 300);

/// What an `<img>` turned out to reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Embedded(ImageElement),
    /// A remote or relative URL; cannot be embedded.
    External(String),
    /// No `src`, or a data URI that would not decode.
    Missing,
}

/// Decode a `data:` URI into its mime type and payload.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD.decode(cleaned).ok()?
    } else {
        percent_decode_str(payload).collect()
    };

    if data.is_empty() {
        return None;
    }
    let mime = if mime.is_empty() {
        "text/plain".to_string()
    } else {
        mime
    };
    Some((mime, data))
}

/// Resolve an `<img>` element into an embeddable image.
///
/// `alignment` is that of the block the image sits in; an explicit
/// `align="center"` on the image wins.
pub fn resolve_image(node: &RichTextNode, alignment: Alignment) -> ImageSource {
    let Some(src) = node.attr("src").map(str::trim).filter(|s| !s.is_empty()) else {
        return ImageSource::Missing;
    };
    if !src.starts_with("data:") {
        return ImageSource::External(src.to_string());
    }
    let Some((_mime, data)) = decode_data_uri(src) else {
        return ImageSource::Missing;
    };

    let style = node.attr("style").map(resolve).unwrap_or_default();
    let width = node
        .attr("width")
        .and_then(parse_dimension_attr)
        .or(style.width);
    let height = node
        .attr("height")
        .and_then(parse_dimension_attr)
        .or(style.height);

    let intrinsic = intrinsic_size(&data);
    let (w, h) = display_size(width, height, intrinsic);

    let alignment = node
        .attr("align")
        .map(Alignment::from_keyword)
        .or(style.alignment)
        .unwrap_or(alignment);

    ImageSource::Embedded(ImageElement {
        format: MediaFormat::detect(&data),
        data,
        width: w,
        height: h,
        alignment,
    })
}

/// `width="300"`, `width="300px"`, `width="50%"`.
fn parse_dimension_attr(value: &str) -> Option<CssLength> {
    let value = value.trim();
    let finite = |v: &f32| v.is_finite();
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse().ok().filter(finite).map(CssLength::Percent);
    }
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse().ok().filter(finite).map(CssLength::Px)
}

fn intrinsic_size(data: &[u8]) -> (u32, u32) {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .filter(|&(w, h)| w > 0 && h > 0)
        .unwrap_or(DEFAULT_SIZE)
}

/// Pick display dimensions, completing a missing side by aspect ratio, then
/// clamp each side to its bounds.
fn display_size(
    width: Option<CssLength>,
    height: Option<CssLength>,
    intrinsic: (u32, u32),
) -> (u32, u32) {
    let (iw, ih) = (intrinsic.0 as f32, intrinsic.1 as f32);
    let usable = |v: &f32| v.is_finite() && *v > 0.0;
    let width = width
        .and_then(|l| l.to_image_px(CONTENT_WIDTH_PX))
        .filter(usable);
    // Percent heights have no meaningful reference; treat them like width.
    let height = height
        .and_then(|l| l.to_image_px(CONTENT_WIDTH_PX))
        .filter(usable);

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * ih / iw),
        (None, Some(h)) => (h * iw / ih, h),
        (None, None) => (iw, ih),
    };

    (
        w.clamp(MIN_WIDTH, MAX_WIDTH).round() as u32,
        h.clamp(MIN_HEIGHT, MAX_HEIGHT).round() as u32,
    )
}
