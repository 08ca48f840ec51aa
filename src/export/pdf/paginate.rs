//! Raster pagination.
//!
//! The captured bitmap is cut into page-height bands purely by arithmetic.
//! Nothing here knows where headings or table rows fall, so content can be
//! split across a page boundary.

use image::RgbaImage;
use image::imageops;

use crate::error::{Error, Result};

/// Remaining height below this is treated as nothing left.
const EPSILON_MM: f64 = 1e-6;

/// One output page cut from the full-document bitmap.
#[derive(Clone)]
pub struct PageBand {
    /// Pixels for this page only.
    pub image: RgbaImage,
    /// Distance from the top of the document.
    pub offset_mm: f64,
    /// Height of content on this page; the last band may be short.
    pub height_mm: f64,
}

impl std::fmt::Debug for PageBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBand")
            .field("pixels", &self.image.dimensions())
            .field("offset_mm", &self.offset_mm)
            .field("height_mm", &self.height_mm)
            .finish()
    }
}

/// Height of `bitmap` once scaled to `page_width_mm` wide.
pub fn document_height_mm(width_px: u32, height_px: u32, page_width_mm: f64) -> f64 {
    f64::from(height_px) * page_width_mm / f64::from(width_px)
}

/// `ceil(total / page)`, counted the way [`paginate`] emits bands.
///
/// Zero when either height is not a finite number or the page has no height.
pub fn page_count(total_mm: f64, page_height_mm: f64) -> usize {
    if !total_mm.is_finite() || !page_height_mm.is_finite() || page_height_mm <= 0.0 {
        return 0;
    }
    let mut remaining = total_mm;
    let mut pages = 0;
    while remaining > EPSILON_MM {
        pages += 1;
        remaining -= page_height_mm;
    }
    pages
}

/// Slice `bitmap` into page bands.
///
/// A bitmap with no width or height means the content never rendered and is
/// an error rather than an empty document.
pub fn paginate(bitmap: &RgbaImage, page_width_mm: f64, page_height_mm: f64) -> Result<Vec<PageBand>> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Render(format!(
            "content failed to render: captured bitmap is {width}x{height}"
        )));
    }
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(page_width_mm) || !positive(page_height_mm) {
        return Err(Error::InvalidInput(
            "page dimensions must be positive".to_string(),
        ));
    }

    let total_mm = document_height_mm(width, height, page_width_mm);
    let px_per_mm = f64::from(width) / page_width_mm;
    if page_height_mm * px_per_mm < 1.0 {
        return Err(Error::InvalidInput(format!(
            "page height of {page_height_mm} mm is under one pixel row"
        )));
    }

    let mut bands = Vec::with_capacity(page_count(total_mm, page_height_mm));
    let mut remaining = total_mm;
    let mut offset_mm = 0.0;
    while remaining > EPSILON_MM {
        let band_mm = remaining.min(page_height_mm);

        let top = ((offset_mm * px_per_mm).round() as u32).min(height - 1);
        let bottom = (((offset_mm + band_mm) * px_per_mm).round() as u32).clamp(top + 1, height);
        let image = imageops::crop_imm(bitmap, 0, top, width, bottom - top).to_image();

        bands.push(PageBand {
            image,
            offset_mm,
            height_mm: band_mm,
        });
        offset_mm += page_height_mm;
        remaining -= page_height_mm;
    }

    log::debug!(
        "paginated {width}x{height} px ({total_mm:.1} mm) into {} page(s)",
        bands.len()
    );
    Ok(bands)
}
