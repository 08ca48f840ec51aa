//! Raster pagination tests.

use folio::FailureCause;
use folio::export::pdf::{PdfWriter, document_height_mm, page_count, paginate};
use image::{Rgba, RgbaImage};

const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;

/// Bitmap 794 px wide whose height is `pages` A4 page-heights.
fn bitmap(pages: f64) -> RgbaImage {
    let width = 794u32;
    let page_px = A4_HEIGHT_MM * f64::from(width) / A4_WIDTH_MM;
    RgbaImage::new(width, (page_px * pages).round() as u32)
}

#[test]
fn test_two_page_heights_give_two_bands() {
    let bands = paginate(&bitmap(2.0), A4_WIDTH_MM, A4_HEIGHT_MM).unwrap();
    assert_eq!(bands.len(), 2);
}

#[test]
fn test_slightly_more_gives_extra_band() {
    let bands = paginate(&bitmap(2.01), A4_WIDTH_MM, A4_HEIGHT_MM).unwrap();
    assert_eq!(bands.len(), 3);
    assert!(bands[2].height_mm < A4_HEIGHT_MM * 0.05);
}

#[test]
fn test_bands_cover_the_whole_bitmap() {
    let source = bitmap(3.4);
    let bands = paginate(&source, A4_WIDTH_MM, A4_HEIGHT_MM).unwrap();
    let rows: u32 = bands.iter().map(|b| b.image.height()).sum();
    assert_eq!(rows, source.height());

    for (i, band) in bands.iter().enumerate() {
        assert_eq!(band.image.width(), source.width());
        assert!((band.offset_mm - i as f64 * A4_HEIGHT_MM).abs() < 1e-9);
    }
}

#[test]
fn test_band_keeps_its_own_pixels() {
    let mut source = bitmap(2.0);
    let height = source.height();
    source.put_pixel(0, height - 1, Rgba([255, 0, 0, 255]));
    let bands = paginate(&source, A4_WIDTH_MM, A4_HEIGHT_MM).unwrap();
    let last = &bands[1].image;
    assert_eq!(last.get_pixel(0, last.height() - 1).0, [255, 0, 0, 255]);
    assert_eq!(bands[0].image.get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn test_zero_dimension_is_fatal() {
    let err = paginate(&RgbaImage::new(794, 0), A4_WIDTH_MM, A4_HEIGHT_MM).unwrap_err();
    assert_eq!(err.cause(), FailureCause::Render);
    assert!(err.to_string().contains("failed to render"));
}

#[test]
fn test_page_count_is_ceiling() {
    let total = document_height_mm(794, 2246, A4_WIDTH_MM);
    assert_eq!(page_count(total, A4_HEIGHT_MM), 2);
    assert_eq!(page_count(A4_HEIGHT_MM * 2.01, A4_HEIGHT_MM), 3);
    assert_eq!(page_count(A4_HEIGHT_MM * 0.5, A4_HEIGHT_MM), 1);
}

#[test]
fn test_writer_emits_one_page_per_band() {
    let bands = paginate(&bitmap(1.5), A4_WIDTH_MM, A4_HEIGHT_MM).unwrap();
    let mut writer = PdfWriter::new(A4_WIDTH_MM, A4_HEIGHT_MM, 1);
    for band in &bands {
        writer.add_band(band).unwrap();
    }
    assert_eq!(writer.page_count(), 2);
    let mut out = Vec::new();
    writer.finish("Bands", &mut out).unwrap();
    assert!(out.starts_with(b"%PDF-1.7"));
}
