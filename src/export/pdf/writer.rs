//! Image-only PDF assembly.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::PageBand;
use crate::error::Result;
use crate::style::units::mm_to_pt;

/// Builds a PDF with one full-width picture per page.
pub struct PdfWriter {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_width: f32,
    page_height: f32,
    compression: Compression,
}

impl PdfWriter {
    pub fn new(page_width_mm: f64, page_height_mm: f64, compression_level: u32) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            page_width: mm_to_pt(page_width_mm) as f32,
            page_height: mm_to_pt(page_height_mm) as f32,
            compression: Compression::new(compression_level.min(9)),
        }
    }

    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    /// Add a page showing `band` at the top, scaled to the page width.
    pub fn add_band(&mut self, band: &PageBand) -> Result<()> {
        let (width, height) = band.image.dimensions();
        let rgb: Vec<u8> = band
            .image
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            self.deflate(&rgb)?,
        );
        let image_id = self.document.add_object(image_stream);

        let draw_width = self.page_width;
        let draw_height = mm_to_pt(band.height_mm) as f32;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        draw_width.into(),
                        0.into(),
                        0.into(),
                        draw_height.into(),
                        0.into(),
                        (self.page_height - draw_height).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Page".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_stream = Stream::new(
            dictionary! {"Filter" => "FlateDecode"},
            self.deflate(&content.encode()?)?,
        );
        let content_id = self.document.add_object(content_stream);

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.page_width.into(), self.page_height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Page" => image_id },
            },
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Close the page tree and write the file.
    pub fn finish<W: Write>(mut self, title: &str, writer: &mut W) -> Result<()> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self
            .document
            .add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("folio"),
        });
        self.document.trailer.set("Info", info_id);

        self.document.save_to(writer)?;
        Ok(())
    }
}
