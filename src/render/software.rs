//! Built-in software surface.
//!
//! Lays composed markup out with fixed print metrics and paints it into an
//! RGBA bitmap. Text is drawn greeked, one box per glyph, which keeps the
//! page geometry (line breaks, block heights, table rows) faithful without a
//! font stack. Images are decoded and scaled into their boxes.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use super::{ImageLoad, LoadOutcome, RenderSurface, SurfaceProvider};
use crate::compiler::{convert, parse_markup};
use crate::error::{Error, Result};
use crate::ir::{DocumentElement, ImageElement, TextRun};
use crate::style::Alignment;
use crate::style::color::hex_to_rgb;
use crate::style::units::{IMAGE_PX_PER_PT, UNITS_PER_PX};

/// Page padding on every side, in CSS pixels.
pub const PAGE_PADDING_PX: f32 = 48.0;
/// 11pt body text.
pub const BODY_FONT_PX: f32 = 14.67;
/// h1..h4 sizes (20, 16, 14, 12 pt).
pub const HEADING_FONT_PX: [f32; 4] = [26.67, 21.33, 18.67, 16.0];
/// Line box height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.5;
/// Average advance of one glyph, in ems.
pub const CHAR_WIDTH_EM: f32 = 0.55;

const BOLD_WIDTH_EM: f32 = 0.6;
const BLOCK_GAP: f32 = 8.0;
const LIST_GAP: f32 = 4.0;
const HEADING_GAP_BEFORE: f32 = 18.0;
const SHADING_PAD: f32 = 6.0;
const CELL_PAD: f32 = 6.0;

const TEXT_COLOR: [u8; 3] = [0x33, 0x33, 0x33];
const GRID_COLOR: [u8; 3] = [0xBF, 0xBF, 0xBF];
const MISSING_IMAGE_COLOR: [u8; 3] = [0xE0, 0xE0, 0xE0];

/// Upper bound on a single capture, in bytes of RGBA.
const MAX_CAPTURE_BYTES: u64 = 1 << 31;

/// Hands out [`SoftwareSurface`]s.
#[derive(Debug, Clone, Default)]
pub struct SoftwareSurfaceProvider {
    heading_color: Option<String>,
}

impl SoftwareSurfaceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour for headings that set none themselves.
    pub fn with_heading_color(mut self, color: impl Into<String>) -> Self {
        self.heading_color = Some(color.into());
        self
    }
}

impl SurfaceProvider for SoftwareSurfaceProvider {
    type Surface = SoftwareSurface;

    fn set_heading_color(&mut self, color: &str) {
        self.heading_color = Some(color.to_string());
    }

    fn create(&self, width_px: u32) -> Result<SoftwareSurface> {
        if width_px == 0 {
            return Err(Error::Render("surface width must be positive".to_string()));
        }
        Ok(SoftwareSurface {
            width_px,
            heading_color: self.heading_color.clone(),
            layout: None,
            decoded: Arc::new(Mutex::new(HashMap::new())),
        })
    }
}

/// An in-memory surface painting into an [`RgbaImage`].
pub struct SoftwareSurface {
    width_px: u32,
    heading_color: Option<String>,
    layout: Option<Layout>,
    /// Decoded images by index, filled by the load futures.
    decoded: Arc<Mutex<HashMap<usize, RgbaImage>>>,
}

impl RenderSurface for SoftwareSurface {
    fn attach(&mut self, markup: &str) -> Result<()> {
        let tree = parse_markup(markup);
        let elements = convert(&tree, self.heading_color.as_deref());
        let layout = Layout::compute(&elements, self.width_px as f32);
        log::debug!(
            "software surface: {} element(s), {} draw command(s), {:.0} px tall",
            elements.len(),
            layout.commands.len(),
            layout.height
        );
        self.layout = Some(layout);
        Ok(())
    }

    fn image_loads(&self) -> Vec<ImageLoad> {
        let Some(layout) = &self.layout else {
            return Vec::new();
        };
        layout
            .images
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                let payload = Arc::clone(payload);
                let decoded = Arc::clone(&self.decoded);
                async move {
                    let result = tokio::task::spawn_blocking(move || {
                        image::load_from_memory(&payload).map(|img| img.to_rgba8())
                    })
                    .await;
                    match result {
                        Ok(Ok(img)) => {
                            decoded.lock().insert(index, img);
                            LoadOutcome::Loaded
                        }
                        Ok(Err(e)) => LoadOutcome::Failed(e.to_string()),
                        Err(e) => LoadOutcome::Failed(e.to_string()),
                    }
                }
                .boxed()
            })
            .collect()
    }

    fn reflow(&mut self) -> Result<(u32, u32)> {
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| Error::Render("surface is not attached".to_string()))?;
        Ok((self.width_px, layout.height.ceil() as u32))
    }

    fn capture(&mut self, scale: f32) -> Result<RgbaImage> {
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| Error::Render("surface is not attached".to_string()))?;
        let width = (self.width_px as f32 * scale).round() as u32;
        let height = (layout.height.ceil() * scale).round() as u32;
        if u64::from(width) * u64::from(height) * 4 > MAX_CAPTURE_BYTES {
            return Err(Error::Render(format!(
                "capture of {width}x{height} px exceeds the bitmap limit"
            )));
        }

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let decoded = self.decoded.lock();
        let mut painter = Painter {
            canvas: &mut canvas,
            scale,
        };
        for command in &layout.commands {
            painter.draw(command, &decoded);
        }
        Ok(canvas)
    }

    fn detach(&mut self) {
        self.layout = None;
        self.decoded.lock().clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug)]
enum DrawCommand {
    Fill { rect: Rect, color: [u8; 3] },
    Word(PlacedWord),
    Image { rect: Rect, index: usize },
}

#[derive(Debug, Clone)]
struct Word {
    text: String,
    /// Per-glyph advance.
    advance: f32,
    /// Space before the word on its line.
    gap: f32,
    font_px: f32,
    color: [u8; 3],
    underline: bool,
}

#[derive(Debug)]
struct PlacedWord {
    word: Word,
    x: f32,
    /// Baseline.
    y: f32,
}

/// Greedy line wrapping of runs into a fixed width.
struct TextBlock {
    lines: Vec<Line>,
}

#[derive(Default)]
struct Line {
    words: Vec<Word>,
    width: f32,
    height: f32,
}

impl TextBlock {
    fn wrap(runs: &[TextRun], width: f32, default_font_px: f32, force_bold: bool) -> Self {
        let mut lines = vec![Line::default()];
        let mut pending_space = 0.0;

        for run in runs {
            let font_px = run
                .font_size_pt
                .map(|pt| pt * IMAGE_PX_PER_PT)
                .unwrap_or(default_font_px);
            let em = if run.bold || force_bold {
                BOLD_WIDTH_EM
            } else {
                CHAR_WIDTH_EM
            };
            let color = run.color.as_deref().and_then(hex_to_rgb).unwrap_or(TEXT_COLOR);

            if run.is_line_break() {
                let line = current(&mut lines);
                line.height = line.height.max(font_px * LINE_HEIGHT);
                lines.push(Line::default());
                pending_space = 0.0;
                continue;
            }

            for (i, piece) in run.text.split(' ').enumerate() {
                if i > 0 {
                    pending_space = font_px * em;
                }
                if piece.is_empty() {
                    continue;
                }
                let advance = font_px * em;
                let word_width = piece.chars().count() as f32 * advance;

                let line = current(&mut lines);
                let gap = if line.words.is_empty() { 0.0 } else { pending_space };
                if !line.words.is_empty() && line.width + gap + word_width > width {
                    lines.push(Line::default());
                }
                let line = current(&mut lines);
                let gap = if line.words.is_empty() { 0.0 } else { pending_space };
                line.width += gap + word_width;
                line.height = line.height.max(font_px * LINE_HEIGHT);
                line.words.push(Word {
                    text: piece.to_string(),
                    advance,
                    gap,
                    font_px,
                    color,
                    underline: run.underline,
                });
                pending_space = 0.0;
            }
        }

        lines.retain(|l| !l.words.is_empty() || l.height > 0.0);
        TextBlock { lines }
    }

    fn height(&self) -> f32 {
        self.lines.iter().map(|l| l.height).sum()
    }

    fn place(self, x: f32, y: f32, width: f32, alignment: Alignment, out: &mut Vec<DrawCommand>) {
        let mut top = y;
        for line in self.lines {
            let offset = match alignment {
                Alignment::Center => ((width - line.width) / 2.0).max(0.0),
                Alignment::Right => (width - line.width).max(0.0),
                Alignment::Left | Alignment::Justify => 0.0,
            };
            let baseline = top + line.height * 0.75;
            let mut cursor = x + offset;
            for word in line.words {
                let start = cursor + word.gap;
                cursor = start + word.text.chars().count() as f32 * word.advance;
                out.push(DrawCommand::Word(PlacedWord {
                    x: start,
                    y: baseline,
                    word,
                }));
            }
            top += line.height;
        }
    }
}

fn current(lines: &mut Vec<Line>) -> &mut Line {
    if lines.is_empty() {
        lines.push(Line::default());
    }
    let last = lines.len() - 1;
    &mut lines[last]
}

/// Positioned draw commands for a whole document.
struct Layout {
    commands: Vec<DrawCommand>,
    images: Vec<Arc<Vec<u8>>>,
    height: f32,
}

impl Layout {
    fn compute(elements: &[DocumentElement], page_width: f32) -> Self {
        let mut builder = LayoutBuilder {
            left: PAGE_PADDING_PX,
            width: (page_width - 2.0 * PAGE_PADDING_PX).max(1.0),
            y: PAGE_PADDING_PX,
            commands: Vec::new(),
            images: Vec::new(),
        };
        for (i, element) in elements.iter().enumerate() {
            builder.element(element, i == 0);
        }

        let height = if elements.is_empty() {
            0.0
        } else {
            builder.y + PAGE_PADDING_PX
        };
        Layout {
            commands: builder.commands,
            images: builder.images,
            height,
        }
    }
}

struct LayoutBuilder {
    left: f32,
    width: f32,
    y: f32,
    commands: Vec<DrawCommand>,
    images: Vec<Arc<Vec<u8>>>,
}

impl LayoutBuilder {
    fn element(&mut self, element: &DocumentElement, first: bool) {
        match element {
            DocumentElement::Heading { level, runs } => {
                if !first {
                    self.y += HEADING_GAP_BEFORE;
                }
                let index = usize::from((*level).clamp(1, 4) - 1);
                let block = TextBlock::wrap(runs, self.width, HEADING_FONT_PX[index], true);
                let h = block.height();
                block.place(self.left, self.y, self.width, Alignment::Left, &mut self.commands);
                self.y += h + BLOCK_GAP;
            }
            DocumentElement::Paragraph(p) => {
                let indent = p.indent.left as f32 / UNITS_PER_PX;
                let x = self.left + indent;
                let width = (self.width - indent).max(1.0);
                let block = TextBlock::wrap(&p.runs, width, BODY_FONT_PX, false);
                let h = block.height();
                let pad = if p.shading.is_some() { SHADING_PAD } else { 0.0 };
                if let Some(color) = p.shading.as_deref().and_then(hex_to_rgb) {
                    self.commands.push(DrawCommand::Fill {
                        rect: Rect {
                            x,
                            y: self.y,
                            w: width,
                            h: h + 2.0 * pad,
                        },
                        color,
                    });
                }
                block.place(x + pad, self.y + pad, width - 2.0 * pad, p.alignment, &mut self.commands);
                self.y += h + 2.0 * pad + BLOCK_GAP;
            }
            DocumentElement::ListItem {
                prefix,
                runs,
                indent,
            } => {
                let indent = indent.left as f32 / UNITS_PER_PX;
                let x = self.left + indent;
                let width = (self.width - indent).max(1.0);
                let mut all = Vec::with_capacity(runs.len() + 1);
                all.push(TextRun::plain(prefix.as_str()));
                all.extend(runs.iter().cloned());
                let block = TextBlock::wrap(&all, width, BODY_FONT_PX, false);
                let h = block.height();
                block.place(x, self.y, width, Alignment::Left, &mut self.commands);
                self.y += h + LIST_GAP;
            }
            DocumentElement::Table(table) => self.table(table),
            DocumentElement::Image(image) => self.image(image),
        }
    }

    fn table(&mut self, table: &crate::ir::Table) {
        let columns = table.column_count().max(1);
        let col_w = self.width / columns as f32;
        let inner = (col_w - 2.0 * CELL_PAD).max(1.0);
        let top = self.y;

        for row in &table.rows {
            let blocks: Vec<TextBlock> = row
                .cells
                .iter()
                .map(|c| TextBlock::wrap(&c.runs, inner, BODY_FONT_PX, c.header))
                .collect();
            let row_h = blocks
                .iter()
                .map(TextBlock::height)
                .fold(BODY_FONT_PX * LINE_HEIGHT, f32::max)
                + 2.0 * CELL_PAD;

            for (i, (cell, block)) in row.cells.iter().zip(blocks).enumerate() {
                let x = self.left + i as f32 * col_w;
                if let Some(color) = cell.background.as_deref().and_then(hex_to_rgb) {
                    self.commands.push(DrawCommand::Fill {
                        rect: Rect {
                            x,
                            y: self.y,
                            w: col_w,
                            h: row_h,
                        },
                        color,
                    });
                }
                block.place(x + CELL_PAD, self.y + CELL_PAD, inner, cell.alignment, &mut self.commands);
            }
            self.grid_line(self.left, self.y, self.width, 1.0);
            self.y += row_h;
        }
        self.grid_line(self.left, self.y, self.width, 1.0);
        for i in 0..=columns {
            let x = (self.left + i as f32 * col_w).min(self.left + self.width - 1.0);
            self.grid_line(x, top, 1.0, self.y - top);
        }
        self.y += BLOCK_GAP * 1.5;
    }

    fn grid_line(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::Fill {
            rect: Rect { x, y, w, h },
            color: GRID_COLOR,
        });
    }

    fn image(&mut self, image: &ImageElement) {
        let mut w = image.width as f32;
        let mut h = image.height as f32;
        if w > self.width {
            h *= self.width / w;
            w = self.width;
        }
        let x = match image.alignment {
            Alignment::Center => self.left + (self.width - w) / 2.0,
            Alignment::Right => self.left + self.width - w,
            Alignment::Left | Alignment::Justify => self.left,
        };
        let index = self.images.len();
        self.images.push(Arc::new(image.data.clone()));
        self.commands.push(DrawCommand::Image {
            rect: Rect { x, y: self.y, w, h },
            index,
        });
        self.y += h + BLOCK_GAP;
    }
}

struct Painter<'a> {
    canvas: &'a mut RgbaImage,
    scale: f32,
}

impl Painter<'_> {
    fn draw(&mut self, command: &DrawCommand, decoded: &HashMap<usize, RgbaImage>) {
        match command {
            DrawCommand::Fill { rect, color } => self.fill(*rect, *color),
            DrawCommand::Word(placed) => self.word(placed),
            DrawCommand::Image { rect, index } => match decoded.get(index) {
                Some(img) => self.blit(*rect, img),
                None => {
                    self.fill(*rect, MISSING_IMAGE_COLOR);
                }
            },
        }
    }

    /// One box per glyph: capitals and digits tall, the rest x-height.
    fn word(&mut self, placed: &PlacedWord) {
        let word = &placed.word;
        let advance = word.advance;
        let mut x = placed.x;
        for c in word.text.chars() {
            let tall = c.is_uppercase() || c.is_ascii_digit();
            let h = if tall { word.font_px * 0.7 } else { word.font_px * 0.5 };
            if !c.is_whitespace() {
                self.fill(
                    Rect {
                        x,
                        y: placed.y - h,
                        w: advance * 0.8,
                        h,
                    },
                    word.color,
                );
            }
            x += advance;
        }
        if word.underline {
            self.fill(
                Rect {
                    x: placed.x,
                    y: placed.y + word.font_px * 0.1,
                    w: x - placed.x,
                    h: (word.font_px * 0.07).max(1.0),
                },
                word.color,
            );
        }
    }

    fn fill(&mut self, rect: Rect, color: [u8; 3]) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        let pixel = Rgba([color[0], color[1], color[2], 255]);
        for y in y0..y1 {
            for x in x0..x1 {
                self.canvas.put_pixel(x, y, pixel);
            }
        }
    }

    fn blit(&mut self, rect: Rect, img: &RgbaImage) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        let scaled = imageops::resize(img, x1 - x0, y1 - y0, FilterType::Triangle);
        imageops::overlay(self.canvas, &scaled, i64::from(x0), i64::from(y0));
    }

    /// Scale a rect to device pixels and clip it to the canvas.
    fn device_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let (cw, ch) = (self.canvas.width() as f32, self.canvas.height() as f32);
        let x0 = (rect.x * self.scale).floor().clamp(0.0, cw);
        let y0 = (rect.y * self.scale).floor().clamp(0.0, ch);
        let x1 = ((rect.x + rect.w) * self.scale).ceil().clamp(0.0, cw);
        let y1 = ((rect.y + rect.h) * self.scale).ceil().clamp(0.0, ch);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}
