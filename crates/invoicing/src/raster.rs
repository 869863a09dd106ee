//! Rasterization of an invoice view into a fixed-DPI RGB image.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::layout::PageGeometry;
use crate::view::{InvoiceView, LineStyle};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([33, 37, 41]);
const ACCENT: Rgb<u8> = Rgb([25, 118, 210]);
const RULE: Rgb<u8> = Rgb([173, 181, 189]);

/// Source glyphs are 8×8 cells.
const GLYPH_CELL: u32 = 8;
/// Body text size in points.
const BODY_PT: f64 = 11.0;
/// Side and top/bottom padding around the content, in mm.
const PADDING_MM: f64 = 18.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("unsupported content: no glyph for {ch:?} on line {line}")]
    UnsupportedContent { ch: char, line: usize },
    #[error("invoice view has no content")]
    EmptyView,
    #[error("snapshot would be {height_px} px tall (limit {limit_px} px)")]
    TooLarge { height_px: u64, limit_px: u32 },
    #[error("unsupported raster resolution: {0} dpi")]
    InvalidResolution(u32),
}

/// A raster image of the invoice view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub image: RgbImage,
    pub dpi: u32,
}

impl Snapshot {
    pub fn width_px(&self) -> u32 {
        self.image.width()
    }

    pub fn height_px(&self) -> u32 {
        self.image.height()
    }
}

/// Turns an invoice view into a snapshot image.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, view: &InvoiceView) -> Result<Snapshot, RasterError>;
}

/// Renders the view with a built-in 8×8 bitmap font, integer-scaled to the DPI.
///
/// Output depends only on the view and the settings, so re-rendering a view
/// gives an identical image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapRasterizer {
    dpi: u32,
    geometry: PageGeometry,
    max_height_px: u32,
}

impl BitmapRasterizer {
    pub const DEFAULT_DPI: u32 = 150;
    pub const DEFAULT_MAX_HEIGHT_PX: u32 = 30_000;

    pub fn new(dpi: u32) -> Result<Self, RasterError> {
        if !(72..=600).contains(&dpi) {
            return Err(RasterError::InvalidResolution(dpi));
        }
        Ok(Self {
            dpi,
            geometry: PageGeometry::A4,
            max_height_px: Self::DEFAULT_MAX_HEIGHT_PX,
        })
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_max_height_px(mut self, max_height_px: u32) -> Self {
        self.max_height_px = max_height_px;
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    fn mm_to_px(&self, mm: f64) -> u32 {
        (mm / 25.4 * f64::from(self.dpi)).round() as u32
    }

    /// Integer glyph scale for body text.
    fn body_scale(&self) -> u32 {
        let px = f64::from(self.dpi) * BODY_PT / 72.0;
        ((px / f64::from(GLYPH_CELL)).round() as u32).max(1)
    }

    fn scale_for(&self, style: LineStyle) -> u32 {
        match style {
            LineStyle::Title => self.body_scale() * 2,
            _ => self.body_scale(),
        }
    }
}

impl Default for BitmapRasterizer {
    fn default() -> Self {
        Self {
            dpi: Self::DEFAULT_DPI,
            geometry: PageGeometry::A4,
            max_height_px: Self::DEFAULT_MAX_HEIGHT_PX,
        }
    }
}

fn glyph(ch: char) -> Option<[u8; 8]> {
    if ch.is_control() {
        return None;
    }
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))
}

/// Greedy word wrap to `columns` characters; words longer than a line are split.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > columns {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// One laid-out row of the snapshot.
struct Row {
    style: LineStyle,
    text: String,
    top: u32,
    height: u32,
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(w).min(image.width());
    let y_end = y.saturating_add(h).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}

/// Pen settings for one run of text.
#[derive(Clone, Copy)]
struct Pen {
    scale: u32,
    bold: bool,
    color: Rgb<u8>,
}

fn draw_text(image: &mut RgbImage, text: &str, x: u32, y: u32, pen: Pen) {
    let Pen { scale, bold, color } = pen;
    let advance = GLYPH_CELL * scale;
    let mut pen_x = x;
    for ch in text.chars() {
        // Every character was checked during layout.
        let Some(bitmap) = glyph(ch) else {
            pen_x += advance;
            continue;
        };
        for (row, bits) in bitmap.iter().enumerate() {
            for col in 0..GLYPH_CELL {
                if bits & (1 << col) != 0 {
                    let w = if bold { scale + scale.div_ceil(2) } else { scale };
                    fill_rect(
                        image,
                        pen_x + col * scale,
                        y + row as u32 * scale,
                        w,
                        scale,
                        color,
                    );
                }
            }
        }
        pen_x += advance;
    }
}

impl Rasterizer for BitmapRasterizer {
    fn rasterize(&self, view: &InvoiceView) -> Result<Snapshot, RasterError> {
        if view.lines().is_empty() {
            return Err(RasterError::EmptyView);
        }

        // Whitespace is consumed by `wrap`, so only the rest needs a glyph.
        for (index, line) in view.lines().iter().enumerate() {
            let mut chars = line.text.chars();
            if let Some(ch) = chars.find(|c| !c.is_whitespace() && glyph(*c).is_none()) {
                return Err(RasterError::UnsupportedContent {
                    ch,
                    line: index + 1,
                });
            }
        }

        let width = self.geometry.width_px(self.dpi);
        let padding = self.mm_to_px(PADDING_MM);
        let usable = width.saturating_sub(2 * padding).max(GLYPH_CELL);
        let body_line = GLYPH_CELL * self.body_scale() * 3 / 2;

        let mut rows = Vec::new();
        let mut cursor = u64::from(padding);
        for line in view.lines() {
            let scale = self.scale_for(line.style);
            let line_height = GLYPH_CELL * scale * 3 / 2;
            match line.style {
                LineStyle::Rule | LineStyle::Blank => {
                    rows.push(Row {
                        style: line.style,
                        text: String::new(),
                        top: cursor.min(u64::from(u32::MAX)) as u32,
                        height: body_line,
                    });
                    cursor += u64::from(body_line);
                }
                style => {
                    let columns = (usable / (GLYPH_CELL * scale)) as usize;
                    if style == LineStyle::Heading || style == LineStyle::Title {
                        cursor += u64::from(body_line / 2);
                    }
                    for text in wrap(&line.text, columns) {
                        rows.push(Row {
                            style,
                            text,
                            top: cursor.min(u64::from(u32::MAX)) as u32,
                            height: line_height,
                        });
                        cursor += u64::from(line_height);
                    }
                }
            }
        }
        let height = cursor + u64::from(padding);
        if height > u64::from(self.max_height_px) {
            return Err(RasterError::TooLarge {
                height_px: height,
                limit_px: self.max_height_px,
            });
        }
        let height = height as u32;

        let mut image = RgbImage::from_pixel(width, height, WHITE);
        for row in &rows {
            let scale = self.scale_for(row.style);
            let baseline_pad = (row.height - GLYPH_CELL * scale) / 2;
            let y = row.top + baseline_pad;
            let pen = |bold, color| Pen { scale, bold, color };
            match row.style {
                LineStyle::Blank => {}
                LineStyle::Rule => {
                    let thickness = (self.dpi / 100).max(1);
                    let y = row.top + row.height / 2;
                    fill_rect(&mut image, padding, y, usable, thickness, RULE);
                }
                LineStyle::Title => draw_text(&mut image, &row.text, padding, y, pen(true, ACCENT)),
                LineStyle::Heading | LineStyle::Total => {
                    draw_text(&mut image, &row.text, padding, y, pen(true, INK))
                }
                LineStyle::Body => draw_text(&mut image, &row.text, padding, y, pen(false, INK)),
            }
        }

        debug!(
            booking_id = %view.booking_id(),
            width_px = width,
            height_px = height,
            dpi = self.dpi,
            "rasterized invoice view"
        );

        Ok(Snapshot {
            image,
            dpi: self.dpi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    #[test]
    fn snapshot_is_page_wide_at_fixed_dpi() {
        let view = InvoiceView::from_record(&record());
        let snapshot = BitmapRasterizer::default().rasterize(&view).unwrap();
        assert_eq!(snapshot.dpi, 150);
        assert_eq!(snapshot.width_px(), 1240);
        assert!(snapshot.height_px() > 0);
        // Something other than background was drawn.
        assert!(snapshot.image.pixels().any(|p| *p != WHITE));
    }

    #[test]
    fn rasterizing_twice_gives_identical_pixels() {
        let view = InvoiceView::from_record(&record());
        let rasterizer = BitmapRasterizer::default();
        assert_eq!(rasterizer.rasterize(&view).unwrap(), rasterizer.rasterize(&view).unwrap());
    }

    #[test]
    fn accented_latin_names_are_supported() {
        let mut r = record();
        r.customer_name = "Zoé Müller".to_string();
        let view = InvoiceView::from_record(&r);
        assert!(BitmapRasterizer::default().rasterize(&view).is_ok());
    }

    #[test]
    fn every_printable_character_has_a_glyph() {
        let printable = (' '..='\u{FF}').filter(|c| excursio_core::text::is_printable(*c));
        for ch in printable {
            assert!(glyph(ch).is_some(), "no glyph for {ch:?}");
        }
    }

    #[test]
    fn longest_accepted_request_fits_the_height_limit() {
        let mut r = record();
        r.customer_name = "N".repeat(200);
        r.special_requests = Some("word ".repeat(200));
        let view = InvoiceView::from_record(&r);
        for dpi in [72, 150, 300, 600] {
            let rasterizer = BitmapRasterizer::new(dpi).unwrap();
            assert!(rasterizer.rasterize(&view).is_ok(), "{dpi} dpi");
        }
    }

    #[test]
    fn characters_without_glyphs_are_unsupported_content() {
        let mut r = record();
        r.special_requests = Some("Window seat \u{1F6A3}".to_string());
        let view = InvoiceView::from_record(&r);
        let err = BitmapRasterizer::default().rasterize(&view).unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedContent { ch: '\u{1F6A3}', .. }));
    }

    #[test]
    fn long_text_wraps_into_a_taller_snapshot() {
        let short = InvoiceView::from_record(&record());
        let mut r = record();
        r.special_requests = Some("please bring extra life jackets ".repeat(40));
        let long = InvoiceView::from_record(&r);

        let rasterizer = BitmapRasterizer::default();
        let short_h = rasterizer.rasterize(&short).unwrap().height_px();
        let long_h = rasterizer.rasterize(&long).unwrap().height_px();
        assert!(long_h > short_h);
    }

    #[test]
    fn height_limit_is_enforced() {
        let view = InvoiceView::from_record(&record());
        let rasterizer = BitmapRasterizer::default().with_max_height_px(100);
        assert!(matches!(rasterizer.rasterize(&view), Err(RasterError::TooLarge { .. })));
    }

    #[test]
    fn resolution_bounds() {
        assert!(BitmapRasterizer::new(150).is_ok());
        assert_eq!(BitmapRasterizer::new(10).unwrap_err(), RasterError::InvalidResolution(10));
    }

    #[test]
    fn wrap_respects_columns_and_splits_long_words() {
        assert_eq!(wrap("a bb ccc", 4), vec!["a bb", "ccc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
