//! Page geometry and pagination of a tall snapshot.
//!
//! The snapshot is scaled to the page width and laid across as many pages as
//! its height needs. Every page shows the whole image shifted up by one slice
//! per page, clipped to the printable area, so consecutive pages read like one
//! continuous sheet.

use crate::export::ExportError;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Physical page size and the vertical margin kept free on each page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Applied to the top and the bottom of every page.
    pub margin_mm: f64,
}

impl PageGeometry {
    /// ISO A4 portrait with a 1 mm margin, leaving 295 mm of image per page.
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_mm: 1.0,
    };

    /// Height of image shown on each page.
    pub fn slice_height_mm(&self) -> f64 {
        self.height_mm - 2.0 * self.margin_mm
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width_mm) || !positive(self.height_mm) {
            return Err(ExportError::InvalidGeometry(format!(
                "page size must be positive, got {}x{} mm",
                self.width_mm, self.height_mm
            )));
        }
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 || !positive(self.slice_height_mm())
        {
            return Err(ExportError::InvalidGeometry(format!(
                "margin {} mm leaves no printable height",
                self.margin_mm
            )));
        }
        Ok(())
    }

    /// Horizontal pixel count of a page-wide raster at `dpi`.
    pub fn width_px(&self, dpi: u32) -> u32 {
        (self.width_mm / MM_PER_INCH * f64::from(dpi)).round() as u32
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

pub(crate) fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Number of pages needed for an image `image_height` tall when each page
/// shows `page_height` of it: `ceil(image_height / page_height)`, at least 1.
pub fn page_count(image_height: f64, page_height: f64) -> Result<usize, ExportError> {
    if !page_height.is_finite() || page_height <= 0.0 {
        return Err(ExportError::InvalidGeometry(format!(
            "page height must be positive, got {page_height}"
        )));
    }
    if !image_height.is_finite() {
        return Err(ExportError::InvalidGeometry(format!(
            "image height must be finite, got {image_height}"
        )));
    }
    if image_height <= page_height {
        return Ok(1);
    }
    Ok((image_height / page_height).ceil() as usize)
}

/// Where the image sits on one page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PagePlacement {
    /// Zero-based page number.
    pub index: usize,
    /// Distance from the top edge of the page to the top edge of the image.
    /// Negative once the image has scrolled past the top.
    pub image_top_mm: f64,
}

/// Result of laying a snapshot across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub geometry: PageGeometry,
    pub image_width_mm: f64,
    pub image_height_mm: f64,
    pub pages: Vec<PagePlacement>,
}

impl Pagination {
    /// Lay out an image of `width_px` × `height_px` scaled to the page width.
    pub fn plan(
        geometry: PageGeometry,
        width_px: u32,
        height_px: u32,
    ) -> Result<Pagination, ExportError> {
        geometry.validate()?;
        if width_px == 0 || height_px == 0 {
            return Err(ExportError::InvalidGeometry(format!(
                "image has no area ({width_px}x{height_px} px)"
            )));
        }

        let image_width_mm = geometry.width_mm;
        let image_height_mm = f64::from(height_px) * image_width_mm / f64::from(width_px);
        let slice = geometry.slice_height_mm();
        let count = page_count(image_height_mm, slice)?;

        let pages = (0..count)
            .map(|index| PagePlacement {
                index,
                image_top_mm: geometry.margin_mm - index as f64 * slice,
            })
            .collect();

        Ok(Pagination {
            geometry,
            image_width_mm,
            image_height_mm,
            pages,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
