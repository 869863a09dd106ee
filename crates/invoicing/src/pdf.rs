//! PDF assembly.
//!
//! The snapshot is embedded once as an image XObject and drawn on every page
//! at that page's offset, clipped to the printable band. No creation dates or
//! random document ids are written, so the same snapshot always produces the
//! same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::export::ExportError;
use crate::layout::{Pagination, mm_to_pt};
use crate::raster::Snapshot;

const IMAGE_NAME: &str = "Im0";

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn assembly_error(err: lopdf::Error) -> ExportError {
    ExportError::Assembly(err.to_string())
}

/// Drawing operations for one page.
fn page_operations(pagination: &Pagination, image_top_mm: f64) -> Vec<Operation> {
    let geometry = pagination.geometry;
    let page_h = mm_to_pt(geometry.height_mm);
    let page_w = mm_to_pt(geometry.width_mm);
    let margin = mm_to_pt(geometry.margin_mm);
    let img_w = mm_to_pt(pagination.image_width_mm);
    let img_h = mm_to_pt(pagination.image_height_mm);

    // PDF space grows upwards from the bottom-left corner.
    let img_bottom = page_h - mm_to_pt(image_top_mm) - img_h;

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "re",
            vec![real(0.0), real(margin), real(page_w), real(page_h - 2.0 * margin)],
        ),
        Operation::new("W", vec![]),
        Operation::new("n", vec![]),
        Operation::new(
            "cm",
            vec![real(img_w), real(0.0), real(0.0), real(img_h), real(0.0), real(img_bottom)],
        ),
        Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Build the PDF bytes for a paginated snapshot.
pub fn assemble(
    snapshot: &Snapshot,
    pagination: &Pagination,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    if pagination.pages.is_empty() {
        return Err(ExportError::Assembly("no pages to write".to_string()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(snapshot.width_px())),
            "Height" => Object::Integer(i64::from(snapshot.height_px())),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        },
        snapshot.image.as_raw().clone(),
    );
    // Flate is deterministic; an uncompressed stream is still valid if it fails.
    let _ = image.compress();
    let image_id = doc.add_object(image);

    let geometry = pagination.geometry;
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        real(mm_to_pt(geometry.width_mm)),
        real(mm_to_pt(geometry.height_mm)),
    ];

    let mut kids = Vec::with_capacity(pagination.pages.len());
    for placement in &pagination.pages {
        let content = Content {
            operations: page_operations(pagination, placement.image_top_mm),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(assembly_error)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal("excursio-invoicing"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Assembly(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageGeometry;
    use image::{Rgb, RgbImage};

    fn snapshot(width: u32, height: u32) -> Snapshot {
        Snapshot {
            image: RgbImage::from_pixel(width, height, Rgb([200, 10, 10])),
            dpi: 150,
        }
    }

    #[test]
    fn one_pdf_page_per_planned_page() {
        let snap = snapshot(100, 450);
        let plan = Pagination::plan(PageGeometry::A4, 100, 450).unwrap();
        assert_eq!(plan.page_count(), 4);

        let bytes = assemble(&snap, &plan, "invoice").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn same_input_same_bytes() {
        let snap = snapshot(120, 80);
        let plan = Pagination::plan(PageGeometry::A4, 120, 80).unwrap();
        let a = assemble(&snap, &plan, "invoice").unwrap();
        let b = assemble(&snap, &plan, "invoice").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn later_pages_shift_the_image_up() {
        let plan = Pagination::plan(PageGeometry::A4, 100, 450).unwrap();
        let bottom = |page: usize| -> f32 {
            let ops = page_operations(&plan, plan.pages[page].image_top_mm);
            let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
            cm.operands[5].as_float().unwrap()
        };
        let slice_pt = mm_to_pt(PageGeometry::A4.slice_height_mm()) as f32;
        assert!((bottom(1) - bottom(0) - slice_pt).abs() < 0.01);
        assert!((bottom(2) - bottom(1) - slice_pt).abs() < 0.01);
    }
}
