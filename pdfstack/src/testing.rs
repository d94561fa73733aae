//! Helpers for unit tests: small PDFs built in memory.

use lopdf::{Document, Object, Stream, dictionary};

/// Build a document with `pages` US-letter pages and an optional title.
fn sample_document(pages: usize, title: Option<&str>) -> Document {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::with_capacity(pages);
    for number in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 700 Td (Page {number}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("pdfstack tests"),
        });
        doc.trailer.set("Info", info_id);
    }

    doc
}

/// Serialized form of [`sample_document`].
pub(crate) fn sample_pdf(pages: usize, title: Option<&str>) -> Vec<u8> {
    let mut doc = sample_document(pages, title);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory save cannot fail");
    bytes
}
