//! Draw a signature image onto a PDF page
//!
//! The page's existing content is wrapped in `q`/`Q` so the stamp always
//! starts from the default graphics state, then an image XObject is painted
//! through an ExtGState that carries the requested opacity.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::EmbedError;
use crate::geometry::{page_size, placement, resolve_page, stamp_height, Placement};
use crate::model::{Position, SignatureConfig};
use crate::signature::SignatureImage;

/// Stamp the configured signature onto one PDF and return the new bytes.
pub fn sign_pdf(
    pdf_bytes: &[u8],
    config: &SignatureConfig,
    position: Position,
) -> Result<Vec<u8>, EmbedError> {
    let uri = config.image().ok_or(EmbedError::NoSignature)?;
    let image = SignatureImage::from_data_uri(uri)?;
    stamp_pdf(pdf_bytes, &image, config.size(), config.opacity(), position)
}

/// Stamp an already decoded image onto one PDF and return the new bytes.
pub fn stamp_pdf(
    pdf_bytes: &[u8],
    image: &SignatureImage,
    size: f64,
    opacity: f64,
    position: Position,
) -> Result<Vec<u8>, EmbedError> {
    let mut doc = Document::load_mem(pdf_bytes).map_err(|e| EmbedError::Parse(e.to_string()))?;

    stamp_document(&mut doc, image, size, opacity, position)?;

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| EmbedError::Write(e.to_string()))?;
    Ok(output)
}

/// Stamp a parsed document in place. Returns where the image was drawn.
pub fn stamp_document(
    doc: &mut Document,
    image: &SignatureImage,
    size: f64,
    opacity: f64,
    position: Position,
) -> Result<Placement, EmbedError> {
    let pages = doc.get_pages();
    let page_num = resolve_page(position.page, pages.len()).ok_or(EmbedError::PageNotFound)?;
    let page_id = *pages
        .get(&(page_num as u32))
        .ok_or(EmbedError::PageNotFound)?;

    let page = page_size(doc, page_id);
    let height = stamp_height(size, image.width(), image.height());
    let rect = placement(page, position.x, position.y, size, height);

    let image_id = add_image_xobject(doc, image)?;
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(opacity as f32),
        "CA" => Object::Real(opacity as f32),
    });

    let mut resources = inherited_resources(doc, page_id)?;
    let image_name = register_resource(doc, &mut resources, "XObject", "Stamp", image_id);
    let gs_name = register_resource(doc, &mut resources, "ExtGState", "StampGs", gs_id);

    let draw = format!(
        "q\n/{} gs\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        gs_name,
        fmt_num(rect.width),
        fmt_num(rect.height),
        fmt_num(rect.x),
        fmt_num(rect.y),
        image_name
    );

    let mut contents = existing_contents(doc, page_id)?;
    if contents.is_empty() {
        let draw_id = doc.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));
        contents.push(Object::Reference(draw_id));
    } else {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let draw_id = doc.add_object(Stream::new(
            Dictionary::new(),
            format!("Q\n{}", draw).into_bytes(),
        ));
        contents.insert(0, Object::Reference(save_id));
        contents.push(Object::Reference(draw_id));
    }

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| EmbedError::Parse(e.to_string()))?;
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Array(contents));

    Ok(rect)
}

fn add_image_xobject(doc: &mut Document, image: &SignatureImage) -> Result<ObjectId, EmbedError> {
    let width = image.width() as i64;
    let height = image.height() as i64;
    let color_space = if image.is_grayscale() {
        "DeviceGray"
    } else {
        "DeviceRGB"
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if let Some(alpha) = image.alpha_samples() {
        let smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        );
        let smask_id = doc.add_object(smask);
        dict.set("SMask", Object::Reference(smask_id));
    }

    let stream = Stream::new(dict, deflate(&image.color_samples())?);
    Ok(doc.add_object(stream))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, EmbedError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| EmbedError::Write(e.to_string()))?;
    encoder.finish().map_err(|e| EmbedError::Write(e.to_string()))
}

/// Resources the page actually uses, copied so they can be extended without
/// touching dictionaries shared with other pages.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, EmbedError> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict = doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| EmbedError::Parse(e.to_string()))?;
        if let Ok(resources) = dict.get(b"Resources") {
            return Ok(owned_dict(doc, resources).unwrap_or_else(Dictionary::new));
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(Dictionary::new())
}

fn owned_dict(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok().cloned(),
        _ => None,
    }
}

/// Add `target` under a fresh name in the `category` sub-dictionary
fn register_resource(
    doc: &Document,
    resources: &mut Dictionary,
    category: &str,
    prefix: &str,
    target: ObjectId,
) -> String {
    let mut entries = resources
        .get(category.as_bytes())
        .ok()
        .and_then(|obj| owned_dict(doc, obj))
        .unwrap_or_else(Dictionary::new);
    let name = unique_name(&entries, prefix);
    entries.set(name.as_bytes().to_vec(), Object::Reference(target));
    resources.set(category.as_bytes().to_vec(), Object::Dictionary(entries));
    name
}

fn unique_name(dict: &Dictionary, prefix: &str) -> String {
    let mut n = 1u32;
    loop {
        let candidate = format!("{}{}", prefix, n);
        if !dict.has(candidate.as_bytes()) {
            return candidate;
        }
        n += 1;
    }
}

fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, EmbedError> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| EmbedError::Parse(e.to_string()))?;
    let contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(contents)
}

/// Content-stream number: fixed precision, trailing zeros trimmed
fn fmt_num(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
pub(crate) mod test_pdfs {
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with `pages` Letter-sized pages, each with a small content stream
    pub fn create_test_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for i in 0..pages {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                format!("1 0 0 1 {} 0 cm\n", i).into_bytes(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! {},
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
