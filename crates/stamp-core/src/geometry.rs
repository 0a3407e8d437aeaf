//! Stamp placement in PDF space
//!
//! Positions arrive in top-left screen coordinates (y grows downward) and
//! are converted to the bottom-left origin PDF uses.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page size in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
        }
    }

    pub fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
        }
    }
}

/// Final draw rectangle, bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolve a requested 1-based page against `page_count` pages.
///
/// Anything outside `1..=page_count` lands on the last page. Returns `None`
/// only when there are no pages at all.
pub fn resolve_page(requested: i64, page_count: usize) -> Option<usize> {
    if page_count == 0 {
        return None;
    }
    if requested >= 1 && (requested as u64) <= page_count as u64 {
        Some(requested as usize)
    } else {
        Some(page_count)
    }
}

/// Stamp height preserving the source image's aspect ratio
pub fn stamp_height(stamp_width: f64, image_width: u32, image_height: u32) -> f64 {
    stamp_width * (image_height as f64 / image_width as f64)
}

/// Compute where the stamp is drawn.
///
/// Horizontally the stamp is pulled back inside the right edge; there is no
/// vertical clamp.
pub fn placement(
    page: PageSize,
    x: f64,
    y: f64,
    stamp_width: f64,
    stamp_height: f64,
) -> Placement {
    Placement {
        x: x.min(page.width - stamp_width),
        y: page.height - y - stamp_height,
        width: stamp_width,
        height: stamp_height,
    }
}

/// Read the page size from its MediaBox, walking up the page tree when the
/// box is inherited. Pages without any MediaBox are treated as US Letter.
pub fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(Object::as_dict) else {
            break;
        };
        if let Some(size) = media_box_size(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    PageSize::letter()
}

fn media_box_size(doc: &Document, dict: &Dictionary) -> Option<PageSize> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = number(&arr[0])?;
    let lly = number(&arr[1])?;
    let urx = number(&arr[2])?;
    let ury = number(&arr[3])?;
    Some(PageSize {
        width: (urx - llx).abs(),
        height: (ury - lly).abs(),
    })
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_page_in_range() {
        assert_eq!(resolve_page(1, 5), Some(1));
        assert_eq!(resolve_page(5, 5), Some(5));
    }

    #[test]
    fn test_resolve_page_past_end_uses_last() {
        assert_eq!(resolve_page(99, 5), Some(5));
    }

    #[test]
    fn test_resolve_page_zero_and_negative_use_last() {
        assert_eq!(resolve_page(0, 3), Some(3));
        assert_eq!(resolve_page(-4, 3), Some(3));
    }

    #[test]
    fn test_resolve_page_empty_document() {
        assert_eq!(resolve_page(1, 0), None);
    }

    #[test]
    fn test_placement_flips_y() {
        let p = placement(PageSize::letter(), 100.0, 100.0, 100.0, 50.0);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 792.0 - 100.0 - 50.0);
        assert_eq!(p.width, 100.0);
        assert_eq!(p.height, 50.0);
    }

    #[test]
    fn test_placement_clamps_right_edge_only() {
        let p = placement(PageSize::letter(), 600.0, 900.0, 100.0, 50.0);
        assert_eq!(p.x, 512.0);
        // Below the bottom edge stays below it
        assert!(p.y < 0.0);
    }

    #[test]
    fn test_page_size_inherited_from_parent() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        assert_eq!(page_size(&doc, page_id), PageSize::a4());
    }

    #[test]
    fn test_page_size_missing_media_box_is_letter() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(page_size(&doc, page_id), PageSize::letter());
    }

    #[test]
    fn test_page_size_with_offset_origin() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![10.into(), 20.into(), Object::Real(622.0), 812.into()],
        });
        assert_eq!(page_size(&doc, page_id), PageSize::letter());
    }

    proptest! {
        #[test]
        fn prop_out_of_range_pages_resolve_to_last(
            count in 1usize..500,
            over in 1i64..10_000,
            under in 0i64..10_000,
        ) {
            prop_assert_eq!(resolve_page(count as i64 + over, count), Some(count));
            prop_assert_eq!(resolve_page(-under, count), Some(count));
        }

        #[test]
        fn prop_in_range_pages_resolve_to_themselves(count in 1usize..500, pick in 0usize..500) {
            let page = pick % count + 1;
            prop_assert_eq!(resolve_page(page as i64, count), Some(page));
        }

        #[test]
        fn prop_stamp_height_keeps_ratio(
            size in 1.0f64..1000.0,
            w in 1u32..4000,
            h in 1u32..4000,
        ) {
            let expected = size * (h as f64 / w as f64);
            prop_assert_eq!(stamp_height(size, w, h), expected);
        }

        #[test]
        fn prop_overflowing_x_clamped_exactly(
            width in 100.0f64..2000.0,
            size in 1.0f64..99.0,
            excess in 0.001f64..500.0,
        ) {
            let page = PageSize { width, height: 792.0 };
            let x = width - size + excess;
            prop_assert_eq!(placement(page, x, 0.0, size, 10.0).x, width - size);
        }

        #[test]
        fn prop_fitting_x_unchanged(
            width in 100.0f64..2000.0,
            size in 1.0f64..99.0,
            frac in 0.0f64..=1.0,
        ) {
            let page = PageSize { width, height: 792.0 };
            let x = (width - size) * frac;
            prop_assert_eq!(placement(page, x, 0.0, size, 10.0).x, x);
        }

        #[test]
        fn prop_y_converts_to_bottom_left(
            height in 100.0f64..2000.0,
            y in -100.0f64..2000.0,
            stamp_h in 1.0f64..300.0,
        ) {
            let page = PageSize { width: 612.0, height };
            prop_assert_eq!(placement(page, 0.0, y, 50.0, stamp_h).y, height - y - stamp_h);
        }
    }
}
