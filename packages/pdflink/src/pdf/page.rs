//! Page boxes and the page content-to-device transform

use crate::fitz::error::Result;
use crate::fitz::geometry::{Matrix, Rect};
use crate::pdf::object::{NULL, Object};
use crate::pdf::store::ObjectStore;
use tracing::warn;

/// Parent links followed when looking up inheritable attributes
const MAX_PARENT_DEPTH: usize = 32;

/// US Letter, used when a page has no usable MediaBox
const LETTER: Rect = Rect {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// Look up an inheritable page attribute, walking up the `Parent` chain.
pub fn inheritable<'a, S: ObjectStore + ?Sized>(
    store: &'a S,
    page: &'a Object,
    key: &str,
) -> Result<&'a Object> {
    let mut node = store.resolve(page)?;
    for _ in 0..MAX_PARENT_DEPTH {
        let value = store.dict_get(node, key)?;
        if !value.is_null() {
            return Ok(value);
        }
        node = store.dict_get(node, "Parent")?;
        if node.is_null() {
            return Ok(&NULL);
        }
    }
    warn!(key, "page tree too deep looking up inherited attribute");
    Ok(&NULL)
}

/// The page's MediaBox, defaulting to US Letter.
pub fn media_box<S: ObjectStore + ?Sized>(store: &S, page: &Object) -> Result<Rect> {
    let mediabox = store.to_rect(inheritable(store, page, "MediaBox")?)?;
    if mediabox.is_empty() {
        return Ok(LETTER);
    }
    Ok(mediabox)
}

/// The visible region: the MediaBox clipped to the CropBox if there is one.
pub fn crop_box<S: ObjectStore + ?Sized>(store: &S, page: &Object) -> Result<Rect> {
    let mediabox = media_box(store, page)?;
    let cropbox = store.to_rect(inheritable(store, page, "CropBox")?)?;
    let visible = if cropbox.is_empty() {
        mediabox
    } else {
        mediabox.intersect(&cropbox)
    };
    if visible.width() < 1.0 || visible.height() < 1.0 {
        return Ok(Rect::new(0.0, 0.0, 1.0, 1.0));
    }
    Ok(visible)
}

/// The page rotation normalized to 0, 90, 180 or 270.
///
/// Values that are not multiples of 90 snap to the nearest quarter turn.
pub fn rotation<S: ObjectStore + ?Sized>(store: &S, page: &Object) -> Result<i32> {
    let rotate = inheritable(store, page, "Rotate")?;
    let rotate = match rotate {
        Object::Int(i) => *i,
        Object::Real(r) => *r as i64,
        _ => 0,
    };
    Ok(normalize_rotation(rotate))
}

fn normalize_rotation(rotate: i64) -> i32 {
    let r = 90 * ((rotate.rem_euclid(360) + 45) / 90);
    if r >= 360 { 0 } else { r as i32 }
}

/// The page's UserUnit (points per default user space unit), 1 if unset.
pub fn user_unit<S: ObjectStore + ?Sized>(store: &S, page: &Object) -> Result<f32> {
    let unit = store.dict_get(page, "UserUnit")?.as_real().unwrap_or(1.0) as f32;
    Ok(if unit > 0.0 { unit } else { 1.0 })
}

/// Transform from page space to device space.
///
/// Device space has its origin at the top left of the visible region with
/// y growing downwards; rotation and UserUnit are applied.
pub fn page_transform<S: ObjectStore + ?Sized>(store: &S, page: &Object) -> Result<Matrix> {
    let visible = crop_box(store, page)?;
    let rotate = rotation(store, page)?;
    let unit = user_unit(store, page)?;

    let ctm = Matrix::rotate(-(rotate as f32)).concat(&Matrix::scale(unit, -unit));
    let realbox = visible.transform(&ctm);
    Ok(ctm.concat(&Matrix::translate(-realbox.x0, -realbox.y0)))
}
