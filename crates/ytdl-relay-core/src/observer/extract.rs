//! Video id extraction from a clicked entry.

use crate::dom::{Element, SelectorError};
use crate::video_ref::{is_valid_video_id, VideoReference};

use super::shape::{CompiledShape, EntryShape};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("could not find a video in this {shape} entry")]
    NotFound { shape: EntryShape },
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Finds the canonical reference for the entry `el` of the given shape.
///
/// Watch links on the element, below it, then above it are tried first;
/// their `v` parameter is taken through URL parsing. Then the shape's id
/// attributes in the same order, then the element's own `id`.
pub fn extract_video_reference(
    el: &Element,
    shape: EntryShape,
) -> Result<VideoReference, ExtractionError> {
    let compiled = CompiledShape::compile(shape.descriptor())?;
    extract_with(el, &compiled)
}

pub(crate) fn extract_with(
    el: &Element,
    shape: &CompiledShape,
) -> Result<VideoReference, ExtractionError> {
    let from_link = around(el, |e| e.matches(&shape.link))
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .find_map(|href| VideoReference::from_watch_href(&href));
    if let Some(video) = from_link {
        return Ok(video);
    }

    for attr in shape.id_attributes {
        let from_attr = around(el, |e| e.attr(attr).is_some())
            .into_iter()
            .filter_map(|e| e.attr(attr))
            .find_map(|id| VideoReference::from_id(id.trim()));
        if let Some(video) = from_attr {
            return Ok(video);
        }
    }

    if let Some(video) = el
        .id()
        .filter(|id| is_valid_video_id(id))
        .and_then(|id| VideoReference::from_id(&id))
    {
        return Ok(video);
    }

    tracing::debug!(shape = %shape.shape, tag = el.tag(), "no video id found");
    Err(ExtractionError::NotFound { shape: shape.shape })
}

/// `el` itself, then its descendants, then its ancestors, filtered.
fn around(el: &Element, pred: impl Fn(&Element) -> bool) -> Vec<Element> {
    std::iter::once(el.clone())
        .chain(el.descendants())
        .chain(el.ancestors())
        .filter(|e| pred(e))
        .collect()
}
