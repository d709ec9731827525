//! The styled element tree consumed by the layout engine.
//!
//! Elements live in a flat arena owned by [`Document`] and are addressed by
//! [`ElementId`]. Layout never creates or destroys elements; it only writes
//! geometry, scrollbar state and layout notifications back onto them.

use thiserror::Error;

mod document;
mod element;
mod spec;

pub use document::Document;
pub use element::{Element, ElementId, ElementLayout, TEXT_TAG};
pub use spec::{ElementSpec, NodeSpec, StyleSpec, StyleValue};

#[derive(Error, Debug)]
pub enum DomError {
    #[error("Element {0} does not exist in this document.")]
    UnknownElement(ElementId),
    #[error("Element id '{0}' is used more than once.")]
    DuplicateId(String),
    #[error("Style error: {0}")]
    Style(#[from] boxflow_style::StyleParseError),
    #[error("Document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
