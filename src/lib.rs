//! Box layout for styled element trees.
//!
//! This crate re-exports the workspace crates and adds a small convenience
//! layer for laying out documents described in JSON:
//!
//! ```no_run
//! use boxflow::{LayoutEngine, Size};
//!
//! let json = r#"{ "tag": "body", "children": [ { "tag": "p", "children": ["Hello"] } ] }"#;
//! let laid_out = boxflow::layout_json(&LayoutEngine::default(), json, Size::new(320.0, 240.0))?;
//! for line in laid_out.geometry() {
//!     println!("{}", line);
//! }
//! # Ok::<(), boxflow::BoxflowError>(())
//! ```

pub use boxflow_dom as dom;
pub use boxflow_layout as layout;
pub use boxflow_style as style;
pub use boxflow_types as types;

pub use boxflow_dom::{Document, DomError, ElementId, ElementSpec};
pub use boxflow_layout::{
    CloseResult, FixedAdvance, GridTableFormatter, LayoutConfig, LayoutEngine, LayoutError, LayoutOutput,
    PassStats, TableFormatter, TextMeasure,
};
pub use boxflow_style::{ComputedValues, StyleParseError};
pub use boxflow_types::{BoxArea, BoxModel, Rect, Size, Vec2};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoxflowError {
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A document after a successful layout pass over its root.
pub struct LaidOutDocument {
    pub document: Document,
    pub root: ElementId,
    pub output: LayoutOutput,
}

/// One element's resolved border box in layout coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementGeometry {
    pub depth: usize,
    pub address: String,
    pub border_box: Rect,
    pub scrollbar: Option<f32>,
}

impl fmt::Display for ElementGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.border_box;
        write!(
            f,
            "{:indent$}{} [{:.2}, {:.2}, {:.2} x {:.2}]",
            "",
            self.address,
            r.x,
            r.y,
            r.width,
            r.height,
            indent = self.depth * 2
        )?;
        if let Some(width) = self.scrollbar {
            write!(f, " scrollbar {:.2}", width)?;
        }
        Ok(())
    }
}

impl LaidOutDocument {
    /// Geometry of every laid-out element under the root, depth first.
    pub fn geometry(&self) -> Vec<ElementGeometry> {
        let mut out = Vec::new();
        self.collect(self.root, 0, &mut out);
        out
    }

    fn collect(&self, element: ElementId, depth: usize, out: &mut Vec<ElementGeometry>) {
        let Ok(node) = self.document.get(element) else {
            return;
        };
        if let (Some(layout), Some(origin)) = (node.layout(), self.document.absolute_position(element)) {
            out.push(ElementGeometry {
                depth,
                address: self.document.address(element),
                border_box: Rect::from_origin_size(origin, layout.box_model.size(BoxArea::Border)),
                scrollbar: node.vertical_scrollbar(),
            });
        }
        for &child in node.children() {
            self.collect(child, depth + 1, out);
        }
    }
}

/// Builds a document from its JSON description and lays out its root
/// inside `viewport`.
pub fn layout_json(engine: &LayoutEngine, json: &str, viewport: Size) -> Result<LaidOutDocument, BoxflowError> {
    let (mut document, root) = Document::from_json(json)?;
    log::debug!("Built {} elements rooted at {}", document.len(), document.address(root));
    let output = engine.format_root(&mut document, root, viewport, None)?;
    Ok(LaidOutDocument {
        document,
        root,
        output,
    })
}
