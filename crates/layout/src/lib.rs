use boxflow_dom::{DomError, ElementId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout pool exhausted: a pass needed more than {capacity} live nodes.")]
    PoolExhausted { capacity: usize },
    #[error("Stale layout node handle {0:?}.")]
    StaleNode(NodeId),
    #[error("Node mismatch: Expected {0} node, got {1}.")]
    NodeMismatch(&'static str, &'static str),
    #[error("Containing block of {0:.2}x{1:.2} must be finite and non-negative.")]
    InvalidContainingBlock(f32, f32),
    #[error("Element {0} does not exist in this document.")]
    UnknownElement(ElementId),
    #[error("Document error: {0}")]
    Dom(DomError),
}

impl From<DomError> for LayoutError {
    fn from(err: DomError) -> Self {
        match err {
            DomError::UnknownElement(id) => LayoutError::UnknownElement(id),
            other => LayoutError::Dom(other),
        }
    }
}

pub mod config;
pub mod context;
pub mod details;
pub mod engine;
pub mod float;
pub mod inline;
pub mod node_kind;
pub mod pool;
pub mod stats;
pub mod table;
pub mod text;

pub use self::config::LayoutConfig;
pub use self::context::{BlockContext, CloseResult, ContextKind};
pub use self::details::BoxContext;
pub use self::engine::{LayoutEngine, LayoutOutput, LayoutPass};
pub use self::pool::{LayoutNode, LayoutPool, NodeId, PassArena};
pub use self::stats::PassStats;
pub use self::table::{GridTableFormatter, TableFormatter};
pub use self::text::{FixedAdvance, TextMeasure};

#[cfg(test)]
mod test_utils;
