/// The variant of a pooled layout node.
///
/// Used for typed access into the pass arena, so that a handle of the wrong
/// kind surfaces as `LayoutError::NodeMismatch` instead of a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    BlockContext,
    InlineBox,
    LineBox,
    TextFragment,
    FloatSpace,
}

impl NodeKind {
    /// Returns a string representation, primarily for debugging or error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::BlockContext => "BlockContext",
            NodeKind::InlineBox => "InlineBox",
            NodeKind::LineBox => "LineBox",
            NodeKind::TextFragment => "TextFragment",
            NodeKind::FloatSpace => "FloatSpace",
        }
    }
}
