//! Formatting-context state: one [`BlockContext`] per block-level box, per
//! synthetic root, and per anonymous run of inline content.

use crate::pool::NodeId;
use boxflow_dom::ElementId;
use boxflow_style::Overflow;
use boxflow_types::{BoxArea, BoxModel, Size, Vec2};

/// Outcome of closing a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseResult {
    /// Geometry is final.
    Committed,
    /// The context reset itself (typically after enabling its scrollbar);
    /// its children must be formatted again into the same context.
    LocalReformatRequired,
    /// Closing this context made the parent reset itself; the parent must
    /// restart its own children pass.
    ParentReformatRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The synthetic context a pass is rooted in. It has no element and an
    /// unbounded maximum height.
    Root,
    /// A block-level element holding block children.
    Block,
    /// An anonymous block holding line boxes.
    InlineRun,
}

/// An absolutely positioned element waiting for its containing block to close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteEntry {
    pub element: ElementId,
    /// Where the element would have been placed in flow, in pass coordinates.
    pub static_position: Vec2,
}

#[derive(Debug, Clone)]
pub struct BlockContext {
    pub kind: ContextKind,
    pub element: Option<ElementId>,
    pub parent: Option<NodeId>,
    pub box_model: BoxModel,
    pub min_height: f32,
    pub max_height: f32,
    /// Border-box origin relative to the parent's content origin.
    pub position: Vec2,
    /// Content origin in pass coordinates.
    pub content_origin: Vec2,
    /// Bottom of the in-flow content placed so far, in content coordinates.
    pub cursor: f32,
    /// Bottom margin of the last closed block child, not yet added to `cursor`.
    pub last_v_margin: f32,
    pub children: Vec<NodeId>,
    pub lines: Vec<NodeId>,
    pub open_inlines: Vec<NodeId>,
    /// Inline boxes split by a block child, reopened by the next inline run.
    pub carried_inlines: Vec<NodeId>,
    pub float_space: NodeId,
    /// Floats met in the middle of a line, placed once the line closes.
    pub pending_floats: Vec<ElementId>,
    pub absolutes: Vec<AbsoluteEntry>,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub vertical_scrollbar: bool,
    /// Context whose element positions this context's element.
    pub offset_parent: Option<NodeId>,
    /// Context that lays out absolutes met inside this one; `None` means self.
    pub absolute_root: Option<NodeId>,
    /// Whether floats from ancestors reach into this context.
    pub isolates_floats: bool,
    /// The element context created directly by a root pass.
    pub pass_element: bool,
    pub positioned: bool,
    pub closed: bool,
    /// Size of everything this context paints, measured from its border-box origin.
    pub visible_overflow: Size,
    pub reset_count: u32,
}

impl BlockContext {
    pub fn new(kind: ContextKind, element: Option<ElementId>, box_model: BoxModel, float_space: NodeId) -> Self {
        Self {
            kind,
            element,
            parent: None,
            box_model,
            min_height: 0.0,
            max_height: f32::INFINITY,
            position: Vec2::ZERO,
            content_origin: box_model.content_offset(BoxArea::Border),
            cursor: 0.0,
            last_v_margin: 0.0,
            children: Vec::new(),
            lines: Vec::new(),
            open_inlines: Vec::new(),
            carried_inlines: Vec::new(),
            float_space,
            pending_floats: Vec::new(),
            absolutes: Vec::new(),
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            vertical_scrollbar: false,
            offset_parent: None,
            absolute_root: None,
            isolates_floats: true,
            pass_element: false,
            positioned: false,
            closed: false,
            visible_overflow: Size::zero(),
            reset_count: 0,
        }
    }

    /// Border-box origin in pass coordinates.
    pub fn border_origin(&self) -> Vec2 {
        self.content_origin - self.box_model.content_offset(BoxArea::Border)
    }

    /// Collapses `top_margin` with the pending bottom margin of the previous
    /// block and returns the y of the next block's border box.
    pub fn prepare_for_block(&mut self, top_margin: f32) -> f32 {
        self.cursor += top_margin.max(self.last_v_margin);
        self.last_v_margin = 0.0;
        self.cursor
    }

    pub fn finish_block(&mut self, border_bottom: f32, bottom_margin: f32) {
        self.cursor = border_bottom;
        self.last_v_margin = bottom_margin;
    }

    /// Bottom of the content, including trailing margins and floats.
    pub fn content_bottom(&self, float_bottom: f32) -> f32 {
        (self.cursor + self.last_v_margin).max(float_bottom)
    }

    /// The height content may reach before a vertical scrollbar is needed.
    pub fn overflow_limit(&self) -> Option<f32> {
        if self.box_model.auto_height {
            self.max_height.is_finite().then_some(self.max_height)
        } else {
            Some(self.box_model.content.height)
        }
    }

    /// Whether exceeding the overflow limit should add a scrollbar.
    pub fn catches_vertical_overflow(&self) -> bool {
        self.element.is_some() && self.overflow_y == Overflow::Auto && !self.vertical_scrollbar
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }

    /// Every node whose lifetime is tied to this context.
    pub fn owned_nodes(&self) -> Vec<NodeId> {
        let mut owned = Vec::with_capacity(
            self.children.len() + self.lines.len() + self.open_inlines.len() + self.carried_inlines.len() + 1,
        );
        owned.extend(self.children.iter().copied());
        owned.extend(self.lines.iter().copied());
        owned.extend(self.open_inlines.iter().copied());
        owned.extend(self.carried_inlines.iter().copied());
        owned.push(self.float_space);
        owned
    }
}
