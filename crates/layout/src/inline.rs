//! Inline formatting: line boxes filled left to right inside anonymous
//! inline-run contexts, wrapping at word boundaries and around floats.

use crate::LayoutError;
use crate::context::{BlockContext, ContextKind};
use crate::engine::LayoutPass;
use crate::float;
use crate::pool::{LayoutNode, NodeId};
use crate::text::word_ranges;
use boxflow_dom::ElementId;
use boxflow_types::{BoxArea, BoxModel, Rect, Size, Vec2};
use std::ops::Range;

const EPSILON: f32 = 0.01;

/// One line of inline content, in the content coordinates of its run.
#[derive(Debug, Clone, Default)]
pub struct LineBox {
    pub top: f32,
    /// Left edge of the space left free by floats.
    pub left: f32,
    /// Right edge of the space left free by floats.
    pub right: f32,
    /// Where the next fragment starts.
    pub cursor_x: f32,
    pub height: f32,
    pub fragments: Vec<NodeId>,
    /// The last text placed ended in whitespace.
    pub pending_space: bool,
    pub closed: bool,
}

impl LineBox {
    pub fn new(top: f32, left: f32, right: f32) -> Self {
        Self {
            top,
            left,
            right,
            cursor_x: left,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn remaining(&self) -> f32 {
        self.right - self.cursor_x
    }
}

/// A word of text placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub element: ElementId,
    /// Byte range of the word in the element's text.
    pub range: Range<usize>,
    pub rect: Rect,
}

/// An inline element. Non-atomic boxes stay open on their run while their
/// content is placed and grow to cover it; atomic ones (inline-blocks) are
/// placed on a line as a single fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineBox {
    pub element: ElementId,
    pub box_model: BoxModel,
    pub run: NodeId,
    /// Union of the content placed inside, in run content coordinates.
    pub extent: Option<Rect>,
    pub atomic: bool,
}

impl<'a> LayoutPass<'a> {
    /// The open inline run of `ctx`, creating one at the cursor if needed.
    pub(crate) fn ensure_inline_run(&mut self, ctx: NodeId) -> Result<NodeId, LayoutError> {
        if let Some(run) = self.open_inline_run(ctx)? {
            return Ok(run);
        }
        let absolute_root = self.absolute_root_for_children(ctx)?;
        let offset_parent = self.child_offset_parent(ctx)?;

        let c = self.arena.context_mut(ctx)?;
        let y = c.prepare_for_block(0.0);
        let width = c.box_model.content.width;
        let content_origin = c.content_origin + Vec2::new(0.0, y);

        let mut box_model = BoxModel::from_content(Size::new(width, 0.0));
        box_model.auto_height = true;
        let space = self.arena.acquire(LayoutNode::Floats(Default::default()))?;
        let mut run = BlockContext::new(ContextKind::InlineRun, None, box_model, space);
        run.parent = Some(ctx);
        run.position = Vec2::new(0.0, y);
        run.content_origin = content_origin;
        run.offset_parent = offset_parent;
        run.absolute_root = absolute_root;
        run.isolates_floats = false;

        let id = self.arena.acquire(LayoutNode::Block(run))?;
        self.arena.context_mut(ctx)?.children.push(id);
        let carried = std::mem::take(&mut self.arena.context_mut(ctx)?.carried_inlines);
        self.reopen_inlines(id, carried)?;
        Ok(id)
    }

    /// Moves inline boxes split by a block onto `run`, keeping the extent
    /// they already cover.
    fn reopen_inlines(&mut self, run: NodeId, carried: Vec<NodeId>) -> Result<(), LayoutError> {
        let origin = self.arena.context(run)?.content_origin;
        for &id in &carried {
            let previous = self.arena.inline_box(id)?.run;
            let delta = self.arena.context(previous)?.content_origin - origin;
            let inline = self.arena.inline_box_mut(id)?;
            inline.run = run;
            inline.extent = inline
                .extent
                .map(|extent| Rect::from_origin_size(extent.origin() + delta, extent.size()));
        }
        self.arena.context_mut(run)?.open_inlines.extend(carried);
        Ok(())
    }

    fn open_line_of(&self, run: NodeId) -> Result<Option<NodeId>, LayoutError> {
        let Some(&last) = self.arena.context(run)?.lines.last() else {
            return Ok(None);
        };
        Ok((!self.arena.line(last)?.closed).then_some(last))
    }

    pub(crate) fn line_has_content(&self, run: NodeId) -> Result<bool, LayoutError> {
        match self.open_line_of(run)? {
            Some(line) => Ok(!self.arena.line(line)?.is_empty()),
            None => Ok(false),
        }
    }

    fn pending_space(&self, run: NodeId) -> Result<bool, LayoutError> {
        match self.open_line_of(run)? {
            Some(line) => Ok(self.arena.line(line)?.pending_space),
            None => Ok(false),
        }
    }

    /// Where the next inline fragment of `run` would start, in pass coordinates.
    pub(crate) fn line_cursor(&self, run: NodeId) -> Result<Vec2, LayoutError> {
        let c = self.arena.context(run)?;
        let local = match self.open_line_of(run)? {
            Some(line) => {
                let line = self.arena.line(line)?;
                Vec2::new(line.cursor_x, line.top)
            }
            None => Vec2::new(0.0, c.cursor),
        };
        Ok(c.content_origin + local)
    }

    fn current_line(&mut self, run: NodeId, height: f32) -> Result<NodeId, LayoutError> {
        if let Some(line) = self.open_line_of(run)? {
            return Ok(line);
        }
        let exclusions = self.float_exclusions(run)?;
        let c = self.arena.context(run)?;
        let top = c.cursor;
        let (left, right) = float::available_span(&exclusions, top, height, c.box_model.content.width);
        let id = self.arena.acquire(LayoutNode::Line(LineBox::new(top, left, right)))?;
        self.arena.context_mut(run)?.lines.push(id);
        Ok(id)
    }

    /// Finds room for a fragment of `size`, preceded by `lead` unless it
    /// starts a line. Full lines are closed; an empty line too narrow
    /// because of floats moves down past them.
    fn place_on_line(&mut self, run: NodeId, lead: f32, size: Size) -> Result<(NodeId, Rect), LayoutError> {
        loop {
            let line_id = self.current_line(run, size.height)?;
            let line = self.arena.line(line_id)?;
            let x = if line.is_empty() { line.cursor_x } else { line.cursor_x + lead };

            if line.is_empty() && line.remaining() + EPSILON < size.width {
                let exclusions = self.float_exclusions(run)?;
                let (top, indent) = (line.top, line.cursor_x - line.left);
                if let Some(drop) = float::next_drop(&exclusions, top, size.height) {
                    let width = self.arena.context(run)?.box_model.content.width;
                    let (left, right) = float::available_span(&exclusions, drop, size.height, width);
                    let line = self.arena.line_mut(line_id)?;
                    line.top = drop;
                    line.left = left;
                    line.right = right;
                    line.cursor_x = left + indent;
                    continue;
                }
            }

            if line.is_empty() || x + size.width <= line.right + EPSILON {
                let rect = Rect::new(x, line.top, size.width, size.height);
                let line = self.arena.line_mut(line_id)?;
                line.cursor_x = rect.right();
                line.height = line.height.max(size.height);
                return Ok((line_id, rect));
            }
            self.close_line(run)?;
        }
    }

    fn push_fragment(&mut self, run: NodeId, line: NodeId, fragment: NodeId, rect: Rect) -> Result<(), LayoutError> {
        let line = self.arena.line_mut(line)?;
        line.fragments.push(fragment);
        line.pending_space = false;

        let open = self.arena.context(run)?.open_inlines.clone();
        for id in open {
            let inline = self.arena.inline_box_mut(id)?;
            inline.extent = Some(match inline.extent {
                Some(extent) => extent.union(&rect),
                None => rect,
            });
        }
        Ok(())
    }

    /// Opens an inline box for `element` on the run of `ctx` and advances
    /// the line past its left edge.
    pub(crate) fn add_inline_element(
        &mut self,
        ctx: NodeId,
        element: ElementId,
        box_model: BoxModel,
    ) -> Result<NodeId, LayoutError> {
        let run = self.ensure_inline_run(ctx)?;
        let lead = box_model.margin.left + box_model.border.left + box_model.padding.left;
        if lead > 0.0 {
            let line_height = self.doc.computed(element)?.line_height();
            let line = self.current_line(run, line_height)?;
            self.arena.line_mut(line)?.cursor_x += lead;
        }
        let id = self.arena.acquire(LayoutNode::Inline(InlineBox {
            element,
            box_model,
            run,
            extent: None,
            atomic: false,
        }))?;
        self.arena.context_mut(run)?.open_inlines.push(id);
        Ok(id)
    }

    /// Closes an inline box opened by [`Self::add_inline_element`] and writes
    /// its geometry. A box already finished with its block is left alone.
    pub(crate) fn close_inline_element(&mut self, inline: NodeId) -> Result<(), LayoutError> {
        if !self.arena.contains(inline) {
            return Ok(());
        }
        let run = self.arena.inline_box(inline)?.run;
        let b = self.arena.inline_box(inline)?.box_model;
        let tail = b.margin.right + b.border.right + b.padding.right;
        if let Some(line) = self.open_line_of(run)? {
            self.arena.line_mut(line)?.cursor_x += tail;
        }
        let c = self.arena.context_mut(run)?;
        c.open_inlines.retain(|&open| open != inline);
        let parent = c.parent;
        if let Some(parent) = parent {
            self.arena
                .context_mut(parent)?
                .carried_inlines
                .retain(|&carried| carried != inline);
        }
        self.finish_inline(inline)
    }

    /// Hands the inline boxes still open when `run` closes to the enclosing
    /// block, so content after an interrupting block child extends them.
    pub(crate) fn carry_open_inlines(&mut self, run: NodeId) -> Result<(), LayoutError> {
        let c = self.arena.context_mut(run)?;
        let open = std::mem::take(&mut c.open_inlines);
        let parent = c.parent;
        match parent {
            Some(parent) => self.arena.context_mut(parent)?.carried_inlines.extend(open),
            None => {
                for inline in open.into_iter().rev() {
                    self.finish_inline(inline)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn close_carried_inlines(&mut self, ctx: NodeId) -> Result<(), LayoutError> {
        let carried = std::mem::take(&mut self.arena.context_mut(ctx)?.carried_inlines);
        for inline in carried.into_iter().rev() {
            self.finish_inline(inline)?;
        }
        Ok(())
    }

    fn finish_inline(&mut self, inline: NodeId) -> Result<(), LayoutError> {
        let inline = match self.arena.release(inline)? {
            LayoutNode::Inline(inline) => inline,
            other => return Err(LayoutError::NodeMismatch("InlineBox", other.kind().as_str())),
        };
        let extent = match inline.extent {
            Some(extent) => extent,
            None => {
                let c = self.arena.context(inline.run)?;
                let at = self.line_cursor(inline.run)? - c.content_origin;
                Rect::from_origin_size(at, Size::zero())
            }
        };
        let c = self.arena.context(inline.run)?;
        let mut box_model = inline.box_model;
        box_model.content = extent.size();
        let frame = Vec2::new(
            box_model.padding.left + box_model.border.left,
            box_model.padding.top + box_model.border.top,
        );
        let border_origin = c.content_origin + extent.origin() - frame;
        let (offset, offset_parent) = self.offset_from(c.offset_parent, border_origin)?;
        self.set_element_geometry(inline.element, box_model, offset, offset_parent)
    }

    /// Places the words of `text` on lines, collapsing whitespace.
    pub(crate) fn add_text(&mut self, ctx: NodeId, element: ElementId, text: &str) -> Result<(), LayoutError> {
        let run = self.ensure_inline_run(ctx)?;
        let computed = self.doc.computed(element)?;
        let font_size = computed.font_size;
        let line_height = computed.line_height();
        let measure = self.text_measure();
        let space = measure.advance(' ', font_size);
        let leading = text.starts_with(char::is_whitespace);

        for (i, range) in word_ranges(text).into_iter().enumerate() {
            let spaced = i > 0 || leading || self.pending_space(run)?;
            let lead = if spaced { space } else { 0.0 };
            let width = measure.measure(&text[range.clone()], font_size);
            let (line, rect) = self.place_on_line(run, lead, Size::new(width, line_height))?;
            let fragment = self
                .arena
                .acquire(LayoutNode::Text(TextFragment { element, range, rect }))?;
            self.push_fragment(run, line, fragment, rect)?;
        }

        if text.ends_with(char::is_whitespace) {
            if let Some(line) = self.open_line_of(run)? {
                let line = self.arena.line_mut(line)?;
                line.pending_space = !line.is_empty();
            }
        }
        Ok(())
    }

    /// Places an already formatted inline-block on the current line.
    pub(crate) fn add_atomic_inline(
        &mut self,
        ctx: NodeId,
        element: ElementId,
        box_model: BoxModel,
    ) -> Result<(), LayoutError> {
        let run = self.ensure_inline_run(ctx)?;
        let font_size = self.doc.computed(element)?.font_size;
        let lead = if self.pending_space(run)? {
            self.text_measure().advance(' ', font_size)
        } else {
            0.0
        };
        let (line, rect) = self.place_on_line(run, lead, box_model.size(BoxArea::Margin))?;
        let fragment = self.arena.acquire(LayoutNode::Inline(InlineBox {
            element,
            box_model,
            run,
            extent: Some(rect),
            atomic: true,
        }))?;
        self.push_fragment(run, line, fragment, rect)?;

        let c = self.arena.context(run)?;
        let border_origin = c.content_origin + rect.origin() + box_model.margin.top_left();
        let (offset, offset_parent) = self.offset_from(c.offset_parent, border_origin)?;
        self.set_offset(element, offset, offset_parent)
    }

    /// Ends the current line; an empty line still takes the height of the
    /// break's line.
    pub(crate) fn add_break(&mut self, ctx: NodeId, element: ElementId) -> Result<(), LayoutError> {
        let run = self.ensure_inline_run(ctx)?;
        let line_height = self.doc.computed(element)?.line_height();
        let line = self.current_line(run, line_height)?;
        let line = self.arena.line_mut(line)?;
        line.height = line.height.max(line_height);
        self.close_line(run)
    }

    /// Closes the open line of `run`, moves the run cursor below it and
    /// places floats that were waiting for the line to end.
    pub(crate) fn close_line(&mut self, run: NodeId) -> Result<(), LayoutError> {
        let Some(line) = self.open_line_of(run)? else {
            return Ok(());
        };
        let line = self.arena.line_mut(line)?;
        line.closed = true;
        let bottom = line.top + line.height;

        let c = self.arena.context_mut(run)?;
        c.cursor = c.cursor.max(bottom);
        let pending = std::mem::take(&mut c.pending_floats);
        for element in pending {
            self.place_float(run, element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::LayoutError;
    use crate::test_utils::{body_with, engine, init_logs, pos, size_of};
    use boxflow_types::{Size, Vec2};

    #[test]
    fn words_wrap_at_container_edge() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        doc.set_style(body, "width: 50px; font-size: 10px")?;
        let first = doc.create_styled("span", "", Some(body))?;
        doc.create_text(first, "aaaa bbbb ")?;
        let second = doc.create_styled("span", "", Some(body))?;
        doc.create_text(second, "cccc")?;
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        assert_eq!(pos(&doc, first), Vec2::new(0.0, 0.0));
        assert_eq!(size_of(&doc, first), Size::new(45.0, 12.0));
        assert_eq!(pos(&doc, second), Vec2::new(0.0, 12.0));
        assert_eq!(size_of(&doc, second), Size::new(20.0, 12.0));
        assert_eq!(size_of(&doc, body), Size::new(50.0, 24.0));
        Ok(())
    }

    #[test]
    fn inline_padding_shifts_content() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let span = doc.create_styled("span", "padding: 0 4px", Some(body))?;
        doc.create_text(span, "ab")?;
        let after = doc.create_text(body, "cd")?;
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        assert_eq!(pos(&doc, span), Vec2::new(0.0, 0.0));
        assert_eq!(size_of(&doc, span), Size::new(18.0, 12.0));
        assert_eq!(pos(&doc, after), Vec2::new(18.0, 0.0));
        Ok(())
    }

    #[test]
    fn block_inside_inline_splits_its_content() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let span = doc.create_styled("span", "", Some(body))?;
        doc.create_text(span, "ab ")?;
        let block = doc.create_styled("div", "height: 20px", Some(span))?;
        let tail = doc.create_text(span, "cd")?;
        let closed = doc.create_styled("span", "", Some(body))?;
        doc.create_text(closed, "ef")?;
        doc.create_styled("div", "height: 8px", Some(closed))?;
        let after = doc.create_text(body, "gh")?;
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        assert_eq!(pos(&doc, block), Vec2::new(0.0, 12.0));
        assert_eq!(pos(&doc, tail), Vec2::new(0.0, 32.0));
        assert_eq!(pos(&doc, span), Vec2::new(0.0, 0.0));
        assert_eq!(size_of(&doc, span), Size::new(10.0, 44.0));

        assert_eq!(pos(&doc, closed), Vec2::new(10.0, 32.0));
        assert_eq!(size_of(&doc, closed), Size::new(10.0, 12.0));
        assert_eq!(pos(&doc, after), Vec2::new(0.0, 52.0));
        Ok(())
    }

    #[test]
    fn lines_avoid_floats() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let float = doc.create_styled("div", "float: left; width: 50px; height: 30px", Some(body))?;
        let text = doc.create_text(body, "aaaa")?;
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        assert_eq!(pos(&doc, float), Vec2::new(0.0, 0.0));
        assert_eq!(pos(&doc, text), Vec2::new(50.0, 0.0));
        assert_eq!(size_of(&doc, body).height, 30.0);
        Ok(())
    }

    #[test]
    fn break_ends_line() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&["ab"]);
        doc.create_styled("br", "", Some(body))?;
        let second = doc.create_text(body, "cd")?;
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        assert_eq!(pos(&doc, second), Vec2::new(0.0, 12.0));
        assert_eq!(size_of(&doc, body).height, 24.0);
        Ok(())
    }
}
