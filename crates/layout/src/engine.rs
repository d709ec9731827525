//! The block-formatting dispatcher.
//!
//! A [`LayoutEngine`] is cheap to share: it owns the configuration, the node
//! pool and the pluggable text and table formatters. Each call to
//! [`LayoutEngine::format_root`] runs one [`LayoutPass`] over a document
//! subtree. The pass builds a tree of formatting contexts in a pooled arena,
//! writes final geometry back to the document as contexts commit, and
//! releases the whole tree when it ends.

use crate::LayoutError;
use crate::config::LayoutConfig;
use crate::context::{AbsoluteEntry, BlockContext, CloseResult, ContextKind};
use crate::details::{self, BoxContext};
use crate::float::{self, FloatSide, PlacedFloat};
use crate::pool::{LayoutNode, LayoutPool, NodeId, PassArena};
use crate::stats::PassStats;
use crate::table::{GridTableFormatter, TableFormatter};
use crate::text::{FixedAdvance, TextMeasure};
use boxflow_dom::{Document, ElementId};
use boxflow_style::{Display, Float, Overflow, Position, PropertyId};
use boxflow_types::{BoxArea, BoxModel, ContainingBlock, Rect, Size, Vec2};
use std::sync::Arc;
use std::time::Instant;

/// Children passes a root runs before accepting its geometry as final.
const ROOT_ATTEMPTS: usize = 2;

/// Tolerance used when comparing content extents against limits.
const EPSILON: f32 = 0.01;

/// Result of formatting one root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOutput {
    /// Extent of everything the root paints, measured from its border-box origin.
    pub visible_overflow: Size,
    pub stats: PassStats,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    pool: Arc<LayoutPool>,
    text: Box<dyn TextMeasure>,
    tables: Box<dyn TableFormatter>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let pool = Arc::new(LayoutPool::new(config.pool_capacity, config.max_pool_nodes));
        Self::with_pool(config, pool)
    }

    /// Creates an engine drawing its pass slabs from a pool shared with
    /// other engines.
    pub fn with_pool(config: LayoutConfig, pool: Arc<LayoutPool>) -> Self {
        Self {
            config,
            pool,
            text: Box::new(FixedAdvance::new(config.glyph_advance)),
            tables: Box::new(GridTableFormatter),
        }
    }

    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.text = Box::new(measure);
        self
    }

    pub fn with_table_formatter(mut self, formatter: impl TableFormatter + 'static) -> Self {
        self.tables = Box::new(formatter);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<LayoutPool> {
        &self.pool
    }

    pub fn text_measure(&self) -> &dyn TextMeasure {
        self.text.as_ref()
    }

    /// Lays out `element` and its subtree as an independent root inside a
    /// containing block of `containing_block`. When `override_box` is given
    /// it replaces the box the element's style would produce.
    pub fn format_root(
        &self,
        doc: &mut Document,
        element: ElementId,
        containing_block: Size,
        override_box: Option<BoxModel>,
    ) -> Result<LayoutOutput, LayoutError> {
        if !containing_block.is_finite_non_negative() {
            return Err(LayoutError::InvalidContainingBlock(
                containing_block.width,
                containing_block.height,
            ));
        }
        doc.get(element)?;
        doc.clear_layout_log();

        let start = Instant::now();
        let mut pass = LayoutPass::new(self, doc);
        let visible_overflow = pass.format_root_in(
            element,
            ContainingBlock::from(containing_block),
            override_box,
            BoxContext::Block,
        )?;
        let mut stats = pass.finish();
        stats.elapsed = start.elapsed();
        if log::log_enabled!(log::Level::Info) {
            stats.log_summary(&doc.address(element));
        }
        Ok(LayoutOutput {
            visible_overflow,
            stats,
        })
    }

    /// Formats independent documents in parallel. Each pass checks its own
    /// slab out of the shared pool.
    #[cfg(feature = "parallel")]
    pub fn format_roots(
        &self,
        jobs: &mut [(Document, ElementId)],
        containing_block: Size,
    ) -> Vec<Result<LayoutOutput, LayoutError>> {
        use rayon::prelude::*;

        jobs.par_iter_mut()
            .map(|(doc, root)| self.format_root(doc, *root, containing_block, None))
            .collect()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// The state of one layout pass: the document being written, the arena
/// holding the context tree, and the counters reported at the end.
pub struct LayoutPass<'a> {
    engine: &'a LayoutEngine,
    pub(crate) doc: &'a mut Document,
    pub(crate) arena: PassArena<'a>,
    pub(crate) stats: PassStats,
}

impl<'a> LayoutPass<'a> {
    fn new(engine: &'a LayoutEngine, doc: &'a mut Document) -> Self {
        Self {
            engine,
            doc,
            arena: engine.pool.checkout(),
            stats: PassStats::default(),
        }
    }

    fn finish(mut self) -> PassStats {
        self.stats.nodes_acquired = self.arena.acquired();
        self.stats.peak_live_nodes = self.arena.peak_live();
        self.stats
    }

    pub fn engine(&self) -> &'a LayoutEngine {
        self.engine
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn context(&self, ctx: NodeId) -> Result<&BlockContext, LayoutError> {
        self.arena.context(ctx)
    }

    pub fn text_measure(&self) -> &'a dyn TextMeasure {
        self.engine.text.as_ref()
    }

    /// Formats `element` as an independent root: a synthetic context stands
    /// in for its parent, the element's context gets up to two children
    /// passes, and its absolutely positioned descendants are laid out once
    /// its in-flow content is final. Returns the element's visible overflow.
    pub fn format_root_in(
        &mut self,
        element: ElementId,
        cb: ContainingBlock,
        override_box: Option<BoxModel>,
        context: BoxContext,
    ) -> Result<Size, LayoutError> {
        let mut root_box = BoxModel::from_content(Size::new(cb.width, cb.height.unwrap_or(0.0)));
        root_box.auto_height = cb.height.is_none();
        let root = self.new_context(ContextKind::Root, None, root_box)?;

        let measure = self.text_measure();
        let (box_model, min_height, max_height) = match override_box {
            Some(box_model) => {
                let (min, max) = details::min_max_height(self.doc.computed(element)?, &box_model, cb.height);
                (box_model, min, max)
            }
            None => details::build_box_with_limits(cb, self.doc, element, context, measure)?,
        };

        let Some(ctx) = self.open_block(root, element, box_model, min_height, max_height)? else {
            self.arena.release_subtree(root)?;
            return Ok(Size::zero());
        };
        let c = self.arena.context_mut(ctx)?;
        c.pass_element = true;
        c.isolates_floats = true;

        let mut attempts = 0;
        while attempts < ROOT_ATTEMPTS {
            attempts += 1;
            self.format_children(ctx, element, true)?;
            match self.close(ctx)? {
                CloseResult::Committed => break,
                result => log::debug!(
                    "Root {} closed with {:?} on attempt {}",
                    self.doc.address(element),
                    result,
                    attempts
                ),
            }
        }
        self.stats.record_root_attempts(attempts);

        self.close_absolute_elements(ctx)?;
        let visible_overflow = self.arena.context(ctx)?.visible_overflow;
        self.doc.notify_layout(element)?;
        self.arena.release_subtree(root)?;
        Ok(visible_overflow)
    }

    fn new_context(
        &mut self,
        kind: ContextKind,
        element: Option<ElementId>,
        box_model: BoxModel,
    ) -> Result<NodeId, LayoutError> {
        let space = self.arena.acquire(LayoutNode::Floats(Default::default()))?;
        let ctx = BlockContext::new(kind, element, box_model, space);
        self.arena.acquire(LayoutNode::Block(ctx))
    }

    /// Formats the children of `element` into `ctx`. When a child fails and
    /// `honor_restarts` is set, the context is reset (if the failure did not
    /// already reset it) and the pass starts over from the first sibling.
    pub(crate) fn format_children(
        &mut self,
        ctx: NodeId,
        element: ElementId,
        honor_restarts: bool,
    ) -> Result<(), LayoutError> {
        let children = self.doc.children(element)?.to_vec();
        let mut restarts = 0;
        let mut i = 0;
        while i < children.len() {
            let resets_before = self.arena.context(ctx)?.reset_count;
            if self.format_element(ctx, children[i])? || !honor_restarts {
                i += 1;
                continue;
            }
            if restarts >= self.engine.config.max_sibling_restarts {
                log::warn!(
                    "Children of {} requested more than {} restarts; keeping the current layout",
                    self.doc.address(element),
                    restarts
                );
                i += 1;
                continue;
            }
            restarts += 1;
            self.stats.sibling_restarts += 1;
            if self.arena.context(ctx)?.reset_count == resets_before {
                self.reset_context(ctx)?;
            }
            log::debug!(
                "Restarting children of {} after {} failed",
                self.doc.address(element),
                self.doc.address(children[i])
            );
            i = 0;
        }
        Ok(())
    }

    /// Formats one element into `ctx`. Returns `false` when the element's
    /// context forced `ctx` to reset, in which case the caller restarts.
    pub(crate) fn format_element(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        let node = self.doc.get(element)?;
        let is_break = node.tag() == "br";
        let computed = node.computed();
        let (display, position, float) = (computed.display, computed.position, computed.float);

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Formatting {} as {}", self.doc.address(element), display.as_str());
        }

        if is_break {
            self.add_break(ctx, element)?;
            self.doc.notify_layout(element)?;
            return Ok(true);
        }
        if display == Display::None {
            self.doc.clear_layout(element)?;
            return Ok(true);
        }
        if position.is_out_of_flow() {
            self.add_absolute(ctx, element)?;
            return Ok(true);
        }
        if float != Float::None {
            let cb = self.containing_block(ctx)?;
            self.format_root_in(element, cb, None, BoxContext::ShrinkToFit)?;
            return self.add_float(ctx, element);
        }

        match display {
            Display::Block => self.format_block(ctx, element),
            Display::Inline => self.format_inline(ctx, element),
            Display::InlineBlock => self.format_inline_block(ctx, element),
            Display::Table => self.format_table(ctx, element),
            Display::None => Ok(true),
            Display::TableRow
            | Display::TableRowGroup
            | Display::TableColumn
            | Display::TableColumnGroup
            | Display::TableCell => {
                let declared = self
                    .doc
                    .property(element, PropertyId::Display)?
                    .map(|p| p.value.to_string())
                    .unwrap_or_else(|| display.as_str().to_string());
                log::warn!(
                    "Element has a display type '{}', but is not located in a table. It will not be formatted. In element {}",
                    declared,
                    self.doc.address(element)
                );
                self.doc.clear_layout(element)?;
                Ok(true)
            }
        }
    }

    fn format_block(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        let cb = self.containing_block(ctx)?;
        let (box_model, min_height, max_height) =
            details::build_box_with_limits(cb, self.doc, element, BoxContext::Block, self.text_measure())?;
        let Some(block) = self.open_block(ctx, element, box_model, min_height, max_height)? else {
            return Ok(false);
        };

        self.format_children(block, element, true)?;
        match self.close(block)? {
            CloseResult::Committed => {}
            CloseResult::ParentReformatRequired => return Ok(false),
            CloseResult::LocalReformatRequired => {
                // The block enabled its scrollbar; one more pass with the
                // narrower content box, ignoring restart requests.
                self.format_children(block, element, false)?;
                if self.close(block)? != CloseResult::Committed {
                    return Ok(false);
                }
            }
        }
        self.doc.notify_layout(element)?;
        Ok(true)
    }

    fn format_inline(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        let cb = self.containing_block(ctx)?;
        let box_model = details::build_box(cb, self.doc, element, BoxContext::Inline, self.text_measure())?;
        let inline = self.add_inline_element(ctx, element, box_model)?;

        if let Some(text) = self.doc.get(element)?.text().map(str::to_owned) {
            self.add_text(ctx, element, &text)?;
        }
        for child in self.doc.children(element)?.to_vec() {
            if !self.format_element(ctx, child)? {
                return Ok(false);
            }
        }
        self.close_inline_element(inline)?;
        Ok(true)
    }

    fn format_inline_block(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        let cb = self.containing_block(ctx)?;
        self.format_root_in(element, cb, None, BoxContext::ShrinkToFit)?;
        let box_model = self
            .doc
            .layout(element)?
            .map(|layout| layout.box_model)
            .unwrap_or_default();
        self.add_atomic_inline(ctx, element, box_model)?;
        Ok(true)
    }

    fn format_table(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        let cb = self.containing_block(ctx)?;
        let (box_model, min_height, max_height) =
            details::build_box_with_limits(cb, self.doc, element, BoxContext::Block, self.text_measure())?;
        let Some(table) = self.open_block(ctx, element, box_model, min_height, max_height)? else {
            return Ok(false);
        };

        let engine = self.engine;
        for _ in 0..ROOT_ATTEMPTS {
            match engine.tables.format_table(self, table, element)? {
                CloseResult::Committed => {
                    self.doc.notify_layout(element)?;
                    break;
                }
                CloseResult::LocalReformatRequired => continue,
                CloseResult::ParentReformatRequired => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Opens a block context for `element` as the next block child of
    /// `parent`. Returns `None` when closing the parent's open run of
    /// inline content made the parent reset.
    pub(crate) fn open_block(
        &mut self,
        parent: NodeId,
        element: ElementId,
        mut box_model: BoxModel,
        min_height: f32,
        max_height: f32,
    ) -> Result<Option<NodeId>, LayoutError> {
        if let Some(run) = self.open_inline_run(parent)? {
            if self.close(run)? == CloseResult::ParentReformatRequired {
                return Ok(None);
            }
        }

        let computed = self.doc.computed(element)?;
        let overflow_x = computed.overflow_x;
        let overflow_y = computed.overflow_y;
        let positioned = computed.position != Position::Static;
        let establishes_bfc = overflow_x.clips()
            || overflow_y.clips()
            || matches!(computed.display, Display::InlineBlock | Display::Table)
            || computed.float != Float::None
            || computed.position.is_out_of_flow();

        self.doc.clear_scrollbars(element)?;
        let mut vertical_scrollbar = false;
        if overflow_y == Overflow::Scroll {
            let width = self.engine.config.scrollbar_width;
            self.doc.enable_vertical_scrollbar(element, width)?;
            box_model.content.width = (box_model.content.width - width).max(0.0);
            vertical_scrollbar = true;
        }

        let absolute_root = self.absolute_root_for_children(parent)?;
        let parent_ctx = self.arena.context_mut(parent)?;
        let y = parent_ctx.prepare_for_block(box_model.margin.top);
        let position = Vec2::new(box_model.margin.left, y);
        let content_origin = parent_ctx.content_origin + position + box_model.content_offset(BoxArea::Border);
        let offset_parent = if parent_ctx.element.is_some() {
            Some(parent)
        } else {
            parent_ctx.offset_parent
        };

        let space = self.arena.acquire(LayoutNode::Floats(Default::default()))?;
        let mut ctx = BlockContext::new(ContextKind::Block, Some(element), box_model, space);
        ctx.parent = Some(parent);
        ctx.min_height = min_height;
        ctx.max_height = max_height.max(min_height);
        ctx.position = position;
        ctx.content_origin = content_origin;
        ctx.overflow_x = overflow_x;
        ctx.overflow_y = overflow_y;
        ctx.vertical_scrollbar = vertical_scrollbar;
        ctx.offset_parent = offset_parent;
        ctx.absolute_root = absolute_root;
        ctx.isolates_floats = establishes_bfc;
        ctx.positioned = positioned;

        let id = self.arena.acquire(LayoutNode::Block(ctx))?;
        self.arena.context_mut(parent)?.children.push(id);
        Ok(Some(id))
    }

    /// The open anonymous context collecting inline content in `ctx`, if any.
    pub(crate) fn open_inline_run(&self, ctx: NodeId) -> Result<Option<NodeId>, LayoutError> {
        let Some(last) = self.arena.context(ctx)?.last_child() else {
            return Ok(None);
        };
        let run = self.arena.context(last)?;
        Ok((run.kind == ContextKind::InlineRun && !run.closed).then_some(last))
    }

    /// Closes a context: finishes its inline content and floats, fixes its
    /// height, writes its geometry back and hands its extent to the parent.
    pub fn close(&mut self, ctx: NodeId) -> Result<CloseResult, LayoutError> {
        let kind = self.arena.context(ctx)?.kind;
        match kind {
            ContextKind::InlineRun => {
                self.close_line(ctx)?;
                self.carry_open_inlines(ctx)?;
            }
            ContextKind::Block | ContextKind::Root => {
                if let Some(run) = self.open_inline_run(ctx)? {
                    if self.close(run)? == CloseResult::ParentReformatRequired {
                        self.stats.local_reformats += 1;
                        return Ok(CloseResult::LocalReformatRequired);
                    }
                }
                self.close_carried_inlines(ctx)?;
                let pending = std::mem::take(&mut self.arena.context_mut(ctx)?.pending_floats);
                for element in pending {
                    self.place_float(ctx, element)?;
                }
            }
        }

        let content_bottom = self.content_bottom(ctx)?;
        if !self.catch_vertical_overflow(ctx, content_bottom)? {
            self.stats.local_reformats += 1;
            return Ok(CloseResult::LocalReformatRequired);
        }

        let c = self.arena.context_mut(ctx)?;
        if c.box_model.auto_height {
            c.box_model.content.height = content_bottom.clamp(c.min_height, c.max_height);
        }
        self.compute_visible_overflow(ctx)?;

        let c = self.arena.context_mut(ctx)?;
        c.closed = true;
        let (parent, positioned, pass_element) = (c.parent, c.positioned, c.pass_element);
        self.commit_geometry(ctx)?;

        if let Some(parent) = parent {
            if kind != ContextKind::Root && !self.close_block_child(parent, ctx)? {
                self.stats.parent_reformats += 1;
                return Ok(CloseResult::ParentReformatRequired);
            }
        }
        if positioned && !pass_element {
            self.close_absolute_elements(ctx)?;
        }
        Ok(CloseResult::Committed)
    }

    fn content_bottom(&self, ctx: NodeId) -> Result<f32, LayoutError> {
        let c = self.arena.context(ctx)?;
        let float_bottom = self.arena.float_space(c.float_space)?.bottom();
        Ok(c.content_bottom(float_bottom))
    }

    /// Advances `parent` past a closed block child and checks the parent for
    /// vertical overflow. Returns `false` if the parent reset itself.
    fn close_block_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, LayoutError> {
        let c = self.arena.context(child)?;
        let border_bottom = c.position.y + c.box_model.size(BoxArea::Border).height;
        let bottom_margin = c.box_model.margin.bottom;
        self.arena.context_mut(parent)?.finish_block(border_bottom, bottom_margin);
        let bottom = self.content_bottom(parent)?;
        self.catch_vertical_overflow(parent, bottom)
    }

    /// Enables the vertical scrollbar of `ctx` and resets it when `bottom`
    /// passes its overflow limit. Returns `false` if it reset.
    pub(crate) fn catch_vertical_overflow(&mut self, ctx: NodeId, bottom: f32) -> Result<bool, LayoutError> {
        let c = self.arena.context(ctx)?;
        if !c.catches_vertical_overflow() {
            return Ok(true);
        }
        let (Some(limit), Some(element)) = (c.overflow_limit(), c.element) else {
            return Ok(true);
        };
        if bottom <= limit + EPSILON {
            return Ok(true);
        }

        let width = self.engine.config.scrollbar_width;
        log::debug!(
            "Content of {} reaches {:.2}, past {:.2}; enabling its vertical scrollbar",
            self.doc.address(element),
            bottom,
            limit
        );
        self.doc.enable_vertical_scrollbar(element, width)?;
        let c = self.arena.context_mut(ctx)?;
        c.vertical_scrollbar = true;
        c.box_model.content.width = (c.box_model.content.width - width).max(0.0);
        self.reset_context(ctx)?;
        Ok(false)
    }

    /// Discards everything formatted into `ctx` so its children can be
    /// formatted again. The context keeps its box, scrollbar state and
    /// position in its parent.
    pub(crate) fn reset_context(&mut self, ctx: NodeId) -> Result<(), LayoutError> {
        let c = self.arena.context_mut(ctx)?;
        let mut released = std::mem::take(&mut c.children);
        released.append(&mut c.lines);
        released.append(&mut c.open_inlines);
        released.append(&mut c.carried_inlines);
        c.pending_floats.clear();
        c.absolutes.clear();
        c.cursor = 0.0;
        c.last_v_margin = 0.0;
        c.visible_overflow = Size::zero();
        c.closed = false;
        c.reset_count += 1;
        let space = c.float_space;

        for node in released {
            self.arena.release_subtree(node)?;
        }
        self.arena.float_space_mut(space)?.clear();
        Ok(())
    }

    /// Writes the box and offset of the element behind `ctx`, if any.
    fn commit_geometry(&mut self, ctx: NodeId) -> Result<(), LayoutError> {
        let c = self.arena.context(ctx)?;
        let Some(element) = c.element else {
            return Ok(());
        };
        let box_model = c.box_model;
        let (offset, offset_parent) = self.offset_from(c.offset_parent, c.border_origin())?;
        self.doc.set_box(element, box_model)?;
        self.doc.set_offset(element, offset, offset_parent)?;
        Ok(())
    }

    /// Converts a pass-coordinate point into an offset from the border-box
    /// origin of `offset_parent`, paired with that context's element.
    pub(crate) fn offset_from(
        &self,
        offset_parent: Option<NodeId>,
        point: Vec2,
    ) -> Result<(Vec2, Option<ElementId>), LayoutError> {
        match offset_parent {
            Some(op) => {
                let parent = self.arena.context(op)?;
                Ok((point - parent.border_origin(), parent.element))
            }
            None => Ok((point, None)),
        }
    }

    /// The context whose element positions children placed in `ctx`.
    pub(crate) fn child_offset_parent(&self, ctx: NodeId) -> Result<Option<NodeId>, LayoutError> {
        let c = self.arena.context(ctx)?;
        Ok(if c.element.is_some() { Some(ctx) } else { c.offset_parent })
    }

    fn compute_visible_overflow(&mut self, ctx: NodeId) -> Result<(), LayoutError> {
        let c = self.arena.context(ctx)?;
        let mut extent = c.box_model.size(BoxArea::Border);
        let clip_x = c.overflow_x.clips();
        let clip_y = c.overflow_y.clips();

        if !(clip_x && clip_y) {
            let mut content = Size::zero();
            for &child in &c.children {
                let child = self.arena.context(child)?;
                content = content.max(Size::new(
                    child.position.x + child.visible_overflow.width,
                    child.position.y + child.visible_overflow.height,
                ));
            }
            for &line in &c.lines {
                for &fragment in &self.arena.line(line)?.fragments {
                    if let Some(rect) = self.fragment_rect(fragment)? {
                        content = content.max(Size::new(rect.right(), rect.bottom()));
                    }
                }
            }
            for placed in self.arena.float_space(c.float_space)?.floats() {
                content = content.max(Size::new(placed.rect.right(), placed.rect.bottom()));
            }
            let offset = c.box_model.content_offset(BoxArea::Border);
            if !clip_x {
                extent.width = extent.width.max(offset.x + content.width);
            }
            if !clip_y {
                extent.height = extent.height.max(offset.y + content.height);
            }
        }

        self.arena.context_mut(ctx)?.visible_overflow = extent;
        Ok(())
    }

    fn fragment_rect(&self, fragment: NodeId) -> Result<Option<Rect>, LayoutError> {
        Ok(match self.arena.get(fragment)? {
            LayoutNode::Text(text) => Some(text.rect),
            LayoutNode::Inline(inline) => inline.extent,
            _ => None,
        })
    }

    /// The containing block children of `ctx` resolve percentages against:
    /// the content box of the nearest context that is not an anonymous run.
    pub(crate) fn containing_block(&self, ctx: NodeId) -> Result<ContainingBlock, LayoutError> {
        let mut current = ctx;
        loop {
            let c = self.arena.context(current)?;
            match (c.kind, c.parent) {
                (ContextKind::InlineRun, Some(parent)) => current = parent,
                _ => {
                    let height = (!c.box_model.auto_height).then_some(c.box_model.content.height);
                    return Ok(ContainingBlock::new(c.box_model.content.width, height));
                }
            }
        }
    }

    /// The context that lays out absolutes found in `ctx`.
    fn absolute_container(&self, ctx: NodeId) -> Result<NodeId, LayoutError> {
        let c = self.arena.context(ctx)?;
        if c.positioned || c.pass_element {
            return Ok(ctx);
        }
        Ok(c.absolute_root.unwrap_or(ctx))
    }

    pub(crate) fn absolute_root_for_children(&self, parent: NodeId) -> Result<Option<NodeId>, LayoutError> {
        if self.arena.context(parent)?.kind == ContextKind::Root {
            return Ok(None);
        }
        self.absolute_container(parent).map(Some)
    }

    /// The pass element context `ctx` belongs to.
    fn pass_container(&self, ctx: NodeId) -> Result<NodeId, LayoutError> {
        let mut current = ctx;
        loop {
            let c = self.arena.context(current)?;
            match c.parent {
                Some(parent) if !c.pass_element => current = parent,
                _ => return Ok(current),
            }
        }
    }

    /// Queues an out-of-flow element on its containing context, remembering
    /// where it would have been placed in flow.
    fn add_absolute(&mut self, ctx: NodeId, element: ElementId) -> Result<(), LayoutError> {
        let static_position = match self.open_inline_run(ctx)? {
            Some(run) => self.line_cursor(run)?,
            None => {
                let c = self.arena.context(ctx)?;
                c.content_origin + Vec2::new(0.0, c.cursor + c.last_v_margin)
            }
        };
        let container = if self.doc.computed(element)?.position == Position::Fixed {
            self.pass_container(ctx)?
        } else {
            self.absolute_container(ctx)?
        };

        let absolutes = &mut self.arena.context_mut(container)?.absolutes;
        match absolutes.iter_mut().find(|entry| entry.element == element) {
            Some(entry) => entry.static_position = static_position,
            None => absolutes.push(AbsoluteEntry {
                element,
                static_position,
            }),
        }
        Ok(())
    }

    /// Lays out the absolutes queued on `ctx` against its padding box.
    fn close_absolute_elements(&mut self, ctx: NodeId) -> Result<(), LayoutError> {
        let entries = std::mem::take(&mut self.arena.context_mut(ctx)?.absolutes);
        if entries.is_empty() {
            return Ok(());
        }
        let c = self.arena.context(ctx)?;
        let container = c.element;
        let border_origin = c.border_origin();
        let padding_origin = border_origin + c.box_model.border.top_left();
        let padding_box = c.box_model.size(BoxArea::Padding);
        let cb = ContainingBlock::new(padding_box.width, Some(padding_box.height));

        for entry in entries {
            self.format_root_in(entry.element, cb, None, BoxContext::ShrinkToFit)?;
            let Some(layout) = self.doc.layout(entry.element)?.copied() else {
                continue;
            };
            let b = layout.box_model;
            let border_size = b.size(BoxArea::Border);
            let computed = self.doc.computed(entry.element)?;

            let x = match (
                computed.left.resolve(Some(padding_box.width)),
                computed.right.resolve(Some(padding_box.width)),
            ) {
                (Some(left), _) => padding_origin.x + left + b.margin.left,
                (None, Some(right)) => {
                    padding_origin.x + padding_box.width - right - b.margin.right - border_size.width
                }
                (None, None) => entry.static_position.x + b.margin.left,
            };
            let y = match (
                computed.top.resolve(Some(padding_box.height)),
                computed.bottom.resolve(Some(padding_box.height)),
            ) {
                (Some(top), _) => padding_origin.y + top + b.margin.top,
                (None, Some(bottom)) => {
                    padding_origin.y + padding_box.height - bottom - b.margin.bottom - border_size.height
                }
                (None, None) => entry.static_position.y + b.margin.top,
            };
            self.doc
                .set_offset(entry.element, Vec2::new(x, y) - border_origin, container)?;
        }
        Ok(())
    }

    /// Adds an already formatted float to `ctx`. Floats met in the middle of
    /// a line wait until the line closes. Returns `false` if placing the
    /// float made `ctx` reset.
    fn add_float(&mut self, ctx: NodeId, element: ElementId) -> Result<bool, LayoutError> {
        if let Some(run) = self.open_inline_run(ctx)? {
            if self.line_has_content(run)? {
                self.arena.context_mut(run)?.pending_floats.push(element);
                return Ok(true);
            }
            self.place_float(run, element)?;
            return Ok(true);
        }
        self.place_float(ctx, element)?;
        let bottom = self.content_bottom(ctx)?;
        self.catch_vertical_overflow(ctx, bottom)
    }

    /// Places a float into the float space of `ctx` below its current
    /// content and writes the float element's offset.
    pub(crate) fn place_float(&mut self, ctx: NodeId, element: ElementId) -> Result<(), LayoutError> {
        let Some(side) = FloatSide::from_float(self.doc.computed(element)?.float) else {
            return Ok(());
        };
        let Some(box_model) = self.doc.layout(element)?.map(|layout| layout.box_model) else {
            return Ok(());
        };
        let size = box_model.size(BoxArea::Margin);

        let exclusions = self.float_exclusions(ctx)?;
        let c = self.arena.context(ctx)?;
        let space_id = c.float_space;
        let content_origin = c.content_origin;
        let width = c.box_model.content.width;
        let y_min = (c.cursor + c.last_v_margin).max(self.arena.float_space(space_id)?.ceiling());

        let origin = float::place(&exclusions, width, y_min, size, side);
        self.arena.float_space_mut(space_id)?.add(PlacedFloat {
            rect: Rect::from_origin_size(origin, size),
            side,
        });

        let border_origin = content_origin + origin + box_model.margin.top_left();
        let op = self.child_offset_parent(ctx)?;
        let (offset, offset_parent) = self.offset_from(op, border_origin)?;
        self.doc.set_offset(element, offset, offset_parent)?;
        Ok(())
    }

    /// Floats that constrain content placed in `ctx`, translated into its
    /// content coordinates. Ancestors contribute until a context that
    /// isolates its floats.
    pub(crate) fn float_exclusions(&self, ctx: NodeId) -> Result<Vec<PlacedFloat>, LayoutError> {
        let origin = self.arena.context(ctx)?.content_origin;
        let mut exclusions = Vec::new();
        let mut current = Some(ctx);
        while let Some(id) = current {
            let c = self.arena.context(id)?;
            let shift = c.content_origin - origin;
            exclusions.extend(
                self.arena
                    .float_space(c.float_space)?
                    .floats()
                    .iter()
                    .map(|placed| placed.translated(shift)),
            );
            if c.isolates_floats {
                break;
            }
            current = c.parent;
        }
        Ok(exclusions)
    }

    /// Moves the cursor of `ctx` down to at least `y`. Used by formatters
    /// that place content without opening child contexts.
    pub fn advance_cursor(&mut self, ctx: NodeId, y: f32) -> Result<(), LayoutError> {
        let c = self.arena.context_mut(ctx)?;
        c.cursor = c.cursor.max(y);
        Ok(())
    }

    /// Writes geometry for an element placed by a formatter, relative to
    /// the element's offset parent.
    pub fn set_element_geometry(
        &mut self,
        element: ElementId,
        box_model: BoxModel,
        offset: Vec2,
        offset_parent: Option<ElementId>,
    ) -> Result<(), LayoutError> {
        self.doc.set_box(element, box_model)?;
        self.doc.set_offset(element, offset, offset_parent)?;
        Ok(())
    }

    pub fn set_offset(
        &mut self,
        element: ElementId,
        offset: Vec2,
        offset_parent: Option<ElementId>,
    ) -> Result<(), LayoutError> {
        self.doc.set_offset(element, offset, offset_parent)?;
        Ok(())
    }

    pub fn notify_layout(&mut self, element: ElementId) -> Result<(), LayoutError> {
        self.doc.notify_layout(element)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{body_with, engine, init_logs, pos, size_of, take_warnings};

    #[test]
    fn rejects_invalid_containing_block() {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let result = engine().format_root(&mut doc, body, Size::new(f32::NAN, 10.0), None);
        assert!(matches!(result, Err(LayoutError::InvalidContainingBlock(_, _))));
        let result = engine().format_root(&mut doc, body, Size::new(-1.0, 10.0), None);
        assert!(matches!(result, Err(LayoutError::InvalidContainingBlock(_, _))));
    }

    #[test]
    fn blocks_stack_with_collapsed_margins() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let a = doc.create_styled("div", "height: 20px; margin-bottom: 10px", Some(body))?;
        let b = doc.create_styled("div", "height: 30px; margin-top: 15px", Some(body))?;
        let output = engine().format_root(&mut doc, body, Size::new(200.0, 500.0), None)?;

        assert_eq!(pos(&doc, a), Vec2::new(0.0, 0.0));
        assert_eq!(pos(&doc, b), Vec2::new(0.0, 35.0));
        assert_eq!(size_of(&doc, body), Size::new(200.0, 65.0));
        assert_eq!(output.visible_overflow, Size::new(200.0, 65.0));
        assert!(output.stats.single_pass());
        Ok(())
    }

    #[test]
    fn children_notify_before_parents() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let outer = doc.create_styled("div", "", Some(body))?;
        let inner = doc.create_styled("div", "height: 5px", Some(outer))?;
        engine().format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert_eq!(doc.layout_log(), &[inner, outer, body]);
        Ok(())
    }

    #[test]
    fn display_none_is_skipped() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let hidden = doc.create_styled("div", "display: none; height: 50px", Some(body))?;
        doc.create_styled("div", "height: 10px", Some(hidden))?;
        engine().format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert!(doc.layout(hidden)?.is_none());
        assert_eq!(size_of(&doc, body).height, 0.0);
        Ok(())
    }

    #[test]
    fn stray_table_cell_is_not_formatted() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let cell = doc.create_styled("div", "display: table-cell; height: 40px", Some(body))?;
        engine().format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert!(doc.layout(cell)?.is_none());
        assert_eq!(doc.layout_log(), &[body]);

        let warnings = take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'table-cell'"));
        assert!(warnings[0].contains("div < body"));
        Ok(())
    }

    #[test]
    fn hiding_a_laid_out_element_drops_its_layout() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let hidden = doc.create_styled("div", "height: 50px", Some(body))?;
        let child = doc.create_styled("div", "height: 10px", Some(hidden))?;
        let engine = engine();
        engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert_eq!(size_of(&doc, body).height, 50.0);

        doc.set_style(hidden, "display: none; height: 50px")?;
        engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;

        assert!(doc.layout(hidden)?.is_none());
        assert!(doc.layout(child)?.is_none());
        assert_eq!(size_of(&doc, body).height, 0.0);
        assert_eq!(doc.layout_log(), &[body]);
        Ok(())
    }

    #[test]
    fn each_pass_starts_a_fresh_layout_log() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let div = doc.create_styled("div", "height: 5px", Some(body))?;
        let engine = engine();
        engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert_eq!(doc.layout_log(), &[div, body]);
        assert_eq!(doc.get(div)?.layout_count(), 2);
        Ok(())
    }

    #[test]
    fn override_box_replaces_style() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        doc.set_style(body, "width: 50px; padding: 5px")?;
        let forced = BoxModel::from_content(Size::new(80.0, 30.0));
        engine().format_root(&mut doc, body, Size::new(100.0, 100.0), Some(forced))?;
        assert_eq!(size_of(&doc, body), Size::new(80.0, 30.0));
        Ok(())
    }

    #[test]
    fn arena_is_empty_after_pass() -> Result<(), LayoutError> {
        init_logs();
        let engine = engine();
        let (mut doc, body) = body_with(&["a b c", "d e f"]);
        let output = engine.format_root(&mut doc, body, Size::new(100.0, 100.0), None)?;
        assert!(output.stats.nodes_acquired > 0);
        assert_eq!(engine.pool().idle_slabs(), 1);
        let arena = engine.pool().checkout();
        assert_eq!(arena.live(), 0);
        Ok(())
    }
}
