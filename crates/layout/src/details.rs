//! Box metrics: resolves an element's box model and height limits from its
//! computed values and the size of its containing block.

use crate::LayoutError;
use crate::text::TextMeasure;
use boxflow_dom::{Document, ElementId};
use boxflow_style::{BoxSizing, ComputedValues, Dimension, Display, Float};
use boxflow_types::{BoxModel, ContainingBlock, Edges, Size};

/// How an element's width is resolved when it is `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxContext {
    /// Fill the containing block.
    Block,
    /// Sized by the inline content it wraps; only horizontal edges apply.
    Inline,
    /// Floats, inline-blocks and absolutes: as wide as the content wants,
    /// but no wider than the containing block.
    ShrinkToFit,
}

fn resolve_edges(edges: [Dimension; 4], base: f32) -> Edges {
    Edges {
        top: edges[0].resolve_or(base, 0.0),
        right: edges[1].resolve_or(base, 0.0),
        bottom: edges[2].resolve_or(base, 0.0),
        left: edges[3].resolve_or(base, 0.0),
    }
}

pub fn build_box(
    cb: ContainingBlock,
    doc: &Document,
    element: ElementId,
    context: BoxContext,
    measure: &dyn TextMeasure,
) -> Result<BoxModel, LayoutError> {
    let computed = doc.computed(element)?;
    let m = computed.margin;
    let p = computed.padding;
    let padding = resolve_edges([p.top, p.right, p.bottom, p.left], cb.width);
    let mut margin = resolve_edges([m.top, m.right, m.bottom, m.left], cb.width);
    let border = computed.border_width;
    let border_box = computed.box_sizing == BoxSizing::BorderBox;

    let mut box_model = BoxModel {
        content: Size::zero(),
        padding,
        border,
        margin,
        auto_width: true,
        auto_height: true,
    };
    if context == BoxContext::Inline {
        box_model.margin.top = 0.0;
        box_model.margin.bottom = 0.0;
        return Ok(box_model);
    }

    let frame_x = box_model.frame_x();
    let frame_y = box_model.frame_y();
    let available = (cb.width - margin.horizontal() - frame_x).max(0.0);

    let width = match computed.width.resolve(Some(cb.width)) {
        Some(w) => {
            box_model.auto_width = false;
            if border_box { w - frame_x } else { w }
        }
        None => match context {
            BoxContext::ShrinkToFit => match stretched(computed, cb.width, computed.left, computed.right) {
                Some(outer) => outer - margin.horizontal() - frame_x,
                None => max_content_width(doc, element, measure)?.min(available),
            },
            _ => available,
        },
    };
    box_model.content.width = clamp_width(computed, width.max(0.0), cb.width, frame_x);

    if context == BoxContext::Block && !box_model.auto_width {
        let remaining = cb.width - box_model.content.width - frame_x;
        match (m.left.is_auto(), m.right.is_auto()) {
            (true, true) => {
                margin.left = (remaining / 2.0).max(0.0);
                margin.right = margin.left;
            }
            (true, false) => margin.left = (remaining - margin.right).max(0.0),
            (false, true) => margin.right = (remaining - margin.left).max(0.0),
            (false, false) => {}
        }
        box_model.margin = margin;
    }

    let height = match computed.height.resolve(cb.height) {
        Some(h) => Some(if border_box { h - frame_y } else { h }),
        None if context == BoxContext::ShrinkToFit => cb
            .height
            .and_then(|base| stretched(computed, base, computed.top, computed.bottom))
            .map(|outer| outer - margin.vertical() - frame_y),
        None => None,
    };
    if let Some(h) = height {
        box_model.auto_height = false;
        box_model.content.height = h.max(0.0);
    }
    Ok(box_model)
}

/// The outer size of an out-of-flow box pinned by both opposing offsets.
fn stretched(computed: &ComputedValues, base: f32, start: Dimension, end: Dimension) -> Option<f32> {
    if !computed.position.is_out_of_flow() {
        return None;
    }
    let start = start.resolve(Some(base))?;
    let end = end.resolve(Some(base))?;
    Some((base - start - end).max(0.0))
}

fn clamp_width(computed: &ComputedValues, width: f32, base: f32, frame_x: f32) -> f32 {
    let adjust = |v: f32| {
        if computed.box_sizing == BoxSizing::BorderBox {
            (v - frame_x).max(0.0)
        } else {
            v
        }
    };
    let min = computed.min_width.resolve(Some(base)).map(adjust).unwrap_or(0.0);
    let max = computed
        .max_width
        .resolve(Some(base))
        .map(adjust)
        .unwrap_or(f32::INFINITY)
        .max(min);
    width.clamp(min, max)
}

/// Resolves min/max content height. A definite height pins both limits to
/// itself (after clamping).
pub fn min_max_height(computed: &ComputedValues, box_model: &BoxModel, cb_height: Option<f32>) -> (f32, f32) {
    let adjust = |v: f32| {
        if computed.box_sizing == BoxSizing::BorderBox {
            (v - box_model.frame_y()).max(0.0)
        } else {
            v
        }
    };
    let min = computed.min_height.resolve(cb_height).map(adjust).unwrap_or(0.0);
    let max = computed
        .max_height
        .resolve(cb_height)
        .map(adjust)
        .unwrap_or(f32::INFINITY)
        .max(min);
    if box_model.auto_height {
        (min, max)
    } else {
        let h = box_model.content.height.clamp(min, max);
        (h, h)
    }
}

/// [`build_box`] followed by [`min_max_height`], with a definite height
/// already clamped into its limits.
pub fn build_box_with_limits(
    cb: ContainingBlock,
    doc: &Document,
    element: ElementId,
    context: BoxContext,
    measure: &dyn TextMeasure,
) -> Result<(BoxModel, f32, f32), LayoutError> {
    let mut box_model = build_box(cb, doc, element, context, measure)?;
    let (min, max) = min_max_height(doc.computed(element)?, &box_model, cb.height);
    if !box_model.auto_height {
        box_model.content.height = min;
    }
    Ok((box_model, min, max))
}

fn px(d: Dimension) -> f32 {
    d.resolve(None).unwrap_or(0.0)
}

fn inline_frame(c: &ComputedValues) -> f32 {
    px(c.margin.left) + px(c.margin.right) + px(c.padding.left) + px(c.padding.right) + c.border_width.horizontal()
}

/// Margin-box width a child wants when nothing wraps.
fn outer_max_content(doc: &Document, element: ElementId, measure: &dyn TextMeasure) -> Result<f32, LayoutError> {
    let c = doc.computed(element)?;
    let margins = px(c.margin.left) + px(c.margin.right);
    let frame = inline_frame(c) - margins;
    let border_box = match c.width.resolve(None) {
        Some(w) if c.box_sizing == BoxSizing::BorderBox => w,
        Some(w) => w + frame,
        None => max_content_width(doc, element, measure)? + frame,
    };
    Ok(border_box + margins)
}

/// A cheap max-content estimate of an element's content width: the widest
/// line its children would produce with no wrapping. Spaces between words
/// follow the same rule as line filling.
pub fn max_content_width(doc: &Document, element: ElementId, measure: &dyn TextMeasure) -> Result<f32, LayoutError> {
    let mut widest = 0.0f32;
    let mut line = 0.0f32;
    let mut pending_space = false;
    for &child in doc.children(element)? {
        let node = doc.get(child)?;
        let c = node.computed();
        if c.display == Display::None || c.position.is_out_of_flow() {
            continue;
        }
        if let Some(text) = node.text() {
            let words = text.split_whitespace().count();
            if words > 0 {
                let leading = text.starts_with(char::is_whitespace);
                if line > 0.0 && (pending_space || leading) {
                    line += measure.advance(' ', c.font_size);
                }
                line += measure.measure_collapsed(text, c.font_size);
            }
            pending_space = words > 0 && text.ends_with(char::is_whitespace);
            continue;
        }
        if node.tag() == "br" {
            widest = widest.max(line);
            line = 0.0;
            pending_space = false;
            continue;
        }
        if c.float != Float::None || c.display == Display::InlineBlock {
            line += outer_max_content(doc, child, measure)?;
            pending_space = false;
            continue;
        }
        match c.display {
            Display::Inline => line += inline_frame(c) + max_content_width(doc, child, measure)?,
            _ => {
                widest = widest.max(line).max(outer_max_content(doc, child, measure)?);
                line = 0.0;
                pending_space = false;
            }
        }
    }
    Ok(widest.max(line))
}
