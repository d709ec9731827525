//! Table formatting.
//!
//! The dispatcher only owns the retry loop around a table; the geometry of
//! rows and cells comes from a [`TableFormatter`]. The built-in
//! [`GridTableFormatter`] is a plain grid: explicit column widths first, the
//! rest shared equally, every row as tall as its tallest cell.

use crate::LayoutError;
use crate::context::CloseResult;
use crate::details::{self, BoxContext};
use crate::engine::LayoutPass;
use crate::pool::NodeId;
use boxflow_dom::ElementId;
use boxflow_style::Display;
use boxflow_types::{BoxArea, BoxModel, ContainingBlock, Edges, Size, Vec2};

pub trait TableFormatter: Send + Sync {
    /// Lays out the rows of `table` into its already opened context `ctx`,
    /// then closes `ctx` and returns the close result.
    fn format_table(&self, pass: &mut LayoutPass<'_>, ctx: NodeId, table: ElementId)
    -> Result<CloseResult, LayoutError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridTableFormatter;

#[derive(Debug)]
struct RowPlan {
    row: ElementId,
    group: Option<ElementId>,
    cells: Vec<ElementId>,
}

fn collect_rows(pass: &LayoutPass<'_>, table: ElementId) -> Result<Vec<RowPlan>, LayoutError> {
    let doc = pass.document();
    let mut rows = Vec::new();
    let mut add_row = |row: ElementId, group: Option<ElementId>| -> Result<(), LayoutError> {
        let mut cells = Vec::new();
        for &cell in doc.children(row)? {
            match doc.computed(cell)?.display {
                Display::TableCell => cells.push(cell),
                Display::None => {}
                other => log::warn!(
                    "Element {} has display '{}' inside a table row; skipping",
                    doc.address(cell),
                    other.as_str()
                ),
            }
        }
        rows.push(RowPlan { row, group, cells });
        Ok(())
    };

    for &child in doc.children(table)? {
        match doc.computed(child)?.display {
            Display::TableRow => add_row(child, None)?,
            Display::TableRowGroup => {
                for &row in doc.children(child)? {
                    if doc.computed(row)?.display == Display::TableRow {
                        add_row(row, Some(child))?;
                    }
                }
            }
            Display::TableColumn | Display::TableColumnGroup | Display::None => {}
            other => log::warn!(
                "Element {} has display '{}' inside a table; skipping",
                doc.address(child),
                other.as_str()
            ),
        }
    }
    Ok(rows)
}

/// Border-box widths of the columns: the first cell with a definite width
/// fixes its column, the other columns share what is left.
fn column_widths(pass: &LayoutPass<'_>, rows: &[RowPlan], available: f32) -> Result<Vec<f32>, LayoutError> {
    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let mut explicit: Vec<Option<f32>> = vec![None; columns];
    let cb = ContainingBlock::new(available, None);
    for row in rows {
        for (i, &cell) in row.cells.iter().enumerate() {
            if explicit[i].is_some() {
                continue;
            }
            let b = details::build_box(cb, pass.document(), cell, BoxContext::Block, pass.text_measure())?;
            if !b.auto_width {
                explicit[i] = Some(b.size(BoxArea::Border).width);
            }
        }
    }

    let fixed: f32 = explicit.iter().flatten().sum();
    let auto_columns = explicit.iter().filter(|w| w.is_none()).count();
    let share = if auto_columns > 0 {
        (available - fixed).max(0.0) / auto_columns as f32
    } else {
        0.0
    };
    Ok(explicit.into_iter().map(|w| w.unwrap_or(share)).collect())
}

impl GridTableFormatter {
    /// Formats the cells of one row as independent roots and returns the
    /// row height with each cell's x offset and box.
    fn format_row(
        &self,
        pass: &mut LayoutPass<'_>,
        plan: &RowPlan,
        widths: &[f32],
    ) -> Result<(f32, Vec<(ElementId, f32, BoxModel)>), LayoutError> {
        let mut x = 0.0;
        let mut height = pass
            .document()
            .computed(plan.row)?
            .height
            .resolve(None)
            .unwrap_or(0.0);
        let mut cells = Vec::with_capacity(plan.cells.len());

        for (&cell, &width) in plan.cells.iter().zip(widths) {
            let cb = ContainingBlock::new(width, None);
            let mut b = details::build_box(cb, pass.document(), cell, BoxContext::Block, pass.text_measure())?;
            b.margin = Edges::zero();
            b.content.width = (width - b.frame_x()).max(0.0);
            b.auto_width = false;
            pass.format_root_in(cell, cb, Some(b), BoxContext::Block)?;

            let laid_out = pass
                .document()
                .layout(cell)?
                .map(|layout| layout.box_model)
                .unwrap_or(b);
            height = height.max(laid_out.size(BoxArea::Border).height);
            cells.push((cell, x, laid_out));
            x += width;
        }
        Ok((height, cells))
    }
}

impl TableFormatter for GridTableFormatter {
    fn format_table(
        &self,
        pass: &mut LayoutPass<'_>,
        ctx: NodeId,
        table: ElementId,
    ) -> Result<CloseResult, LayoutError> {
        let rows = collect_rows(pass, table)?;
        let c = pass.context(ctx)?;
        let width = c.box_model.content.width;
        let content_offset = c.box_model.content_offset(BoxArea::Border);
        let start = c.cursor;
        let widths = column_widths(pass, &rows, width)?;
        log::debug!(
            "Table {} has {} rows in {} columns",
            pass.document().address(table),
            rows.len(),
            widths.len()
        );

        let mut y = start;
        let mut group_start = start;
        for (i, plan) in rows.iter().enumerate() {
            if i == 0 || rows[i - 1].group != plan.group {
                group_start = y;
            }
            let (row_height, cells) = self.format_row(pass, plan, &widths)?;

            for (cell, x, mut b) in cells {
                let border_height = b.size(BoxArea::Border).height;
                if b.auto_height && border_height < row_height {
                    b.content.height += row_height - border_height;
                }
                pass.set_element_geometry(cell, b, Vec2::new(x, 0.0), Some(plan.row))?;
            }

            let row_box = BoxModel::from_content(Size::new(width, row_height));
            let (offset, parent) = match plan.group {
                Some(group) => (Vec2::new(0.0, y - group_start), group),
                None => (content_offset + Vec2::new(0.0, y), table),
            };
            pass.set_element_geometry(plan.row, row_box, offset, Some(parent))?;
            pass.notify_layout(plan.row)?;
            y += row_height;

            let group_ends = rows.get(i + 1).is_none_or(|next| next.group != plan.group);
            if let (Some(group), true) = (plan.group, group_ends) {
                let group_box = BoxModel::from_content(Size::new(width, y - group_start));
                let offset = content_offset + Vec2::new(0.0, group_start);
                pass.set_element_geometry(group, group_box, offset, Some(table))?;
                pass.notify_layout(group)?;
            }
        }

        pass.advance_cursor(ctx, y)?;
        pass.close(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::LayoutError;
    use crate::test_utils::{body_with, engine, init_logs, pos, size_of};
    use boxflow_types::{Size, Vec2};

    #[test]
    fn explicit_columns_keep_their_width() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let table = doc.create_styled("table", "", Some(body))?;
        let mut cells = Vec::new();
        for _ in 0..2 {
            let row = doc.create_styled("tr", "", Some(table))?;
            let first = doc.create_styled("td", "width: 50px", Some(row))?;
            doc.create_text(first, "a")?;
            let second = doc.create_styled("td", "", Some(row))?;
            doc.create_text(second, "b")?;
            cells.push((first, second));
        }
        engine().format_root(&mut doc, body, Size::new(200.0, 200.0), None)?;

        let (a, b) = cells[1];
        assert_eq!(pos(&doc, a), Vec2::new(0.0, 12.0));
        assert_eq!(pos(&doc, b), Vec2::new(50.0, 12.0));
        assert_eq!(size_of(&doc, b), Size::new(150.0, 12.0));
        assert_eq!(size_of(&doc, table), Size::new(200.0, 24.0));
        Ok(())
    }

    #[test]
    fn auto_cells_stretch_to_row_height() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let table = doc.create_styled("table", "", Some(body))?;
        let row = doc.create_styled("tr", "", Some(table))?;
        let tall = doc.create_styled("td", "height: 40px", Some(row))?;
        let short = doc.create_styled("td", "", Some(row))?;
        doc.create_text(short, "x")?;
        engine().format_root(&mut doc, body, Size::new(100.0, 200.0), None)?;

        assert_eq!(size_of(&doc, tall).height, 40.0);
        assert_eq!(size_of(&doc, short).height, 40.0);
        assert_eq!(size_of(&doc, row), Size::new(100.0, 40.0));
        Ok(())
    }

    #[test]
    fn rows_in_groups_notify_inside_out() -> Result<(), LayoutError> {
        init_logs();
        let (mut doc, body) = body_with(&[]);
        let table = doc.create_styled("table", "padding: 5px", Some(body))?;
        let group = doc.create_styled("tbody", "", Some(table))?;
        let row = doc.create_styled("tr", "height: 20px", Some(group))?;
        let cell = doc.create_styled("td", "", Some(row))?;
        engine().format_root(&mut doc, body, Size::new(100.0, 200.0), None)?;

        assert_eq!(doc.layout_log(), &[cell, row, group, table, body]);
        assert_eq!(pos(&doc, row), Vec2::new(5.0, 5.0));
        assert_eq!(size_of(&doc, group), Size::new(90.0, 20.0));
        assert_eq!(size_of(&doc, table), Size::new(100.0, 30.0));
        Ok(())
    }
}
