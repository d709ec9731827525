//! Computed style values: declared properties layered over per-tag defaults,
//! with the font metrics inherited from the parent.

use crate::dimension::{Dimension, DimensionEdges};
use crate::display::{BoxSizing, Display, Float, Overflow, Position};
use crate::property::{PropertyId, PropertyMap, PropertyValue};
use boxflow_types::Edges;

pub const DEFAULT_FONT_SIZE: f32 = 16.0;
const NORMAL_LINE_HEIGHT: f32 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedValues {
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,
    pub box_sizing: BoxSizing,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    /// `Auto` means no limit.
    pub max_width: Dimension,
    pub min_height: Dimension,
    /// `Auto` means no limit.
    pub max_height: Dimension,
    pub margin: DimensionEdges,
    pub padding: DimensionEdges,
    pub border_width: Edges,
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
    pub font_size: f32,
    line_height: Option<f32>,
}

impl Default for ComputedValues {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            box_sizing: BoxSizing::ContentBox,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Px(0.0),
            max_width: Dimension::Auto,
            min_height: Dimension::Px(0.0),
            max_height: Dimension::Auto,
            margin: DimensionEdges::zero(),
            padding: DimensionEdges::zero(),
            border_width: Edges::zero(),
            top: Dimension::Auto,
            right: Dimension::Auto,
            bottom: Dimension::Auto,
            left: Dimension::Auto,
            font_size: DEFAULT_FONT_SIZE,
            line_height: None,
        }
    }
}

impl ComputedValues {
    /// User-agent defaults for a tag name.
    pub fn for_tag(tag: &str) -> Self {
        let display = match tag {
            "div" | "p" | "body" | "html" | "section" | "ul" | "li" | "h1" | "h2" | "h3" => {
                Display::Block
            }
            "table" => Display::Table,
            "tr" => Display::TableRow,
            "tbody" | "thead" | "tfoot" => Display::TableRowGroup,
            "td" | "th" => Display::TableCell,
            "col" => Display::TableColumn,
            "colgroup" => Display::TableColumnGroup,
            _ => Display::Inline,
        };
        Self {
            display,
            ..Default::default()
        }
    }

    /// Resolves declared properties for `tag` under `parent`.
    pub fn cascade(declared: &PropertyMap, tag: &str, parent: Option<&ComputedValues>) -> Self {
        let mut values = Self::for_tag(tag);
        if let Some(parent) = parent {
            values.font_size = parent.font_size;
            values.line_height = parent.line_height;
        }

        for property in declared.iter() {
            values.apply(property.id, property.value);
        }

        // Floated and absolutely positioned boxes are blockified.
        if (values.float != Float::None || values.position.is_out_of_flow())
            && matches!(values.display, Display::Inline | Display::InlineBlock)
        {
            values.display = Display::Block;
        }
        values
    }

    fn apply(&mut self, id: PropertyId, value: PropertyValue) {
        match (id, value) {
            (PropertyId::Display, PropertyValue::Display(v)) => self.display = v,
            (PropertyId::Position, PropertyValue::Position(v)) => self.position = v,
            (PropertyId::Float, PropertyValue::Float(v)) => self.float = v,
            (PropertyId::OverflowX, PropertyValue::Overflow(v)) => self.overflow_x = v,
            (PropertyId::OverflowY, PropertyValue::Overflow(v)) => self.overflow_y = v,
            (PropertyId::BoxSizing, PropertyValue::BoxSizing(v)) => self.box_sizing = v,
            (PropertyId::Width, PropertyValue::Dimension(v)) => self.width = v,
            (PropertyId::Height, PropertyValue::Dimension(v)) => self.height = v,
            (PropertyId::MinWidth, PropertyValue::Dimension(v)) => self.min_width = v,
            (PropertyId::MaxWidth, PropertyValue::Dimension(v)) => self.max_width = v,
            (PropertyId::MinHeight, PropertyValue::Dimension(v)) => self.min_height = v,
            (PropertyId::MaxHeight, PropertyValue::Dimension(v)) => self.max_height = v,
            (PropertyId::Margin, PropertyValue::Edges(v)) => self.margin = v,
            (PropertyId::Padding, PropertyValue::Edges(v)) => self.padding = v,
            (PropertyId::BorderWidth, PropertyValue::Edges(v)) => {
                self.border_width = Edges {
                    top: v.top.resolve_or(0.0, 0.0),
                    right: v.right.resolve_or(0.0, 0.0),
                    bottom: v.bottom.resolve_or(0.0, 0.0),
                    left: v.left.resolve_or(0.0, 0.0),
                }
            }
            (PropertyId::Top, PropertyValue::Dimension(v)) => self.top = v,
            (PropertyId::Right, PropertyValue::Dimension(v)) => self.right = v,
            (PropertyId::Bottom, PropertyValue::Dimension(v)) => self.bottom = v,
            (PropertyId::Left, PropertyValue::Dimension(v)) => self.left = v,
            (PropertyId::FontSize, PropertyValue::Number(v)) => self.font_size = v.max(0.0),
            (PropertyId::LineHeight, PropertyValue::Dimension(v)) => {
                self.line_height = match v {
                    Dimension::Auto => None,
                    Dimension::Px(px) => Some(px),
                    Dimension::Percent(p) => Some(self.font_size * p / 100.0),
                }
            }
            _ => {}
        }
    }

    /// The used line height in pixels; `normal` is 1.2 times the font size.
    pub fn line_height(&self) -> f32 {
        self.line_height
            .unwrap_or(self.font_size * NORMAL_LINE_HEIGHT)
    }

    pub fn is_positioned(&self) -> bool {
        self.position != Position::Static
    }
}
