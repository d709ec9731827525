//! Declared (specified) property values, kept alongside the computed values
//! so diagnostics can report exactly what an author wrote.

use crate::dimension::{Dimension, DimensionEdges};
use crate::display::{BoxSizing, Display, Float, Overflow, Position};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Display,
    Position,
    Float,
    OverflowX,
    OverflowY,
    BoxSizing,
    Width,
    Height,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    Margin,
    Padding,
    BorderWidth,
    Top,
    Right,
    Bottom,
    Left,
    FontSize,
    LineHeight,
}

impl PropertyId {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "display" => PropertyId::Display,
            "position" => PropertyId::Position,
            "float" => PropertyId::Float,
            "overflow-x" => PropertyId::OverflowX,
            "overflow-y" => PropertyId::OverflowY,
            "box-sizing" => PropertyId::BoxSizing,
            "width" => PropertyId::Width,
            "height" => PropertyId::Height,
            "min-width" => PropertyId::MinWidth,
            "max-width" => PropertyId::MaxWidth,
            "min-height" => PropertyId::MinHeight,
            "max-height" => PropertyId::MaxHeight,
            "margin" => PropertyId::Margin,
            "padding" => PropertyId::Padding,
            "border-width" => PropertyId::BorderWidth,
            "top" => PropertyId::Top,
            "right" => PropertyId::Right,
            "bottom" => PropertyId::Bottom,
            "left" => PropertyId::Left,
            "font-size" => PropertyId::FontSize,
            "line-height" => PropertyId::LineHeight,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyId::Display => "display",
            PropertyId::Position => "position",
            PropertyId::Float => "float",
            PropertyId::OverflowX => "overflow-x",
            PropertyId::OverflowY => "overflow-y",
            PropertyId::BoxSizing => "box-sizing",
            PropertyId::Width => "width",
            PropertyId::Height => "height",
            PropertyId::MinWidth => "min-width",
            PropertyId::MaxWidth => "max-width",
            PropertyId::MinHeight => "min-height",
            PropertyId::MaxHeight => "max-height",
            PropertyId::Margin => "margin",
            PropertyId::Padding => "padding",
            PropertyId::BorderWidth => "border-width",
            PropertyId::Top => "top",
            PropertyId::Right => "right",
            PropertyId::Bottom => "bottom",
            PropertyId::Left => "left",
            PropertyId::FontSize => "font-size",
            PropertyId::LineHeight => "line-height",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Display(Display),
    Position(Position),
    Float(Float),
    Overflow(Overflow),
    BoxSizing(BoxSizing),
    Dimension(Dimension),
    Edges(DimensionEdges),
    Number(f32),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Display(v) => f.write_str(v.as_str()),
            PropertyValue::Position(v) => f.write_str(v.as_str()),
            PropertyValue::Float(v) => f.write_str(v.as_str()),
            PropertyValue::Overflow(v) => f.write_str(v.as_str()),
            PropertyValue::BoxSizing(v) => f.write_str(v.as_str()),
            PropertyValue::Dimension(v) => write!(f, "{}", v),
            PropertyValue::Edges(e) => write!(f, "{} {} {} {}", e.top, e.right, e.bottom, e.left),
            PropertyValue::Number(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    pub value: PropertyValue,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Declared properties in source order; later declarations replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    properties: Vec<Property>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: PropertyId, value: PropertyValue) {
        match self.properties.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.value = value,
            None => self.properties.push(Property { id, value }),
        }
    }

    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn extend(&mut self, other: &PropertyMap) {
        for p in other.iter() {
            self.set(p.id, p.value);
        }
    }
}
