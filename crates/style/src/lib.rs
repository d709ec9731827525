pub mod computed;
pub mod dimension;
pub mod display;
pub mod parsers;
pub mod property;

pub use computed::ComputedValues;
pub use dimension::{Dimension, DimensionEdges};
pub use display::{BoxSizing, Display, Float, Overflow, Position};
pub use parsers::{StyleParseError, parse_declarations};
pub use property::{Property, PropertyId, PropertyMap, PropertyValue};
