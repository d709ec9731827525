//! Defines primitives for size, position, and spacing.
use crate::parsers::{parse_dimension, parse_edge_shorthand, run_parser};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Px(f32),
    Percent(f32),
    #[default]
    Auto,
}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Dimension::Px(v) => {
                0u8.hash(state);
                v.to_bits().hash(state);
            }
            Dimension::Percent(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
            Dimension::Auto => {
                2u8.hash(state);
            }
        }
    }
}

impl Eq for Dimension {}

impl Dimension {
    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }

    /// Resolves against `base`; percentages of an indefinite base, like
    /// `auto`, yield `None`.
    pub fn resolve(&self, base: Option<f32>) -> Option<f32> {
        match *self {
            Dimension::Px(v) => Some(v),
            Dimension::Percent(p) => base.map(|b| b * p / 100.0),
            Dimension::Auto => None,
        }
    }

    /// Resolves against a definite base, mapping `auto` to `auto_value`.
    pub fn resolve_or(&self, base: f32, auto_value: f32) -> f32 {
        self.resolve(Some(base)).unwrap_or(auto_value)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Px(v) => write!(f, "{}px", v),
            Dimension::Percent(v) => write!(f, "{}%", v),
            Dimension::Auto => f.write_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DimensionVisitor;
        impl<'de> de::Visitor<'de> for DimensionVisitor {
            type Value = Dimension;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number of pixels or a string like '10px', '50%' or 'auto'")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Dimension, E>
            where
                E: de::Error,
            {
                Ok(Dimension::Px(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Dimension, E>
            where
                E: de::Error,
            {
                Ok(Dimension::Px(value as f32))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Dimension, E>
            where
                E: de::Error,
            {
                Ok(Dimension::Px(value as f32))
            }

            fn visit_str<E>(self, value: &str) -> Result<Dimension, E>
            where
                E: de::Error,
            {
                run_parser(parse_dimension, value.trim()).map_err(E::custom)
            }
        }
        deserializer.deserialize_any(DimensionVisitor)
    }
}

/// Per-side dimensions for margins and padding. Margins may be `auto`.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionEdges {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

impl DimensionEdges {
    pub fn all(value: Dimension) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn px(value: f32) -> Self {
        Self::all(Dimension::Px(value))
    }

    pub fn zero() -> Self {
        Self::px(0.0)
    }

    pub fn x(value: Dimension) -> Self {
        Self {
            top: Dimension::Px(0.0),
            right: value,
            bottom: Dimension::Px(0.0),
            left: value,
        }
    }

    pub fn y(value: Dimension) -> Self {
        Self {
            top: value,
            right: Dimension::Px(0.0),
            bottom: value,
            left: Dimension::Px(0.0),
        }
    }
}

impl<'de> Deserialize<'de> for DimensionEdges {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EdgesVisitor;
        impl<'de> de::Visitor<'de> for EdgesVisitor {
            type Value = DimensionEdges;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string like '10px' or '10px auto' or a map")
            }

            fn visit_f64<E>(self, value: f64) -> Result<DimensionEdges, E>
            where
                E: de::Error,
            {
                Ok(DimensionEdges::px(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<DimensionEdges, E>
            where
                E: de::Error,
            {
                Ok(DimensionEdges::px(value as f32))
            }

            fn visit_str<E>(self, value: &str) -> Result<DimensionEdges, E>
            where
                E: de::Error,
            {
                parse_edge_shorthand(value).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<DimensionEdges, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut edges = DimensionEdges::zero();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "top" => edges.top = map.next_value()?,
                        "right" => edges.right = map.next_value()?,
                        "bottom" => edges.bottom = map.next_value()?,
                        "left" => edges.left = map.next_value()?,
                        _ => { /* ignore unknown fields */ }
                    }
                }
                Ok(edges)
            }
        }
        deserializer.deserialize_any(EdgesVisitor)
    }
}
