//! Low-level nom parser functions for CSS-like style values.
//!
//! Lengths are pixels; a bare number is read as pixels too. Declarations are
//! parsed from inline `style="key: value; ..."` strings into a [`PropertyMap`].

use crate::dimension::{Dimension, DimensionEdges};
use crate::display::{BoxSizing, Display, Float, Overflow, Position};
use crate::property::{PropertyId, PropertyMap, PropertyValue};
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, digit1, space1};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::{IResult, Parser};
use thiserror::Error;

/// Errors that can occur during style parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleParseError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{property}': {value}")]
    InvalidValue { property: String, value: String },

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),
}

// --- Numeric Parsers ---

pub fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

/// Parses a length in pixels (e.g. "12px", "12").
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    map((parse_f32, opt(tag_no_case("px"))), |(px, _)| px).parse(input)
}

/// Parses a dimension value (length, percentage, or "auto").
pub fn parse_dimension(input: &str) -> IResult<&str, Dimension> {
    alt((
        value(Dimension::Auto, tag_no_case("auto")),
        map((parse_f32, char('%')), |(v, _)| Dimension::Percent(v)),
        map(parse_length, Dimension::Px),
    ))
    .parse(input)
}

/// Like [`parse_dimension`], with `none` meaning "no limit" for max sizes.
fn parse_max_dimension(input: &str) -> IResult<&str, Dimension> {
    alt((value(Dimension::Auto, tag_no_case("none")), parse_dimension)).parse(input)
}

/// Parses CSS edge shorthands (1 to 4 values) for margin, padding and
/// border widths.
pub fn parse_edge_shorthand(input: &str) -> Result<DimensionEdges, StyleParseError> {
    let parts = run_parser(
        |i| separated_list1(space1, parse_dimension).parse(i),
        input,
    )?;
    match parts.as_slice() {
        [all] => Ok(DimensionEdges::all(*all)),
        [y, x] => Ok(DimensionEdges {
            top: *y,
            right: *x,
            bottom: *y,
            left: *x,
        }),
        [top, x, bottom] => Ok(DimensionEdges {
            top: *top,
            right: *x,
            bottom: *bottom,
            left: *x,
        }),
        [top, right, bottom, left] => Ok(DimensionEdges {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => Err(StyleParseError::Parse(format!(
            "Invalid number of values for edge shorthand: got {}, expected 1 to 4.",
            parts.len()
        ))),
    }
}

/// Helper to run a nom parser and convert its result to a `Result<T, StyleParseError>`.
pub fn run_parser<'a, T, F>(parser: F, input: &'a str) -> Result<T, StyleParseError>
where
    F: Fn(&'a str) -> IResult<&'a str, T>,
{
    match parser(input.trim()) {
        Ok(("", result)) => Ok(result),
        Ok((rem, _)) => Err(StyleParseError::Parse(format!(
            "Parser did not consume all input. Remainder: '{}'",
            rem
        ))),
        Err(e) => Err(StyleParseError::Parse(e.to_string())),
    }
}

// --- Declarations ---

fn keyword<T>(
    property: &str,
    value: &str,
    from_keyword: fn(&str) -> Option<T>,
) -> Result<T, StyleParseError> {
    from_keyword(&value.to_ascii_lowercase()).ok_or_else(|| StyleParseError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    })
}

fn invalid(property: &str, value: &str) -> StyleParseError {
    StyleParseError::InvalidValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}

/// Parses the value of a single known property.
pub fn parse_property_value(id: PropertyId, value: &str) -> Result<PropertyValue, StyleParseError> {
    let name = id.name();
    let dimension = |v: &str| run_parser(parse_dimension, v).map_err(|_| invalid(name, v));
    Ok(match id {
        PropertyId::Display => PropertyValue::Display(keyword(name, value, Display::from_keyword)?),
        PropertyId::Position => {
            PropertyValue::Position(keyword(name, value, Position::from_keyword)?)
        }
        PropertyId::Float => PropertyValue::Float(keyword(name, value, Float::from_keyword)?),
        PropertyId::OverflowX | PropertyId::OverflowY => {
            PropertyValue::Overflow(keyword(name, value, Overflow::from_keyword)?)
        }
        PropertyId::BoxSizing => {
            PropertyValue::BoxSizing(keyword(name, value, BoxSizing::from_keyword)?)
        }
        PropertyId::Width
        | PropertyId::Height
        | PropertyId::MinWidth
        | PropertyId::MinHeight
        | PropertyId::Top
        | PropertyId::Right
        | PropertyId::Bottom
        | PropertyId::Left => PropertyValue::Dimension(dimension(value)?),
        PropertyId::MaxWidth | PropertyId::MaxHeight => PropertyValue::Dimension(
            run_parser(parse_max_dimension, value).map_err(|_| invalid(name, value))?,
        ),
        PropertyId::LineHeight => {
            if value.trim().eq_ignore_ascii_case("normal") {
                PropertyValue::Dimension(Dimension::Auto)
            } else {
                PropertyValue::Dimension(dimension(value)?)
            }
        }
        PropertyId::Margin | PropertyId::Padding => {
            PropertyValue::Edges(parse_edge_shorthand(value).map_err(|_| invalid(name, value))?)
        }
        PropertyId::BorderWidth => {
            let edges = parse_edge_shorthand(value).map_err(|_| invalid(name, value))?;
            let sides = [edges.top, edges.right, edges.bottom, edges.left];
            if sides.iter().any(|d| !matches!(d, Dimension::Px(_))) {
                return Err(invalid(name, value));
            }
            PropertyValue::Edges(edges)
        }
        PropertyId::FontSize => PropertyValue::Number(
            run_parser(parse_length, value).map_err(|_| invalid(name, value))?,
        ),
    })
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

fn edge_longhand(name: &str) -> Option<(PropertyId, Side)> {
    let (base, side) = name.rsplit_once('-')?;
    let id = match base {
        "margin" => PropertyId::Margin,
        "padding" => PropertyId::Padding,
        _ => return None,
    };
    let side = match side {
        "top" => Side::Top,
        "right" => Side::Right,
        "bottom" => Side::Bottom,
        "left" => Side::Left,
        _ => return None,
    };
    Some((id, side))
}

/// Applies one `name: value` declaration to `map`, expanding shorthands.
pub fn apply_declaration(
    map: &mut PropertyMap,
    name: &str,
    value: &str,
) -> Result<(), StyleParseError> {
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim();

    if name == "overflow" {
        let overflow = PropertyValue::Overflow(keyword(&name, value, Overflow::from_keyword)?);
        map.set(PropertyId::OverflowX, overflow);
        map.set(PropertyId::OverflowY, overflow);
        return Ok(());
    }

    if let Some((id, side)) = edge_longhand(&name) {
        let parsed = run_parser(parse_dimension, value).map_err(|_| invalid(&name, value))?;
        let mut edges = match map.get(id).map(|p| p.value) {
            Some(PropertyValue::Edges(edges)) => edges,
            _ => DimensionEdges::zero(),
        };
        match side {
            Side::Top => edges.top = parsed,
            Side::Right => edges.right = parsed,
            Side::Bottom => edges.bottom = parsed,
            Side::Left => edges.left = parsed,
        }
        map.set(id, PropertyValue::Edges(edges));
        return Ok(());
    }

    let id = PropertyId::from_name(&name).ok_or(StyleParseError::UnknownProperty(name.clone()))?;
    map.set(id, parse_property_value(id, value)?);
    Ok(())
}

/// Parses an inline `style="key: value; ..."` attribute. Unknown property
/// names are skipped; malformed values are errors.
pub fn parse_declarations(css: &str) -> Result<PropertyMap, StyleParseError> {
    let mut map = PropertyMap::new();
    for declaration in css.split(';') {
        if declaration.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = declaration.split_once(':') else {
            return Err(StyleParseError::Parse(format!(
                "Expected 'name: value', found '{}'",
                declaration.trim()
            )));
        };
        match apply_declaration(&mut map, key, value) {
            Ok(()) | Err(StyleParseError::UnknownProperty(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(map)
}
