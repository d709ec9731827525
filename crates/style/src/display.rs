//! Keyword-valued properties that drive formatting-context classification.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    None,
    Block,
    #[default]
    Inline,
    InlineBlock,
    Table,
    TableRow,
    TableRowGroup,
    TableColumn,
    TableColumnGroup,
    TableCell,
}

impl Display {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "none" => Display::None,
            "block" => Display::Block,
            "inline" => Display::Inline,
            "inline-block" => Display::InlineBlock,
            "table" => Display::Table,
            "table-row" => Display::TableRow,
            "table-row-group" => Display::TableRowGroup,
            "table-column" => Display::TableColumn,
            "table-column-group" => Display::TableColumnGroup,
            "table-cell" => Display::TableCell,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Display::None => "none",
            Display::Block => "block",
            Display::Inline => "inline",
            Display::InlineBlock => "inline-block",
            Display::Table => "table",
            Display::TableRow => "table-row",
            Display::TableRowGroup => "table-row-group",
            Display::TableColumn => "table-column",
            Display::TableColumnGroup => "table-column-group",
            Display::TableCell => "table-cell",
        }
    }

    /// Row, row-group, column, column-group and cell: only meaningful
    /// inside a table.
    pub fn is_table_internal(&self) -> bool {
        matches!(
            self,
            Display::TableRow
                | Display::TableRowGroup
                | Display::TableColumn
                | Display::TableColumnGroup
                | Display::TableCell
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

impl Position {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "static" => Position::Static,
            "relative" => Position::Relative,
            "absolute" => Position::Absolute,
            "fixed" => Position::Fixed,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Static => "static",
            Position::Relative => "relative",
            Position::Absolute => "absolute",
            Position::Fixed => "fixed",
        }
    }

    /// Absolute and fixed boxes leave the normal flow.
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "none" => Float::None,
            "left" => Float::Left,
            "right" => Float::Right,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Float::None => "none",
            Float::Left => "left",
            Float::Right => "right",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "visible" => Overflow::Visible,
            "hidden" => Overflow::Hidden,
            "auto" => Overflow::Auto,
            "scroll" => Overflow::Scroll,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Overflow::Visible => "visible",
            Overflow::Hidden => "hidden",
            Overflow::Auto => "auto",
            Overflow::Scroll => "scroll",
        }
    }

    pub fn clips(&self) -> bool {
        !matches!(self, Overflow::Visible)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "content-box" => BoxSizing::ContentBox,
            "border-box" => BoxSizing::BorderBox,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxSizing::ContentBox => "content-box",
            BoxSizing::BorderBox => "border-box",
        }
    }
}
