//! The resolved CSS box model of a single element.
//!
//! Sizes grow outward: content → padding → border → margin.

use crate::geometry::{Edges, Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxArea {
    Content,
    Padding,
    Border,
    Margin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxModel {
    pub content: Size,
    pub padding: Edges,
    pub border: Edges,
    pub margin: Edges,
    /// Width was `auto` and has been resolved by the layout engine.
    pub auto_width: bool,
    /// Height is `auto`; the content height is only final once the
    /// owning formatting context is closed.
    pub auto_height: bool,
}

impl BoxModel {
    /// A box with only a content area, used for synthetic containing blocks.
    pub fn from_content(content: Size) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    pub fn size(&self, area: BoxArea) -> Size {
        let (w, h) = match area {
            BoxArea::Content => (0.0, 0.0),
            BoxArea::Padding => (self.padding.horizontal(), self.padding.vertical()),
            BoxArea::Border => (
                self.padding.horizontal() + self.border.horizontal(),
                self.padding.vertical() + self.border.vertical(),
            ),
            BoxArea::Margin => (
                self.padding.horizontal() + self.border.horizontal() + self.margin.horizontal(),
                self.padding.vertical() + self.border.vertical() + self.margin.vertical(),
            ),
        };
        Size::new(self.content.width + w, self.content.height + h)
    }

    /// Offset from the top-left corner of `area` to the top-left corner of
    /// the content area.
    pub fn content_offset(&self, area: BoxArea) -> Vec2 {
        match area {
            BoxArea::Content => Vec2::ZERO,
            BoxArea::Padding => self.padding.top_left(),
            BoxArea::Border => self.padding.top_left() + self.border.top_left(),
            BoxArea::Margin => {
                self.padding.top_left() + self.border.top_left() + self.margin.top_left()
            }
        }
    }

    /// Padding + border on both horizontal sides.
    pub fn frame_x(&self) -> f32 {
        self.padding.horizontal() + self.border.horizontal()
    }

    /// Padding + border on both vertical sides.
    pub fn frame_y(&self) -> f32 {
        self.padding.vertical() + self.border.vertical()
    }
}
