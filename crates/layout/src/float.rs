//! Float exclusion bookkeeping.
//!
//! Placed floats are stored as margin-box rectangles in the content
//! coordinates of the context that owns them. Queries take a slice of
//! exclusions already translated into the caller's coordinates, so the same
//! functions serve a context's own floats and those inherited from ancestors
//! in its block formatting context.

use boxflow_style::Float;
use boxflow_types::{Rect, Size, Vec2};

const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatSide {
    Left,
    Right,
}

impl FloatSide {
    pub fn from_float(float: Float) -> Option<Self> {
        match float {
            Float::Left => Some(FloatSide::Left),
            Float::Right => Some(FloatSide::Right),
            Float::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedFloat {
    pub rect: Rect,
    pub side: FloatSide,
}

impl PlacedFloat {
    pub fn translated(&self, by: Vec2) -> PlacedFloat {
        PlacedFloat {
            rect: Rect::from_origin_size(self.rect.origin() + by, self.rect.size()),
            side: self.side,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatSpace {
    floats: Vec<PlacedFloat>,
    /// No float may be placed above this line.
    ceiling: f32,
}

impl FloatSpace {
    pub fn floats(&self) -> &[PlacedFloat] {
        &self.floats
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    pub fn add(&mut self, placed: PlacedFloat) {
        self.ceiling = self.ceiling.max(placed.rect.y);
        self.floats.push(placed);
    }

    /// Lowest margin-box edge of any float, or zero.
    pub fn bottom(&self) -> f32 {
        self.floats
            .iter()
            .map(|f| f.rect.bottom())
            .fold(0.0, f32::max)
    }

    pub fn clear(&mut self) {
        self.floats.clear();
        self.ceiling = 0.0;
    }
}

fn overlapping(exclusions: &[PlacedFloat], y: f32, height: f32) -> impl Iterator<Item = &PlacedFloat> {
    let bottom = y + height.max(EPSILON);
    exclusions
        .iter()
        .filter(move |f| f.rect.height > 0.0 && f.rect.overlaps_vertically(y, bottom))
}

/// The horizontal span `(left, right)` left free by floats for a box of
/// `height` at `y`, inside a container of `width`.
pub fn available_span(exclusions: &[PlacedFloat], y: f32, height: f32, width: f32) -> (f32, f32) {
    let mut left = 0.0f32;
    let mut right = width;
    for f in overlapping(exclusions, y, height) {
        match f.side {
            FloatSide::Left => left = left.max(f.rect.right()),
            FloatSide::Right => right = right.min(f.rect.x),
        }
    }
    (left, right.max(left))
}

/// The nearest float bottom below `y` among floats overlapping `[y, y + height)`.
pub fn next_drop(exclusions: &[PlacedFloat], y: f32, height: f32) -> Option<f32> {
    overlapping(exclusions, y, height)
        .map(|f| f.rect.bottom())
        .filter(|b| *b > y)
        .reduce(f32::min)
}

/// Finds the margin-box origin for a float of `size`, starting no higher
/// than `y_min`. Floats move down past existing floats until they fit; a
/// float that fits nowhere is placed where no other float overlaps it.
pub fn place(
    exclusions: &[PlacedFloat],
    width: f32,
    y_min: f32,
    size: Size,
    side: FloatSide,
) -> Vec2 {
    let mut y = y_min;
    loop {
        let (left, right) = available_span(exclusions, y, size.height, width);
        let blocked = overlapping(exclusions, y, size.height).next().is_some();
        if !blocked || right - left + EPSILON >= size.width {
            let x = match side {
                FloatSide::Left => left,
                FloatSide::Right => right - size.width,
            };
            return Vec2::new(x, y);
        }
        match next_drop(exclusions, y, size.height) {
            Some(next) => y = next,
            None => {
                log::debug!("Float of width {} has no room at {}", size.width, y);
                return Vec2::new(left, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(x: f32, y: f32, w: f32, h: f32) -> PlacedFloat {
        PlacedFloat {
            rect: Rect::new(x, y, w, h),
            side: FloatSide::Left,
        }
    }

    #[test]
    fn span_shrinks_around_floats() {
        let exclusions = [
            left(0.0, 0.0, 50.0, 20.0),
            PlacedFloat {
                rect: Rect::new(250.0, 0.0, 50.0, 40.0),
                side: FloatSide::Right,
            },
        ];
        assert_eq!(available_span(&exclusions, 0.0, 10.0, 300.0), (50.0, 250.0));
        assert_eq!(available_span(&exclusions, 25.0, 10.0, 300.0), (0.0, 250.0));
        assert_eq!(available_span(&exclusions, 40.0, 10.0, 300.0), (0.0, 300.0));
    }

    #[test]
    fn third_float_drops_below_the_first_two() {
        let size = Size::new(120.0, 30.0);
        let mut space = FloatSpace::default();
        let mut origins = Vec::new();
        for _ in 0..3 {
            let origin = place(space.floats(), 300.0, space.ceiling(), size, FloatSide::Left);
            space.add(PlacedFloat {
                rect: Rect::from_origin_size(origin, size),
                side: FloatSide::Left,
            });
            origins.push(origin);
        }
        assert_eq!(origins[0], Vec2::new(0.0, 0.0));
        assert_eq!(origins[1], Vec2::new(120.0, 0.0));
        assert_eq!(origins[2], Vec2::new(0.0, 30.0));
        assert_eq!(space.bottom(), 60.0);
    }

    #[test]
    fn right_floats_hug_the_right_edge() {
        let origin = place(&[], 200.0, 0.0, Size::new(50.0, 10.0), FloatSide::Right);
        assert_eq!(origin, Vec2::new(150.0, 0.0));
    }

    #[test]
    fn oversized_float_is_placed_on_a_clear_band() {
        let exclusions = [left(0.0, 0.0, 10.0, 15.0)];
        let origin = place(&exclusions, 100.0, 0.0, Size::new(500.0, 10.0), FloatSide::Left);
        assert_eq!(origin, Vec2::new(0.0, 15.0));
    }

    #[test]
    fn ceiling_tracks_latest_float_top() {
        let mut space = FloatSpace::default();
        space.add(left(0.0, 12.0, 5.0, 5.0));
        assert_eq!(space.ceiling(), 12.0);
        space.clear();
        assert_eq!(space.ceiling(), 0.0);
    }
}
