pub mod box_model;
pub mod geometry;

pub use box_model::{BoxArea, BoxModel};
pub use geometry::{ContainingBlock, Edges, Rect, Size, Vec2};
