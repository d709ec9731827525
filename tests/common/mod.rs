#![allow(dead_code)]

use boxflow::{BoxArea, Document, ElementId, LayoutConfig, LayoutEngine, LayoutError, LayoutOutput, Size, Vec2};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default())
}

/// A document holding a `body` with a 10px font; text then measures 5px
/// per glyph and lines are 12px tall.
pub fn new_body(style: &str) -> Result<(Document, ElementId), Box<dyn std::error::Error>> {
    let mut doc = Document::new();
    let body = doc.create_styled("body", &format!("font-size: 10px; {}", style), None)?;
    Ok((doc, body))
}

pub fn layout(doc: &mut Document, root: ElementId, width: f32, height: f32) -> Result<LayoutOutput, LayoutError> {
    engine().format_root(doc, root, Size::new(width, height), None)
}

/// Border-box origin in layout coordinates.
pub fn pos(doc: &Document, element: ElementId) -> Vec2 {
    doc.absolute_position(element)
        .unwrap_or_else(|| panic!("{} has no layout", doc.address(element)))
}

/// Border-box size.
pub fn size_of(doc: &Document, element: ElementId) -> Size {
    doc.layout(element)
        .ok()
        .flatten()
        .unwrap_or_else(|| panic!("{} has no layout", doc.address(element)))
        .box_model
        .size(BoxArea::Border)
}

pub fn content_width(doc: &Document, element: ElementId) -> f32 {
    doc.layout(element)
        .ok()
        .flatten()
        .map(|layout| layout.box_model.content.width)
        .unwrap_or_else(|| panic!("{} has no layout", doc.address(element)))
}
