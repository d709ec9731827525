use crate::{LayoutConfig, LayoutEngine};
use boxflow_dom::{Document, ElementId};
use boxflow_types::{BoxArea, Size, Vec2};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Forwards to env_logger and keeps every warning raised on the current
/// thread so tests can assert on diagnostics.
struct CapturingLogger {
    inner: env_logger::Logger,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= Level::Warn {
            WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
        }
        if self.inner.matches(record) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub fn init_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let inner = env_logger::Builder::from_default_env().is_test(true).build();
        let max_level = inner.filter().max(LevelFilter::Warn);
        if log::set_boxed_logger(Box::new(CapturingLogger { inner })).is_ok() {
            log::set_max_level(max_level);
        }
    });
    take_warnings();
}

/// Warnings logged on this thread since the last call.
pub fn take_warnings() -> Vec<String> {
    WARNINGS.with(|w| std::mem::take(&mut *w.borrow_mut()))
}

/// Creates a default layout engine for testing purposes.
pub fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default())
}

/// A `body` with a 10px font and one text child per entry of `texts`.
pub fn body_with(texts: &[&str]) -> (Document, ElementId) {
    let mut doc = Document::new();
    let body = doc.create_styled("body", "font-size: 10px", None).unwrap();
    for text in texts {
        doc.create_text(body, text).unwrap();
    }
    (doc, body)
}

/// Border-box origin in layout coordinates.
pub fn pos(doc: &Document, element: ElementId) -> Vec2 {
    doc.absolute_position(element)
        .unwrap_or_else(|| panic!("{} has no layout", doc.address(element)))
}

/// Border-box size.
pub fn size_of(doc: &Document, element: ElementId) -> Size {
    doc.layout(element)
        .unwrap()
        .unwrap_or_else(|| panic!("{} has no layout", doc.address(element)))
        .box_model
        .size(BoxArea::Border)
}
