use boxflow_style::{ComputedValues, PropertyMap};
use boxflow_types::{BoxModel, Vec2};
use std::fmt;

/// Tag used for anonymous text runs.
pub const TEXT_TAG: &str = "#text";

/// Index of an element in its owning [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry committed by a successful layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementLayout {
    pub box_model: BoxModel,
    /// Border-box origin relative to the offset parent's border-box origin,
    /// or to the layout origin when there is no offset parent.
    pub offset: Vec2,
    pub offset_parent: Option<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) id_attr: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) declared: PropertyMap,
    pub(crate) computed: ComputedValues,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) layout: Option<ElementLayout>,
    /// Width of the vertical scrollbar, when one is shown.
    pub(crate) vertical_scrollbar: Option<f32>,
    pub(crate) layout_count: u32,
}

impl Element {
    pub(crate) fn new(tag: &str, declared: PropertyMap, computed: ComputedValues) -> Self {
        Self {
            tag: tag.to_string(),
            id_attr: None,
            text: None,
            declared,
            computed,
            parent: None,
            children: Vec::new(),
            layout: None,
            vertical_scrollbar: None,
            layout_count: 0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id_attr(&self) -> Option<&str> {
        self.id_attr.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn computed(&self) -> &ComputedValues {
        &self.computed
    }

    pub fn declared(&self) -> &PropertyMap {
        &self.declared
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn layout(&self) -> Option<&ElementLayout> {
        self.layout.as_ref()
    }

    pub fn vertical_scrollbar(&self) -> Option<f32> {
        self.vertical_scrollbar
    }

    /// Number of layout-complete notifications delivered so far.
    pub fn layout_count(&self) -> u32 {
        self.layout_count
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }
}
