use crate::element::{Element, ElementId, ElementLayout, TEXT_TAG};
use crate::DomError;
use boxflow_style::{ComputedValues, Property, PropertyId, PropertyMap, parse_declarations};
use boxflow_types::{BoxModel, Vec2};
use std::collections::HashMap;

/// An arena of styled elements forming one or more trees.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    ids: HashMap<String, ElementId>,
    layout_log: Vec<ElementId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an element and appends it to `parent`'s children. Computed
    /// values are cascaded from `declared` and the parent's computed values.
    pub fn create_element(
        &mut self,
        tag: &str,
        declared: PropertyMap,
        parent: Option<ElementId>,
    ) -> Result<ElementId, DomError> {
        let inherited = match parent {
            Some(p) => Some(self.get(p)?.computed.clone()),
            None => None,
        };
        let computed = ComputedValues::cascade(&declared, tag, inherited.as_ref());
        let id = ElementId(self.elements.len() as u32);
        let mut element = Element::new(tag, declared, computed);
        element.parent = parent;
        self.elements.push(element);
        if let Some(p) = parent {
            self.get_mut(p)?.children.push(id);
        }
        Ok(id)
    }

    /// Convenience for `create_element` with an inline style string.
    pub fn create_styled(
        &mut self,
        tag: &str,
        style: &str,
        parent: Option<ElementId>,
    ) -> Result<ElementId, DomError> {
        let declared = parse_declarations(style)?;
        self.create_element(tag, declared, parent)
    }

    pub fn create_text(&mut self, parent: ElementId, text: &str) -> Result<ElementId, DomError> {
        let id = self.create_element(TEXT_TAG, PropertyMap::new(), Some(parent))?;
        self.get_mut(id)?.text = Some(text.to_string());
        Ok(id)
    }

    pub fn set_id_attr(&mut self, element: ElementId, id_attr: &str) -> Result<(), DomError> {
        if self.ids.get(id_attr).is_some_and(|existing| *existing != element) {
            return Err(DomError::DuplicateId(id_attr.to_string()));
        }
        self.get_mut(element)?.id_attr = Some(id_attr.to_string());
        self.ids.insert(id_attr.to_string(), element);
        Ok(())
    }

    /// Replaces an element's declared style and re-cascades its subtree.
    pub fn set_style(&mut self, element: ElementId, style: &str) -> Result<(), DomError> {
        let declared = parse_declarations(style)?;
        self.get_mut(element)?.declared = declared;
        self.recompute(element)
    }

    fn recompute(&mut self, element: ElementId) -> Result<(), DomError> {
        let parent = self.get(element)?.parent;
        let inherited = match parent {
            Some(p) => Some(self.get(p)?.computed.clone()),
            None => None,
        };
        let node = self.get_mut(element)?;
        node.computed = ComputedValues::cascade(&node.declared, &node.tag, inherited.as_ref());
        let children = node.children.clone();
        for child in children {
            self.recompute(child)?;
        }
        Ok(())
    }

    pub fn get(&self, id: ElementId) -> Result<&Element, DomError> {
        self.elements
            .get(id.index())
            .ok_or(DomError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, DomError> {
        self.elements
            .get_mut(id.index())
            .ok_or(DomError::UnknownElement(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All element ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len() as u32).map(ElementId)
    }

    pub fn element_by_id(&self, id_attr: &str) -> Option<ElementId> {
        self.ids.get(id_attr).copied()
    }

    pub fn children(&self, id: ElementId) -> Result<&[ElementId], DomError> {
        Ok(&self.get(id)?.children)
    }

    pub fn num_children(&self, id: ElementId) -> Result<usize, DomError> {
        Ok(self.get(id)?.children.len())
    }

    pub fn child(&self, id: ElementId, index: usize) -> Result<Option<ElementId>, DomError> {
        Ok(self.get(id)?.children.get(index).copied())
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, DomError> {
        Ok(self.get(id)?.parent)
    }

    pub fn tag_name(&self, id: ElementId) -> Result<&str, DomError> {
        Ok(&self.get(id)?.tag)
    }

    pub fn computed(&self, id: ElementId) -> Result<&ComputedValues, DomError> {
        Ok(&self.get(id)?.computed)
    }

    /// The declared value of a property, for diagnostics.
    pub fn property(&self, id: ElementId, property: PropertyId) -> Result<Option<&Property>, DomError> {
        Ok(self.get(id)?.declared.get(property))
    }

    /// A short human-readable path such as `div#menu < body`.
    pub fn address(&self, id: ElementId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let Ok(element) = self.get(cur) else {
                break;
            };
            match &element.id_attr {
                Some(attr) => parts.push(format!("{}#{}", element.tag, attr)),
                None => parts.push(element.tag.clone()),
            }
            current = element.parent;
        }
        parts.join(" < ")
    }

    // --- Layout write-back ---

    pub fn set_box(&mut self, id: ElementId, box_model: BoxModel) -> Result<(), DomError> {
        let element = self.get_mut(id)?;
        match element.layout.as_mut() {
            Some(layout) => layout.box_model = box_model,
            None => {
                element.layout = Some(ElementLayout {
                    box_model,
                    offset: Vec2::ZERO,
                    offset_parent: None,
                })
            }
        }
        Ok(())
    }

    pub fn set_offset(
        &mut self,
        id: ElementId,
        offset: Vec2,
        offset_parent: Option<ElementId>,
    ) -> Result<(), DomError> {
        let element = self.get_mut(id)?;
        let layout = element.layout.get_or_insert(ElementLayout {
            box_model: BoxModel::default(),
            offset,
            offset_parent,
        });
        layout.offset = offset;
        layout.offset_parent = offset_parent;
        Ok(())
    }

    pub fn layout(&self, id: ElementId) -> Result<Option<&ElementLayout>, DomError> {
        Ok(self.get(id)?.layout.as_ref())
    }

    /// Drops the layout and scrollbar state of `id` and its whole subtree.
    pub fn clear_layout(&mut self, id: ElementId) -> Result<(), DomError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let element = self.get_mut(current)?;
            element.layout = None;
            element.vertical_scrollbar = None;
            stack.extend_from_slice(&element.children);
        }
        Ok(())
    }

    /// Border-box origin in layout coordinates, following the offset-parent chain.
    pub fn absolute_position(&self, id: ElementId) -> Option<Vec2> {
        let mut position = Vec2::ZERO;
        let mut current = Some(id);
        let mut guard = self.elements.len();
        while let Some(cur) = current {
            let layout = self.get(cur).ok()?.layout.as_ref()?;
            position = position + layout.offset;
            current = layout.offset_parent;
            guard = guard.checked_sub(1)?;
        }
        Some(position)
    }

    /// Delivers the layout-complete notification.
    pub fn notify_layout(&mut self, id: ElementId) -> Result<(), DomError> {
        self.get_mut(id)?.layout_count += 1;
        self.layout_log.push(id);
        Ok(())
    }

    /// Elements notified since the log was last cleared, in delivery order.
    /// `LayoutEngine::format_root` clears it when a pass starts.
    pub fn layout_log(&self) -> &[ElementId] {
        &self.layout_log
    }

    pub fn clear_layout_log(&mut self) {
        self.layout_log.clear();
    }

    pub fn enable_vertical_scrollbar(&mut self, id: ElementId, width: f32) -> Result<(), DomError> {
        self.get_mut(id)?.vertical_scrollbar = Some(width);
        Ok(())
    }

    pub fn clear_scrollbars(&mut self, id: ElementId) -> Result<(), DomError> {
        self.get_mut(id)?.vertical_scrollbar = None;
        Ok(())
    }

    pub fn vertical_scrollbar(&self, id: ElementId) -> Result<Option<f32>, DomError> {
        Ok(self.get(id)?.vertical_scrollbar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxflow_style::Display;

    #[test]
    fn children_inherit_font_size() {
        let mut doc = Document::new();
        let body = doc.create_styled("body", "font-size: 10px", None).unwrap();
        let span = doc.create_styled("span", "", Some(body)).unwrap();
        let text = doc.create_text(span, "hello").unwrap();
        assert_eq!(doc.computed(text).unwrap().font_size, 10.0);
        assert_eq!(doc.children(body).unwrap(), &[span]);
        assert_eq!(doc.get(text).unwrap().text(), Some("hello"));
    }

    #[test]
    fn set_style_recascades_subtree() {
        let mut doc = Document::new();
        let body = doc.create_styled("body", "", None).unwrap();
        let p = doc.create_styled("p", "", Some(body)).unwrap();
        doc.set_style(body, "font-size: 30px; display: inline-block").unwrap();
        assert_eq!(doc.computed(body).unwrap().display, Display::InlineBlock);
        assert_eq!(doc.computed(p).unwrap().font_size, 30.0);
    }

    #[test]
    fn address_walks_ancestors() {
        let mut doc = Document::new();
        let body = doc.create_styled("body", "", None).unwrap();
        let div = doc.create_styled("div", "", Some(body)).unwrap();
        doc.set_id_attr(div, "menu").unwrap();
        assert_eq!(doc.address(div), "div#menu < body");
        assert!(matches!(
            doc.set_id_attr(body, "menu"),
            Err(DomError::DuplicateId(_))
        ));
    }

    #[test]
    fn absolute_position_follows_offset_parents() {
        let mut doc = Document::new();
        let outer = doc.create_styled("div", "", None).unwrap();
        let inner = doc.create_styled("div", "", Some(outer)).unwrap();
        doc.set_offset(outer, Vec2::new(10.0, 20.0), None).unwrap();
        doc.set_offset(inner, Vec2::new(1.0, 2.0), Some(outer)).unwrap();
        assert_eq!(doc.absolute_position(inner), Some(Vec2::new(11.0, 22.0)));
    }

    #[test]
    fn clear_layout_drops_whole_subtree() {
        let mut doc = Document::new();
        let body = doc.create_styled("body", "", None).unwrap();
        let outer = doc.create_styled("div", "", Some(body)).unwrap();
        let inner = doc.create_styled("div", "", Some(outer)).unwrap();
        for id in [body, outer, inner] {
            doc.set_box(id, BoxModel::default()).unwrap();
        }
        doc.enable_vertical_scrollbar(inner, 16.0).unwrap();

        doc.clear_layout(outer).unwrap();

        assert!(doc.layout(body).unwrap().is_some());
        assert!(doc.layout(outer).unwrap().is_none());
        assert!(doc.layout(inner).unwrap().is_none());
        assert_eq!(doc.vertical_scrollbar(inner).unwrap(), None);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let doc = Document::new();
        assert!(matches!(
            doc.get(ElementId(3)),
            Err(DomError::UnknownElement(_))
        ));
    }
}
