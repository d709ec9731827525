//! Serde description of a document, used to build [`Document`]s from JSON.
//!
//! ```json
//! { "tag": "body", "style": "width: 300px",
//!   "children": [ { "tag": "p", "children": ["Hello world"] } ] }
//! ```

use crate::document::Document;
use crate::element::ElementId;
use crate::DomError;
use boxflow_style::PropertyMap;
use boxflow_style::parsers::apply_declaration;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

/// Either an inline declaration string or a map of property names to values.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StyleSpec {
    Inline(String),
    Map(BTreeMap<String, StyleValue>),
}

impl Default for StyleSpec {
    fn default() -> Self {
        StyleSpec::Inline(String::new())
    }
}

impl StyleSpec {
    pub fn to_properties(&self) -> Result<PropertyMap, DomError> {
        match self {
            StyleSpec::Inline(css) => Ok(boxflow_style::parse_declarations(css)?),
            StyleSpec::Map(entries) => {
                let mut map = PropertyMap::new();
                for (name, value) in entries {
                    let value = match value {
                        StyleValue::Number(n) => n.to_string(),
                        StyleValue::Text(s) => s.clone(),
                    };
                    match apply_declaration(&mut map, name, &value) {
                        Ok(()) | Err(boxflow_style::StyleParseError::UnknownProperty(_)) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Ok(map)
            }
        }
    }
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ElementSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style: StyleSpec,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl Document {
    /// Builds a document from an element description and returns it with the root element.
    pub fn from_spec(spec: &ElementSpec) -> Result<(Document, ElementId), DomError> {
        let mut doc = Document::new();
        let root = doc.append_spec(spec, None)?;
        Ok((doc, root))
    }

    pub fn from_json(json: &str) -> Result<(Document, ElementId), DomError> {
        let spec: ElementSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }

    /// Appends the subtree described by `spec` under `parent`.
    pub fn append_spec(
        &mut self,
        spec: &ElementSpec,
        parent: Option<ElementId>,
    ) -> Result<ElementId, DomError> {
        let id = self.create_element(&spec.tag, spec.style.to_properties()?, parent)?;
        if let Some(attr) = &spec.id {
            self.set_id_attr(id, attr)?;
        }
        for child in &spec.children {
            match child {
                NodeSpec::Text(text) => {
                    self.create_text(id, text)?;
                }
                NodeSpec::Element(child) => {
                    self.append_spec(child, Some(id))?;
                }
            }
        }
        Ok(id)
    }
}
