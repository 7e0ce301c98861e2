//! Structured Descriptor Documents
//!
//! Program and effect descriptors are small XML documents. They are parsed
//! once into an owned [`Element`] tree which the loaders walk in document
//! order. Text and comment nodes are dropped.
//!
//! Attribute lookup follows the descriptor convention that an absent
//! attribute reads as the empty string.

pub mod schema;

use std::path::Path;

use smallvec::SmallVec;

use crate::errors::{Result, ShaderError};
use crate::io::VirtualFileSystem;

pub use schema::{AcceptAll, BuiltinSchemas, SchemaValidator};

/// One element of a descriptor document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: SmallVec<[(String, String); 4]>,
    children: Vec<Element>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: sets an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Parses an XML document and returns its root element.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let document = roxmltree::Document::parse(text).map_err(|e| e.to_string())?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of attribute `name`, or `""` when absent.
    #[must_use]
    pub fn attr(&self, name: &str) -> &str {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Attribute names in document order.
    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(key, _)| key.as_str())
    }

    /// Child elements in document order.
    #[inline]
    pub fn children(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }
}

/// Reads and parses the descriptor at `path`.
pub fn load_document(fs: &dyn VirtualFileSystem, path: &Path) -> Result<Element> {
    let text = fs
        .read_to_string(path)
        .map_err(|source| ShaderError::DescriptorNotFound {
            path: path.to_path_buf(),
            source,
        })?;

    Element::parse(&text).map_err(|message| ShaderError::Markup {
        path: path.to_path_buf(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFileSystem;

    #[test]
    fn test_parse_keeps_document_order() {
        let root = Element::parse(
            r#"<program type="glsl">
                <!-- comment -->
                <define name="A" value="1"/>
                <vertex file="a.vs"><stream name="pos"/></vertex>
                <fragment file="a.fs"/>
            </program>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "program");
        assert_eq!(root.attr("type"), "glsl");
        let names: Vec<_> = root.children().map(Element::name).collect();
        assert_eq!(names, ["define", "vertex", "fragment"]);
        assert_eq!(root.children().nth(1).unwrap().children().count(), 1);
    }

    #[test]
    fn test_absent_attribute_is_empty() {
        let element = Element::new("blend").with_attr("src", "one");
        assert_eq!(element.attr("src"), "one");
        assert_eq!(element.attr("dst"), "");
        assert!(!element.has_attr("dst"));
    }

    #[test]
    fn test_load_document_errors() {
        let fs = MemoryFileSystem::new().with_file("broken.xml", "<program>");

        assert!(matches!(
            load_document(&fs, Path::new("missing.xml")),
            Err(ShaderError::DescriptorNotFound { .. })
        ));
        assert!(matches!(
            load_document(&fs, Path::new("broken.xml")),
            Err(ShaderError::Markup { .. })
        ));
    }
}
