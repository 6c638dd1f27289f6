//! XML to [`Node`] reader
//!
//! Builds the generic document tree the classifier and the default form
//! converter work on:
//!
//! - a document is a mapping of its root element's name to the root's value
//! - an element with neither attributes nor children is a scalar of its text
//! - otherwise an element is a mapping: attributes as `@name`, children by
//!   local name (repeated children collapse into a sequence), and any text
//!   under `#text`
//!
//! Element names are reduced to their local part, so `<orx:meta>` and
//! `<meta>` look the same to the classifier.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use crate::node::Node;

/// Key holding an element's text when it also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Prefix for attribute keys
pub const ATTRIBUTE_PREFIX: char = '@';

/// Deepest element nesting accepted.
///
/// Serializing and dropping a [`Node`] recurse once per level.
pub const MAX_DEPTH: usize = 512;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error(transparent)]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),

    #[error("elements nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

#[derive(Default)]
struct ElementBuilder {
    name: String,
    attributes: Vec<(String, Node)>,
    children: Vec<(String, Node)>,
    text: String,
}

impl ElementBuilder {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref());
            let value = attr.unescape_value()?;
            attributes.push((
                format!("{ATTRIBUTE_PREFIX}{key}"),
                Node::scalar(value.into_owned()),
            ));
        }

        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn add_child(&mut self, name: String, node: Node) {
        match self.children.iter_mut().find(|(k, _)| *k == name) {
            Some((_, Node::Sequence(items))) => items.push(node),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Node::Sequence(Vec::new()));
                *existing = Node::Sequence(vec![first, node]);
            }
            None => self.children.push((name, node)),
        }
    }

    fn close(self) -> (String, Node) {
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, Node::Scalar(self.text));
        }

        let mut entries = self.attributes;
        entries.extend(self.children);
        if !self.text.is_empty() {
            entries.push((TEXT_KEY.to_string(), Node::Scalar(self.text)));
        }

        (self.name, Node::Mapping(entries))
    }
}

/// Parse an XML document into a [`Node`] tree
pub fn parse_document(xml: &str) -> Result<Node, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<ElementBuilder> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    let mut finish = |stack: &mut Vec<ElementBuilder>, element: ElementBuilder| {
        let (name, node) = element.close();
        match stack.last_mut() {
            Some(parent) => {
                parent.add_child(name, node);
                Ok(())
            }
            None if root.is_some() => Err(XmlError::MultipleRoots),
            None => {
                root = Some((name, node));
                Ok(())
            }
        }
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::TooDeep);
                }
                stack.push(ElementBuilder::open(&start)?);
            }
            Event::Empty(start) => {
                let element = ElementBuilder::open(&start)?;
                finish(&mut stack, element)?;
            }
            Event::End(_) => {
                // quick-xml has already checked the end name against the open tag
                if let Some(element) = stack.pop() {
                    finish(&mut stack, element)?;
                }
            }
            Event::Text(text) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(element) = stack.last_mut() {
                    element
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    let (name, node) = root.ok_or(XmlError::NoRoot)?;
    Ok(Node::Mapping(vec![(name, node)]))
}
