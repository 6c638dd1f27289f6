//! Structured value tree shared by the XML reader, the form converter and the
//! materializer.
//!
//! Every parsed document is a tree of three variants: a text scalar, an
//! ordered sequence, or an ordered mapping. Extraction and rewriting are the
//! two generic visitors over it. Both walk with an explicit work stack, so
//! depth is bounded by memory rather than by the call stack.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A node in a parsed form or XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    /// Key order is document order; keys are unique.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    /// An empty mapping
    pub fn mapping() -> Self {
        Node::Mapping(Vec::new())
    }

    pub fn scalar(text: impl Into<String>) -> Self {
        Node::Scalar(text.into())
    }

    /// Look up a key in a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Node::Mapping(entries) => entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Insert or replace a key in a mapping.
    ///
    /// Returns `false` (and drops `value`) when `self` is not a mapping.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> bool {
        let Node::Mapping(entries) = self else {
            return false;
        };

        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => entries.push((key, value)),
        }
        true
    }

    /// Get the mapping stored under `key`, creating an empty one if absent.
    ///
    /// Returns `None` when `self` is not a mapping or `key` holds a non-mapping.
    pub fn mapping_entry(&mut self, key: &str) -> Option<&mut Node> {
        if self.get(key).is_none() && !self.insert(key, Node::mapping()) {
            return None;
        }

        self.get_mut(key)
            .filter(|node| matches!(node, Node::Mapping(_)))
    }

    /// Text content of a scalar, or of a mapping's `#text` entry
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text),
            Node::Mapping(_) => self.get(crate::xml::TEXT_KEY).and_then(Node::text),
            Node::Sequence(_) => None,
        }
    }

    /// Visit every scalar in document order
    pub fn visit_scalars<F: FnMut(&str)>(&self, mut visit: F) {
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            match node {
                Node::Scalar(text) => visit(text),
                Node::Sequence(items) => stack.extend(items.iter().rev()),
                Node::Mapping(entries) => stack.extend(entries.iter().rev().map(|(_, v)| v)),
            }
        }
    }

    /// Replace scalars for which `rewrite` returns a new value.
    ///
    /// Returns the number of scalars replaced.
    pub fn rewrite_scalars<F: FnMut(&str) -> Option<String>>(&mut self, mut rewrite: F) -> usize {
        let mut stack = vec![self];
        let mut replaced = 0;

        while let Some(node) = stack.pop() {
            match node {
                Node::Scalar(text) => {
                    if let Some(new_text) = rewrite(text.as_str()) {
                        *text = new_text;
                        replaced += 1;
                    }
                }
                Node::Sequence(items) => stack.extend(items.iter_mut()),
                Node::Mapping(entries) => stack.extend(entries.iter_mut().map(|(_, v)| v)),
            }
        }

        replaced
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(text) => serializer.serialize_str(text),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
