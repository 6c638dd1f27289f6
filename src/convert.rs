//! Form conversion: XML text to the structured value written as JSON

use std::path::{Path, PathBuf};

use crate::discovery::forms::is_instance_meta;
use crate::error::{Result, TransferError, file_read_error};
use crate::node::Node;
use crate::xml;

/// Error type returned by converters
pub type ConvertError = Box<dyn std::error::Error + Send + Sync>;

/// Turns the XML text of a form into its structured value.
///
/// Implementations are pure: the same text always yields the same value.
pub trait FormConverter: Send + Sync {
    fn convert(&self, xml: &str) -> std::result::Result<Node, ConvertError>;
}

/// Default converter for ODK instance documents.
///
/// The value is the root element's mapping (attributes as `@name`, children by
/// local name). The root must carry at least one `<meta>` block with content;
/// a repeated `<meta>` is kept as the sequence the reader produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstanceConverter;

impl FormConverter for InstanceConverter {
    fn convert(&self, xml: &str) -> std::result::Result<Node, ConvertError> {
        let document = xml::parse_document(xml)?;

        let Node::Mapping(mut elements) = document else {
            return Err("document is not an element tree".into());
        };
        let Some((name, root)) = elements.pop() else {
            return Err("document has no root element".into());
        };

        match root.get(META) {
            Some(Node::Mapping(_)) => Ok(root),
            Some(Node::Sequence(metas)) if metas.iter().any(|m| matches!(m, Node::Mapping(_))) => {
                Ok(root)
            }
            Some(_) => Err(format!("<{name}> has only empty <meta> blocks").into()),
            None => Err(format!("<{name}> has no <meta> block").into()),
        }
    }
}

const META: &str = "meta";
const TRANSFER: &str = "transfer";
const ORIGINAL_PATH: &str = "originalPath";

/// Which of several `meta` blocks records the transfer origin: the first
/// complete one, else the first mapping.
fn origin_meta_index(metas: &[Node]) -> Option<usize> {
    metas
        .iter()
        .position(is_instance_meta)
        .or_else(|| metas.iter().position(|meta| matches!(meta, Node::Mapping(_))))
}

/// The `meta` mapping that receives `transfer`, created when absent
fn origin_meta_mut(document: &mut Node) -> Option<&mut Node> {
    if matches!(document.get(META), Some(Node::Sequence(_))) {
        let Some(Node::Sequence(metas)) = document.get_mut(META) else {
            return None;
        };
        let index = origin_meta_index(metas)?;
        return metas.get_mut(index);
    }

    document.mapping_entry(META)
}

/// A converted form, tagged with the absolute path it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForm {
    document: Node,
    source: PathBuf,
}

impl ParsedForm {
    /// Attach transfer metadata (`meta.transfer.originalPath`) to a converted value
    pub fn new(mut document: Node, source: &Path) -> Result<Self> {
        let source_text = source.display().to_string();
        if source_text.is_empty() {
            return Err(conversion_error(source, "form path is empty"));
        }

        let transfer = Node::Mapping(vec![(
            ORIGINAL_PATH.to_string(),
            Node::Scalar(source_text),
        )]);

        let inserted =
            origin_meta_mut(&mut document).is_some_and(|meta| meta.insert(TRANSFER, transfer));
        if !inserted {
            return Err(conversion_error(
                source,
                "converted form has no 'meta' mapping to record its origin in",
            ));
        }

        Ok(Self {
            document,
            source: source.to_path_buf(),
        })
    }

    /// Read and convert a form file
    pub fn load(path: &Path, converter: &dyn FormConverter) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| file_read_error(path, e))?;
        let document = converter
            .convert(&contents)
            .map_err(|e| conversion_error(path, e))?;
        Self::new(document, path)
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Node {
        &mut self.document
    }

    /// Absolute path of the original form file
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Directory the original form file lives in
    pub fn directory(&self) -> &Path {
        self.source.parent().unwrap_or(Path::new(""))
    }

    /// `meta.transfer.originalPath` as recorded in the document
    #[cfg(test)]
    pub fn original_path(&self) -> Option<&str> {
        let meta = match self.document.get(META)? {
            Node::Sequence(metas) => metas.get(origin_meta_index(metas)?)?,
            meta => meta,
        };

        meta.get(TRANSFER)
            .and_then(|transfer| transfer.get(ORIGINAL_PATH))
            .and_then(Node::text)
    }
}

fn conversion_error(path: &Path, reason: impl std::fmt::Display) -> TransferError {
    TransferError::ConversionFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
