//! ODK form discovery and classification

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::walker::{FilePattern, Walker};
use crate::error::{TransferError, file_read_error};
use crate::node::Node;
use crate::report::Reporter;
use crate::xml;

const META: &str = "meta";
const INSTANCE_ID: &str = "instanceID";
const INSTANCE_NAME: &str = "instanceName";

fn has_text(node: &Node, key: &str) -> bool {
    node.get(key)
        .and_then(Node::text)
        .is_some_and(|text| !text.trim().is_empty())
}

/// A `meta` block with a non-empty `instanceID` and `instanceName`
pub(crate) fn is_instance_meta(meta: &Node) -> bool {
    has_text(meta, INSTANCE_ID) && has_text(meta, INSTANCE_NAME)
}

/// Whether a parsed XML document looks like an ODK form instance.
///
/// Looks one level into every top-level element for a `meta` child carrying
/// both a non-empty `instanceID` and a non-empty `instanceName`. This is a
/// heuristic: any XML with those two fields passes.
pub fn is_form(document: &Node) -> bool {
    let Node::Mapping(elements) = document else {
        return false;
    };

    elements
        .iter()
        .filter_map(|(_, element)| element.get(META))
        .any(|meta| match meta {
            Node::Sequence(metas) => metas.iter().any(is_instance_meta),
            other => is_instance_meta(other),
        })
}

fn classify(path: &Path, reporter: &dyn Reporter) -> Option<PathBuf> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            reporter.fail(file_read_error(path, e));
            return None;
        }
    };

    match xml::parse_document(&contents) {
        Ok(document) => is_form(&document).then(|| path.to_path_buf()),
        Err(e) => {
            reporter.fail(TransferError::XmlParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Find ODK forms under `root`.
///
/// Every `*.xml` file is read and parsed independently; one that cannot be
/// read or parsed is reported and left out.
pub fn discover_forms(walker: &Walker, root: &Path, reporter: &dyn Reporter) -> Vec<PathBuf> {
    walker
        .walk(root, FilePattern::Xml, reporter)
        .par_iter()
        .filter_map(|path| classify(path, reporter))
        .collect()
}
