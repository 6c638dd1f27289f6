//! Media reference extraction

use std::sync::LazyLock;

use regex::Regex;

use crate::discovery::walker::MEDIA_EXTENSIONS;
use crate::node::Node;

/// A line of text ending in a media extension
static MEDIA_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?imR)^.+\.(?:{})$", MEDIA_EXTENSIONS.join("|"));
    Regex::new(&pattern).unwrap_or_else(|_| unreachable!("media reference pattern is static"))
});

/// Media filenames found in a single scalar value
pub fn references_in(value: &str) -> impl Iterator<Item = &str> {
    MEDIA_REFERENCE.find_iter(value).map(|m| m.as_str())
}

/// Every media filename referenced anywhere in a form, in document order.
///
/// Duplicates are kept; the bundler decides what to do with them.
pub fn extract_references(form: &Node) -> Vec<String> {
    let mut names = Vec::new();
    form.visit_scalars(|value| names.extend(references_in(value).map(str::to_string)));
    names
}
