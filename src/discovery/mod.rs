//! Form and media discovery
//!
//! This module handles:
//! - Walking a root for `*.xml` files and media files ([`walker`])
//! - Classifying parsed XML as ODK form instances ([`forms`])
//! - Collecting media candidates by extension ([`media`])

pub mod forms;
pub mod media;
pub mod walker;

pub use forms::discover_forms;
pub use media::discover_media;
pub use walker::Walker;
