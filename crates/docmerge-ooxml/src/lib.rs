//! # docmerge-ooxml
//!
//! DOCX package handling for docmerge.
//!
//! This crate provides functionality to:
//! - Read DOCX templates and locate their placeholders
//! - Fill a template from a flat tag → text mapping
//! - Write the filled package back to disk
//!
//! ## Example
//!
//! ```no_run
//! use docmerge_ooxml::{DocxRenderer, RenderContext, Template, TemplateRenderer};
//!
//! let template = Template::load("protocolo.docx")?;
//! let mut context = RenderContext::new();
//! for tag in template.inline_tags() {
//!     context.insert(tag, String::from("..."));
//! }
//!
//! let filled = DocxRenderer::new().render(&template, &context)?;
//! filled.write_to_file("protocolo_RELLENADO.docx")?;
//! # Ok::<(), docmerge_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod placeholders;
pub mod render;
pub mod template;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::{OoxmlArchive, DOCUMENT_PART};
pub use error::{OoxmlError, Result};
pub use placeholders::{field_tags, inline_tags, merge_field_name, merge_split_placeholders};
pub use render::{DocxRenderer, RenderContext, TemplateRenderer};
pub use template::Template;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
