//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur during OOXML operations
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Placeholder delimiters that cannot be matched up
    #[error("Template syntax error in {part}: {message}")]
    TemplateSyntax { part: String, message: String },
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
