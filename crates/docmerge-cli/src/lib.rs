//! docmerge CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docmerge:
//! - Fill: fill a DOCX template from one or more spreadsheets
//! - Tags: list the placeholders a template references
//!
//! # Library Usage
//!
//! ```ignore
//! use docmerge_cli::{fill_command, FillOptions};
//!
//! let summary = fill_command(&FillOptions {
//!     template: "protocolo.docx".into(),
//!     spreadsheets: vec!["paciente.xlsx".into()],
//!     ..FillOptions::default()
//! })?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Fill a template from two spreadsheets
//! docmerge fill protocolo.docx ana.xlsx luis.xlsx --output salidas/
//!
//! # List template tags as JSON
//! docmerge tags protocolo.docx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{fill_command, run_cli, tags_command, FillOptions, OutputFormat};
