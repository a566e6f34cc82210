//! # docmerge-core
//!
//! Tag matching and cell resolution engine for docmerge.
//!
//! Fills DOCX templates from spreadsheet cells. A mapping sheet pairs labels
//! with coordinates; template tags are matched to labels under normalization
//! and fallback rules, each coordinate is read, and the filled document is
//! written together with an audit report.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use docmerge_core::{Pipeline, Settings};
//!
//! let pipeline = Pipeline::new(Settings::default());
//! let summary = pipeline.run(
//!     Path::new("protocolo.docx"),
//!     &[PathBuf::from("paciente.xlsx")],
//!     &|line: &str| println!("{}", line),
//! );
//! assert_eq!(summary.total, 1);
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod resolve;

pub use config::Settings;
pub use error::{CoreError, PipelineError, ResolutionError, Result, Stage};
pub use extract::extract_tags;
pub use mapping::{MappingEntry, MappingTable};
pub use normalize::normalize;
pub use pipeline::{BatchSummary, FileFailure, FileOutcome, LogSink, Merge, Pipeline};
pub use reconcile::{reconcile, MatchMethod, MatchRecord};
pub use report::Report;
pub use resolve::Resolver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
