//! Error types for the merge engine.

use std::fmt;

use thiserror::Error;

use docmerge_data::DataError;
use docmerge_ooxml::OoxmlError;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Fatal errors: each one ends the run for the current spreadsheet only
#[derive(Debug, Error)]
pub enum CoreError {
    /// No mapping sheet, or a mapping sheet without label/coordinate rows
    #[error("Missing mapping: {0}")]
    MissingMapping(String),

    /// The workbook could not be opened or read
    #[error(transparent)]
    Workbook(#[from] DataError),

    /// The template could not be opened
    #[error("Template error: {0}")]
    Template(#[source] OoxmlError),

    /// The renderer rejected the template or context
    #[error("Render failure: {0}")]
    RenderFailure(#[source] OoxmlError),

    /// Writing outputs failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

/// Per-tag resolution failures; recoverable, the tag renders empty
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The coordinate names a sheet the workbook does not have
    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    /// The coordinate is not a valid cell address
    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    /// The coordinate is a range whose bounds cannot be parsed
    #[error("invalid range '{0}'")]
    InvalidRange(String),
}

/// Processing state of one spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the workbook and the template
    Loading,
    /// Collecting template tags
    Extracting,
    /// Reading the mapping table
    Mapping,
    /// Matching tags to mapping labels
    Reconciling,
    /// Reading cell values
    Resolving,
    /// Filling the template
    Rendering,
    /// Writing the document and the report
    Saving,
    /// Finished
    Done,
    /// Stopped by an unrecoverable error
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Extracting => "extracting",
            Stage::Mapping => "mapping",
            Stage::Reconciling => "reconciling",
            Stage::Resolving => "resolving",
            Stage::Rendering => "rendering",
            Stage::Saving => "saving",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A fatal error together with the stage it happened in
#[derive(Debug, Error)]
#[error("{source} (while {stage})")]
pub struct PipelineError {
    /// Stage the spreadsheet failed in
    pub stage: Stage,
    /// Underlying error
    #[source]
    pub source: CoreError,
}

impl PipelineError {
    /// Attach a stage to an error
    pub fn new(stage: Stage, source: impl Into<CoreError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
