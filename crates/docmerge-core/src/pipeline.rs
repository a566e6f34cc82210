//! Orchestrator: drives spreadsheets through the merge stages.
//!
//! Each spreadsheet moves through
//! `Loading → Extracting → Mapping → Reconciling → Resolving → Rendering →
//! Saving → Done`. A fatal error stops that spreadsheet only; the batch
//! continues with the next one. Spreadsheets are processed one at a time.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use docmerge_data::{ExcelWorkbook, SheetAccess};
use docmerge_ooxml::{DocxRenderer, OoxmlArchive, RenderContext, Template, TemplateRenderer};

use crate::config::Settings;
use crate::error::{CoreError, PipelineError, Stage};
use crate::extract::extract_tags;
use crate::mapping::{default_data_sheet, find_mapping_sheet, read_mapping, MappingTable};
use crate::reconcile::{reconcile, MatchRecord};
use crate::report::{unused_labels, EmptyCell, EmptyReason, ReadError, Report};
use crate::resolve::{split_sheet_and_coordinate, Resolver};

/// Receiver for user-visible progress lines
pub trait LogSink {
    /// Append one line to the log
    fn append(&self, line: &str);
}

impl<F: Fn(&str)> LogSink for F {
    fn append(&self, line: &str) {
        self(line)
    }
}

/// Result of filling a template from one workbook, before saving
#[derive(Debug)]
pub struct Merge {
    /// Text per template tag, one entry per tag
    pub context: RenderContext,
    pub records: Vec<MatchRecord>,
    pub report: Report,
    /// Rendered package, or the untouched template when rendering failed
    pub document: OoxmlArchive,
    /// [`CoreError::RenderFailure`] if the renderer rejected the template
    pub render_error: Option<CoreError>,
}

/// A spreadsheet that produced its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub spreadsheet: PathBuf,
    pub document: PathBuf,
    pub report: PathBuf,
    /// Render failure message; the document is the unrendered template
    pub warning: Option<String>,
}

/// A spreadsheet that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub spreadsheet: PathBuf,
    pub stage: Stage,
    pub message: String,
}

/// Tally of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Spreadsheets queued
    pub total: usize,
    pub succeeded: Vec<FileOutcome>,
    pub failed: Vec<FileFailure>,
    /// Queued spreadsheets not started because the run was cancelled
    pub skipped: Vec<PathBuf>,
}

impl BatchSummary {
    /// Final summary line
    pub fn summary_line(&self) -> String {
        format!(
            "{}/{} spreadsheets processed successfully",
            self.succeeded.len(),
            self.total
        )
    }

    /// True when every queued spreadsheet succeeded
    pub fn all_succeeded(&self) -> bool {
        self.succeeded.len() == self.total
    }
}

/// Merge engine
pub struct Pipeline<R = DocxRenderer> {
    settings: Settings,
    renderer: R,
    resolver: Resolver,
    cancel: Option<Arc<AtomicBool>>,
}

impl Pipeline<DocxRenderer> {
    /// Pipeline using the DOCX renderer
    pub fn new(settings: Settings) -> Self {
        Self::with_renderer(settings, DocxRenderer::new())
    }
}

impl<R: TemplateRenderer> Pipeline<R> {
    /// Pipeline using a custom renderer
    pub fn with_renderer(settings: Settings, renderer: R) -> Self {
        Self {
            settings,
            renderer,
            resolver: Resolver::new(),
            cancel: None,
        }
    }

    /// Replace the resolver, e.g. to pin the clock
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Stop starting new spreadsheets once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Fill `template` from `workbook` in memory
    ///
    /// `template_name` and `spreadsheet_name` only label the report.
    pub fn fill<W: SheetAccess + ?Sized>(
        &self,
        template: &Template,
        workbook: &W,
        template_name: &str,
        spreadsheet_name: &str,
    ) -> Result<Merge, PipelineError> {
        tracing::debug!(stage = %Stage::Extracting, spreadsheet = spreadsheet_name, "entering stage");
        let tags = extract_tags(template);

        tracing::debug!(stage = %Stage::Mapping, spreadsheet = spreadsheet_name, "entering stage");
        let sheet_names = workbook.sheet_names();
        let mapping_sheet = find_mapping_sheet(&sheet_names, &self.settings.mapping.sheet_name)
            .ok_or_else(|| {
                PipelineError::new(
                    Stage::Mapping,
                    CoreError::MissingMapping("workbook has no sheets".to_string()),
                )
            })?;
        let entries = read_mapping(workbook, &mapping_sheet)
            .map_err(|e| PipelineError::new(Stage::Mapping, e))?;
        let data_sheet = default_data_sheet(&sheet_names, &mapping_sheet);
        let table = MappingTable::new(&entries);

        tracing::debug!(stage = %Stage::Reconciling, spreadsheet = spreadsheet_name, "entering stage");
        let records = reconcile(&tags, &table);

        tracing::debug!(stage = %Stage::Resolving, spreadsheet = spreadsheet_name, "entering stage");
        let mut context = RenderContext::with_capacity(records.len());
        let mut empty_cells = Vec::new();
        let mut errors = Vec::new();

        for record in &records {
            let Some(label) = &record.label else {
                context.insert(record.tag.clone(), String::new());
                continue;
            };

            let (sheet, coordinate) =
                split_sheet_and_coordinate(table.coordinate(label), &data_sheet);
            let location = format!("{}!{}", sheet, coordinate);

            if coordinate.is_empty() {
                empty_cells.push(EmptyCell {
                    tag: record.tag.clone(),
                    location,
                    reason: EmptyReason::EmptyCoordinate,
                });
                context.insert(record.tag.clone(), String::new());
                continue;
            }

            match self.resolver.resolve(workbook, &sheet, &coordinate) {
                Ok(value) => {
                    tracing::debug!(tag = %record.tag, cell = %location, "resolved tag");
                    if value.trim().is_empty() {
                        empty_cells.push(EmptyCell {
                            tag: record.tag.clone(),
                            location,
                            reason: EmptyReason::EmptyCell,
                        });
                    }
                    context.insert(record.tag.clone(), value);
                }
                Err(error) => {
                    tracing::warn!(tag = %record.tag, cell = %location, %error, "could not read coordinate");
                    errors.push(ReadError {
                        tag: record.tag.clone(),
                        label: label.clone(),
                        sheet,
                        coordinate,
                        error,
                    });
                    context.insert(record.tag.clone(), String::new());
                }
            }
        }

        tracing::debug!(stage = %Stage::Rendering, spreadsheet = spreadsheet_name, "entering stage");
        let (document, render_error) = match self.renderer.render(template, &context) {
            Ok(document) => (document, None),
            Err(error) => {
                tracing::warn!(spreadsheet = spreadsheet_name, %error, "render failed, keeping template");
                (template.archive().clone(), Some(CoreError::RenderFailure(error)))
            }
        };

        let report = Report {
            template: template_name.to_string(),
            spreadsheet: spreadsheet_name.to_string(),
            mapping_sheet,
            data_sheet,
            unused_labels: unused_labels(&table, &records),
            matches: records.clone(),
            empty_cells,
            errors,
            render_warning: render_error.as_ref().map(ToString::to_string),
            max_items: self.settings.report.max_items,
        };

        Ok(Merge {
            context,
            records,
            report,
            document,
            render_error,
        })
    }

    /// Load one workbook, fill the template and write both outputs
    pub fn process_file(
        &self,
        template: &Template,
        template_path: &Path,
        spreadsheet: &Path,
    ) -> Result<FileOutcome, PipelineError> {
        tracing::debug!(stage = %Stage::Loading, spreadsheet = %spreadsheet.display(), "entering stage");
        let workbook = ExcelWorkbook::open(spreadsheet)
            .map_err(|e| PipelineError::new(Stage::Loading, e))?;

        let merge = self.fill(
            template,
            &workbook,
            &template_path.display().to_string(),
            &spreadsheet.display().to_string(),
        )?;

        tracing::debug!(stage = %Stage::Saving, spreadsheet = %spreadsheet.display(), "entering stage");
        let output = &self.settings.output;
        let document = output.document_path(spreadsheet);
        let report = output.report_path(spreadsheet);

        merge
            .document
            .write_to_file(&document)
            .map_err(|e| PipelineError::new(Stage::Saving, CoreError::Template(e)))?;
        std::fs::write(&report, merge.report.to_string())
            .map_err(|e| PipelineError::new(Stage::Saving, e))?;

        tracing::info!(document = %document.display(), "generated document");
        Ok(FileOutcome {
            spreadsheet: spreadsheet.to_path_buf(),
            document,
            report,
            warning: merge.report.render_warning,
        })
    }

    /// Process every spreadsheet in order, isolating failures
    pub fn run(&self, template_path: &Path, spreadsheets: &[PathBuf], sink: &dyn LogSink) -> BatchSummary {
        let mut summary = BatchSummary {
            total: spreadsheets.len(),
            ..BatchSummary::default()
        };

        let prepared = self.prepare(template_path);
        if let Err(error) = &prepared {
            tracing::error!(%error, "cannot start run");
            sink.append(&format!("ERROR: {}", error));
        }

        let mut used_outputs = HashSet::new();
        for spreadsheet in spreadsheets {
            if self.cancelled() {
                tracing::info!(spreadsheet = %spreadsheet.display(), "run cancelled, skipping");
                summary.skipped.push(spreadsheet.clone());
                continue;
            }

            sink.append(&format!("processing {}", spreadsheet.display()));

            // Output names come from the file stem only
            let document = self.settings.output.document_path(spreadsheet);
            if !used_outputs.insert(document.clone()) {
                tracing::warn!(
                    spreadsheet = %spreadsheet.display(),
                    document = %document.display(),
                    "output name already used in this run"
                );
                sink.append(&format!(
                    "WARNING: {}: overwrites {} from an earlier spreadsheet",
                    spreadsheet.display(),
                    document.display()
                ));
            }

            let result = match &prepared {
                Ok(template) => self.process_isolated(template, template_path, spreadsheet),
                Err(error) => Err(FileFailure {
                    spreadsheet: spreadsheet.clone(),
                    stage: error.stage,
                    message: error.to_string(),
                }),
            };

            match result {
                Ok(outcome) => {
                    if let Some(warning) = &outcome.warning {
                        sink.append(&format!("WARNING: {}: {}", spreadsheet.display(), warning));
                    }
                    sink.append(&format!("generated {}", outcome.document.display()));
                    summary.succeeded.push(outcome);
                }
                Err(failure) => {
                    sink.append(&format!("ERROR: {}: {}", spreadsheet.display(), failure.message));
                    summary.failed.push(failure);
                }
            }
        }

        sink.append(&summary.summary_line());
        summary
    }

    /// Load the template and create the output directory
    fn prepare(&self, template_path: &Path) -> Result<Template, PipelineError> {
        let template = Template::load(template_path)
            .map_err(|e| PipelineError::new(Stage::Loading, CoreError::Template(e)))?;
        std::fs::create_dir_all(&self.settings.output.directory)
            .map_err(|e| PipelineError::new(Stage::Loading, e))?;
        Ok(template)
    }

    /// `process_file` with panics turned into failures
    fn process_isolated(
        &self,
        template: &Template,
        template_path: &Path,
        spreadsheet: &Path,
    ) -> Result<FileOutcome, FileFailure> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.process_file(template, template_path, spreadsheet)
        }));

        let error = match result {
            Ok(Ok(outcome)) => return Ok(outcome),
            Ok(Err(error)) => error,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string());
                let error = CoreError::Unexpected(message);
                tracing::error!(spreadsheet = %spreadsheet.display(), error = ?error, "spreadsheet panicked");
                return Err(FileFailure {
                    spreadsheet: spreadsheet.to_path_buf(),
                    stage: Stage::Failed,
                    message: error.to_string(),
                });
            }
        };

        tracing::error!(spreadsheet = %spreadsheet.display(), error = ?error, "spreadsheet failed");
        Err(FileFailure {
            spreadsheet: spreadsheet.to_path_buf(),
            stage: error.stage,
            message: error.to_string(),
        })
    }
}
