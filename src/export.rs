//! Export orchestration.
//!
//! One export walks a small state machine:
//!
//! ```text
//! Idle ──> Generating ──> Assembling ──> Done
//!              │              │
//!              └──────────────┴──> Failed
//! ```
//!
//! - **Generating** validates the document and runs every generator into an
//!   in-memory [`BundleFiles`].
//! - **Assembling** zips the bundle and hands it to a [`DownloadSink`].
//!
//! Every error below this module is caught here and folded into an
//! [`ExportOutcome::Failure`] carrying one message string. Nothing is retried
//! and no partial archive is ever delivered: the sink only sees complete
//! archives.
//!
//! Progress is reported two ways: `tracing` spans/events for logs, and an
//! optional [`ExportEvent`] channel the CLI drains on a printer thread.

use crate::archive::{ArchiveOptions, AssemblyError, DownloadSink, assemble};
use crate::bundle::{BundleFiles, FileSummary, GenerateError, build_bundle};
use crate::document::{ChecklistDocument, ValidationError};
use crate::naming::archive_filename;
use serde::Serialize;
use serde::ser::Serializer;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, error, info, info_span};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid document: {0}")]
    Validation(#[from] ValidationError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerateError),
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportState {
    Idle,
    Generating,
    Assembling,
    Done,
    Failed,
}

impl std::fmt::Display for ExportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Result of one export.
///
/// Serializes to the host contract: `{"success": true, "filename": …}` or
/// `{"success": false, "error": …}`. The extra success fields are for local
/// reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Success {
        filename: String,
        location: String,
        files: Vec<FileSummary>,
        archive_bytes: usize,
    },
    Failure {
        error: String,
    },
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Success { filename, .. } => Some(filename),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

#[derive(Serialize)]
struct OutcomeRepr<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for ExportOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeRepr {
            success: self.is_success(),
            filename: self.filename(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// Progress messages for a UI or printer thread.
#[derive(Debug, Clone)]
pub enum ExportEvent {
    StateChanged {
        document: String,
        state: ExportState,
    },
    Finished {
        document: String,
        outcome: ExportOutcome,
    },
}

/// Event label for input that never parsed far enough to have a name.
pub const UNPARSED_DOCUMENT: &str = "(unparsed document)";

/// Tracks the state machine for one run and reports transitions.
struct Run<'a> {
    document: String,
    state: ExportState,
    events: Option<&'a Sender<ExportEvent>>,
}

impl<'a> Run<'a> {
    fn new(document: &str, events: Option<&'a Sender<ExportEvent>>) -> Self {
        Self {
            document: document.to_string(),
            state: ExportState::Idle,
            events,
        }
    }

    fn transition(&mut self, next: ExportState) {
        debug!(from = %self.state, to = %next, "export state");
        self.state = next;
        self.emit(ExportEvent::StateChanged {
            document: self.document.clone(),
            state: next,
        });
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(tx) = self.events {
            // A dropped receiver only means nobody is listening anymore.
            let _ = tx.send(event);
        }
    }
}

/// Export with default archive options and no event channel.
pub fn export_checklist(doc: &ChecklistDocument, sink: &dyn DownloadSink) -> ExportOutcome {
    export_with(doc, sink, &ArchiveOptions::default(), None)
}

/// Parse a JSON snapshot and export it. Parse errors become a failure outcome.
pub fn export_json(
    json: &str,
    sink: &dyn DownloadSink,
    options: &ArchiveOptions,
    events: Option<&Sender<ExportEvent>>,
) -> ExportOutcome {
    match ChecklistDocument::from_json(json) {
        Ok(doc) => export_with(&doc, sink, options, events),
        Err(e) => {
            let error = ExportError::from(e).to_string();
            error!(%error, "export rejected");
            let outcome = ExportOutcome::Failure { error };
            let run = Run::new(UNPARSED_DOCUMENT, events);
            run.emit(ExportEvent::Finished {
                document: run.document.clone(),
                outcome: outcome.clone(),
            });
            outcome
        }
    }
}

/// Run the full pipeline for `doc` and deliver the archive to `sink`.
pub fn export_with(
    doc: &ChecklistDocument,
    sink: &dyn DownloadSink,
    options: &ArchiveOptions,
    events: Option<&Sender<ExportEvent>>,
) -> ExportOutcome {
    export_named(doc, &archive_filename(&doc.name), sink, options, events)
}

/// Like [`export_with`], but delivers under `filename` instead of the name
/// derived from the document. Batch exports use this to keep archives whose
/// names share a slug apart.
pub fn export_named(
    doc: &ChecklistDocument,
    filename: &str,
    sink: &dyn DownloadSink,
    options: &ArchiveOptions,
    events: Option<&Sender<ExportEvent>>,
) -> ExportOutcome {
    let span = info_span!("export", document = %doc.name);
    let _guard = span.enter();

    let mut run = Run::new(&doc.name, events);
    let outcome = match run_pipeline(doc, filename, sink, options, &mut run) {
        Ok(outcome) => {
            run.transition(ExportState::Done);
            outcome
        }
        Err(e) => {
            run.transition(ExportState::Failed);
            error!(error = %e, "export failed");
            ExportOutcome::Failure {
                error: e.to_string(),
            }
        }
    };
    run.emit(ExportEvent::Finished {
        document: doc.name.clone(),
        outcome: outcome.clone(),
    });
    outcome
}

/// Validate and generate without assembling, for inspection.
pub fn generate(doc: &ChecklistDocument) -> Result<BundleFiles, ExportError> {
    doc.validate()?;
    Ok(build_bundle(doc)?)
}

fn run_pipeline(
    doc: &ChecklistDocument,
    filename: &str,
    sink: &dyn DownloadSink,
    options: &ArchiveOptions,
    run: &mut Run<'_>,
) -> Result<ExportOutcome, ExportError> {
    run.transition(ExportState::Generating);
    let files = generate(doc)?;

    run.transition(ExportState::Assembling);
    let archive = assemble(&files, options)?;
    let location = sink.deliver(filename, &archive)?;
    info!(%filename, %location, bytes = archive.len(), "extension exported");

    Ok(ExportOutcome::Success {
        filename: filename.to_string(),
        location,
        files: files.summaries(),
        archive_bytes: archive.len(),
    })
}
