use checklist_export::archive::DirectorySink;
use checklist_export::document::ChecklistDocument;
use checklist_export::export::{self, ExportOutcome};
use checklist_export::progress::ProgressState;
use checklist_export::{config, import, naming, output};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use walkdir::WalkDir;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "checklist-export")]
#[command(about = "Package checklist documents as offline Chrome extensions")]
#[command(long_about = "\
Package checklist documents as offline Chrome extensions

Each document is a JSON snapshot saved by the checklist builder. Export turns
it into a Manifest V3 extension: a popup that renders the checklist, tracks
progress in browser storage, and works without network access.

Archive layout:

  <name>-chrome-extension.zip
  ├── manifest.json
  ├── popup.html
  ├── styles.css
  ├── popup.js                 # Embedded document + popup runtime
  ├── icons/
  │   ├── icon-16.png
  │   ├── icon-48.png
  │   └── icon-128.png
  └── README.md                # Install instructions

Set RUST_LOG=debug to trace each export step.

Run 'checklist-export gen-config' to generate a documented export.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing export.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export documents as Chrome extension archives
    Export {
        /// Document JSON files, or directories to search for *.json
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory (overrides output_dir in export.toml)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate documents and print their contents without exporting
    Check {
        /// Document JSON files, or directories to search for *.json
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Convert a category import file into a checklist document
    Import {
        /// Import JSON ({ title?, description?, categories: [...] })
        input: PathBuf,
        /// ID for the new document
        #[arg(long)]
        id: String,
        /// Document name (defaults to the import's title)
        #[arg(long)]
        name: Option<String>,
        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the popup's progress display for a document
    Preview {
        /// Document JSON file
        input: PathBuf,
        /// Completed item IDs, comma separated
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,
        /// Storage snapshot JSON ({"completedItems": [...]}) to start from
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Print a stock export.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Export { inputs, output } => {
            let export_config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&export_config.processing);

            let output_dir = output.unwrap_or_else(|| PathBuf::from(&export_config.output_dir));
            let sink = DirectorySink::new(output_dir, export_config.archive.overwrite);
            let options = export_config.archive_options();
            let documents = collect_documents(&inputs)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_export_event(&event) {
                        println!("{}", line);
                    }
                }
            });

            // Parse everything first so archive names can be settled for the
            // whole batch before any export starts.
            let loaded: Vec<(&PathBuf, Result<ChecklistDocument, String>)> = documents
                .par_iter()
                .map(|path| (path, load_document(path)))
                .collect();
            let mut filenames = naming::unique_filenames(
                loaded
                    .iter()
                    .filter_map(|(_, doc)| doc.as_ref().ok())
                    .map(|doc| naming::archive_filename(&doc.name)),
            )
            .into_iter();
            let jobs: Vec<(&PathBuf, Result<(ChecklistDocument, String), String>)> = loaded
                .into_iter()
                .map(|(path, doc)| {
                    let job = doc.map(|doc| {
                        let filename = filenames
                            .next()
                            .unwrap_or_else(|| naming::archive_filename(&doc.name));
                        (doc, filename)
                    });
                    (path, job)
                })
                .collect();

            let outcomes: Vec<ExportOutcome> = jobs
                .par_iter()
                .map_with(tx, |tx, (path, job)| match job {
                    Ok((doc, filename)) => {
                        export::export_named(doc, filename, &sink, &options, Some(&*tx))
                    }
                    Err(error) => {
                        let outcome = ExportOutcome::Failure {
                            error: error.clone(),
                        };
                        let _ = tx.send(export::ExportEvent::Finished {
                            document: path.display().to_string(),
                            outcome: outcome.clone(),
                        });
                        outcome
                    }
                })
                .collect();
            printer.join().map_err(|_| "output thread panicked")?;

            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            println!();
            println!(
                "{}",
                output::format_export_summary(outcomes.len() - failed, failed)
            );
            if failed > 0 {
                return Err(format!("{failed} export(s) failed").into());
            }
        }
        Command::Check { inputs } => {
            let documents = collect_documents(&inputs)?;
            let mut invalid = 0;
            for path in &documents {
                let json = std::fs::read_to_string(path)?;
                match ChecklistDocument::from_json(&json) {
                    Ok(doc) => output::print_check_output(&doc, &path.display().to_string()),
                    Err(e) => {
                        invalid += 1;
                        println!("{}: {}", path.display(), e);
                    }
                }
            }
            if invalid > 0 {
                return Err(format!("{invalid} document(s) invalid").into());
            }
            println!("==> {} document(s) valid", documents.len());
        }
        Command::Import {
            input,
            id,
            name,
            out,
        } => {
            let json = std::fs::read_to_string(&input)?;
            let imported = import::parse_import(&json)?;
            let doc = imported.clone().into_document(&id, name.as_deref())?;
            let doc_json = serde_json::to_string_pretty(&doc)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, format!("{doc_json}\n"))?;
                    output::print_import_output(&imported, &path.display().to_string());
                }
                None => println!("{doc_json}"),
            }
        }
        Command::Preview {
            input,
            completed,
            state,
        } => {
            let doc = ChecklistDocument::from_json(&std::fs::read_to_string(&input)?)?;
            let mut progress = match state {
                Some(path) => ProgressState::from_storage_json(&std::fs::read_to_string(path)?)?,
                None => ProgressState::default(),
            };
            for id in completed.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
                if !progress.is_completed(id) {
                    progress.toggle_item(id);
                }
            }
            output::print_preview(&doc, &progress);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Size the global rayon pool from `[processing]`.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    debug!(threads, "export workers");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Expand inputs into document paths: files as given, directories searched
/// recursively for `*.json`, sorted for stable output.
fn collect_documents(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut documents = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            documents.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_json(entry.path()) {
                found.push(entry.into_path());
            }
        }
        if found.is_empty() {
            warn!(dir = %input.display(), "no .json documents found");
        }
        found.sort();
        documents.extend(found);
    }
    Ok(documents)
}

/// Read and parse one document, as a printable error on failure.
fn load_document(path: &Path) -> Result<ChecklistDocument, String> {
    let json =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read document: {e}"))?;
    ChecklistDocument::from_json(&json).map_err(|e| export::ExportError::from(e).to_string())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
