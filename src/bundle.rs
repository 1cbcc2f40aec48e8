//! In-memory extension bundle.
//!
//! [`build_bundle`] runs every generator against one document and collects the
//! results as an ordered path → bytes map. The order is fixed and is the order
//! entries are written into the archive:
//!
//! ```text
//! manifest.json
//! popup.html
//! styles.css
//! popup.js
//! icons/icon-16.png
//! icons/icon-48.png
//! icons/icon-128.png
//! README.md
//! ```
//!
//! Nothing here touches the filesystem. Generators are pure, so the bundle for
//! an unchanged document is byte-identical across runs.

use crate::document::ChecklistDocument;
use crate::icons::{IconError, build_icon_set};
use crate::manifest::{POPUP_ENTRY, icon_path, manifest_json};
use crate::markup::{build_popup_html, build_popup_script};
use crate::media::MediaPresentation;
use crate::style::build_stylesheet;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const MANIFEST_PATH: &str = "manifest.json";
pub const POPUP_HTML_PATH: &str = POPUP_ENTRY;
pub const STYLESHEET_PATH: &str = "styles.css";
pub const SCRIPT_PATH: &str = "popup.js";
pub const README_PATH: &str = "README.md";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("icon generation failed: {0}")]
    Icon(#[from] IconError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: String,
    pub content: FileContent,
}

/// Size and short content hash of one bundle entry, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
}

/// Insertion-ordered set of bundle files, unique by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleFiles {
    files: Vec<BundleFile>,
}

impl BundleFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. Re-inserting a path replaces its content in place.
    pub fn insert(&mut self, path: impl Into<String>, content: FileContent) {
        let path = path.into();
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.content = content,
            None => self.files.push(BundleFile { path, content }),
        }
    }

    pub fn insert_text(&mut self, path: impl Into<String>, text: String) {
        self.insert(path, FileContent::Text(text));
    }

    pub fn insert_binary(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.insert(path, FileContent::Binary(bytes));
    }

    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.files.iter().find(|f| f.path == path).map(|f| &f.content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BundleFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.as_bytes().len()).sum()
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|f| {
                let bytes = f.content.as_bytes();
                FileSummary {
                    path: f.path.clone(),
                    bytes: bytes.len(),
                    sha256: format!("{:x}", Sha256::digest(bytes)),
                }
            })
            .collect()
    }
}

/// Run every generator for `doc`.
pub fn build_bundle(doc: &ChecklistDocument) -> Result<BundleFiles, GenerateError> {
    let mut files = BundleFiles::new();
    files.insert_text(MANIFEST_PATH, manifest_json(doc)?);
    files.insert_text(POPUP_HTML_PATH, build_popup_html(doc));
    files.insert_text(STYLESHEET_PATH, build_stylesheet(doc));
    files.insert_text(SCRIPT_PATH, build_popup_script(doc)?);
    for (size, png) in build_icon_set(doc)? {
        files.insert_binary(icon_path(size), png);
    }
    files.insert_text(README_PATH, build_readme(doc));
    Ok(files)
}

/// Install and usage notes shipped inside the archive.
///
/// Feature bullets that don't apply to the document are left out entirely.
pub fn build_readme(doc: &ChecklistDocument) -> String {
    let mut features = vec![
        "Interactive checklist with collapsible categories".to_string(),
        "Progress tracking with visual progress bar".to_string(),
        "Persistent state (your progress is saved)".to_string(),
    ];
    match MediaPresentation::for_document(doc) {
        MediaPresentation::Image {
            redirect_url: Some(_),
            ..
        } => features.push("Custom image with redirect link".into()),
        MediaPresentation::Image { .. } => features.push("Custom image".into()),
        MediaPresentation::Video(_) => features.push("Video introduction".into()),
        MediaPresentation::None => {}
    }
    features.push(format!(
        "{} {} with {} total {}",
        doc.categories.len(),
        plural(doc.categories.len(), "category", "categories"),
        doc.total_items(),
        plural(doc.total_items(), "item", "items"),
    ));
    if doc.call_to_action.target().is_some() {
        features.push("Call-to-action link".into());
    }
    if doc.banner_image_url().is_some() {
        features.push("Banner image".into());
    }

    let mut out = format!("# {} - Chrome Extension\n\n", doc.name);
    if let Some(description) = doc.description_text() {
        out.push_str(description);
        out.push_str("\n\n");
    }
    out.push_str(
        "## Installation Instructions\n\n\
         1. Download and extract this ZIP file\n\
         2. Open Chrome and go to `chrome://extensions/`\n\
         3. Enable \"Developer mode\" in the top right\n\
         4. Click \"Load unpacked\" and select the extracted folder\n\
         5. The extension will appear in your toolbar\n\n\
         ## Usage\n\n\
         Click the extension icon in your Chrome toolbar to open the checklist. \
         Your progress will be automatically saved.\n\n\
         ## Features\n\n",
    );
    for feature in &features {
        out.push_str("- ");
        out.push_str(feature);
        out.push('\n');
    }
    out.push_str("\nGenerated by checklist-export\n");
    out
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
