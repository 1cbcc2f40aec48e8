//! CLI output formatting for every command.
//!
//! # Names First
//!
//! Output leads with what a thing *is* (a checklist name, a category title, a
//! positional index) and shows files and hashes as indented context. The same
//! helpers ([`entity_header`], [`item_line`]) are used by `check`, `preview`
//! and `import`, so a category looks the same everywhere.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Launch Checklist
//!     Source: fixtures/checklist.json
//!     Description: Everything before going live
//!     Media: YouTube video abc123
//!     Theme: light, #3b82f6, medium
//! 001 Prep (3 items)
//!     001 Book venue
//!         Bullets: 2
//!         Video: https://vimeo.com/76979871
//!     002 Print badges
//! Call to action: Get the full guide → https://example.com/guide
//! Opt-in: off
//! ```
//!
//! ## Export
//!
//! ```text
//! Launch Checklist → dist/launch-checklist-chrome-extension.zip
//!     manifest.json (402 B, 5d41402a)
//!     popup.html (295 B, 7d793037)
//!     ...
//!     Archive: 9.6 KiB
//!
//! Exported 1 checklist
//! ```
//!
//! ## Preview
//!
//! ```text
//! Launch Checklist 25% [#####---------------]
//! 001 Prep 1/3
//!     [x] Book venue
//!     [ ] Print badges
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::document::{Category, ChecklistDocument, FontSize, ThemeMode};
use crate::export::{ExportEvent, ExportOutcome};
use crate::import::ImportedChecklist;
use crate::markup::intro_title;
use crate::media::{MediaPresentation, VideoKind};
use crate::progress::ProgressState;

const PROGRESS_BAR_WIDTH: usize = 20;
const HASH_PREFIX_LEN: usize = 8;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a category header: positional index + name + item count.
///
/// ```text
/// 001 Prep (3 items)
/// 002 Empty (0 items)
/// ```
fn entity_header(index: usize, title: &str, count: usize) -> String {
    let noun = if count == 1 { "item" } else { "items" };
    format!("{} {} ({} {})", format_index(index), title, count, noun)
}

/// Format an item line, falling back to the ID when the name is blank.
///
/// ```text
/// 001 Book venue
/// 002 (i2)
/// ```
fn item_line(index: usize, name: &str, id: &str) -> String {
    if name.trim().is_empty() {
        format!("{} ({})", format_index(index), id)
    } else {
        format!("{} {}", format_index(index), name)
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * PROGRESS_BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn media_line(media: &MediaPresentation) -> Option<String> {
    match media {
        MediaPresentation::Image {
            src,
            redirect_url: Some(link),
        } => Some(format!("Image {} → {}", truncate_desc(src, 60), link)),
        MediaPresentation::Image { src, .. } => Some(format!("Image {}", truncate_desc(src, 60))),
        MediaPresentation::Video(video) => Some(match (video.kind, video.id.as_deref()) {
            (VideoKind::Youtube, Some(id)) => format!("YouTube video {id}"),
            (VideoKind::Vimeo, Some(id)) => format!("Vimeo video {id}"),
            _ => format!("Video link {}", video.canonical_url),
        }),
        MediaPresentation::None => None,
    }
}

fn category_lines(lines: &mut Vec<String>, index: usize, category: &Category) {
    lines.push(entity_header(index, &category.name, category.items.len()));
    for (ii, item) in category.items.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), item_line(ii + 1, &item.name, &item.id)));
        if !item.description.trim().is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(2),
                truncate_desc(item.description.trim(), 60)
            ));
        }
        if !item.bullet_points.is_empty() {
            lines.push(format!("{}Bullets: {}", indent(2), item.bullet_points.len()));
        }
        if let Some(video) = item.video_link() {
            lines.push(format!("{}Video: {}", indent(2), video));
        }
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the inventory of a validated document.
pub fn format_check_output(doc: &ChecklistDocument, source: &str) -> Vec<String> {
    let mut lines = vec![doc.name.clone()];
    lines.push(format!("{}Source: {}", indent(1), source));
    if let Some(description) = doc.description_text() {
        lines.push(format!(
            "{}Description: {}",
            indent(1),
            truncate_desc(description, 60)
        ));
    }
    if let Some(media) = media_line(&MediaPresentation::for_document(doc)) {
        lines.push(format!("{}Media: {}", indent(1), media));
    }
    let mode = match doc.theme.mode {
        ThemeMode::Light => "light",
        ThemeMode::Dark => "dark",
    };
    let size = match doc.theme.font_size {
        FontSize::Small => "small",
        FontSize::Medium => "medium",
        FontSize::Large => "large",
    };
    lines.push(format!(
        "{}Theme: {}, {}, {}",
        indent(1),
        mode,
        doc.theme.primary_color,
        size
    ));

    for (ci, category) in doc.categories.iter().enumerate() {
        category_lines(&mut lines, ci + 1, category);
    }

    if let Some((text, link)) = doc.call_to_action.target() {
        lines.push(format!("Call to action: {text} \u{2192} {link}"));
    }
    match doc.opt_in_form() {
        Some(form) => lines.push(format!(
            "Opt-in: on ({})",
            truncate_desc(strip_html_tags(form).trim(), 40)
        )),
        None => lines.push("Opt-in: off".to_string()),
    }
    lines
}

pub fn print_check_output(doc: &ChecklistDocument, source: &str) {
    for line in format_check_output(doc, source) {
        println!("{}", line);
    }
}

// ============================================================================
// export
// ============================================================================

/// Format one progress event from the export pipeline.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::StateChanged { .. } => Vec::new(),
        ExportEvent::Finished { document, outcome } => format_export_outcome(document, outcome),
    }
}

/// Format the result of exporting one document.
pub fn format_export_outcome(document: &str, outcome: &ExportOutcome) -> Vec<String> {
    match outcome {
        ExportOutcome::Success {
            location,
            files,
            archive_bytes,
            ..
        } => {
            let mut lines = vec![format!("{} \u{2192} {}", document, location)];
            for file in files {
                let hash = file.sha256.get(..HASH_PREFIX_LEN).unwrap_or(&file.sha256);
                lines.push(format!(
                    "{}{} ({}, {})",
                    indent(1),
                    file.path,
                    format_size(file.bytes),
                    hash
                ));
            }
            lines.push(format!("{}Archive: {}", indent(1), format_size(*archive_bytes)));
            lines
        }
        ExportOutcome::Failure { error } => vec![format!("{}: {}", document, error)],
    }
}

/// Final tally line for a batch export.
pub fn format_export_summary(succeeded: usize, failed: usize) -> String {
    let noun = |n: usize| if n == 1 { "checklist" } else { "checklists" };
    if failed == 0 {
        format!("Exported {} {}", succeeded, noun(succeeded))
    } else {
        format!(
            "Exported {} {}, {} failed",
            succeeded,
            noun(succeeded),
            failed
        )
    }
}

// ============================================================================
// preview
// ============================================================================

/// Render the popup's progress display as text.
///
/// The leading "What is …?" section is listed but never counted.
pub fn format_preview(doc: &ChecklistDocument, state: &ProgressState) -> Vec<String> {
    let percent = state.overall(doc).percent();
    let mut lines = vec![format!("{} {}% {}", doc.name, percent, progress_bar(percent))];
    lines.push(format!("{} {}", format_index(1), intro_title(doc)));

    for (ci, category) in doc.categories.iter().enumerate() {
        let tally = state.category(category);
        lines.push(format!(
            "{} {} {}/{}",
            format_index(ci + 2),
            category.name,
            tally.completed,
            tally.total
        ));
        for item in &category.items {
            let mark = if state.is_completed(&item.id) { "x" } else { " " };
            lines.push(format!("{}[{}] {}", indent(1), mark, item.name));
        }
    }

    if let Some((text, link)) = doc.call_to_action.target() {
        lines.push(format!("{text} \u{2192} {link}"));
    }
    lines
}

pub fn print_preview(doc: &ChecklistDocument, state: &ProgressState) {
    for line in format_preview(doc, state) {
        println!("{}", line);
    }
}

// ============================================================================
// import
// ============================================================================

/// Summarize an import and where the resulting document went.
pub fn format_import_output(imported: &ImportedChecklist, destination: &str) -> Vec<String> {
    let title = imported.title.as_deref().unwrap_or("(untitled import)");
    let mut lines = vec![format!("{} \u{2192} {}", title, destination)];
    for (ci, category) in imported.categories.iter().enumerate() {
        category_lines(&mut lines, ci + 1, category);
    }
    lines.push(format!(
        "Imported {} categories, {} items",
        imported.categories.len(),
        imported.total_items()
    ));
    lines
}

pub fn print_import_output(imported: &ImportedChecklist, destination: &str) {
    for line in format_import_output(imported, destination) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
