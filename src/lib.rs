//! # Checklist Export
//!
//! Turns an interactive checklist document into a self-contained Chrome
//! extension: a Manifest V3 bundle whose popup renders the checklist, tracks
//! completion in browser storage, and works with no server behind it.
//!
//! # Architecture: Generate, Assemble, Deliver
//!
//! An export is one pass over an immutable document snapshot:
//!
//! ```text
//! 1. Generate   ChecklistDocument  →  BundleFiles   (manifest, popup, CSS, JS, icons, README)
//! 2. Assemble   BundleFiles        →  zip bytes     (fixed order, fixed timestamps)
//! 3. Deliver    zip bytes          →  DownloadSink  (directory, memory, host download)
//! ```
//!
//! Every generator is a pure function of the document, so the same document
//! always yields the same bytes. Failures anywhere in the pass are caught by
//! [`export`] and reported as one structured outcome; no partial archive is
//! ever delivered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | The checklist document model, JSON parsing, validation |
//! | [`media`] | Video link resolution and the popup's media slot (`MediaPresentation`) |
//! | [`manifest`] | `manifest.json` generation |
//! | [`markup`] | `popup.html` shell and `popup.js` (embedded data + runtime) via Maud |
//! | [`style`] | `styles.css`: theme tokens over a fixed base sheet |
//! | [`icons`] | PNG icons: embedded logo, else the default check mark |
//! | [`bundle`] | Runs all generators into an ordered in-memory file set, plus README |
//! | [`archive`] | Deterministic zip assembly and download sinks |
//! | [`export`] | Orchestrator: state machine, events, structured outcome |
//! | [`naming`] | Archive filename slug |
//! | [`progress`] | Model of the popup's persisted progress state |
//! | [`import`] | Bulk category import from the editor's JSON format |
//! | [`config`] | `export.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Offline by Construction
//!
//! The popup never fetches anything to work. The document is embedded in
//! `popup.js`, styles are a local file, and icons are rasterized at export
//! time. Remote media (thumbnails, custom images) degrades to nothing when
//! offline instead of breaking the checklist.
//!
//! ## No Inline Script
//!
//! Manifest V3's content security policy forbids inline script and `on*`
//! attributes. The popup shell is static Maud markup; all behavior lives in
//! `popup.js` and hangs off delegated `data-action` handlers.
//!
//! ## Resolve Once, Render Everywhere
//!
//! Media dispatch (image vs. video vs. nothing) is resolved once into a
//! tagged [`media::MediaPresentation`] and embedded in the popup data. The
//! runtime switches on `type` instead of re-parsing URLs at each render site.
//!
//! ## Deterministic Archives
//!
//! Entries are written in a fixed order with the zip epoch as timestamp and
//! fixed permissions, so re-exporting an unchanged checklist produces a
//! byte-identical archive that diffs and caches cleanly.

pub mod archive;
pub mod bundle;
pub mod config;
pub mod document;
pub mod export;
pub mod icons;
pub mod import;
pub mod manifest;
pub mod markup;
pub mod media;
pub mod naming;
pub mod output;
pub mod progress;
pub mod style;

#[cfg(test)]
pub(crate) mod test_helpers;
