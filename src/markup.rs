//! Popup document and runtime script generation.
//!
//! The popup is two files:
//!
//! - `popup.html`: a static shell with an empty `#app` mount point, linking
//!   `styles.css` and `popup.js`. Manifest V3 forbids inline scripts, so the
//!   page carries no `<script>` body and no `on*` attributes.
//! - `popup.js`: the document serialized as a `const checklistData = …;`
//!   literal, followed by the fixed runtime from `static/popup.js`.
//!
//! The runtime renders everything client-side from the embedded data, keeps
//! progress in `chrome.storage.local` (falling back to `localStorage`), and
//! wires all interaction through delegated `data-action` click handlers.
//!
//! ## Embedded data
//!
//! The literal is the document's own camelCase JSON plus a few values resolved
//! here so the runtime never re-derives them:
//!
//! | Key | Value |
//! |---|---|
//! | `media` | [`MediaPresentation`] for the leading section |
//! | `introTitle` | `"What is {name}?"` |
//! | `cta` | `{text, link}` when both are set, else `null` |
//! | `optInGate` | opt-in markup when the gate is on, else `null` |
//!
//! JSON is a syntactic subset of JavaScript, and `serde_json` escapes every
//! control character inside strings, so any document text is safe in the
//! literal. The payload is pretty-printed and never contains `;\n`, which
//! makes [`DATA_SUFFIX`] an unambiguous terminator.

use crate::bundle::{SCRIPT_PATH, STYLESHEET_PATH};
use crate::document::{ChecklistDocument, ThemeMode};
use crate::media::MediaPresentation;
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;

const JS_RUNTIME: &str = include_str!("../static/popup.js");

/// Text immediately preceding the embedded JSON in `popup.js`.
pub const DATA_PREFIX: &str = "const checklistData = ";
/// Text immediately following the embedded JSON in `popup.js`.
pub const DATA_SUFFIX: &str = ";\n";

/// ID of the synthetic leading section. Never collides with builder IDs,
/// which are numeric timestamps.
pub const INTRO_SECTION_ID: &str = "what-is";

/// Title of the leading section.
pub fn intro_title(doc: &ChecklistDocument) -> String {
    format!("What is {}?", doc.name)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CtaTarget<'a> {
    text: &'a str,
    link: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupData<'a> {
    #[serde(flatten)]
    document: &'a ChecklistDocument,
    media: MediaPresentation,
    intro_title: String,
    cta: Option<CtaTarget<'a>>,
    opt_in_gate: Option<&'a str>,
}

impl<'a> PopupData<'a> {
    fn new(doc: &'a ChecklistDocument) -> Self {
        Self {
            document: doc,
            media: MediaPresentation::for_document(doc),
            intro_title: intro_title(doc),
            cta: doc
                .call_to_action
                .target()
                .map(|(text, link)| CtaTarget { text, link }),
            opt_in_gate: doc.opt_in_form(),
        }
    }
}

/// `popup.html`: the page shell the extension action opens.
pub fn build_popup_html(doc: &ChecklistDocument) -> String {
    let body_class = match doc.theme.mode {
        ThemeMode::Light => "theme-light",
        ThemeMode::Dark => "theme-dark",
    };
    popup_shell(&doc.name, body_class).into_string()
}

fn popup_shell(title: &str, body_class: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(STYLESHEET_PATH);
            }
            body class=(body_class) {
                div #app {}
                script src=(SCRIPT_PATH) {}
            }
        }
    }
}

/// `popup.js`: the embedded document followed by the runtime.
pub fn build_popup_script(doc: &ChecklistDocument) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string_pretty(&PopupData::new(doc))?;
    Ok(format!(
        "// Generated by checklist-export. Changes are overwritten on the next export.\n\n\
         {DATA_PREFIX}{payload}{DATA_SUFFIX}\n{JS_RUNTIME}"
    ))
}
