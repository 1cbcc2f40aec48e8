//! Extension descriptor (`manifest.json`) generation.
//!
//! Manifest V3 with the smallest footprint that still works offline: the only
//! permission is `storage` (for checklist progress), there are no host
//! permissions, and the CSP pins scripts and objects to the bundle itself.
//! Everything except `name`, `description` and `action.default_title` is a
//! fixed constant, so two exports of the same document produce identical bytes.

use crate::document::ChecklistDocument;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MANIFEST_VERSION: u8 = 3;
pub const EXTENSION_VERSION: &str = "1.0.0";
pub const FALLBACK_DESCRIPTION: &str = "Interactive checklist application";
pub const POPUP_ENTRY: &str = "popup.html";
pub const CONTENT_SECURITY_POLICY: &str = "script-src 'self'; object-src 'self'";

/// Icon edge lengths in pixels, smallest first.
pub const ICON_SIZES: [u32; 3] = [16, 48, 128];

/// Bundle-relative path of the icon at `size` px.
pub fn icon_path(size: u32) -> String {
    format!("icons/icon-{size}.png")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionManifest {
    pub manifest_version: u8,
    pub name: String,
    pub version: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub action: ActionBlock,
    /// Keyed by size; `BTreeMap` keeps `"128"`, `"16"`, `"48"` in a stable order.
    pub icons: BTreeMap<String, String>,
    pub content_security_policy: ContentSecurityPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionBlock {
    pub default_popup: String,
    pub default_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSecurityPolicy {
    pub extension_pages: String,
}

pub fn build_manifest(doc: &ChecklistDocument) -> ExtensionManifest {
    ExtensionManifest {
        manifest_version: MANIFEST_VERSION,
        name: doc.name.clone(),
        version: EXTENSION_VERSION.to_string(),
        description: doc
            .description_text()
            .unwrap_or(FALLBACK_DESCRIPTION)
            .to_string(),
        permissions: vec!["storage".to_string()],
        action: ActionBlock {
            default_popup: POPUP_ENTRY.to_string(),
            default_title: doc.name.clone(),
        },
        icons: ICON_SIZES
            .iter()
            .map(|size| (size.to_string(), icon_path(*size)))
            .collect(),
        content_security_policy: ContentSecurityPolicy {
            extension_pages: CONTENT_SECURITY_POLICY.to_string(),
        },
    }
}

/// Pretty-printed `manifest.json` contents.
pub fn manifest_json(doc: &ChecklistDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&build_manifest(doc))
}
