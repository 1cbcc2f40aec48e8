//! The checklist document, the unit of export.
//!
//! Documents are produced by the builder UI (or by [`crate::import`]) and reach
//! the export pipeline as one complete JSON snapshot. Nothing downstream ever
//! mutates a document: every generator takes `&ChecklistDocument`.
//!
//! ## JSON shape
//!
//! Field names are camelCase to match what the builder persists:
//!
//! ```json
//! {
//!   "id": "1712345678901",
//!   "name": "Launch Checklist",
//!   "description": "Everything before going live",
//!   "videoUrl": "https://youtu.be/abc123",
//!   "categories": [
//!     { "id": "c1", "name": "Prep", "items": [
//!       { "id": "i1", "name": "Book venue", "bulletPoints": ["Call ahead"] }
//!     ] }
//!   ],
//!   "theme": { "mode": "dark", "primaryColor": "#10b981", "fontSize": "large" },
//!   "callToAction": { "text": "Get the guide", "link": "https://example.com" }
//! }
//! ```
//!
//! Optional strings may be absent, `null`, or `""`; the accessor methods treat
//! all three as "not set". Theme fields never fail to parse: an unknown mode or
//! font size falls back to the default token.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Malformed document or import input.
///
/// `field` is a path into the input, e.g. `categories[0].items[2].text`.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("field `{field}` must not be empty")]
    Empty { field: String },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_image_redirect_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: Theme,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opt_in_enabled: bool,
    /// Trusted markup, injected into the popup verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_in_form_html: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub call_to_action: CallToAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullet_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Seed value from the editor. The exported bundle ignores it and tracks
    /// completion in browser storage instead.
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallToAction {
    pub text: String,
    pub link: String,
}

impl CallToAction {
    /// `(text, link)` when both are set; the popup renders nothing otherwise.
    pub fn target(&self) -> Option<(&str, &str)> {
        let text = self.text.trim();
        let link = self.link.trim();
        (!text.is_empty() && !link.is_empty()).then_some((text, link))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub mode: ThemeMode,
    #[serde(deserialize_with = "lenient_string")]
    pub primary_color: String,
    pub font_size: FontSize,
}

pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";

impl Default for Theme {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            font_size: FontSize::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "serde_json::Value")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl From<serde_json::Value> for ThemeMode {
    fn from(value: serde_json::Value) -> Self {
        match value.as_str() {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "serde_json::Value")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl From<serde_json::Value> for FontSize {
    fn from(value: serde_json::Value) -> Self {
        match value.as_str() {
            Some("small") => Self::Small,
            Some("large") => Self::Large,
            _ => Self::Medium,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// `null` reads as the field's default, same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trimmed value of an optional field, `None` when absent or blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ChecklistDocument {
    /// Parse a document snapshot and validate it for export.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check the fields the export pipeline depends on.
    ///
    /// The name feeds the archive filename and the manifest, so it must be
    /// non-blank. Category and item IDs key the popup's persisted state, so
    /// they must be present. Duplicate IDs are not detected here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "name".into(),
            });
        }
        for (ci, category) in self.categories.iter().enumerate() {
            if category.id.trim().is_empty() {
                return Err(ValidationError::Empty {
                    field: format!("categories[{ci}].id"),
                });
            }
            for (ii, item) in category.items.iter().enumerate() {
                if item.id.trim().is_empty() {
                    return Err(ValidationError::Empty {
                        field: format!("categories[{ci}].items[{ii}].id"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn description_text(&self) -> Option<&str> {
        non_blank(&self.description)
    }

    pub fn logo_url(&self) -> Option<&str> {
        non_blank(&self.logo)
    }

    pub fn banner_image_url(&self) -> Option<&str> {
        non_blank(&self.banner_image)
    }

    pub fn video_link(&self) -> Option<&str> {
        non_blank(&self.video_url)
    }

    pub fn custom_image_url(&self) -> Option<&str> {
        non_blank(&self.custom_image)
    }

    pub fn custom_image_redirect(&self) -> Option<&str> {
        non_blank(&self.custom_image_redirect_url)
    }

    /// The opt-in form markup, only when the gate is switched on.
    pub fn opt_in_form(&self) -> Option<&str> {
        if self.opt_in_enabled {
            non_blank(&self.opt_in_form_html)
        } else {
            None
        }
    }

    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

impl Item {
    pub fn video_link(&self) -> Option<&str> {
        non_blank(&self.video_url)
    }
}
