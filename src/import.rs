//! Bulk category import.
//!
//! Accepts the simple authoring format the category editor takes as a paste
//! or file upload:
//!
//! ```json
//! {
//!   "title": "Optional",
//!   "description": "Optional",
//!   "categories": [
//!     { "name": "Prep", "items": [ { "text": "Book venue", "details": ["Call ahead"] } ] }
//!   ]
//! }
//! ```
//!
//! Validation walks the raw JSON value so errors name the exact path that is
//! wrong (`categories[1].items[0].text`) instead of a serde position. Input is
//! checked completely before anything is built, so a rejected import never
//! yields a partial result.
//!
//! Imported entities get positional IDs: `cat-1`, `cat-1-item-1`, … Items map
//! `text` to `name` and `details` to `bulletPoints`.

use crate::document::{CallToAction, Category, ChecklistDocument, Item, Theme, ValidationError};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedChecklist {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Vec<Category>,
}

impl ImportedChecklist {
    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Wrap the import in a new document.
    ///
    /// The name is `name_override`, else the import's `title`. Without either
    /// the document would have no name, which is rejected.
    pub fn into_document(
        self,
        id: &str,
        name_override: Option<&str>,
    ) -> Result<ChecklistDocument, ValidationError> {
        let name = name_override
            .map(str::to_string)
            .or(self.title)
            .ok_or_else(|| ValidationError::MissingField {
                field: "title".into(),
            })?;
        let doc = ChecklistDocument {
            id: id.to_string(),
            name,
            description: self.description,
            logo: None,
            banner_image: None,
            video_url: None,
            custom_image: None,
            custom_image_redirect_url: None,
            categories: self.categories,
            theme: Theme::default(),
            opt_in_enabled: false,
            opt_in_form_html: None,
            call_to_action: CallToAction::default(),
            created_at: None,
            updated_at: None,
        };
        doc.validate()?;
        Ok(doc)
    }
}

/// Parse and validate an import payload.
pub fn parse_import(json: &str) -> Result<ImportedChecklist, ValidationError> {
    let value: Value = serde_json::from_str(json)?;
    import_value(&value)
}

pub fn import_value(value: &Value) -> Result<ImportedChecklist, ValidationError> {
    let root = value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: "(root)".into(),
        expected: "an object",
    })?;

    let title = optional_string(root, "title", "title")?;
    let description = optional_string(root, "description", "description")?;
    let raw_categories = required_array(root, "categories", "categories")?;

    let categories = raw_categories
        .iter()
        .enumerate()
        .map(|(ci, raw)| import_category(ci, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportedChecklist {
        title,
        description,
        categories,
    })
}

fn import_category(ci: usize, raw: &Value) -> Result<Category, ValidationError> {
    let path = format!("categories[{ci}]");
    let obj = as_object(raw, &path)?;
    let name = required_string(obj, "name", &format!("{path}.name"))?;
    let raw_items = required_array(obj, "items", &format!("{path}.items"))?;

    let id = format!("cat-{}", ci + 1);
    let items = raw_items
        .iter()
        .enumerate()
        .map(|(ii, raw)| import_item(&id, &path, ii, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Category { id, name, items })
}

fn import_item(
    category_id: &str,
    category_path: &str,
    ii: usize,
    raw: &Value,
) -> Result<Item, ValidationError> {
    let path = format!("{category_path}.items[{ii}]");
    let obj = as_object(raw, &path)?;
    let name = required_string(obj, "text", &format!("{path}.text"))?;

    let details_path = format!("{path}.details");
    let bullet_points = match obj.get("details") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(details)) => details
            .iter()
            .enumerate()
            .map(|(di, d)| {
                d.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::WrongType {
                        field: format!("{details_path}[{di}]"),
                        expected: "a string",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: details_path,
                expected: "an array of strings",
            });
        }
    };

    Ok(Item {
        id: format!("{category_id}-item-{}", ii + 1),
        name,
        description: String::new(),
        bullet_points,
        video_url: None,
        completed: false,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: path.to_string(),
        expected: "an object",
    })
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField {
            field: path.to_string(),
        }),
        Some(Value::Array(values)) => Ok(values),
        Some(_) => Err(ValidationError::WrongType {
            field: path.to_string(),
            expected: "an array",
        }),
    }
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField {
            field: path.to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::Empty {
            field: path.to_string(),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            field: path.to_string(),
            expected: "a string",
        }),
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::WrongType {
            field: path.to_string(),
            expected: "a string",
        }),
    }
}
