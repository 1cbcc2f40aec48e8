//! Shared test utilities for the checklist-export test suite.
//!
//! Provides a representative document plus lookup helpers that panic with a
//! readable message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let doc = sample_document();
//! let prep = find_category(&doc, "Prep");
//! assert_eq!(item_names(prep), vec!["Book venue", "Print badges", "Order catering"]);
//! ```

use crate::document::{CallToAction, Category, ChecklistDocument, Item, Theme};

// =========================================================================
// Fixtures
// =========================================================================

pub fn item(id: &str, name: &str) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        bullet_points: Vec::new(),
        video_url: None,
        completed: false,
    }
}

pub fn category(id: &str, name: &str, items: Vec<Item>) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        items,
    }
}

/// Two categories (3 and 5 items), a YouTube video and a call to action.
pub fn sample_document() -> ChecklistDocument {
    let mut venue = item("i1", "Book venue");
    venue.bullet_points = vec!["Call ahead".into(), "Pay deposit".into()];
    venue.video_url = Some("https://vimeo.com/76979871".into());
    venue.description = "Confirm capacity first".into();

    ChecklistDocument {
        id: "1712345678901".into(),
        name: "Launch Checklist".into(),
        description: Some("Everything before going live".into()),
        logo: None,
        banner_image: None,
        video_url: Some("https://www.youtube.com/watch?v=abc123".into()),
        custom_image: None,
        custom_image_redirect_url: None,
        categories: vec![
            category(
                "c1",
                "Prep",
                vec![venue, item("i2", "Print badges"), item("i3", "Order catering")],
            ),
            category(
                "c2",
                "Launch",
                vec![
                    item("i4", "Open doors"),
                    item("i5", "Welcome talk"),
                    item("i6", "Demo"),
                    item("i7", "Q&A"),
                    item("i8", "Wrap up"),
                ],
            ),
        ],
        theme: Theme::default(),
        opt_in_enabled: false,
        opt_in_form_html: None,
        call_to_action: CallToAction {
            text: "Get the full guide".into(),
            link: "https://example.com/guide".into(),
        },
        created_at: Some("2024-01-01T00:00:00.000Z".into()),
        updated_at: Some("2024-01-02T00:00:00.000Z".into()),
    }
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a category by name. Panics if not found.
pub fn find_category<'a>(doc: &'a ChecklistDocument, name: &str) -> &'a Category {
    doc.categories
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = doc.categories.iter().map(|c| c.name.as_str()).collect();
            panic!("category '{name}' not found. Available: {names:?}")
        })
}

/// All item names in category order.
pub fn item_names(category: &Category) -> Vec<&str> {
    category.items.iter().map(|i| i.name.as_str()).collect()
}

/// Extract the JSON literal embedded in a generated `popup.js`.
pub fn embedded_json(script: &str) -> serde_json::Value {
    let start = script
        .find(crate::markup::DATA_PREFIX)
        .expect("popup.js has no embedded data")
        + crate::markup::DATA_PREFIX.len();
    let end = start
        + script[start..]
            .find(crate::markup::DATA_SUFFIX)
            .expect("embedded data is not terminated");
    serde_json::from_str(&script[start..end]).expect("embedded data is valid JSON")
}
