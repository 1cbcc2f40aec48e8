//! Checklist progress model.
//!
//! Mirrors the state the popup runtime keeps in `chrome.storage.local`: a set
//! of completed item IDs and a set of expanded section IDs, stored under
//! [`COMPLETED_ITEMS_KEY`] and [`EXPANDED_CATEGORIES_KEY`]. The CLI uses it to
//! preview a popup's progress display from a saved storage snapshot.
//!
//! IDs that no longer exist in the document are kept but never counted, so
//! editing a checklist never pushes progress over 100%.

use crate::document::{Category, ChecklistDocument};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const COMPLETED_ITEMS_KEY: &str = "completedItems";
pub const EXPANDED_CATEGORIES_KEY: &str = "expandedCategories";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub completed_items: BTreeSet<String>,
    #[serde(default)]
    pub expanded_categories: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub completed: usize,
    pub total: usize,
}

impl Tally {
    pub fn percent(&self) -> u32 {
        percent(self.completed, self.total)
    }
}

/// `round(100 * completed / total)`, or 0 when there is nothing to complete.
pub fn percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((100 * completed) as f64 / total as f64).round() as u32
}

impl ProgressState {
    /// Parse a storage snapshot, e.g. `{"completedItems": ["i1"]}`.
    pub fn from_storage_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_completed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            completed_items: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Flip an item; returns whether it is now complete.
    pub fn toggle_item(&mut self, id: &str) -> bool {
        toggle(&mut self.completed_items, id)
    }

    /// Flip a section; returns whether it is now expanded.
    pub fn toggle_category(&mut self, id: &str) -> bool {
        toggle(&mut self.expanded_categories, id)
    }

    /// Clear completion. Expansion state is left alone.
    pub fn reset(&mut self) {
        self.completed_items.clear();
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed_items.contains(id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded_categories.contains(id)
    }

    pub fn category(&self, category: &Category) -> Tally {
        Tally {
            completed: category
                .items
                .iter()
                .filter(|item| self.is_completed(&item.id))
                .count(),
            total: category.items.len(),
        }
    }

    pub fn overall(&self, doc: &ChecklistDocument) -> Tally {
        doc.categories
            .iter()
            .map(|c| self.category(c))
            .fold(Tally { completed: 0, total: 0 }, |acc, t| Tally {
                completed: acc.completed + t.completed,
                total: acc.total + t.total,
            })
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}
