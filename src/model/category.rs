use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;

/// A named group of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(title: impl Into<String>) -> Self {
        Category {
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }
}

/// Every category and task, plus the title of the reserved pinned category.
///
/// Categories are kept sorted by title. A task id lives in at most one
/// regular category and may additionally be mirrored into the pinned one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub pinned_title: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new(pinned_title: impl Into<String>) -> Self {
        Catalog {
            pinned_title: pinned_title.into(),
            categories: Vec::new(),
        }
    }

    pub fn category(&self, title: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.title == title)
    }

    pub fn category_mut(&mut self, title: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.title == title)
    }

    /// The pinned category, if it exists
    pub fn pinned(&self) -> Option<&Category> {
        self.category(&self.pinned_title)
    }

    pub fn is_pinned_title(&self, title: &str) -> bool {
        self.pinned_title == title
    }

    /// Regular (non-pinned) categories in display order
    pub fn regular(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |c| c.title != self.pinned_title)
    }

    /// Insert a category keeping title order. Returns false if it already exists.
    pub fn insert_category(&mut self, category: Category) -> bool {
        match self
            .categories
            .binary_search_by(|c| c.title.as_str().cmp(category.title.as_str()))
        {
            Ok(_) => false,
            Err(pos) => {
                self.categories.insert(pos, category);
                true
            }
        }
    }

    /// Re-establish title order after a rename
    pub fn sort(&mut self) {
        self.categories.sort_by(|a, b| a.title.cmp(&b.title));
    }
}
