use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use uuid::Uuid;

use crate::model::category::{Catalog, Category};
use crate::ops::resolve::{VisibleSection, VisibleSet};

/// Build a case-insensitive matcher for `query` taken literally.
///
/// Returns None for a blank query, which means "no search active".
pub fn query_matcher(query: &str) -> Option<Regex> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(trimmed))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Sections whose task names contain the query, ignoring date and filter.
///
/// The pinned category comes first; tasks it surfaced are not repeated
/// under their own category.
pub fn search_visible_set(catalog: &Catalog, re: &Regex) -> VisibleSet {
    let mut visible = Vec::new();
    let mut shown: HashSet<Uuid> = HashSet::new();

    if let Some(pinned) = catalog.pinned() {
        push_matches(pinned, re, &mut shown, &mut visible);
    }
    for category in catalog.regular() {
        push_matches(category, re, &mut shown, &mut visible);
    }

    visible
}

fn push_matches(
    category: &Category,
    re: &Regex,
    shown: &mut HashSet<Uuid>,
    visible: &mut VisibleSet,
) {
    let tasks: Vec<_> = category
        .tasks
        .iter()
        .filter(|t| re.is_match(&t.name) && !shown.contains(&t.id))
        .cloned()
        .collect();
    if tasks.is_empty() {
        return;
    }
    shown.extend(tasks.iter().map(|t| t.id));
    visible.push(VisibleSection {
        title: category.title.clone(),
        tasks,
    });
}
