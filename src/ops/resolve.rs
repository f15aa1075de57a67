use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::model::category::Catalog;
use crate::model::filter::FilterState;
use crate::model::record::Ledger;
use crate::model::task::{Task, TaskKind, Weekday};
use crate::ops::ledger_ops::is_completed_on;
use crate::util::locale::Locale;

/// One rendered section: a category title and the tasks shown under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleSection {
    pub title: String,
    pub tasks: Vec<Task>,
}

impl VisibleSection {
    pub fn task_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.tasks.iter().map(|t| t.id)
    }
}

/// What the list shows, in order. Empty means the placeholder is shown.
pub type VisibleSet = Vec<VisibleSection>;

/// Which placeholder to show when the visible set is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// Nothing has been created yet
    NothingTracked,
    /// A filter or search hides everything
    NothingFound,
}

impl EmptyState {
    pub fn message(self, locale: Locale) -> &'static str {
        match self {
            EmptyState::NothingTracked => locale.nothing_tracked(),
            EmptyState::NothingFound => locale.nothing_found(),
        }
    }
}

/// Placeholder kind for an empty list under `filter`
pub fn empty_state(filter: FilterState) -> EmptyState {
    match filter {
        FilterState::AllTasks => EmptyState::NothingTracked,
        _ => EmptyState::NothingFound,
    }
}

/// Derive the sections to render for `date` under `filter`.
///
/// The pinned category comes first and is never filtered. Every other
/// category keeps catalog order and only lists tasks that are due on the
/// date's weekday (habits) or still open (events), narrowed by the filter.
/// Tasks already shown as pinned are skipped, and empty sections dropped.
pub fn resolve_visible_set(
    catalog: &Catalog,
    ledger: &Ledger,
    date: NaiveDate,
    filter: FilterState,
    locale: Locale,
) -> VisibleSet {
    let mut visible = Vec::new();
    let mut shown: HashSet<Uuid> = HashSet::new();

    if let Some(pinned) = catalog.pinned()
        && !pinned.tasks.is_empty()
    {
        let mut tasks = Vec::new();
        for task in &pinned.tasks {
            if shown.insert(task.id) {
                tasks.push(task.clone());
            }
        }
        visible.push(VisibleSection {
            title: pinned.title.clone(),
            tasks,
        });
    }

    let weekday = Weekday::from(date.weekday());

    for category in catalog.regular() {
        let mut tasks = Vec::new();
        for task in &category.tasks {
            if shown.contains(&task.id) {
                continue;
            }
            if is_visible(task, ledger, date, weekday, filter, locale) {
                shown.insert(task.id);
                tasks.push(task.clone());
            }
        }
        if !tasks.is_empty() {
            visible.push(VisibleSection {
                title: category.title.clone(),
                tasks,
            });
        }
    }

    visible
}

fn is_visible(
    task: &Task,
    ledger: &Ledger,
    date: NaiveDate,
    weekday: Weekday,
    filter: FilterState,
    locale: Locale,
) -> bool {
    match task.kind() {
        TaskKind::Habit => {
            let due = task
                .schedule
                .iter()
                .any(|day| locale.same_weekday(*day, weekday));
            if !due {
                return false;
            }
            match filter {
                FilterState::CompletedOnes => is_completed_on(ledger, task.id, date),
                FilterState::NotCompletedOnes => !is_completed_on(ledger, task.id, date),
                FilterState::AllTasks | FilterState::TasksForToday => true,
            }
        }
        TaskKind::Event => match filter {
            FilterState::CompletedOnes => is_completed_on(ledger, task.id, date),
            // A completed event leaves every other view for good
            _ => !ledger.has_record(task.id),
        },
    }
}
