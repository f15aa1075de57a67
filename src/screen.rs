//! The tracker list controller.
//!
//! [`Screen`] owns the store and the app state, remembers the selected date,
//! the search query and the last rendered visible set. Every user action
//! goes through one method here, which mutates the store, drains its events,
//! re-resolves the list and reports how the rendered list should change.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::io::events::{StoreEvent, StoreObserver};
use crate::io::state::AppState;
use crate::io::store::Store;
use crate::model::config::AppConfig;
use crate::model::filter::FilterState;
use crate::model::record::CompletionRecord;
use crate::model::task::{Task, TaskDraft};
use crate::ops::catalog_ops::{CatalogError, EditOutcome, validate_draft};
use crate::ops::ledger_ops::days_completed;
use crate::ops::reconcile::{Reconciliation, reconcile};
use crate::ops::resolve::{EmptyState, VisibleSet, empty_state, resolve_visible_set};
use crate::ops::search::{query_matcher, search_visible_set};
use crate::util::locale::Locale;

/// The list after an action and how to get there from the previous one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewUpdate {
    pub reconciliation: Reconciliation,
    pub visible: VisibleSet,
}

pub struct Screen {
    store: Store,
    state: AppState,
    config: AppConfig,
    today: NaiveDate,
    date: NaiveDate,
    query: String,
    matcher: Option<Regex>,
    visible: VisibleSet,
    /// Store events since the last render that can change the visible set
    pending: usize,
}

impl Screen {
    /// Open the screen on `today`. The first launch marks onboarding done
    /// and makes sure the pinned category exists under the current locale.
    pub fn new(store: Store, state: AppState, config: AppConfig, today: NaiveDate) -> Self {
        let mut screen = Screen {
            store,
            state,
            config,
            today,
            date: today,
            query: String::new(),
            matcher: None,
            visible: Vec::new(),
            pending: 0,
        };
        if !screen.state.onboarding_shown() {
            screen.state.mark_onboarding_shown();
            screen.store.ensure_pinned();
        }
        screen.store.localize_pinned(screen.locale());
        screen.drain();
        screen.visible = screen.resolve();
        screen.pending = 0;
        screen
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.ui.locale
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn filter(&self) -> FilterState {
        self.state.filter()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// The placeholder to show, if the list is empty
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.visible.is_empty() {
            None
        } else if self.matcher.is_some() {
            Some(EmptyState::NothingFound)
        } else {
            Some(empty_state(self.filter()))
        }
    }

    /// Localized completion count, e.g. "3 days"
    pub fn days_label(&self, task_id: Uuid) -> String {
        self.locale()
            .days_count(days_completed(self.store.ledger(), task_id))
    }

    /// Give back the parts that get persisted
    pub fn into_parts(self) -> (Store, AppState, AppConfig) {
        (self.store, self.state, self.config)
    }

    // -----------------------------------------------------------------------
    // View-only actions
    // -----------------------------------------------------------------------

    /// Pick a date. Leaving today drops the "today" filter.
    pub fn set_date(&mut self, date: NaiveDate) -> ViewUpdate {
        if self.filter() == FilterState::TasksForToday && date != self.today {
            self.state.set_filter(FilterState::AllTasks);
        }
        self.date = date;
        self.render()
    }

    /// Pick a filter. The "today" filter also jumps back to today.
    pub fn choose_filter(&mut self, filter: FilterState) -> ViewUpdate {
        self.state.set_filter(filter);
        if filter == FilterState::TasksForToday {
            self.date = self.today;
        }
        self.render()
    }

    /// Search task names; a blank query returns to the dated list
    pub fn set_search(&mut self, query: &str) -> ViewUpdate {
        self.query = query.to_string();
        self.matcher = query_matcher(query);
        self.render()
    }

    /// Switch language; renames the pinned category to match
    pub fn set_locale(&mut self, locale: Locale) -> ViewUpdate {
        self.config.ui.locale = locale;
        self.store.localize_pinned(locale);
        self.after_store_change()
    }

    // -----------------------------------------------------------------------
    // Store actions
    // -----------------------------------------------------------------------

    pub fn add_category(&mut self, title: &str) -> Result<(String, ViewUpdate), CatalogError> {
        let title = self.store.add_category(title)?;
        Ok((title, self.after_store_change()))
    }

    pub fn add_task(
        &mut self,
        category: &str,
        draft: &TaskDraft,
    ) -> Result<(Task, ViewUpdate), CatalogError> {
        let draft = validate_draft(draft, self.config.limits.max_name_len)?;
        let task = self.store.add_task(category, draft)?;
        Ok((task, self.after_store_change()))
    }

    pub fn edit_task(
        &mut self,
        id: Uuid,
        draft: &TaskDraft,
        category: Option<&str>,
    ) -> Result<(EditOutcome, ViewUpdate), CatalogError> {
        let draft = validate_draft(draft, self.config.limits.max_name_len)?;
        let outcome = self.store.edit_task(id, draft, category)?;
        Ok((outcome, self.after_store_change()))
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<(Task, ViewUpdate), CatalogError> {
        let task = self.store.delete_task(id)?;
        Ok((task, self.after_store_change()))
    }

    pub fn pin(&mut self, id: Uuid) -> Result<(Task, ViewUpdate), CatalogError> {
        let task = self.store.pin(id)?;
        Ok((task, self.after_store_change()))
    }

    pub fn unpin(&mut self, id: Uuid) -> Result<(Task, ViewUpdate), CatalogError> {
        let task = self.store.unpin(id)?;
        Ok((task, self.after_store_change()))
    }

    /// Toggle completion on the selected date
    pub fn toggle(
        &mut self,
        id: Uuid,
    ) -> Result<(Option<CompletionRecord>, ViewUpdate), CatalogError> {
        let record = self.store.toggle(id, self.date)?;
        Ok((record, self.after_store_change()))
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn resolve(&self) -> VisibleSet {
        match &self.matcher {
            Some(re) => search_visible_set(self.store.catalog(), re),
            None => resolve_visible_set(
                self.store.catalog(),
                self.store.ledger(),
                self.date,
                self.filter(),
                self.locale(),
            ),
        }
    }

    fn drain(&mut self) {
        for event in self.store.drain_events() {
            self.on_store_event(&event);
        }
    }

    fn after_store_change(&mut self) -> ViewUpdate {
        self.drain();
        if self.pending == 0 {
            return ViewUpdate {
                reconciliation: Reconciliation::Refresh,
                visible: self.visible.clone(),
            };
        }
        self.render()
    }

    fn render(&mut self) -> ViewUpdate {
        let next = self.resolve();
        let reconciliation = reconcile(&self.visible, &next);
        tracing::debug!(
            date = %self.date,
            filter = self.filter().key(),
            sections = next.len(),
            ?reconciliation,
            "rendered"
        );
        self.visible = next;
        self.pending = 0;
        ViewUpdate {
            reconciliation,
            visible: self.visible.clone(),
        }
    }
}

impl StoreObserver for Screen {
    fn on_store_event(&mut self, event: &StoreEvent) {
        let affects_view = match event {
            // an empty category is never shown
            StoreEvent::CategoryAdded { title } => {
                tracing::debug!(%title, "category added");
                false
            }
            StoreEvent::TaskAdded { task, category } | StoreEvent::TaskUpdated { task, category } => {
                tracing::debug!(
                    event = event.label(),
                    id = %task.id,
                    name = %task.name,
                    %category,
                    "task changed"
                );
                true
            }
            StoreEvent::TaskDeleted { task } => {
                tracing::debug!(id = %task.id, name = %task.name, "task deleted");
                true
            }
            // search results ignore completion
            StoreEvent::RecordChanged { task_id, record } => {
                let days = record.as_ref().map_or(0, |r| r.dates.len());
                tracing::debug!(%task_id, days, "record changed");
                self.matcher.is_none()
            }
            StoreEvent::PinnedRenamed { from, to } => {
                tracing::debug!(%from, %to, "pinned category renamed");
                true
            }
        };
        if affects_view {
            self.pending += 1;
        }
    }
}
