use chrono::NaiveDate;
use serde::Serialize;

use crate::model::category::Catalog;
use crate::model::record::Ledger;
use crate::model::task::{Task, TaskKind};
use crate::ops::catalog_ops::is_pinned;
use crate::ops::ledger_ops::{days_completed, is_completed_on};
use crate::ops::reconcile::{Reconciliation, ViewOp};
use crate::ops::resolve::VisibleSet;
use crate::ops::stats::Progress;
use crate::screen::{Screen, ViewUpdate};
use crate::util::locale::Locale;
use crate::util::unicode::pad_to_width;

const NAME_COLS: usize = 20;
const DAYS_COLS: usize = 9;
const CATEGORY_COLS: usize = 14;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<String>,
    /// Localized schedule for display; absent for events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub days: usize,
    pub done: bool,
    pub pinned: bool,
}

#[derive(Serialize)]
pub struct SectionJson {
    pub title: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub date: NaiveDate,
    pub filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<String>,
    pub sections: Vec<SectionJson>,
}

#[derive(Serialize)]
pub struct UpdateJson<'a> {
    pub update: &'a Reconciliation,
    pub visible: ListJson,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub title: String,
    pub tasks: usize,
    pub pinned: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(
    task: &Task,
    catalog: &Catalog,
    ledger: &Ledger,
    date: NaiveDate,
    locale: Locale,
) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        name: task.name.clone(),
        emoji: task.emoji.clone(),
        color: task.color.to_string(),
        kind: task.kind(),
        days_of_week: task.schedule.iter().map(|d| d.tag().to_string()).collect(),
        schedule: task
            .is_habit()
            .then(|| locale.schedule_label(&task.schedule)),
        days: days_completed(ledger, task.id),
        done: is_completed_on(ledger, task.id, date),
        pinned: is_pinned(catalog, task.id),
    }
}

pub fn sections_to_json(
    visible: &VisibleSet,
    catalog: &Catalog,
    ledger: &Ledger,
    date: NaiveDate,
    locale: Locale,
) -> Vec<SectionJson> {
    visible
        .iter()
        .map(|s| SectionJson {
            title: s.title.clone(),
            tasks: s
                .tasks
                .iter()
                .map(|t| task_to_json(t, catalog, ledger, date, locale))
                .collect(),
        })
        .collect()
}

/// The screen's current list as JSON
pub fn list_to_json(screen: &Screen) -> ListJson {
    let store = screen.store();
    ListJson {
        date: screen.date(),
        filter: screen.filter().key().to_string(),
        query: Some(screen.query().trim().to_string()).filter(|q| !q.is_empty()),
        empty: screen
            .empty_state()
            .map(|e| e.message(screen.locale()).to_string()),
        sections: sections_to_json(
            screen.visible(),
            store.catalog(),
            store.ledger(),
            screen.date(),
            screen.locale(),
        ),
    }
}

pub fn update_to_json<'a>(screen: &Screen, update: &'a ViewUpdate) -> UpdateJson<'a> {
    UpdateJson {
        update: &update.reconciliation,
        visible: list_to_json(screen),
    }
}

pub fn categories_to_json(catalog: &Catalog) -> Vec<CategoryJson> {
    catalog
        .categories
        .iter()
        .map(|c| CategoryJson {
            title: c.title.clone(),
            tasks: c.tasks.len(),
            pinned: catalog.is_pinned_title(&c.title),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One list row: `  [x] 🙂 Name      3 days   1a2b3c4d  Mon, Wed`
pub fn format_row(task: &Task, ledger: &Ledger, date: NaiveDate, locale: Locale) -> String {
    let mark = if is_completed_on(ledger, task.id, date) {
        "[x]"
    } else {
        "[ ]"
    };
    let mut row = format!(
        "  {} {} {}  {}  {}",
        mark,
        task.emoji,
        pad_to_width(&task.name, NAME_COLS),
        pad_to_width(&locale.days_count(days_completed(ledger, task.id)), DAYS_COLS),
        task.short_id()
    );
    if task.is_habit() {
        row.push_str("  ");
        row.push_str(&locale.schedule_label(&task.schedule));
    }
    row
}

/// Sections with their rows, separated by blank lines
pub fn format_visible(
    visible: &VisibleSet,
    ledger: &Ledger,
    date: NaiveDate,
    locale: Locale,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, section) in visible.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(section.title.clone());
        for task in &section.tasks {
            lines.push(format_row(task, ledger, date, locale));
        }
    }
    lines
}

/// The screen's list, or its placeholder when empty
pub fn format_screen(screen: &Screen) -> Vec<String> {
    if let Some(empty) = screen.empty_state() {
        return vec![empty.message(screen.locale()).to_string()];
    }
    format_visible(
        screen.visible(),
        screen.store().ledger(),
        screen.date(),
        screen.locale(),
    )
}

fn format_op(op: &ViewOp) -> String {
    match op {
        ViewOp::DeleteRow { section, row } => format!("delete row {}.{}", section, row),
        ViewOp::DeleteSection { section } => format!("delete section {}", section),
        ViewOp::InsertSection { section } => format!("insert section {}", section),
        ViewOp::InsertRow { section, row } => format!("insert row {}.{}", section, row),
    }
}

/// One-line summary of a reconciliation
pub fn format_update(reconciliation: &Reconciliation) -> String {
    match reconciliation {
        Reconciliation::Refresh => "view: refresh".to_string(),
        Reconciliation::Reload => "view: reload".to_string(),
        Reconciliation::Batch(ops) => format!(
            "view: {}",
            ops.iter().map(format_op).collect::<Vec<_>>().join(", ")
        ),
    }
}

pub fn format_categories(catalog: &Catalog) -> Vec<String> {
    catalog
        .categories
        .iter()
        .map(|c| {
            let marker = if catalog.is_pinned_title(&c.title) {
                " (pinned)"
            } else {
                ""
            };
            format!("{} [{}]{}", c.title, c.tasks.len(), marker)
        })
        .collect()
}

pub fn format_progress(progress: &Progress, locale: Locale) -> Vec<String> {
    let mut lines: Vec<String> = progress
        .tasks
        .iter()
        .map(|p| {
            format!(
                "{} {}  {}  {}",
                p.emoji,
                pad_to_width(&p.name, NAME_COLS),
                pad_to_width(&p.category, CATEGORY_COLS),
                locale.days_count(p.days)
            )
        })
        .collect();
    lines.push(format!("total: {}", locale.days_count(progress.total)));
    lines
}
