use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::model::category::Catalog;
use crate::model::record::Ledger;
use crate::model::task::TaskKind;
use crate::ops::ledger_ops::days_completed;

/// Completion count for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub id: Uuid,
    pub name: String,
    pub emoji: String,
    pub category: String,
    pub kind: TaskKind,
    pub days: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub tasks: Vec<TaskProgress>,
    /// Sum of `days` over every task
    pub total: usize,
}

/// Completion counts per task in catalog order.
///
/// Pinned copies are not counted twice; each task is reported under its
/// regular category.
pub fn progress(catalog: &Catalog, ledger: &Ledger) -> Progress {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    for category in catalog.regular() {
        for task in &category.tasks {
            if !seen.insert(task.id) {
                continue;
            }
            tasks.push(TaskProgress {
                id: task.id,
                name: task.name.clone(),
                emoji: task.emoji.clone(),
                category: category.title.clone(),
                kind: task.kind(),
                days: days_completed(ledger, task.id),
            });
        }
    }
    let total = tasks.iter().map(|t| t.days).sum();
    Progress { tasks, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::CompletionRecord;
    use crate::model::task::Weekday;
    use crate::ops::resolve::tests::{MONDAY, TUESDAY, catalog_with, date, event, habit};

    #[test]
    fn counts_days_per_task_without_pinned_duplicates() {
        let run = habit("Run", &[Weekday::Monday, Weekday::Tuesday]);
        let dentist = event("Dentist");
        let catalog = catalog_with(vec![
            ("Health", vec![run.clone(), dentist.clone()]),
            ("Pinned", vec![run.clone()]),
        ]);
        let mut ledger = Ledger::new();
        ledger.put(CompletionRecord {
            task_id: run.id,
            dates: [date(MONDAY), date(TUESDAY)].into_iter().collect(),
        });

        let p = progress(&catalog, &ledger);
        assert_eq!(p.tasks.len(), 2);
        assert_eq!(p.tasks[0].name, "Run");
        assert_eq!(p.tasks[0].category, "Health");
        assert_eq!(p.tasks[0].days, 2);
        assert_eq!(p.tasks[1].kind, TaskKind::Event);
        assert_eq!(p.tasks[1].days, 0);
        assert_eq!(p.total, 2);
    }

    #[test]
    fn empty_catalog_has_no_progress() {
        let p = progress(&catalog_with(vec![]), &Ledger::new());
        assert_eq!(p, Progress::default());
    }
}
