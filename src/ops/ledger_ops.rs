use chrono::{DateTime, NaiveDate, TimeZone};
use uuid::Uuid;

use crate::model::record::{CompletionRecord, Ledger};
use crate::model::task::{Task, TaskKind};

/// The calendar day of a timestamp in its own timezone.
pub fn day_of<Tz: TimeZone>(moment: &DateTime<Tz>) -> NaiveDate {
    moment.date_naive()
}

/// Whether the task was marked done on `date`
pub fn is_completed_on(ledger: &Ledger, task_id: Uuid, date: NaiveDate) -> bool {
    ledger
        .dates(task_id)
        .is_some_and(|dates| dates.contains(&date))
}

/// Number of days the task has been marked done
pub fn days_completed(ledger: &Ledger, task_id: Uuid) -> usize {
    ledger.dates(task_id).map_or(0, |dates| dates.len())
}

/// Forget every completion of the task. Returns whether anything was removed.
pub fn remove_task(ledger: &mut Ledger, task_id: Uuid) -> bool {
    ledger.remove(task_id).is_some()
}

/// Toggle completion of `task` on `date`, returning the record afterwards.
///
/// Events hold at most one record: toggling removes it when present and
/// creates a one-date record otherwise. Habits add or remove the single date.
pub fn toggle_completion(
    ledger: &mut Ledger,
    task: &Task,
    date: NaiveDate,
) -> Option<CompletionRecord> {
    match task.kind() {
        TaskKind::Event => {
            if remove_task(ledger, task.id) {
                return None;
            }
            ledger.put(CompletionRecord {
                task_id: task.id,
                dates: [date].into_iter().collect(),
            });
        }
        TaskKind::Habit => {
            let mut record = ledger.record_for(task.id).unwrap_or(CompletionRecord {
                task_id: task.id,
                dates: Default::default(),
            });
            if !record.dates.remove(&date) {
                record.dates.insert(date);
            }
            ledger.put(record);
        }
    }
    ledger.record_for(task.id)
}
