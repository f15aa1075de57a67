use std::collections::BTreeSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The dates on which a task was marked done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub task_id: Uuid,
    pub dates: BTreeSet<NaiveDate>,
}

/// Completion records keyed by task id, in insertion order.
///
/// A record is never stored with an empty date set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CompletionRecord>", into = "Vec<CompletionRecord>")]
pub struct Ledger {
    records: IndexMap<Uuid, BTreeSet<NaiveDate>>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn record_for(&self, task_id: Uuid) -> Option<CompletionRecord> {
        self.records.get(&task_id).map(|dates| CompletionRecord {
            task_id,
            dates: dates.clone(),
        })
    }

    pub fn all_records(&self) -> Vec<CompletionRecord> {
        self.records
            .iter()
            .map(|(id, dates)| CompletionRecord {
                task_id: *id,
                dates: dates.clone(),
            })
            .collect()
    }

    pub fn has_record(&self, task_id: Uuid) -> bool {
        self.records.contains_key(&task_id)
    }

    pub fn dates(&self, task_id: Uuid) -> Option<&BTreeSet<NaiveDate>> {
        self.records.get(&task_id)
    }

    /// Store a record, or drop it when its date set is empty
    pub fn put(&mut self, record: CompletionRecord) {
        if record.dates.is_empty() {
            self.records.shift_remove(&record.task_id);
        } else {
            self.records.insert(record.task_id, record.dates);
        }
    }

    pub fn remove(&mut self, task_id: Uuid) -> Option<CompletionRecord> {
        self.records
            .shift_remove(&task_id)
            .map(|dates| CompletionRecord { task_id, dates })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<CompletionRecord>> for Ledger {
    fn from(records: Vec<CompletionRecord>) -> Self {
        let mut ledger = Ledger::new();
        for record in records {
            ledger.put(record);
        }
        ledger
    }
}

impl From<Ledger> for Vec<CompletionRecord> {
    fn from(ledger: Ledger) -> Self {
        ledger.all_records()
    }
}
