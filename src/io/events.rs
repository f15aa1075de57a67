use uuid::Uuid;

use crate::model::record::CompletionRecord;
use crate::model::task::Task;

/// A change made to the store, queued until the owner drains it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CategoryAdded {
        title: String,
    },
    /// A new task landed in `category`
    TaskAdded {
        task: Task,
        category: String,
    },
    /// A task was edited, moved, pinned or unpinned. `category` is its
    /// regular category afterwards.
    TaskUpdated {
        task: Task,
        category: String,
    },
    TaskDeleted {
        task: Task,
    },
    /// The record after the change; None once it's gone
    RecordChanged {
        task_id: Uuid,
        record: Option<CompletionRecord>,
    },
    PinnedRenamed {
        from: String,
        to: String,
    },
}

impl StoreEvent {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            StoreEvent::CategoryAdded { .. } => "category_added",
            StoreEvent::TaskAdded { .. } => "task_added",
            StoreEvent::TaskUpdated { .. } => "task_updated",
            StoreEvent::TaskDeleted { .. } => "task_deleted",
            StoreEvent::RecordChanged { .. } => "record_changed",
            StoreEvent::PinnedRenamed { .. } => "pinned_renamed",
        }
    }
}

/// Receives store events after each mutation
pub trait StoreObserver {
    fn on_store_event(&mut self, event: &StoreEvent);
}
