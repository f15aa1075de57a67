use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The active display filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterState {
    #[default]
    AllTasks,
    TasksForToday,
    CompletedOnes,
    NotCompletedOnes,
}

impl FilterState {
    pub const ALL: [FilterState; 4] = [
        FilterState::AllTasks,
        FilterState::TasksForToday,
        FilterState::CompletedOnes,
        FilterState::NotCompletedOnes,
    ];

    /// Persisted key, also accepted on the command line
    pub fn key(self) -> &'static str {
        match self {
            FilterState::AllTasks => "allTasks",
            FilterState::TasksForToday => "tasksForToday",
            FilterState::CompletedOnes => "completedOnes",
            FilterState::NotCompletedOnes => "notCompletedOnes",
        }
    }

    /// Short command-line alias
    pub fn alias(self) -> &'static str {
        match self {
            FilterState::AllTasks => "all",
            FilterState::TasksForToday => "today",
            FilterState::CompletedOnes => "completed",
            FilterState::NotCompletedOnes => "not-completed",
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Error returned for an unknown filter name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected all, today, completed or not-completed)")]
pub struct FilterParseError(pub String);

impl FromStr for FilterState {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FilterState::ALL
            .into_iter()
            .find(|f| f.alias() == trimmed || f.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FilterParseError(s.to_string()))
    }
}
