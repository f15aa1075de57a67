use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::store::atomic_write;
use crate::model::filter::FilterState;

/// Persisted app flags (written to .state.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    filter: FilterState,
    #[serde(default)]
    onboarding_shown: bool,
}

impl AppState {
    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn onboarding_shown(&self) -> bool {
        self.onboarding_shown
    }

    /// First launch is over; start from the unfiltered list
    pub fn mark_onboarding_shown(&mut self) {
        self.onboarding_shown = true;
        self.filter = FilterState::AllTasks;
    }
}

/// Read .state.json from the data directory
pub fn read_app_state(data_dir: &Path) -> Option<AppState> {
    let path = data_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_app_state(data_dir: &Path, state: &AppState) -> Result<(), std::io::Error> {
    let path = data_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&path, content.as_bytes())
}
