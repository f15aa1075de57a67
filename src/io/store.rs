use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::io::events::StoreEvent;
use crate::io::lock::LockError;
use crate::model::category::Catalog;
use crate::model::record::{CompletionRecord, Ledger};
use crate::model::task::{Task, TaskDraft};
use crate::ops::catalog_ops::{self, CatalogError, EditOutcome};
use crate::ops::ledger_ops::{remove_task, toggle_completion};
use crate::util::locale::Locale;

pub const STORE_FILE: &str = "store.json";
pub const DATA_DIR_ENV: &str = "PULSE_DIR";

/// Error type for store persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no pulse data in {0}: run `pulse init` first")]
    NotInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEdit(#[from] toml_edit::TomlError),
    #[error("no data directory: pass --data-dir or set PULSE_DIR")]
    NoDataDir,
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// On-disk layout of store.json
#[derive(Serialize, Deserialize)]
struct StoreFile {
    #[serde(flatten)]
    catalog: Catalog,
    #[serde(default)]
    records: Ledger,
}

/// Owns the catalog and the ledger; every mutation queues a [`StoreEvent`].
#[derive(Debug, Clone)]
pub struct Store {
    catalog: Catalog,
    ledger: Ledger,
    events: Vec<StoreEvent>,
}

impl Store {
    pub fn new(catalog: Catalog, ledger: Ledger) -> Self {
        Store {
            catalog,
            ledger,
            events: Vec::new(),
        }
    }

    /// A fresh store holding only the pinned category
    pub fn fresh(locale: Locale) -> Self {
        let mut catalog = Catalog::new(locale.pinned_title());
        catalog_ops::ensure_pinned(&mut catalog);
        Store::new(catalog, Ledger::new())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: StoreEvent) {
        tracing::debug!(event = event.label(), "store event");
        self.events.push(event);
    }

    fn home_of(&self, id: Uuid) -> String {
        catalog_ops::home_category(&self.catalog, id)
            .unwrap_or_default()
            .to_string()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn ensure_pinned(&mut self) {
        if self.catalog.pinned().is_none() {
            catalog_ops::ensure_pinned(&mut self.catalog);
            let title = self.catalog.pinned_title.clone();
            self.emit(StoreEvent::CategoryAdded { title });
        }
    }

    pub fn add_category(&mut self, title: &str) -> Result<String, CatalogError> {
        let title = catalog_ops::add_category(&mut self.catalog, title)?;
        tracing::info!(%title, "category added");
        self.emit(StoreEvent::CategoryAdded {
            title: title.clone(),
        });
        Ok(title)
    }

    /// Add a task from an already validated draft
    pub fn add_task(&mut self, category: &str, draft: TaskDraft) -> Result<Task, CatalogError> {
        let task = catalog_ops::add_task(&mut self.catalog, category, draft)?;
        tracing::info!(id = %task.id, name = %task.name, category, "task added");
        self.emit(StoreEvent::TaskAdded {
            task: task.clone(),
            category: category.to_string(),
        });
        Ok(task)
    }

    /// Edit a task. A habit turned event (or back) loses its records.
    pub fn edit_task(
        &mut self,
        id: Uuid,
        draft: TaskDraft,
        category: Option<&str>,
    ) -> Result<EditOutcome, CatalogError> {
        let outcome = catalog_ops::edit_task(&mut self.catalog, id, draft, category)?;
        tracing::info!(%id, kind_changed = outcome.kind_changed, "task edited");
        self.emit(StoreEvent::TaskUpdated {
            task: outcome.task.clone(),
            category: outcome.category.clone(),
        });
        if outcome.kind_changed && remove_task(&mut self.ledger, id) {
            self.emit(StoreEvent::RecordChanged {
                task_id: id,
                record: None,
            });
        }
        Ok(outcome)
    }

    /// Delete every copy of the task and its records
    pub fn delete_task(&mut self, id: Uuid) -> Result<Task, CatalogError> {
        let task = catalog_ops::delete_task(&mut self.catalog, id)?;
        tracing::info!(%id, name = %task.name, "task deleted");
        if remove_task(&mut self.ledger, id) {
            self.emit(StoreEvent::RecordChanged {
                task_id: id,
                record: None,
            });
        }
        self.emit(StoreEvent::TaskDeleted { task: task.clone() });
        Ok(task)
    }

    pub fn pin(&mut self, id: Uuid) -> Result<Task, CatalogError> {
        let created = self.catalog.pinned().is_none();
        let task = catalog_ops::pin_task(&mut self.catalog, id)?;
        if created {
            let title = self.catalog.pinned_title.clone();
            self.emit(StoreEvent::CategoryAdded { title });
        }
        let category = self.home_of(id);
        self.emit(StoreEvent::TaskUpdated {
            task: task.clone(),
            category,
        });
        Ok(task)
    }

    pub fn unpin(&mut self, id: Uuid) -> Result<Task, CatalogError> {
        let task = catalog_ops::unpin_task(&mut self.catalog, id)?;
        let category = self.home_of(id);
        self.emit(StoreEvent::TaskUpdated {
            task: task.clone(),
            category,
        });
        Ok(task)
    }

    /// Flip the task's completion on `date`
    pub fn toggle(
        &mut self,
        id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, CatalogError> {
        let task = catalog_ops::find_task(&self.catalog, id)
            .cloned()
            .ok_or_else(|| CatalogError::TaskNotFound(id.to_string()))?;
        let record = toggle_completion(&mut self.ledger, &task, date);
        let done = record.as_ref().is_some_and(|r| r.dates.contains(&date));
        tracing::info!(%id, %date, done, "completion toggled");
        self.emit(StoreEvent::RecordChanged {
            task_id: id,
            record: record.clone(),
        });
        Ok(record)
    }

    /// Give the pinned category `locale`'s title
    pub fn localize_pinned(&mut self, locale: Locale) -> Option<String> {
        let from = catalog_ops::localize_pinned(&mut self.catalog, locale)?;
        let to = self.catalog.pinned_title.clone();
        tracing::info!(%from, %to, "pinned category renamed");
        self.emit(StoreEvent::PinnedRenamed {
            from: from.clone(),
            to,
        });
        Some(from)
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Pick the data directory: explicit flag, then `PULSE_DIR`, then the
/// platform data dir.
pub fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf, StoreError> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|d| d.join("pulse"))
        .ok_or(StoreError::NoDataDir)
}

pub fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(STORE_FILE).is_file()
}

/// Load store.json from the data directory
pub fn load_store(data_dir: &Path) -> Result<Store, StoreError> {
    let path = data_dir.join(STORE_FILE);
    if !path.exists() {
        return Err(StoreError::NotInitialized(data_dir.to_path_buf()));
    }
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let mut file: StoreFile =
        serde_json::from_str(&text).map_err(|e| StoreError::Json { path, source: e })?;
    // lookups binary-search by title; the file may have been edited by hand
    file.catalog.sort();
    tracing::debug!(
        categories = file.catalog.categories.len(),
        records = file.records.len(),
        "store loaded"
    );
    Ok(Store::new(file.catalog, file.records))
}

/// Write store.json atomically
pub fn save_store(data_dir: &Path, store: &Store) -> Result<(), StoreError> {
    let path = data_dir.join(STORE_FILE);
    let file = StoreFile {
        catalog: store.catalog.clone(),
        records: store.ledger.clone(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|e| StoreError::Json {
        path: path.clone(),
        source: e,
    })?;
    atomic_write(&path, json.as_bytes()).map_err(|e| StoreError::WriteError { path, source: e })?;
    tracing::debug!("store saved");
    Ok(())
}

/// Write via a temp file in the same directory, then rename over `path`
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{PALETTE, Schedule, Weekday};
    use tempfile::TempDir;

    fn draft(name: &str, days: &[Weekday]) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            color: PALETTE[0],
            emoji: "🙂".into(),
            schedule: days.iter().copied().collect::<Schedule>(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn save_then_load_keeps_everything() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::fresh(Locale::En);
        store.add_category("Health").unwrap();
        let run = store.add_task("Health", draft("Run", &[Weekday::Monday])).unwrap();
        store.pin(run.id).unwrap();
        store.toggle(run.id, date("2024-05-06")).unwrap();

        save_store(tmp.path(), &store).unwrap();
        let loaded = load_store(tmp.path()).unwrap();
        assert_eq!(loaded.catalog(), store.catalog());
        assert_eq!(loaded.ledger(), store.ledger());
    }

    #[test]
    fn store_file_layout() {
        let tmp = TempDir::new().unwrap();
        save_store(tmp.path(), &Store::fresh(Locale::En)).unwrap();
        let text = fs::read_to_string(tmp.path().join(STORE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["pinned_title"], "Pinned");
        assert_eq!(value["categories"][0]["title"], "Pinned");
        assert_eq!(value["records"], serde_json::json!([]));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_store(tmp.path()),
            Err(StoreError::NotInitialized(_))
        ));
        assert!(!is_initialized(tmp.path()));
    }

    #[test]
    fn load_malformed_reports_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(STORE_FILE), "{ nope").unwrap();
        let err = load_store(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("store.json"));
    }

    #[test]
    fn load_sorts_hand_edited_categories() {
        let tmp = TempDir::new().unwrap();
        let text = r#"{
            "pinned_title": "Pinned",
            "categories": [
                {"title": "Work", "tasks": []},
                {"title": "Health", "tasks": []},
                {"title": "Pinned", "tasks": []}
            ],
            "records": []
        }"#;
        fs::write(tmp.path().join(STORE_FILE), text).unwrap();

        let mut store = load_store(tmp.path()).unwrap();
        let titles: Vec<_> = store
            .catalog()
            .categories
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["Health", "Pinned", "Work"]);

        assert_eq!(
            store.add_category("Work"),
            Err(CatalogError::CategoryExists("Work".into()))
        );
        assert_eq!(store.catalog().categories.len(), 3);
    }

    #[test]
    fn mutations_queue_events_in_order() {
        let mut store = Store::fresh(Locale::En);
        store.add_category("Work").unwrap();
        let t = store.add_task("Work", draft("Report", &[])).unwrap();
        store.toggle(t.id, date("2024-05-06")).unwrap();

        let labels: Vec<_> = store.drain_events().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["category_added", "task_added", "record_changed"]);
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn failed_mutation_queues_nothing() {
        let mut store = Store::fresh(Locale::En);
        assert!(store.add_task("Nope", draft("Report", &[])).is_err());
        assert!(store.toggle(Uuid::new_v4(), date("2024-05-06")).is_err());
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn delete_drops_records() {
        let mut store = Store::fresh(Locale::En);
        store.add_category("Work").unwrap();
        let t = store.add_task("Work", draft("Report", &[])).unwrap();
        store.toggle(t.id, date("2024-05-06")).unwrap();
        store.drain_events();

        store.delete_task(t.id).unwrap();
        assert!(store.ledger().is_empty());
        let events = store.drain_events();
        assert_eq!(
            events[0],
            StoreEvent::RecordChanged {
                task_id: t.id,
                record: None
            }
        );
        assert!(matches!(events[1], StoreEvent::TaskDeleted { .. }));
    }

    #[test]
    fn kind_change_clears_records() {
        let mut store = Store::fresh(Locale::En);
        store.add_category("Health").unwrap();
        let run = store.add_task("Health", draft("Run", &[Weekday::Monday])).unwrap();
        store.toggle(run.id, date("2024-05-06")).unwrap();

        // same shape keeps history
        store.edit_task(run.id, draft("Run far", &[Weekday::Friday]), None).unwrap();
        assert!(store.ledger().has_record(run.id));

        store.edit_task(run.id, draft("Run once", &[]), None).unwrap();
        assert!(!store.ledger().has_record(run.id));
    }

    #[test]
    fn localize_pinned_emits_rename() {
        let mut store = Store::fresh(Locale::En);
        assert_eq!(store.localize_pinned(Locale::Ru).as_deref(), Some("Pinned"));
        assert_eq!(
            store.drain_events(),
            vec![StoreEvent::PinnedRenamed {
                from: "Pinned".into(),
                to: "Закрепленные".into()
            }]
        );
        assert!(store.localize_pinned(Locale::Ru).is_none());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = Path::new("/tmp/somewhere");
        assert_eq!(resolve_data_dir(Some(dir)).unwrap(), dir);
    }

    #[test]
    fn atomic_write_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.json");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }
}
