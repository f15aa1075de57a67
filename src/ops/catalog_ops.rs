use uuid::Uuid;

use crate::model::category::{Catalog, Category};
use crate::model::task::{Task, TaskDraft, emoji_hint};
use crate::util::locale::Locale;
use crate::util::unicode::grapheme_count;

/// Error type for catalog operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("category already exists: {0}")]
    CategoryExists(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("the pinned category can't hold tasks directly; use pin")]
    PinnedCategory,
    #[error("category title can't be empty")]
    EmptyTitle,
    #[error("name can't be empty")]
    EmptyName,
    #[error("name is limited to {limit} characters")]
    NameTooLong { limit: usize },
    #[error("an emoji is required, for example {}", emoji_hint())]
    MissingEmoji,
    #[error("not found: {0}")]
    TaskNotFound(String),
    #[error("'{0}' matches more than one id; use more characters")]
    AmbiguousTask(String),
    #[error("already pinned: {0}")]
    AlreadyPinned(String),
    #[error("not pinned: {0}")]
    NotPinned(String),
}

/// Outcome of an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub task: Task,
    /// The task's regular category after the edit
    pub category: String,
    /// The task turned from a habit into an event or back
    pub kind_changed: bool,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a task by id, preferring its regular category copy
pub fn find_task(catalog: &Catalog, id: Uuid) -> Option<&Task> {
    catalog
        .regular()
        .chain(catalog.pinned())
        .flat_map(|c| c.tasks.iter())
        .find(|t| t.id == id)
}

/// Title of the regular category holding the task
pub fn home_category(catalog: &Catalog, id: Uuid) -> Option<&str> {
    catalog
        .regular()
        .find(|c| c.contains(id))
        .map(|c| c.title.as_str())
}

pub fn is_pinned(catalog: &Catalog, id: Uuid) -> bool {
    catalog.pinned().is_some_and(|c| c.contains(id))
}

/// Resolve a full id or a unique prefix of its hex digits
pub fn resolve_task_ref(catalog: &Catalog, reference: &str) -> Result<Uuid, CatalogError> {
    let needle = reference.trim().to_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(CatalogError::TaskNotFound(reference.to_string()));
    }
    let mut matches: Vec<Uuid> = catalog
        .categories
        .iter()
        .flat_map(|c| c.tasks.iter())
        .map(|t| t.id)
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    matches.sort();
    matches.dedup();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CatalogError::TaskNotFound(reference.to_string())),
        _ => Err(CatalogError::AmbiguousTask(reference.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalize and check a draft: trimmed non-blank name within the limit, an emoji.
pub fn validate_draft(draft: &TaskDraft, max_name_len: usize) -> Result<TaskDraft, CatalogError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if grapheme_count(name) > max_name_len {
        return Err(CatalogError::NameTooLong {
            limit: max_name_len,
        });
    }
    let emoji = draft.emoji.trim();
    if emoji.is_empty() {
        return Err(CatalogError::MissingEmoji);
    }
    Ok(TaskDraft {
        name: name.to_string(),
        color: draft.color,
        emoji: emoji.to_string(),
        schedule: draft.schedule.clone(),
    })
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Create an empty category
pub fn add_category(catalog: &mut Catalog, title: &str) -> Result<String, CatalogError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CatalogError::EmptyTitle);
    }
    if !catalog.insert_category(Category::new(title)) {
        return Err(CatalogError::CategoryExists(title.to_string()));
    }
    Ok(title.to_string())
}

/// Make sure the pinned category exists
pub fn ensure_pinned(catalog: &mut Catalog) {
    let title = catalog.pinned_title.clone();
    catalog.insert_category(Category::new(title));
}

/// Rename the pinned category to `locale`'s title when it carries another
/// locale's title. Returns the previous title if a rename happened.
pub fn localize_pinned(catalog: &mut Catalog, locale: Locale) -> Option<String> {
    let target = locale.pinned_title();
    if catalog.pinned_title == target {
        return None;
    }
    if catalog.category(target).is_some() {
        // a user category already uses the title
        return None;
    }
    let previous = std::mem::replace(&mut catalog.pinned_title, target.to_string());
    if let Some(category) = catalog.category_mut(&previous) {
        category.title = target.to_string();
        catalog.sort();
    }
    Some(previous)
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn insert_by_name(tasks: &mut Vec<Task>, task: Task) {
    let pos = tasks.partition_point(|t| t.name <= task.name);
    tasks.insert(pos, task);
}

/// Add a new task built from a validated draft to a regular category.
pub fn add_task(
    catalog: &mut Catalog,
    category: &str,
    draft: TaskDraft,
) -> Result<Task, CatalogError> {
    if catalog.is_pinned_title(category) {
        return Err(CatalogError::PinnedCategory);
    }
    let target = catalog
        .category_mut(category)
        .ok_or_else(|| CatalogError::CategoryNotFound(category.to_string()))?;
    let task = Task::new(draft.name, draft.color, draft.emoji, draft.schedule);
    insert_by_name(&mut target.tasks, task.clone());
    Ok(task)
}

/// Apply a draft to every copy of the task, moving it if `category` differs
/// from its current regular category.
pub fn edit_task(
    catalog: &mut Catalog,
    id: Uuid,
    draft: TaskDraft,
    category: Option<&str>,
) -> Result<EditOutcome, CatalogError> {
    let before = find_task(catalog, id)
        .cloned()
        .ok_or_else(|| CatalogError::TaskNotFound(id.to_string()))?;
    let current = home_category(catalog, id)
        .map(str::to_string)
        .ok_or_else(|| CatalogError::TaskNotFound(id.to_string()))?;
    let destination = category.unwrap_or(&current).to_string();
    if catalog.is_pinned_title(&destination) {
        return Err(CatalogError::PinnedCategory);
    }
    if catalog.category(&destination).is_none() {
        return Err(CatalogError::CategoryNotFound(destination));
    }

    let updated = Task {
        id,
        name: draft.name,
        color: draft.color,
        emoji: draft.emoji,
        schedule: draft.schedule,
    };

    let pinned_title = catalog.pinned_title.clone();
    for cat in &mut catalog.categories {
        let Some(pos) = cat.tasks.iter().position(|t| t.id == id) else {
            continue;
        };
        if cat.title == pinned_title {
            // pinned keeps the order tasks were pinned in
            cat.tasks[pos] = updated.clone();
            continue;
        }
        cat.tasks.remove(pos);
        if destination == current {
            insert_by_name(&mut cat.tasks, updated.clone());
        }
    }
    if destination != current {
        let target = catalog
            .category_mut(&destination)
            .ok_or_else(|| CatalogError::CategoryNotFound(destination.clone()))?;
        insert_by_name(&mut target.tasks, updated.clone());
    }

    Ok(EditOutcome {
        kind_changed: before.kind() != updated.kind(),
        task: updated,
        category: destination,
    })
}

/// Remove every copy of the task, pinned included
pub fn delete_task(catalog: &mut Catalog, id: Uuid) -> Result<Task, CatalogError> {
    let task = find_task(catalog, id)
        .cloned()
        .ok_or_else(|| CatalogError::TaskNotFound(id.to_string()))?;
    for cat in &mut catalog.categories {
        cat.tasks.retain(|t| t.id != id);
    }
    Ok(task)
}

/// Mirror the task into the pinned category
pub fn pin_task(catalog: &mut Catalog, id: Uuid) -> Result<Task, CatalogError> {
    let task = find_task(catalog, id)
        .cloned()
        .ok_or_else(|| CatalogError::TaskNotFound(id.to_string()))?;
    if is_pinned(catalog, id) {
        return Err(CatalogError::AlreadyPinned(task.name));
    }
    ensure_pinned(catalog);
    let title = catalog.pinned_title.clone();
    if let Some(pinned) = catalog.category_mut(&title) {
        pinned.tasks.push(task.clone());
    }
    Ok(task)
}

/// Drop the pinned copy of the task
pub fn unpin_task(catalog: &mut Catalog, id: Uuid) -> Result<Task, CatalogError> {
    let title = catalog.pinned_title.clone();
    let pinned = catalog
        .category_mut(&title)
        .ok_or_else(|| CatalogError::NotPinned(id.to_string()))?;
    let pos = pinned
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| CatalogError::NotPinned(id.to_string()))?;
    Ok(pinned.tasks.remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{PALETTE, Schedule, Weekday};

    fn draft(name: &str) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            color: PALETTE[4],
            emoji: "🥦".into(),
            schedule: Schedule::new(),
        }
    }

    fn habit_draft(name: &str) -> TaskDraft {
        TaskDraft {
            schedule: [Weekday::Monday].into_iter().collect(),
            ..draft(name)
        }
    }

    fn sample() -> Catalog {
        let mut catalog = Catalog::new("Pinned");
        ensure_pinned(&mut catalog);
        add_category(&mut catalog, "Health").unwrap();
        add_category(&mut catalog, "Work").unwrap();
        catalog
    }

    #[test]
    fn categories_stay_sorted() {
        let mut catalog = sample();
        add_category(&mut catalog, "Errands").unwrap();
        let titles: Vec<_> = catalog.categories.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Errands", "Health", "Pinned", "Work"]);
    }

    #[test]
    fn duplicate_and_blank_categories_rejected() {
        let mut catalog = sample();
        assert_eq!(
            add_category(&mut catalog, "Work"),
            Err(CatalogError::CategoryExists("Work".into()))
        );
        assert_eq!(
            add_category(&mut catalog, "Pinned"),
            Err(CatalogError::CategoryExists("Pinned".into()))
        );
        assert_eq!(add_category(&mut catalog, "  "), Err(CatalogError::EmptyTitle));
    }

    #[test]
    fn validate_trims_and_limits_name() {
        let ok = validate_draft(&draft("  Read  "), 38).unwrap();
        assert_eq!(ok.name, "Read");
        assert_eq!(validate_draft(&draft("   "), 38), Err(CatalogError::EmptyName));
        let long = "x".repeat(39);
        assert_eq!(
            validate_draft(&draft(&long), 38),
            Err(CatalogError::NameTooLong { limit: 38 })
        );
        // graphemes, not bytes
        let cyrillic = "я".repeat(38);
        assert!(validate_draft(&draft(&cyrillic), 38).is_ok());
        let mut no_emoji = draft("Read");
        no_emoji.emoji = " ".into();
        assert_eq!(validate_draft(&no_emoji, 38), Err(CatalogError::MissingEmoji));
        assert!(CatalogError::MissingEmoji.to_string().contains("🙂 😻 🌺"));
    }

    #[test]
    fn add_task_requires_regular_existing_category() {
        let mut catalog = sample();
        assert_eq!(
            add_task(&mut catalog, "Nope", draft("Read")),
            Err(CatalogError::CategoryNotFound("Nope".into()))
        );
        assert_eq!(
            add_task(&mut catalog, "Pinned", draft("Read")),
            Err(CatalogError::PinnedCategory)
        );
        let task = add_task(&mut catalog, "Health", draft("Read")).unwrap();
        assert_eq!(home_category(&catalog, task.id), Some("Health"));
    }

    #[test]
    fn tasks_kept_in_name_order() {
        let mut catalog = sample();
        add_task(&mut catalog, "Work", draft("Report")).unwrap();
        add_task(&mut catalog, "Work", draft("Email")).unwrap();
        add_task(&mut catalog, "Work", draft("Standup")).unwrap();
        let names: Vec<_> = catalog
            .category("Work")
            .unwrap()
            .tasks
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Email", "Report", "Standup"]);
    }

    #[test]
    fn pin_mirrors_and_unpin_restores() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", habit_draft("Run")).unwrap();

        pin_task(&mut catalog, run.id).unwrap();
        assert!(is_pinned(&catalog, run.id));
        assert_eq!(home_category(&catalog, run.id), Some("Health"));
        assert!(matches!(
            pin_task(&mut catalog, run.id),
            Err(CatalogError::AlreadyPinned(_))
        ));

        unpin_task(&mut catalog, run.id).unwrap();
        assert!(!is_pinned(&catalog, run.id));
        assert!(matches!(
            unpin_task(&mut catalog, run.id),
            Err(CatalogError::NotPinned(_))
        ));
        assert_eq!(home_category(&catalog, run.id), Some("Health"));
    }

    #[test]
    fn pin_creates_missing_pinned_category() {
        let mut catalog = Catalog::new("Pinned");
        add_category(&mut catalog, "Work").unwrap();
        let t = add_task(&mut catalog, "Work", draft("Report")).unwrap();
        pin_task(&mut catalog, t.id).unwrap();
        assert_eq!(catalog.pinned().unwrap().tasks.len(), 1);
    }

    #[test]
    fn edit_updates_every_copy_and_moves_home() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", habit_draft("Run")).unwrap();
        pin_task(&mut catalog, run.id).unwrap();

        let outcome = edit_task(&mut catalog, run.id, habit_draft("Long run"), Some("Work")).unwrap();
        assert_eq!(outcome.category, "Work");
        assert!(!outcome.kind_changed);
        assert_eq!(home_category(&catalog, run.id), Some("Work"));
        assert!(catalog.category("Health").unwrap().tasks.is_empty());
        assert_eq!(catalog.pinned().unwrap().tasks[0].name, "Long run");
        assert_eq!(catalog.category("Work").unwrap().tasks[0].name, "Long run");
    }

    #[test]
    fn edit_reports_kind_change() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", habit_draft("Run")).unwrap();
        let outcome = edit_task(&mut catalog, run.id, draft("Run"), None).unwrap();
        assert!(outcome.kind_changed);
        assert_eq!(outcome.category, "Health");
        assert_eq!(catalog.category("Health").unwrap().tasks.len(), 1);
    }

    #[test]
    fn edit_rejects_unknown_or_pinned_destination() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", draft("Run")).unwrap();
        assert_eq!(
            edit_task(&mut catalog, run.id, draft("Run"), Some("Nope")),
            Err(CatalogError::CategoryNotFound("Nope".into()))
        );
        assert_eq!(
            edit_task(&mut catalog, run.id, draft("Run"), Some("Pinned")),
            Err(CatalogError::PinnedCategory)
        );
    }

    #[test]
    fn delete_removes_all_copies_but_keeps_category() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", draft("Run")).unwrap();
        pin_task(&mut catalog, run.id).unwrap();
        delete_task(&mut catalog, run.id).unwrap();
        assert!(find_task(&catalog, run.id).is_none());
        assert!(catalog.category("Health").is_some());
        assert!(catalog.pinned().unwrap().tasks.is_empty());
        assert!(delete_task(&mut catalog, run.id).is_err());
    }

    #[test]
    fn task_refs_resolve_by_unique_prefix() {
        let mut catalog = sample();
        let run = add_task(&mut catalog, "Health", draft("Run")).unwrap();
        let full = run.id.to_string();
        assert_eq!(resolve_task_ref(&catalog, &full), Ok(run.id));
        assert_eq!(resolve_task_ref(&catalog, &run.short_id()), Ok(run.id));
        assert!(matches!(
            resolve_task_ref(&catalog, ""),
            Err(CatalogError::TaskNotFound(_))
        ));

        // pinned copy doesn't make the prefix ambiguous
        pin_task(&mut catalog, run.id).unwrap();
        assert_eq!(resolve_task_ref(&catalog, &run.short_id()), Ok(run.id));
    }

    #[test]
    fn localize_pinned_renames_between_locales() {
        let mut catalog = sample();
        let previous = localize_pinned(&mut catalog, Locale::Ru);
        assert_eq!(previous.as_deref(), Some("Pinned"));
        assert_eq!(catalog.pinned_title, "Закрепленные");
        assert!(catalog.category("Закрепленные").is_some());
        assert!(catalog.category("Pinned").is_none());

        assert_eq!(localize_pinned(&mut catalog, Locale::Ru), None);
        assert_eq!(
            localize_pinned(&mut catalog, Locale::En).as_deref(),
            Some("Закрепленные")
        );
        assert_eq!(catalog.pinned_title, "Pinned");
    }
}
