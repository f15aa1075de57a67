use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::ops::resolve::VisibleSet;

/// A structural change to an animated sectioned list.
///
/// Deletes address the previous set, inserts address the new one, the way a
/// batched list update applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ViewOp {
    DeleteRow { section: usize, row: usize },
    DeleteSection { section: usize },
    InsertSection { section: usize },
    InsertRow { section: usize, row: usize },
}

/// How the list should move from the previous visible set to the new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "ops", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Same sections and rows; re-render cells in place
    Refresh,
    /// Apply these operations in one animated batch
    Batch(Vec<ViewOp>),
    /// Change is not a single-task delta; reload everything
    Reload,
}

/// A (section, row) position of one task in a visible set
#[derive(Debug, Clone, Copy)]
struct Slot<'a> {
    section: usize,
    row: usize,
    title: &'a str,
    id: Uuid,
}

fn slots(set: &VisibleSet) -> Vec<Slot<'_>> {
    set.iter()
        .enumerate()
        .flat_map(|(section, s)| {
            s.tasks.iter().enumerate().map(move |(row, t)| Slot {
                section,
                row,
                title: s.title.as_str(),
                id: t.id,
            })
        })
        .collect()
}

/// Titles and task ids only; cell contents don't affect structure
fn shape(set: &VisibleSet) -> Vec<(&str, Vec<Uuid>)> {
    set.iter()
        .map(|s| (s.title.as_str(), s.task_ids().collect()))
        .collect()
}

/// Compute the update that turns `old` into `new`.
///
/// Only single-task deltas are animated: one task appearing, one task
/// disappearing, or one task moving between sections (pin, unpin, category
/// change). Anything else, or any batch that would not reproduce `new`
/// exactly, falls back to a full reload.
pub fn reconcile(old: &VisibleSet, new: &VisibleSet) -> Reconciliation {
    let old_slots = slots(old);
    let new_slots = slots(new);

    let old_keys: HashSet<(&str, Uuid)> = old_slots.iter().map(|s| (s.title, s.id)).collect();
    let new_keys: HashSet<(&str, Uuid)> = new_slots.iter().map(|s| (s.title, s.id)).collect();

    let removed: Vec<&Slot> = old_slots
        .iter()
        .filter(|s| !new_keys.contains(&(s.title, s.id)))
        .collect();
    let added: Vec<&Slot> = new_slots
        .iter()
        .filter(|s| !old_keys.contains(&(s.title, s.id)))
        .collect();

    if removed.is_empty() && added.is_empty() {
        return if shape(old) == shape(new) {
            Reconciliation::Refresh
        } else {
            Reconciliation::Reload
        };
    }
    if removed.len() > 1 || added.len() > 1 {
        return Reconciliation::Reload;
    }

    let mut ops = Vec::new();
    let mut deleted_section: Option<&str> = None;

    if let Some(slot) = removed.first() {
        if old[slot.section].tasks.len() == 1 {
            ops.push(ViewOp::DeleteSection {
                section: slot.section,
            });
            deleted_section = Some(slot.title);
        } else {
            ops.push(ViewOp::DeleteRow {
                section: slot.section,
                row: slot.row,
            });
        }
    }

    if let Some(slot) = added.first() {
        let section_survives =
            old.iter().any(|s| s.title == slot.title) && deleted_section != Some(slot.title);
        if section_survives {
            ops.push(ViewOp::InsertRow {
                section: slot.section,
                row: slot.row,
            });
        } else {
            ops.push(ViewOp::InsertSection {
                section: slot.section,
            });
        }
    }

    match apply_ops(old, &ops, new) {
        Some(result) if shape(&result) == shape(new) => Reconciliation::Batch(ops),
        _ => Reconciliation::Reload,
    }
}

/// Replay a batch on `old`, taking inserted content from `new`.
///
/// Row deletes run first, then section deletes (both highest index first),
/// then section inserts and row inserts (lowest index first). Returns None
/// if an operation points outside the list it addresses.
pub fn apply_ops(old: &VisibleSet, ops: &[ViewOp], new: &VisibleSet) -> Option<VisibleSet> {
    let mut working = old.clone();

    let mut row_deletes: Vec<(usize, usize)> = Vec::new();
    let mut section_deletes: Vec<usize> = Vec::new();
    let mut section_inserts: Vec<usize> = Vec::new();
    let mut row_inserts: Vec<(usize, usize)> = Vec::new();
    for op in ops {
        match *op {
            ViewOp::DeleteRow { section, row } => row_deletes.push((section, row)),
            ViewOp::DeleteSection { section } => section_deletes.push(section),
            ViewOp::InsertSection { section } => section_inserts.push(section),
            ViewOp::InsertRow { section, row } => row_inserts.push((section, row)),
        }
    }

    row_deletes.sort_unstable_by(|a, b| b.cmp(a));
    for (section, row) in row_deletes {
        let tasks = &mut working.get_mut(section)?.tasks;
        if row >= tasks.len() {
            return None;
        }
        tasks.remove(row);
    }

    section_deletes.sort_unstable_by(|a, b| b.cmp(a));
    for section in section_deletes {
        if section >= working.len() {
            return None;
        }
        working.remove(section);
    }

    section_inserts.sort_unstable();
    for section in section_inserts {
        if section > working.len() {
            return None;
        }
        working.insert(section, new.get(section)?.clone());
    }

    row_inserts.sort_unstable();
    for (section, row) in row_inserts {
        let task = new.get(section)?.tasks.get(row)?.clone();
        let tasks = &mut working.get_mut(section)?.tasks;
        if row > tasks.len() {
            return None;
        }
        tasks.insert(row, task);
    }

    Some(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Task, Weekday};
    use crate::ops::resolve::VisibleSection;
    use crate::ops::resolve::tests::{event, habit};
    use pretty_assertions::assert_eq;

    fn section(title: &str, tasks: &[&Task]) -> VisibleSection {
        VisibleSection {
            title: title.to_string(),
            tasks: tasks.iter().map(|t| (*t).clone()).collect(),
        }
    }

    #[test]
    fn identical_sets_refresh() {
        let a = event("A");
        let set = vec![section("Work", &[&a])];
        assert_eq!(reconcile(&set, &set), Reconciliation::Refresh);
        assert_eq!(reconcile(&vec![], &vec![]), Reconciliation::Refresh);
    }

    #[test]
    fn edited_content_without_presence_change_refreshes() {
        let a = event("A");
        let mut renamed = a.clone();
        renamed.name = "A2".into();
        let old = vec![section("Work", &[&a])];
        let new = vec![section("Work", &[&renamed])];
        assert_eq!(reconcile(&old, &new), Reconciliation::Refresh);
    }

    #[test]
    fn add_to_existing_section_inserts_row() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Work", &[&a])];
        let new = vec![section("Work", &[&a, &b])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![ViewOp::InsertRow { section: 0, row: 1 }])
        );
    }

    #[test]
    fn add_to_new_section_inserts_section() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Work", &[&a])];
        let new = vec![section("Health", &[&b]), section("Work", &[&a])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![ViewOp::InsertSection { section: 0 }])
        );
    }

    #[test]
    fn remove_with_siblings_deletes_row() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Work", &[&a, &b])];
        let new = vec![section("Work", &[&b])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![ViewOp::DeleteRow { section: 0, row: 0 }])
        );
    }

    #[test]
    fn remove_last_task_deletes_section() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Health", &[&b]), section("Work", &[&a])];
        let new = vec![section("Work", &[&a])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![ViewOp::DeleteSection { section: 0 }])
        );
    }

    #[test]
    fn pin_and_unpin_are_exact_reverses() {
        let run = habit("Run", &[Weekday::Monday]);
        let swim = habit("Swim", &[Weekday::Monday]);
        let unpinned = vec![section("Health", &[&run, &swim])];
        let pinned = vec![section("Pinned", &[&run]), section("Health", &[&swim])];

        assert_eq!(
            reconcile(&unpinned, &pinned),
            Reconciliation::Batch(vec![
                ViewOp::DeleteRow { section: 0, row: 0 },
                ViewOp::InsertSection { section: 0 },
            ])
        );
        assert_eq!(
            reconcile(&pinned, &unpinned),
            Reconciliation::Batch(vec![
                ViewOp::DeleteSection { section: 0 },
                ViewOp::InsertRow { section: 0, row: 0 },
            ])
        );
    }

    #[test]
    fn pin_into_existing_pinned_section_inserts_row() {
        let a = event("A");
        let b = event("B");
        let c = event("C");
        let old = vec![section("Pinned", &[&a]), section("Work", &[&b, &c])];
        let new = vec![section("Pinned", &[&a, &c]), section("Work", &[&b])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![
                ViewOp::DeleteRow { section: 1, row: 1 },
                ViewOp::InsertRow { section: 0, row: 1 },
            ])
        );
    }

    #[test]
    fn moving_only_task_between_sections() {
        let a = event("A");
        let old = vec![section("Health", &[&a])];
        let new = vec![section("Work", &[&a])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![
                ViewOp::DeleteSection { section: 0 },
                ViewOp::InsertSection { section: 0 },
            ])
        );
    }

    #[test]
    fn replacing_the_only_task_of_a_section() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Work", &[&a])];
        let new = vec![section("Work", &[&b])];
        assert_eq!(
            reconcile(&old, &new),
            Reconciliation::Batch(vec![
                ViewOp::DeleteSection { section: 0 },
                ViewOp::InsertSection { section: 0 },
            ])
        );
    }

    #[test]
    fn multi_task_changes_reload() {
        let a = event("A");
        let b = event("B");
        let c = event("C");
        let old = vec![section("Work", &[&a])];
        let new = vec![section("Work", &[&a, &b, &c])];
        assert_eq!(reconcile(&old, &new), Reconciliation::Reload);
        assert_eq!(reconcile(&new, &vec![]), Reconciliation::Reload);
    }

    #[test]
    fn reordering_reloads() {
        let a = event("A");
        let b = event("B");
        let old = vec![section("Work", &[&a, &b])];
        let new = vec![section("Work", &[&b, &a])];
        assert_eq!(reconcile(&old, &new), Reconciliation::Reload);
    }

    #[test]
    fn every_batch_replays_to_the_new_set() {
        let a = event("A");
        let b = event("B");
        let c = event("C");
        let sets = vec![
            vec![],
            vec![section("Work", &[&a])],
            vec![section("Work", &[&a, &b])],
            vec![section("Pinned", &[&b]), section("Work", &[&a])],
            vec![section("Health", &[&c]), section("Work", &[&a, &b])],
            vec![section("Pinned", &[&a]), section("Work", &[&b])],
        ];
        for old in &sets {
            for new in &sets {
                if let Reconciliation::Batch(ops) = reconcile(old, new) {
                    let replayed = apply_ops(old, &ops, new).unwrap();
                    assert_eq!(&replayed, new);
                }
            }
        }
    }

    #[test]
    fn apply_rejects_out_of_range_ops() {
        let a = event("A");
        let old = vec![section("Work", &[&a])];
        assert!(apply_ops(&old, &[ViewOp::DeleteRow { section: 0, row: 3 }], &old).is_none());
        assert!(apply_ops(&old, &[ViewOp::DeleteSection { section: 2 }], &old).is_none());
        assert!(apply_ops(&old, &[ViewOp::InsertSection { section: 5 }], &old).is_none());
    }
}
