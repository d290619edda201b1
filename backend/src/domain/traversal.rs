//! Keyed traversal of nested document trees.
//!
//! Each level of a tree exposes its lookup key through [`Keyed`] and its
//! children through [`Nested`]. A path lookup descends one level per key and
//! returns the first match in document order, so a value recorded in an
//! earlier configuration shadows later ones.

/// A node addressable by a key within its parent collection.
pub trait Keyed {
    type Key: ?Sized + PartialEq;

    fn key(&self) -> Option<&Self::Key>;
}

/// A node owning a child collection.
pub trait Nested {
    type Child;

    fn children(&self) -> &[Self::Child];
}

/// Nodes among `nodes` whose key equals `key`, in order.
pub fn matching<'a, T>(
    nodes: impl IntoIterator<Item = &'a T>,
    key: &'a T::Key,
) -> impl Iterator<Item = &'a T>
where
    T: Keyed + 'a,
{
    nodes.into_iter().filter(move |node| node.key() == Some(key))
}

/// All children of `parents`, flattened in order.
pub fn children_of<'a, P>(
    parents: impl IntoIterator<Item = &'a P>,
) -> impl Iterator<Item = &'a P::Child>
where
    P: Nested + 'a,
{
    parents.into_iter().flat_map(|parent| parent.children())
}

/// Descend from `parents` into the children whose key equals `key`.
pub fn descend<'a, P>(
    parents: impl IntoIterator<Item = &'a P>,
    key: &'a <P::Child as Keyed>::Key,
) -> impl Iterator<Item = &'a P::Child>
where
    P: Nested + 'a,
    P::Child: Keyed + 'a,
{
    matching(children_of(parents), key)
}

/// Key path from a breaker plan down to one subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTaskPath<'a> {
    pub task_id: &'a str,
    pub main_task: &'a str,
    pub sub_task: &'a str,
}

/// First subtask reachable from `switchgears` along `path`.
///
/// The path descends switchgear → breaker (`taskId`) → task (`mainTask`) →
/// subtask (`name`).
pub fn find_by_path<'a, S>(
    switchgears: impl IntoIterator<Item = &'a S>,
    path: SubTaskPath<'a>,
) -> Option<&'a crate::domain::SubTask>
where
    S: Nested<Child = crate::domain::PlannedCb> + 'a,
{
    let cbs = descend(switchgears, path.task_id);
    let tasks = descend(cbs, path.main_task);
    descend(tasks, path.sub_task).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalendarSwitchgear, PlannedCb, SubTask, Task};
    use serde_json::json;

    fn calendar(task_id: &str, status: bool) -> CalendarSwitchgear {
        CalendarSwitchgear {
            switchgear_id: Some("SG1".into()),
            cbs: vec![PlannedCb {
                task_id: Some(task_id.into()),
                tasks: vec![Task {
                    main_task: Some("Inspect".into()),
                    sub_tasks: vec![SubTask {
                        name: Some("Visual".into()),
                        status: Some(json!(status)),
                        ..SubTask::default()
                    }],
                    ..Task::default()
                }],
                ..PlannedCb::default()
            }],
            ..CalendarSwitchgear::default()
        }
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let switchgears = [calendar("T1", true), calendar("T1", false)];
        let found = find_by_path(
            switchgears.iter(),
            SubTaskPath {
                task_id: "T1",
                main_task: "Inspect",
                sub_task: "Visual",
            },
        )
        .expect("subtask is reachable");
        assert!(found.is_completed());
    }

    #[test]
    fn skips_non_matching_branches() {
        let switchgears = [calendar("T2", true), calendar("T1", false)];
        let found = find_by_path(
            switchgears.iter(),
            SubTaskPath {
                task_id: "T1",
                main_task: "Inspect",
                sub_task: "Visual",
            },
        )
        .expect("subtask is reachable");
        assert!(!found.is_completed());
    }

    #[test]
    fn missing_subtask_yields_none() {
        let switchgears = [calendar("T1", true)];
        let path = SubTaskPath {
            task_id: "T1",
            main_task: "Inspect",
            sub_task: "Thermal",
        };
        assert!(find_by_path(switchgears.iter(), path).is_none());
    }
}
