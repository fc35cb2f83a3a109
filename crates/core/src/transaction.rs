//! Transaction strategies for scene mutations.
//!
//! The embedding context picks one [`TransactionLog`] at startup: editors use
//! [`UndoLog`], which records snapshots and destroys immediately; runtime
//! hosts use [`RuntimeLog`], which records nothing and defers destruction to
//! the end of the frame.

use crate::scene::{NodeId, Scene, Transform3D};
use crate::SceneError;
use std::fmt;

/// Identifier of an undo group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// Undo bookkeeping plus the deletion primitive for the current host.
pub trait TransactionLog: Send + Sync + fmt::Debug {
    /// Open a named group; later records belong to it.
    fn begin_group(&mut self, name: &str) -> GroupId;

    /// Snapshot `node` before it is mutated.
    fn record_before_change(&mut self, scene: &Scene, node: NodeId);

    /// Merge every group opened since `group` into `group`.
    fn collapse_group(&mut self, group: GroupId);

    /// Destroy `node` with the host's deletion primitive.
    fn destroy(&mut self, scene: &mut Scene, node: NodeId) -> Result<(), SceneError>;
}

/// A recorded change.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoRecord {
    /// Transform of a node before it changed.
    Transform {
        /// Node that changed.
        node: NodeId,
        /// Local transform before the change.
        before: Transform3D,
    },
    /// A node destroyed through the log.
    Destroyed {
        /// Node that was destroyed.
        node: NodeId,
        /// Its name at destruction time.
        name: String,
    },
}

/// Named group of records.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoGroup {
    /// Group identifier.
    pub id: GroupId,
    /// Group name shown in the editor history.
    pub name: String,
    /// Records in the order they were taken.
    pub records: Vec<UndoRecord>,
}

/// Editor strategy: records undo groups, destroys immediately.
#[derive(Debug, Default)]
pub struct UndoLog {
    groups: Vec<UndoGroup>,
    next_id: u64,
}

impl UndoLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded groups, oldest first.
    pub fn groups(&self) -> &[UndoGroup] {
        &self.groups
    }

    /// Group by id.
    pub fn group(&self, id: GroupId) -> Option<&UndoGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    fn current_group(&mut self) -> &mut UndoGroup {
        if self.groups.is_empty() {
            self.begin_group("Change");
        }
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    /// Restore the transforms recorded in `group`, newest first. Destroyed
    /// nodes are not resurrected; returns how many transforms were restored.
    pub fn revert(&self, scene: &mut Scene, id: GroupId) -> usize {
        let Some(group) = self.group(id) else {
            return 0;
        };
        let mut restored = 0;
        for record in group.records.iter().rev() {
            if let UndoRecord::Transform { node, before } = record {
                if scene.set_transform(*node, *before).is_ok() {
                    restored += 1;
                }
            }
        }
        restored
    }
}

impl TransactionLog for UndoLog {
    fn begin_group(&mut self, name: &str) -> GroupId {
        let id = GroupId(self.next_id);
        self.next_id += 1;
        self.groups.push(UndoGroup {
            id,
            name: name.to_string(),
            records: Vec::new(),
        });
        id
    }

    fn record_before_change(&mut self, scene: &Scene, node: NodeId) {
        if let Ok(before) = scene.transform(node) {
            self.current_group()
                .records
                .push(UndoRecord::Transform { node, before });
        }
    }

    fn collapse_group(&mut self, group: GroupId) {
        let Some(position) = self.groups.iter().position(|g| g.id == group) else {
            return;
        };
        let merged: Vec<UndoRecord> = self
            .groups
            .drain(position + 1..)
            .flat_map(|g| g.records)
            .collect();
        self.groups[position].records.extend(merged);
    }

    fn destroy(&mut self, scene: &mut Scene, node: NodeId) -> Result<(), SceneError> {
        let name = scene.node(node)?.name.clone();
        self.current_group()
            .records
            .push(UndoRecord::Destroyed { node, name });
        scene.destroy(node)
    }
}

/// Runtime strategy: no undo history, destruction deferred to frame end.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuntimeLog {
    next_id: u64,
}

impl RuntimeLog {
    /// Create a runtime log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionLog for RuntimeLog {
    fn begin_group(&mut self, _name: &str) -> GroupId {
        let id = GroupId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record_before_change(&mut self, _scene: &Scene, _node: NodeId) {}

    fn collapse_group(&mut self, _group: GroupId) {}

    fn destroy(&mut self, scene: &mut Scene, node: NodeId) -> Result<(), SceneError> {
        scene.destroy_deferred(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn collapse_merges_later_groups() {
        let mut scene = Scene::new();
        let node = scene.spawn("node");
        let mut log = UndoLog::new();

        let outer = log.begin_group("Outer");
        log.record_before_change(&scene, node);
        log.begin_group("Inner");
        log.record_before_change(&scene, node);
        log.collapse_group(outer);

        assert_eq!(log.groups().len(), 1);
        assert_eq!(log.groups()[0].records.len(), 2);
        assert_eq!(log.groups()[0].name, "Outer");
    }

    #[test]
    fn revert_restores_recorded_transform() {
        let mut scene = Scene::new();
        let node = scene.spawn("node");
        let mut log = UndoLog::new();

        let group = log.begin_group("Move");
        log.record_before_change(&scene, node);
        scene.set_local_position(node, Vec3::new(1.0, 2.0, 3.0)).unwrap();

        assert_eq!(log.revert(&mut scene, group), 1);
        assert_eq!(scene.transform(node).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn undo_log_destroys_immediately() {
        let mut scene = Scene::new();
        let node = scene.spawn("scratch");
        let mut log = UndoLog::new();
        log.destroy(&mut scene, node).unwrap();

        assert!(!scene.contains(node));
        assert!(matches!(
            log.groups()[0].records[0],
            UndoRecord::Destroyed { ref name, .. } if name == "scratch"
        ));
    }

    #[test]
    fn runtime_log_defers_destruction() {
        let mut scene = Scene::new();
        let node = scene.spawn("scratch");
        let mut log = RuntimeLog::new();
        log.destroy(&mut scene, node).unwrap();

        assert!(scene.contains(node));
        assert_eq!(scene.pending_destroy(), &[node]);
        scene.flush_destroyed();
        assert!(!scene.contains(node));
    }
}
