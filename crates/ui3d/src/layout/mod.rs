//! 3D UI Layout System
//!
//! Extent measurement, auto-sizing panel containers and row/column flow.
//! [`settle`] is the per-frame entry point that brings every dirty layout
//! node up to date before interaction code reads positions.

pub mod container;
pub mod flow;
pub mod primitives;

pub use container::{ContainerState, PanelContainer};
pub use flow::{arrange_column, arrange_row, Alignment, ColumnContainer, RowContainer};
pub use primitives::{
    get_world_height, get_world_width, resize_height, resize_width, world_bounds,
    PanelResizeHeight, PanelResizeWidth,
};

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use vrkit_core::{NodeId, Scene, SceneError, TransactionLog};

fn is_dirty(scene: &Scene, id: NodeId) -> bool {
    scene.get::<PanelContainer>(id).is_some_and(|c| c.is_dirty())
        || scene.get::<RowContainer>(id).is_some_and(|r| r.is_dirty())
        || scene.get::<ColumnContainer>(id).is_some_and(|c| c.is_dirty())
}

fn is_flow(scene: &Scene, id: NodeId) -> bool {
    scene.has::<RowContainer>(id) || scene.has::<ColumnContainer>(id)
}

/// Process every dirty layout node once, deepest first. A row, column or
/// container that was processed queues its parent row, column or container,
/// so size changes ripple upward within the same call. A container reached
/// this way hears about it through [`container::child_resized`]. Returns how
/// many nodes were processed.
pub fn settle(scene: &mut Scene, log: &mut dyn TransactionLog) -> Result<usize, SceneError> {
    let mut queue: BTreeSet<(Reverse<usize>, NodeId)> = BTreeSet::new();
    let view: &Scene = scene;
    let dirty: Vec<NodeId> = view.ids().filter(|id| is_dirty(view, *id)).collect();
    for id in dirty {
        queue.insert((Reverse(scene.depth(id)?), id));
    }

    let mut done = HashSet::new();
    let mut notified = HashSet::new();
    while let Some(entry) = queue.pop_first() {
        let id = entry.1;
        if !done.insert(id) || !scene.contains(id) {
            continue;
        }

        if scene.has::<RowContainer>(id) {
            arrange_row(scene, id)?;
        } else if scene.has::<ColumnContainer>(id) {
            arrange_column(scene, id)?;
        }
        let is_container = scene.has::<PanelContainer>(id);
        if is_container && notified.contains(&id) {
            container::child_resized(scene, id, log)?;
        } else if is_container {
            container::resize(scene, id, log)?;
        }

        let Some(parent) = scene.parent(id)? else {
            continue;
        };
        if done.contains(&parent) || !(is_flow(scene, id) || is_container) {
            continue;
        }
        if is_flow(scene, parent) {
            queue.insert((Reverse(scene.depth(parent)?), parent));
        } else if scene.has::<PanelContainer>(parent) {
            notified.insert(parent);
            queue.insert((Reverse(scene.depth(parent)?), parent));
        }
    }

    if !done.is_empty() {
        tracing::debug!(count = done.len(), "settled layout");
    }
    Ok(done.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use vrkit_core::RuntimeLog;

    #[test]
    fn settle_arranges_rows_before_columns_and_containers() {
        let mut scene = Scene::new();
        let mut log = RuntimeLog::new();

        let panel = scene.spawn("panel");
        scene.node_mut(panel).unwrap().extents = Some(Vec3::new(1.0, 1.0, 0.0));
        scene.attach(panel, PanelContainer::new(0.0, 0.0)).unwrap();
        let column = scene.spawn_child(panel, "column").unwrap();
        scene.attach(column, ColumnContainer::new(0.0, 0.0)).unwrap();
        let row = scene.spawn_child(column, "row").unwrap();
        scene.attach(row, RowContainer::new(0.0, 0.0, Alignment::Center)).unwrap();
        for _ in 0..3 {
            let key = scene.spawn_child(row, "key").unwrap();
            scene.node_mut(key).unwrap().extents = Some(Vec3::new(0.1, 0.05, 0.0));
        }

        let processed = settle(&mut scene, &mut log).unwrap();
        assert_eq!(processed, 3);
        assert!(!is_dirty(&scene, panel));
        assert!(!is_dirty(&scene, column));
        assert!(!is_dirty(&scene, row));
        let bounds = scene.get::<PanelContainer>(panel).unwrap().bounds;
        assert!((bounds.x - 0.3).abs() < 1e-5);
        assert!((bounds.y - 0.05).abs() < 1e-5);

        assert_eq!(settle(&mut scene, &mut log).unwrap(), 0);
    }

    #[test]
    fn settle_propagates_row_growth_to_column() {
        let mut scene = Scene::new();
        let mut log = RuntimeLog::new();
        let column = scene.spawn("column");
        scene.attach(column, ColumnContainer::new(0.0, 0.0)).unwrap();
        let row = scene.spawn_child(column, "row").unwrap();
        scene.attach(row, RowContainer::new(0.0, 0.0, Alignment::Center)).unwrap();
        settle(&mut scene, &mut log).unwrap();

        let key = scene.spawn_child(row, "key").unwrap();
        scene.node_mut(key).unwrap().extents = Some(Vec3::new(0.2, 0.1, 0.0));
        assert_eq!(settle(&mut scene, &mut log).unwrap(), 2);
        let extents = scene.node(column).unwrap().extents.unwrap();
        assert!((extents - Vec3::new(0.2, 0.1, 0.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn nested_container_growth_resizes_outer_container() {
        let mut scene = Scene::new();
        let mut log = RuntimeLog::new();
        let outer = scene.spawn("outer");
        scene.node_mut(outer).unwrap().extents = Some(Vec3::new(1.0, 1.0, 0.0));
        scene.attach(outer, PanelContainer::new(0.0, 0.0)).unwrap();
        let inner = scene.spawn_child(outer, "inner").unwrap();
        scene.node_mut(inner).unwrap().extents = Some(Vec3::new(1.0, 1.0, 0.0));
        scene.attach(inner, PanelContainer::new(0.0, 0.0)).unwrap();
        let small = scene.spawn_child(inner, "small").unwrap();
        scene.node_mut(small).unwrap().extents = Some(Vec3::new(0.2, 0.1, 0.0));
        settle(&mut scene, &mut log).unwrap();
        let before = scene.get::<PanelContainer>(outer).unwrap().bounds;
        assert!((before.x - 0.2).abs() < 1e-5);

        let wide = scene.spawn_child(inner, "wide").unwrap();
        scene.node_mut(wide).unwrap().extents = Some(Vec3::new(5.0, 0.1, 0.0));
        let wide_width = get_world_width(&scene, wide).unwrap();
        assert!(wide_width > before.x);
        assert!(!is_dirty(&scene, outer));

        assert_eq!(settle(&mut scene, &mut log).unwrap(), 2);
        let after = scene.get::<PanelContainer>(outer).unwrap().bounds;
        assert!((after.x - wide_width).abs() < 1e-4);
        assert!((get_world_width(&scene, outer).unwrap() - wide_width).abs() < 1e-4);
        assert!(!is_dirty(&scene, outer));
        assert!(!is_dirty(&scene, inner));
    }
}
