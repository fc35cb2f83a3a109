//! Box colliders and pointer overlap detection.

use glam::{Mat4, Vec3};
use std::collections::BTreeSet;
use vrkit_core::{Component, NodeId, Scene};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderAabb {
    /// Minimum corner of the box
    pub min: Vec3,
    /// Maximum corner of the box
    pub max: Vec3,
}

impl ColliderAabb {
    /// Box around a local center/size box moved by `world`.
    pub fn transformed(world: Mat4, center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = center
                + Vec3::new(
                    if i & 1 == 0 { -half.x } else { half.x },
                    if i & 2 == 0 { -half.y } else { half.y },
                    if i & 4 == 0 { -half.z } else { half.z },
                );
            let point = world.transform_point3(corner);
            min = min.min(point);
            max = max.max(point);
        }
        Self { min, max }
    }

    /// Inclusive point test.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Box collider in node-local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    /// Local center
    pub center: Vec3,
    /// Local size
    pub size: Vec3,
}

impl BoxCollider {
    /// Collider centered on the node.
    pub fn new(size: Vec3) -> Self {
        Self {
            center: Vec3::ZERO,
            size,
        }
    }

    /// World-space box for this collider on `node`.
    pub fn world_aabb(&self, scene: &Scene, node: NodeId) -> Option<ColliderAabb> {
        let world = scene.world_matrix(node).ok()?;
        Some(ColliderAabb::transformed(world, self.center, self.size))
    }
}

impl Component for BoxCollider {}

/// Enter/exit edge for one collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapEvent {
    /// The point entered the node's collider.
    Enter(NodeId),
    /// The point left the node's collider (or the node went away).
    Exit(NodeId),
}

/// Tracks which colliders contain a moving point across frames.
#[derive(Debug, Default, Clone)]
pub struct OverlapTracker {
    inside: BTreeSet<NodeId>,
}

fn live_colliders(scene: &Scene) -> impl Iterator<Item = (NodeId, ColliderAabb)> + '_ {
    scene.ids().filter_map(move |id| {
        if !scene.is_active_in_hierarchy(id) {
            return None;
        }
        let collider = scene.get::<BoxCollider>(id)?;
        Some((id, collider.world_aabb(scene, id)?))
    })
}

impl OverlapTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes whose collider held the point at the last update.
    pub fn inside(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inside.iter().copied()
    }

    /// Re-test every active collider against `point`. Exits come before
    /// enters.
    pub fn update(&mut self, scene: &Scene, point: Vec3) -> Vec<OverlapEvent> {
        let current: BTreeSet<NodeId> = live_colliders(scene)
            .filter(|(_, aabb)| aabb.contains_point(point))
            .map(|(id, _)| id)
            .collect();

        let mut events: Vec<OverlapEvent> = self
            .inside
            .difference(&current)
            .map(|id| OverlapEvent::Exit(*id))
            .collect();
        events.extend(current.difference(&self.inside).map(|id| OverlapEvent::Enter(*id)));
        self.inside = current;
        events
    }

    /// Forget every overlap, returning exits for them.
    pub fn clear(&mut self) -> Vec<OverlapEvent> {
        std::mem::take(&mut self.inside)
            .into_iter()
            .map(OverlapEvent::Exit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collider_follows_node_transform() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        scene.set_local_position(parent, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let node = scene.spawn_child(parent, "key").unwrap();
        scene.attach(node, BoxCollider::new(Vec3::splat(0.1))).unwrap();

        let aabb = scene
            .get::<BoxCollider>(node)
            .unwrap()
            .world_aabb(&scene, node)
            .unwrap();
        assert!(aabb.contains_point(Vec3::new(1.04, 0.0, 0.0)));
        assert!(!aabb.contains_point(Vec3::ZERO));
    }

    #[test]
    fn tracker_emits_enter_then_exit() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        scene.attach(a, BoxCollider::new(Vec3::ONE)).unwrap();
        let b = scene.spawn("b");
        scene.set_local_position(b, Vec3::new(3.0, 0.0, 0.0)).unwrap();
        scene.attach(b, BoxCollider::new(Vec3::ONE)).unwrap();
        let mut tracker = OverlapTracker::new();

        assert_eq!(tracker.update(&scene, Vec3::ZERO), vec![OverlapEvent::Enter(a)]);
        assert!(tracker.update(&scene, Vec3::new(0.1, 0.0, 0.0)).is_empty());
        assert_eq!(
            tracker.update(&scene, Vec3::new(3.0, 0.0, 0.0)),
            vec![OverlapEvent::Exit(a), OverlapEvent::Enter(b)]
        );
        assert_eq!(tracker.clear(), vec![OverlapEvent::Exit(b)]);
    }

    #[test]
    fn inactive_and_destroyed_colliders_exit() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        scene.attach(a, BoxCollider::new(Vec3::ONE)).unwrap();
        let mut tracker = OverlapTracker::new();
        tracker.update(&scene, Vec3::ZERO);

        scene.set_active(a, false).unwrap();
        assert_eq!(tracker.update(&scene, Vec3::ZERO), vec![OverlapEvent::Exit(a)]);
        scene.set_active(a, true).unwrap();
        tracker.update(&scene, Vec3::ZERO);
        scene.destroy(a).unwrap();
        assert_eq!(tracker.update(&scene, Vec3::ZERO), vec![OverlapEvent::Exit(a)]);
    }
}
