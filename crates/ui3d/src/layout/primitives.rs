//! Extent measurement and resize math.
//!
//! All functions here only read the scene.

use glam::{Mat4, Vec3};
use vrkit_core::{Axis, NodeId, Scene, SceneError};

/// Result of [`resize_width`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelResizeWidth {
    /// New local x scale.
    pub x_scale: f32,
    /// World distance to move along the node's right axis.
    pub x_offset: f32,
}

/// Result of [`resize_height`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelResizeHeight {
    /// New local y scale.
    pub y_scale: f32,
    /// World distance to move along the node's up axis.
    pub y_offset: f32,
}

/// World-space axis-aligned box around a node's extents and those of its
/// active descendants. `None` when nothing in the subtree has extents.
pub fn world_bounds(scene: &Scene, id: NodeId) -> Result<Option<(Vec3, Vec3)>, SceneError> {
    let mut bounds: Option<(Vec3, Vec3)> = None;
    let mut stack = vec![(id, scene.world_matrix(id)?)];

    while let Some((current, world)) = stack.pop() {
        let node = scene.node(current)?;
        if current != id && !node.active {
            continue;
        }
        if let Some(extents) = node.extents {
            let (min, max) = box_corners_aabb(world, extents);
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
        }
        for child in node.children() {
            let local = scene.node(*child)?.transform.to_matrix();
            stack.push((*child, world * local));
        }
    }

    Ok(bounds)
}

fn box_corners_aabb(world: Mat4, extents: Vec3) -> (Vec3, Vec3) {
    let half = extents * 0.5;
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { -half.x } else { half.x },
            if i & 2 == 0 { -half.y } else { half.y },
            if i & 4 == 0 { -half.z } else { half.z },
        );
        let point = world.transform_point3(corner);
        min = min.min(point);
        max = max.max(point);
    }
    (min, max)
}

/// World width of a node's renderable bounds (0 when it has none).
pub fn get_world_width(scene: &Scene, id: NodeId) -> Result<f32, SceneError> {
    Ok(world_bounds(scene, id)?.map_or(0.0, |(min, max)| max.x - min.x))
}

/// World height of a node's renderable bounds (0 when it has none).
pub fn get_world_height(scene: &Scene, id: NodeId) -> Result<f32, SceneError> {
    Ok(world_bounds(scene, id)?.map_or(0.0, |(min, max)| max.y - min.y))
}

/// Scale and offset that take the node's current world width to
/// `max(target_width, min_width)` while its left edge stays put.
pub fn resize_width(
    scene: &Scene,
    id: NodeId,
    target_width: f32,
    min_width: f32,
) -> Result<PanelResizeWidth, SceneError> {
    let current = get_world_width(scene, id)?;
    if current <= f32::EPSILON {
        return Err(SceneError::DegenerateGeometry { node: id, axis: Axis::X });
    }
    let width = target_width.max(min_width);
    let scale = scene.transform(id)?.scale.x;
    Ok(PanelResizeWidth {
        x_scale: scale * width / current,
        x_offset: (width - current) * 0.5,
    })
}

/// Scale and offset that take the node's current world height to
/// `max(target_height, min_height)` while its top edge stays put.
pub fn resize_height(
    scene: &Scene,
    id: NodeId,
    target_height: f32,
    min_height: f32,
) -> Result<PanelResizeHeight, SceneError> {
    let current = get_world_height(scene, id)?;
    if current <= f32::EPSILON {
        return Err(SceneError::DegenerateGeometry { node: id, axis: Axis::Y });
    }
    let height = target_height.max(min_height);
    let scale = scene.transform(id)?.scale.y;
    Ok(PanelResizeHeight {
        y_scale: scale * height / current,
        y_offset: -(height - current) * 0.5,
    })
}
