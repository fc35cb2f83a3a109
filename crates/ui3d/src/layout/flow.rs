//! Rows and columns.
//!
//! Rows place their children left to right, columns stack theirs top to
//! bottom. Both measure children in their own local units and publish the
//! resulting box (padding included) as their extents, so an enclosing
//! container sees the whole padded block.

use super::primitives::world_bounds;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use vrkit_core::{Component, NodeId, Scene, SceneError};

/// Horizontal placement of a row inside its column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Flush with the column's left padding.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush with the column's right padding.
    Right,
}

/// Left-to-right flow.
#[derive(Debug, Clone, PartialEq)]
pub struct RowContainer {
    pub padding: f32,
    pub spacing: f32,
    pub alignment: Alignment,
    dirty: bool,
}

impl RowContainer {
    pub fn new(padding: f32, spacing: f32, alignment: Alignment) -> Self {
        Self {
            padding,
            spacing,
            alignment,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Component for RowContainer {
    fn children_changed(&mut self) {
        self.dirty = true;
    }
}

/// Top-to-bottom flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnContainer {
    pub padding: f32,
    pub spacing: f32,
    dirty: bool,
}

impl ColumnContainer {
    pub fn new(padding: f32, spacing: f32) -> Self {
        Self {
            padding,
            spacing,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Component for ColumnContainer {
    fn children_changed(&mut self) {
        self.dirty = true;
    }
}

/// Size of `child` expressed in `parent`'s local units.
fn local_size(scene: &Scene, parent: NodeId, child: NodeId) -> Result<Vec2, SceneError> {
    let Some((min, max)) = world_bounds(scene, child)? else {
        return Ok(Vec2::ZERO);
    };
    let (scale, _, _) = scene.world_matrix(parent)?.to_scale_rotation_translation();
    let size = max - min;
    Ok(Vec2::new(
        size.x / scale.x.abs().max(f32::EPSILON),
        size.y / scale.y.abs().max(f32::EPSILON),
    ))
}

fn active_children(scene: &Scene, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
    Ok(scene
        .children(id)?
        .iter()
        .copied()
        .filter(|child| scene.node(*child).is_ok_and(|node| node.active))
        .collect())
}

/// Lay out the children of a row. Returns the row's padded size.
pub fn arrange_row(scene: &mut Scene, id: NodeId) -> Result<Vec2, SceneError> {
    let (padding, spacing) = scene
        .get::<RowContainer>(id)
        .map_or((0.0, 0.0), |row| (row.padding, row.spacing));
    let children = active_children(scene, id)?;
    let sizes = children
        .iter()
        .map(|child| local_size(scene, id, *child))
        .collect::<Result<Vec<_>, _>>()?;

    let gaps = spacing * children.len().saturating_sub(1) as f32;
    let content_width: f32 = sizes.iter().map(|size| size.x).sum::<f32>() + gaps;
    let content_height = sizes.iter().fold(0.0_f32, |acc, size| acc.max(size.y));

    let mut x = -content_width * 0.5;
    for (child, size) in children.iter().zip(&sizes) {
        let z = scene.transform(*child)?.position.z;
        scene.set_local_position(*child, Vec3::new(x + size.x * 0.5, 0.0, z))?;
        x += size.x + spacing;
    }

    let total = Vec2::new(content_width, content_height) + Vec2::splat(2.0 * padding);
    finish(scene, id, total)?;
    if let Some(row) = scene.get_mut::<RowContainer>(id) {
        row.dirty = false;
    }
    Ok(total)
}

/// Stack the children of a column, honoring each row's alignment. Returns
/// the column's padded size.
pub fn arrange_column(scene: &mut Scene, id: NodeId) -> Result<Vec2, SceneError> {
    let (padding, spacing) = scene
        .get::<ColumnContainer>(id)
        .map_or((0.0, 0.0), |column| (column.padding, column.spacing));
    let children = active_children(scene, id)?;
    let sizes = children
        .iter()
        .map(|child| local_size(scene, id, *child))
        .collect::<Result<Vec<_>, _>>()?;

    let gaps = spacing * children.len().saturating_sub(1) as f32;
    let content_width = sizes.iter().fold(0.0_f32, |acc, size| acc.max(size.x));
    let content_height: f32 = sizes.iter().map(|size| size.y).sum::<f32>() + gaps;

    let mut y = content_height * 0.5;
    for (child, size) in children.iter().zip(&sizes) {
        let alignment = scene
            .get::<RowContainer>(*child)
            .map_or(Alignment::Center, |row| row.alignment);
        let x = match alignment {
            Alignment::Left => (size.x - content_width) * 0.5,
            Alignment::Center => 0.0,
            Alignment::Right => (content_width - size.x) * 0.5,
        };
        let z = scene.transform(*child)?.position.z;
        scene.set_local_position(*child, Vec3::new(x, y - size.y * 0.5, z))?;
        y -= size.y + spacing;
    }

    let total = Vec2::new(content_width, content_height) + Vec2::splat(2.0 * padding);
    finish(scene, id, total)?;
    if let Some(column) = scene.get_mut::<ColumnContainer>(id) {
        column.dirty = false;
    }
    Ok(total)
}

fn finish(scene: &mut Scene, id: NodeId, total: Vec2) -> Result<(), SceneError> {
    scene.node_mut(id)?.extents = Some(Vec3::new(total.x, total.y, 0.0));
    tracing::trace!(node = %id, width = total.x, height = total.y, "arranged flow");
    Ok(())
}
