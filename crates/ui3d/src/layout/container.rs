//! Panel containers: nodes that size themselves to their largest child.
//!
//! The container body is the node's own extents. A resize measures the
//! children, detaches them so the rescale does not reach them, rescales the
//! body, reattaches the children in order and finally shifts the container
//! so its top-left corner stays where it was.

use super::primitives::{
    get_world_height, get_world_width, resize_height, resize_width, PanelResizeHeight,
    PanelResizeWidth,
};
use glam::Vec3;
use vrkit_core::{Component, NodeId, Scene, SceneError, TransactionLog};

/// Resize state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Bounds match the children as of the last resize.
    Clean,
    /// The child list changed; a resize is pending.
    Dirty,
}

/// Auto-sizing container data.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelContainer {
    /// Width floor.
    pub min_width: f32,
    /// Height floor.
    pub min_height: f32,
    /// Largest child extents measured at the last resize (z is always 0).
    pub bounds: Vec3,
    dirty: bool,
    initialized: bool,
}

impl PanelContainer {
    /// New container with the given floors; not yet initialized.
    pub fn new(min_width: f32, min_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            bounds: Vec3::ZERO,
            dirty: false,
            initialized: false,
        }
    }

    /// Current resize state.
    pub fn state(&self) -> ContainerState {
        if self.dirty {
            ContainerState::Dirty
        } else {
            ContainerState::Clean
        }
    }

    /// Whether a resize is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether [`initialize`] already ran.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Component for PanelContainer {
    fn children_changed(&mut self) {
        self.dirty = true;
    }
}

/// Largest active child width and height under `id`, as a size vector.
/// Inactive children take no space.
pub fn calculate_bounds(scene: &Scene, id: NodeId) -> Result<Vec3, SceneError> {
    let mut max_width: f32 = 0.0;
    let mut max_height: f32 = 0.0;
    for child in scene.children(id)? {
        if !scene.node(*child)?.active {
            continue;
        }
        max_width = max_width.max(get_world_width(scene, *child)?);
        max_height = max_height.max(get_world_height(scene, *child)?);
    }
    Ok(Vec3::new(max_width, max_height, 0.0))
}

/// One-shot setup: zero the bounds and run the first resize. Returns false
/// when the container was already initialized.
pub fn initialize(
    scene: &mut Scene,
    id: NodeId,
    log: &mut dyn TransactionLog,
) -> Result<bool, SceneError> {
    match scene.get_mut::<PanelContainer>(id) {
        Some(container) if container.initialized => return Ok(false),
        Some(container) => {
            container.bounds = Vec3::ZERO;
            container.initialized = true;
        }
        None => {}
    }
    resize(scene, id, log)?;
    Ok(true)
}

/// A child row, column or container changed size; resize right away even if
/// the child list itself did not change.
pub fn child_resized(
    scene: &mut Scene,
    id: NodeId,
    log: &mut dyn TransactionLog,
) -> Result<Vec3, SceneError> {
    tracing::trace!(node = %id, "child resized");
    resize(scene, id, log)
}

/// Recompute bounds from the children and rescale the container to fit.
/// Returns the measured bounds. A container whose body has no extent keeps
/// its scale.
pub fn resize(
    scene: &mut Scene,
    id: NodeId,
    log: &mut dyn TransactionLog,
) -> Result<Vec3, SceneError> {
    let group = log.begin_group("PanelContainer Resize");

    let bounds = calculate_bounds(scene, id)?;
    let (min_width, min_height) = scene
        .get::<PanelContainer>(id)
        .map_or((0.0, 0.0), |c| (c.min_width, c.min_height));

    for child in scene.children(id)?.to_vec() {
        log.record_before_change(scene, child);
    }
    let children = scene.detach_children(id)?;
    log.record_before_change(scene, id);

    let rescaled = rescale_body(scene, id, bounds, min_width, min_height);
    scene.reattach_children(&children, id)?;
    let offset = rescaled?;

    let delta = scene.right(id)? * offset.x + scene.up(id)? * offset.y;
    scene.translate_world(id, delta)?;

    log.collapse_group(group);

    if let Some(container) = scene.get_mut::<PanelContainer>(id) {
        container.bounds = bounds;
        container.dirty = false;
    }
    tracing::debug!(
        node = %id,
        width = bounds.x,
        height = bounds.y,
        "resized panel container"
    );
    Ok(bounds)
}

/// Apply the width/height resize to the detached body and return the
/// (right, up) offsets still to be applied.
fn rescale_body(
    scene: &mut Scene,
    id: NodeId,
    bounds: Vec3,
    min_width: f32,
    min_height: f32,
) -> Result<Vec3, SceneError> {
    let scale = scene.transform(id)?.scale;
    let width = match resize_width(scene, id, bounds.x, min_width) {
        Ok(width) => width,
        Err(SceneError::DegenerateGeometry { .. }) => PanelResizeWidth {
            x_scale: scale.x,
            x_offset: 0.0,
        },
        Err(err) => return Err(err),
    };
    let height = match resize_height(scene, id, bounds.y, min_height) {
        Ok(height) => height,
        Err(SceneError::DegenerateGeometry { .. }) => PanelResizeHeight {
            y_scale: scale.y,
            y_offset: 0.0,
        },
        Err(err) => return Err(err),
    };
    scene.set_local_scale(id, Vec3::new(width.x_scale, height.y_scale, scale.z))?;
    Ok(Vec3::new(width.x_offset, height.y_offset, 0.0))
}
