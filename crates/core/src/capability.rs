//! Interaction capabilities a node may implement.
//!
//! Capabilities are stateless handlers registered on a node. Any state they
//! need lives in components on the scene, which is why every callback gets
//! `&mut Scene` alongside the node it fired for.

use crate::scene::{NodeId, Scene};
use crate::SceneError;
use glam::Mat4;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Who is interacting and from where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionContext {
    /// Index of the tracked controller.
    pub controller_index: u32,
    /// World transform of the controller's spawn point.
    pub spawn_point: Mat4,
}

/// Failures raised by a capability callback. The dispatcher logs them and
/// keeps processing the remaining nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    /// A node the handler needed is gone.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The node is missing a component the handler relies on.
    #[error("node {node} has no {component} component")]
    MissingComponent {
        /// Node the handler fired on.
        node: NodeId,
        /// Name of the missing component type.
        component: &'static str,
    },
}

/// Receives touch start/stop when a controller overlaps the node.
pub trait Touchable: Send + Sync + fmt::Debug {
    /// Controller started touching `node`.
    fn on_touch_start(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;

    /// Controller stopped touching `node`.
    fn on_touch_stop(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;
}

/// Receives trigger presses.
pub trait Triggerable: Send + Sync + fmt::Debug {
    /// Trigger pressed while touching `node`.
    fn on_trigger_down(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;

    /// Trigger released; fired for every node recorded at the down edge.
    fn on_trigger_up(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;
}

/// Receives grip presses.
pub trait Grabbable: Send + Sync + fmt::Debug {
    /// Grip pressed while touching `node`.
    fn on_grab_start(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;

    /// Called once per frame while the grab is held.
    fn on_grab_update(
        &self,
        _scene: &mut Scene,
        _node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        Ok(())
    }

    /// Grip released.
    fn on_grab_stop(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError>;
}

/// Capability handlers registered on one node.
#[derive(Debug, Default, Clone)]
pub struct Capabilities {
    /// Touch handlers, all notified on enter/exit.
    pub touchable: Vec<Arc<dyn Touchable>>,
    /// Trigger handlers.
    pub triggerable: Vec<Arc<dyn Triggerable>>,
    /// Grab handlers.
    pub grabbable: Vec<Arc<dyn Grabbable>>,
}

impl Capabilities {
    /// Returns true if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.touchable.is_empty() && self.triggerable.is_empty() && self.grabbable.is_empty()
    }
}
