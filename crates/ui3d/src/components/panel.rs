//! Standard panel component - a grabbable keyboard panel

use super::keyboard::PanelKind;
use super::require_mut;
use crate::profile::PanelProfile;
use glam::Mat4;
use vrkit_core::{Component, Grabbable, InteractionContext, InteractionError, NodeId, Scene};

/// Physics placeholder: panels never fall and are moved by code only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rigidbody {
    /// Affected by gravity
    pub use_gravity: bool,
    /// Driven by transforms instead of forces
    pub is_kinematic: bool,
}

impl Rigidbody {
    /// Gravity off, kinematic.
    pub fn kinematic() -> Self {
        Self {
            use_gravity: false,
            is_kinematic: true,
        }
    }
}

impl Component for Rigidbody {}

/// An in-progress grab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabState {
    /// Controller holding the panel
    pub controller: u32,
    /// Target transform relative to the controller spawn point at grab time
    pub offset: Mat4,
}

/// Panel data, attached to each keyboard panel node.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardPanel {
    /// Which panel this is
    pub kind: PanelKind,
    /// Copy of the profile the panel was built with
    pub profile: PanelProfile,
    /// Node moved while the panel is grabbed (the keyboard)
    pub grab_target: NodeId,
    grab: Option<GrabState>,
}

impl StandardPanel {
    /// New, not grabbed.
    pub fn new(kind: PanelKind, profile: PanelProfile, grab_target: NodeId) -> Self {
        Self {
            kind,
            profile,
            grab_target,
            grab: None,
        }
    }

    /// Current grab, if held.
    pub fn grab(&self) -> Option<GrabState> {
        self.grab
    }
}

impl Component for StandardPanel {}

/// Grab handler: the grab target follows the controller while held.
#[derive(Debug, Default)]
pub struct StandardPanelBehavior;

impl Grabbable for StandardPanelBehavior {
    fn on_grab_start(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        let panel = require_mut::<StandardPanel>(scene, node)?;
        if !panel.profile.grabbable {
            return Ok(());
        }
        let target = panel.grab_target;
        let world = scene.world_matrix(target)?;
        let offset = ctx.spawn_point.inverse() * world;
        require_mut::<StandardPanel>(scene, node)?.grab = Some(GrabState {
            controller: ctx.controller_index,
            offset,
        });
        tracing::debug!(panel = %node, target = %target, "grab start");
        Ok(())
    }

    fn on_grab_update(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        let panel = require_mut::<StandardPanel>(scene, node)?;
        let Some(grab) = panel.grab else {
            return Ok(());
        };
        if grab.controller != ctx.controller_index {
            return Ok(());
        }
        let target = panel.grab_target;
        scene.set_world_matrix(target, ctx.spawn_point * grab.offset)?;
        Ok(())
    }

    fn on_grab_stop(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        let panel = require_mut::<StandardPanel>(scene, node)?;
        if panel
            .grab
            .is_some_and(|grab| grab.controller == ctx.controller_index)
        {
            panel.grab = None;
            tracing::debug!(panel = %node, "grab stop");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ctx(index: u32, at: Vec3) -> InteractionContext {
        InteractionContext {
            controller_index: index,
            spawn_point: Mat4::from_translation(at),
        }
    }

    fn grabbable_panel(scene: &mut Scene, grabbable: bool) -> (NodeId, NodeId) {
        let keyboard = scene.spawn("Keyboard");
        scene
            .set_local_position(keyboard, Vec3::new(0.0, 1.0, 0.5))
            .unwrap();
        let panel = scene.spawn_child(keyboard, "PanelLowerCase").unwrap();
        let profile = PanelProfile {
            grabbable,
            ..Default::default()
        };
        scene
            .attach(panel, StandardPanel::new(PanelKind::LowerCase, profile, keyboard))
            .unwrap();
        (keyboard, panel)
    }

    #[test]
    fn grabbed_target_follows_controller_with_offset() {
        let mut scene = Scene::new();
        let (keyboard, panel) = grabbable_panel(&mut scene, true);
        let behavior = StandardPanelBehavior;

        behavior
            .on_grab_start(&mut scene, panel, &ctx(0, Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        behavior
            .on_grab_update(&mut scene, panel, &ctx(0, Vec3::new(0.2, 1.0, 0.0)))
            .unwrap();
        let moved = scene.world_position(keyboard).unwrap();
        assert!((moved - Vec3::new(0.2, 1.0, 0.5)).length() < 1e-5);

        behavior
            .on_grab_stop(&mut scene, panel, &ctx(0, Vec3::ZERO))
            .unwrap();
        assert!(scene.get::<StandardPanel>(panel).unwrap().grab().is_none());
    }

    #[test]
    fn other_controller_does_not_move_grab() {
        let mut scene = Scene::new();
        let (keyboard, panel) = grabbable_panel(&mut scene, true);
        let behavior = StandardPanelBehavior;

        behavior
            .on_grab_start(&mut scene, panel, &ctx(0, Vec3::ZERO))
            .unwrap();
        behavior
            .on_grab_update(&mut scene, panel, &ctx(1, Vec3::ONE))
            .unwrap();
        assert_eq!(
            scene.world_position(keyboard).unwrap(),
            Vec3::new(0.0, 1.0, 0.5)
        );
    }

    #[test]
    fn non_grabbable_profile_ignores_grab() {
        let mut scene = Scene::new();
        let (_, panel) = grabbable_panel(&mut scene, false);
        StandardPanelBehavior
            .on_grab_start(&mut scene, panel, &ctx(0, Vec3::ZERO))
            .unwrap();
        assert!(scene.get::<StandardPanel>(panel).unwrap().grab().is_none());
    }
}
