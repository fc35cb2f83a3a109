//! Per-controller dispatch of touch, trigger and grab events.
//!
//! Trigger and grip releases go to exactly the nodes that accepted the
//! matching press, even if the controller has moved off them since. Handler
//! failures are logged and never stop the remaining nodes from being served.

use glam::{Mat4, Vec3};
use vrkit_core::{InteractionContext, InteractionError, NodeId, Scene, SceneError, Transform3D};
use vrkit_input::{ControllerButton, ControllerHardware, ControllerInput};

/// Interaction state of one tracked controller.
#[derive(Debug, Clone)]
pub struct TouchController {
    index: u32,
    node: NodeId,
    pointer: NodeId,
    spawn_point: NodeId,
    pointer_offset: Vec3,
    hardware: ControllerHardware,
    /// Receives the trigger when nothing is touched.
    pub default_triggerable: Option<NodeId>,
    /// Receives the grip when nothing is touched.
    pub default_grabbable: Option<NodeId>,
    touching: Vec<NodeId>,
    triggered: Vec<NodeId>,
    grabbed: Vec<NodeId>,
}

fn report(result: Result<(), InteractionError>, node: NodeId, event: &'static str) {
    if let Err(err) = result {
        tracing::warn!(node = %node, event, error = %err, "interaction handler failed");
    }
}

fn insert(set: &mut Vec<NodeId>, id: NodeId) {
    if !set.contains(&id) {
        set.push(id);
    }
}

impl TouchController {
    /// Create pointer and spawn point children under `node`.
    pub fn new(
        scene: &mut Scene,
        node: NodeId,
        index: u32,
        pointer_z_offset: f32,
    ) -> Result<Self, SceneError> {
        let pointer = scene.spawn_child(node, "Pointer")?;
        let spawn_point = scene.spawn_child(node, "SpawnPoint")?;
        let pointer_offset = Vec3::new(0.0, 0.0, pointer_z_offset);
        scene.set_local_position(pointer, pointer_offset)?;
        Ok(Self {
            index,
            node,
            pointer,
            spawn_point,
            pointer_offset,
            hardware: ControllerHardware::HtcVive,
            default_triggerable: None,
            default_grabbable: None,
            touching: Vec::new(),
            triggered: Vec::new(),
            grabbed: Vec::new(),
        })
    }

    /// Controller index passed to handlers.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Tracked controller node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Pointer indicator node.
    pub fn pointer(&self) -> NodeId {
        self.pointer
    }

    /// Spawn point node.
    pub fn spawn_point(&self) -> NodeId {
        self.spawn_point
    }

    /// Detected hardware.
    pub fn hardware(&self) -> ControllerHardware {
        self.hardware
    }

    /// Record the runtime's controller model string.
    pub fn set_hardware_model(&mut self, model: &str) {
        self.hardware = ControllerHardware::detect(model);
        tracing::info!(index = self.index, model, hardware = ?self.hardware, "controller hardware");
    }

    /// Nodes currently touched.
    pub fn touching(&self) -> &[NodeId] {
        &self.touching
    }

    /// Nodes that accepted the last trigger press.
    pub fn triggered(&self) -> &[NodeId] {
        &self.triggered
    }

    /// Nodes currently grabbed.
    pub fn grabbed(&self) -> &[NodeId] {
        &self.grabbed
    }

    /// Context handed to capability callbacks.
    pub fn context(&self, scene: &Scene) -> InteractionContext {
        InteractionContext {
            controller_index: self.index,
            spawn_point: scene
                .world_matrix(self.spawn_point)
                .unwrap_or(Mat4::IDENTITY),
        }
    }

    /// Pointer world position (controller origin if the pointer is gone).
    pub fn pointer_position(&self, scene: &Scene) -> Vec3 {
        scene
            .world_position(self.pointer)
            .or_else(|_| scene.world_position(self.node))
            .unwrap_or(Vec3::ZERO)
    }

    /// A collider started overlapping the pointer.
    pub fn touch_enter(&mut self, scene: &mut Scene, id: NodeId) {
        if !scene.contains(id) || self.touching.contains(&id) {
            return;
        }
        self.touching.push(id);
        let ctx = self.context(scene);
        for handler in scene.touchables(id) {
            report(handler.on_touch_start(scene, id, &ctx), id, "touch_start");
        }
    }

    /// A collider stopped overlapping the pointer.
    pub fn touch_exit(&mut self, scene: &mut Scene, id: NodeId) {
        let Some(position) = self.touching.iter().position(|touched| *touched == id) else {
            return;
        };
        self.touching.remove(position);
        let ctx = self.context(scene);
        for handler in scene.touchables(id) {
            report(handler.on_touch_stop(scene, id, &ctx), id, "touch_stop");
        }
    }

    /// Stop touching everything.
    pub fn clear_touching(&mut self, scene: &mut Scene) {
        for id in self.touching.clone() {
            self.touch_exit(scene, id);
        }
    }

    /// Drop destroyed nodes silently; send touch stop to disabled ones.
    fn purge_touching(&mut self, scene: &mut Scene) {
        self.touching.retain(|id| scene.contains(*id));
        let disabled: Vec<NodeId> = self
            .touching
            .iter()
            .copied()
            .filter(|id| !scene.is_active_in_hierarchy(*id))
            .collect();
        for id in disabled {
            self.touch_exit(scene, id);
        }
    }

    fn reset_pointer(&self, scene: &mut Scene) {
        // The controller node may have been destroyed along with its children.
        let _ = scene.set_transform(self.pointer, Transform3D::new(self.pointer_offset));
        let _ = scene.set_transform(self.spawn_point, Transform3D::default());
    }

    /// Run one frame of dispatch against this frame's button state.
    pub fn update(&mut self, scene: &mut Scene, input: &ControllerInput) {
        self.purge_touching(scene);
        self.reset_pointer(scene);
        let ctx = self.context(scene);

        let touchpad = input.is_pressed(ControllerButton::Touchpad);
        if input.pressed_down(ControllerButton::Trigger) && !touchpad {
            self.trigger_down(scene, &ctx);
        }
        if input.pressed_up(ControllerButton::Trigger) {
            self.trigger_up(scene, &ctx);
        }
        if input.pressed_down(ControllerButton::Grip) {
            self.grab_start(scene, &ctx);
        }
        if input.pressed_up(ControllerButton::Grip) {
            self.grab_stop(scene, &ctx);
        }
        self.grab_update(scene, &ctx);
    }

    fn targets(&self, default: Option<NodeId>) -> Vec<NodeId> {
        if self.touching.is_empty() {
            default.into_iter().collect()
        } else {
            self.touching.clone()
        }
    }

    fn trigger_down(&mut self, scene: &mut Scene, ctx: &InteractionContext) {
        for id in self.targets(self.default_triggerable) {
            let Some(handler) = scene.triggerable(id) else {
                continue;
            };
            report(handler.on_trigger_down(scene, id, ctx), id, "trigger_down");
            insert(&mut self.triggered, id);
        }
    }

    fn trigger_up(&mut self, scene: &mut Scene, ctx: &InteractionContext) {
        for id in std::mem::take(&mut self.triggered) {
            if let Some(handler) = scene.triggerable(id) {
                report(handler.on_trigger_up(scene, id, ctx), id, "trigger_up");
            }
        }
    }

    fn grab_start(&mut self, scene: &mut Scene, ctx: &InteractionContext) {
        for id in self.targets(self.default_grabbable) {
            let Some(handler) = scene.grabbable(id) else {
                continue;
            };
            report(handler.on_grab_start(scene, id, ctx), id, "grab_start");
            insert(&mut self.grabbed, id);
        }
    }

    fn grab_stop(&mut self, scene: &mut Scene, ctx: &InteractionContext) {
        for id in std::mem::take(&mut self.grabbed) {
            if let Some(handler) = scene.grabbable(id) {
                report(handler.on_grab_stop(scene, id, ctx), id, "grab_stop");
            }
        }
    }

    fn grab_update(&mut self, scene: &mut Scene, ctx: &InteractionContext) {
        self.grabbed.retain(|id| scene.contains(*id));
        for id in self.grabbed.clone() {
            if let Some(handler) = scene.grabbable(id) {
                report(handler.on_grab_update(scene, id, ctx), id, "grab_update");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use vrkit_core::{Grabbable, Touchable, Triggerable};

    #[derive(Debug, Default)]
    struct Log(Mutex<Vec<(String, NodeId)>>);

    impl Log {
        fn push(&self, event: &str, node: NodeId) {
            self.0.lock().unwrap().push((event.to_string(), node));
        }

        fn events(&self) -> Vec<(String, NodeId)> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Debug)]
    struct Recorder {
        log: Arc<Log>,
        fail: bool,
    }

    impl Recorder {
        fn result(&self, event: &str, node: NodeId) -> Result<(), InteractionError> {
            self.log.push(event, node);
            if self.fail {
                Err(InteractionError::MissingComponent {
                    node,
                    component: "Recorder",
                })
            } else {
                Ok(())
            }
        }
    }

    impl Touchable for Recorder {
        fn on_touch_start(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("touch_start", n)
        }
        fn on_touch_stop(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("touch_stop", n)
        }
    }

    impl Triggerable for Recorder {
        fn on_trigger_down(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("down", n)
        }
        fn on_trigger_up(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("up", n)
        }
    }

    impl Grabbable for Recorder {
        fn on_grab_start(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("grab", n)
        }
        fn on_grab_stop(&self, _: &mut Scene, n: NodeId, _: &InteractionContext) -> Result<(), InteractionError> {
            self.result("release", n)
        }
    }

    fn recording_target(scene: &mut Scene, log: &Arc<Log>, fail: bool) -> NodeId {
        let node = scene.spawn("target");
        let recorder = Arc::new(Recorder {
            log: log.clone(),
            fail,
        });
        scene.add_touchable(node, recorder.clone()).unwrap();
        scene.add_triggerable(node, recorder.clone()).unwrap();
        scene.add_grabbable(node, recorder).unwrap();
        node
    }

    fn setup() -> (Scene, TouchController, Arc<Log>) {
        let mut scene = Scene::new();
        let hand = scene.spawn("hand");
        let controller = TouchController::new(&mut scene, hand, 0, 0.05).unwrap();
        (scene, controller, Arc::new(Log::default()))
    }

    fn frame(input: &mut ControllerInput, held: &[ControllerButton]) -> ControllerInput {
        input.set_held(held.iter().copied());
        input.advance();
        input.clone()
    }

    #[test]
    fn pointer_sits_at_offset() {
        let (mut scene, mut controller, _) = setup();
        scene
            .set_local_position(controller.pointer(), Vec3::new(9.0, 9.0, 9.0))
            .unwrap();
        controller.update(&mut scene, &ControllerInput::new());
        assert_eq!(
            scene.transform(controller.pointer()).unwrap().position,
            Vec3::new(0.0, 0.0, 0.05)
        );
    }

    #[test]
    fn release_goes_to_nodes_pressed_even_after_moving_off() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        let b = recording_target(&mut scene, &log, false);
        let mut input = ControllerInput::new();

        controller.touch_enter(&mut scene, a);
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));
        controller.touch_exit(&mut scene, a);
        controller.touch_enter(&mut scene, b);
        controller.update(&mut scene, &frame(&mut input, &[]));

        let events = log.events();
        assert!(events.contains(&("up".to_string(), a)));
        assert!(!events.contains(&("up".to_string(), b)));
        assert!(!events.contains(&("down".to_string(), b)));
        assert!(controller.triggered().is_empty());
    }

    #[test]
    fn touchpad_suppresses_trigger_down() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        controller.touch_enter(&mut scene, a);
        let mut input = ControllerInput::new();
        controller.update(
            &mut scene,
            &frame(&mut input, &[ControllerButton::Trigger, ControllerButton::Touchpad]),
        );
        assert!(!log.events().iter().any(|(event, _)| event == "down"));
    }

    #[test]
    fn empty_touch_set_uses_default_triggerable() {
        let (mut scene, mut controller, log) = setup();
        let fallback = recording_target(&mut scene, &log, false);
        controller.default_triggerable = Some(fallback);
        let mut input = ControllerInput::new();
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));
        assert_eq!(controller.triggered(), &[fallback]);
    }

    #[test]
    fn failing_handler_does_not_block_others() {
        let (mut scene, mut controller, log) = setup();
        let bad = recording_target(&mut scene, &log, true);
        let good = recording_target(&mut scene, &log, false);
        controller.touch_enter(&mut scene, bad);
        controller.touch_enter(&mut scene, good);
        let mut input = ControllerInput::new();
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));

        assert!(log.events().contains(&("down".to_string(), good)));
        assert_eq!(controller.triggered(), &[bad, good]);

        controller.update(&mut scene, &frame(&mut input, &[]));
        let events = log.events();
        assert!(events.contains(&("up".to_string(), bad)));
        assert!(events.contains(&("up".to_string(), good)));
    }

    #[test]
    fn release_covers_every_node_pressed_when_one_leaves_early() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        let b = recording_target(&mut scene, &log, false);
        let mut input = ControllerInput::new();

        controller.touch_enter(&mut scene, a);
        controller.touch_enter(&mut scene, b);
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));
        assert_eq!(controller.triggered(), &[a, b]);

        controller.touch_exit(&mut scene, b);
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));
        controller.update(&mut scene, &frame(&mut input, &[]));

        let ups: Vec<NodeId> = log
            .events()
            .into_iter()
            .filter(|(event, _)| event == "up")
            .map(|(_, node)| node)
            .collect();
        assert_eq!(ups, vec![a, b]);
        assert_eq!(controller.touching(), &[a]);
        assert!(controller.triggered().is_empty());
    }

    #[test]
    fn destroyed_nodes_are_purged_silently() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        let mut input = ControllerInput::new();
        controller.touch_enter(&mut scene, a);
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Trigger]));
        scene.destroy(a).unwrap();
        controller.update(&mut scene, &frame(&mut input, &[]));

        assert!(controller.touching().is_empty());
        assert!(!log.events().iter().any(|(event, _)| event == "up" || event == "touch_stop"));
    }

    #[test]
    fn disabled_nodes_get_touch_stop() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        controller.touch_enter(&mut scene, a);
        scene.set_active(a, false).unwrap();
        controller.update(&mut scene, &ControllerInput::new());

        assert!(controller.touching().is_empty());
        assert_eq!(log.events().last(), Some(&("touch_stop".to_string(), a)));
    }

    #[test]
    fn grip_grabs_and_releases() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        controller.touch_enter(&mut scene, a);
        let mut input = ControllerInput::new();
        controller.update(&mut scene, &frame(&mut input, &[ControllerButton::Grip]));
        assert_eq!(controller.grabbed(), &[a]);
        controller.update(&mut scene, &frame(&mut input, &[]));
        assert!(controller.grabbed().is_empty());
        assert!(log.events().contains(&("release".to_string(), a)));
    }

    #[test]
    fn touch_enter_is_idempotent() {
        let (mut scene, mut controller, log) = setup();
        let a = recording_target(&mut scene, &log, false);
        controller.touch_enter(&mut scene, a);
        controller.touch_enter(&mut scene, a);
        assert_eq!(controller.touching(), &[a]);
        assert_eq!(log.events().len(), 1);
    }
}
