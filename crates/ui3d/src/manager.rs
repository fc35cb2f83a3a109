//! UI Manager - owns the scene and runs the per-frame UI stages

use crate::interaction::{OverlapEvent, OverlapTracker, TouchController};
use crate::layout;
use vrkit_core::{NodeId, Scene, SceneError, TransactionLog};
use vrkit_input::{ControllerButton, ControllerInput};

/// Handle to a registered controller
pub type ControllerHandle = usize;

/// A controller with its overlap tracking and button state
#[derive(Debug)]
struct ControllerSlot {
    controller: TouchController,
    tracker: OverlapTracker,
    input: ControllerInput,
}

/// Owns the scene, the transaction strategy and the controllers.
///
/// A frame runs three stages in order: layout settles every dirty container,
/// interaction feeds pointer overlaps and button edges to each controller,
/// cleanup destroys nodes queued for deferred destruction.
#[derive(Debug)]
pub struct UIManager {
    scene: Scene,
    log: Box<dyn TransactionLog>,
    controllers: Vec<ControllerSlot>,
    frame: u64,
}

impl UIManager {
    /// Create an empty manager with the given deletion strategy
    pub fn new(log: Box<dyn TransactionLog>) -> Self {
        Self {
            scene: Scene::new(),
            log,
            controllers: Vec::new(),
            frame: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Scene and log together, for factories that need both.
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut dyn TransactionLog) {
        (&mut self.scene, self.log.as_mut())
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Spawn a controller node named `name` and start dispatching for it
    pub fn add_controller(
        &mut self,
        name: &str,
        index: u32,
        pointer_z_offset: f32,
    ) -> Result<ControllerHandle, SceneError> {
        let node = self.scene.spawn(name);
        let controller = TouchController::new(&mut self.scene, node, index, pointer_z_offset)?;
        self.controllers.push(ControllerSlot {
            controller,
            tracker: OverlapTracker::new(),
            input: ControllerInput::new(),
        });
        tracing::info!(name, index, "controller added");
        Ok(self.controllers.len() - 1)
    }

    pub fn controller(&self, handle: ControllerHandle) -> Option<&TouchController> {
        self.controllers.get(handle).map(|slot| &slot.controller)
    }

    pub fn controller_mut(&mut self, handle: ControllerHandle) -> Option<&mut TouchController> {
        self.controllers.get_mut(handle).map(|slot| &mut slot.controller)
    }

    /// Controller node, for the host to move with tracking data
    pub fn controller_node(&self, handle: ControllerHandle) -> Option<NodeId> {
        self.controller(handle).map(TouchController::node)
    }

    /// Hand over the buttons held now. They stay held until the next call.
    pub fn set_controller_input<I>(&mut self, handle: ControllerHandle, held: I)
    where
        I: IntoIterator<Item = ControllerButton>,
    {
        if let Some(slot) = self.controllers.get_mut(handle) {
            slot.input.set_held(held);
        }
    }

    /// Bring every dirty row, column and container up to date
    pub fn layout_stage(&mut self) -> Result<usize, SceneError> {
        layout::settle(&mut self.scene, self.log.as_mut())
    }

    /// Feed overlaps and button edges to every controller
    pub fn interaction_stage(&mut self) {
        for slot in &mut self.controllers {
            slot.input.advance();
            let node = slot.controller.node();
            // A hidden hand touches nothing.
            let events = if self.scene.is_active_in_hierarchy(node) {
                let pointer = slot.controller.pointer_position(&self.scene);
                slot.tracker.update(&self.scene, pointer)
            } else {
                slot.tracker.clear()
            };
            for event in events {
                match event {
                    OverlapEvent::Enter(id) => slot.controller.touch_enter(&mut self.scene, id),
                    OverlapEvent::Exit(id) => slot.controller.touch_exit(&mut self.scene, id),
                }
            }
            slot.controller.update(&mut self.scene, &slot.input);
        }
    }

    /// Destroy nodes queued for deferred destruction
    pub fn cleanup_stage(&mut self) -> usize {
        self.scene.flush_destroyed()
    }

    /// Run one full frame
    pub fn frame(&mut self) {
        if let Err(err) = self.layout_stage() {
            tracing::warn!(error = %err, "layout failed");
        }
        self.interaction_stage();
        let destroyed = self.cleanup_stage();
        self.frame += 1;
        tracing::trace!(frame = self.frame, destroyed, "frame done");
    }
}
