#![warn(missing_docs)]
//! Tracked-controller button state.
//!
//! Buttons are polled: the host reports the set of buttons currently held
//! whenever it changes, and every tick edges are derived by diffing that set
//! against the previous tick's snapshot. A reported set stays held until the
//! next report, so an edge fires on exactly one tick. Nothing is queued, so
//! replaying the same snapshots always yields the same edges.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Named controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerButton {
    /// Index-finger trigger.
    Trigger,
    /// Side grip.
    Grip,
    /// Touchpad / thumbstick click.
    Touchpad,
    /// Application menu button.
    Menu,
}

/// Controller family, used for logging and per-device tweaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerHardware {
    /// HTC Vive wands.
    HtcVive,
    /// Oculus Touch controllers.
    OculusTouch,
}

impl ControllerHardware {
    /// Guess the controller family from the headset model string.
    pub fn detect(model: &str) -> Self {
        let hardware = if model.contains("Rift") {
            ControllerHardware::OculusTouch
        } else {
            ControllerHardware::HtcVive
        };
        tracing::debug!(model, ?hardware, "detected controller hardware");
        hardware
    }
}

/// Button state for a single controller across two frames.
#[derive(Debug, Default, Clone)]
pub struct ControllerInput {
    /// Buttons held last frame.
    previous: HashSet<ControllerButton>,
    /// Buttons held this frame.
    current: HashSet<ControllerButton>,
    /// Latest set reported by the host, picked up on the next tick.
    reported: HashSet<ControllerButton>,
}

impl ControllerInput {
    /// Create an input state with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the buttons held right now. Takes effect on the next
    /// [`advance`](Self::advance).
    pub fn set_held<I>(&mut self, held: I)
    where
        I: IntoIterator<Item = ControllerButton>,
    {
        self.reported = held.into_iter().collect();
    }

    /// Move to the next tick: the current snapshot becomes the previous one
    /// and the last reported set becomes current.
    pub fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.reported.clone());
    }

    /// Button went down this frame.
    pub fn pressed_down(&self, button: ControllerButton) -> bool {
        self.current.contains(&button) && !self.previous.contains(&button)
    }

    /// Button went up this frame.
    pub fn pressed_up(&self, button: ControllerButton) -> bool {
        !self.current.contains(&button) && self.previous.contains(&button)
    }

    /// Button is held this frame.
    pub fn is_pressed(&self, button: ControllerButton) -> bool {
        self.current.contains(&button)
    }

    /// Buttons held this frame.
    pub fn held(&self) -> impl Iterator<Item = ControllerButton> + '_ {
        self.current.iter().copied()
    }
}
