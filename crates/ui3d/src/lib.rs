//! World-space VR UI for vrkit
//!
//! This crate builds procedural keyboards and panels as scene-graph trees and
//! keeps them laid out and interactive frame after frame.
//!
//! # Features
//!
//! - **Layout primitives**: world-extent measurement and anchor-preserving resize math
//! - **Containers**: panels that size themselves to their largest child
//! - **Flow layout**: rows and columns with padding, spacing and alignment
//! - **Factories**: declarative profiles + key lists turned into full widget trees
//! - **Keyboard**: four case panels (lower, upper, number, symbol) with shared state
//! - **Interaction**: per-controller touch/trigger/grab dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use vrkit_core::RuntimeLog;
//! use vrkit_input::ControllerButton;
//! use vrkit_ui3d::{KeyboardFactory, KeyboardSettings, ProfileSet, UIManager};
//!
//! let mut ui = UIManager::new(Box::new(RuntimeLog::new()));
//! let root = ui.scene_mut().spawn("root");
//! let profiles = ProfileSet::default();
//! let factory = KeyboardFactory::new(KeyboardSettings::default());
//! let (scene, log) = ui.parts_mut();
//! let keyboard = factory.build_keyboard(scene, log, root, &profiles.borrowed()).unwrap();
//!
//! let hand = ui.add_controller("right hand", 0, 0.05).unwrap();
//! // Whenever the held buttons change:
//! ui.set_controller_input(hand, [ControllerButton::Trigger]);
//! ui.frame();
//! # let _ = keyboard;
//! ```

pub mod components;
pub mod factory;
pub mod interaction;
pub mod layout;
pub mod manager;
pub mod profile;

// Re-export commonly used types
pub use components::{
    Button, ButtonBehavior, ButtonColors, ButtonKind, ButtonState, KeyAction, Keyboard,
    KeyboardKeyBehavior, KeyboardLabel, Label3D, PanelKind, Rigidbody, Spacer, StandardPanel,
    StandardPanelBehavior,
};
pub use factory::{
    BuildError, ButtonFactory, Key, KeyType, KeyboardFactory, KeyboardHandle, KeyboardLayouts,
    KeyboardProfiles, KeyboardSettings, PanelHandle, ProfileSet,
};
pub use interaction::{BoxCollider, ColliderAabb, OverlapEvent, OverlapTracker, TouchController};
pub use layout::{
    get_world_height, get_world_width, resize_height, resize_width, Alignment, ColumnContainer,
    ContainerState, PanelContainer, PanelResizeHeight, PanelResizeWidth, RowContainer,
};
pub use manager::{ControllerHandle, UIManager};
pub use profile::{ButtonProfile, PanelContainerProfile, PanelProfile};

/// Version of the UI3D crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the crate version once at startup.
pub fn init() {
    tracing::info!("Initializing vrkit-ui3d v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        init();
        assert!(!VERSION.is_empty());
    }
}
