//! Widget components and the capability handlers that drive them.
//!
//! Components hold the mutable state of a widget (button visuals, keyboard
//! text, panel grab offsets). Behaviors are the stateless handlers registered
//! on nodes; they look their component up through the scene on every call.

pub mod button;
pub mod keyboard;
pub mod label;
pub mod panel;

pub use button::{Button, ButtonBehavior, ButtonColors, ButtonKind, ButtonState, Spacer};
pub use keyboard::{KeyAction, Keyboard, KeyboardKeyBehavior, PanelKind};
pub use label::{KeyboardLabel, Label3D};
pub use panel::{GrabState, Rigidbody, StandardPanel, StandardPanelBehavior};

use vrkit_core::{Component, InteractionError, NodeId, Scene};

/// Component of type `T` on `node`, or `MissingComponent`.
pub(crate) fn require_mut<T: Component>(
    scene: &mut Scene,
    node: NodeId,
) -> Result<&mut T, InteractionError> {
    scene.node(node)?;
    scene
        .get_mut::<T>(node)
        .ok_or(InteractionError::MissingComponent {
            node,
            component: short_type_name::<T>(),
        })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
