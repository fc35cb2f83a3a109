//! Interactive button component

use super::require_mut;
use crate::profile::ButtonProfile;
use vrkit_core::{
    Component, InteractionContext, InteractionError, NodeId, Scene, Touchable, Triggerable,
};

/// Button state for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Not interacted with
    Normal,
    /// A controller is touching the button
    Hover,
    /// Trigger held on the button
    Pressed,
    /// Ignores input
    Disabled,
}

/// Whether a press is momentary or latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Pressed only while the trigger is held.
    Momentary,
    /// Flips `on` at every press.
    Toggle {
        /// Current latch state.
        on: bool,
    },
}

/// Color scheme for button states
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonColors {
    /// Normal state color
    pub normal: [f32; 4],
    /// Hover state color
    pub hover: [f32; 4],
    /// Pressed state color
    pub pressed: [f32; 4],
    /// Disabled state color
    pub disabled: [f32; 4],
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self::from_profile(&ButtonProfile::default())
    }
}

impl ButtonColors {
    /// Colors derived from a button profile.
    pub fn from_profile(profile: &ButtonProfile) -> Self {
        let [r, g, b, _] = profile.body_color;
        Self {
            normal: profile.body_color,
            hover: profile.body_active_color,
            pressed: profile.body_active_color,
            disabled: [r, g, b, 0.5],
        }
    }
}

/// Button state living on the button root node.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    /// Label text
    pub text: String,
    /// Momentary or toggle
    pub kind: ButtonKind,
    /// Current visual state
    pub state: ButtonState,
    /// Color scheme for different states
    pub colors: ButtonColors,
    /// Clip played on press
    pub click_down: Option<String>,
    /// Clip played on release
    pub click_up: Option<String>,
    /// Body child node
    pub body: Option<NodeId>,
    /// Label child node
    pub label: Option<NodeId>,
    touches: u32,
}

impl Button {
    /// Create a button with default colors and no sounds.
    pub fn new(text: impl Into<String>, kind: ButtonKind) -> Self {
        Self {
            text: text.into(),
            kind,
            state: ButtonState::Normal,
            colors: ButtonColors::default(),
            click_down: None,
            click_up: None,
            body: None,
            label: None,
            touches: 0,
        }
    }

    /// Builder: colors and sounds from a profile
    pub fn with_profile(mut self, profile: &ButtonProfile) -> Self {
        self.colors = ButtonColors::from_profile(profile);
        self.click_down = profile.click_down.clone();
        self.click_up = profile.click_up.clone();
        self
    }

    /// Get current color based on state
    pub fn current_color(&self) -> [f32; 4] {
        match self.state {
            ButtonState::Normal => self.colors.normal,
            ButtonState::Hover => self.colors.hover,
            ButtonState::Pressed => self.colors.pressed,
            ButtonState::Disabled => self.colors.disabled,
        }
    }

    /// Check if button is interactable
    pub fn is_interactable(&self) -> bool {
        self.state != ButtonState::Disabled
    }

    /// Latch state for toggles; false for momentary buttons.
    pub fn is_on(&self) -> bool {
        matches!(self.kind, ButtonKind::Toggle { on: true })
    }

    /// Enable or disable the button.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.state = match (enabled, self.touches) {
            (false, _) => ButtonState::Disabled,
            (true, 0) => ButtonState::Normal,
            (true, _) => ButtonState::Hover,
        };
    }

    fn touch_start(&mut self) {
        self.touches += 1;
        if self.state == ButtonState::Normal {
            self.state = ButtonState::Hover;
        }
    }

    fn touch_stop(&mut self) {
        self.touches = self.touches.saturating_sub(1);
        if self.touches == 0 && self.state == ButtonState::Hover {
            self.state = ButtonState::Normal;
        }
    }

    /// Returns false when the press was ignored.
    fn press(&mut self) -> bool {
        if !self.is_interactable() {
            return false;
        }
        self.state = ButtonState::Pressed;
        if let ButtonKind::Toggle { on } = &mut self.kind {
            *on = !*on;
        }
        true
    }

    fn release(&mut self) -> bool {
        if self.state != ButtonState::Pressed {
            return false;
        }
        self.state = if self.touches > 0 {
            ButtonState::Hover
        } else {
            ButtonState::Normal
        };
        true
    }
}

impl Component for Button {}

/// Marker on spacer nodes: empty gaps in a row with no interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spacer {
    /// Gap width
    pub width: f32,
}

impl Component for Spacer {}

/// Touch and trigger handler for plain buttons.
#[derive(Debug, Default)]
pub struct ButtonBehavior;

impl ButtonBehavior {
    pub(crate) fn press(scene: &mut Scene, node: NodeId) -> Result<bool, InteractionError> {
        let button = require_mut::<Button>(scene, node)?;
        let pressed = button.press();
        if pressed {
            if let Some(clip) = &button.click_down {
                tracing::debug!(node = %node, clip = %clip, "play click");
            }
        }
        Ok(pressed)
    }

    pub(crate) fn release(scene: &mut Scene, node: NodeId) -> Result<bool, InteractionError> {
        let button = require_mut::<Button>(scene, node)?;
        let released = button.release();
        if released {
            if let Some(clip) = &button.click_up {
                tracing::debug!(node = %node, clip = %clip, "play click");
            }
        }
        Ok(released)
    }
}

impl Touchable for ButtonBehavior {
    fn on_touch_start(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        require_mut::<Button>(scene, node)?.touch_start();
        Ok(())
    }

    fn on_touch_stop(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        require_mut::<Button>(scene, node)?.touch_stop();
        Ok(())
    }
}

impl Triggerable for ButtonBehavior {
    fn on_trigger_down(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        Self::press(scene, node).map(|_| ())
    }

    fn on_trigger_up(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        Self::release(scene, node).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    fn ctx() -> InteractionContext {
        InteractionContext {
            controller_index: 0,
            spawn_point: Mat4::IDENTITY,
        }
    }

    #[test]
    fn test_button_states() {
        let mut button = Button::new("Test", ButtonKind::Momentary);
        assert!(button.is_interactable());

        button.touch_start();
        assert_eq!(button.state, ButtonState::Hover);
        assert!(button.press());
        assert_eq!(button.state, ButtonState::Pressed);
        assert!(button.release());
        assert_eq!(button.state, ButtonState::Hover);
        button.touch_stop();
        assert_eq!(button.state, ButtonState::Normal);

        button.set_enabled(false);
        assert!(!button.press());
        assert_eq!(button.state, ButtonState::Disabled);
    }

    #[test]
    fn test_toggle_flips_on_press() {
        let mut button = Button::new("⇧", ButtonKind::Toggle { on: false });
        button.press();
        assert!(button.is_on());
        button.release();
        button.press();
        assert!(!button.is_on());
    }

    #[test]
    fn test_button_colors() {
        let mut button = Button::new("Test", ButtonKind::Momentary);
        let normal = button.current_color();
        button.touch_start();
        assert_ne!(normal, button.current_color());
    }

    #[test]
    fn behavior_drives_component_through_scene() {
        let mut scene = Scene::new();
        let node = scene.spawn("button");
        scene
            .attach(node, Button::new("ok", ButtonKind::Momentary))
            .unwrap();
        let behavior = ButtonBehavior;

        behavior.on_touch_start(&mut scene, node, &ctx()).unwrap();
        behavior.on_trigger_down(&mut scene, node, &ctx()).unwrap();
        assert_eq!(scene.get::<Button>(node).unwrap().state, ButtonState::Pressed);
        behavior.on_trigger_up(&mut scene, node, &ctx()).unwrap();
        behavior.on_touch_stop(&mut scene, node, &ctx()).unwrap();
        assert_eq!(scene.get::<Button>(node).unwrap().state, ButtonState::Normal);
    }

    #[test]
    fn behavior_without_component_reports_it() {
        let mut scene = Scene::new();
        let node = scene.spawn("bare");
        let err = ButtonBehavior
            .on_trigger_down(&mut scene, node, &ctx())
            .unwrap_err();
        assert_eq!(
            err,
            InteractionError::MissingComponent {
                node,
                component: "Button"
            }
        );
    }
}
