//! Keyboard state and the key handler that edits it.
//!
//! The keyboard node carries a [`Keyboard`] component and owns four panel
//! subtrees, one per [`PanelKind`]. At most one panel is active at a time.
//! Keys hold a plain [`NodeId`] back-reference to the keyboard node, so a key
//! that outlives its keyboard fails with a scene error instead of touching a
//! reused node.

use super::button::ButtonBehavior;
use super::label::Label3D;
use super::require_mut;
use serde::{Deserialize, Serialize};
use vrkit_core::{
    Component, InteractionContext, InteractionError, NodeId, Scene, SceneError, Touchable,
    Triggerable,
};

/// One of the four keyboard panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    /// Lowercase letters
    LowerCase,
    /// Uppercase letters
    UpperCase,
    /// Digits and common punctuation
    Number,
    /// Symbols
    Symbol,
}

impl PanelKind {
    /// Build order.
    pub const ALL: [PanelKind; 4] = [
        PanelKind::LowerCase,
        PanelKind::UpperCase,
        PanelKind::Number,
        PanelKind::Symbol,
    ];

    /// Name of the panel node.
    pub fn node_name(self) -> &'static str {
        match self {
            PanelKind::LowerCase => "PanelLowerCase",
            PanelKind::UpperCase => "PanelUpperCase",
            PanelKind::Number => "PanelNumber",
            PanelKind::Symbol => "PanelSymbol",
        }
    }

    fn index(self) -> usize {
        match self {
            PanelKind::LowerCase => 0,
            PanelKind::UpperCase => 1,
            PanelKind::Number => 2,
            PanelKind::Symbol => 3,
        }
    }
}

/// What a key does to its keyboard when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Append text.
    Insert(String),
    /// Remove the last character.
    Backspace,
    /// Switch between the letter cases. `on` is set on the uppercase panel.
    ShiftLock {
        /// Shift state of the panel the key sits on.
        on: bool,
    },
    /// Show the number panel.
    NumLock,
    /// Show the symbol panel.
    Symbol,
    /// Back to lowercase letters.
    Abc,
    /// Submit the typed value and clear it.
    Return,
    /// Hide the keyboard.
    Done,
}

/// Keyboard state, attached to the keyboard node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyboard {
    /// Text typed so far
    pub value: String,
    /// Values submitted with Return, oldest first
    pub submitted: Vec<String>,
    active: Option<PanelKind>,
    panels: [Option<NodeId>; 4],
    displays: Vec<NodeId>,
    visible: bool,
}

impl Keyboard {
    /// Empty keyboard with no panels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node of the given panel, if built.
    pub fn panel(&self, kind: PanelKind) -> Option<NodeId> {
        self.panels[kind.index()]
    }

    /// Every built panel with its kind.
    pub fn panels(&self) -> impl Iterator<Item = (PanelKind, NodeId)> + '_ {
        PanelKind::ALL
            .into_iter()
            .filter_map(|kind| self.panel(kind).map(|id| (kind, id)))
    }

    /// Panel currently shown.
    pub fn active(&self) -> Option<PanelKind> {
        self.active
    }

    /// Whether the keyboard is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Labels mirroring the value.
    pub fn displays(&self) -> &[NodeId] {
        &self.displays
    }

    pub(crate) fn set_panel(&mut self, kind: PanelKind, id: NodeId) {
        self.panels[kind.index()] = Some(id);
    }

    pub(crate) fn add_display(&mut self, id: NodeId) {
        if !self.displays.contains(&id) {
            self.displays.push(id);
        }
    }
}

impl Component for Keyboard {}

fn keyboard_mut(scene: &mut Scene, keyboard: NodeId) -> Result<&mut Keyboard, InteractionError> {
    require_mut::<Keyboard>(scene, keyboard)
}

impl Keyboard {
    /// Show `kind`, deactivating every other panel, and make the keyboard
    /// visible.
    pub fn show_panel(
        scene: &mut Scene,
        keyboard: NodeId,
        kind: PanelKind,
    ) -> Result<(), InteractionError> {
        keyboard_mut(scene, keyboard)?;
        Self::activate(scene, keyboard, kind)?;
        Ok(())
    }

    /// Panel switch without the component check; a node with no keyboard
    /// state is left alone.
    pub(crate) fn activate(
        scene: &mut Scene,
        keyboard: NodeId,
        kind: PanelKind,
    ) -> Result<(), SceneError> {
        scene.node(keyboard)?;
        let Some(state) = scene.get_mut::<Keyboard>(keyboard) else {
            return Ok(());
        };
        state.active = Some(kind);
        state.visible = true;
        let panels: Vec<_> = state.panels().collect();

        scene.set_active(keyboard, true)?;
        for (panel_kind, panel) in panels {
            // A destroyed panel is simply not shown.
            match scene.set_active(panel, panel_kind == kind) {
                Ok(()) | Err(SceneError::UnknownNode(_)) => {}
                Err(err) => return Err(err),
            }
        }
        tracing::debug!(keyboard = %keyboard, panel = ?kind, "show panel");
        Ok(())
    }

    /// Hide the whole keyboard.
    pub fn hide(scene: &mut Scene, keyboard: NodeId) -> Result<(), InteractionError> {
        keyboard_mut(scene, keyboard)?.visible = false;
        scene.set_active(keyboard, false)?;
        tracing::debug!(keyboard = %keyboard, "hide keyboard");
        Ok(())
    }

    /// Apply a key action and refresh the display labels.
    pub fn apply(
        scene: &mut Scene,
        keyboard: NodeId,
        action: &KeyAction,
    ) -> Result<(), InteractionError> {
        let state = keyboard_mut(scene, keyboard)?;
        match action {
            KeyAction::Insert(text) => state.value.push_str(text),
            KeyAction::Backspace => {
                state.value.pop();
            }
            KeyAction::Return => {
                let value = std::mem::take(&mut state.value);
                tracing::info!(keyboard = %keyboard, value = %value, "keyboard submit");
                state.submitted.push(value);
            }
            KeyAction::ShiftLock { on: true } | KeyAction::Abc => {
                return Self::show_panel(scene, keyboard, PanelKind::LowerCase);
            }
            KeyAction::ShiftLock { on: false } => {
                return Self::show_panel(scene, keyboard, PanelKind::UpperCase);
            }
            KeyAction::NumLock => return Self::show_panel(scene, keyboard, PanelKind::Number),
            KeyAction::Symbol => return Self::show_panel(scene, keyboard, PanelKind::Symbol),
            KeyAction::Done => return Self::hide(scene, keyboard),
        }
        Self::refresh_displays(scene, keyboard)
    }

    /// Copy the value into every display label still alive.
    pub fn refresh_displays(scene: &mut Scene, keyboard: NodeId) -> Result<(), InteractionError> {
        let state = keyboard_mut(scene, keyboard)?;
        let value = state.value.clone();
        let displays = state.displays.clone();
        for display in displays {
            if let Some(label) = scene.get_mut::<Label3D>(display) {
                label.text.clone_from(&value);
            }
        }
        Ok(())
    }
}

/// Handler on every keyboard key: button visuals plus the key's action.
#[derive(Debug, Clone)]
pub struct KeyboardKeyBehavior {
    /// Keyboard node the key edits
    pub keyboard: NodeId,
    /// Effect of a press
    pub action: KeyAction,
}

impl KeyboardKeyBehavior {
    /// Handler for one key.
    pub fn new(keyboard: NodeId, action: KeyAction) -> Self {
        Self { keyboard, action }
    }
}

impl Touchable for KeyboardKeyBehavior {
    fn on_touch_start(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        ButtonBehavior.on_touch_start(scene, node, ctx)
    }

    fn on_touch_stop(
        &self,
        scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        ButtonBehavior.on_touch_stop(scene, node, ctx)
    }
}

impl Triggerable for KeyboardKeyBehavior {
    fn on_trigger_down(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        if ButtonBehavior::press(scene, node)? {
            Keyboard::apply(scene, self.keyboard, &self.action)?;
        }
        Ok(())
    }

    fn on_trigger_up(
        &self,
        scene: &mut Scene,
        node: NodeId,
        _ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        ButtonBehavior::release(scene, node).map(|_| ())
    }
}
