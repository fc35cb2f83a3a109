//! Keyboard factory.
//!
//! A keyboard is a node with a [`Keyboard`] component and four panel
//! children. Each panel is an auto-sizing container holding one column:
//!
//! ```text
//! Keyboard
//! └── PanelLowerCase (PanelContainer, StandardPanel, Rigidbody, BoxCollider)
//!     └── Column
//!         ├── Row (right aligned): Done
//!         ├── DisplayRow (left aligned): Display
//!         └── Row x4: keys
//! ```
//!
//! Every build pass parks its profile copies and per-widget factories on a
//! scratch child of the parent, which is handed to the transaction log for
//! destruction at the end of the pass whether or not the build succeeded.

use super::button::{ButtonFactory, SpacerFactory};
use super::container::{ColumnContainerFactory, PanelContainerFactory, RowContainerFactory};
use super::key::{Key, KeyType, KeyboardLayouts};
use super::{BuildError, KeyboardHandle, KeyboardProfiles, PanelHandle};
use crate::components::{
    ButtonKind, KeyAction, Keyboard, KeyboardKeyBehavior, KeyboardLabel, Label3D, PanelKind,
    Rigidbody, StandardPanel, StandardPanelBehavior,
};
use crate::interaction::BoxCollider;
use crate::layout::{self, Alignment};
use crate::profile::{ButtonProfile, PanelContainerProfile, PanelProfile};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vrkit_core::{Component, NodeId, Scene, SceneError, Transform3D, TransactionLog};

/// Key sizing and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    pub key_min_width: f32,
    pub key_character_size: f32,
    pub num_lock_character_size: f32,
    pub space_min_width: f32,
    pub return_min_width: f32,
    pub spacer_width: f32,
    pub mode_key_min_width: f32,
    pub wide_key_min_width: f32,
    /// Custom rows; the stock QWERTY layout when unset.
    pub layouts: Option<KeyboardLayouts>,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            key_min_width: 0.025,
            key_character_size: 0.8,
            num_lock_character_size: 0.4,
            space_min_width: 0.272,
            return_min_width: 0.07,
            spacer_width: 0.001,
            mode_key_min_width: 0.025,
            wide_key_min_width: 0.0435,
            layouts: None,
        }
    }
}

impl KeyboardSettings {
    /// Rows to build.
    pub fn layouts(&self) -> KeyboardLayouts {
        self.layouts
            .clone()
            .unwrap_or_else(|| KeyboardLayouts::qwerty(self.spacer_width))
    }
}

/// Profiles a build cannot do without, in `KeyboardProfiles` order.
type Required<'a> = (
    &'a PanelProfile,
    &'a PanelContainerProfile,
    &'a ButtonProfile,
    &'a ButtonProfile,
);

/// Per-key-type profile copies for one build pass.
#[derive(Debug, Clone)]
struct KeyProfiles {
    key: ButtonProfile,
    wide: ButtonProfile,
    space: ButtonProfile,
    mode: ButtonProfile,
    num_lock: ButtonProfile,
    return_key: ButtonProfile,
}

impl Component for KeyProfiles {}

impl KeyProfiles {
    fn new(settings: &KeyboardSettings, momentary: &ButtonProfile, toggle: &ButtonProfile) -> Self {
        let sized = |base: &ButtonProfile, character_size: f32, min_width: f32| {
            base.clone()
                .with_character_size(character_size)
                .with_min_width(min_width)
        };
        let chars = settings.key_character_size;
        Self {
            key: sized(momentary, chars, settings.key_min_width),
            wide: sized(momentary, chars, settings.wide_key_min_width),
            space: sized(momentary, chars, settings.space_min_width),
            mode: sized(toggle, chars, settings.mode_key_min_width),
            num_lock: sized(
                toggle,
                settings.num_lock_character_size,
                settings.mode_key_min_width,
            ),
            return_key: sized(momentary, chars, settings.return_min_width),
        }
    }
}

/// Check every profile before anything touches the scene.
fn require_profiles<'a>(profiles: &KeyboardProfiles<'a>) -> Result<Required<'a>, BuildError> {
    let panel = profiles.panel.ok_or(BuildError::MissingProfile("panel"))?;
    let container = profiles
        .container
        .ok_or(BuildError::MissingProfile("panel container"))?;
    let momentary = profiles
        .momentary
        .ok_or(BuildError::MissingProfile("momentary button"))?;
    let toggle = profiles
        .toggle
        .ok_or(BuildError::MissingProfile("toggle button"))?;
    Ok((panel, container, momentary, toggle))
}

/// Builds keyboards under a parent node.
#[derive(Debug, Clone, Default)]
pub struct KeyboardFactory {
    pub settings: KeyboardSettings,
}

impl KeyboardFactory {
    pub fn new(settings: KeyboardSettings) -> Self {
        Self { settings }
    }

    /// Build (or complete) the keyboard under `parent`. A parent that already
    /// has a keyboard keeps it; only panels that are missing get built.
    pub fn build_keyboard(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        parent: NodeId,
        profiles: &KeyboardProfiles<'_>,
    ) -> Result<KeyboardHandle, BuildError> {
        self.with_scratch(scene, log, parent, profiles, |scene, log, scratch, required| {
            self.generate(scene, log, parent, scratch, required)
        })
    }

    /// Build the `kind` panel with its configured rows under `keyboard` and
    /// register it there. The panel starts hidden when its profile says so.
    pub fn build_panel(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        keyboard: NodeId,
        kind: PanelKind,
        profiles: &KeyboardProfiles<'_>,
    ) -> Result<PanelHandle, BuildError> {
        self.with_scratch(scene, log, keyboard, profiles, |scene, log, scratch, required| {
            let pass = self.pass(scene, scratch, keyboard, required)?;
            let rows = self.settings.layouts();
            let handle = pass.build_panel(scene, log, kind, rows.for_panel(kind))?;
            if let Some(state) = scene.get_mut::<Keyboard>(keyboard) {
                state.set_panel(kind, handle.node);
            }
            Ok(handle)
        })
    }

    /// Build one row of `keys` under `parent` inside `panel`. Keys of an
    /// unknown type are skipped; the rest keep their order.
    #[allow(clippy::too_many_arguments)]
    pub fn build_button_row(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        panel: &PanelHandle,
        parent: NodeId,
        keys: &[Key],
        alignment: Alignment,
        profiles: &KeyboardProfiles<'_>,
    ) -> Result<NodeId, BuildError> {
        let keyboard = scene
            .get::<StandardPanel>(panel.node)
            .map(|state| state.grab_target)
            .ok_or(BuildError::NotAPanel(panel.node))?;
        self.with_scratch(scene, log, keyboard, profiles, |scene, _, scratch, required| {
            let pass = self.pass(scene, scratch, keyboard, required)?;
            pass.build_button_row(scene, panel, parent, keys, alignment)
        })
    }

    /// Run `build` with a scratch node under `parent` that holds the pass's
    /// profile copies and factories. The scratch node goes to the log for
    /// destruction whether or not the build succeeded.
    fn with_scratch<R>(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        parent: NodeId,
        profiles: &KeyboardProfiles<'_>,
        build: impl FnOnce(
            &mut Scene,
            &mut dyn TransactionLog,
            NodeId,
            Required<'_>,
        ) -> Result<R, BuildError>,
    ) -> Result<R, BuildError> {
        let required = require_profiles(profiles)?;
        scene.node(parent)?;

        let group = log.begin_group("KeyboardFactory Generate");
        let scratch = scene.spawn_child(parent, "disposable")?;
        let result = build(scene, log, scratch, required);
        let cleanup = log.destroy(scene, scratch);
        log.collapse_group(group);

        let value = result?;
        cleanup?;
        Ok(value)
    }

    fn pass<'a>(
        &'a self,
        scene: &mut Scene,
        scratch: NodeId,
        keyboard: NodeId,
        profiles: Required<'_>,
    ) -> Result<BuildPass<'a>, SceneError> {
        let (panel, container, momentary, toggle) = profiles;
        let keys = KeyProfiles::new(&self.settings, momentary, toggle);
        scene.attach(scratch, keys.clone())?;
        Ok(BuildPass {
            settings: &self.settings,
            scratch,
            keyboard,
            keys,
            panel: panel.clone(),
            container: container.clone(),
            momentary: momentary.clone(),
        })
    }

    fn generate(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        parent: NodeId,
        scratch: NodeId,
        profiles: Required<'_>,
    ) -> Result<KeyboardHandle, BuildError> {
        let keyboard = match scene.find_child_with::<Keyboard>(parent)? {
            Some(existing) => existing,
            None => {
                let node = scene.spawn_child(parent, "Keyboard")?;
                scene.attach(node, Keyboard::new())?;
                node
            }
        };
        let pass = self.pass(scene, scratch, keyboard, profiles)?;
        let live_panel = |scene: &Scene, kind: PanelKind| {
            scene
                .get::<Keyboard>(keyboard)
                .and_then(|state| state.panel(kind))
                .filter(|id| scene.contains(*id))
        };
        let view: &Scene = scene;
        let shown = view
            .get::<Keyboard>(keyboard)
            .and_then(Keyboard::active)
            .filter(|kind| live_panel(view, *kind).is_some());

        let layouts = self.settings.layouts();
        let mut built = 0;
        for kind in PanelKind::ALL {
            if live_panel(scene, kind).is_some() {
                continue;
            }
            let handle = pass.build_panel(scene, log, kind, layouts.for_panel(kind))?;
            if let Some(state) = scene.get_mut::<Keyboard>(keyboard) {
                state.set_panel(kind, handle.node);
            }
            built += 1;
        }

        if built > 0 {
            Keyboard::activate(scene, keyboard, shown.unwrap_or(PanelKind::LowerCase))?;
        }
        tracing::info!(keyboard = %keyboard, panels_built = built, "keyboard generated");
        Ok(KeyboardHandle { node: keyboard })
    }
}

/// State shared by every step of one build.
struct BuildPass<'a> {
    settings: &'a KeyboardSettings,
    scratch: NodeId,
    keyboard: NodeId,
    keys: KeyProfiles,
    panel: PanelProfile,
    container: PanelContainerProfile,
    momentary: ButtonProfile,
}

impl BuildPass<'_> {
    /// Container + panel behavior + column with header and key rows.
    fn build_panel(
        &self,
        scene: &mut Scene,
        log: &mut dyn TransactionLog,
        kind: PanelKind,
        rows: &[Vec<Key>],
    ) -> Result<PanelHandle, BuildError> {
        let factory = PanelContainerFactory {
            parent: self.keyboard,
            name: kind.node_name().to_string(),
            profile: self.container.clone(),
        };
        scene.attach(self.scratch, factory.clone())?;
        let node = factory.generate(scene)?;

        scene.attach(node, StandardPanel::new(kind, self.panel.clone(), self.keyboard))?;
        scene.attach(node, Rigidbody::kinematic())?;
        scene.attach(node, BoxCollider::new(Vec3::new(1.0, 1.0, self.container.depth)))?;
        if self.panel.grabbable {
            scene.add_grabbable(node, Arc::new(StandardPanelBehavior))?;
        }
        let handle = PanelHandle { node, kind };

        let column = ColumnContainerFactory {
            parent: node,
            padding: self.container.padding,
            spacing: self.container.spacing,
        };
        scene.attach(self.scratch, column.clone())?;
        let column = column.generate(scene)?;

        self.build_button_row(scene, &handle, column, &[Key::done("done")], Alignment::Right)?;
        self.build_display_row(scene, column)?;
        for keys in rows {
            self.build_button_row(scene, &handle, column, keys, Alignment::Center)?;
        }

        layout::arrange_column(scene, column)?;
        layout::container::initialize(scene, node, log)?;
        if self.panel.hide_on_awake {
            scene.set_active(node, false)?;
        }
        tracing::debug!(panel = %node, kind = ?kind, "built panel");
        Ok(handle)
    }

    fn build_row(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        name: Option<&str>,
        alignment: Alignment,
    ) -> Result<NodeId, SceneError> {
        let factory = RowContainerFactory {
            parent,
            name: name.map(str::to_string),
            padding: self.container.padding,
            spacing: self.container.spacing,
            alignment,
        };
        scene.attach(self.scratch, factory.clone())?;
        factory.generate(scene)
    }

    /// One row of keys. Unknown key types are skipped with a warning.
    fn build_button_row(
        &self,
        scene: &mut Scene,
        panel: &PanelHandle,
        parent: NodeId,
        keys: &[Key],
        alignment: Alignment,
    ) -> Result<NodeId, BuildError> {
        let row = self.build_row(scene, parent, None, alignment)?;
        for key in keys {
            if self.button_by_key(scene, row, key)?.is_none() {
                tracing::warn!(panel = ?panel.kind, key = ?key, "unhandled key type; skipped");
            }
        }
        layout::arrange_row(scene, row)?;
        Ok(row)
    }

    fn button_by_key(
        &self,
        scene: &mut Scene,
        row: NodeId,
        key: &Key,
    ) -> Result<Option<NodeId>, SceneError> {
        let keys = &self.keys;
        let insert = |text: &str| KeyAction::Insert(text.to_string());
        let (profile, kind, action) = match key.kind {
            KeyType::Character => (&keys.key, ButtonKind::Momentary, insert(&key.value)),
            KeyType::Wide => (&keys.wide, ButtonKind::Momentary, insert(&key.value)),
            KeyType::Space => (&keys.space, ButtonKind::Momentary, insert(" ")),
            KeyType::ShiftLock => (
                &keys.mode,
                ButtonKind::Toggle { on: key.on },
                KeyAction::ShiftLock { on: key.on },
            ),
            KeyType::Abc => (&keys.num_lock, ButtonKind::Toggle { on: false }, KeyAction::Abc),
            KeyType::NumLock => (&keys.num_lock, ButtonKind::Momentary, KeyAction::NumLock),
            KeyType::Symbol => (&keys.num_lock, ButtonKind::Momentary, KeyAction::Symbol),
            KeyType::Return => (&keys.return_key, ButtonKind::Momentary, KeyAction::Return),
            KeyType::Backspace => (&keys.key, ButtonKind::Momentary, KeyAction::Backspace),
            KeyType::Done => (&keys.return_key, ButtonKind::Momentary, KeyAction::Done),
            KeyType::Spacer => {
                let mut size = self.momentary.body_scale;
                size.x = key.width;
                let factory = SpacerFactory { parent: row, size };
                scene.attach(self.scratch, factory.clone())?;
                let spacer = factory.generate(scene)?;
                self.pin_button_z(scene, spacer)?;
                return Ok(Some(spacer));
            }
            KeyType::Unknown => return Ok(None),
        };

        let factory = ButtonFactory::new(row, key.value.clone(), profile.clone())
            .with_kind(kind)
            .with_key(KeyboardKeyBehavior::new(self.keyboard, action));
        scene.attach(self.scratch, factory.clone())?;
        let button = factory.generate(scene)?;
        self.pin_button_z(scene, button)?;
        Ok(Some(button))
    }

    fn pin_button_z(&self, scene: &mut Scene, node: NodeId) -> Result<(), SceneError> {
        let mut position = scene.transform(node)?.position;
        position.z = self.container.button_z;
        scene.set_local_position(node, position)
    }

    /// Left-aligned row with the label that mirrors the typed value.
    fn build_display_row(&self, scene: &mut Scene, column: NodeId) -> Result<NodeId, SceneError> {
        let profile = &self.momentary;
        let row = self.build_row(scene, column, Some("DisplayRow"), Alignment::Left)?;

        let display = scene.spawn_child(row, "Display")?;
        scene.node_mut(display)?.extents = Some(Vec3::new(
            self.settings.space_min_width,
            profile.body_scale.y,
            0.0,
        ));
        scene.set_local_position(display, Vec3::new(0.0, 0.0, profile.label_z))?;

        let text = scene.spawn_child(display, "DisplayText")?;
        scene.set_transform(text, Transform3D::default().with_scale(profile.label_scale))?;
        let value = scene
            .get::<Keyboard>(self.keyboard)
            .map(|state| state.value.clone())
            .unwrap_or_default();
        scene.attach(
            text,
            Label3D::new(value)
                .with_font_size(profile.font_size)
                .with_color(profile.font_color),
        )?;
        scene.attach(text, KeyboardLabel { keyboard: self.keyboard })?;
        if let Some(state) = scene.get_mut::<Keyboard>(self.keyboard) {
            state.add_display(text);
        }

        layout::arrange_row(scene, row)?;
        Ok(row)
    }
}
