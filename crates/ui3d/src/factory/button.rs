//! Button and spacer factories.

use crate::components::{
    Button, ButtonBehavior, ButtonKind, KeyboardKeyBehavior, Label3D, Spacer,
};
use crate::interaction::BoxCollider;
use crate::profile::ButtonProfile;
use glam::Vec3;
use std::sync::Arc;
use vrkit_core::{Component, NodeId, Scene, SceneError, Transform3D};

/// Builds one button: a root carrying the state and collider, a body child
/// sized to the label, and a label child.
#[derive(Debug, Clone)]
pub struct ButtonFactory {
    pub parent: NodeId,
    pub text: String,
    pub profile: ButtonProfile,
    pub kind: ButtonKind,
    /// Keyboard wiring; `None` makes a plain button.
    pub key: Option<KeyboardKeyBehavior>,
}

impl Component for ButtonFactory {}

impl ButtonFactory {
    pub fn new(parent: NodeId, text: impl Into<String>, profile: ButtonProfile) -> Self {
        Self {
            parent,
            text: text.into(),
            profile,
            kind: ButtonKind::Momentary,
            key: None,
        }
    }

    pub fn with_kind(mut self, kind: ButtonKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_key(mut self, key: KeyboardKeyBehavior) -> Self {
        self.key = Some(key);
        self
    }

    pub fn generate(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let profile = &self.profile;
        let button = scene.spawn_child(self.parent, format!("Button {}", self.text))?;

        let size = Vec3::new(
            profile.body_width(&self.text),
            profile.body_scale.y,
            profile.body_scale.z,
        );
        let body = scene.spawn_child(button, "ButtonBody")?;
        scene.node_mut(body)?.extents = Some(size);

        let label = scene.spawn_child(button, "ButtonText")?;
        scene.set_transform(
            label,
            Transform3D::new(Vec3::new(0.0, 0.0, profile.label_z)).with_scale(
                profile.label_scale * profile.character_size,
            ),
        )?;
        scene.attach(
            label,
            Label3D::new(self.text.clone())
                .with_font_size(profile.font_size)
                .with_color(profile.font_color),
        )?;

        let mut state = Button::new(self.text.clone(), self.kind).with_profile(profile);
        state.body = Some(body);
        state.label = Some(label);
        scene.attach(button, state)?;
        scene.attach(button, BoxCollider::new(size))?;

        match &self.key {
            Some(key) => {
                let handler = Arc::new(key.clone());
                scene.add_touchable(button, handler.clone())?;
                scene.add_triggerable(button, handler)?;
            }
            None => {
                let handler = Arc::new(ButtonBehavior);
                scene.add_touchable(button, handler.clone())?;
                scene.add_triggerable(button, handler)?;
            }
        }

        tracing::trace!(node = %button, text = %self.text, width = size.x, "generated button");
        Ok(button)
    }
}

/// Builds an empty, non-interactive gap.
#[derive(Debug, Clone)]
pub struct SpacerFactory {
    pub parent: NodeId,
    pub size: Vec3,
}

impl Component for SpacerFactory {}

impl SpacerFactory {
    pub fn generate(&self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let spacer = scene.spawn_child(self.parent, "ButtonSpacer")?;
        scene.node_mut(spacer)?.extents = Some(self.size);
        scene.attach(spacer, Spacer { width: self.size.x })?;
        Ok(spacer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::KeyAction;
    use crate::layout::get_world_width;

    #[test]
    fn button_has_body_label_and_collider() {
        let mut scene = Scene::new();
        let row = scene.spawn("row");
        let profile = ButtonProfile::default().with_min_width(0.07);
        let button = ButtonFactory::new(row, "go", profile)
            .generate(&mut scene)
            .unwrap();

        assert!(scene.find_child(button, "ButtonBody").unwrap().is_some());
        let label = scene.find_child(button, "ButtonText").unwrap().unwrap();
        assert_eq!(scene.get::<Label3D>(label).unwrap().text, "go");
        assert!(scene.has::<BoxCollider>(button));
        assert!((get_world_width(&scene, button).unwrap() - 0.07).abs() < 1e-6);
        assert!(scene.triggerable(button).is_some());
    }

    #[test]
    fn keyboard_button_carries_its_action() {
        let mut scene = Scene::new();
        let keyboard = scene.spawn("keyboard");
        let button = ButtonFactory::new(keyboard, "a", ButtonProfile::default())
            .with_key(KeyboardKeyBehavior::new(keyboard, KeyAction::Insert("a".into())))
            .generate(&mut scene)
            .unwrap();
        assert_eq!(scene.touchables(button).len(), 1);
        assert!(scene.grabbable(button).is_none());
    }

    #[test]
    fn spacer_is_inert() {
        let mut scene = Scene::new();
        let row = scene.spawn("row");
        let spacer = SpacerFactory {
            parent: row,
            size: Vec3::new(0.001, 0.025, 0.01),
        }
        .generate(&mut scene)
        .unwrap();

        assert!((get_world_width(&scene, spacer).unwrap() - 0.001).abs() < 1e-7);
        assert!(scene.node(spacer).unwrap().capabilities().is_empty());
        assert!(!scene.has::<BoxCollider>(spacer));
    }
}
