//! Scripted typing: aims the controller at keys and pulls the trigger,
//! one schedule run per frame.

use anyhow::{Context, Result};
use bevy_ecs::prelude::*;
use vrkit_core::{NodeId, Scene};
use vrkit_ecs::{build_frame_schedule, run_frame, UiState};
use vrkit_input::ControllerButton;
use vrkit_ui3d::{Button, ControllerHandle, Keyboard, PanelKind, UIManager};

/// Runs the frame schedule over a world holding the UI.
pub struct FrameDriver {
    world: World,
    schedules: Schedules,
    hand: ControllerHandle,
    frame: u64,
}

impl FrameDriver {
    pub fn new(ui: UIManager, hand: ControllerHandle) -> Self {
        let mut world = World::new();
        world.insert_resource(UiState(ui));
        Self {
            world,
            schedules: build_frame_schedule(),
            hand,
            frame: 0,
        }
    }

    pub fn ui(&self) -> &UIManager {
        &self.world.resource::<UiState>().0
    }

    pub fn ui_mut(&mut self) -> &mut UIManager {
        &mut self.world.resource_mut::<UiState>().into_inner().0
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Run one frame with `held` as the controller's buttons.
    pub fn step(&mut self, held: &[ControllerButton]) {
        let hand = self.hand;
        self.ui_mut().set_controller_input(hand, held.iter().copied());
        run_frame(&mut self.world, &mut self.schedules, self.frame);
        self.frame += 1;
    }

    /// Move the controller so its pointer sits on `target`.
    fn aim(&mut self, target: glam::Vec3) -> Result<()> {
        let hand = self.hand;
        let ui = self.ui_mut();
        let controller = ui.controller(hand).context("controller not registered")?;
        let node = controller.node();
        let scene = ui.scene();
        let lead = controller.pointer_position(scene) - scene.world_position(node)?;
        let position = scene.transform(node)?.position + (target - scene.world_position(node)?);
        ui.scene_mut().set_local_position(node, position - lead)?;
        Ok(())
    }
}

fn key_label(ch: char) -> String {
    match ch {
        ' ' => "space".to_string(),
        '\n' => "return".to_string(),
        other => other.to_string(),
    }
}

/// Mode keys to press on the stock layout to get from one panel to another.
fn route(from: PanelKind, to: PanelKind) -> &'static [&'static str] {
    use PanelKind::*;
    match (from, to) {
        (LowerCase, UpperCase) | (UpperCase, LowerCase) => &["⇧"],
        (LowerCase | UpperCase, Number) | (Symbol, Number) => &["123"],
        (LowerCase | UpperCase, Symbol) => &["123", "#+="],
        (Number, Symbol) => &["#+="],
        (Number | Symbol, LowerCase) => &["ABC"],
        (Number | Symbol, UpperCase) => &["ABC", "⇧"],
        _ => &[],
    }
}

fn find_button(scene: &Scene, panel: NodeId, label: &str) -> Result<Option<NodeId>> {
    Ok(scene.descendants(panel)?.into_iter().find(|id| {
        scene.is_active_in_hierarchy(*id)
            && scene
                .get::<Button>(*id)
                .is_some_and(|button| button.text == label)
    }))
}

/// Types text on one keyboard.
#[derive(Debug, Clone, Copy)]
pub struct Typist {
    keyboard: NodeId,
}

impl Typist {
    pub fn new(keyboard: NodeId) -> Self {
        Self { keyboard }
    }

    fn state<'a>(&self, scene: &'a Scene) -> Result<&'a Keyboard> {
        scene
            .get::<Keyboard>(self.keyboard)
            .with_context(|| format!("node {} is not a keyboard", self.keyboard))
    }

    /// First panel holding `label`, checking the shown one first.
    fn panel_with(&self, scene: &Scene, label: &str) -> Result<Option<PanelKind>> {
        let state = self.state(scene)?;
        let shown = state.active();
        let order = shown.into_iter().chain(PanelKind::ALL);
        for kind in order {
            let Some(panel) = state.panel(kind) else {
                continue;
            };
            let holds = scene.descendants(panel)?.into_iter().any(|id| {
                scene
                    .get::<Button>(id)
                    .is_some_and(|button| button.text == label)
            });
            if holds {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }

    pub fn type_text(&self, driver: &mut FrameDriver, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.type_char(driver, ch)?;
        }
        Ok(())
    }

    pub fn type_char(&self, driver: &mut FrameDriver, ch: char) -> Result<()> {
        let label = key_label(ch);
        let target = self
            .panel_with(driver.ui().scene(), &label)?
            .with_context(|| format!("no key types {ch:?}"))?;
        let shown = self
            .state(driver.ui().scene())?
            .active()
            .context("keyboard has no panel shown")?;
        for mode in route(shown, target) {
            self.tap(driver, mode)?;
        }
        self.tap(driver, &label)
    }

    /// Hover, press and release the key labelled `label` on the shown panel.
    pub fn tap(&self, driver: &mut FrameDriver, label: &str) -> Result<()> {
        let scene = driver.ui().scene();
        let state = self.state(scene)?;
        let kind = state.active().context("keyboard has no panel shown")?;
        let panel = state.panel(kind).context("shown panel was never built")?;
        let button = find_button(scene, panel, label)?
            .with_context(|| format!("no {label:?} key on {kind:?}"))?;
        let target = scene.world_position(button)?;

        driver.aim(target)?;
        driver.step(&[]);
        driver.step(&[ControllerButton::Trigger]);
        driver.step(&[]);
        tracing::debug!(label, panel = ?kind, "tapped key");
        Ok(())
    }
}
