//! End-to-end keyboard tests: build through the factory, drive with a
//! controller through `UIManager` frames.

use glam::Vec3;
use std::sync::Arc;
use vrkit_core::{NodeId, RuntimeLog, Scene};
use vrkit_input::ControllerButton;
use vrkit_testkit::{EventKind, RecordingHandler};
use vrkit_ui3d::{
    BoxCollider, Button, ControllerHandle, Keyboard, KeyboardFactory, PanelKind, ProfileSet,
    UIManager,
};

fn keyboard_ui() -> (UIManager, ControllerHandle, NodeId) {
    let mut ui = UIManager::new(Box::new(RuntimeLog::new()));
    let root = ui.scene_mut().spawn("root");
    let profiles = ProfileSet::default();
    let (scene, log) = ui.parts_mut();
    let keyboard = KeyboardFactory::default()
        .build_keyboard(scene, log, root, &profiles.borrowed())
        .unwrap();
    let hand = ui.add_controller("hand", 0, 0.05).unwrap();
    ui.frame();
    (ui, hand, keyboard.node)
}

fn key(scene: &Scene, keyboard: NodeId, kind: PanelKind, label: &str) -> NodeId {
    let panel = scene.get::<Keyboard>(keyboard).unwrap().panel(kind).unwrap();
    scene
        .descendants(panel)
        .unwrap()
        .into_iter()
        .find(|id| scene.get::<Button>(*id).is_some_and(|b| b.text == label))
        .unwrap()
}

/// Place the controller so its pointer is at `target`.
fn point_at(ui: &mut UIManager, hand: ControllerHandle, target: Vec3) {
    let node = ui.controller_node(hand).unwrap();
    let lead = ui.controller(hand).unwrap().pointer_position(ui.scene())
        - ui.scene().world_position(node).unwrap();
    ui.scene_mut().set_local_position(node, target - lead).unwrap();
}

fn tap(ui: &mut UIManager, hand: ControllerHandle, target: NodeId) {
    let at = ui.scene().world_position(target).unwrap();
    point_at(ui, hand, at);
    ui.set_controller_input(hand, []);
    ui.frame();
    ui.set_controller_input(hand, [ControllerButton::Trigger]);
    ui.frame();
    ui.set_controller_input(hand, []);
    ui.frame();
}

fn recording_node(scene: &mut Scene, recorder: &RecordingHandler, at: Vec3) -> NodeId {
    let node = scene.spawn("target");
    scene.set_local_position(node, at).unwrap();
    scene.attach(node, BoxCollider::new(Vec3::splat(0.2))).unwrap();
    scene.add_touchable(node, Arc::new(recorder.clone())).unwrap();
    scene.add_triggerable(node, Arc::new(recorder.clone())).unwrap();
    node
}

#[test]
fn tapping_keys_types_and_switches_panels() {
    let (mut ui, hand, keyboard) = keyboard_ui();

    let q = key(ui.scene(), keyboard, PanelKind::LowerCase, "q");
    tap(&mut ui, hand, q);
    let shift = key(ui.scene(), keyboard, PanelKind::LowerCase, "⇧");
    tap(&mut ui, hand, shift);
    let upper_w = key(ui.scene(), keyboard, PanelKind::UpperCase, "W");
    tap(&mut ui, hand, upper_w);

    let state = ui.scene().get::<Keyboard>(keyboard).unwrap();
    assert_eq!(state.value, "qW");
    assert_eq!(state.active(), Some(PanelKind::UpperCase));
    let lower = state.panel(PanelKind::LowerCase).unwrap();
    assert!(!ui.scene().node(lower).unwrap().active);
}

#[test]
fn held_trigger_types_one_character() {
    let (mut ui, hand, keyboard) = keyboard_ui();
    let q = key(ui.scene(), keyboard, PanelKind::LowerCase, "q");
    let at = ui.scene().world_position(q).unwrap();
    point_at(&mut ui, hand, at);
    ui.frame();

    ui.set_controller_input(hand, [ControllerButton::Trigger]);
    for _ in 0..3 {
        ui.frame();
    }
    assert_eq!(ui.scene().get::<Keyboard>(keyboard).unwrap().value, "q");

    ui.set_controller_input(hand, []);
    ui.frame();
    ui.frame();
    assert_eq!(ui.scene().get::<Keyboard>(keyboard).unwrap().value, "q");
    assert_eq!(ui.controller(hand).unwrap().triggered(), &[] as &[NodeId]);
}

#[test]
fn key_touch_reaches_every_touchable() {
    let (mut ui, hand, keyboard) = keyboard_ui();
    let recorder = RecordingHandler::new();
    let e = key(ui.scene(), keyboard, PanelKind::LowerCase, "e");
    ui.scene_mut()
        .add_touchable(e, Arc::new(recorder.clone()))
        .unwrap();

    tap(&mut ui, hand, e);
    point_at(&mut ui, hand, Vec3::new(10.0, 10.0, 10.0));
    ui.set_controller_input(hand, []);
    ui.frame();

    assert_eq!(
        recorder.kinds_for(e),
        vec![EventKind::TouchStart, EventKind::TouchStop]
    );
    assert_eq!(ui.scene().get::<Keyboard>(keyboard).unwrap().value, "e");
}

#[test]
fn trigger_release_goes_to_nodes_pressed_at_down() {
    let mut ui = UIManager::new(Box::new(RuntimeLog::new()));
    let recorder = RecordingHandler::new();
    let a = recording_node(ui.scene_mut(), &recorder, Vec3::ZERO);
    let b = recording_node(ui.scene_mut(), &recorder, Vec3::new(1.0, 0.0, 0.0));
    let hand = ui.add_controller("hand", 0, 0.0).unwrap();

    point_at(&mut ui, hand, Vec3::ZERO);
    ui.set_controller_input(hand, []);
    ui.frame();
    ui.set_controller_input(hand, [ControllerButton::Trigger]);
    ui.frame();
    point_at(&mut ui, hand, Vec3::new(1.0, 0.0, 0.0));
    ui.set_controller_input(hand, [ControllerButton::Trigger]);
    ui.frame();
    ui.set_controller_input(hand, []);
    ui.frame();

    assert_eq!(
        recorder.kinds_for(a),
        vec![
            EventKind::TouchStart,
            EventKind::TriggerDown,
            EventKind::TouchStop,
            EventKind::TriggerUp,
        ]
    );
    assert_eq!(recorder.kinds_for(b), vec![EventKind::TouchStart]);
}

#[test]
fn failed_trigger_down_is_still_released() {
    let mut ui = UIManager::new(Box::new(RuntimeLog::new()));
    let failing = RecordingHandler::new();
    failing.fail_on(EventKind::TriggerDown);
    let healthy = RecordingHandler::new();
    let a = recording_node(ui.scene_mut(), &failing, Vec3::ZERO);
    let b = recording_node(ui.scene_mut(), &healthy, Vec3::ZERO);
    let hand = ui.add_controller("hand", 0, 0.0).unwrap();

    ui.frame();
    ui.set_controller_input(hand, [ControllerButton::Trigger]);
    ui.frame();
    ui.set_controller_input(hand, []);
    ui.frame();

    assert_eq!(
        failing.kinds_for(a),
        vec![EventKind::TouchStart, EventKind::TriggerDown, EventKind::TriggerUp]
    );
    assert_eq!(
        healthy.kinds_for(b),
        vec![EventKind::TouchStart, EventKind::TriggerDown, EventKind::TriggerUp]
    );
    assert_eq!(ui.controller(hand).unwrap().triggered(), &[] as &[NodeId]);
}

#[test]
fn grabbing_a_panel_drags_the_keyboard() {
    let (mut ui, hand, keyboard) = keyboard_ui();
    let panel = ui
        .scene()
        .get::<Keyboard>(keyboard)
        .unwrap()
        .panel(PanelKind::LowerCase)
        .unwrap();
    let grab_at = ui.scene().world_position(panel).unwrap();
    let start = ui.scene().world_position(keyboard).unwrap();

    point_at(&mut ui, hand, grab_at);
    ui.set_controller_input(hand, [ControllerButton::Grip]);
    ui.frame();
    assert_eq!(ui.controller(hand).unwrap().grabbed(), &[panel]);

    point_at(&mut ui, hand, grab_at + Vec3::new(0.1, 0.2, 0.0));
    ui.set_controller_input(hand, [ControllerButton::Grip]);
    ui.frame();
    let moved = ui.scene().world_position(keyboard).unwrap() - start;
    assert!((moved - Vec3::new(0.1, 0.2, 0.0)).abs().max_element() < 1e-4);

    ui.set_controller_input(hand, []);
    ui.frame();
    point_at(&mut ui, hand, grab_at);
    ui.set_controller_input(hand, []);
    ui.frame();
    let after = ui.scene().world_position(keyboard).unwrap() - start;
    assert!((after - moved).abs().max_element() < 1e-4);
}

#[test]
fn rebuild_after_frames_keeps_one_keyboard() {
    let (mut ui, _, keyboard) = keyboard_ui();
    let root = ui.scene().parent(keyboard).unwrap().unwrap();
    let before = ui.scene().len();
    let profiles = ProfileSet::default();
    let (scene, log) = ui.parts_mut();
    let again = KeyboardFactory::default()
        .build_keyboard(scene, log, root, &profiles.borrowed())
        .unwrap();
    ui.frame();

    assert_eq!(again.node, keyboard);
    assert_eq!(ui.scene().len(), before);
}
