#![warn(missing_docs)]
//! Frame schedule wrapping `bevy_ecs` so UI stages run in a fixed order.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ScheduleLabel;
use vrkit_ui3d::UIManager;

/// Label of the per-frame UI schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ScheduleLabel)]
pub struct FrameSchedule;

/// Ordered stages of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum FrameStage {
    /// Dirty rows, columns and containers settle.
    Layout,
    /// Pointer overlaps and button edges are dispatched.
    Interaction,
    /// Deferred destruction is flushed.
    Cleanup,
}

/// The UI, stored as a world resource.
#[derive(Resource, Debug)]
pub struct UiState(pub UIManager);

fn layout_system(mut ui: ResMut<UiState>) {
    match ui.0.layout_stage() {
        Ok(settled) if settled > 0 => tracing::debug!(settled, "layout stage"),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "layout stage failed"),
    }
}

fn interaction_system(mut ui: ResMut<UiState>) {
    ui.0.interaction_stage();
}

fn cleanup_system(mut ui: ResMut<UiState>) {
    let destroyed = ui.0.cleanup_stage();
    if destroyed > 0 {
        tracing::debug!(destroyed, "cleanup stage");
    }
}

/// Build the frame schedule with the three UI stages chained.
pub fn build_frame_schedule() -> Schedules {
    let mut schedules = Schedules::default();
    let mut schedule = Schedule::new(FrameSchedule);
    schedule.configure_sets(
        (
            FrameStage::Layout,
            FrameStage::Interaction,
            FrameStage::Cleanup,
        )
            .chain(),
    );
    schedule.add_systems((
        layout_system.in_set(FrameStage::Layout),
        interaction_system.in_set(FrameStage::Interaction),
        cleanup_system.in_set(FrameStage::Cleanup),
    ));
    schedule.set_apply_final_deferred(true);
    schedules.insert(schedule);
    schedules
}

/// Run the frame schedule once.
pub fn run_frame(world: &mut World, schedules: &mut Schedules, frame: u64) {
    tracing::debug!(frame, "running frame schedule");
    if let Some(schedule) = schedules.get_mut(FrameSchedule) {
        schedule.run(world);
    }
}
