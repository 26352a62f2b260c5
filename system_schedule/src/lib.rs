use bevy::prelude::*;

/// Ordering of gameplay work inside a single `Update` pass.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    /// Clocks advance: cache sweeps, throttle windows, autosave timers.
    FrameStart,
    /// Gameplay messages are turned into statistics and achievement progress.
    Effect,
    /// Deferred work: throttled recomputes, persistence.
    FrameEnd,
}

pub struct SystemSchedulePlugin;

impl Plugin for SystemSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSchedule::FrameStart,
                GameSchedule::Effect,
                GameSchedule::FrameEnd,
            )
                .chain(),
        );
    }
}
