//! Achievement progress tracking: the static catalog, the progress store with
//! throttled unlock checks, reward totals and RON persistence.

mod achievement;
mod catalog;
mod debounce;
mod manager;
mod persistence;

pub use achievement::*;
pub use catalog::*;
pub use debounce::Debouncer;
pub use manager::*;
pub use persistence::*;

use {bevy::prelude::*, system_schedule::GameSchedule};

#[derive(Default)]
pub struct AchievementsPlugin;

impl Plugin for AchievementsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AchievementManager>()
            .add_systems(Update, tick_achievements.in_set(GameSchedule::FrameEnd));
    }
}

/// Runs due recomputes and announces new unlocks.
pub fn tick_achievements(
    mut commands: Commands,
    time: Res<Time>,
    mut manager: ResMut<AchievementManager>,
) {
    manager.tick(time.delta());
    for unlocked in manager.take_unlocked() {
        commands.trigger(unlocked);
    }
}
