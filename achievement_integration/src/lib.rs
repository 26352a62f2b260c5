//! Bridges gameplay to achievements: session tracking, the statistics feed and
//! the [`Tracked`] decorator for gameplay collaborators.

mod integrator;
mod session;
mod tracked;

pub use integrator::*;
pub use session::*;
pub use tracked::{Tracked, TrackedPlugin, forward_tracked};

use {
    achievements::AchievementCategory,
    bevy::prelude::*,
    gameplay_events::GameplayEvent,
    system_schedule::GameSchedule,
    wallet::{ItemPurchased, StageUnlocked},
};

pub struct AchievementIntegrationPlugin;

impl Plugin for AchievementIntegrationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionTracking>()
            .add_systems(Update, track_gameplay.in_set(GameSchedule::Effect))
            .add_observer(track_item_purchase)
            .add_observer(track_stage_unlock);
    }
}

pub fn track_gameplay(
    mut events: MessageReader<GameplayEvent>,
    mut integrator: AchievementIntegrator,
) {
    let mut touched = CategorySet::new();
    for event in events.read() {
        trace!(?event, "gameplay event");
        touched.extend(integrator.record(event));
    }
    let submitted = integrator.sync(touched);
    if submitted > 0 {
        trace!(submitted, "achievement progress submitted");
    }
}

fn track_item_purchase(trigger: On<ItemPurchased>, mut integrator: AchievementIntegrator) {
    trace!(item = %trigger.event().item_id, "tracking item purchase");
    integrator.stats_mut().record_item_purchase();
    integrator.sync([AchievementCategory::Collection].into());
}

fn track_stage_unlock(trigger: On<StageUnlocked>, mut integrator: AchievementIntegrator) {
    trace!(stage = %trigger.event().stage_id, "tracking stage unlock");
    integrator.stats_mut().record_stage_unlock();
    integrator.sync([AchievementCategory::Special].into());
}
