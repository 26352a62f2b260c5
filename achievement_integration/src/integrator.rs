use {
    crate::session::SessionTracking,
    achievements::{AchievementCategory, AchievementManager, MAX_BATCH_SIZE, ProgressUpdate},
    bevy::{ecs::system::SystemParam, prelude::*},
    gameplay_events::GameplayEvent,
    player_stats_resources::{PlayerStatistics, StatisticsProvider},
    std::{collections::BTreeSet, time::Duration},
};

pub type CategorySet = BTreeSet<AchievementCategory>;

/// Folds one gameplay event into the session and lifetime statistics and
/// returns the achievement categories whose statistics moved.
pub fn apply_event(
    event: &GameplayEvent,
    session: &mut SessionTracking,
    stats: &mut PlayerStatistics,
    now: Duration,
) -> CategorySet {
    use AchievementCategory::*;

    match event {
        GameplayEvent::GameStarted => {
            session.start(now);
            CategorySet::new()
        }
        GameplayEvent::BubblePopped { bubble, .. } => {
            session.record_pop(bubble.combo);
            stats.record_pop(&bubble.bubble_type, bubble.combo);
            [Play, Collection, Technique].into()
        }
        GameplayEvent::ClickMissed => {
            session.record_miss();
            stats.record_miss();
            [Technique].into()
        }
        GameplayEvent::ScoreAdded { points, total } => {
            session.score = *total;
            stats.record_score(*points);
            [Score].into()
        }
        GameplayEvent::DamageTaken { amount, .. } => {
            session.record_damage(*amount);
            CategorySet::new()
        }
        GameplayEvent::GameOver(outcome) => {
            let duration = session.duration(outcome, now);
            let highlights = session.finish(outcome, now);
            stats.record_game(outcome.victory, outcome.final_score, duration, highlights);
            debug!(
                victory = outcome.victory,
                ?highlights,
                accuracy = session.accuracy(),
                "run finished"
            );
            AchievementCategory::ALL.into()
        }
    }
}

/// Pushes the current statistic value of every locked achievement in
/// `categories` into the manager, in batches of at most [`MAX_BATCH_SIZE`].
/// Returns the number of updates submitted.
pub fn sync_progress(
    manager: &mut AchievementManager,
    stats: &impl StatisticsProvider,
    categories: impl IntoIterator<Item = AchievementCategory>,
) -> usize {
    let mut updates = Vec::new();
    for category in categories {
        for id in manager.relevant_achievements(category) {
            let Some(achievement) = manager.get(id) else {
                continue;
            };
            let value = stats.get(achievement.stat());
            if value != achievement.progress.current {
                updates.push(ProgressUpdate::new(id, value));
            }
        }
    }
    for chunk in updates.chunks(MAX_BATCH_SIZE) {
        manager.batch_update_progress(chunk);
    }
    updates.len()
}

/// Everything needed to turn gameplay facts into achievement progress.
#[derive(SystemParam)]
pub struct AchievementIntegrator<'w> {
    time: Res<'w, Time>,
    session: ResMut<'w, SessionTracking>,
    stats: ResMut<'w, PlayerStatistics>,
    manager: ResMut<'w, AchievementManager>,
}

impl AchievementIntegrator<'_> {
    pub fn record(&mut self, event: &GameplayEvent) -> CategorySet {
        let now = self.time.elapsed();
        apply_event(event, &mut self.session, &mut self.stats, now)
    }

    pub fn sync(&mut self, categories: CategorySet) -> usize {
        if categories.is_empty() {
            return 0;
        }
        let Self { stats, manager, .. } = self;
        sync_progress(manager, &**stats, categories)
    }

    pub fn stats_mut(&mut self) -> &mut PlayerStatistics {
        &mut self.stats
    }
}
