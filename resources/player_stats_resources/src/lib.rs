use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, time::Duration},
};

pub struct PlayerStatsResourcesPlugin;

impl Plugin for PlayerStatsResourcesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerStatistics>()
            .register_type::<PlayerStatistics>();
    }
}

/// Statistic keys understood by [`StatisticsProvider::get`].
pub mod keys {
    pub const BUBBLES_POPPED: &str = "bubbles_popped";
    pub const TOTAL_SCORE: &str = "total_score";
    pub const BEST_SCORE: &str = "best_score";
    pub const MAX_COMBO: &str = "max_combo";
    pub const GAMES_PLAYED: &str = "games_played";
    pub const GAMES_WON: &str = "games_won";
    pub const PLAY_TIME_SECONDS: &str = "play_time_seconds";
    pub const ITEMS_PURCHASED: &str = "items_purchased";
    pub const STAGES_UNLOCKED: &str = "stages_unlocked";
    pub const FLAWLESS_WINS: &str = "flawless_wins";
    pub const SPEED_WINS: &str = "speed_wins";
    pub const LOW_HP_WINS: &str = "low_hp_wins";
    /// Hit percentage over all recorded clicks, `0..=100`. Reads zero until
    /// [`super::ACCURACY_MIN_CLICKS`] clicks have been recorded.
    pub const ACCURACY: &str = "accuracy";
    pub const TOTAL_CLICKS: &str = "total_clicks";
    /// Prefix for per-type pop counts, e.g. `popped:diamond`.
    pub const POPPED_PREFIX: &str = "popped:";
}

pub const ACCURACY_MIN_CLICKS: u64 = 50;

/// Read side of the player statistics, as seen by achievement tracking.
pub trait StatisticsProvider {
    /// Current value of `key`; unknown keys read as zero.
    fn get(&self, key: &str) -> f64;

    fn detailed_statistics(&self) -> DetailedStatistics;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedStatistics {
    pub bubbles_popped: u64,
    pub popped_by_type: BTreeMap<String, u64>,
    pub total_score: u64,
    pub best_score: u64,
    pub max_combo: u32,
    pub games_played: u64,
    pub games_won: u64,
    pub play_time_seconds: u64,
    pub items_purchased: u64,
    pub stages_unlocked: u64,
    pub accuracy: f64,
}

/// Lifetime counters for the player. Persisted alongside achievements.
#[derive(Resource, Reflect, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Resource, Default)]
#[serde(default)]
pub struct PlayerStatistics {
    pub bubbles_popped: u64,
    pub popped_by_type: BTreeMap<String, u64>,
    pub total_score: u64,
    pub best_score: u64,
    pub max_combo: u32,
    pub games_played: u64,
    pub games_won: u64,
    pub play_time_ms: u64,
    pub items_purchased: u64,
    pub stages_unlocked: u64,
    pub flawless_wins: u64,
    pub speed_wins: u64,
    pub low_hp_wins: u64,
    pub total_clicks: u64,
    pub hits: u64,
}

/// Per-run flags derived by session tracking when a game ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunHighlights {
    pub flawless: bool,
    pub speed_run: bool,
    pub low_hp: bool,
}

impl PlayerStatistics {
    pub fn record_pop(&mut self, bubble_type: &str, combo: u32) {
        self.bubbles_popped += 1;
        self.hits += 1;
        self.total_clicks += 1;
        *self
            .popped_by_type
            .entry(bubble_type.to_string())
            .or_default() += 1;
        self.max_combo = self.max_combo.max(combo);
    }

    pub fn record_miss(&mut self) {
        self.total_clicks += 1;
    }

    pub fn record_score(&mut self, points: u64) {
        self.total_score = self.total_score.saturating_add(points);
    }

    pub fn record_game(
        &mut self,
        victory: bool,
        final_score: u64,
        duration: Duration,
        highlights: RunHighlights,
    ) {
        self.games_played += 1;
        self.best_score = self.best_score.max(final_score);
        self.play_time_ms = self
            .play_time_ms
            .saturating_add(duration.as_millis().min(u64::MAX as u128) as u64);
        if !victory {
            return;
        }
        self.games_won += 1;
        self.flawless_wins += highlights.flawless as u64;
        self.speed_wins += highlights.speed_run as u64;
        self.low_hp_wins += highlights.low_hp as u64;
    }

    pub fn record_item_purchase(&mut self) {
        self.items_purchased += 1;
    }

    pub fn record_stage_unlock(&mut self) {
        self.stages_unlocked += 1;
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_clicks == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_clicks as f64 * 100.0
    }
}

impl StatisticsProvider for PlayerStatistics {
    fn get(&self, key: &str) -> f64 {
        if let Some(bubble_type) = key.strip_prefix(keys::POPPED_PREFIX) {
            return self.popped_by_type.get(bubble_type).copied().unwrap_or(0) as f64;
        }
        match key {
            keys::BUBBLES_POPPED => self.bubbles_popped as f64,
            keys::TOTAL_SCORE => self.total_score as f64,
            keys::BEST_SCORE => self.best_score as f64,
            keys::MAX_COMBO => self.max_combo as f64,
            keys::GAMES_PLAYED => self.games_played as f64,
            keys::GAMES_WON => self.games_won as f64,
            keys::PLAY_TIME_SECONDS => (self.play_time_ms / 1_000) as f64,
            keys::ITEMS_PURCHASED => self.items_purchased as f64,
            keys::STAGES_UNLOCKED => self.stages_unlocked as f64,
            keys::FLAWLESS_WINS => self.flawless_wins as f64,
            keys::SPEED_WINS => self.speed_wins as f64,
            keys::LOW_HP_WINS => self.low_hp_wins as f64,
            keys::ACCURACY if self.total_clicks < ACCURACY_MIN_CLICKS => 0.0,
            keys::ACCURACY => self.accuracy(),
            keys::TOTAL_CLICKS => self.total_clicks as f64,
            _ => {
                trace!(%key, "unknown statistic key");
                0.0
            }
        }
    }

    fn detailed_statistics(&self) -> DetailedStatistics {
        DetailedStatistics {
            bubbles_popped: self.bubbles_popped,
            popped_by_type: self.popped_by_type.clone(),
            total_score: self.total_score,
            best_score: self.best_score,
            max_combo: self.max_combo,
            games_played: self.games_played,
            games_won: self.games_won,
            play_time_seconds: self.play_time_ms / 1_000,
            items_purchased: self.items_purchased,
            stages_unlocked: self.stages_unlocked,
            accuracy: self.accuracy(),
        }
    }
}
