use {
    bevy::prelude::*,
    gameplay_events::GameOutcome,
    player_stats_resources::RunHighlights,
    std::time::Duration,
};

/// Wins faster than this count as speed runs.
pub const SPEED_RUN_LIMIT: Duration = Duration::from_secs(60);
/// Ending a won game at or below this share of max HP counts as a low-HP survival.
pub const LOW_HP_RATIO: f64 = 0.2;

/// Counters for the current run. Reset on every `GameStarted`, never persisted.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SessionTracking {
    pub active: bool,
    pub started_at: Duration,
    pub bubbles_popped: u64,
    pub score: u64,
    pub current_combo: u32,
    pub best_combo: u32,
    pub damage_received: u64,
    pub clicks: u64,
    pub hits: u64,
}

impl SessionTracking {
    pub fn start(&mut self, now: Duration) {
        *self = Self {
            active: true,
            started_at: now,
            ..Default::default()
        };
    }

    pub fn record_pop(&mut self, combo: u32) {
        self.bubbles_popped += 1;
        self.clicks += 1;
        self.hits += 1;
        self.current_combo = combo;
        self.best_combo = self.best_combo.max(combo);
    }

    pub fn record_miss(&mut self) {
        self.clicks += 1;
        self.current_combo = 0;
    }

    pub fn record_damage(&mut self, amount: u32) {
        self.damage_received += amount as u64;
    }

    pub fn accuracy(&self) -> f64 {
        if self.clicks == 0 {
            return 0.0;
        }
        self.hits as f64 / self.clicks as f64 * 100.0
    }

    /// Run length: the reported duration, or the time since `start` when none was reported.
    pub fn duration(&self, outcome: &GameOutcome, now: Duration) -> Duration {
        if outcome.duration.is_zero() {
            now.saturating_sub(self.started_at)
        } else {
            outcome.duration
        }
    }

    pub fn finish(&mut self, outcome: &GameOutcome, now: Duration) -> RunHighlights {
        self.active = false;
        if !outcome.victory {
            return RunHighlights::default();
        }
        let low_hp = outcome.max_hp > 0
            && outcome.hp > 0
            && outcome.hp as f64 <= outcome.max_hp as f64 * LOW_HP_RATIO;
        RunHighlights {
            flawless: self.damage_received == 0,
            speed_run: self.duration(outcome, now) < SPEED_RUN_LIMIT,
            low_hp,
        }
    }
}
