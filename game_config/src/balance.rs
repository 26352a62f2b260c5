use {
    crate::{
        config::*,
        validation::{ConfigReport, validate},
    },
    bevy::prelude::*,
    growth::{ExponentialGrowth, GrowthStrategy, LinearGrowth},
    thiserror::Error,
};

/// Age-ratio tier a pop falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeTier {
    Early,
    Mid,
    Late,
    Plain,
}

impl AgeTier {
    /// Ratios outside `[0, 1]` (and NaN) never earn a bonus.
    pub fn from_ratio(age_ratio: f64) -> Self {
        if !(0.0..=1.0).contains(&age_ratio) {
            return AgeTier::Plain;
        }
        if age_ratio < 0.1 {
            AgeTier::Early
        } else if age_ratio > 0.9 {
            AgeTier::Late
        } else if (0.5..=0.7).contains(&age_ratio) {
            AgeTier::Mid
        } else {
            AgeTier::Plain
        }
    }
}

impl BalanceConfig {
    /// Base score of a bubble type; unknown types score as `normal`.
    pub fn base_score(&self, bubble_type: &str) -> u32 {
        let scores = &self.scoring.base_scores;
        scores
            .get(bubble_type)
            .or_else(|| scores.get(FALLBACK_BUBBLE_TYPE))
            .copied()
            .unwrap_or_default()
    }

    pub fn age_multiplier(&self, age_ratio: f64) -> f64 {
        let bonus = &self.scoring.age_bonus;
        match AgeTier::from_ratio(age_ratio) {
            AgeTier::Early => bonus.early_bonus,
            AgeTier::Mid => bonus.mid_bonus,
            AgeTier::Late => bonus.late_bonus,
            AgeTier::Plain => 1.0,
        }
    }

    /// Score for popping `bubble_type` at `age_ratio` of its lifetime, rounded down.
    pub fn calculate_score(&self, bubble_type: &str, age_ratio: f64) -> u64 {
        let score = self.base_score(bubble_type) as f64 * self.age_multiplier(age_ratio);
        score.floor() as u64
    }

    pub fn calculate_combo_multiplier(&self, combo_count: u32) -> f64 {
        if combo_count <= 1 {
            return 1.0;
        }
        let combo = &self.scoring.combo;
        LinearGrowth::new(1.0, combo.multiplier_increment)
            .with_cap(combo.max_multiplier)
            .calculate(combo_count - 1)
    }

    /// Price of the next level of `item_id` when the player owns `current_level`.
    pub fn calculate_item_cost(&self, item_id: &str, current_level: u32) -> Option<u64> {
        let base_cost = *self.items.base_costs.get(item_id)?;
        Some(
            ExponentialGrowth::new(base_cost as f64, self.items.cost_multiplier)
                .calculate_floor(current_level),
        )
    }

    pub fn is_stage_unlocked(&self, stage_id: &str, player_tap: u64) -> bool {
        self.stages
            .unlock_requirements
            .get(stage_id)
            .is_some_and(|&required| player_tap >= required)
    }

    pub fn max_level(&self, item_id: &str) -> Option<u32> {
        self.items.max_levels.get(item_id).copied()
    }

    pub fn max_age_ms(&self, bubble_type: &str) -> Option<u64> {
        self.bubbles.max_age.get(bubble_type).copied()
    }

    pub fn health(&self, bubble_type: &str) -> Option<u32> {
        self.bubbles.health.get(bubble_type).copied()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse balance config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Process-wide balance configuration.
///
/// Read access goes through `Deref` to [`BalanceConfig`]; the setters below are
/// the only way to change it.
#[derive(Resource, Debug, Clone, Default, Deref)]
pub struct GameConfig {
    #[deref]
    config: BalanceConfig,
    revision: u64,
}

impl GameConfig {
    pub fn new(config: BalanceConfig) -> Self {
        Self {
            config,
            revision: 0,
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: BalanceConfig = ron::from_str(source)?;
        Ok(Self::new(config))
    }

    /// Bumped by every setter; lets derived caches know they are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn score_config(&self) -> &ScoringConfig {
        &self.config.scoring
    }

    pub fn stage_config(&self) -> &StagesConfig {
        &self.config.stages
    }

    pub fn item_config(&self) -> &ItemsConfig {
        &self.config.items
    }

    pub fn bubble_config(&self) -> &BubblesConfig {
        &self.config.bubbles
    }

    pub fn validate(&self) -> ConfigReport {
        validate(&self.config)
    }

    /// Swaps in a whole new config, e.g. after the balance file was edited.
    pub fn replace(&mut self, config: BalanceConfig) {
        let report = validate(&config);
        if !report.is_valid() {
            warn!(
                issues = report.issues.len(),
                "replacement balance config has issues"
            );
        }
        self.config = config;
        self.touch("all");
    }

    pub fn set_base_score(&mut self, bubble_type: &str, score: u32) {
        self.config
            .scoring
            .base_scores
            .insert(bubble_type.to_string(), score);
        self.touch("scoring.base_scores");
    }

    pub fn set_combo(&mut self, multiplier_increment: f64, max_multiplier: f64) {
        let combo = &mut self.config.scoring.combo;
        combo.multiplier_increment = sanitize(multiplier_increment, 0.0);
        combo.max_multiplier = sanitize(max_multiplier, 1.0).max(1.0);
        self.touch("scoring.combo");
    }

    pub fn set_age_bonus(&mut self, age_bonus: AgeBonusConfig) {
        self.config.scoring.age_bonus = AgeBonusConfig {
            early_bonus: sanitize(age_bonus.early_bonus, 1.0),
            mid_bonus: sanitize(age_bonus.mid_bonus, 1.0),
            late_bonus: sanitize(age_bonus.late_bonus, 1.0),
        };
        self.touch("scoring.age_bonus");
    }

    pub fn set_item_base_cost(&mut self, item_id: &str, cost: u32) {
        self.config
            .items
            .base_costs
            .insert(item_id.to_string(), cost);
        self.touch("items.base_costs");
    }

    pub fn set_stage_requirement(&mut self, stage_id: &str, required_tap: u64) {
        self.config
            .stages
            .unlock_requirements
            .insert(stage_id.to_string(), required_tap);
        self.touch("stages.unlock_requirements");
    }

    fn touch(&mut self, section: &str) {
        self.revision += 1;
        debug!(%section, revision = self.revision, "balance config updated");
    }
}

/// Non-finite or negative values fall back to `fallback`.
fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(%value, %fallback, "rejected balance value");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn age_bonus_boundaries() {
        let config = config();
        let base = config.base_score("normal") as u64;
        assert_eq!(base, 15);

        assert_eq!(config.calculate_score("normal", 0.05), 30);
        assert_eq!(config.calculate_score("normal", 0.95), 45);
        assert_eq!(config.calculate_score("normal", 0.6), 22);
        assert_eq!(config.calculate_score("normal", 0.4), 15);
    }

    #[test]
    fn tier_edges() {
        assert_eq!(AgeTier::from_ratio(0.0), AgeTier::Early);
        assert_eq!(AgeTier::from_ratio(0.1), AgeTier::Plain);
        assert_eq!(AgeTier::from_ratio(0.5), AgeTier::Mid);
        assert_eq!(AgeTier::from_ratio(0.7), AgeTier::Mid);
        assert_eq!(AgeTier::from_ratio(0.9), AgeTier::Plain);
        assert_eq!(AgeTier::from_ratio(1.0), AgeTier::Late);
    }

    #[test]
    fn out_of_range_ratio_gets_no_bonus() {
        let config = config();
        assert_eq!(config.calculate_score("normal", -0.5), 15);
        assert_eq!(config.calculate_score("normal", 1.5), 15);
        assert_eq!(config.calculate_score("normal", f64::NAN), 15);
    }

    #[test]
    fn unknown_bubble_scores_as_normal() {
        let config = config();
        assert_eq!(
            config.calculate_score("mystery", 0.4),
            config.calculate_score("normal", 0.4)
        );
    }

    #[test]
    fn combo_multiplier() {
        let config = config();
        assert_eq!(config.calculate_combo_multiplier(0), 1.0);
        assert_eq!(config.calculate_combo_multiplier(1), 1.0);
        assert!((config.calculate_combo_multiplier(2) - 1.08).abs() < 1e-9);
        assert_eq!(config.calculate_combo_multiplier(100), 2.5);
    }

    #[test]
    fn item_cost_curve() {
        let config = config();
        let base = config.item_config().base_costs["health_up"] as f64;
        assert_eq!(config.calculate_item_cost("health_up", 0), Some(base as u64));
        assert_eq!(
            config.calculate_item_cost("health_up", 1),
            Some((base * 1.3).floor() as u64)
        );
        assert_eq!(config.calculate_item_cost("unknown", 0), None);
    }

    #[test]
    fn item_cost_never_decreases_with_level() {
        let config = config();
        let mut previous = 0;
        for level in [0, 5, 50, 500, 3_000, u32::MAX] {
            let cost = config.calculate_item_cost("magnet", level).unwrap();
            assert!(cost >= previous, "cost dropped from {previous} to {cost} at level {level}");
            previous = cost;
        }
        assert_eq!(config.calculate_item_cost("magnet", u32::MAX), Some(u64::MAX));
    }

    #[test]
    fn stage_unlock() {
        let config = config();
        assert!(config.is_stage_unlocked("normal", 0));
        assert!(!config.is_stage_unlocked("hard", 499));
        assert!(config.is_stage_unlocked("hard", 500));
        assert!(!config.is_stage_unlocked("moon", u64::MAX));
    }

    #[test]
    fn setters_bump_revision_and_sanitize() {
        let mut config = config();
        config.set_base_score("normal", 20);
        assert_eq!(config.calculate_score("normal", 0.4), 20);

        config.set_combo(f64::NAN, -3.0);
        assert_eq!(config.score_config().combo.multiplier_increment, 0.0);
        assert_eq!(config.score_config().combo.max_multiplier, 1.0);

        config.set_stage_requirement("hard", 10);
        assert!(config.is_stage_unlocked("hard", 10));
        assert_eq!(config.revision(), 3);
    }

    #[test]
    fn replace_swaps_everything() {
        let mut config = config();
        let mut next = BalanceConfig::default();
        next.items.cost_multiplier = 2.0;
        config.replace(next.clone());
        assert_eq!(config.config(), &next);
        assert_eq!(config.calculate_item_cost("health_up", 1), Some(100));
        assert_eq!(config.revision(), 1);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron_str(
            "(scoring: (combo: (multiplier_increment: 0.1, max_multiplier: 3.0)))",
        )
        .unwrap();
        assert_eq!(config.score_config().combo.max_multiplier, 3.0);
        assert_eq!(config.base_score("stone"), 35);
        assert_eq!(config.score_config().combo.timeout_ms, 2_000);

        assert!(GameConfig::from_ron_str("(scoring: 12)").is_err());
    }
}
