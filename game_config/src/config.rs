//! Canonical balance data. Every number the scoring, shop and stage code reads
//! lives here; defaults can be overridden from a RON document.

use {
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Bubble types ordered by hardness; base scores must not decrease along it.
pub const HARDNESS_ORDER: [&str; 5] = ["normal", "stone", "iron", "diamond", "boss"];

pub const FALLBACK_BUBBLE_TYPE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub scoring: ScoringConfig,
    pub stages: StagesConfig,
    pub items: ItemsConfig,
    pub bubbles: BubblesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_scores: BTreeMap<String, u32>,
    pub combo: ComboConfig,
    pub age_bonus: AgeBonusConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Added to the multiplier for every combo step past the first.
    pub multiplier_increment: f64,
    pub max_multiplier: f64,
    /// Gap after which a combo breaks.
    pub timeout_ms: u64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            multiplier_increment: 0.08,
            max_multiplier: 2.5,
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeBonusConfig {
    /// Applied when age ratio < 0.1.
    pub early_bonus: f64,
    /// Applied when 0.5 <= age ratio <= 0.7.
    pub mid_bonus: f64,
    /// Applied when age ratio > 0.9.
    pub late_bonus: f64,
}

impl Default for AgeBonusConfig {
    fn default() -> Self {
        Self {
            early_bonus: 2.0,
            mid_bonus: 1.5,
            late_bonus: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    /// TAP required to enter each stage.
    pub unlock_requirements: BTreeMap<String, u64>,
    pub difficulty: BTreeMap<String, StageDifficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDifficulty {
    /// Bubbles spawned per second.
    pub spawn_rate: f64,
    pub max_bubbles: u32,
    pub bubble_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemsConfig {
    pub base_costs: BTreeMap<String, u32>,
    pub effects: BTreeMap<String, ItemEffect>,
    pub max_levels: BTreeMap<String, u32>,
    /// Price growth per purchased level.
    pub cost_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    /// Player stat the item modifies (e.g. "score_multiplier").
    pub stat: String,
    pub per_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubblesConfig {
    /// Lifetime in milliseconds before a bubble escapes.
    pub max_age: BTreeMap<String, u64>,
    /// Clicks needed to pop.
    pub health: BTreeMap<String, u32>,
    pub special_effects: BTreeMap<String, SpecialEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// Pops neighbours within the radius (pixels).
    ChainPop { radius: f32 },
    Heal { amount: u32 },
    Damage { amount: u32 },
    /// Freezes bubble aging for the duration.
    TimeStop { duration_ms: u64 },
    BonusAp { amount: u32 },
    ScoreMultiplier { factor: f64, duration_ms: u64 },
}

fn table<V: Copy>(pairs: &[(&str, V)]) -> BTreeMap<String, V> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

fn stage(spawn_rate: f64, max_bubbles: u32, bubble_types: &[&str]) -> StageDifficulty {
    StageDifficulty {
        spawn_rate,
        max_bubbles,
        bubble_types: bubble_types.iter().map(|t| t.to_string()).collect(),
    }
}

fn effect(stat: &str, per_level: f64) -> ItemEffect {
    ItemEffect {
        stat: stat.to_string(),
        per_level,
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_scores: table(&[
                ("normal", 15),
                ("stone", 35),
                ("iron", 65),
                ("diamond", 120),
                ("boss", 500),
                ("rainbow", 400),
                ("electric", 20),
                ("pink", 30),
                ("poison", 8),
                ("spiky", 85),
                ("clock", 180),
                ("star", 600),
            ]),
            combo: ComboConfig::default(),
            age_bonus: AgeBonusConfig::default(),
        }
    }
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            unlock_requirements: table(&[
                ("normal", 0),
                ("hard", 500),
                ("very_hard", 2_000),
                ("expert", 5_000),
                ("nightmare", 12_000),
                ("boss_rush", 25_000),
            ]),
            difficulty: [
                ("normal", stage(1.0, 10, &["normal", "pink", "poison"])),
                ("hard", stage(1.4, 14, &["normal", "stone", "pink", "poison", "electric"])),
                ("very_hard", stage(1.8, 18, &["normal", "stone", "iron", "electric", "spiky"])),
                ("expert", stage(2.2, 22, &["stone", "iron", "diamond", "spiky", "clock"])),
                ("nightmare", stage(2.8, 28, &["iron", "diamond", "spiky", "rainbow", "star"])),
                ("boss_rush", stage(1.2, 12, &["diamond", "boss", "rainbow"])),
            ]
            .into_iter()
            .map(|(id, difficulty)| (id.to_string(), difficulty))
            .collect(),
        }
    }
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            base_costs: table(&[
                ("speed_boost", 40),
                ("health_up", 50),
                ("combo_keeper", 60),
                ("score_multiplier", 75),
                ("time_extension", 90),
                ("auto_pop", 120),
                ("magnet", 150),
            ]),
            effects: [
                ("speed_boost", effect("click_speed", 0.1)),
                ("health_up", effect("max_hp", 10.0)),
                ("combo_keeper", effect("combo_timeout_ms", 250.0)),
                ("score_multiplier", effect("score_multiplier", 0.1)),
                ("time_extension", effect("bubble_max_age", 0.05)),
                ("auto_pop", effect("auto_pop_rate", 0.2)),
                ("magnet", effect("pop_radius", 8.0)),
            ]
            .into_iter()
            .map(|(id, effect)| (id.to_string(), effect))
            .collect(),
            max_levels: table(&[
                ("speed_boost", 10),
                ("health_up", 5),
                ("combo_keeper", 5),
                ("score_multiplier", 5),
                ("time_extension", 5),
                ("auto_pop", 3),
                ("magnet", 3),
            ]),
            cost_multiplier: 1.3,
        }
    }
}

impl Default for BubblesConfig {
    fn default() -> Self {
        Self {
            max_age: table(&[
                ("normal", 12_000),
                ("stone", 16_000),
                ("iron", 20_000),
                ("diamond", 25_000),
                ("boss", 35_000),
                ("rainbow", 10_000),
                ("electric", 8_000),
                ("pink", 12_000),
                ("poison", 15_000),
                ("spiky", 14_000),
                ("clock", 20_000),
                ("star", 6_000),
            ]),
            health: table(&[
                ("normal", 1),
                ("stone", 2),
                ("iron", 3),
                ("diamond", 4),
                ("boss", 8),
                ("rainbow", 1),
                ("electric", 1),
                ("pink", 1),
                ("poison", 1),
                ("spiky", 1),
                ("clock", 1),
                ("star", 1),
            ]),
            special_effects: table(&[
                ("electric", SpecialEffect::Damage { amount: 5 }),
                ("pink", SpecialEffect::Heal { amount: 25 }),
                ("poison", SpecialEffect::Damage { amount: 10 }),
                ("spiky", SpecialEffect::ChainPop { radius: 120.0 }),
                ("rainbow", SpecialEffect::ScoreMultiplier { factor: 2.0, duration_ms: 5_000 }),
                ("clock", SpecialEffect::TimeStop { duration_ms: 3_000 }),
                ("star", SpecialEffect::BonusAp { amount: 10 }),
            ]),
        }
    }
}
