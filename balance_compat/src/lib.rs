//! Deprecated flat-object access to the balance configuration.
//!
//! Older call sites read `BALANCE_CONFIG.scoring` style sections and call
//! `BalanceHelper` functions. Both are kept as read-only views that forward to
//! [`GameConfig`]; nothing here owns balance data or logic.

use {
    bevy::{ecs::system::SystemParam, prelude::*},
    cache_system::{CacheOptions, SharedCache},
    game_config::{BubblesConfig, GameConfig, ItemsConfig, ScoringConfig, StagesConfig},
    serde_json::Value,
    std::{
        collections::HashSet,
        sync::{
            Mutex,
            atomic::{AtomicU64, Ordering},
        },
    },
};

/// Key prefix of legacy section snapshots in the [`SharedCache`].
pub const SNAPSHOT_KEY_PREFIX: &str = "legacy_balance:";

/// Top-level sections of the legacy flat config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacySection {
    Scoring,
    Stages,
    Items,
    Bubbles,
}

impl LegacySection {
    pub const ALL: [LegacySection; 4] = [
        LegacySection::Scoring,
        LegacySection::Stages,
        LegacySection::Items,
        LegacySection::Bubbles,
    ];

    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "scoring" => Some(LegacySection::Scoring),
            "stages" => Some(LegacySection::Stages),
            "items" => Some(LegacySection::Items),
            "bubbles" => Some(LegacySection::Bubbles),
            _ => None,
        }
    }

    pub fn property(self) -> &'static str {
        match self {
            LegacySection::Scoring => "scoring",
            LegacySection::Stages => "stages",
            LegacySection::Items => "items",
            LegacySection::Bubbles => "bubbles",
        }
    }

    fn replacement(self) -> &'static str {
        match self {
            LegacySection::Scoring => "GameConfig::score_config",
            LegacySection::Stages => "GameConfig::stage_config",
            LegacySection::Items => "GameConfig::item_config",
            LegacySection::Bubbles => "GameConfig::bubble_config",
        }
    }
}

/// Which legacy properties already produced their deprecation warning, plus
/// counters for everything logged by the shim. Lives for the whole process.
#[derive(Resource, Default)]
pub struct DeprecationLog {
    warned: Mutex<HashSet<LegacySection>>,
    warnings: AtomicU64,
    rejected_writes: AtomicU64,
}

impl DeprecationLog {
    /// Returns `true` the first time `section` is seen.
    fn mark_warned(&self, section: LegacySection) -> bool {
        let mut warned = match self.warned.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        warned.insert(section)
    }

    fn warn_section(&self, section: LegacySection) {
        if self.mark_warned(section) {
            self.warnings.fetch_add(1, Ordering::Relaxed);
            warn!(
                property = section.property(),
                replacement = section.replacement(),
                "BALANCE_CONFIG is deprecated"
            );
        }
    }

    fn warn_call(&self, function: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        warn!(%function, replacement = "GameConfig", "BalanceHelper is deprecated");
    }

    fn reject_write(&self, property: &str) {
        self.rejected_writes.fetch_add(1, Ordering::Relaxed);
        error!(%property, "BALANCE_CONFIG is read-only; use the GameConfig setters");
    }

    pub fn has_warned(&self, section: LegacySection) -> bool {
        match self.warned.lock() {
            Ok(guard) => guard.contains(&section),
            Err(poisoned) => poisoned.into_inner().contains(&section),
        }
    }

    /// Total deprecation warnings emitted (section reads + helper calls).
    pub fn warnings(&self) -> u64 {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn rejected_writes(&self) -> u64 {
        self.rejected_writes.load(Ordering::Relaxed)
    }
}

/// Read-only stand-in for the legacy `BALANCE_CONFIG` object.
pub struct LegacyBalanceConfig<'a> {
    config: &'a GameConfig,
    log: &'a DeprecationLog,
}

impl<'a> LegacyBalanceConfig<'a> {
    pub fn new(config: &'a GameConfig, log: &'a DeprecationLog) -> Self {
        Self { config, log }
    }

    /// Property access by name; returns a detached snapshot of the section.
    pub fn get(&self, property: &str) -> Option<Value> {
        let section = LegacySection::from_property(property)?;
        self.log.warn_section(section);

        let snapshot = match section {
            LegacySection::Scoring => serde_json::to_value(self.config.score_config()),
            LegacySection::Stages => serde_json::to_value(self.config.stage_config()),
            LegacySection::Items => serde_json::to_value(self.config.item_config()),
            LegacySection::Bubbles => serde_json::to_value(self.config.bubble_config()),
        };
        match snapshot {
            Ok(value) => Some(value),
            Err(error) => {
                error!(%property, %error, "failed to snapshot legacy balance section");
                None
            }
        }
    }

    /// Assignment is refused; the canonical config is left untouched.
    pub fn set(&self, property: &str, _value: Value) -> bool {
        self.log.reject_write(property);
        false
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.log.warn_section(LegacySection::Scoring);
        self.config.score_config().clone()
    }

    pub fn stages(&self) -> StagesConfig {
        self.log.warn_section(LegacySection::Stages);
        self.config.stage_config().clone()
    }

    pub fn items(&self) -> ItemsConfig {
        self.log.warn_section(LegacySection::Items);
        self.config.item_config().clone()
    }

    pub fn bubbles(&self) -> BubblesConfig {
        self.log.warn_section(LegacySection::Bubbles);
        self.config.bubble_config().clone()
    }
}

/// Legacy helper functions. Each call warns and forwards unchanged.
pub struct BalanceHelper<'a> {
    config: &'a GameConfig,
    log: &'a DeprecationLog,
}

impl<'a> BalanceHelper<'a> {
    pub fn new(config: &'a GameConfig, log: &'a DeprecationLog) -> Self {
        Self { config, log }
    }

    pub fn calculate_score(&self, bubble_type: &str, age_ratio: f64) -> u64 {
        self.log.warn_call("calculate_score");
        self.config.calculate_score(bubble_type, age_ratio)
    }

    pub fn calculate_combo_multiplier(&self, combo_count: u32) -> f64 {
        self.log.warn_call("calculate_combo_multiplier");
        self.config.calculate_combo_multiplier(combo_count)
    }

    pub fn calculate_item_cost(&self, item_id: &str, current_level: u32) -> Option<u64> {
        self.log.warn_call("calculate_item_cost");
        self.config.calculate_item_cost(item_id, current_level)
    }

    pub fn is_stage_unlocked(&self, stage_id: &str, player_tap: u64) -> bool {
        self.log.warn_call("is_stage_unlocked");
        self.config.is_stage_unlocked(stage_id, player_tap)
    }
}

/// System parameter bundling what the legacy views need.
#[derive(SystemParam)]
pub struct LegacyBalance<'w> {
    config: Res<'w, GameConfig>,
    log: Res<'w, DeprecationLog>,
    cache: Option<ResMut<'w, SharedCache>>,
}

impl<'w> LegacyBalance<'w> {
    /// Same as [`LegacyBalanceConfig::get`], but snapshots are kept in the
    /// [`SharedCache`] per config revision, so a setter call invalidates them.
    pub fn section(&mut self, property: &str) -> Option<Value> {
        let section = LegacySection::from_property(property)?;
        let key = format!(
            "{SNAPSHOT_KEY_PREFIX}{}:{}",
            section.property(),
            self.config.revision()
        );

        if let Some(cache) = self.cache.as_deref_mut()
            && let Some(value) = cache.get(&key)
        {
            self.log.warn_section(section);
            return Some(value.clone());
        }

        let snapshot = LegacyBalanceConfig::new(&self.config, &self.log).get(property)?;
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.set(key, snapshot.clone(), CacheOptions::new());
        }
        Some(snapshot)
    }

    pub fn balance_config(&self) -> LegacyBalanceConfig<'_> {
        LegacyBalanceConfig::new(&self.config, &self.log)
    }

    pub fn helper(&self) -> BalanceHelper<'_> {
        BalanceHelper::new(&self.config, &self.log)
    }
}

pub struct BalanceCompatPlugin;

impl Plugin for BalanceCompatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeprecationLog>();
    }
}
