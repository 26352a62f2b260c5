use {
    crate::{
        achievement::Achievement,
        catalog::{AchievementCategory, CATALOG},
        debounce::Debouncer,
        persistence::{
            ACHIEVEMENTS_SAVE_KEY, AchievementRecord, AchievementSnapshot, PersistenceProvider,
            SNAPSHOT_VERSION, validate_save_data,
        },
    },
    achievement_events::AchievementUnlocked,
    bevy::prelude::*,
    chrono::Utc,
    serde::Serialize,
    std::{
        collections::{BTreeMap, HashMap},
        time::Duration,
    },
};

/// Hard cap on entries processed by one [`AchievementManager::batch_update_progress`] call.
pub const MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub achievement_id: String,
    pub value: f64,
}

impl ProgressUpdate {
    pub fn new(achievement_id: impl Into<String>, value: f64) -> Self {
        Self {
            achievement_id: achievement_id.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewardTotals {
    pub ap: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceStats {
    pub update_calls: u64,
    pub recomputes: u64,
    pub coalesced_updates: u64,
    pub batch_dropped: u64,
    pub relevant_cache_hits: u64,
    pub relevant_cache_misses: u64,
    pub not_found: u64,
    pub rejected_values: u64,
    pub recoveries: u64,
    pub pending_recomputes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { applied: usize },
    /// Nothing stored under the achievements key.
    Missing,
    /// The stored document was unusable; the in-memory store was kept or rebuilt.
    Recovered,
    Failed,
}

/// Progress store for every catalog achievement.
///
/// `update_progress` stores the value right away. The unlock check for an id is
/// deferred until its throttle window closes, so a burst of updates costs one
/// recompute. A zero window makes every update recompute immediately.
#[derive(Resource, Debug)]
pub struct AchievementManager {
    progress_data: Option<HashMap<&'static str, Achievement>>,
    throttle: Debouncer<String, f64>,
    relevant_cache: HashMap<AchievementCategory, Vec<&'static str>>,
    unlocked: Vec<AchievementUnlocked>,
    clock: Duration,
    stats: PerformanceStats,
    dirty: bool,
}

impl Default for AchievementManager {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

fn fresh_store() -> HashMap<&'static str, Achievement> {
    CATALOG
        .iter()
        .map(|definition| (definition.id, Achievement::new(definition)))
        .collect()
}

/// NaN and infinities are rejected; negative values clamp to zero.
fn coerce_progress(value: f64) -> Option<f64> {
    value.is_finite().then_some(value.max(0.0))
}

impl AchievementManager {
    pub fn new(throttle_window: Duration) -> Self {
        Self {
            progress_data: Some(fresh_store()),
            throttle: Debouncer::new(throttle_window),
            relevant_cache: HashMap::new(),
            unlocked: Vec::new(),
            clock: Duration::ZERO,
            stats: PerformanceStats::default(),
            dirty: false,
        }
    }

    pub fn get(&self, achievement_id: &str) -> Option<&Achievement> {
        self.progress_data.as_ref()?.get(achievement_id)
    }

    /// All achievements in catalog order.
    pub fn achievements(&self) -> impl Iterator<Item = &Achievement> {
        CATALOG.iter().filter_map(|definition| self.get(definition.id))
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements().filter(|a| a.unlocked).count()
    }

    /// `true` when progress changed since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn update_progress(&mut self, achievement_id: &str, value: f64) {
        self.stats.update_calls += 1;
        if self.progress_data.is_none() && !self.attempt_data_recovery() {
            return;
        }
        let Some(value) = coerce_progress(value) else {
            self.stats.rejected_values += 1;
            warn!(achievement = %achievement_id, %value, "ignored non-finite progress value");
            return;
        };
        let Some(achievement) = self
            .progress_data
            .as_mut()
            .and_then(|store| store.get_mut(achievement_id))
        else {
            self.stats.not_found += 1;
            error!(achievement = %achievement_id, "Achievement not found:");
            return;
        };
        if achievement.unlocked {
            return;
        }
        achievement.progress.current = value;
        self.dirty = true;

        if self.throttle.window().is_zero() {
            self.recompute(achievement_id);
        } else if self
            .throttle
            .push(achievement_id.to_string(), value, self.clock)
        {
            self.stats.coalesced_updates += 1;
        }
    }

    /// Applies at most [`MAX_BATCH_SIZE`] updates and returns how many were processed.
    /// The rest are dropped; the caller resubmits them.
    pub fn batch_update_progress(&mut self, updates: &[ProgressUpdate]) -> usize {
        let processed = updates.len().min(MAX_BATCH_SIZE);
        let dropped = updates.len() - processed;
        if dropped > 0 {
            self.stats.batch_dropped += dropped as u64;
            warn!(dropped, cap = MAX_BATCH_SIZE, "progress batch truncated");
        }
        for update in &updates[..processed] {
            self.update_progress(&update.achievement_id, update.value);
        }
        processed
    }

    /// Unlocks `achievement_id` the first time its progress meets the target.
    pub fn check_and_unlock_achievement(&mut self, achievement_id: &str) -> bool {
        let Some(achievement) = self
            .progress_data
            .as_mut()
            .and_then(|store| store.get_mut(achievement_id))
        else {
            return false;
        };
        if achievement.unlocked || !achievement.progress.is_met() {
            return false;
        }

        achievement.unlocked = true;
        achievement.unlocked_date = Some(Utc::now().timestamp_millis());
        info!(
            achievement = achievement.id(),
            reward = achievement.reward_ap(),
            "achievement unlocked"
        );
        self.unlocked.push(AchievementUnlocked {
            achievement_id: achievement.id().to_string(),
            name: achievement.name().to_string(),
            reward_ap: achievement.reward_ap(),
        });
        let category = achievement.category();
        self.relevant_cache.remove(&category);
        self.dirty = true;
        true
    }

    fn recompute(&mut self, achievement_id: &str) {
        self.stats.recomputes += 1;
        self.check_and_unlock_achievement(achievement_id);
    }

    /// Advances the throttle clock and runs the recomputes whose window closed.
    pub fn tick(&mut self, delta: Duration) {
        self.clock += delta;
        for (achievement_id, value) in self.throttle.drain_ready(self.clock) {
            trace!(achievement = %achievement_id, %value, "throttled recompute");
            self.recompute(&achievement_id);
        }
    }

    /// Runs every pending recompute now.
    pub fn flush(&mut self) {
        for (achievement_id, _) in self.throttle.drain_all() {
            self.recompute(&achievement_id);
        }
    }

    /// Unlocks recorded since the last call, oldest first.
    pub fn take_unlocked(&mut self) -> Vec<AchievementUnlocked> {
        std::mem::take(&mut self.unlocked)
    }

    /// Ids of the still-locked achievements in `category`, memoized until the
    /// category changes.
    pub fn relevant_achievements(&mut self, category: AchievementCategory) -> Vec<&'static str> {
        if let Some(ids) = self.relevant_cache.get(&category) {
            self.stats.relevant_cache_hits += 1;
            return ids.clone();
        }
        self.stats.relevant_cache_misses += 1;
        let ids: Vec<&'static str> = self
            .achievements()
            .filter(|a| a.category() == category && !a.unlocked)
            .map(Achievement::id)
            .collect();
        self.relevant_cache.insert(category, ids.clone());
        ids
    }

    pub fn calculate_total_rewards(&self) -> RewardTotals {
        RewardTotals {
            ap: self
                .achievements()
                .filter(|a| a.unlocked)
                .map(Achievement::reward_ap)
                .sum(),
        }
    }

    /// Unlocked rewards per category. Every category is present.
    pub fn calculate_category_rewards(&self) -> BTreeMap<AchievementCategory, RewardTotals> {
        let mut totals: BTreeMap<_, _> = AchievementCategory::ALL
            .into_iter()
            .map(|category| (category, RewardTotals::default()))
            .collect();
        for achievement in self.achievements().filter(|a| a.unlocked) {
            if let Some(total) = totals.get_mut(&achievement.category()) {
                total.ap += achievement.reward_ap();
            }
        }
        totals
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        PerformanceStats {
            pending_recomputes: self.throttle.len(),
            ..self.stats.clone()
        }
    }

    /// Rebuilds the progress store from the catalog when it is missing, and
    /// repairs individual entries that are absent or inconsistent.
    pub fn attempt_data_recovery(&mut self) -> bool {
        let store = self.progress_data.get_or_insert_with(HashMap::new);
        let mut repaired = 0usize;
        for definition in CATALOG {
            let broken = store
                .get(definition.id)
                .is_none_or(|achievement| achievement.is_corrupt());
            if broken {
                store.insert(definition.id, Achievement::new(definition));
                repaired += 1;
            }
        }
        store.retain(|id, _| CATALOG.iter().any(|definition| definition.id == *id));

        let recovered = store.len() == CATALOG.len();
        if repaired > 0 {
            self.stats.recoveries += 1;
            self.relevant_cache.clear();
            self.throttle.clear();
            self.dirty = true;
            warn!(repaired, "achievement progress store recovered from catalog");
        }
        if !recovered {
            error!(
                entries = store.len(),
                expected = CATALOG.len(),
                "achievement progress recovery failed"
            );
        }
        recovered
    }

    pub fn snapshot(&self) -> Option<AchievementSnapshot> {
        self.progress_data.as_ref()?;
        Some(AchievementSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().timestamp_millis(),
            achievements: self
                .achievements()
                .map(|a| AchievementRecord {
                    id: a.id().to_string(),
                    unlocked: a.unlocked,
                    unlocked_date: a.unlocked_date,
                    current: a.progress.current,
                })
                .collect(),
        })
    }

    /// Flushes pending recomputes and writes the snapshot as RON.
    pub fn save(&mut self, store: &mut dyn PersistenceProvider) -> bool {
        self.flush();
        let Some(snapshot) = self.snapshot() else {
            error!("no achievement progress to save");
            return false;
        };
        let text = match ron::ser::to_string_pretty(&snapshot, ron::ser::PrettyConfig::default())
        {
            Ok(text) => text,
            Err(err) => {
                error!("failed to serialize achievements: {err}");
                return false;
            }
        };
        let saved = store.save(ACHIEVEMENTS_SAVE_KEY, &text);
        if saved {
            self.dirty = false;
            debug!(entries = snapshot.achievements.len(), "achievements saved");
        } else {
            warn!("achievement save was not written");
        }
        saved
    }

    pub fn load(&mut self, store: &dyn PersistenceProvider) -> LoadOutcome {
        match store.load(ACHIEVEMENTS_SAVE_KEY) {
            Some(text) => self.load_from_str(&text),
            None => {
                info!("no saved achievements, starting fresh");
                LoadOutcome::Missing
            }
        }
    }

    pub fn load_from_str(&mut self, text: &str) -> LoadOutcome {
        let document: ron::Value = match ron::from_str(text) {
            Ok(document) => document,
            Err(err) => {
                warn!("unreadable achievement save: {err}");
                return self.recover_after_bad_load();
            }
        };
        if !validate_save_data(&document) {
            warn!("achievement save failed validation");
            return self.recover_after_bad_load();
        }
        match ron::from_str::<AchievementSnapshot>(text) {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            Err(err) => {
                warn!("achievement save has unexpected fields: {err}");
                self.recover_after_bad_load()
            }
        }
    }

    fn recover_after_bad_load(&mut self) -> LoadOutcome {
        if self.attempt_data_recovery() {
            LoadOutcome::Recovered
        } else {
            LoadOutcome::Failed
        }
    }

    fn apply_snapshot(&mut self, snapshot: AchievementSnapshot) -> LoadOutcome {
        if self.progress_data.is_none() && !self.attempt_data_recovery() {
            return LoadOutcome::Failed;
        }
        let Some(store) = self.progress_data.as_mut() else {
            return LoadOutcome::Failed;
        };

        let mut applied = 0;
        for record in snapshot.achievements {
            let Some(achievement) = store.get_mut(record.id.as_str()) else {
                debug!(achievement = %record.id, "ignoring unknown saved achievement");
                continue;
            };
            achievement.progress.current = coerce_progress(record.current).unwrap_or(0.0);
            achievement.unlocked = record.unlocked;
            achievement.unlocked_date = if record.unlocked {
                Some(record.unlocked_date.unwrap_or(snapshot.saved_at))
            } else {
                None
            };
            applied += 1;
        }

        self.relevant_cache.clear();
        self.throttle.clear();
        self.dirty = false;
        info!(applied, version = snapshot.version, "achievements loaded");
        LoadOutcome::Loaded { applied }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::persistence::MemoryStore};

    fn immediate() -> AchievementManager {
        AchievementManager::new(Duration::ZERO)
    }

    #[test]
    fn catalog_starts_locked() {
        let manager = AchievementManager::default();
        assert_eq!(manager.achievements().count(), CATALOG.len());
        assert_eq!(manager.unlocked_count(), 0);
        assert_eq!(manager.calculate_total_rewards(), RewardTotals { ap: 0 });
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut manager = immediate();
        manager.update_progress("pops_100", 150.0);
        let first_date = manager.get("pops_100").unwrap().unlocked_date;
        assert!(first_date.is_some());

        // The update path already unlocked it, so an explicit check reports false.
        assert!(!manager.check_and_unlock_achievement("pops_100"));
        assert_eq!(manager.get("pops_100").unwrap().unlocked_date, first_date);
        assert_eq!(manager.take_unlocked().len(), 1);
    }

    #[test]
    fn check_unlocks_once_when_condition_met() {
        let mut manager = AchievementManager::default();
        manager.update_progress("combo_5", 5.0);
        assert!(manager.check_and_unlock_achievement("combo_5"));
        let date = manager.get("combo_5").unwrap().unlocked_date;
        assert!(!manager.check_and_unlock_achievement("combo_5"));
        assert_eq!(manager.get("combo_5").unwrap().unlocked_date, date);

        // The pending throttled recompute must not unlock a second time.
        manager.tick(Duration::from_secs(1));
        assert_eq!(manager.take_unlocked().len(), 1);
    }

    #[test]
    fn unmet_and_unknown_do_not_unlock() {
        let mut manager = immediate();
        manager.update_progress("combo_10", 9.0);
        assert!(!manager.check_and_unlock_achievement("combo_10"));
        assert!(!manager.check_and_unlock_achievement("does_not_exist"));
    }

    #[test]
    fn progress_is_set_not_added() {
        let mut manager = immediate();
        manager.update_progress("pops_1000", 400.0);
        manager.update_progress("pops_1000", 300.0);
        assert_eq!(manager.get("pops_1000").unwrap().progress.current, 300.0);
    }

    #[test]
    fn unknown_id_is_a_soft_failure() {
        let mut manager = immediate();
        manager.update_progress("missing", 10.0);
        assert_eq!(manager.performance_stats().not_found, 1);
        assert_eq!(manager.unlocked_count(), 0);
    }

    #[test]
    fn bad_values_do_not_corrupt_state() {
        let mut manager = immediate();
        manager.update_progress("pops_100", f64::NAN);
        manager.update_progress("pops_100", f64::INFINITY);
        assert_eq!(manager.get("pops_100").unwrap().progress.current, 0.0);

        manager.update_progress("pops_100", -20.0);
        let achievement = manager.get("pops_100").unwrap();
        assert_eq!(achievement.progress.current, 0.0);
        assert!(!achievement.unlocked);
        assert_eq!(manager.performance_stats().rejected_values, 2);
    }

    #[test]
    fn batch_is_capped() {
        let mut manager = immediate();
        let updates: Vec<_> = (0..100)
            .map(|i| ProgressUpdate::new("pops_10000", i as f64))
            .collect();

        assert_eq!(manager.batch_update_progress(&updates), MAX_BATCH_SIZE);
        let stats = manager.performance_stats();
        assert_eq!(stats.update_calls, 50);
        assert_eq!(stats.batch_dropped, 50);
        assert_eq!(manager.get("pops_10000").unwrap().progress.current, 49.0);
    }

    #[test]
    fn throttle_coalesces_recomputes() {
        let mut manager = AchievementManager::default();
        for value in 1..=10 {
            manager.update_progress("pops_100", value as f64 * 20.0);
            manager.tick(Duration::from_millis(1));
        }
        let stats = manager.performance_stats();
        assert_eq!(stats.update_calls, 10);
        assert_eq!(stats.recomputes, 0);
        assert_eq!(stats.coalesced_updates, 9);

        manager.tick(Duration::from_millis(10));
        let stats = manager.performance_stats();
        assert_eq!(stats.recomputes, 1);
        assert_eq!(stats.pending_recomputes, 0);

        let achievement = manager.get("pops_100").unwrap();
        assert_eq!(achievement.progress.current, 200.0);
        assert!(achievement.unlocked);
    }

    #[test]
    fn relevant_achievements_are_memoized() {
        let mut manager = immediate();
        let technique = manager.relevant_achievements(AchievementCategory::Technique);
        assert!(technique.contains(&"combo_5"));
        manager.relevant_achievements(AchievementCategory::Technique);

        let stats = manager.performance_stats();
        assert_eq!(stats.relevant_cache_misses, 1);
        assert_eq!(stats.relevant_cache_hits, 1);

        manager.update_progress("combo_5", 5.0);
        let technique = manager.relevant_achievements(AchievementCategory::Technique);
        assert!(!technique.contains(&"combo_5"));
        assert_eq!(manager.performance_stats().relevant_cache_misses, 2);
    }

    #[test]
    fn rewards_only_count_unlocked() {
        let mut manager = immediate();
        manager.update_progress("first_pop", 1.0);
        manager.update_progress("combo_5", 5.0);
        manager.update_progress("combo_10", 3.0);

        assert_eq!(manager.calculate_total_rewards().ap, 5 + 10);
        let per_category = manager.calculate_category_rewards();
        assert_eq!(per_category.len(), 5);
        assert_eq!(per_category[&AchievementCategory::Play].ap, 5);
        assert_eq!(per_category[&AchievementCategory::Technique].ap, 10);
        assert_eq!(per_category[&AchievementCategory::Special].ap, 0);
    }

    #[test]
    fn recovers_from_missing_store() {
        let mut manager = immediate();
        manager.progress_data = None;
        assert!(manager.get("first_pop").is_none());

        assert!(manager.attempt_data_recovery());
        assert_eq!(manager.achievements().count(), CATALOG.len());
        assert_eq!(manager.performance_stats().recoveries, 1);
    }

    #[test]
    fn update_on_missing_store_recovers_first() {
        let mut manager = immediate();
        manager.progress_data = None;
        manager.update_progress("first_pop", 1.0);
        assert!(manager.get("first_pop").unwrap().unlocked);
    }

    #[test]
    fn recovery_repairs_only_broken_entries() {
        let mut manager = immediate();
        manager.update_progress("first_pop", 1.0);
        if let Some(store) = manager.progress_data.as_mut() {
            store.remove("pops_100");
            if let Some(entry) = store.get_mut("combo_5") {
                entry.progress.current = f64::NAN;
            }
        }

        assert!(manager.attempt_data_recovery());
        assert!(manager.get("first_pop").unwrap().unlocked);
        assert_eq!(manager.get("combo_5").unwrap().progress.current, 0.0);
        assert!(manager.get("pops_100").is_some());
    }

    #[test]
    fn save_and_load_restore_progress() {
        let mut store = MemoryStore::default();
        let mut manager = AchievementManager::default();
        manager.update_progress("first_pop", 1.0);
        manager.update_progress("pops_100", 42.0);
        assert!(manager.save(&mut store));
        assert!(!manager.is_dirty());

        let mut restored = AchievementManager::default();
        assert_eq!(
            restored.load(&store),
            LoadOutcome::Loaded {
                applied: CATALOG.len()
            }
        );
        assert!(restored.get("first_pop").unwrap().unlocked);
        assert_eq!(restored.get("pops_100").unwrap().progress.current, 42.0);
        assert!(restored.take_unlocked().is_empty());
    }

    #[test]
    fn failed_write_keeps_dirty_flag() {
        let mut store = MemoryStore {
            read_only: true,
            ..Default::default()
        };
        let mut manager = immediate();
        manager.update_progress("pops_100", 3.0);
        assert!(!manager.save(&mut store));
        assert!(manager.is_dirty());
    }

    #[test]
    fn invalid_documents_trigger_recovery() {
        let mut manager = immediate();
        manager.update_progress("first_pop", 1.0);

        assert_eq!(manager.load_from_str("not ron at all ("), LoadOutcome::Recovered);
        assert_eq!(
            manager.load_from_str(r#"(achievements: "everything")"#),
            LoadOutcome::Recovered
        );
        // A healthy store survives a bad document untouched.
        assert!(manager.get("first_pop").unwrap().unlocked);
    }

    #[test]
    fn unknown_saved_ids_are_ignored() {
        let mut manager = immediate();
        let outcome = manager.load_from_str(
            r#"(version: 1, saved_at: 5, achievements: [
                (id: "retired", unlocked: true, unlocked_date: Some(1), current: 1.0),
                (id: "combo_5", unlocked: true, current: 5.0),
            ])"#,
        );
        assert_eq!(outcome, LoadOutcome::Loaded { applied: 1 });
        assert_eq!(manager.get("combo_5").unwrap().unlocked_date, Some(5));
    }

    #[test]
    fn missing_save_is_reported() {
        let mut manager = immediate();
        assert_eq!(manager.load(&MemoryStore::default()), LoadOutcome::Missing);
    }
}
