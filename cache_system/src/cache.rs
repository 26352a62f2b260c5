//! Keyed store with per-entry TTL, priority-aware LRU eviction and a periodic
//! expiry sweep.
//!
//! Time is supplied by the owner through [`Cache::tick`], so the cache never
//! reads a wall clock on its own. Eviction uses a `BTreeMap` index ordered by
//! `(priority, access tick)`: the first key in the index is always the next
//! victim, without scanning every entry.

use {
    crate::{
        config::{CacheConfig, CacheOptions, MIN_TTL},
        stats::{CacheStats, format_hit_rate, format_kilobytes},
    },
    bevy::prelude::*,
    std::{
        collections::{BTreeMap, HashMap},
        time::Duration,
    },
};

/// A stored value and its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: Duration,
    pub expires_at: Duration,
    pub priority: i32,
    pub last_accessed: Duration,
    /// Monotonic access sequence; breaks ties between equal `last_accessed`.
    tick: u64,
}

impl<V> CacheEntry<V> {
    fn eviction_key(&self) -> EvictionKey {
        EvictionKey {
            priority: self.priority,
            tick: self.tick,
        }
    }

    fn is_expired(&self, now: Duration) -> bool {
        self.expires_at <= now
    }
}

/// Lowest priority first, then least recently touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EvictionKey {
    priority: i32,
    tick: u64,
}

pub struct Cache<V> {
    config: CacheConfig,
    entries: HashMap<String, CacheEntry<V>>,
    eviction_index: BTreeMap<EvictionKey, String>,
    clock: Duration,
    next_tick: u64,
    sweep_timer: Option<Timer>,
    hits: u64,
    misses: u64,
    expirations: u64,
    evictions: u64,
}

impl<V> Default for Cache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V> Cache<V> {
    pub fn new(config: CacheConfig) -> Self {
        let config = config.sanitized();
        Self {
            config,
            entries: HashMap::new(),
            eviction_index: BTreeMap::new(),
            clock: Duration::ZERO,
            next_tick: 0,
            sweep_timer: Some(Timer::new(config.cleanup_interval, TimerMode::Repeating)),
            hits: 0,
            misses: 0,
            expirations: 0,
            evictions: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current cache time.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances the cache clock and runs the periodic sweep when it is due.
    /// Returns the number of entries the sweep removed.
    pub fn tick(&mut self, delta: Duration) -> usize {
        self.clock = self.clock.saturating_add(delta);

        let sweep_due = match self.sweep_timer.as_mut() {
            Some(timer) => timer.tick(delta).just_finished(),
            None => false,
        };

        if sweep_due { self.cleanup() } else { 0 }
    }

    /// Inserts or overwrites `key`, evicting entries first when the cache is full.
    pub fn set(&mut self, key: impl Into<String>, value: V, options: CacheOptions) {
        let key = key.into();
        let replacing = self.remove_entry(&key).is_some();

        if !replacing && self.entries.len() >= self.config.max_size {
            self.make_room();
        }

        let ttl = options.ttl.unwrap_or(self.config.ttl).max(MIN_TTL);
        let tick = self.advance_tick();
        let entry = CacheEntry {
            key: key.clone(),
            value,
            created_at: self.clock,
            expires_at: self.clock.saturating_add(ttl),
            priority: options.priority,
            last_accessed: self.clock,
            tick,
        };

        self.eviction_index.insert(entry.eviction_key(), key.clone());
        self.entries.insert(key, entry);
    }

    /// Returns the live value for `key`. Expired entries are dropped and count
    /// as both a miss and an expiration.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(self.clock),
            None => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.expirations += 1;
            self.misses += 1;
            trace!(%key, "cache entry expired on read");
            return None;
        }

        let tick = self.advance_tick();
        let now = self.clock;
        let entry = self.entries.get_mut(key)?;
        self.eviction_index.remove(&entry.eviction_key());
        entry.tick = tick;
        entry.last_accessed = now;
        self.eviction_index.insert(entry.eviction_key(), key.to_string());
        self.hits += 1;

        Some(&entry.value)
    }

    /// Existence check with the same expiry rule as [`Cache::get`]; does not
    /// touch statistics or recency.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.clock))
    }

    /// Live entry metadata without counting a request.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.clock))
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    /// Removes every entry, or only keys starting with `prefix`.
    pub fn clear(&mut self, prefix: Option<&str>) -> usize {
        match prefix {
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                self.eviction_index.clear();
                removed
            }
            Some(prefix) => {
                let keys: Vec<String> = self
                    .entries
                    .keys()
                    .filter(|key| key.starts_with(prefix))
                    .cloned()
                    .collect();
                for key in &keys {
                    self.remove_entry(key);
                }
                keys.len()
            }
        }
    }

    /// Replaces the TTL of a live entry, counted from now. The value is untouched.
    pub fn update_expiry(&mut self, key: &str, ttl: Duration) -> bool {
        let now = self.clock;
        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = now.saturating_add(ttl.max(MIN_TTL));
                true
            }
            _ => false,
        }
    }

    /// Removes all expired entries.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock;
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.expirations += expired.len() as u64;

        if !expired.is_empty() {
            debug!(removed = expired.len(), remaining = self.entries.len(), "cache sweep");
        }
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let bytes: usize = self
            .entries
            .keys()
            .map(|key| key.len() * 2 + std::mem::size_of::<CacheEntry<V>>())
            .sum();

        CacheStats {
            hits: self.hits,
            misses: self.misses,
            total_requests: self.hits + self.misses,
            hit_rate: format_hit_rate(self.hits, self.misses),
            expirations: self.expirations,
            evictions: self.evictions,
            size: self.entries.len(),
            memory_usage: format_kilobytes(bytes),
        }
    }

    /// Stops the periodic sweep and drops every entry. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.sweep_timer.take().is_some() {
            debug!(entries = self.entries.len(), "cache destroyed");
        }
        self.entries.clear();
        self.eviction_index.clear();
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep_timer.is_some()
    }

    fn advance_tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.eviction_index.remove(&entry.eviction_key());
        Some(entry)
    }

    /// Frees one slot: expired entries go first, then the eviction order.
    fn make_room(&mut self) {
        if self.cleanup() > 0 {
            return;
        }

        while self.entries.len() >= self.config.max_size {
            let Some((_, victim)) = self.eviction_index.pop_first() else {
                break;
            };
            self.entries.remove(&victim);
            self.evictions += 1;
            trace!(key = %victim, "cache entry evicted");
        }
    }
}
