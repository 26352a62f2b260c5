//! Generic in-memory cache with TTL, priority-aware LRU eviction and a
//! periodic expiry sweep, plus the process-wide [`SharedCache`] resource.

mod cache;
mod config;
mod stats;

pub use cache::*;
pub use config::*;
pub use stats::*;

use {bevy::prelude::*, serde_json::Value, system_schedule::GameSchedule};

/// Process-wide cache for expensive derived values. Inserted once by
/// [`CacheSystemPlugin`] and handed to systems as a resource.
#[derive(Resource, Deref, DerefMut)]
pub struct SharedCache(pub Cache<Value>);

impl SharedCache {
    pub fn new(config: CacheConfig) -> Self {
        Self(Cache::new(config))
    }
}

#[derive(Default)]
pub struct CacheSystemPlugin {
    pub config: CacheConfig,
}

impl Plugin for CacheSystemPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SharedCache::new(self.config))
            .add_systems(Update, tick_shared_cache.in_set(GameSchedule::FrameStart));
    }
}

/// Feeds frame time into the shared cache so TTLs and sweeps follow game time.
pub fn tick_shared_cache(time: Res<Time>, mut cache: ResMut<SharedCache>) {
    let removed = cache.tick(time.delta());
    if removed > 0 {
        trace!(removed, "shared cache sweep");
    }
}
