//! Memoizing dispatcher for named calculators.

mod engine;
mod error;
mod handler;

pub use engine::*;
pub use error::*;
pub use handler::*;

use {bevy::prelude::*, cache_system::CacheConfig, system_schedule::GameSchedule};

#[derive(Default)]
pub struct CalculationPlugin {
    /// Limits for the engine's result cache. `None` keeps the engine defaults.
    pub cache_config: Option<CacheConfig>,
}

impl Plugin for CalculationPlugin {
    fn build(&self, app: &mut App) {
        let engine = match self.cache_config {
            Some(config) => CalculationEngine::new(config),
            None => CalculationEngine::default(),
        };
        app.insert_resource(engine)
            .add_systems(Update, tick_calculation_cache.in_set(GameSchedule::FrameStart));
    }
}

pub fn tick_calculation_cache(time: Res<Time>, mut engine: ResMut<CalculationEngine>) {
    engine.tick(time.delta());
}
