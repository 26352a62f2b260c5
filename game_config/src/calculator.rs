use {
    crate::{BalanceConfig, GameConfig},
    bevy::{ecs::system::SystemParam, prelude::*},
    calculation::{CalculationEngine, Calculator, CalculatorHandler, arg_f64, arg_str},
    serde_json::{Value, json},
    std::sync::Arc,
};

pub const BALANCE_CALCULATOR: &str = "balance";

/// Exposes the balance formulas to the [`CalculationEngine`] so repeated
/// lookups are memoized. Every method forwards to [`BalanceConfig`].
pub struct BalanceCalculator {
    config: Arc<BalanceConfig>,
}

impl BalanceCalculator {
    pub fn new(config: &BalanceConfig) -> Self {
        Self {
            config: Arc::new(config.clone()),
        }
    }
}

fn arg_u32(args: &[Value], index: usize) -> anyhow::Result<u32> {
    Ok(arg_f64(args, index)?.max(0.0).min(u32::MAX as f64) as u32)
}

impl Calculator for BalanceCalculator {
    fn into_handler(self) -> CalculatorHandler {
        let score = Arc::clone(&self.config);
        let combo = Arc::clone(&self.config);
        let cost = Arc::clone(&self.config);
        let stage = self.config;

        CalculatorHandler::new()
            .with_method("calculate_score", move |args| {
                Ok(json!(score.calculate_score(arg_str(args, 0)?, arg_f64(args, 1)?)))
            })
            .with_method("calculate_combo_multiplier", move |args| {
                Ok(json!(combo.calculate_combo_multiplier(arg_u32(args, 0)?)))
            })
            .with_method("calculate_item_cost", move |args| {
                Ok(json!(cost.calculate_item_cost(arg_str(args, 0)?, arg_u32(args, 1)?)))
            })
            .with_method("is_stage_unlocked", move |args| {
                let tap = arg_f64(args, 1)?.max(0.0) as u64;
                Ok(json!(stage.is_stage_unlocked(arg_str(args, 0)?, tap)))
            })
    }
}

/// Replaces the `balance` registration with one built from `config`, which
/// drops the memoized results computed from older values.
pub fn register_balance_calculator(engine: &mut CalculationEngine, config: &GameConfig) {
    let handler = BalanceCalculator::new(config.config()).into_handler();
    match engine.register_calculator(BALANCE_CALCULATOR, handler) {
        Ok(()) => debug!(revision = config.revision(), "balance calculator synced"),
        Err(error) => error!(%error, "failed to register balance calculator"),
    }
}

/// Re-registers the balance calculator whenever the config changes.
///
/// Runs in `Update`, so memoized `balance` results lag a direct `GameConfig`
/// edit by one frame. Systems that edit and then calculate in the same frame
/// go through [`BalanceEditor`] instead.
pub fn sync_balance_calculator(config: Res<GameConfig>, mut engine: ResMut<CalculationEngine>) {
    if config.is_changed() {
        register_balance_calculator(&mut engine, &config);
    }
}

/// Edits the [`GameConfig`] and resyncs the `balance` calculator immediately.
#[derive(SystemParam)]
pub struct BalanceEditor<'w> {
    config: ResMut<'w, GameConfig>,
    engine: ResMut<'w, CalculationEngine>,
}

impl<'w> BalanceEditor<'w> {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine_mut(&mut self) -> &mut CalculationEngine {
        &mut self.engine
    }

    pub fn edit<R>(&mut self, change: impl FnOnce(&mut GameConfig) -> R) -> R {
        let revision = self.config.revision();
        let result = change(&mut *self.config);
        if self.config.revision() != revision {
            register_balance_calculator(&mut self.engine, &self.config);
        }
        result
    }
}
