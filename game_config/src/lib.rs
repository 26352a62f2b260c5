//! Canonical game balance: configuration data, the pure formulas over it,
//! validation, and the memoized `balance` calculator.

mod balance;
mod calculator;
mod config;
mod validation;

pub use balance::*;
pub use calculator::*;
pub use config::*;
pub use validation::*;

use {bevy::prelude::*, calculation::CalculationEngine};

#[derive(Default)]
pub struct GameConfigPlugin {
    pub config: GameConfig,
}

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        let report = self.config.validate();
        if !report.is_valid() {
            warn!(issues = report.issues.len(), "balance config loaded with issues");
        }

        app.insert_resource(self.config.clone())
            .init_resource::<CalculationEngine>()
            .add_systems(Update, sync_balance_calculator);
    }
}
