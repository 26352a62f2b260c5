use {
    achievement_integration::AchievementIntegrationPlugin,
    achievements::AchievementsPlugin,
    balance_compat::BalanceCompatPlugin,
    bevy::prelude::*,
    bevy_common_assets::ron::RonAssetPlugin,
    cache_system::CacheSystemPlugin,
    calculation::CalculationPlugin,
    game_config::GameConfigPlugin,
    gameplay_events::GameplayEventsPlugin,
    player_stats_resources::PlayerStatsResourcesPlugin,
    save_load::SaveLoadPlugin,
    states::GameState,
    system_schedule::SystemSchedulePlugin,
    wallet::WalletPlugin,
};

mod systems;

pub use systems::BalanceAsset;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                SystemSchedulePlugin,
                GameplayEventsPlugin,
                PlayerStatsResourcesPlugin,
                CacheSystemPlugin::default(),
                CalculationPlugin::default(),
                GameConfigPlugin::default(),
                BalanceCompatPlugin,
            ))
            .add_plugins((
                WalletPlugin,
                AchievementsPlugin,
                AchievementIntegrationPlugin,
                SaveLoadPlugin,
                RonAssetPlugin::<BalanceAsset>::new(&["balance.ron"]),
            ))
            .add_systems(Startup, systems::load_balance)
            .add_systems(Update, (systems::apply_balance, systems::follow_run_lifecycle));
    }
}
