use {
    bevy::prelude::*,
    game_config::{BalanceConfig, GameConfig},
    gameplay_events::GameplayEvent,
    serde::Deserialize,
    states::GameState,
};

pub const BALANCE_ASSET_PATH: &str = "config/default.balance.ron";

/// Balance file on disk; missing sections keep their defaults.
#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
#[serde(transparent)]
pub struct BalanceAsset(pub BalanceConfig);

#[derive(Resource)]
pub struct BalanceHandle(pub Handle<BalanceAsset>);

pub fn load_balance(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("loading balance config from {BALANCE_ASSET_PATH}");
    commands.insert_resource(BalanceHandle(asset_server.load(BALANCE_ASSET_PATH)));
}

/// Copies the balance asset into [`GameConfig`] on load and on every hot reload.
pub fn apply_balance(
    mut events: MessageReader<AssetEvent<BalanceAsset>>,
    handle: Option<Res<BalanceHandle>>,
    assets: Res<Assets<BalanceAsset>>,
    mut config: ResMut<GameConfig>,
) {
    let Some(handle) = handle else {
        return;
    };
    for event in events.read() {
        if !event.is_loaded_with_dependencies(&handle.0) && !event.is_modified(&handle.0) {
            continue;
        }
        if let Some(asset) = assets.get(&handle.0) {
            info!("balance config applied");
            config.replace(asset.0.clone());
        }
    }
}

pub fn follow_run_lifecycle(
    mut events: MessageReader<GameplayEvent>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for event in events.read() {
        match (event, state.get()) {
            (GameplayEvent::GameStarted, GameState::GameOver) => {
                debug!("new run started");
                next_state.set(GameState::Running);
            }
            (GameplayEvent::GameOver(outcome), GameState::Running) => {
                info!(victory = outcome.victory, score = outcome.final_score, "run over");
                next_state.set(GameState::GameOver);
            }
            _ => {}
        }
    }
}
