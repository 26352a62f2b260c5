//! Save/Load of player progress.
//!
//! This crate provides:
//! - Loading achievements, wallet and statistics when the game starts
//! - F5 keyboard shortcut for manual saves
//! - Automatic saves every 1 minute and whenever a run ends
//! - A pluggable [`PersistenceProvider`], RON files under `saves/` by default

mod store;

pub use store::RonFileStore;

use {
    achievements::{AchievementManager, LoadOutcome, PersistenceProvider},
    bevy::prelude::*,
    chrono::Local,
    player_stats_resources::PlayerStatistics,
    serde::{Serialize, de::DeserializeOwned},
    states::GameState,
    system_schedule::GameSchedule,
    wallet::Wallet,
};

pub const WALLET_SAVE_KEY: &str = "wallet";
pub const STATISTICS_SAVE_KEY: &str = "statistics";

/// Event to trigger an immediate save.
#[derive(Event)]
pub struct SaveGame;

/// Backend every save goes through.
#[derive(Resource, Deref, DerefMut)]
pub struct SaveStore(pub Box<dyn PersistenceProvider>);

impl SaveStore {
    pub fn provider(&self) -> &dyn PersistenceProvider {
        self.0.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn PersistenceProvider {
        self.0.as_mut()
    }
}

impl Default for SaveStore {
    fn default() -> Self {
        Self(Box::new(RonFileStore::default()))
    }
}

/// Timer resource for automatic saves.
#[derive(Resource)]
pub struct AutosaveTimer(Timer);

impl Default for AutosaveTimer {
    fn default() -> Self {
        // 1 minute autosave interval
        Self(Timer::from_seconds(60.0, TimerMode::Repeating))
    }
}

#[derive(Default)]
pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutosaveTimer>()
            .init_resource::<SaveStore>()
            .add_systems(OnEnter(GameState::Loading), load_progress)
            .add_systems(
                Update,
                (trigger_save_on_keypress, autosave)
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(OnEnter(GameState::GameOver), save_on_game_over)
            .add_observer(execute_save)
            .add_systems(OnExit(GameState::Running), clean_up_save_load);
    }
}

/// Restores saved progress and moves on to `Running`.
fn load_progress(
    store: Res<SaveStore>,
    mut manager: ResMut<AchievementManager>,
    mut wallet: ResMut<Wallet>,
    mut stats: ResMut<PlayerStatistics>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    match manager.load(store.provider()) {
        LoadOutcome::Failed => error!("Achievement progress could not be restored"),
        outcome => info!(?outcome, "Achievement progress restored"),
    }
    if let Some(saved) = load_ron::<Wallet>(store.provider(), WALLET_SAVE_KEY) {
        *wallet = saved;
    }
    if let Some(saved) = load_ron::<PlayerStatistics>(store.provider(), STATISTICS_SAVE_KEY) {
        *stats = saved;
    }

    info!("Progress loaded, entering Running state");
    next_state.set(GameState::Running);
}

fn trigger_save_on_keypress(keyboard: Option<Res<ButtonInput<KeyCode>>>, mut commands: Commands) {
    if keyboard.is_some_and(|keyboard| keyboard.just_pressed(KeyCode::F5)) {
        info!("Manual save triggered (F5)");
        commands.trigger(SaveGame);
    }
}

fn autosave(time: Res<Time>, mut timer: ResMut<AutosaveTimer>, mut commands: Commands) {
    if timer.0.tick(time.delta()).just_finished() {
        info!("Autosave triggered");
        commands.trigger(SaveGame);
    }
}

fn save_on_game_over(mut commands: Commands) {
    commands.trigger(SaveGame);
}

/// Observer that writes every progress resource through the [`SaveStore`].
fn execute_save(
    _trigger: On<SaveGame>,
    mut store: ResMut<SaveStore>,
    mut manager: ResMut<AchievementManager>,
    wallet: Res<Wallet>,
    stats: Res<PlayerStatistics>,
) {
    let achievements_saved = manager.save(store.provider_mut());
    let wallet_saved = save_ron(store.provider_mut(), WALLET_SAVE_KEY, &*wallet);
    let stats_saved = save_ron(store.provider_mut(), STATISTICS_SAVE_KEY, &*stats);

    if achievements_saved && wallet_saved && stats_saved {
        info!("Game saved at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    } else {
        warn!(
            achievements_saved,
            wallet_saved, stats_saved, "Save finished with failures"
        );
    }
}

fn save_ron<T: Serialize>(store: &mut dyn PersistenceProvider, key: &str, value: &T) -> bool {
    match ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()) {
        Ok(text) => store.save(key, &text),
        Err(e) => {
            error!("Failed to serialize {}: {}", key, e);
            false
        }
    }
}

fn load_ron<T: DeserializeOwned>(store: &dyn PersistenceProvider, key: &str) -> Option<T> {
    let text = store.load(key)?;
    match ron::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable {} save: {}", key, e);
            None
        }
    }
}

pub fn clean_up_save_load(mut timer: ResMut<AutosaveTimer>) {
    // Reset timer to default (1 minute)
    *timer = AutosaveTimer::default();
}
