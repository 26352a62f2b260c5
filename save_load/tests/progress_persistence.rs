use {
    achievements::{AchievementManager, AchievementsPlugin, validate_save_data},
    bevy::{prelude::*, state::app::StatesPlugin},
    game_config::GameConfigPlugin,
    player_stats_resources::{PlayerStatistics, PlayerStatsResourcesPlugin},
    save_load::{RonFileStore, SaveGame, SaveLoadPlugin, SaveStore},
    states::GameState,
    std::{fs, path::Path},
    system_schedule::SystemSchedulePlugin,
    wallet::{Wallet, WalletPlugin},
};

fn app(dir: &Path) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        SystemSchedulePlugin,
        GameConfigPlugin::default(),
        PlayerStatsResourcesPlugin,
        WalletPlugin,
        AchievementsPlugin,
        SaveLoadPlugin,
    ))
    .init_state::<GameState>()
    .insert_resource(SaveStore(Box::new(RonFileStore::new(dir))));
    app
}

#[test]
fn loads_saved_progress_then_runs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wallet.ron"), "(ap: 40, tap: 90)").unwrap();
    fs::write(
        dir.path().join("achievements.ron"),
        r#"(version: 1, saved_at: 0, achievements: [(id: "first_pop", unlocked: true, current: 1.0)])"#,
    )
    .unwrap();

    let mut app = app(dir.path());
    app.update();
    app.update();

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::Running);
    let wallet = app.world().resource::<Wallet>();
    assert_eq!((wallet.ap, wallet.tap), (40, 90));
    assert!(
        app.world()
            .resource::<AchievementManager>()
            .get("first_pop")
            .unwrap()
            .unlocked
    );
}

#[test]
fn corrupt_achievement_file_falls_back_to_catalog() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("achievements.ron"), "(achievements: 5)").unwrap();

    let mut app = app(dir.path());
    app.update();
    app.update();

    let manager = app.world().resource::<AchievementManager>();
    assert_eq!(manager.unlocked_count(), 0);
    assert_eq!(manager.achievements().count(), achievements::CATALOG.len());
}

#[test]
fn save_writes_every_progress_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app(dir.path());
    app.update();

    app.world_mut().resource_mut::<PlayerStatistics>().record_pop("iron", 2);
    app.world_mut().resource_mut::<Wallet>().earn(12);
    app.world_mut()
        .resource_mut::<AchievementManager>()
        .update_progress("first_pop", 1.0);
    app.world_mut().trigger(SaveGame);

    let saved = fs::read_to_string(dir.path().join("achievements.ron")).unwrap();
    let document: ron::Value = ron::from_str(&saved).unwrap();
    assert!(validate_save_data(&document));

    let wallet: Wallet =
        ron::from_str(&fs::read_to_string(dir.path().join("wallet.ron")).unwrap()).unwrap();
    assert_eq!(wallet.ap, 12);
    let stats: PlayerStatistics =
        ron::from_str(&fs::read_to_string(dir.path().join("statistics.ron")).unwrap()).unwrap();
    assert_eq!(stats.popped_by_type["iron"], 1);
}
