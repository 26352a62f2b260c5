use {
    bevy::{prelude::*, time::TimeUpdateStrategy},
    cache_system::*,
    serde_json::json,
    std::time::Duration,
};

fn app_with_cache(config: CacheConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .add_plugins(CacheSystemPlugin { config });
    app
}

#[test]
fn shared_cache_expires_with_game_time() {
    let mut app = app_with_cache(CacheConfig::new(
        10,
        Duration::from_millis(250),
        Duration::from_secs(60),
    ));
    app.update();

    app.world_mut()
        .resource_mut::<SharedCache>()
        .set("score:normal", json!(15), CacheOptions::new());

    app.update();
    assert!(app.world().resource::<SharedCache>().has("score:normal"));

    for _ in 0..3 {
        app.update();
    }

    let mut cache = app.world_mut().resource_mut::<SharedCache>();
    assert_eq!(cache.get("score:normal"), None);
    assert_eq!(cache.stats().expirations, 1);
}

#[test]
fn periodic_sweep_removes_expired_entries() {
    let mut app = app_with_cache(CacheConfig::new(
        10,
        Duration::from_millis(100),
        Duration::from_millis(300),
    ));
    app.update();

    app.world_mut()
        .resource_mut::<SharedCache>()
        .set("stale", json!({"value": 1}), CacheOptions::new());

    for _ in 0..5 {
        app.update();
    }

    assert!(app.world().resource::<SharedCache>().is_empty());
}
