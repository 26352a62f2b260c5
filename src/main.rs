use {
    bevy::{log::LogPlugin, prelude::*},
    core::CorePlugin,
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins.set(LogPlugin {
                filter: "error,core=info,\
                    game_config=debug,\
                    balance_compat=warn,\
                    calculation=info,\
                    cache_system=info,\
                    wallet=debug,\
                    achievements=info,\
                    achievement_integration=debug,\
                    save_load=trace"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            }),
        )
        .add_plugins(CorePlugin)
        .run();
}
