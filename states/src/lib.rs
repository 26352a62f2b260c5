use bevy::prelude::*;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Saved progress is being restored.
    #[default]
    Loading,
    Running,
    GameOver,
}
