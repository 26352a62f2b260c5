use {bevy::prelude::*, std::time::Duration};

pub struct GameplayEventsPlugin;

impl Plugin for GameplayEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GameplayEvent>();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoppedBubble {
    pub bubble_type: String,
    /// Fraction of the bubble's lifetime that had elapsed when it was popped.
    pub age_ratio: f64,
    pub combo: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub victory: bool,
    pub final_score: u64,
    pub hp: u32,
    pub max_hp: u32,
    pub duration: Duration,
}

/// Stream of gameplay facts consumed by statistics and achievement tracking.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameplayEvent {
    GameStarted,
    BubblePopped { bubble: PoppedBubble, score: u64 },
    ClickMissed,
    ScoreAdded { points: u64, total: u64 },
    DamageTaken { amount: u32, hp: u32, max_hp: u32 },
    GameOver(GameOutcome),
}

/// Pops bubbles and reports the score awarded.
pub trait BubbleManager {
    fn pop_bubble(&mut self, bubble: &PoppedBubble) -> u64;
}

/// Accumulates score and reports the new running total.
pub trait ScoreManager {
    fn add_score(&mut self, points: u64) -> u64;
}

/// Ends a run. Returns `false` when the run was already over.
pub trait GameOverController {
    fn game_over(&mut self, outcome: &GameOutcome) -> bool;
}
