use bevy::prelude::*;

/// Fired globally the first time an achievement's progress reaches its target.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AchievementUnlocked {
    pub achievement_id: String,
    pub name: String,
    /// AP credited to the wallet.
    pub reward_ap: u64,
}
