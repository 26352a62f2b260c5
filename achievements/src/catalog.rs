use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Score,
    Play,
    Technique,
    Collection,
    Special,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 5] = [
        AchievementCategory::Score,
        AchievementCategory::Play,
        AchievementCategory::Technique,
        AchievementCategory::Collection,
        AchievementCategory::Special,
    ];
}

/// Unlocks once the player statistic `stat` reaches `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementCondition {
    pub stat: &'static str,
    pub target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub condition: AchievementCondition,
    pub reward_ap: u64,
}

pub fn find_definition(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|definition| definition.id == id)
}

const fn def(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: AchievementCategory,
    stat: &'static str,
    target: f64,
    reward_ap: u64,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        name,
        description,
        category,
        condition: AchievementCondition { stat, target },
        reward_ap,
    }
}

use AchievementCategory::*;

pub static CATALOG: &[AchievementDefinition] = &[
    // score
    def("score_100", "Warming Up", "Earn 100 points in total", Score, "total_score", 100.0, 10),
    def("score_1k", "Point Collector", "Earn 1,000 points in total", Score, "total_score", 1_000.0, 25),
    def("score_10k", "High Roller", "Earn 10,000 points in total", Score, "total_score", 10_000.0, 50),
    def("score_50k", "Score Hoarder", "Earn 50,000 points in total", Score, "total_score", 50_000.0, 100),
    def("score_100k", "Six Figures", "Earn 100,000 points in total", Score, "total_score", 100_000.0, 200),
    def("score_500k", "Bubble Tycoon", "Earn 500,000 points in total", Score, "total_score", 500_000.0, 500),
    def("best_game_1k", "Good Run", "Score 1,000 points in a single game", Score, "best_score", 1_000.0, 30),
    def("best_game_5k", "Great Run", "Score 5,000 points in a single game", Score, "best_score", 5_000.0, 120),
    // play
    def("first_pop", "First Pop", "Pop your first bubble", Play, "bubbles_popped", 1.0, 5),
    def("pops_100", "Popper", "Pop 100 bubbles", Play, "bubbles_popped", 100.0, 15),
    def("pops_1000", "Serial Popper", "Pop 1,000 bubbles", Play, "bubbles_popped", 1_000.0, 50),
    def("pops_5000", "Pop Veteran", "Pop 5,000 bubbles", Play, "bubbles_popped", 5_000.0, 120),
    def("pops_10000", "Pop Legend", "Pop 10,000 bubbles", Play, "bubbles_popped", 10_000.0, 250),
    def("games_1", "Welcome", "Finish your first game", Play, "games_played", 1.0, 5),
    def("games_10", "Regular", "Finish 10 games", Play, "games_played", 10.0, 25),
    def("games_50", "Dedicated", "Finish 50 games", Play, "games_played", 50.0, 100),
    def("play_time_30m", "Half an Hour", "Play for 30 minutes in total", Play, "play_time_seconds", 1_800.0, 30),
    def("play_time_3h", "Marathon", "Play for 3 hours in total", Play, "play_time_seconds", 10_800.0, 150),
    // technique
    def("combo_5", "Combo Starter", "Reach a 5x combo", Technique, "max_combo", 5.0, 10),
    def("combo_10", "Combo Artist", "Reach a 10x combo", Technique, "max_combo", 10.0, 30),
    def("combo_20", "Combo Master", "Reach a 20x combo", Technique, "max_combo", 20.0, 80),
    def("combo_30", "Unbroken", "Reach a 30x combo", Technique, "max_combo", 30.0, 150),
    def("accuracy_80", "Steady Hand", "Keep 80% click accuracy", Technique, "accuracy", 80.0, 40),
    def("accuracy_95", "Sharpshooter", "Keep 95% click accuracy", Technique, "accuracy", 95.0, 120),
    def("first_win", "Victor", "Win a game", Technique, "games_won", 1.0, 20),
    def("wins_25", "Champion", "Win 25 games", Technique, "games_won", 25.0, 150),
    // collection
    def("stone_50", "Stonebreaker", "Pop 50 stone bubbles", Collection, "popped:stone", 50.0, 20),
    def("iron_50", "Ironclad", "Pop 50 iron bubbles", Collection, "popped:iron", 50.0, 40),
    def("diamond_25", "Diamond Cutter", "Pop 25 diamond bubbles", Collection, "popped:diamond", 25.0, 80),
    def("boss_5", "Boss Hunter", "Pop 5 boss bubbles", Collection, "popped:boss", 5.0, 120),
    def("rainbow_10", "Over the Rainbow", "Pop 10 rainbow bubbles", Collection, "popped:rainbow", 10.0, 60),
    def("electric_25", "Live Wire", "Pop 25 electric bubbles", Collection, "popped:electric", 25.0, 30),
    def("star_5", "Starstruck", "Pop 5 star bubbles", Collection, "popped:star", 5.0, 150),
    def("clock_10", "Time Keeper", "Pop 10 clock bubbles", Collection, "popped:clock", 10.0, 60),
    def("first_item", "Shopper", "Buy your first item level", Collection, "items_purchased", 1.0, 10),
    def("items_20", "Fully Equipped", "Buy 20 item levels", Collection, "items_purchased", 20.0, 100),
    // special
    def("flawless_1", "Untouchable", "Win a game without taking damage", Special, "flawless_wins", 1.0, 50),
    def("flawless_10", "Ghost", "Win 10 games without taking damage", Special, "flawless_wins", 10.0, 200),
    def("speed_1", "Speedrunner", "Win a game in under a minute", Special, "speed_wins", 1.0, 50),
    def("speed_10", "Lightning", "Win 10 games in under a minute", Special, "speed_wins", 10.0, 200),
    def("survivor_1", "Close Call", "Win a game with 20% HP or less", Special, "low_hp_wins", 1.0, 40),
    def("stages_3", "Explorer", "Unlock 3 stages", Special, "stages_unlocked", 3.0, 75),
];

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashSet};

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
        assert_eq!(CATALOG.len(), 42);
    }

    #[test]
    fn every_category_is_populated() {
        for category in AchievementCategory::ALL {
            assert!(CATALOG.iter().any(|d| d.category == category), "{category:?}");
        }
    }

    #[test]
    fn targets_are_positive() {
        assert!(CATALOG.iter().all(|d| d.condition.target > 0.0 && d.reward_ap > 0));
    }
}
