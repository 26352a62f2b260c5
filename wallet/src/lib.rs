use {
    achievement_events::AchievementUnlocked,
    bevy::prelude::*,
    game_config::{BalanceConfig, GameConfig},
    serde::{Deserialize, Serialize},
    states::GameState,
    std::collections::{BTreeMap, BTreeSet},
    system_schedule::GameSchedule,
    thiserror::Error,
};

/// Spendable AP plus the lifetime total (TAP) that gates stages.
#[derive(Resource, Reflect, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Resource, Default)]
#[serde(default)]
pub struct Wallet {
    pub ap: u64,
    pub tap: u64,
    pub item_levels: BTreeMap<String, u32>,
    pub unlocked_stages: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("`{item}` is already at max level {level}")]
    MaxLevel { item: String, level: u32 },
    #[error("not enough AP: cost {cost}, available {available}")]
    InsufficientAp { cost: u64, available: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub item_id: String,
    pub new_level: u32,
    pub cost: u64,
}

impl Wallet {
    pub fn earn(&mut self, amount: u64) {
        self.ap = self.ap.saturating_add(amount);
        self.tap = self.tap.saturating_add(amount);
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.ap >= cost
    }

    /// Deducts `cost` if affordable. TAP is never reduced.
    pub fn spend(&mut self, cost: u64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.ap -= cost;
        true
    }

    pub fn item_level(&self, item_id: &str) -> u32 {
        self.item_levels.get(item_id).copied().unwrap_or(0)
    }

    pub fn purchase_item(
        &mut self,
        item_id: &str,
        config: &BalanceConfig,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        let level = self.item_level(item_id);
        let unknown = || PurchaseError::UnknownItem(item_id.to_string());
        let max_level = config.max_level(item_id).ok_or_else(unknown)?;
        if level >= max_level {
            return Err(PurchaseError::MaxLevel {
                item: item_id.to_string(),
                level,
            });
        }
        let cost = config
            .calculate_item_cost(item_id, level)
            .ok_or_else(unknown)?;
        if !self.spend(cost) {
            return Err(PurchaseError::InsufficientAp {
                cost,
                available: self.ap,
            });
        }

        let new_level = level + 1;
        self.item_levels.insert(item_id.to_string(), new_level);
        Ok(PurchaseReceipt {
            item_id: item_id.to_string(),
            new_level,
            cost,
        })
    }

    pub fn is_stage_unlocked(&self, stage_id: &str, config: &BalanceConfig) -> bool {
        config.is_stage_unlocked(stage_id, self.tap)
    }
}

/// Request to buy the next level of an item.
#[derive(Debug, Clone, Event)]
pub struct BuyItem {
    pub item_id: String,
}

#[derive(Debug, Clone, Event)]
pub struct ItemPurchased {
    pub item_id: String,
    pub new_level: u32,
    pub cost: u64,
}

/// Fired once per stage, the first time TAP reaches its requirement.
#[derive(Debug, Clone, Event)]
pub struct StageUnlocked {
    pub stage_id: String,
}

pub struct WalletPlugin;

impl Plugin for WalletPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Wallet>()
            .init_resource::<Wallet>()
            .add_observer(purchase_item)
            .add_observer(credit_achievement_reward)
            .add_systems(
                Update,
                check_stage_unlocks
                    .in_set(GameSchedule::FrameEnd)
                    .run_if(in_state(GameState::Running)),
            );
    }
}

fn purchase_item(
    trigger: On<BuyItem>,
    mut commands: Commands,
    mut wallet: ResMut<Wallet>,
    config: Res<GameConfig>,
) {
    let event = trigger.event();
    match wallet.purchase_item(&event.item_id, &config) {
        Ok(receipt) => {
            info!(
                item = %receipt.item_id,
                level = receipt.new_level,
                cost = receipt.cost,
                "item purchased"
            );
            commands.trigger(ItemPurchased {
                item_id: receipt.item_id,
                new_level: receipt.new_level,
                cost: receipt.cost,
            });
        }
        Err(err) => warn!(item = %event.item_id, "purchase rejected: {err}"),
    }
}

fn credit_achievement_reward(trigger: On<AchievementUnlocked>, mut wallet: ResMut<Wallet>) {
    let event = trigger.event();
    wallet.earn(event.reward_ap);
    debug!(
        achievement = %event.achievement_id,
        reward = event.reward_ap,
        ap = wallet.ap,
        "achievement reward credited"
    );
}

fn check_stage_unlocks(
    mut commands: Commands,
    mut wallet: ResMut<Wallet>,
    config: Res<GameConfig>,
) {
    if !wallet.is_changed() && !config.is_changed() {
        return;
    }
    let newly_unlocked: Vec<String> = config
        .stages
        .unlock_requirements
        .keys()
        .filter(|stage| !wallet.unlocked_stages.contains(*stage))
        .filter(|stage| wallet.is_stage_unlocked(stage, &config))
        .cloned()
        .collect();

    for stage_id in newly_unlocked {
        info!(stage = %stage_id, tap = wallet.tap, "stage unlocked");
        wallet.unlocked_stages.insert(stage_id.clone());
        commands.trigger(StageUnlocked { stage_id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_keeps_tap() {
        let mut wallet = Wallet::default();
        wallet.earn(100);
        assert!(wallet.spend(60));
        assert!(!wallet.spend(60));
        assert_eq!(wallet.ap, 40);
        assert_eq!(wallet.tap, 100);
    }

    #[test]
    fn purchase_follows_cost_curve_and_max_level() {
        let config = BalanceConfig::default();
        let mut wallet = Wallet::default();
        wallet.earn(10_000);

        let first = wallet.purchase_item("magnet", &config).unwrap();
        assert_eq!(first.cost, 150);
        assert_eq!(first.new_level, 1);
        let second = wallet.purchase_item("magnet", &config).unwrap();
        assert_eq!(second.cost, 195);
        wallet.purchase_item("magnet", &config).unwrap();

        assert_eq!(
            wallet.purchase_item("magnet", &config),
            Err(PurchaseError::MaxLevel {
                item: "magnet".into(),
                level: 3
            })
        );
        assert_eq!(wallet.ap, 10_000 - 150 - 195 - 253);
    }

    #[test]
    fn purchase_rejections_leave_wallet_untouched() {
        let config = BalanceConfig::default();
        let mut wallet = Wallet::default();
        wallet.earn(10);

        assert_eq!(
            wallet.purchase_item("health_up", &config),
            Err(PurchaseError::InsufficientAp {
                cost: 50,
                available: 10
            })
        );
        assert_eq!(
            wallet.purchase_item("jetpack", &config),
            Err(PurchaseError::UnknownItem("jetpack".into()))
        );
        assert_eq!(wallet.ap, 10);
        assert_eq!(wallet.item_level("health_up"), 0);
    }

    #[test]
    fn stages_gate_on_tap() {
        let config = BalanceConfig::default();
        let mut wallet = Wallet::default();
        wallet.earn(600);
        wallet.spend(600);
        assert!(wallet.is_stage_unlocked("hard", &config));
        assert!(!wallet.is_stage_unlocked("very_hard", &config));
    }
}
