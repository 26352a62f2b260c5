use {
    crate::catalog::{AchievementCategory, AchievementDefinition},
    serde::Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub current: f64,
    pub target: f64,
}

impl Progress {
    /// Completion in `0..=1`.
    pub fn ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

/// Live state of one catalog entry. `locked -> unlocked` is the only transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    #[serde(skip)]
    definition: &'static AchievementDefinition,
    pub unlocked: bool,
    /// Unix milliseconds of the unlock.
    pub unlocked_date: Option<i64>,
    pub progress: Progress,
}

impl Achievement {
    pub fn new(definition: &'static AchievementDefinition) -> Self {
        Self {
            definition,
            unlocked: false,
            unlocked_date: None,
            progress: Progress {
                current: 0.0,
                target: definition.condition.target,
            },
        }
    }

    pub fn definition(&self) -> &'static AchievementDefinition {
        self.definition
    }

    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    pub fn category(&self) -> AchievementCategory {
        self.definition.category
    }

    pub fn reward_ap(&self) -> u64 {
        self.definition.reward_ap
    }

    /// The statistic key this achievement tracks.
    pub fn stat(&self) -> &'static str {
        self.definition.condition.stat
    }

    pub(crate) fn is_corrupt(&self) -> bool {
        !self.progress.current.is_finite()
            || self.progress.current < 0.0
            || self.progress.target != self.definition.condition.target
            || self.unlocked != self.unlocked_date.is_some()
    }
}
