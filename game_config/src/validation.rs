//! Invariant checks over a [`BalanceConfig`]. Findings are collected, never raised.

use {crate::config::*, bevy::prelude::*, serde::Serialize};

pub const MAX_AGE_RANGE_MS: (u64, u64) = (5_000, 40_000);
pub const HEALTH_RANGE: (u32, u32) = (0, 10);
pub const ITEM_COST_RANGE: (u32, u32) = (20, 200);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigReport {
    pub issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, path: String, message: String) {
        self.issues.push(ConfigIssue { path, message });
    }
}

pub fn validate(config: &BalanceConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    let scores = &config.scoring.base_scores;
    let ordered: Vec<(&str, Option<u32>)> = HARDNESS_ORDER
        .iter()
        .map(|kind| (*kind, scores.get(*kind).copied()))
        .collect();
    for (kind, score) in &ordered {
        if score.is_none() {
            report.push(
                format!("scoring.base_scores.{kind}"),
                "missing base score".to_string(),
            );
        }
    }
    for pair in ordered.windows(2) {
        let ((lower_kind, Some(lower)), (upper_kind, Some(upper))) = (pair[0], pair[1]) else {
            continue;
        };
        // boss must be strictly above diamond; the rest may tie.
        let broken = if upper_kind == "boss" {
            upper <= lower
        } else {
            upper < lower
        };
        if broken {
            report.push(
                format!("scoring.base_scores.{upper_kind}"),
                format!("{upper_kind} ({upper}) scores below {lower_kind} ({lower})"),
            );
        }
    }

    let (age_min, age_max) = MAX_AGE_RANGE_MS;
    for (kind, &max_age) in &config.bubbles.max_age {
        if max_age <= age_min || max_age > age_max {
            report.push(
                format!("bubbles.max_age.{kind}"),
                format!("{max_age} ms outside ({age_min}, {age_max}]"),
            );
        }
    }

    let (health_min, health_max) = HEALTH_RANGE;
    for (kind, &health) in &config.bubbles.health {
        if health <= health_min || health > health_max {
            report.push(
                format!("bubbles.health.{kind}"),
                format!("{health} outside ({health_min}, {health_max}]"),
            );
        }
    }

    let (cost_min, cost_max) = ITEM_COST_RANGE;
    for (item, &cost) in &config.items.base_costs {
        if cost <= cost_min || cost >= cost_max {
            report.push(
                format!("items.base_costs.{item}"),
                format!("{cost} outside ({cost_min}, {cost_max})"),
            );
        }
    }

    let combo = &config.scoring.combo;
    if combo.max_multiplier < 1.0 {
        report.push(
            "scoring.combo.max_multiplier".to_string(),
            "must be at least 1.0".to_string(),
        );
    }
    if config.items.cost_multiplier < 1.0 {
        report.push(
            "items.cost_multiplier".to_string(),
            "must be at least 1.0".to_string(),
        );
    }

    for issue in &report.issues {
        warn!(path = %issue.path, message = %issue.message, "balance config issue");
    }
    report
}
