use serde::{Deserialize, Serialize};

pub trait GrowthStrategy {
    /// Calculate the value for a given step. Step 0 is always the base value.
    fn calculate(&self, step: u32) -> f64;
}

/// `base + increment * step`, optionally clamped to `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearGrowth {
    /// The starting value (at step 0)
    pub base: f64,
    /// The amount added per step
    pub increment: f64,
    /// Upper bound of the curve, if any
    #[serde(default)]
    pub cap: Option<f64>,
}

impl LinearGrowth {
    pub fn new(base: f64, increment: f64) -> Self {
        Self {
            base,
            increment,
            cap: None,
        }
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl GrowthStrategy for LinearGrowth {
    fn calculate(&self, step: u32) -> f64 {
        let value = self.base + (self.increment * step as f64);
        match self.cap {
            Some(cap) => value.min(cap),
            None => value,
        }
    }
}

/// `base * factor ^ step`, used for price curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialGrowth {
    /// The starting value (at step 0)
    pub base: f64,
    /// The multiplier per step (e.g., 1.3 for +30% per level)
    pub factor: f64,
}

impl ExponentialGrowth {
    pub fn new(base: f64, factor: f64) -> Self {
        Self { base, factor }
    }

    /// Whole-unit value of the curve, rounded down. Negative results clamp to zero,
    /// values past `u64::MAX` (including infinity) saturate.
    pub fn calculate_floor(&self, step: u32) -> u64 {
        let value = self.calculate(step).floor();
        if value.is_nan() || value <= 0.0 {
            0
        } else if value >= u64::MAX as f64 {
            u64::MAX
        } else {
            value as u64
        }
    }
}

impl GrowthStrategy for ExponentialGrowth {
    fn calculate(&self, step: u32) -> f64 {
        let exponent = i32::try_from(step).unwrap_or(i32::MAX);
        self.base * self.factor.powi(exponent)
    }
}
