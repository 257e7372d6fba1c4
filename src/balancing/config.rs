//! Balancer configuration and imbalance thresholds.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Band around the mean effective load inside which an employee counts as
/// balanced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum BalanceThreshold {
    /// Fraction of the mean: `0.2` flags loads beyond mean ± 20 %.
    Relative(f64),
    /// Fixed distance from the mean, in effective-load units.
    Absolute(f64),
}

impl BalanceThreshold {
    /// Half-width of the balanced band for a given mean.
    pub fn band(&self, mean: f64) -> f64 {
        match *self {
            BalanceThreshold::Relative(fraction) => mean * fraction,
            BalanceThreshold::Absolute(distance) => distance,
        }
    }

    fn value(&self) -> f64 {
        match *self {
            BalanceThreshold::Relative(v) | BalanceThreshold::Absolute(v) => v,
        }
    }
}

impl Default for BalanceThreshold {
    fn default() -> Self {
        BalanceThreshold::Relative(0.2)
    }
}

/// Configuration for workload balancing.
///
/// # Examples
///
/// ```
/// use u_allocate::balancing::{BalanceConfig, BalanceThreshold};
///
/// let config = BalanceConfig::default()
///     .with_threshold(BalanceThreshold::Absolute(5.0))
///     .with_default_transfer_budget(40);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Over/underload band.
    pub threshold: BalanceThreshold,
    /// Transfer budget used when the caller doesn't give one.
    /// `None` = limited only by each employee's excess.
    pub default_transfer_budget: Option<i64>,
}

impl BalanceConfig {
    pub fn with_threshold(mut self, threshold: BalanceThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_default_transfer_budget(mut self, budget: i64) -> Self {
        self.default_transfer_budget = Some(budget);
        self
    }

    /// Budget to use for a call: the configured one, or unlimited.
    pub fn effective_budget(&self) -> i64 {
        self.default_transfer_budget.unwrap_or(i64::MAX)
    }

    /// Checks that the threshold is finite and non-negative and the
    /// budget is non-negative.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let t = self.threshold.value();
        if !t.is_finite() || t < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidConfig,
                format!("Balance threshold must be finite and >= 0, got {t}"),
            ));
        }
        if let Some(budget) = self.default_transfer_budget {
            if budget < 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidConfig,
                    format!("Transfer budget must be >= 0, got {budget}"),
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
