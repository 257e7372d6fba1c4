//! Urgent dispatch configuration.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Configuration for urgent dispatch.
///
/// # Examples
///
/// ```
/// use u_allocate::urgent::UrgentConfig;
///
/// let config = UrgentConfig::default()
///     .with_congestion_weight(0.5)
///     .with_preemption(true)
///     .with_preemption_penalty(3.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgentConfig {
    /// Impact added per open task the candidate already holds.
    pub congestion_weight: f64,
    /// Consider displacing one lower-priority pending task.
    pub allow_preemption: bool,
    /// Impact per priority point of a displaced task.
    pub preemption_penalty: f64,
}

impl Default for UrgentConfig {
    fn default() -> Self {
        Self {
            congestion_weight: 1.0,
            allow_preemption: false,
            preemption_penalty: 2.0,
        }
    }
}

impl UrgentConfig {
    pub fn with_congestion_weight(mut self, weight: f64) -> Self {
        self.congestion_weight = weight;
        self
    }

    pub fn with_preemption(mut self, allow: bool) -> Self {
        self.allow_preemption = allow;
        self
    }

    pub fn with_preemption_penalty(mut self, penalty: f64) -> Self {
        self.preemption_penalty = penalty;
        self
    }

    /// Congestion penalty for a candidate holding `open_tasks` tasks.
    ///
    /// Non-decreasing in `open_tasks`.
    pub fn congestion_penalty(&self, open_tasks: usize) -> f64 {
        self.congestion_weight * open_tasks as f64
    }

    /// Both weights must be finite and non-negative; a negative weight
    /// would invalidate the search bound.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("congestion_weight", self.congestion_weight),
            ("preemption_penalty", self.preemption_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidConfig,
                    format!("{name} must be finite and >= 0, got {value}"),
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
