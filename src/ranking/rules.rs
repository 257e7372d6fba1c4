//! Built-in ranking rules.
//!
//! # Score Convention
//! All rules return lower scores for tasks that should come first.

use super::{RankingRule, RuleScore};
use crate::models::Task;

/// Urgent tasks before everything else.
#[derive(Debug, Clone, Copy)]
pub struct UrgentFirst;

impl RankingRule for UrgentFirst {
    fn name(&self) -> &'static str {
        "URGENT"
    }

    fn evaluate(&self, task: &Task) -> RuleScore {
        if task.urgency_flag {
            0.0
        } else {
            1.0
        }
    }

    fn exact_key(&self, task: &Task) -> Option<i64> {
        Some(i64::from(!task.urgency_flag))
    }

    fn description(&self) -> &'static str {
        "Urgent First"
    }
}

/// Higher priority first.
#[derive(Debug, Clone, Copy)]
pub struct HighestPriority;

impl RankingRule for HighestPriority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, task: &Task) -> RuleScore {
        -(task.priority as f64)
    }

    fn exact_key(&self, task: &Task) -> Option<i64> {
        Some(-i64::from(task.priority))
    }

    fn description(&self) -> &'static str {
        "Highest Priority"
    }
}

/// Shortest effort first.
///
/// Prefers quick wins among equally important tasks.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct ShortestEffort;

impl RankingRule for ShortestEffort {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: &Task) -> RuleScore {
        task.estimated_effort as f64
    }

    fn exact_key(&self, task: &Task) -> Option<i64> {
        Some(task.estimated_effort)
    }

    fn description(&self) -> &'static str {
        "Shortest Effort"
    }
}

/// Longest effort first.
///
/// Useful for balancing: large items placed first pack better.
#[derive(Debug, Clone, Copy)]
pub struct LongestEffort;

impl RankingRule for LongestEffort {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, task: &Task) -> RuleScore {
        -(task.estimated_effort as f64)
    }

    fn exact_key(&self, task: &Task) -> Option<i64> {
        Some(task.estimated_effort.saturating_neg())
    }

    fn description(&self) -> &'static str {
        "Longest Effort"
    }
}
