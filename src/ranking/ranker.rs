//! Rule-based ranker.
//!
//! Composes ranking rules lexicographically: the next rule is consulted
//! only when all earlier rules tie.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::merge_sort::merge_sort_by;
use super::{rules, RankingRule, RuleScore};
use crate::models::Task;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (the sort is stable).
    #[default]
    InputOrder,
    /// Deterministic by task ID (ascending).
    ById,
}

/// A composable task ranker.
///
/// # Example
/// ```
/// use u_allocate::ranking::{rules, Ranker, TieBreaker};
///
/// let ranker = Ranker::new()
///     .with_rule(rules::HighestPriority)
///     .with_rule(rules::ShortestEffort)
///     .with_final_tie_breaker(TieBreaker::ById);
/// ```
#[derive(Clone)]
pub struct Ranker {
    rules: Vec<Arc<dyn RankingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl Ranker {
    /// Creates an empty ranker (keeps input order).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Urgency → priority desc → effort asc → id asc.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(rules::UrgentFirst)
            .with_rule(rules::HighestPriority)
            .with_rule(rules::ShortestEffort)
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Appends a rule.
    pub fn with_rule<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Returns indices into `tasks`, best first.
    pub fn sort_indices(&self, tasks: &[Task]) -> Vec<usize> {
        if tasks.is_empty() {
            return Vec::new();
        }
        let indices: Vec<usize> = (0..tasks.len()).collect();
        merge_sort_by(&indices, |&a, &b| self.compare(&tasks[a], &tasks[b]))
    }

    /// Returns a ranked copy of `tasks`.
    pub fn rank(&self, tasks: &[Task]) -> Vec<Task> {
        self.sort_indices(tasks)
            .into_iter()
            .map(|i| tasks[i].clone())
            .collect()
    }

    /// Ranks borrowed tasks without cloning them.
    pub fn rank_refs<'a>(&self, tasks: &[&'a Task]) -> Vec<&'a Task> {
        merge_sort_by(tasks, |a, b| self.compare(a, b))
    }

    /// Returns the index of the first-ranked task.
    pub fn select_best(&self, tasks: &[Task]) -> Option<usize> {
        self.sort_indices(tasks).first().copied()
    }

    /// Scores from each rule, in rule order.
    pub fn evaluate(&self, task: &Task) -> Vec<RuleScore> {
        self.rules.iter().map(|r| r.evaluate(task)).collect()
    }

    /// Compares two tasks (`Less` = `a` ranks first).
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        for rule in &self.rules {
            if let (Some(key_a), Some(key_b)) = (rule.exact_key(a), rule.exact_key(b)) {
                if key_a != key_b {
                    return key_a.cmp(&key_b);
                }
                continue;
            }

            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.total_cmp(&score_b);
            }
        }

        match self.tie_breaker {
            TieBreaker::InputOrder => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
