//! Task ranking: ranking rules, a composable ranker, and merge sort.
//!
//! The standard ordering is urgency first, then priority descending,
//! then effort ascending (quick wins), then id ascending. Ordering feeds
//! the allocator's scan order, so it is stable and fully deterministic.
//!
//! # Usage
//!
//! ```
//! use u_allocate::models::Task;
//! use u_allocate::ranking::{self, rules, Ranker, TieBreaker};
//!
//! let tasks = vec![
//!     Task::new(1).with_priority(3),
//!     Task::new(2).with_priority(9),
//! ];
//! let ranked = ranking::rank(&tasks);
//! assert_eq!(ranked[0].id, 2);
//!
//! // Custom: effort only, ties by id.
//! let ranker = Ranker::new()
//!     .with_rule(rules::ShortestEffort)
//!     .with_final_tie_breaker(TieBreaker::ById);
//! assert_eq!(ranker.rank(&tasks).len(), 2);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Knuth (1998), "The Art of Computer Programming, Vol. 3", §5.2.4

mod merge_sort;
mod ranker;
pub mod rules;

pub use merge_sort::merge_sort_by;
pub use ranker::{Ranker, TieBreaker};

use crate::models::Task;
use std::fmt::Debug;

/// Score returned by a ranking rule.
///
/// Lower scores = ranked first.
pub type RuleScore = f64;

/// A rule that scores a task for ranking.
///
/// # Score Convention
/// **Lower score = ranked earlier.**
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "URGENT", "PRIORITY").
    fn name(&self) -> &'static str;

    /// Scores a task; lower = earlier.
    fn evaluate(&self, task: &Task) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }

    /// Integer form of the score, when the rule has one.
    ///
    /// Compared exactly instead of the `f64` score, which cannot separate
    /// integers above 2^53.
    fn exact_key(&self, _task: &Task) -> Option<i64> {
        None
    }
}

/// Ranks tasks with the standard ordering.
///
/// Returns a new vector; the input is untouched. O(n log n), stable.
pub fn rank(tasks: &[Task]) -> Vec<Task> {
    Ranker::standard().rank(tasks)
}
