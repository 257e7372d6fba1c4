//! Allocation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for batch allocation.
///
/// # Examples
///
/// ```
/// use u_allocate::allocation::AllocationConfig;
///
/// let config = AllocationConfig::default().with_skip_blocked_tasks(true);
/// assert!(config.skip_blocked_tasks);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Report tasks with unfinished dependencies as skipped instead of
    /// assigning them. Off by default: readiness is the caller's filter.
    pub skip_blocked_tasks: bool,
}

impl AllocationConfig {
    pub fn with_skip_blocked_tasks(mut self, skip: bool) -> Self {
        self.skip_blocked_tasks = skip;
        self
    }
}
