//! Employee (worker) model.
//!
//! Employees are the resources tasks are assigned to. Capacity decisions
//! compare employees by *effective load*: raw workload divided by
//! efficiency, so a faster worker with the same backlog has more headroom.

use serde::{Deserialize, Serialize};

use super::EmployeeId;

/// Lowest allowed efficiency score.
pub const MIN_EFFICIENCY: f64 = 0.1;
/// Highest allowed efficiency score.
pub const MAX_EFFICIENCY: f64 = 2.0;

/// An employee snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: EmployeeId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Work rate multiplier in `[0.1, 2.0]` (1.0 = nominal).
    pub efficiency_score: f64,
    /// Sum of effort over assigned, non-completed tasks.
    #[serde(default)]
    pub current_workload: i64,
}

impl Employee {
    /// Creates an idle employee with nominal efficiency.
    pub fn new(id: EmployeeId) -> Self {
        Self {
            id,
            name: String::new(),
            efficiency_score: 1.0,
            current_workload: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency_score = efficiency;
        self
    }

    pub fn with_workload(mut self, workload: i64) -> Self {
        self.current_workload = workload;
        self
    }

    /// `current_workload / efficiency_score`.
    #[inline]
    pub fn effective_load(&self) -> f64 {
        effective_load(self.current_workload, self.efficiency_score)
    }

    /// Effective load after taking on `effort` more units.
    #[inline]
    pub fn effective_load_with(&self, effort: i64) -> f64 {
        effective_load(self.current_workload + effort, self.efficiency_score)
    }

    /// Raw effort this employee can absorb before its effective load
    /// reaches `ceiling`. Zero when already at or above it.
    pub fn headroom_below(&self, ceiling: f64) -> i64 {
        let room = ceiling * self.efficiency_score - self.current_workload as f64;
        if room <= 0.0 {
            0
        } else {
            room.floor() as i64
        }
    }
}

/// Effective load for a raw workload at a given efficiency.
#[inline]
pub fn effective_load(workload: i64, efficiency: f64) -> f64 {
    workload as f64 / efficiency
}
