//! Greedy least-loaded allocator.
//!
//! # Algorithm
//!
//! 1. Keep tasks that are not completed and not assigned.
//! 2. Rank them (urgency, priority, effort, id).
//! 3. Build a min-heap of employees keyed by effective load.
//! 4. For each task: pop the lightest employee, give it the task, push it
//!    back at its new effective load.
//!
//! Capacity is soft: a task that fits nowhere still goes to the lightest
//! employee.
//!
//! # Complexity
//! O(n log n + n log m) where n = tasks, m = employees.
//!
//! # Reference
//! Graham (1969), "Bounds on Multiprocessing Timing Anomalies" (list scheduling)

use tracing::{debug, trace};

use super::{AllocationConfig, LoadQueue};
use crate::error::{EngineError, Result};
use crate::models::{AllocationPlan, Assignment, Employee, SkipReason, SkippedTask, Task};
use crate::ranking::Ranker;
use crate::validation::{self, completed_ids, dependencies_met};

/// Assigns unassigned tasks to the least-loaded employees.
///
/// # Example
///
/// ```
/// use u_allocate::allocation::CapacityAllocator;
/// use u_allocate::models::{Employee, Task};
///
/// let tasks = vec![Task::new(1).with_effort(5), Task::new(2).with_effort(5)];
/// let employees = vec![Employee::new(1), Employee::new(2)];
///
/// let plan = CapacityAllocator::new().allocate(&tasks, &employees).unwrap();
/// assert_eq!(plan.assignment_count(), 2);
/// assert_eq!(plan.workload_of(1), Some(5));
/// assert_eq!(plan.workload_of(2), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct CapacityAllocator {
    config: AllocationConfig,
    ranker: Ranker,
}

impl CapacityAllocator {
    /// Creates an allocator with the standard ranking.
    pub fn new() -> Self {
        Self {
            config: AllocationConfig::default(),
            ranker: Ranker::standard(),
        }
    }

    pub fn with_config(mut self, config: AllocationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the ranking used for scan order.
    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Allocates every eligible task.
    ///
    /// # Errors
    /// - [`EngineError::NoEmployeesAvailable`] if `employees` is empty
    /// - [`EngineError::InvalidInput`] if the snapshot is malformed
    pub fn allocate(&self, tasks: &[Task], employees: &[Employee]) -> Result<AllocationPlan> {
        if employees.is_empty() {
            return Err(EngineError::NoEmployeesAvailable);
        }
        validation::validate_snapshot(tasks, employees)?;

        let mut skipped = Vec::new();
        let completed = completed_ids(tasks);
        let eligible: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.is_eligible())
            .filter(|t| {
                if self.config.skip_blocked_tasks && !dependencies_met(t, &completed) {
                    skipped.push(SkippedTask {
                        task_id: t.id,
                        reason: SkipReason::DependenciesPending,
                    });
                    false
                } else {
                    true
                }
            })
            .collect();

        let ranked = self.ranker.rank_refs(&eligible);
        let mut updated: Vec<Employee> = employees.to_vec();
        let mut queue = LoadQueue::from_employees(&updated);
        let mut assignments = Vec::with_capacity(ranked.len());

        for task in ranked {
            let Some(entry) = queue.pop() else {
                break;
            };
            let employee = &mut updated[entry.slot];
            employee.current_workload += task.estimated_effort;
            trace!(
                task_id = task.id,
                employee_id = employee.id,
                load = entry.load,
                new_workload = employee.current_workload,
                "assigned task"
            );
            assignments.push(Assignment::new(
                task.id,
                employee.id,
                task.estimated_effort,
            ));
            queue.push(&updated, entry.slot);
        }

        debug!(
            assigned = assignments.len(),
            skipped = skipped.len(),
            employees = updated.len(),
            "allocation complete"
        );

        Ok(AllocationPlan {
            assignments,
            updated_employees: updated,
            skipped,
        })
    }
}

impl Default for CapacityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
