//! Task (work item) model.
//!
//! A task is an immutable snapshot of one unit of work. The engine never
//! mutates a task it was handed; it returns plans that the caller applies.

use serde::{Deserialize, Serialize};

use super::{EmployeeId, TaskId};

/// Lowest allowed task priority.
pub const MIN_PRIORITY: i32 = 1;
/// Highest allowed task priority.
pub const MAX_PRIORITY: i32 = 10;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished. Its effort no longer counts toward any workload.
    Completed,
}

/// A task snapshot.
///
/// # Invariants
/// - `priority` in `[1, 10]` (higher = more important)
/// - `estimated_effort >= 1`
/// - a completed task carries no workload weight
///
/// These are checked by [`crate::validation::validate_snapshot`], not by
/// the constructor, so malformed snapshots can still be represented and
/// reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Importance, 1..=10.
    pub priority: i32,
    /// Lifecycle state.
    #[serde(default)]
    pub status: TaskStatus,
    /// Current holder, if any.
    #[serde(default)]
    pub assigned_employee_id: Option<EmployeeId>,
    /// Tasks that must be completed before this one is ready.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Urgent tasks jump the queue and are placed by the urgent dispatcher.
    #[serde(default)]
    pub urgency_flag: bool,
    /// Load this task adds to its holder.
    pub estimated_effort: i64,
}

impl Task {
    /// Creates a pending, unassigned task with priority 1 and effort 1.
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            title: String::new(),
            priority: MIN_PRIORITY,
            status: TaskStatus::Pending,
            assigned_employee_id: None,
            dependencies: Vec::new(),
            urgency_flag: false,
            estimated_effort: 1,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_effort(mut self, effort: i64) -> Self {
        self.estimated_effort = effort;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the current holder.
    pub fn assigned_to(mut self, employee_id: EmployeeId) -> Self {
        self.assigned_employee_id = Some(employee_id);
        self
    }

    /// Adds a prerequisite task.
    pub fn with_dependency(mut self, task_id: TaskId) -> Self {
        self.dependencies.push(task_id);
        self
    }

    /// Flags the task as urgent.
    pub fn urgent(mut self) -> Self {
        self.urgency_flag = true;
        self
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.assigned_employee_id.is_some()
    }

    /// Whether the task still contributes load to its holder.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.is_completed()
    }

    /// Not completed and not assigned: a candidate for batch allocation.
    pub fn is_eligible(&self) -> bool {
        self.is_open() && !self.is_assigned()
    }

    /// Not completed and not urgent: may be relocated by the balancer.
    pub fn is_movable(&self) -> bool {
        self.is_open() && !self.urgency_flag
    }

    /// Whether this task is held by `employee_id` and still counts as load.
    pub fn is_open_on(&self, employee_id: EmployeeId) -> bool {
        self.is_open() && self.assigned_employee_id == Some(employee_id)
    }
}
