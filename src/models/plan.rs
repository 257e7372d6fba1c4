//! Plans returned by the engine.
//!
//! A plan is a set of deltas over the input snapshot: new task holders plus
//! the resulting employee workloads. The engine never applies a plan
//! itself; the caller commits the task and employee sides together or not
//! at all.

use serde::{Deserialize, Serialize};

use super::{Employee, EmployeeId, TaskId};

/// A task → employee assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned task.
    pub task_id: TaskId,
    /// New holder.
    pub employee_id: EmployeeId,
    /// Effort added to the holder's workload.
    pub effort: i64,
}

impl Assignment {
    pub fn new(task_id: TaskId, employee_id: EmployeeId, effort: i64) -> Self {
        Self {
            task_id,
            employee_id,
            effort,
        }
    }
}

/// A task moved from one employee to another.
///
/// The effort leaves `from_employee_id` and lands on `to_employee_id`;
/// both sides belong to the same atomic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub task_id: TaskId,
    pub from_employee_id: EmployeeId,
    pub to_employee_id: EmployeeId,
    pub effort: i64,
}

/// Why the allocator declined a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// At least one prerequisite is not completed.
    DependenciesPending,
}

/// A task reported back without an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub task_id: TaskId,
    pub reason: SkipReason,
}

/// Result of batch allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// One entry per allocated task, in ranked order.
    pub assignments: Vec<Assignment>,
    /// Every input employee with its post-plan workload, in input order.
    pub updated_employees: Vec<Employee>,
    /// Eligible tasks deliberately not assigned.
    pub skipped: Vec<SkippedTask>,
}

impl AllocationPlan {
    /// Finds the assignment for a task.
    pub fn assignment_for_task(&self, task_id: TaskId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// All assignments landing on an employee.
    pub fn assignments_for_employee(&self, employee_id: EmployeeId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect()
    }

    /// Total effort handed out by this plan.
    pub fn total_effort(&self) -> i64 {
        self.assignments.iter().map(|a| a.effort).sum()
    }

    /// Post-plan workload of an employee.
    pub fn workload_of(&self, employee_id: EmployeeId) -> Option<i64> {
        workload_of(&self.updated_employees, employee_id)
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Result of workload balancing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalancePlan {
    /// Moves to perform.
    pub reassignments: Vec<Reassignment>,
    /// Every input employee with its post-plan workload, in input order.
    pub updated_employees: Vec<Employee>,
    /// Tasks selected for transfer but left in place for lack of a
    /// destination with headroom.
    pub retained: Vec<TaskId>,
}

impl BalancePlan {
    /// Whether the plan moves nothing.
    pub fn is_empty(&self) -> bool {
        self.reassignments.is_empty()
    }

    /// Total effort moved between employees.
    pub fn moved_effort(&self) -> i64 {
        self.reassignments.iter().map(|r| r.effort).sum()
    }

    /// Finds the move for a task.
    pub fn reassignment_for_task(&self, task_id: TaskId) -> Option<&Reassignment> {
        self.reassignments.iter().find(|r| r.task_id == task_id)
    }

    /// Post-plan workload of an employee.
    pub fn workload_of(&self, employee_id: EmployeeId) -> Option<i64> {
        workload_of(&self.updated_employees, employee_id)
    }
}

/// Result of urgent dispatch.
///
/// Side effects for the caller: flag the task urgent, make `employee_id`
/// its holder, add its effort to that employee, and undo the
/// `released_from` / `displaced_task_id` sides when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrgentDecision {
    /// The urgent task.
    pub task_id: TaskId,
    /// Chosen holder.
    pub employee_id: EmployeeId,
    /// Impact score of the choice (lower is better).
    pub impact: f64,
    /// Effort the chosen employee takes on.
    pub effort: i64,
    /// Previous holder of the urgent task, if it had one.
    pub released_from: Option<EmployeeId>,
    /// Lower-priority task the chosen employee gives up, if preempting.
    pub displaced_task_id: Option<TaskId>,
}

fn workload_of(employees: &[Employee], employee_id: EmployeeId) -> Option<i64> {
    employees
        .iter()
        .find(|e| e.id == employee_id)
        .map(|e| e.current_workload)
}
