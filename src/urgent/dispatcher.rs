//! Branch-and-bound urgent dispatcher.
//!
//! # Impact
//!
//! For employee `E` taking an urgent task of effort `w`:
//!
//! ```text
//! impact(E) = (workload(E) + w) / eff(E) + congestion(open tasks on E)
//! ```
//!
//! i.e. the current effective load plus the load delta plus a congestion
//! penalty. With preemption, `E` may instead give up one pending,
//! non-urgent task `d` of lower priority:
//!
//! ```text
//! impact(E, d) = (workload(E) + w − effort(d)) / eff(E)
//!              + congestion(open − 1) + penalty · priority(d)
//! ```
//!
//! # Search
//!
//! Branches (employees) are explored in ascending lower-bound order. The
//! bound is the current effective load (and, with preemption, the cheapest
//! conceivable displacement), which never exceeds any real impact of the
//! branch. Once a bound exceeds the best impact found, that branch and all
//! later ones are pruned. Without pruning opportunities the search is an
//! exhaustive scan, which is fine for tens of employees.
//!
//! # Reference
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::UrgentConfig;
use crate::error::{EngineError, Result};
use crate::models::{effective_load, Employee, EmployeeId, Task, TaskId, TaskStatus, UrgentDecision};
use crate::validation::{self, ValidationError, ValidationErrorKind};

/// One evaluated option: an employee, optionally with a displaced task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateImpact {
    pub employee_id: EmployeeId,
    pub displaced_task_id: Option<TaskId>,
    pub impact: f64,
}

impl CandidateImpact {
    /// Lower impact first; ties by employee id, then no displacement
    /// before displacement, then displaced task id.
    fn rank(&self, other: &Self) -> Ordering {
        self.impact
            .total_cmp(&other.impact)
            .then_with(|| self.employee_id.cmp(&other.employee_id))
            .then_with(|| self.displaced_task_id.cmp(&other.displaced_task_id))
    }
}

struct Branch<'a> {
    employee: &'a Employee,
    /// Workload without the urgent task's own effort.
    base_workload: i64,
    open_tasks: usize,
    displaceable: Vec<&'a Task>,
    bound: f64,
}

/// Chooses the employee with minimal impact for an urgent task.
///
/// # Example
///
/// ```
/// use u_allocate::models::{Employee, Task};
/// use u_allocate::urgent::UrgentDispatcher;
///
/// let urgent = Task::new(99).with_effort(10).with_priority(10);
/// let tasks = vec![Task::new(1).assigned_to(2), Task::new(2).assigned_to(2)];
/// let employees = vec![Employee::new(1), Employee::new(2).with_workload(2)];
///
/// let decision = UrgentDispatcher::new().dispatch(&urgent, &tasks, &employees).unwrap();
/// assert_eq!(decision.employee_id, 1);
/// assert!((decision.impact - 10.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrgentDispatcher {
    config: UrgentConfig,
}

impl UrgentDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: UrgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &UrgentConfig {
        &self.config
    }

    /// Finds the minimum-impact placement for `urgent`.
    ///
    /// `tasks` is the current task snapshot; it may or may not contain
    /// `urgent` itself.
    ///
    /// # Errors
    /// - [`EngineError::NoEmployeesAvailable`] if `employees` is empty
    /// - [`EngineError::InvalidTaskState`] if `urgent` is completed or was
    ///   already dispatched (urgent and assigned)
    /// - [`EngineError::InvalidInput`] for a malformed snapshot or config
    pub fn dispatch(
        &self,
        urgent: &Task,
        tasks: &[Task],
        employees: &[Employee],
    ) -> Result<UrgentDecision> {
        let branches = self.prepare(urgent, tasks, employees)?;
        let total = branches.len();

        let mut best: Option<CandidateImpact> = None;
        let mut evaluated = 0usize;

        for (position, branch) in branches.iter().enumerate() {
            if let Some(incumbent) = &best {
                if branch.bound > incumbent.impact {
                    trace!(
                        employee_id = branch.employee.id,
                        bound = branch.bound,
                        best = incumbent.impact,
                        "pruned"
                    );
                    debug!(evaluated, pruned = total - position, "urgent search pruned");
                    break;
                }
            }
            evaluated += 1;
            for candidate in self.options(urgent, branch) {
                if best.map_or(true, |b| candidate.rank(&b) == Ordering::Less) {
                    best = Some(candidate);
                }
            }
        }

        // Non-empty employees always yield at least one option.
        let best = best.ok_or(EngineError::NoEmployeesAvailable)?;
        debug!(
            task_id = urgent.id,
            employee_id = best.employee_id,
            impact = best.impact,
            displaced = ?best.displaced_task_id,
            evaluated,
            "urgent task dispatched"
        );

        Ok(UrgentDecision {
            task_id: urgent.id,
            employee_id: best.employee_id,
            impact: best.impact,
            effort: urgent.estimated_effort,
            released_from: urgent.assigned_employee_id,
            displaced_task_id: best.displaced_task_id,
        })
    }

    /// Evaluates every option without pruning, best first.
    ///
    /// For explaining a decision; `dispatch` returns the first entry.
    pub fn explain(
        &self,
        urgent: &Task,
        tasks: &[Task],
        employees: &[Employee],
    ) -> Result<Vec<CandidateImpact>> {
        let branches = self.prepare(urgent, tasks, employees)?;
        let mut all: Vec<CandidateImpact> = branches
            .iter()
            .flat_map(|b| self.options(urgent, b))
            .collect();
        all.sort_by(|a, b| a.rank(b));
        Ok(all)
    }

    fn prepare<'a>(
        &self,
        urgent: &Task,
        tasks: &'a [Task],
        employees: &'a [Employee],
    ) -> Result<Vec<Branch<'a>>> {
        if employees.is_empty() {
            return Err(EngineError::NoEmployeesAvailable);
        }
        if urgent.is_completed() {
            return Err(EngineError::invalid_state(urgent.id, "task is completed"));
        }
        if urgent.urgency_flag && urgent.is_assigned() {
            return Err(EngineError::invalid_state(
                urgent.id,
                "urgent task is already dispatched",
            ));
        }

        self.config.validate()?;
        validation::validate_snapshot(tasks, employees)?;
        validation::validate_task(urgent)?;
        if let Some(holder) = urgent.assigned_employee_id {
            if !employees.iter().any(|e| e.id == holder) {
                return Err(EngineError::from(vec![ValidationError::new(
                    ValidationErrorKind::UnknownEmployee,
                    format!("Task {} is assigned to unknown employee {}", urgent.id, holder),
                )]));
            }
        }

        let mut branches: Vec<Branch<'a>> = employees
            .iter()
            .map(|e| self.branch(urgent, tasks, e))
            .collect();
        branches.sort_by(|a, b| {
            a.bound
                .total_cmp(&b.bound)
                .then_with(|| a.employee.id.cmp(&b.employee.id))
        });
        Ok(branches)
    }

    fn branch<'a>(&self, urgent: &Task, tasks: &'a [Task], employee: &'a Employee) -> Branch<'a> {
        let held: Vec<&'a Task> = tasks
            .iter()
            .filter(|t| t.id != urgent.id && t.is_open_on(employee.id))
            .collect();

        let base_workload = if urgent.assigned_employee_id == Some(employee.id) {
            (employee.current_workload - urgent.estimated_effort).max(0)
        } else {
            employee.current_workload
        };

        let displaceable: Vec<&'a Task> = if self.config.allow_preemption {
            held.iter()
                .copied()
                .filter(|t| {
                    t.status == TaskStatus::Pending
                        && !t.urgency_flag
                        && t.priority < urgent.priority
                })
                .collect()
        } else {
            Vec::new()
        };

        let eff = employee.efficiency_score;
        let mut bound = effective_load(base_workload, eff);
        if let (Some(max_effort), Some(min_priority)) = (
            displaceable.iter().map(|t| t.estimated_effort).max(),
            displaceable.iter().map(|t| t.priority).min(),
        ) {
            let cheapest = effective_load(base_workload + urgent.estimated_effort - max_effort, eff)
                + self.config.congestion_penalty(held.len() - 1)
                + self.config.preemption_penalty * min_priority as f64;
            bound = bound.min(cheapest);
        }

        Branch {
            employee,
            base_workload,
            open_tasks: held.len(),
            displaceable,
            bound,
        }
    }

    fn options(&self, urgent: &Task, branch: &Branch<'_>) -> Vec<CandidateImpact> {
        let eff = branch.employee.efficiency_score;
        let effort = urgent.estimated_effort;

        let mut options = Vec::with_capacity(1 + branch.displaceable.len());
        options.push(CandidateImpact {
            employee_id: branch.employee.id,
            displaced_task_id: None,
            impact: effective_load(branch.base_workload + effort, eff)
                + self.config.congestion_penalty(branch.open_tasks),
        });
        for displaced in &branch.displaceable {
            options.push(CandidateImpact {
                employee_id: branch.employee.id,
                displaced_task_id: Some(displaced.id),
                impact: effective_load(
                    branch.base_workload + effort - displaced.estimated_effort,
                    eff,
                ) + self.config.congestion_penalty(branch.open_tasks - 1)
                    + self.config.preemption_penalty * displaced.priority as f64,
            });
        }
        options
    }
}
