//! Input validation for allocation snapshots.
//!
//! Checks structural integrity of tasks and employees before any
//! algorithm runs. Detects:
//! - Duplicate IDs
//! - Out-of-range priority, effort, efficiency, and workload
//! - Assignments to unknown employees
//! - Unknown or circular task dependencies
//! - Workloads that disagree with the tasks they are made of
//!
//! All problems are collected; nothing is coerced.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{
    Employee, EmployeeId, Task, TaskId, MAX_EFFICIENCY, MAX_PRIORITY, MIN_EFFICIENCY,
    MIN_PRIORITY,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Task priority outside `[1, 10]`.
    PriorityOutOfRange,
    /// Task effort below 1.
    InvalidEffort,
    /// Employee efficiency outside `[0.1, 2.0]` or not finite.
    EfficiencyOutOfRange,
    /// Employee workload below zero.
    NegativeWorkload,
    /// A task is assigned to an employee that doesn't exist.
    UnknownEmployee,
    /// A task depends on a task that doesn't exist.
    UnknownDependency,
    /// Dependency graph contains a cycle.
    CyclicDependency,
    /// An employee's workload differs from the sum of its open tasks.
    WorkloadMismatch,
    /// An engine setting is unusable.
    InvalidConfig,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates a single task's field ranges.
pub fn validate_task(task: &Task) -> ValidationResult {
    let mut errors = Vec::new();
    check_task_fields(task, &mut errors);
    finish(errors)
}

/// Validates a task/employee snapshot.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. No duplicate employee IDs
/// 3. Task priority in `[1, 10]` and effort `>= 1`
/// 4. Employee efficiency in `[0.1, 2.0]` and workload `>= 0`
/// 5. Every assigned task references an existing employee
///
/// Dependencies are not checked here; see [`validate_dependencies`].
pub fn validate_snapshot(tasks: &[Task], employees: &[Employee]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut employee_ids = HashSet::new();
    for e in employees {
        if !employee_ids.insert(e.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }
        check_employee_fields(e, &mut errors);
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        check_task_fields(task, &mut errors);

        if let Some(holder) = task.assigned_employee_id {
            if !employee_ids.contains(&holder) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownEmployee,
                    format!("Task {} is assigned to unknown employee {}", task.id, holder),
                ));
            }
        }
    }

    finish(errors)
}

/// Validates the task dependency graph.
///
/// Checks that every dependency references a task in `tasks` and that
/// the graph is acyclic.
pub fn validate_dependencies(tasks: &[Task]) -> ValidationResult {
    let mut errors = Vec::new();
    let ids: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    for task in tasks {
        for dep in &task.dependencies {
            if !ids.contains(dep) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependency,
                    format!("Task {} depends on unknown task {}", task.id, dep),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(tasks) {
        errors.push(cycle_err);
    }

    finish(errors)
}

/// Whether every dependency of `task` is completed in `tasks`.
///
/// Unknown dependencies count as unsatisfied.
pub fn is_ready(task: &Task, tasks: &[Task]) -> bool {
    let completed = completed_ids(tasks);
    dependencies_met(task, &completed)
}

/// Returns the tasks whose dependencies are all completed.
pub fn ready_tasks(tasks: &[Task]) -> Vec<&Task> {
    let completed = completed_ids(tasks);
    tasks
        .iter()
        .filter(|t| dependencies_met(t, &completed))
        .collect()
}

pub(crate) fn completed_ids(tasks: &[Task]) -> HashSet<TaskId> {
    tasks
        .iter()
        .filter(|t| t.is_completed())
        .map(|t| t.id)
        .collect()
}

pub(crate) fn dependencies_met(task: &Task, completed: &HashSet<TaskId>) -> bool {
    task.dependencies.iter().all(|d| completed.contains(d))
}

/// Sums open task effort per holder.
pub fn recompute_workloads(tasks: &[Task]) -> BTreeMap<EmployeeId, i64> {
    let mut loads = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.is_open()) {
        if let Some(holder) = task.assigned_employee_id {
            *loads.entry(holder).or_insert(0) += task.estimated_effort;
        }
    }
    loads
}

/// Checks that each employee's workload equals the effort of the open
/// tasks it holds.
pub fn check_workload_consistency(tasks: &[Task], employees: &[Employee]) -> ValidationResult {
    let loads = recompute_workloads(tasks);
    let errors: Vec<ValidationError> = employees
        .iter()
        .filter_map(|e| {
            let expected = loads.get(&e.id).copied().unwrap_or(0);
            (expected != e.current_workload).then(|| {
                ValidationError::new(
                    ValidationErrorKind::WorkloadMismatch,
                    format!(
                        "Employee {} reports workload {} but holds {} effort",
                        e.id, e.current_workload, expected
                    ),
                )
            })
        })
        .collect();
    finish(errors)
}

fn check_task_fields(task: &Task, errors: &mut Vec<ValidationError>) {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&task.priority) {
        errors.push(ValidationError::new(
            ValidationErrorKind::PriorityOutOfRange,
            format!(
                "Task {} has priority {} (expected {}..={})",
                task.id, task.priority, MIN_PRIORITY, MAX_PRIORITY
            ),
        ));
    }
    if task.estimated_effort < 1 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidEffort,
            format!("Task {} has effort {}", task.id, task.estimated_effort),
        ));
    }
}

fn check_employee_fields(e: &Employee, errors: &mut Vec<ValidationError>) {
    let eff = e.efficiency_score;
    if !eff.is_finite() || !(MIN_EFFICIENCY..=MAX_EFFICIENCY).contains(&eff) {
        errors.push(ValidationError::new(
            ValidationErrorKind::EfficiencyOutOfRange,
            format!(
                "Employee {} has efficiency {} (expected {}..={})",
                e.id, eff, MIN_EFFICIENCY, MAX_EFFICIENCY
            ),
        ));
    }
    if e.current_workload < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeWorkload,
            format!("Employee {} has workload {}", e.id, e.current_workload),
        ));
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists. Nodes are visited in
/// ascending id order so the reported task is deterministic.
fn detect_cycles(tasks: &[Task]) -> Option<ValidationError> {
    // prerequisite → dependents
    let mut adj: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    let mut all_ids: Vec<TaskId> = Vec::with_capacity(tasks.len());

    for task in tasks {
        all_ids.push(task.id);
        for &dep in &task.dependencies {
            adj.entry(dep).or_default().push(task.id);
        }
    }
    all_ids.sort_unstable();

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in &all_ids {
        if !visited.contains(&node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task {node}"),
            ));
        }
    }

    None
}

/// Iterative DFS from `start`; each frame holds a node and its next
/// neighbor index, so chain length never touches the call stack.
fn has_cycle_dfs(
    start: TaskId,
    adj: &HashMap<TaskId, Vec<TaskId>>,
    visited: &mut HashSet<TaskId>,
    in_stack: &mut HashSet<TaskId>,
) -> bool {
    let neighbors = |node: TaskId| adj.get(&node).map(Vec::as_slice).unwrap_or(&[]);

    visited.insert(start);
    in_stack.insert(start);
    let mut stack: Vec<(TaskId, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (node, cursor) = *frame;
        match neighbors(node).get(cursor) {
            Some(&next) => {
                frame.1 += 1;
                if in_stack.contains(&next) {
                    return true; // Back edge → cycle
                }
                if visited.insert(next) {
                    in_stack.insert(next);
                    stack.push((next, 0));
                }
            }
            None => {
                in_stack.remove(&node);
                stack.pop();
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn sample_employees() -> Vec<Employee> {
        vec![
            Employee::new(1).with_name("Ada").with_workload(5),
            Employee::new(2).with_name("Grace").with_efficiency(1.5),
        ]
    }

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(10).with_priority(5).with_effort(5).assigned_to(1),
            Task::new(11).with_priority(3).with_effort(2),
            Task::new(12)
                .with_priority(9)
                .with_effort(4)
                .with_dependency(10),
        ]
    }

    fn has_kind(errors: &[ValidationError], kind: ValidationErrorKind) -> bool {
        errors.iter().any(|e| e.kind == kind)
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(validate_snapshot(&sample_tasks(), &sample_employees()).is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![Task::new(1), Task::new(1)];
        let errors = validate_snapshot(&tasks, &sample_employees()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("task")));
    }

    #[test]
    fn test_duplicate_employee_id() {
        let employees = vec![Employee::new(1), Employee::new(1)];
        let errors = validate_snapshot(&[], &employees).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("employee")));
    }

    #[test]
    fn test_field_ranges() {
        let tasks = vec![
            Task::new(1).with_priority(0),
            Task::new(2).with_priority(11),
            Task::new(3).with_effort(0),
            Task::new(4).with_effort(-3),
        ];
        let employees = vec![
            Employee::new(1).with_efficiency(0.05),
            Employee::new(2).with_efficiency(f64::NAN),
            Employee::new(3).with_workload(-1),
        ];

        let errors = validate_snapshot(&tasks, &employees).unwrap_err();
        let count = |kind| errors.iter().filter(|e| e.kind == kind).count();
        assert_eq!(count(ValidationErrorKind::PriorityOutOfRange), 2);
        assert_eq!(count(ValidationErrorKind::InvalidEffort), 2);
        assert_eq!(count(ValidationErrorKind::EfficiencyOutOfRange), 2);
        assert_eq!(count(ValidationErrorKind::NegativeWorkload), 1);
    }

    #[test]
    fn test_efficiency_bounds_inclusive() {
        let employees = vec![
            Employee::new(1).with_efficiency(0.1),
            Employee::new(2).with_efficiency(2.0),
        ];
        assert!(validate_snapshot(&[], &employees).is_ok());
    }

    #[test]
    fn test_unknown_employee() {
        let tasks = vec![Task::new(1).assigned_to(42)];
        let errors = validate_snapshot(&tasks, &sample_employees()).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::UnknownEmployee));
    }

    #[test]
    fn test_validate_task() {
        assert!(validate_task(&Task::new(1).with_priority(10)).is_ok());
        let errors = validate_task(&Task::new(1).with_priority(0).with_effort(0)).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_unknown_dependency() {
        let tasks = vec![Task::new(1).with_dependency(99)];
        let errors = validate_dependencies(&tasks).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::UnknownDependency));
    }

    #[test]
    fn test_cyclic_dependency() {
        // 1 → 2 → 3 → 1
        let tasks = vec![
            Task::new(1).with_dependency(3),
            Task::new(2).with_dependency(1),
            Task::new(3).with_dependency(2),
        ];
        let errors = validate_dependencies(&tasks).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_no_cycle_in_chain() {
        let tasks = vec![
            Task::new(1),
            Task::new(2).with_dependency(1),
            Task::new(3).with_dependency(2).with_dependency(1),
        ];
        assert!(validate_dependencies(&tasks).is_ok());
    }

    #[test]
    fn test_long_chain_without_cycle() {
        let tasks: Vec<Task> = (1..=200_000)
            .map(|id| {
                let task = Task::new(id);
                if id > 1 {
                    task.with_dependency(id - 1)
                } else {
                    task
                }
            })
            .collect();
        assert!(validate_dependencies(&tasks).is_ok());
    }

    #[test]
    fn test_long_chain_closed_into_cycle() {
        let n = 200_000;
        let tasks: Vec<Task> = (1..=n)
            .map(|id| Task::new(id).with_dependency(if id > 1 { id - 1 } else { n }))
            .collect();
        let errors = validate_dependencies(&tasks).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_readiness() {
        let tasks = vec![
            Task::new(1).with_status(TaskStatus::Completed),
            Task::new(2),
            Task::new(3).with_dependency(1),
            Task::new(4).with_dependency(1).with_dependency(2),
            Task::new(5).with_dependency(77),
        ];
        assert!(is_ready(&tasks[2], &tasks));
        assert!(!is_ready(&tasks[3], &tasks));
        assert!(!is_ready(&tasks[4], &tasks));

        let ready: Vec<TaskId> = ready_tasks(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ready, vec![1, 2, 3]);
    }

    #[test]
    fn test_workload_consistency() {
        let tasks = vec![
            Task::new(1).with_effort(3).assigned_to(1),
            Task::new(2).with_effort(2).assigned_to(1),
            Task::new(3)
                .with_effort(9)
                .assigned_to(1)
                .with_status(TaskStatus::Completed),
            Task::new(4).with_effort(4).assigned_to(2),
        ];
        let loads = recompute_workloads(&tasks);
        assert_eq!(loads.get(&1), Some(&5));
        assert_eq!(loads.get(&2), Some(&4));

        let good = vec![
            Employee::new(1).with_workload(5),
            Employee::new(2).with_workload(4),
            Employee::new(3),
        ];
        assert!(check_workload_consistency(&tasks, &good).is_ok());

        let bad = vec![Employee::new(1).with_workload(14)];
        let errors = check_workload_consistency(&tasks, &bad).unwrap_err();
        assert!(has_kind(&errors, ValidationErrorKind::WorkloadMismatch));
    }
}
