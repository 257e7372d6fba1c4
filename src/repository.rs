//! Task and employee storage, and plan application.
//!
//! The engine computes plans from snapshots; this module is where a plan
//! meets state. [`Repository`] abstracts the store so hosts can back it
//! with a database; [`InMemoryRepository`] serves tests and embedded use.
//!
//! The `apply_*` helpers check every id a plan touches before writing
//! anything, then write the task and employee sides together. A stale
//! plan (a task that moved since the snapshot) is rejected whole.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::models::{
    AllocationPlan, BalancePlan, Employee, EmployeeId, Task, TaskId, TaskStatus, UrgentDecision,
};

/// Failures while reading or writing through a repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// The plan no longer matches stored state.
    #[error("Plan does not match stored state: {0}")]
    InvalidPlan(String),
}

/// Storage contract for tasks and employees.
pub trait Repository {
    fn get_task(&self, id: TaskId) -> Option<Task>;

    /// All tasks, ordered by id.
    fn list_tasks(&self) -> Vec<Task>;

    /// Inserts or replaces by id.
    fn upsert_task(&mut self, task: Task);

    fn get_employee(&self, id: EmployeeId) -> Option<Employee>;

    /// All employees, ordered by id.
    fn list_employees(&self) -> Vec<Employee>;

    /// Inserts or replaces by id.
    fn upsert_employee(&mut self, employee: Employee);

    /// Current state as engine input.
    fn snapshot(&self) -> (Vec<Task>, Vec<Employee>) {
        (self.list_tasks(), self.list_employees())
    }
}

/// Map-backed repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tasks: BTreeMap<TaskId, Task>,
    employees: BTreeMap<EmployeeId, Employee>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a repository; later duplicates replace earlier ones.
    pub fn with_data(
        tasks: impl IntoIterator<Item = Task>,
        employees: impl IntoIterator<Item = Employee>,
    ) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            employees: employees.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }
}

impl Repository for InMemoryRepository {
    fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn list_tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn upsert_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    fn get_employee(&self, id: EmployeeId) -> Option<Employee> {
        self.employees.get(&id).cloned()
    }

    fn list_employees(&self) -> Vec<Employee> {
        self.employees.values().cloned().collect()
    }

    fn upsert_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }
}

/// Staged writes, flushed only after every check passed.
struct Staging {
    tasks: BTreeMap<TaskId, Task>,
    employees: BTreeMap<EmployeeId, Employee>,
}

impl Staging {
    fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            employees: BTreeMap::new(),
        }
    }

    fn task<R: Repository + ?Sized>(
        &mut self,
        repo: &R,
        id: TaskId,
    ) -> Result<&mut Task, RepositoryError> {
        if !self.tasks.contains_key(&id) {
            let task = repo.get_task(id).ok_or(RepositoryError::TaskNotFound(id))?;
            self.tasks.insert(id, task);
        }
        self.tasks.get_mut(&id).ok_or(RepositoryError::TaskNotFound(id))
    }

    fn employee<R: Repository + ?Sized>(
        &mut self,
        repo: &R,
        id: EmployeeId,
    ) -> Result<&mut Employee, RepositoryError> {
        if !self.employees.contains_key(&id) {
            let employee = repo
                .get_employee(id)
                .ok_or(RepositoryError::EmployeeNotFound(id))?;
            self.employees.insert(id, employee);
        }
        self.employees
            .get_mut(&id)
            .ok_or(RepositoryError::EmployeeNotFound(id))
    }

    fn commit<R: Repository + ?Sized>(self, repo: &mut R) {
        for task in self.tasks.into_values() {
            repo.upsert_task(task);
        }
        for employee in self.employees.into_values() {
            repo.upsert_employee(employee);
        }
    }
}

/// Writes an allocation plan: each task gets its holder and each holder
/// gains the task's effort.
///
/// # Errors
/// Unknown ids, or a task that is no longer open and unassigned.
pub fn apply_allocation<R: Repository + ?Sized>(
    repo: &mut R,
    plan: &AllocationPlan,
) -> Result<(), RepositoryError> {
    let mut staging = Staging::new();
    for a in &plan.assignments {
        let task = staging.task(&*repo, a.task_id)?;
        if !task.is_eligible() {
            return Err(RepositoryError::InvalidPlan(format!(
                "task {} is no longer open and unassigned",
                a.task_id
            )));
        }
        task.assigned_employee_id = Some(a.employee_id);
        staging.employee(&*repo, a.employee_id)?.current_workload += a.effort;
    }
    debug!(assignments = plan.assignments.len(), "allocation applied");
    staging.commit(repo);
    Ok(())
}

/// Writes a balance plan: each task changes holder and its effort moves
/// with it.
///
/// # Errors
/// Unknown ids, or a task no longer held by the plan's source employee.
pub fn apply_balance<R: Repository + ?Sized>(
    repo: &mut R,
    plan: &BalancePlan,
) -> Result<(), RepositoryError> {
    let mut staging = Staging::new();
    for r in &plan.reassignments {
        let task = staging.task(&*repo, r.task_id)?;
        if !task.is_open_on(r.from_employee_id) {
            return Err(RepositoryError::InvalidPlan(format!(
                "task {} is not open on employee {}",
                r.task_id, r.from_employee_id
            )));
        }
        task.assigned_employee_id = Some(r.to_employee_id);
        staging.employee(&*repo, r.from_employee_id)?.current_workload -= r.effort;
        staging.employee(&*repo, r.to_employee_id)?.current_workload += r.effort;
    }
    debug!(reassignments = plan.reassignments.len(), "balance applied");
    staging.commit(repo);
    Ok(())
}

/// Writes an urgent decision for `urgent`, which need not be stored yet.
///
/// The task is flagged urgent and handed to the chosen employee; the
/// previous holder (if any) gives up its effort, and a displaced task (if
/// any) becomes unassigned with its effort released.
///
/// # Errors
/// Unknown ids, or a decision made for a different task.
pub fn apply_urgent<R: Repository + ?Sized>(
    repo: &mut R,
    urgent: &Task,
    decision: &UrgentDecision,
) -> Result<(), RepositoryError> {
    if decision.task_id != urgent.id {
        return Err(RepositoryError::InvalidPlan(format!(
            "decision is for task {}, not {}",
            decision.task_id, urgent.id
        )));
    }

    let mut staging = Staging::new();
    let mut task = repo.get_task(urgent.id).unwrap_or_else(|| urgent.clone());
    if task.assigned_employee_id != decision.released_from {
        return Err(RepositoryError::InvalidPlan(format!(
            "task {} changed holder since dispatch",
            urgent.id
        )));
    }

    if let Some(previous) = decision.released_from {
        staging.employee(&*repo, previous)?.current_workload -= decision.effort;
    }
    staging.employee(&*repo, decision.employee_id)?.current_workload += decision.effort;

    if let Some(displaced_id) = decision.displaced_task_id {
        let displaced = staging.task(&*repo, displaced_id)?;
        if !displaced.is_open_on(decision.employee_id) {
            return Err(RepositoryError::InvalidPlan(format!(
                "displaced task {} is not open on employee {}",
                displaced_id, decision.employee_id
            )));
        }
        displaced.assigned_employee_id = None;
        let effort = displaced.estimated_effort;
        staging.employee(&*repo, decision.employee_id)?.current_workload -= effort;
    }

    task.urgency_flag = true;
    task.assigned_employee_id = Some(decision.employee_id);
    staging.tasks.insert(task.id, task);

    debug!(
        task_id = decision.task_id,
        employee_id = decision.employee_id,
        "urgent decision applied"
    );
    staging.commit(repo);
    Ok(())
}

/// Marks a task completed and releases its effort from the holder.
///
/// The holder's workload is clamped at zero. Completing a completed task
/// is a no-op.
pub fn complete_task<R: Repository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
) -> Result<(), RepositoryError> {
    let mut staging = Staging::new();
    let task = staging.task(&*repo, task_id)?;
    if task.is_completed() {
        return Ok(());
    }
    task.status = TaskStatus::Completed;
    let holder = task.assigned_employee_id;
    let effort = task.estimated_effort;

    if let Some(holder) = holder {
        let employee = staging.employee(&*repo, holder)?;
        employee.current_workload = (employee.current_workload - effort).max(0);
    }
    staging.commit(repo);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Reassignment};
    use crate::validation::check_workload_consistency;

    fn seeded() -> InMemoryRepository {
        InMemoryRepository::with_data(
            vec![
                Task::new(1).with_effort(5),
                Task::new(2).with_effort(3).assigned_to(10),
                Task::new(3).with_effort(4).assigned_to(10),
            ],
            vec![Employee::new(10).with_workload(7), Employee::new(20)],
        )
    }

    fn assert_consistent(repo: &InMemoryRepository) {
        let (tasks, employees) = repo.snapshot();
        assert!(check_workload_consistency(&tasks, &employees).is_ok());
    }

    #[test]
    fn test_crud() {
        let mut repo = InMemoryRepository::new();
        repo.upsert_task(Task::new(2));
        repo.upsert_task(Task::new(1));
        repo.upsert_employee(Employee::new(5));
        assert_eq!(repo.task_count(), 2);
        assert_eq!(repo.list_tasks()[0].id, 1);
        assert!(repo.get_employee(5).is_some());
        assert!(repo.get_task(9).is_none());

        repo.upsert_task(Task::new(1).with_priority(7));
        assert_eq!(repo.get_task(1).unwrap().priority, 7);
        assert_eq!(repo.task_count(), 2);
    }

    #[test]
    fn test_apply_allocation() {
        let mut repo = seeded();
        let plan = AllocationPlan {
            assignments: vec![Assignment::new(1, 20, 5)],
            ..Default::default()
        };
        apply_allocation(&mut repo, &plan).unwrap();
        assert_eq!(repo.get_task(1).unwrap().assigned_employee_id, Some(20));
        assert_eq!(repo.get_employee(20).unwrap().current_workload, 5);
        assert_consistent(&repo);
    }

    #[test]
    fn test_apply_allocation_is_all_or_nothing() {
        let mut repo = seeded();
        let plan = AllocationPlan {
            assignments: vec![Assignment::new(1, 20, 5), Assignment::new(99, 20, 1)],
            ..Default::default()
        };
        let err = apply_allocation(&mut repo, &plan).unwrap_err();
        assert_eq!(err, RepositoryError::TaskNotFound(99));
        assert_eq!(repo.get_task(1).unwrap().assigned_employee_id, None);
        assert_eq!(repo.get_employee(20).unwrap().current_workload, 0);
    }

    #[test]
    fn test_apply_allocation_stale() {
        let mut repo = seeded();
        let plan = AllocationPlan {
            assignments: vec![Assignment::new(2, 20, 3)],
            ..Default::default()
        };
        assert!(matches!(
            apply_allocation(&mut repo, &plan),
            Err(RepositoryError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_apply_balance() {
        let mut repo = seeded();
        let plan = BalancePlan {
            reassignments: vec![Reassignment {
                task_id: 3,
                from_employee_id: 10,
                to_employee_id: 20,
                effort: 4,
            }],
            ..Default::default()
        };
        apply_balance(&mut repo, &plan).unwrap();
        assert_eq!(repo.get_task(3).unwrap().assigned_employee_id, Some(20));
        assert_eq!(repo.get_employee(10).unwrap().current_workload, 3);
        assert_eq!(repo.get_employee(20).unwrap().current_workload, 4);
        assert_consistent(&repo);

        // Replaying the same plan is stale.
        assert!(apply_balance(&mut repo, &plan).is_err());
    }

    #[test]
    fn test_apply_urgent_new_task() {
        let mut repo = seeded();
        let urgent = Task::new(50).with_effort(6);
        let decision = UrgentDecision {
            task_id: 50,
            employee_id: 20,
            impact: 6.0,
            effort: 6,
            released_from: None,
            displaced_task_id: None,
        };
        apply_urgent(&mut repo, &urgent, &decision).unwrap();
        let stored = repo.get_task(50).unwrap();
        assert!(stored.urgency_flag);
        assert_eq!(stored.assigned_employee_id, Some(20));
        assert_eq!(repo.get_employee(20).unwrap().current_workload, 6);
        assert_consistent(&repo);
    }

    #[test]
    fn test_apply_urgent_with_release_and_displacement() {
        let mut repo = seeded();
        repo.upsert_task(Task::new(4).with_effort(2).assigned_to(20));
        repo.upsert_employee(Employee::new(20).with_workload(2));

        let urgent = repo.get_task(2).unwrap();
        let decision = UrgentDecision {
            task_id: 2,
            employee_id: 20,
            impact: 3.0,
            effort: 3,
            released_from: Some(10),
            displaced_task_id: Some(4),
        };
        apply_urgent(&mut repo, &urgent, &decision).unwrap();
        assert_eq!(repo.get_employee(10).unwrap().current_workload, 4);
        assert_eq!(repo.get_employee(20).unwrap().current_workload, 3);
        assert_eq!(repo.get_task(4).unwrap().assigned_employee_id, None);
        assert_consistent(&repo);
    }

    #[test]
    fn test_apply_urgent_mismatched_task() {
        let mut repo = seeded();
        let decision = UrgentDecision {
            task_id: 7,
            employee_id: 20,
            impact: 0.0,
            effort: 1,
            released_from: None,
            displaced_task_id: None,
        };
        assert!(apply_urgent(&mut repo, &Task::new(1), &decision).is_err());
    }

    #[test]
    fn test_complete_task_releases_effort() {
        let mut repo = seeded();
        complete_task(&mut repo, 2).unwrap();
        assert_eq!(repo.get_task(2).unwrap().status, TaskStatus::Completed);
        assert_eq!(repo.get_employee(10).unwrap().current_workload, 4);
        assert_consistent(&repo);

        complete_task(&mut repo, 2).unwrap();
        assert_eq!(repo.get_employee(10).unwrap().current_workload, 4);
    }

    #[test]
    fn test_complete_task_clamps_at_zero() {
        let mut repo = InMemoryRepository::with_data(
            vec![Task::new(1).with_effort(10).assigned_to(1)],
            vec![Employee::new(1).with_workload(4)],
        );
        complete_task(&mut repo, 1).unwrap();
        assert_eq!(repo.get_employee(1).unwrap().current_workload, 0);
        assert_eq!(
            complete_task(&mut repo, 8),
            Err(RepositoryError::TaskNotFound(8))
        );
    }
}
