//! Knapsack-driven workload balancer.
//!
//! # Algorithm
//!
//! 1. Mean effective load `μ`; band `b` from the threshold.
//!    Overloaded: load > μ + b. Underloaded: load < μ − b.
//! 2. For each overloaded employee (heaviest first), collect movable tasks
//!    (open, not urgent, effort within budget).
//! 3. Knapsack: pick the subset with the largest total effort not
//!    exceeding `min(budget, ⌊(load − μ) · efficiency⌋)`, the raw effort
//!    that brings the employee down to `μ`.
//! 4. Place picks largest first on the lightest underloaded employee that
//!    stays at or below `μ` and whose move lowers the load variance.
//!    Picks with no such destination stay put.
//!
//! Sources never drop below `μ` and destinations never rise above it, so
//! no workload goes negative and total effort is conserved.
//!
//! # Reference
//! Kellerer, Pferschy & Pisinger (2004), "Knapsack Problems"

use tracing::{debug, trace};

use super::knapsack::select_max_weight;
use super::BalanceConfig;
use crate::allocation::LoadQueue;
use crate::error::{EngineError, Result};
use crate::kpi;
use crate::models::{BalancePlan, Employee, Reassignment, Task};
use crate::ranking::{rules, Ranker, TieBreaker};
use crate::validation::{self, ValidationError, ValidationErrorKind};

const LOAD_EPSILON: f64 = 1e-9;

/// Moves tasks from overloaded to underloaded employees.
///
/// # Example
///
/// ```
/// use u_allocate::balancing::WorkloadBalancer;
/// use u_allocate::models::{Employee, Task};
///
/// let employees = vec![
///     Employee::new(1).with_workload(40),
///     Employee::new(2).with_workload(0),
/// ];
/// let tasks: Vec<Task> = (1..=4)
///     .map(|id| Task::new(id).with_effort(10).assigned_to(1))
///     .collect();
///
/// let plan = WorkloadBalancer::new().balance(&tasks, &employees, 100).unwrap();
/// assert_eq!(plan.moved_effort(), 20);
/// assert_eq!(plan.workload_of(1), Some(20));
/// assert_eq!(plan.workload_of(2), Some(20));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkloadBalancer {
    config: BalanceConfig,
}

impl WorkloadBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BalanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Balances using the configured default transfer budget.
    pub fn balance_default(&self, tasks: &[Task], employees: &[Employee]) -> Result<BalancePlan> {
        self.balance(tasks, employees, self.config.effective_budget())
    }

    /// Computes a rebalancing plan.
    ///
    /// `transfer_budget` caps the effort moved away from any single
    /// overloaded employee.
    ///
    /// # Errors
    /// - [`EngineError::InsufficientEmployees`] with fewer than 2 employees
    /// - [`EngineError::InvalidInput`] for a malformed snapshot, config, or
    ///   a negative budget
    pub fn balance(
        &self,
        tasks: &[Task],
        employees: &[Employee],
        transfer_budget: i64,
    ) -> Result<BalancePlan> {
        if employees.len() < 2 {
            return Err(EngineError::InsufficientEmployees {
                found: employees.len(),
            });
        }
        self.config.validate()?;
        if transfer_budget < 0 {
            return Err(EngineError::from(vec![ValidationError::new(
                ValidationErrorKind::InvalidConfig,
                format!("Transfer budget must be >= 0, got {transfer_budget}"),
            )]));
        }
        validation::validate_snapshot(tasks, employees)?;

        let mut updated: Vec<Employee> = employees.to_vec();
        let mean = kpi::mean_effective_load(&updated);
        let band = self.config.threshold.band(mean);

        let mut overloaded: Vec<usize> = (0..updated.len())
            .filter(|&i| updated[i].effective_load() > mean + band)
            .collect();
        let underloaded: Vec<usize> = (0..updated.len())
            .filter(|&i| updated[i].effective_load() < mean - band)
            .collect();

        if overloaded.is_empty() || underloaded.is_empty() {
            debug!(
                mean,
                band,
                overloaded = overloaded.len(),
                underloaded = underloaded.len(),
                "workload already balanced"
            );
            return Ok(BalancePlan {
                reassignments: Vec::new(),
                updated_employees: updated,
                retained: Vec::new(),
            });
        }

        overloaded.sort_by(|&a, &b| {
            updated[b]
                .effective_load()
                .total_cmp(&updated[a].effective_load())
                .then_with(|| updated[a].id.cmp(&updated[b].id))
        });

        let smallest_first = Ranker::new()
            .with_rule(rules::ShortestEffort)
            .with_final_tie_breaker(TieBreaker::ById);
        let largest_first = Ranker::new()
            .with_rule(rules::LongestEffort)
            .with_final_tie_breaker(TieBreaker::ById);

        let mut destinations = LoadQueue::from_slots(&updated, underloaded.iter().copied());
        let mut reassignments = Vec::new();
        let mut retained = Vec::new();

        for &src in &overloaded {
            let source_id = updated[src].id;
            let excess = updated[src].effective_load() - mean;
            let excess_effort = (excess * updated[src].efficiency_score).floor() as i64;
            let capacity = excess_effort.min(transfer_budget);
            if capacity <= 0 {
                continue;
            }

            let movable: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.is_open_on(source_id) && t.is_movable())
                .filter(|t| t.estimated_effort <= capacity)
                .collect();
            let movable = smallest_first.rank_refs(&movable);
            let weights: Vec<i64> = movable.iter().map(|t| t.estimated_effort).collect();
            let selection = select_max_weight(&weights, capacity);

            trace!(
                employee_id = source_id,
                capacity,
                candidates = movable.len(),
                selected = selection.total,
                "knapsack selection"
            );

            let chosen: Vec<&Task> = selection.indices.iter().map(|&i| movable[i]).collect();
            for task in largest_first.rank_refs(&chosen) {
                let effort = task.estimated_effort;
                match find_destination(&mut destinations, &updated, src, effort, mean) {
                    Some(dst) => {
                        updated[src].current_workload -= effort;
                        updated[dst].current_workload += effort;
                        destinations.push(&updated, dst);
                        reassignments.push(Reassignment {
                            task_id: task.id,
                            from_employee_id: source_id,
                            to_employee_id: updated[dst].id,
                            effort,
                        });
                    }
                    None => retained.push(task.id),
                }
            }
        }

        debug!(
            mean,
            band,
            moved = reassignments.len(),
            retained = retained.len(),
            "balancing complete"
        );

        Ok(BalancePlan {
            reassignments,
            updated_employees: updated,
            retained,
        })
    }
}

/// Pops underloaded employees until one can take `effort` while staying at
/// or below `ceiling` and lowering the variance. Rejected candidates go back
/// into the queue; the accepted one is left out for the caller to re-push.
fn find_destination(
    queue: &mut LoadQueue,
    employees: &[Employee],
    src: usize,
    effort: i64,
    ceiling: f64,
) -> Option<usize> {
    let mut rejected = Vec::new();
    let mut found = None;

    while let Some(entry) = queue.pop() {
        let fits = employees[entry.slot].effective_load_with(effort) <= ceiling + LOAD_EPSILON;
        if fits && lowers_variance(employees, src, entry.slot, effort) {
            found = Some(entry.slot);
            break;
        }
        rejected.push(entry.slot);
    }

    for slot in rejected {
        queue.push(employees, slot);
    }
    found
}

fn lowers_variance(employees: &[Employee], src: usize, dst: usize, effort: i64) -> bool {
    let before: Vec<f64> = employees.iter().map(Employee::effective_load).collect();
    let mut after = before.clone();
    after[src] = employees[src].effective_load_with(-effort);
    after[dst] = employees[dst].effective_load_with(effort);
    kpi::variance(&after) < kpi::variance(&before) - LOAD_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancing::BalanceThreshold;
    use crate::models::TaskStatus;

    fn tasks_on(holder: i64, first_id: i64, efforts: &[i64]) -> Vec<Task> {
        efforts
            .iter()
            .enumerate()
            .map(|(i, &e)| {
                Task::new(first_id + i as i64)
                    .with_effort(e)
                    .assigned_to(holder)
            })
            .collect()
    }

    fn total(employees: &[Employee]) -> i64 {
        employees.iter().map(|e| e.current_workload).sum()
    }

    #[test]
    fn test_two_employee_scenario() {
        let employees = vec![
            Employee::new(1).with_workload(50),
            Employee::new(2).with_workload(10),
        ];
        let mut tasks = tasks_on(1, 100, &[10, 10, 10, 10, 10]);
        tasks.push(Task::new(200).with_effort(10).assigned_to(2));

        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 20).unwrap();
        assert_eq!(plan.reassignments.len(), 2);
        assert_eq!(plan.workload_of(1), Some(30));
        assert_eq!(plan.workload_of(2), Some(30));
        assert!(plan.workload_of(2).unwrap() <= 50 - 20);
        assert!(plan
            .reassignments
            .iter()
            .all(|r| r.from_employee_id == 1 && r.to_employee_id == 2));
    }

    #[test]
    fn test_budget_limits_transfer() {
        let employees = vec![
            Employee::new(1).with_workload(50),
            Employee::new(2).with_workload(10),
        ];
        let tasks = tasks_on(1, 1, &[10, 10, 10, 10, 10]);

        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 10).unwrap();
        assert_eq!(plan.moved_effort(), 10);
        assert_eq!(plan.workload_of(1), Some(40));
        assert_eq!(plan.workload_of(2), Some(20));
    }

    #[test]
    fn test_zero_budget_moves_nothing() {
        let employees = vec![
            Employee::new(1).with_workload(50),
            Employee::new(2).with_workload(10),
        ];
        let tasks = tasks_on(1, 1, &[10, 10, 10, 10, 10]);
        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 0).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_insufficient_employees() {
        let err = WorkloadBalancer::new()
            .balance(&[], &[Employee::new(1)], 10)
            .unwrap_err();
        assert_eq!(err, EngineError::InsufficientEmployees { found: 1 });
    }

    #[test]
    fn test_negative_budget_rejected() {
        let employees = vec![Employee::new(1), Employee::new(2)];
        let err = WorkloadBalancer::new()
            .balance(&[], &employees, -1)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_already_balanced() {
        let employees = vec![
            Employee::new(1).with_workload(11),
            Employee::new(2).with_workload(10),
        ];
        let tasks = tasks_on(1, 1, &[11]);
        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 100).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.updated_employees, employees);
    }

    #[test]
    fn test_urgent_and_completed_never_move() {
        let employees = vec![
            Employee::new(1).with_workload(40),
            Employee::new(2).with_workload(0),
        ];
        let tasks = vec![
            Task::new(1).with_effort(20).assigned_to(1).urgent(),
            Task::new(2).with_effort(20).assigned_to(1).urgent(),
            Task::new(3)
                .with_effort(5)
                .assigned_to(1)
                .with_status(TaskStatus::Completed),
        ];
        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 100).unwrap();
        assert!(plan.is_empty());
        assert!(plan.retained.is_empty());
    }

    #[test]
    fn test_no_headroom_retains_task() {
        // Slow employee 3 fills up after one task.
        let employees = vec![
            Employee::new(1).with_workload(40),
            Employee::new(2).with_workload(20),
            Employee::new(3).with_efficiency(0.5),
        ];
        let tasks = tasks_on(1, 1, &[10, 10, 10, 10]);

        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 100).unwrap();
        assert_eq!(plan.reassignments.len(), 1);
        assert_eq!(plan.retained.len(), 1);
        assert_eq!(plan.workload_of(1), Some(30));
        assert_eq!(plan.workload_of(3), Some(10));
    }

    #[test]
    fn test_efficiency_scales_excess() {
        let employees = vec![
            Employee::new(1).with_workload(40).with_efficiency(2.0),
            Employee::new(2).with_workload(0).with_efficiency(1.0),
            Employee::new(3).with_workload(10).with_efficiency(1.0),
        ];
        // loads 20, 0, 10 → mean 10; employee 1 must shed 10 effective = 20 raw
        let tasks = tasks_on(1, 1, &[5, 5, 5, 5, 5, 5, 5, 5]);
        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 100).unwrap();

        assert_eq!(plan.workload_of(1), Some(30));
        assert_eq!(plan.workload_of(2), Some(10));
        assert_eq!(total(&plan.updated_employees), total(&employees));
    }

    #[test]
    fn test_conservation_and_variance() {
        let employees = vec![
            Employee::new(1).with_workload(45).with_efficiency(1.2),
            Employee::new(2).with_workload(3).with_efficiency(0.7),
            Employee::new(3).with_workload(30),
            Employee::new(4).with_workload(0).with_efficiency(1.9),
        ];
        let mut tasks = tasks_on(1, 1, &[9, 8, 7, 6, 5, 4, 3, 2, 1]);
        tasks.extend(tasks_on(2, 20, &[3]));
        tasks.extend(tasks_on(3, 30, &[12, 11, 7]));

        let plan = WorkloadBalancer::new().balance(&tasks, &employees, 1_000).unwrap();
        assert_eq!(total(&plan.updated_employees), total(&employees));
        assert!(plan.updated_employees.iter().all(|e| e.current_workload >= 0));
        assert!(
            kpi::effective_load_variance(&plan.updated_employees)
                <= kpi::effective_load_variance(&employees) + 1e-9
        );
    }

    #[test]
    fn test_absolute_threshold() {
        let employees = vec![
            Employee::new(1).with_workload(14),
            Employee::new(2).with_workload(6),
        ];
        let tasks = tasks_on(1, 1, &[2, 2, 2, 2, 2, 2, 2]);

        let loose = WorkloadBalancer::new()
            .with_config(BalanceConfig::default().with_threshold(BalanceThreshold::Absolute(5.0)));
        assert!(loose.balance(&tasks, &employees, 100).unwrap().is_empty());

        let tight = WorkloadBalancer::new()
            .with_config(BalanceConfig::default().with_threshold(BalanceThreshold::Absolute(1.0)));
        let plan = tight.balance(&tasks, &employees, 100).unwrap();
        assert_eq!(plan.workload_of(1), Some(10));
        assert_eq!(plan.workload_of(2), Some(10));
    }

    #[test]
    fn test_huge_efforts_with_unlimited_budget() {
        let employees = vec![
            Employee::new(1).with_workload(30_000_000_000),
            Employee::new(2),
        ];
        let tasks = tasks_on(1, 1, &[10_000_000_000; 3]);

        let plan = WorkloadBalancer::new().balance_default(&tasks, &employees).unwrap();
        assert_eq!(plan.reassignments.len(), 1);
        assert_eq!(plan.workload_of(1), Some(20_000_000_000));
        assert_eq!(plan.workload_of(2), Some(10_000_000_000));
    }

    #[test]
    fn test_balance_default_uses_config_budget() {
        let employees = vec![
            Employee::new(1).with_workload(50),
            Employee::new(2).with_workload(10),
        ];
        let tasks = tasks_on(1, 1, &[10, 10, 10, 10, 10]);
        let balancer = WorkloadBalancer::new()
            .with_config(BalanceConfig::default().with_default_transfer_budget(10));
        let plan = balancer.balance_default(&tasks, &employees).unwrap();
        assert_eq!(plan.moved_effort(), 10);
    }
}
