//! Engine facade.
//!
//! [`Engine`] bundles the ranker, allocator, balancer, and urgent
//! dispatcher behind one configuration. Every call is a pure function of
//! its snapshot: the engine holds no task or employee state, so one
//! instance can serve concurrent callers.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::allocation::{AllocationConfig, CapacityAllocator};
use crate::balancing::{BalanceConfig, WorkloadBalancer};
use crate::error::Result;
use crate::kpi::WorkloadKpi;
use crate::models::{AllocationPlan, BalancePlan, Employee, Task, UrgentDecision};
use crate::ranking::Ranker;
use crate::urgent::{UrgentConfig, UrgentDispatcher};
use crate::validation::ValidationError;

/// Configuration for all engine operations.
///
/// Loads from partial JSON; missing sections take their defaults.
///
/// ```
/// use u_allocate::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(
///     r#"{ "urgent": { "allow_preemption": true } }"#,
/// ).unwrap();
/// assert!(config.urgent.allow_preemption);
/// assert!(!config.allocation.skip_blocked_tasks);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub allocation: AllocationConfig,
    pub balance: BalanceConfig,
    pub urgent: UrgentConfig,
}

impl EngineConfig {
    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_balance(mut self, balance: BalanceConfig) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_urgent(mut self, urgent: UrgentConfig) -> Self {
        self.urgent = urgent;
        self
    }

    /// Validates every section, collecting all problems.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(mut e) = self.balance.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.urgent.validate() {
            errors.append(&mut e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Stateless allocation engine.
///
/// # Example
///
/// ```
/// use u_allocate::models::{Employee, Task};
/// use u_allocate::Engine;
///
/// let engine = Engine::default();
/// let tasks = vec![Task::new(1).with_effort(4), Task::new(2).with_effort(2)];
/// let employees = vec![Employee::new(10), Employee::new(20)];
///
/// let plan = engine.allocate(&tasks, &employees).unwrap();
/// assert_eq!(plan.total_effort(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    ranker: Ranker,
}

impl Engine {
    /// Creates an engine. Configuration problems surface as
    /// [`EngineError::InvalidInput`](crate::EngineError::InvalidInput) on
    /// the first call that uses the offending section.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ranker: Ranker::standard(),
        }
    }

    /// Replaces the ranking used by [`rank`](Self::rank) and allocation.
    pub fn with_ranker(mut self, ranker: Ranker) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranks tasks; the input is untouched.
    pub fn rank(&self, tasks: &[Task]) -> Vec<Task> {
        self.ranker.rank(tasks)
    }

    /// Assigns every eligible task to the least-loaded employee.
    pub fn allocate(&self, tasks: &[Task], employees: &[Employee]) -> Result<AllocationPlan> {
        info!(
            tasks = tasks.len(),
            employees = employees.len(),
            "allocate"
        );
        CapacityAllocator::new()
            .with_config(self.config.allocation.clone())
            .with_ranker(self.ranker.clone())
            .allocate(tasks, employees)
    }

    /// Balances with the configured default transfer budget.
    pub fn balance(&self, tasks: &[Task], employees: &[Employee]) -> Result<BalancePlan> {
        self.balance_with_budget(tasks, employees, self.config.balance.effective_budget())
    }

    /// Balances, moving at most `transfer_budget` effort off each
    /// overloaded employee.
    pub fn balance_with_budget(
        &self,
        tasks: &[Task],
        employees: &[Employee],
        transfer_budget: i64,
    ) -> Result<BalancePlan> {
        info!(
            tasks = tasks.len(),
            employees = employees.len(),
            transfer_budget,
            "balance"
        );
        WorkloadBalancer::new()
            .with_config(self.config.balance.clone())
            .balance(tasks, employees, transfer_budget)
    }

    /// Picks the minimum-impact employee for an urgent task.
    pub fn dispatch_urgent(
        &self,
        urgent: &Task,
        tasks: &[Task],
        employees: &[Employee],
    ) -> Result<UrgentDecision> {
        info!(
            task_id = urgent.id,
            employees = employees.len(),
            "dispatch urgent"
        );
        UrgentDispatcher::new()
            .with_config(self.config.urgent.clone())
            .dispatch(urgent, tasks, employees)
    }

    /// Load-distribution KPIs under the configured balance threshold.
    pub fn workload_kpi(&self, employees: &[Employee]) -> WorkloadKpi {
        WorkloadKpi::calculate_with(employees, self.config.balance.threshold)
    }
}
