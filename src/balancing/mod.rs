//! Workload balancing.
//!
//! Moves movable tasks off overloaded employees onto underloaded ones.
//! Each overloaded employee's transfer set is a 0/1 knapsack over task
//! efforts; destinations come from a min-heap of underloaded employees.
//! Urgent and completed tasks never move.
//!
//! # Usage
//!
//! ```
//! use u_allocate::balancing::{self, BalanceConfig, BalanceThreshold, WorkloadBalancer};
//! use u_allocate::models::{Employee, Task};
//!
//! let employees = vec![Employee::new(1).with_workload(6), Employee::new(2)];
//! let tasks = vec![
//!     Task::new(1).with_effort(3).assigned_to(1),
//!     Task::new(2).with_effort(3).assigned_to(1),
//! ];
//!
//! let plan = balancing::balance(&tasks, &employees, 10).unwrap();
//! assert_eq!(plan.moved_effort(), 3);
//!
//! let strict = WorkloadBalancer::new()
//!     .with_config(BalanceConfig::default().with_threshold(BalanceThreshold::Absolute(0.5)));
//! assert!(strict.balance(&tasks, &employees, 10).is_ok());
//! ```

mod balancer;
mod config;
pub mod knapsack;

pub use balancer::WorkloadBalancer;
pub use config::{BalanceConfig, BalanceThreshold};

use crate::error::Result;
use crate::models::{BalancePlan, Employee, Task};

/// Balances with the default configuration.
pub fn balance(tasks: &[Task], employees: &[Employee], transfer_budget: i64) -> Result<BalancePlan> {
    WorkloadBalancer::new().balance(tasks, employees, transfer_budget)
}
