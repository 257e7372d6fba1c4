//! Task allocation and workload balancing engine.
//!
//! Decides which employee should work on which task: ranks pending work,
//! hands it to the least-loaded employees, rebalances overloaded teams, and
//! routes urgent tasks to the employee where they disrupt the least. Every
//! operation is a pure function of a task/employee snapshot and returns a
//! plan; storage is the caller's (see [`repository`]).
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Employee`, and the plans the
//!   engine returns (`AllocationPlan`, `BalancePlan`, `UrgentDecision`)
//! - **`validation`**: Snapshot integrity checks (ranges, duplicate IDs,
//!   dependency cycles, workload sums)
//! - **`ranking`**: Rule-based task ordering over a stable merge sort
//! - **`allocation`**: Greedy least-loaded assignment over a min-heap
//! - **`balancing`**: Knapsack-driven rebalancing
//! - **`urgent`**: Branch-and-bound urgent dispatch
//! - **`kpi`**: Load-distribution metrics
//! - **`repository`**: Storage trait, in-memory store, plan application
//! - **`engine`**: Configured facade over all of the above
//!
//! # Example
//!
//! ```
//! use u_allocate::models::{Employee, Task};
//! use u_allocate::Engine;
//!
//! let engine = Engine::default();
//! let tasks = vec![
//!     Task::new(1).with_priority(9).with_effort(5),
//!     Task::new(2).with_priority(3).with_effort(5),
//!     Task::new(3).with_priority(5).with_effort(5),
//! ];
//! let employees = vec![Employee::new(1), Employee::new(2), Employee::new(3)];
//!
//! let plan = engine.allocate(&tasks, &employees).unwrap();
//! assert!(plan.updated_employees.iter().all(|e| e.current_workload == 5));
//! ```
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Kellerer, Pferschy & Pisinger (2004), "Knapsack Problems"
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

pub mod allocation;
pub mod balancing;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod models;
pub mod ranking;
pub mod repository;
pub mod urgent;
pub mod validation;

pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, Result};
