//! Capacity allocation.
//!
//! Assigns ranked, unassigned tasks to employees one at a time, always
//! choosing the employee with the lowest effective load. Greedy and not
//! globally optimal, but deterministic for a given input.
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Pinedo (2016), "Scheduling", Ch. 5: Parallel Machine Models

mod allocator;
mod config;
mod load_queue;

pub use allocator::CapacityAllocator;
pub use config::AllocationConfig;
pub use load_queue::{LoadEntry, LoadQueue};

use crate::error::Result;
use crate::models::{AllocationPlan, Employee, Task};

/// Allocates with the default configuration.
pub fn allocate(tasks: &[Task], employees: &[Employee]) -> Result<AllocationPlan> {
    CapacityAllocator::new().allocate(tasks, employees)
}
