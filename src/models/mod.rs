//! Allocation domain models.
//!
//! Snapshot types handed to the engine and the plan types it returns.
//! Snapshots are plain values: the engine holds no state between calls.
//!
//! # Domain Mappings
//!
//! | u-allocate | Office | Support Desk | Field Service |
//! |------------|--------|--------------|---------------|
//! | Task | Work item | Ticket | Job |
//! | Employee | Staff member | Agent | Technician |
//! | Effort | Story points | Handling units | Hours |

mod employee;
mod plan;
mod task;

pub use employee::{effective_load, Employee, MAX_EFFICIENCY, MIN_EFFICIENCY};
pub use plan::{
    AllocationPlan, Assignment, BalancePlan, Reassignment, SkipReason, SkippedTask,
    UrgentDecision,
};
pub use task::{Task, TaskStatus, MAX_PRIORITY, MIN_PRIORITY};

/// Task identifier.
pub type TaskId = i64;
/// Employee identifier.
pub type EmployeeId = i64;
