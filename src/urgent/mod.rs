//! Urgent task dispatch.
//!
//! Places a single urgent task on the employee where it causes the least
//! disruption, searching employees with branch-and-bound. Optionally the
//! chosen employee may give up one lower-priority pending task.

mod config;
mod dispatcher;

pub use config::UrgentConfig;
pub use dispatcher::{CandidateImpact, UrgentDispatcher};

use crate::error::Result;
use crate::models::{Employee, Task, UrgentDecision};

/// Dispatches with the default configuration.
pub fn dispatch_urgent(
    urgent: &Task,
    tasks: &[Task],
    employees: &[Employee],
) -> Result<UrgentDecision> {
    UrgentDispatcher::new().dispatch(urgent, tasks, employees)
}
