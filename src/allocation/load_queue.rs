//! Min-priority queue of employees keyed by effective load.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::models::{Employee, EmployeeId};

/// A queue entry: one employee at its current effective load.
#[derive(Debug, Clone, Copy)]
pub struct LoadEntry {
    /// Effective load at push time.
    pub load: f64,
    pub employee_id: EmployeeId,
    /// Position of the employee in the caller's slice.
    pub slot: usize,
}

impl PartialEq for LoadEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LoadEntry {}

impl PartialOrd for LoadEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoadEntry {
    // Reversed: BinaryHeap is a max-heap, we want the lightest on top,
    // ties to the lowest id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .load
            .total_cmp(&self.load)
            .then_with(|| other.employee_id.cmp(&self.employee_id))
    }
}

/// Employees ordered by effective load, lightest first.
///
/// Ties are broken by employee id ascending.
#[derive(Debug, Clone, Default)]
pub struct LoadQueue {
    heap: BinaryHeap<LoadEntry>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a queue over every employee in `employees`.
    pub fn from_employees(employees: &[Employee]) -> Self {
        Self::from_slots(employees, 0..employees.len())
    }

    /// Builds a queue over the employees at the given positions.
    pub fn from_slots(employees: &[Employee], slots: impl IntoIterator<Item = usize>) -> Self {
        let heap = slots
            .into_iter()
            .map(|slot| LoadEntry {
                load: employees[slot].effective_load(),
                employee_id: employees[slot].id,
                slot,
            })
            .collect();
        Self { heap }
    }

    /// Re-inserts an employee at its current effective load.
    pub fn push(&mut self, employees: &[Employee], slot: usize) {
        self.heap.push(LoadEntry {
            load: employees[slot].effective_load(),
            employee_id: employees[slot].id,
            slot,
        });
    }

    /// Removes and returns the lightest employee.
    pub fn pop(&mut self) -> Option<LoadEntry> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&LoadEntry> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_lightest_first() {
        let employees = vec![
            Employee::new(1).with_workload(10),
            Employee::new(2).with_workload(4),
            Employee::new(3).with_workload(7),
        ];
        let mut queue = LoadQueue::from_employees(&employees);
        let order: Vec<EmployeeId> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.employee_id)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_efficiency_adjusts_order() {
        // 10 / 2.0 = 5 beats 6 / 1.0
        let employees = vec![
            Employee::new(1).with_workload(6),
            Employee::new(2).with_workload(10).with_efficiency(2.0),
        ];
        let queue = LoadQueue::from_employees(&employees);
        assert_eq!(queue.peek().map(|e| e.employee_id), Some(2));
    }

    #[test]
    fn test_ties_by_lowest_id() {
        let employees = vec![Employee::new(9), Employee::new(3), Employee::new(5)];
        let mut queue = LoadQueue::from_employees(&employees);
        assert_eq!(queue.pop().map(|e| e.employee_id), Some(3));
        assert_eq!(queue.pop().map(|e| e.employee_id), Some(5));
        assert_eq!(queue.pop().map(|e| e.employee_id), Some(9));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_reflects_new_load() {
        let mut employees = vec![Employee::new(1), Employee::new(2).with_workload(3)];
        let mut queue = LoadQueue::from_employees(&employees);

        let first = queue.pop().unwrap();
        assert_eq!(first.employee_id, 1);
        employees[first.slot].current_workload += 5;
        queue.push(&employees, first.slot);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|e| e.employee_id), Some(2));
    }

    #[test]
    fn test_from_slots_subset() {
        let employees = vec![Employee::new(1), Employee::new(2), Employee::new(3)];
        let queue = LoadQueue::from_slots(&employees, [2]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().map(|e| e.slot), Some(2));
    }
}
