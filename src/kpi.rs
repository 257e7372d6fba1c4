//! Workload quality metrics (KPIs).
//!
//! Computes load-distribution indicators from an employee snapshot.
//! All load figures are effective loads (`workload / efficiency`).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Mean load | Average effective load |
//! | Variance | Population variance of effective load |
//! | Spread | max - min effective load |
//! | Imbalance ratio | max / mean (1.0 = perfectly even) |
//! | Overloaded / Underloaded | Counts outside mean ± band |

use serde::{Deserialize, Serialize};

use crate::balancing::BalanceThreshold;
use crate::models::Employee;

/// Load-distribution indicators for a set of employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadKpi {
    pub employee_count: usize,
    /// Sum of raw workloads.
    pub total_workload: i64,
    pub mean_load: f64,
    pub load_variance: f64,
    pub load_std_dev: f64,
    pub min_load: f64,
    pub max_load: f64,
    /// `max_load - min_load`.
    pub spread: f64,
    /// `max_load / mean_load`; 1.0 when the mean is zero.
    pub imbalance_ratio: f64,
    /// Employees above mean + band.
    pub overloaded: usize,
    /// Employees below mean - band.
    pub underloaded: usize,
}

impl WorkloadKpi {
    /// Computes KPIs using the default balancing threshold.
    pub fn calculate(employees: &[Employee]) -> Self {
        Self::calculate_with(employees, BalanceThreshold::default())
    }

    /// Computes KPIs, classifying over/underload with `threshold`.
    pub fn calculate_with(employees: &[Employee], threshold: BalanceThreshold) -> Self {
        let loads: Vec<f64> = employees.iter().map(Employee::effective_load).collect();
        let mean = mean(&loads);
        let variance = variance(&loads);
        let band = threshold.band(mean);

        let (min_load, max_load) = if loads.is_empty() {
            (0.0, 0.0)
        } else {
            loads
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &l| {
                    (lo.min(l), hi.max(l))
                })
        };

        let imbalance_ratio = if mean > 0.0 { max_load / mean } else { 1.0 };

        Self {
            employee_count: employees.len(),
            total_workload: employees.iter().map(|e| e.current_workload).sum(),
            mean_load: mean,
            load_variance: variance,
            load_std_dev: variance.sqrt(),
            min_load,
            max_load,
            spread: max_load - min_load,
            imbalance_ratio,
            overloaded: loads.iter().filter(|&&l| l > mean + band).count(),
            underloaded: loads.iter().filter(|&&l| l < mean - band).count(),
        }
    }

    /// Whether no overloaded/underloaded pair exists.
    pub fn is_balanced(&self) -> bool {
        self.overloaded == 0 || self.underloaded == 0
    }
}

/// Mean effective load (0.0 for no employees).
pub fn mean_effective_load(employees: &[Employee]) -> f64 {
    let loads: Vec<f64> = employees.iter().map(Employee::effective_load).collect();
    mean(&loads)
}

/// Population variance of effective load (0.0 for no employees).
pub fn effective_load_variance(employees: &[Employee]) -> f64 {
    let loads: Vec<f64> = employees.iter().map(Employee::effective_load).collect();
    variance(&loads)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_basic() {
        let employees = vec![
            Employee::new(1).with_workload(50),
            Employee::new(2).with_workload(10),
        ];
        let kpi = WorkloadKpi::calculate(&employees);
        assert_eq!(kpi.employee_count, 2);
        assert_eq!(kpi.total_workload, 60);
        assert!((kpi.mean_load - 30.0).abs() < 1e-10);
        assert!((kpi.load_variance - 400.0).abs() < 1e-10);
        assert!((kpi.load_std_dev - 20.0).abs() < 1e-10);
        assert!((kpi.spread - 40.0).abs() < 1e-10);
        assert!((kpi.imbalance_ratio - 50.0 / 30.0).abs() < 1e-10);
        assert_eq!(kpi.overloaded, 1);
        assert_eq!(kpi.underloaded, 1);
        assert!(!kpi.is_balanced());
    }

    #[test]
    fn test_kpi_uses_effective_load() {
        let employees = vec![
            Employee::new(1).with_workload(20).with_efficiency(2.0),
            Employee::new(2).with_workload(10),
        ];
        let kpi = WorkloadKpi::calculate(&employees);
        assert!((kpi.mean_load - 10.0).abs() < 1e-10);
        assert!(kpi.load_variance.abs() < 1e-10);
        assert!(kpi.is_balanced());
    }

    #[test]
    fn test_kpi_absolute_threshold() {
        let employees = vec![
            Employee::new(1).with_workload(12),
            Employee::new(2).with_workload(8),
        ];
        let tight = WorkloadKpi::calculate_with(&employees, BalanceThreshold::Absolute(1.0));
        assert_eq!((tight.overloaded, tight.underloaded), (1, 1));
        let loose = WorkloadKpi::calculate_with(&employees, BalanceThreshold::Absolute(5.0));
        assert_eq!((loose.overloaded, loose.underloaded), (0, 0));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = WorkloadKpi::calculate(&[]);
        assert_eq!(kpi.employee_count, 0);
        assert!((kpi.mean_load - 0.0).abs() < 1e-10);
        assert!((kpi.spread - 0.0).abs() < 1e-10);
        assert!((kpi.imbalance_ratio - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_helpers() {
        let employees = vec![
            Employee::new(1).with_workload(2),
            Employee::new(2).with_workload(4),
        ];
        assert!((mean_effective_load(&employees) - 3.0).abs() < 1e-10);
        assert!((effective_load_variance(&employees) - 1.0).abs() < 1e-10);
    }
}
