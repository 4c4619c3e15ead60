/*!
 * Simulation Statistics
 * Derived scheduling metrics, recomputed on every snapshot
 */

use super::registry::ProcessRegistry;
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

/// Scheduling metrics over the completed processes.
///
/// Holds no independent state; `compute` derives everything from the
/// registry and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Completed processes per simulated time unit
    pub throughput: f64,
    /// Percent of elapsed time the CPU was busy, capped at 100
    pub cpu_utilization: f64,
    pub completed_count: usize,
    pub total_count: usize,
}

impl Statistics {
    pub fn compute(registry: &ProcessRegistry, current_time: SimTime) -> Self {
        let completed: Vec<_> = registry.completed().collect();
        let total_count = registry.len();

        if completed.is_empty() {
            return Self {
                avg_waiting_time: 0.0,
                avg_turnaround_time: 0.0,
                avg_response_time: 0.0,
                throughput: 0.0,
                cpu_utilization: 0.0,
                completed_count: 0,
                total_count,
            };
        }

        let n = completed.len() as f64;
        let total_waiting: u64 = completed.iter().map(|p| p.waiting_time).sum();
        let total_turnaround: u64 = completed.iter().map(|p| p.turnaround_time).sum();
        let total_response: u64 = completed.iter().filter_map(|p| p.response_time).sum();

        let total_burst: u64 = registry.iter().map(|p| p.burst_time).sum();
        let cpu_utilization = if current_time > 0 {
            (total_burst as f64 / current_time as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let throughput = if current_time > 0 {
            completed.len() as f64 / current_time as f64
        } else {
            0.0
        };

        Self {
            avg_waiting_time: total_waiting as f64 / n,
            avg_turnaround_time: total_turnaround as f64 / n,
            avg_response_time: total_response as f64 / n,
            throughput,
            cpu_utilization,
            completed_count: completed.len(),
            total_count,
        }
    }
}
