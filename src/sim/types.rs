/*!
 * Simulation Types
 * Errors, command inputs, and the snapshot handed to observers
 */

use super::gantt::GanttEntry;
use super::policy::Algorithm;
use super::process::Process;
use super::stats::Statistics;
use crate::core::types::{Pid, Priority, SimTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation operation result
pub type SimResult<T> = Result<T, SimError>;

/// Semantic failures reported by the engine.
///
/// None of these stop the simulation; state is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Process not found: {0}")]
    ProcessNotFound(Pid),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Burst time must be positive, got {0}")]
    InvalidBurstTime(u64),

    #[error("Quantum must be positive, got {0}")]
    InvalidQuantum(u64),
}

/// Inputs for creating a process. Pid and color are assigned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub name: String,
    pub burst_time: u64,
    /// Defaults to the current simulated time when omitted
    #[serde(default)]
    pub arrival_time: Option<SimTime>,
    /// Defaults to mid-range (5) when omitted
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, burst_time: u64) -> Self {
        Self {
            name: name.into(),
            burst_time,
            arrival_time: None,
            priority: None,
        }
    }

    pub fn with_arrival(mut self, arrival_time: SimTime) -> Self {
        self.arrival_time = Some(arrival_time);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Immutable, consistent copy of engine state after one completed mutation.
///
/// Everything an observer needs: clock, policy identity, control flags, the
/// full process list, the merged Gantt timeline, and derived statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_time: SimTime,
    pub algorithm: Algorithm,
    pub algorithm_desc: String,
    pub is_running: bool,
    pub is_paused: bool,
    pub running_process: Option<Process>,
    pub processes: Vec<Process>,
    pub gantt_chart: Vec<GanttEntry>,
    pub statistics: Statistics,
    pub context_switches: u64,
}
