/*!
 * Scheduling Policies
 * The SchedulingPolicy capability and its five implementations
 */

use super::process::Process;
use crate::core::limits::DEFAULT_QUANTUM;
use crate::core::types::{Pid, SimTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag identifying a scheduling algorithm, in its wire spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "FCFS")]
    Fcfs,
    #[serde(rename = "SJF")]
    Sjf,
    #[serde(rename = "SRTF")]
    Srtf,
    #[serde(rename = "PRIORITY")]
    Priority,
    #[serde(rename = "RR")]
    RoundRobin,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::Sjf => "SJF",
            Algorithm::Srtf => "SRTF",
            Algorithm::Priority => "PRIORITY",
            Algorithm::RoundRobin => "RR",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FCFS" => Ok(Algorithm::Fcfs),
            "SJF" => Ok(Algorithm::Sjf),
            "SRTF" => Ok(Algorithm::Srtf),
            "PRIORITY" => Ok(Algorithm::Priority),
            "RR" => Ok(Algorithm::RoundRobin),
            _ => Err(()),
        }
    }
}

/// Capability implemented by every scheduling algorithm.
///
/// `select_next` picks from the READY set; `time_slice` says how many units
/// the engine may run the pick before reconsidering. Selection must be
/// deterministic: ties always break by (criterion..., arrival_time, pid).
pub trait SchedulingPolicy: Send {
    fn algorithm(&self) -> Algorithm;

    fn description(&self) -> String;

    fn select_next(&mut self, ready: &[&Process], now: SimTime) -> Option<Pid>;

    fn time_slice(&self, process: &Process) -> u64;

    fn is_preemptive(&self) -> bool {
        false
    }

    /// Clear any rotation state carried between selections
    fn reset(&mut self) {}
}

/// First Come First Served: arrival order, run to completion
#[derive(Debug, Default)]
pub struct Fcfs;

impl SchedulingPolicy for Fcfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fcfs
    }

    fn description(&self) -> String {
        "First Come First Served - processes run in arrival order".into()
    }

    fn select_next(&mut self, ready: &[&Process], _now: SimTime) -> Option<Pid> {
        ready
            .iter()
            .min_by_key(|p| (p.arrival_time, p.pid))
            .map(|p| p.pid)
    }

    fn time_slice(&self, process: &Process) -> u64 {
        process.remaining_time
    }
}

/// Shortest Job First: least remaining work, run to completion
#[derive(Debug, Default)]
pub struct Sjf;

impl SchedulingPolicy for Sjf {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sjf
    }

    fn description(&self) -> String {
        "Shortest Job First - the shortest job runs to completion".into()
    }

    fn select_next(&mut self, ready: &[&Process], _now: SimTime) -> Option<Pid> {
        ready
            .iter()
            .min_by_key(|p| (p.remaining_time, p.arrival_time, p.pid))
            .map(|p| p.pid)
    }

    fn time_slice(&self, process: &Process) -> u64 {
        process.remaining_time
    }
}

/// Shortest Remaining Time First: preemptive SJF, re-evaluated every tick
#[derive(Debug, Default)]
pub struct Srtf;

impl SchedulingPolicy for Srtf {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Srtf
    }

    fn description(&self) -> String {
        "Shortest Remaining Time First - preemptive SJF".into()
    }

    fn select_next(&mut self, ready: &[&Process], _now: SimTime) -> Option<Pid> {
        ready
            .iter()
            .min_by_key(|p| (p.remaining_time, p.arrival_time, p.pid))
            .map(|p| p.pid)
    }

    fn time_slice(&self, _process: &Process) -> u64 {
        // A one-unit slice forces re-selection at every tick boundary
        1
    }

    fn is_preemptive(&self) -> bool {
        true
    }
}

/// Priority scheduling: most urgent (lowest number) first, non-preemptive
#[derive(Debug, Default)]
pub struct PriorityPolicy;

impl SchedulingPolicy for PriorityPolicy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Priority
    }

    fn description(&self) -> String {
        "Priority Scheduling - the most urgent process runs first".into()
    }

    fn select_next(&mut self, ready: &[&Process], _now: SimTime) -> Option<Pid> {
        ready
            .iter()
            .min_by_key(|p| (p.priority, p.arrival_time, p.pid))
            .map(|p| p.pid)
    }

    fn time_slice(&self, process: &Process) -> u64 {
        process.remaining_time
    }
}

/// Round Robin: fair circular rotation with a fixed quantum.
///
/// Tracks the pid that last ran so selection resumes immediately after it in
/// arrival order, wrapping at the end of the ready set.
#[derive(Debug)]
pub struct RoundRobin {
    quantum: u64,
    last_pid: Option<Pid>,
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            last_pid: None,
        }
    }
}

impl RoundRobin {
    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    pub fn set_quantum(&mut self, quantum: u64) {
        self.quantum = quantum;
    }
}

impl SchedulingPolicy for RoundRobin {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RoundRobin
    }

    fn description(&self) -> String {
        format!(
            "Round Robin - each process runs for {} time units",
            self.quantum
        )
    }

    fn select_next(&mut self, ready: &[&Process], _now: SimTime) -> Option<Pid> {
        if ready.is_empty() {
            return None;
        }

        let mut rotation: Vec<&Process> = ready.to_vec();
        rotation.sort_by_key(|p| (p.arrival_time, p.pid));

        let index = match self.last_pid {
            Some(last) => rotation
                .iter()
                .position(|p| p.pid == last)
                .map(|i| (i + 1) % rotation.len())
                .unwrap_or(0),
            None => 0,
        };

        let selected = rotation[index].pid;
        self.last_pid = Some(selected);
        Some(selected)
    }

    fn time_slice(&self, process: &Process) -> u64 {
        self.quantum.min(process.remaining_time)
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.last_pid = None;
    }
}

/// Registry of one policy instance per algorithm.
///
/// Keeping all five alive means Round-Robin retains its configured quantum
/// across algorithm switches, like the original system did.
pub struct PolicySet {
    active: Algorithm,
    fcfs: Fcfs,
    sjf: Sjf,
    srtf: Srtf,
    priority: PriorityPolicy,
    round_robin: RoundRobin,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            active: Algorithm::Fcfs,
            fcfs: Fcfs,
            sjf: Sjf,
            srtf: Srtf,
            priority: PriorityPolicy,
            round_robin: RoundRobin::default(),
        }
    }
}

impl PolicySet {
    pub fn active(&self) -> Algorithm {
        self.active
    }

    pub fn active_policy(&mut self) -> &mut dyn SchedulingPolicy {
        match self.active {
            Algorithm::Fcfs => &mut self.fcfs,
            Algorithm::Sjf => &mut self.sjf,
            Algorithm::Srtf => &mut self.srtf,
            Algorithm::Priority => &mut self.priority,
            Algorithm::RoundRobin => &mut self.round_robin,
        }
    }

    pub fn active_policy_ref(&self) -> &dyn SchedulingPolicy {
        match self.active {
            Algorithm::Fcfs => &self.fcfs,
            Algorithm::Sjf => &self.sjf,
            Algorithm::Srtf => &self.srtf,
            Algorithm::Priority => &self.priority,
            Algorithm::RoundRobin => &self.round_robin,
        }
    }

    pub fn is_preemptive(&self) -> bool {
        self.active_policy_ref().is_preemptive()
    }

    pub fn description(&self) -> String {
        self.active_policy_ref().description()
    }

    /// Switch the active algorithm. Entering or leaving Round-Robin clears
    /// its rotation state.
    pub fn set_active(&mut self, algorithm: Algorithm) {
        let was_rr = self.active == Algorithm::RoundRobin;
        let is_rr = algorithm == Algorithm::RoundRobin;
        if was_rr != is_rr {
            self.round_robin.reset();
        }
        self.active = algorithm;
    }

    pub fn quantum(&self) -> u64 {
        self.round_robin.quantum()
    }

    /// Update Round-Robin's quantum only; other policies are unaffected
    pub fn set_quantum(&mut self, quantum: u64) {
        self.round_robin.set_quantum(quantum);
    }

    pub fn reset(&mut self) {
        self.round_robin.reset();
    }
}
