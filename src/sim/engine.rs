/*!
 * Simulation Engine
 * Advances the simulated clock one tick at a time under the active policy
 */

use super::gantt::{GanttLog, GanttOccupant};
use super::policy::{Algorithm, PolicySet};
use super::process::{Process, ProcessState};
use super::registry::ProcessRegistry;
use super::stats::Statistics;
use super::types::{ProcessSpec, SimError, SimResult, Snapshot};
use crate::core::limits::{DEFAULT_PRIORITY, PALETTE_SIZE};
use crate::core::types::{Pid, SimTime};
use log::{debug, info};

/// The simulation engine.
///
/// Owns the registry, the active policy, the clock, the Gantt log, and the
/// control flags. Every mutation is all-or-nothing: a reported failure
/// leaves state untouched. The engine is transport-agnostic; callers
/// serialize access through [`crate::coordinator::Coordinator`].
pub struct SimulationEngine {
    current_time: SimTime,
    running_pid: Option<Pid>,
    time_slice_remaining: u64,
    registry: ProcessRegistry,
    policies: PolicySet,
    gantt: GanttLog,
    context_switches: u64,
    is_running: bool,
    is_paused: bool,
    next_pid: Pid,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine {
    pub fn new() -> Self {
        Self {
            current_time: 0,
            running_pid: None,
            time_slice_remaining: 0,
            registry: ProcessRegistry::new(),
            policies: PolicySet::default(),
            gantt: GanttLog::new(),
            context_switches: 0,
            is_running: false,
            is_paused: false,
            next_pid: 1,
        }
    }

    /// Advance the simulation by exactly one time unit.
    ///
    /// No-op unless running and unpaused. Returns whether the clock moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.is_paused {
            return false;
        }

        // Normal terminal condition, not an error
        if self.registry.all_completed() {
            info!(
                "All processes completed at t={}, stopping simulation",
                self.current_time
            );
            self.is_running = false;
            return false;
        }

        let now = self.current_time;

        // Admit arrivals: NEW -> READY for everything that has arrived
        let arrived = self.registry.arrived_pids(now);
        for &pid in &arrived {
            if let Some(p) = self.registry.get_mut(pid) {
                if p.state == ProcessState::New {
                    p.state = ProcessState::Ready;
                    debug!("t={}: process {} arrived", now, pid);
                }
            }
        }

        // Preempt an expired slice under a preemptive policy
        if let Some(pid) = self.running_pid {
            if self.policies.is_preemptive() && self.time_slice_remaining == 0 {
                if let Some(p) = self.registry.get_mut(pid) {
                    p.preempt();
                }
                self.context_switches += 1;
                self.running_pid = None;
                debug!("t={}: process {} preempted", now, pid);
            }
        }

        // Select when the CPU is free. Each fresh occupancy counts as a
        // context switch, including resumption right after preemption.
        if self.running_pid.is_none() {
            let ready = self.registry.ready_view(&arrived);
            if !ready.is_empty() {
                let selected = self.policies.active_policy().select_next(&ready, now);
                if let Some(pid) = selected {
                    let slice = ready
                        .iter()
                        .find(|p| p.pid == pid)
                        .map(|p| self.policies.active_policy_ref().time_slice(p))
                        .unwrap_or(1);
                    self.running_pid = Some(pid);
                    self.time_slice_remaining = slice;
                    self.context_switches += 1;
                    debug!("t={}: selected process {} (slice {})", now, pid, slice);
                }
            }
        }

        // Execute one unit, or log an idle unit
        let mut just_ran = None;
        if let Some(pid) = self.running_pid {
            let mut finished = false;
            if let Some(p) = self.registry.get_mut(pid) {
                p.execute(1, now);
                if p.is_completed() {
                    p.finalize_waiting_time();
                    finished = true;
                }
            }
            self.time_slice_remaining = self.time_slice_remaining.saturating_sub(1);
            self.gantt.record(GanttOccupant::Process(pid), now, now + 1);
            just_ran = Some(pid);
            if finished {
                info!("t={}: process {} completed", now + 1, pid);
                self.running_pid = None;
            }
        } else {
            self.gantt.record(GanttOccupant::Idle, now, now + 1);
        }

        // Everyone left READY accrues one unit of waiting
        for &pid in &arrived {
            if just_ran == Some(pid) {
                continue;
            }
            if let Some(p) = self.registry.get_mut(pid) {
                if p.state == ProcessState::Ready {
                    p.waiting_time += 1;
                }
            }
        }

        self.current_time += 1;
        true
    }

    /// Add a process. Assigns the next pid (monotonic, never reused) and a
    /// display color from the palette; arrival defaults to the current time.
    pub fn add_process(&mut self, spec: ProcessSpec) -> SimResult<Pid> {
        if spec.burst_time == 0 {
            return Err(SimError::InvalidBurstTime(spec.burst_time));
        }

        let pid = self.next_pid;
        self.next_pid += 1;

        let mut process = Process::new(
            pid,
            spec.name,
            spec.burst_time,
            spec.arrival_time.unwrap_or(self.current_time),
            spec.priority.unwrap_or(DEFAULT_PRIORITY),
        );
        process.color_index = self.registry.len() % PALETTE_SIZE;

        info!(
            "Process {} '{}' added (burst={}, arrival={}, priority={})",
            pid, process.name, process.burst_time, process.arrival_time, process.priority
        );
        self.registry.add(process);
        Ok(pid)
    }

    /// Remove a process by pid. Removing the running process frees the CPU.
    pub fn remove_process(&mut self, pid: Pid) -> SimResult<()> {
        if self.registry.remove(pid).is_none() {
            return Err(SimError::ProcessNotFound(pid));
        }
        if self.running_pid == Some(pid) {
            self.running_pid = None;
            self.time_slice_remaining = 0;
        }
        info!("Process {} removed", pid);
        Ok(())
    }

    /// Swap the active policy by wire name (FCFS, SJF, SRTF, PRIORITY, RR)
    pub fn set_algorithm(&mut self, name: &str) -> SimResult<Algorithm> {
        let algorithm: Algorithm = name
            .parse()
            .map_err(|_| SimError::UnknownAlgorithm(name.to_string()))?;
        self.policies.set_active(algorithm);
        info!("Algorithm set to {}", algorithm);
        Ok(algorithm)
    }

    /// Update Round-Robin's quantum; other policies are unaffected
    pub fn set_quantum(&mut self, quantum: u64) -> SimResult<()> {
        if quantum == 0 {
            return Err(SimError::InvalidQuantum(quantum));
        }
        self.policies.set_quantum(quantum);
        info!("Quantum set to {}", quantum);
        Ok(())
    }

    pub fn start(&mut self) {
        self.is_running = true;
        self.is_paused = false;
        info!("Simulation started at t={}", self.current_time);
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
        info!("Simulation paused at t={}", self.current_time);
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
        info!("Simulation resumed at t={}", self.current_time);
    }

    /// Reinitialize the run: clock to 0, CPU free, fresh Gantt log, every
    /// process back to its creation-time defaults. Static inputs and the
    /// pid allocator are preserved.
    pub fn reset(&mut self) {
        self.current_time = 0;
        self.running_pid = None;
        self.time_slice_remaining = 0;
        self.gantt.reset();
        self.context_switches = 0;
        self.is_running = false;
        self.is_paused = false;
        self.registry.reset_all();
        self.policies.reset();
        info!("Simulation reset");
    }

    /// Produce an immutable snapshot of the whole simulation state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_time: self.current_time,
            algorithm: self.policies.active(),
            algorithm_desc: self.policies.description(),
            is_running: self.is_running,
            is_paused: self.is_paused,
            running_process: self
                .running_pid
                .and_then(|pid| self.registry.get(pid))
                .cloned(),
            processes: self.registry.iter().cloned().collect(),
            gantt_chart: self.gantt.to_vec(),
            statistics: Statistics::compute(&self.registry, self.current_time),
            context_switches: self.context_switches,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    pub fn algorithm(&self) -> Algorithm {
        self.policies.active()
    }

    pub fn quantum(&self) -> u64 {
        self.policies.quantum()
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn process_count(&self) -> usize {
        self.registry.len()
    }
}
