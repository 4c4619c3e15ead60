/*!
 * Process Registry
 * Insertion-ordered collection of all processes in the current run
 */

use super::process::{Process, ProcessState};
use crate::core::types::{Pid, SimTime};

/// Owns every process in the simulation.
///
/// Insertion order has no scheduling significance (policies re-sort
/// explicitly) but is preserved for display. No two processes share a pid.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: Vec<Process>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, process: Process) {
        debug_assert!(
            !self.contains(process.pid),
            "duplicate pid {} in registry",
            process.pid
        );
        self.processes.push(process);
    }

    /// Remove a process by pid, returning it if present
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let idx = self.processes.iter().position(|p| p.pid == pid)?;
        Some(self.processes.remove(idx))
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.iter().any(|p| p.pid == pid)
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.iter_mut().find(|p| p.pid == pid)
    }

    /// Pids of processes that have arrived by `now` and still want the CPU
    /// (state NEW or READY)
    pub fn arrived_pids(&self, now: SimTime) -> Vec<Pid> {
        self.processes
            .iter()
            .filter(|p| {
                p.arrival_time <= now
                    && matches!(p.state, ProcessState::New | ProcessState::Ready)
            })
            .map(|p| p.pid)
            .collect()
    }

    /// Borrow the READY processes among the given pids, for policy selection
    pub fn ready_view(&self, pids: &[Pid]) -> Vec<&Process> {
        self.processes
            .iter()
            .filter(|p| p.state == ProcessState::Ready && pids.contains(&p.pid))
            .collect()
    }

    pub fn completed(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter().filter(|p| p.is_completed())
    }

    /// True once every process has completed. An empty registry is not
    /// exhausted: the simulation keeps idling, waiting for work.
    pub fn all_completed(&self) -> bool {
        !self.processes.is_empty() && self.processes.iter().all(|p| p.is_completed())
    }

    pub fn reset_all(&mut self) {
        for p in &mut self.processes {
            p.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(bursts: &[(Pid, u64, SimTime)]) -> ProcessRegistry {
        let mut reg = ProcessRegistry::new();
        for &(pid, burst, arrival) in bursts {
            reg.add(Process::new(pid, format!("p{pid}"), burst, arrival, 5));
        }
        reg
    }

    #[test]
    fn test_remove_by_pid() {
        let mut reg = registry_with(&[(1, 5, 0), (2, 3, 0)]);
        assert!(reg.remove(1).is_some());
        assert!(reg.remove(1).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_arrived_filters_by_time_and_state() {
        let mut reg = registry_with(&[(1, 5, 0), (2, 3, 4), (3, 2, 0)]);
        reg.get_mut(3).unwrap().state = ProcessState::Completed;

        assert_eq!(reg.arrived_pids(0), vec![1]);
        assert_eq!(reg.arrived_pids(4), vec![1, 2]);
    }

    #[test]
    fn test_all_completed_empty_registry() {
        let reg = ProcessRegistry::new();
        assert!(!reg.all_completed());

        let mut reg = registry_with(&[(1, 1, 0)]);
        assert!(!reg.all_completed());
        reg.get_mut(1).unwrap().execute(1, 0);
        assert!(reg.all_completed());
    }

    #[test]
    fn test_reset_all() {
        let mut reg = registry_with(&[(1, 2, 0), (2, 2, 0)]);
        reg.get_mut(1).unwrap().execute(1, 0);
        reg.reset_all();
        assert!(reg.iter().all(|p| p.state == ProcessState::New));
        assert!(reg.iter().all(|p| p.remaining_time == p.burst_time));
    }
}
