/*!
 * Process Model
 * One schedulable unit of work with execution accounting
 */

use crate::core::types::{Pid, Priority, SimTime};
use serde::{Deserialize, Serialize};

/// Process state
///
/// Transitions are monotonic except the single back-edge taken on
/// preemption: NEW -> READY -> RUNNING -> COMPLETED, RUNNING -> READY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// Created, not yet arrived
    New,
    /// Arrived, waiting for the CPU
    Ready,
    /// Currently holding the CPU
    Running,
    /// Reserved for I/O-bound blocking (unused in this simulation)
    Waiting,
    /// Finished all its burst time (terminal)
    Completed,
}

/// One contiguous stretch of CPU occupancy for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSlice {
    pub start: SimTime,
    pub end: SimTime,
    pub duration: u64,
}

/// A process in the simulator
///
/// Static inputs (`name`, `burst_time`, `arrival_time`, `priority`) survive
/// a reset; everything else is reinitialized to its creation-time default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub burst_time: u64,
    pub arrival_time: SimTime,
    pub priority: Priority,
    pub remaining_time: u64,
    pub state: ProcessState,
    pub start_time: Option<SimTime>,
    pub completion_time: Option<SimTime>,
    /// Units spent READY. Accrued per tick while in the pre-preemption
    /// arrived set, so a unit spent READY right after preemption is not
    /// counted in flight; `finalize_waiting_time` recomputes the exact
    /// value (turnaround minus executed) at completion.
    pub waiting_time: u64,
    pub turnaround_time: u64,
    pub response_time: Option<u64>,
    pub color_index: usize,
    pub execution_history: Vec<ExecutionSlice>,
}

impl Process {
    pub fn new(
        pid: Pid,
        name: impl Into<String>,
        burst_time: u64,
        arrival_time: SimTime,
        priority: Priority,
    ) -> Self {
        Self {
            pid,
            name: name.into(),
            burst_time,
            arrival_time,
            priority,
            remaining_time: burst_time,
            state: ProcessState::New,
            start_time: None,
            completion_time: None,
            waiting_time: 0,
            turnaround_time: 0,
            response_time: None,
            color_index: 0,
            execution_history: Vec::new(),
        }
    }

    /// Execute on the CPU for up to `units` simulated time units.
    ///
    /// Stamps `start_time`/`response_time` on first execution, records the
    /// slice in the execution history (extending the previous slice when it
    /// is contiguous), and transitions to COMPLETED when the burst is
    /// exhausted. Returns the units actually executed, which is less than
    /// `units` if the process finishes early.
    pub fn execute(&mut self, units: u64, now: SimTime) -> u64 {
        if self.state != ProcessState::Running {
            self.state = ProcessState::Running;
        }

        if self.start_time.is_none() {
            self.start_time = Some(now);
            self.response_time = Some(now - self.arrival_time);
        }

        let executed = units.min(self.remaining_time);
        self.remaining_time -= executed;

        // Adjacent slices merge: the history never holds two entries where
        // one ends exactly where the next begins.
        match self.execution_history.last_mut() {
            Some(last) if last.end == now => {
                last.end += executed;
                last.duration += executed;
            }
            _ => self.execution_history.push(ExecutionSlice {
                start: now,
                end: now + executed,
                duration: executed,
            }),
        }

        if self.remaining_time == 0 {
            self.state = ProcessState::Completed;
            let completion = now + executed;
            self.completion_time = Some(completion);
            self.turnaround_time = completion - self.arrival_time;
        }

        executed
    }

    /// Return the CPU to the ready queue without finishing (RUNNING -> READY)
    pub fn preempt(&mut self) {
        if self.state == ProcessState::Running {
            self.state = ProcessState::Ready;
        }
    }

    /// Total units executed so far, per the execution history
    pub fn executed_total(&self) -> u64 {
        self.execution_history.iter().map(|s| s.duration).sum()
    }

    /// Recompute the final waiting time once completed.
    ///
    /// waiting = turnaround - total executed, i.e. time spent READY.
    pub fn finalize_waiting_time(&mut self) {
        if self.completion_time.is_some() {
            self.waiting_time = self.turnaround_time - self.executed_total();
        }
    }

    /// Reinitialize all dynamic fields for a fresh simulation run.
    ///
    /// The history becomes a new owned sequence rather than being cleared in
    /// place, so snapshots handed to observers before the reset stay intact.
    pub fn reset(&mut self) {
        self.remaining_time = self.burst_time;
        self.state = ProcessState::New;
        self.start_time = None;
        self.completion_time = None;
        self.waiting_time = 0;
        self.turnaround_time = 0;
        self.response_time = None;
        self.execution_history = Vec::new();
    }

    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_stamps_first_run() {
        let mut p = Process::new(1, "calc", 3, 2, 5);
        assert_eq!(p.state, ProcessState::New);

        let executed = p.execute(1, 4);
        assert_eq!(executed, 1);
        assert_eq!(p.state, ProcessState::Running);
        assert_eq!(p.start_time, Some(4));
        assert_eq!(p.response_time, Some(2));
        assert_eq!(p.remaining_time, 2);
    }

    #[test]
    fn test_completion_stamps_turnaround() {
        let mut p = Process::new(1, "quick", 2, 0, 5);
        p.execute(1, 0);
        p.execute(1, 1);

        assert_eq!(p.state, ProcessState::Completed);
        assert_eq!(p.completion_time, Some(2));
        assert_eq!(p.turnaround_time, 2);
        assert_eq!(p.remaining_time, 0);
    }

    #[test]
    fn test_execute_never_overruns_burst() {
        let mut p = Process::new(1, "short", 1, 0, 5);
        let executed = p.execute(5, 0);
        assert_eq!(executed, 1);
        assert_eq!(p.remaining_time, 0);
        assert!(p.is_completed());
    }

    #[test]
    fn test_history_merges_contiguous_slices() {
        let mut p = Process::new(1, "steady", 5, 0, 5);
        p.execute(1, 0);
        p.execute(1, 1);
        p.execute(1, 2);
        assert_eq!(p.execution_history.len(), 1);
        assert_eq!(
            p.execution_history[0],
            ExecutionSlice {
                start: 0,
                end: 3,
                duration: 3
            }
        );

        // Gap in occupancy starts a new slice
        p.execute(1, 7);
        assert_eq!(p.execution_history.len(), 2);
        assert_eq!(p.execution_history[1].start, 7);
    }

    #[test]
    fn test_waiting_time_from_history() {
        let mut p = Process::new(1, "waiter", 3, 0, 5);
        p.execute(1, 2);
        p.execute(1, 3);
        p.execute(1, 4);
        p.finalize_waiting_time();

        // Completed at 5, arrived at 0, ran 3 units -> waited 2
        assert_eq!(p.turnaround_time, 5);
        assert_eq!(p.waiting_time, 2);
    }

    #[test]
    fn test_preempt_only_from_running() {
        let mut p = Process::new(1, "stubborn", 2, 0, 5);
        p.preempt();
        assert_eq!(p.state, ProcessState::New);

        p.execute(1, 0);
        p.preempt();
        assert_eq!(p.state, ProcessState::Ready);
    }

    #[test]
    fn test_reset_preserves_static_inputs() {
        let mut p = Process::new(7, "phoenix", 4, 1, 3);
        p.execute(1, 1);
        p.execute(1, 2);
        p.reset();

        assert_eq!(p.pid, 7);
        assert_eq!(p.name, "phoenix");
        assert_eq!(p.burst_time, 4);
        assert_eq!(p.arrival_time, 1);
        assert_eq!(p.priority, 3);
        assert_eq!(p.remaining_time, 4);
        assert_eq!(p.state, ProcessState::New);
        assert!(p.execution_history.is_empty());
        assert!(p.start_time.is_none());
    }
}
