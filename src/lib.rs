/*!
 * tick-sim Library
 * Discrete-time CPU scheduling simulator exposed as a library
 */

pub mod coordinator;
pub mod core;
pub mod gen;
pub mod protocol;
pub mod server;
pub mod sim;

// Re-exports
pub use coordinator::{Coordinator, DriverHandle};
pub use crate::core::types::{Pid, Priority, SimTime};
pub use protocol::{Message, Request};
pub use server::serve;
pub use sim::{
    Algorithm, GanttEntry, GanttOccupant, Process, ProcessSpec, ProcessState, SimError, SimResult,
    SimulationEngine, Snapshot, Statistics,
};
