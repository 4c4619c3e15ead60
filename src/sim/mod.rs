/*!
 * Simulation Core
 * Process state machine, scheduling policies, and the tick engine
 */

pub mod engine;
pub mod gantt;
pub mod policy;
pub mod process;
pub mod registry;
pub mod stats;
pub mod types;

pub use engine::SimulationEngine;
pub use gantt::{GanttEntry, GanttLog, GanttOccupant};
pub use policy::{Algorithm, SchedulingPolicy};
pub use process::{ExecutionSlice, Process, ProcessState};
pub use registry::ProcessRegistry;
pub use stats::Statistics;
pub use types::{ProcessSpec, SimError, SimResult, Snapshot};
