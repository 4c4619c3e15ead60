/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Simulated time unit (ticks since simulation start)
pub type SimTime = u64;

/// Priority level (lower is more urgent)
pub type Priority = u8;
