/*!
 * Core Module
 * Shared types and constants used across the simulator
 */

pub mod limits;
pub mod types;
