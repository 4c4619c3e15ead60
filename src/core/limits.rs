/*!
 * Simulator Limits and Constants
 *
 * Centralized location for simulation-wide defaults and magic numbers.
 */

use std::time::Duration;

/// Default Round-Robin quantum (simulated time units)
pub const DEFAULT_QUANTUM: u64 = 2;

/// Default priority assigned when a command omits it (mid-range on a 1-10 scale)
pub const DEFAULT_PRIORITY: u8 = 5;

/// Number of display colors cycled across processes
/// Front ends index into a fixed 12-color palette
pub const PALETTE_SIZE: usize = 12;

/// Wall-clock interval between automatic ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Default listen address for the TCP server
pub const DEFAULT_ADDR: &str = "127.0.0.1:5555";

/// Capacity of the snapshot broadcast channel
/// Slow observers drop to the most recent snapshots rather than stall mutations
pub const BROADCAST_CAPACITY: usize = 64;
