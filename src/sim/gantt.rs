/*!
 * Gantt Log
 * Ordered record of CPU occupancy per time interval
 */

use crate::core::types::{Pid, SimTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Who held the CPU during an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttOccupant {
    /// CPU idle
    Idle,
    /// Process with this pid
    Process(Pid),
}

// The wire keeps the original integer convention: -1 means idle.
impl Serialize for GanttOccupant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GanttOccupant::Idle => serializer.serialize_i64(-1),
            GanttOccupant::Process(pid) => serializer.serialize_i64(*pid as i64),
        }
    }
}

impl<'de> Deserialize<'de> for GanttOccupant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(GanttOccupant::Idle)
        } else {
            Ok(GanttOccupant::Process(raw as Pid))
        }
    }
}

/// One interval of the global execution timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttEntry {
    pub occupant: GanttOccupant,
    pub start: SimTime,
    pub end: SimTime,
}

/// Append-only execution timeline.
///
/// Invariant: no two adjacent entries share an occupant; a unit that extends
/// the current occupancy extends the last entry instead of appending.
#[derive(Debug, Default)]
pub struct GanttLog {
    entries: Vec<GanttEntry>,
}

impl GanttLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one interval of occupancy, merging with the previous entry
    /// when the occupant is unchanged and the intervals are contiguous
    pub fn record(&mut self, occupant: GanttOccupant, start: SimTime, end: SimTime) {
        debug_assert!(start < end, "empty gantt interval");

        match self.entries.last_mut() {
            Some(last) if last.occupant == occupant && last.end == start => {
                last.end = end;
            }
            _ => self.entries.push(GanttEntry {
                occupant,
                start,
                end,
            }),
        }
    }

    pub fn entries(&self) -> &[GanttEntry] {
        &self.entries
    }

    pub fn to_vec(&self) -> Vec<GanttEntry> {
        self.entries.clone()
    }

    /// Replace the log with a fresh empty sequence. Snapshots holding the
    /// previous entries keep them.
    pub fn reset(&mut self) {
        self.entries = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_same_occupant() {
        let mut log = GanttLog::new();
        log.record(GanttOccupant::Process(1), 0, 1);
        log.record(GanttOccupant::Process(1), 1, 2);
        log.record(GanttOccupant::Process(2), 2, 3);
        log.record(GanttOccupant::Idle, 3, 4);
        log.record(GanttOccupant::Idle, 4, 5);

        assert_eq!(log.len(), 3);
        assert_eq!(
            log.entries()[0],
            GanttEntry {
                occupant: GanttOccupant::Process(1),
                start: 0,
                end: 2
            }
        );
        assert_eq!(log.entries()[2].end, 5);
    }

    #[test]
    fn test_same_occupant_after_gap_is_new_entry() {
        let mut log = GanttLog::new();
        log.record(GanttOccupant::Process(1), 0, 1);
        log.record(GanttOccupant::Idle, 1, 2);
        log.record(GanttOccupant::Process(1), 2, 3);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_idle_sentinel_serializes_as_minus_one() {
        let entry = GanttEntry {
            occupant: GanttOccupant::Idle,
            start: 0,
            end: 3,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"occupant":-1,"start":0,"end":3}"#);

        let back: GanttEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.occupant, GanttOccupant::Idle);
    }
}
