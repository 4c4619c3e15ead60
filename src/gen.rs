/*!
 * Workload Generator
 * Canned process sets for exercising each scheduling algorithm
 */

use crate::sim::ProcessSpec;
use std::str::FromStr;

/// Service names cycled through generated processes
pub const SERVICE_NAMES: [&str; 15] = [
    "Apache",
    "Nginx",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "Elasticsearch",
    "Kafka",
    "RabbitMQ",
    "Jenkins",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Ansible",
    "Prometheus",
];

/// A named demo workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// One long job ahead of several short ones - shows the FCFS convoy effect
    Convoy,
    /// Mixed short and long bursts - shows SJF/SRTF favoring short jobs
    ShortJobs,
    /// Same bursts, spread priorities - shows priority ordering
    PriorityLadder,
    /// Staggered arrivals with similar bursts - shows Round-Robin fairness
    Interactive,
    /// One process per canned service name, spread bursts and priorities
    Services,
}

impl FromStr for Workload {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "convoy" => Ok(Workload::Convoy),
            "short-jobs" | "short_jobs" => Ok(Workload::ShortJobs),
            "priority-ladder" | "priority_ladder" => Ok(Workload::PriorityLadder),
            "interactive" => Ok(Workload::Interactive),
            "services" => Ok(Workload::Services),
            _ => Err(()),
        }
    }
}

impl Workload {
    pub fn processes(&self) -> Vec<ProcessSpec> {
        match self {
            Workload::Convoy => vec![
                ProcessSpec::new("BigBatch", 12).with_arrival(0),
                ProcessSpec::new("Quick1", 2).with_arrival(1),
                ProcessSpec::new("Quick2", 2).with_arrival(2),
                ProcessSpec::new("Quick3", 2).with_arrival(3),
            ],
            Workload::ShortJobs => vec![
                ProcessSpec::new("LongCompile", 10).with_arrival(0),
                ProcessSpec::new("Lint", 2).with_arrival(0),
                ProcessSpec::new("Format", 1).with_arrival(0),
                ProcessSpec::new("UnitTests", 5).with_arrival(2),
            ],
            Workload::PriorityLadder => vec![
                ProcessSpec::new("Background", 4).with_arrival(0).with_priority(9),
                ProcessSpec::new("Batch", 4).with_arrival(0).with_priority(6),
                ProcessSpec::new("Interactive", 4).with_arrival(0).with_priority(3),
                ProcessSpec::new("Critical", 4).with_arrival(0).with_priority(1),
            ],
            Workload::Interactive => vec![
                ProcessSpec::new("Shell", 4).with_arrival(0),
                ProcessSpec::new("Editor", 5).with_arrival(0),
                ProcessSpec::new("Browser", 4).with_arrival(1),
                ProcessSpec::new("Music", 3).with_arrival(2),
            ],
            Workload::Services => service_batch(SERVICE_NAMES.len()),
        }
    }
}

/// Deterministic batch of service processes: names cycle through
/// [`SERVICE_NAMES`], bursts walk 2..=15, priorities walk 1..=10
pub fn service_batch(count: usize) -> Vec<ProcessSpec> {
    (0..count)
        .map(|i| {
            ProcessSpec::new(SERVICE_NAMES[i % SERVICE_NAMES.len()], 2 + (i as u64 * 3) % 14)
                .with_arrival(0)
                .with_priority(1 + ((i * 7) % 10) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_parse() {
        assert_eq!("convoy".parse::<Workload>(), Ok(Workload::Convoy));
        assert_eq!(
            "priority-ladder".parse::<Workload>(),
            Ok(Workload::PriorityLadder)
        );
        assert_eq!("services".parse::<Workload>(), Ok(Workload::Services));
        assert!("chaos".parse::<Workload>().is_err());
    }

    #[test]
    fn test_workloads_are_valid_specs() {
        for w in [
            Workload::Convoy,
            Workload::ShortJobs,
            Workload::PriorityLadder,
            Workload::Interactive,
            Workload::Services,
        ] {
            for spec in w.processes() {
                assert!(spec.burst_time > 0);
            }
        }
    }

    #[test]
    fn test_service_batch_bounds() {
        let batch = service_batch(30);
        assert_eq!(batch.len(), 30);
        for spec in &batch {
            assert!((2..=15).contains(&spec.burst_time));
            let priority = spec.priority.unwrap();
            assert!((1..=10).contains(&priority));
        }
        // Names cycle
        assert_eq!(batch[0].name, batch[15].name);
    }

    #[test]
    fn test_services_workload_covers_every_name() {
        let specs = Workload::Services.processes();
        assert_eq!(specs.len(), SERVICE_NAMES.len());
        for (spec, name) in specs.iter().zip(SERVICE_NAMES) {
            assert_eq!(spec.name, name);
        }
    }
}
