/*!
 * Integration Tests for the Concurrency Coordinator
 * Concurrent command traffic interleaved with the periodic clock driver
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::Duration;
use tick_sim::{Coordinator, ProcessSpec, Snapshot};
use tokio_test::assert_ok;

fn assert_snapshot_invariants(snap: &Snapshot) {
    // No duplicate pids, ever
    let mut seen = HashSet::new();
    for p in &snap.processes {
        assert!(seen.insert(p.pid), "duplicate pid {} in snapshot", p.pid);
        assert!(p.remaining_time <= p.burst_time);
    }

    // Adjacent Gantt entries always differ in occupant and tile the timeline
    for window in snap.gantt_chart.windows(2) {
        assert_ne!(window[0].occupant, window[1].occupant);
        assert_eq!(window[0].end, window[1].start);
    }
    if let Some(last) = snap.gantt_chart.last() {
        assert_eq!(last.end, snap.current_time);
    }

    assert!(snap.statistics.cpu_utilization <= 100.0);
    assert!(snap.statistics.completed_count <= snap.statistics.total_count);
}

#[tokio::test]
async fn test_concurrent_adds_yield_unique_pids() {
    let coordinator = Coordinator::default();

    let mut handles = Vec::new();
    for task in 0..8 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            let mut pids = Vec::new();
            for i in 0..25 {
                let pid = coordinator
                    .add_process(ProcessSpec::new(format!("t{task}-p{i}"), 1 + i % 5))
                    .unwrap();
                pids.push(pid);
            }
            pids
        }));
    }

    let mut all_pids = HashSet::new();
    for handle in handles {
        for pid in handle.await.unwrap() {
            assert!(all_pids.insert(pid), "pid {} allocated twice", pid);
        }
    }
    assert_eq!(all_pids.len(), 200);
    assert_eq!(coordinator.snapshot().processes.len(), 200);
}

#[tokio::test]
async fn test_mutations_interleaved_with_driver() {
    let coordinator = Coordinator::default();
    coordinator.set_algorithm("RR").unwrap();
    coordinator.set_quantum(2).unwrap();
    coordinator.start();

    let driver = coordinator.spawn_driver(Duration::from_millis(1));
    let mut updates = coordinator.subscribe();

    // A mutator hammering the engine while the driver ticks
    let mutator = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(7);
            for i in 0..40u64 {
                coordinator
                    .add_process(ProcessSpec::new(format!("load{i}"), rng.gen_range(1..8)))
                    .unwrap();
                if i % 10 == 9 {
                    coordinator.set_algorithm("SRTF").unwrap();
                    coordinator.set_algorithm("RR").unwrap();
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    // Every snapshot observed mid-flight satisfies the engine invariants
    let mut observed = 0;
    let mut last_time = 0;
    while observed < 50 {
        match updates.recv().await {
            Ok(snap) => {
                assert_snapshot_invariants(&snap);
                assert!(snap.current_time >= last_time, "clock ran backwards");
                last_time = snap.current_time;
                observed += 1;
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }

    assert_ok!(mutator.await);
    driver.shutdown().await;
    assert_snapshot_invariants(&coordinator.snapshot());
}

#[tokio::test]
async fn test_manual_ticks_race_with_driver() {
    let coordinator = Coordinator::default();
    for i in 0..6 {
        coordinator
            .add_process(ProcessSpec::new(format!("p{i}"), 20))
            .unwrap();
    }
    coordinator.start();

    let driver = coordinator.spawn_driver(Duration::from_millis(1));
    let ticker = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            for _ in 0..30 {
                coordinator.tick();
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    ticker.await.unwrap();
    driver.shutdown().await;

    let snap = coordinator.snapshot();
    assert_snapshot_invariants(&snap);
    // Manual and periodic ticks both advanced the same clock
    assert!(snap.current_time >= 30);
}

#[tokio::test]
async fn test_reset_under_load_preserves_static_inputs() {
    let coordinator = Coordinator::default();
    coordinator
        .add_process(ProcessSpec::new("alpha", 4).with_priority(2))
        .unwrap();
    coordinator
        .add_process(ProcessSpec::new("beta", 6).with_priority(7))
        .unwrap();
    coordinator.start();

    let driver = coordinator.spawn_driver(Duration::from_millis(1));
    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.reset();
    driver.shutdown().await;

    let snap = coordinator.snapshot();
    assert_eq!(snap.current_time, 0);
    assert!(snap.gantt_chart.is_empty());
    assert_eq!(snap.context_switches, 0);
    assert_eq!(snap.processes.len(), 2);
    for p in &snap.processes {
        assert_eq!(p.remaining_time, p.burst_time);
        assert!(p.start_time.is_none());
    }
}

#[tokio::test]
async fn test_slow_subscriber_still_sees_latest_state() {
    let coordinator = Coordinator::default();
    let mut updates = coordinator.subscribe();

    // Far more mutations than the broadcast channel holds
    for i in 0..300u64 {
        coordinator
            .add_process(ProcessSpec::new(format!("burst{i}"), 1))
            .unwrap();
    }

    let mut lagged = false;
    let mut latest = None;
    loop {
        match updates.try_recv() {
            Ok(snap) => latest = Some(snap),
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => lagged = true,
            Err(_) => break,
        }
    }

    assert!(lagged, "expected the subscriber to lag past capacity");
    // The newest retained snapshot is the final mutation's
    assert_eq!(latest.unwrap().processes.len(), 300);
}
