/*!
 * Concurrency Coordinator
 *
 * Serializes every mutation of the simulation engine - command traffic and
 * the periodic clock driver alike - behind one lock, and hands one
 * immutable snapshot to the broadcast channel after each completed
 * mutation. No snapshot ever observes a half-applied mutation.
 */

use crate::core::limits::BROADCAST_CAPACITY;
use crate::core::types::{Pid, SimTime};
use crate::sim::{Algorithm, ProcessSpec, SimResult, SimulationEngine, Snapshot};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Control messages for the driver task
#[derive(Debug, Clone)]
pub enum DriverCommand {
    /// Change the wall-clock interval between automatic ticks
    UpdateInterval(Duration),
    /// Shutdown the driver task
    Shutdown,
}

/// Handle to the periodic clock driver
pub struct DriverHandle {
    command_tx: mpsc::UnboundedSender<DriverCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl DriverHandle {
    /// Change the tick interval (takes effect immediately)
    pub fn update_interval(&self, interval: Duration) {
        let _ = self
            .command_tx
            .send(DriverCommand::UpdateInterval(interval));
    }

    /// Shutdown the driver task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(DriverCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Driver task shutdown error: {}", e);
            } else {
                info!("Driver task shutdown complete");
            }
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(DriverCommand::Shutdown);
        }
    }
}

/// Shared access point to the simulation engine.
///
/// Cloning is cheap; clones share the same engine and broadcast channel.
/// Every mutating method locks the engine for its whole body, takes a
/// snapshot at the end of the mutation, and broadcasts it. Mutations never
/// block on I/O and never await while holding the lock.
#[derive(Clone)]
pub struct Coordinator {
    engine: Arc<Mutex<SimulationEngine>>,
    updates: broadcast::Sender<Arc<Snapshot>>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(SimulationEngine::new())
    }
}

impl Coordinator {
    pub fn new(engine: SimulationEngine) -> Self {
        let (updates, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            updates,
        }
    }

    /// Subscribe to post-mutation snapshots. A receiver that lags past the
    /// channel capacity loses the oldest snapshots; the newest mutation's
    /// snapshot always supersedes them.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.updates.subscribe()
    }

    /// Read-only snapshot of the current state, without broadcasting
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::new(self.engine.lock().snapshot())
    }

    /// Run one mutation under the engine lock, then broadcast the snapshot
    /// it produced. The snapshot is taken before the lock is released, so
    /// it reflects exactly this mutation.
    fn mutate<T>(&self, op: impl FnOnce(&mut SimulationEngine) -> T) -> T {
        let (out, snapshot) = {
            let mut engine = self.engine.lock();
            let out = op(&mut engine);
            (out, Arc::new(engine.snapshot()))
        };
        let _ = self.updates.send(snapshot);
        out
    }

    pub fn add_process(&self, spec: ProcessSpec) -> SimResult<Pid> {
        self.mutate(|e| e.add_process(spec))
    }

    pub fn remove_process(&self, pid: Pid) -> SimResult<()> {
        self.mutate(|e| e.remove_process(pid))
    }

    pub fn set_algorithm(&self, name: &str) -> SimResult<Algorithm> {
        self.mutate(|e| e.set_algorithm(name))
    }

    pub fn set_quantum(&self, quantum: u64) -> SimResult<()> {
        self.mutate(|e| e.set_quantum(quantum))
    }

    pub fn start(&self) {
        self.mutate(|e| e.start());
    }

    /// PAUSE is a toggle on the wire: pause when running, resume when paused
    pub fn toggle_pause(&self) {
        self.mutate(|e| {
            if e.is_paused() {
                e.resume()
            } else {
                e.pause()
            }
        });
    }

    pub fn reset(&self) {
        self.mutate(|e| e.reset());
    }

    /// Manual tick. Shares the exact same engine code path as the driver.
    pub fn tick(&self) -> bool {
        self.mutate(|e| e.tick())
    }

    pub fn current_time(&self) -> SimTime {
        self.engine.lock().current_time()
    }

    /// Spawn the periodic clock driver.
    ///
    /// Fires at a fixed wall-clock interval; the running/paused flags are
    /// re-checked after every wake, so pause takes effect on the very next
    /// scheduled tick. Broadcast happens only when the clock advanced.
    pub fn spawn_driver(&self, interval: Duration) -> DriverHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let coordinator = self.clone();

        let handle = tokio::spawn(async move {
            run_driver_loop(coordinator, interval, command_rx).await;
        });

        info!("Clock driver spawned with {:?} interval", interval);

        DriverHandle {
            command_tx,
            handle: Some(handle),
        }
    }
}

async fn run_driver_loop(
    coordinator: Coordinator,
    initial: Duration,
    mut command_rx: mpsc::UnboundedReceiver<DriverCommand>,
) {
    let mut interval = tokio::time::interval(initial);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // One atomic tick under the engine lock; flags are checked
                // inside tick() itself, after this wake
                let snapshot = {
                    let mut engine = coordinator.engine.lock();
                    if engine.tick() {
                        Some(Arc::new(engine.snapshot()))
                    } else {
                        None
                    }
                };
                if let Some(snapshot) = snapshot {
                    let _ = coordinator.updates.send(snapshot);
                }
            }

            Some(cmd) = command_rx.recv() => {
                match cmd {
                    DriverCommand::UpdateInterval(new_interval) => {
                        info!("Driver interval updated: {:?}", new_interval);
                        interval = tokio::time::interval(new_interval);
                        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                    }

                    DriverCommand::Shutdown => {
                        info!("Clock driver shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_driver_lifecycle() {
        let coordinator = Coordinator::default();
        let driver = coordinator.spawn_driver(Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(10)).await;
        driver.shutdown().await;
    }

    #[tokio::test]
    async fn test_driver_advances_running_simulation() {
        let coordinator = Coordinator::default();
        coordinator
            .add_process(ProcessSpec::new("work", 50))
            .unwrap();
        coordinator.start();

        let driver = coordinator.spawn_driver(Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(30)).await;
        driver.shutdown().await;

        assert!(coordinator.current_time() > 0);
    }

    #[tokio::test]
    async fn test_paused_simulation_does_not_advance() {
        let coordinator = Coordinator::default();
        coordinator
            .add_process(ProcessSpec::new("work", 50))
            .unwrap();
        coordinator.start();
        coordinator.toggle_pause();

        let driver = coordinator.spawn_driver(Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(20)).await;
        driver.shutdown().await;

        assert_eq!(coordinator.current_time(), 0);
    }

    #[tokio::test]
    async fn test_mutation_broadcasts_snapshot() {
        let coordinator = Coordinator::default();
        let mut updates = coordinator.subscribe();

        coordinator.add_process(ProcessSpec::new("job", 3)).unwrap();

        let snapshot = updates.recv().await.unwrap();
        assert_eq!(snapshot.processes.len(), 1);
        assert_eq!(snapshot.processes[0].name, "job");
    }

    #[tokio::test]
    async fn test_manual_tick_same_code_path() {
        let coordinator = Coordinator::default();
        coordinator.add_process(ProcessSpec::new("job", 2)).unwrap();

        // Not running yet: manual tick is a no-op
        assert!(!coordinator.tick());

        coordinator.start();
        assert!(coordinator.tick());
        assert_eq!(coordinator.current_time(), 1);
    }
}
