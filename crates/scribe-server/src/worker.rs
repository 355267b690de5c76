// crates/scribe-server/src/worker.rs
// Periodic tick worker: feeds hourly clock ticks to the orchestrator for
// state eviction and the aggregate checks.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::orchestrator::ProactiveOrchestrator;
use scribe_types::ActivitySignal;

/// Delay before the first tick, to let the host settle
const INITIAL_DELAY_SECS: u64 = 30;
/// Interval between clock ticks
const TICK_INTERVAL_SECS: u64 = 3600;

/// Periodic tick worker
pub struct TickWorker {
    orchestrator: Arc<ProactiveOrchestrator>,
    shutdown: watch::Receiver<bool>,
}

impl TickWorker {
    pub fn new(orchestrator: Arc<ProactiveOrchestrator>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            orchestrator,
            shutdown,
        }
    }

    /// Run the tick loop until shutdown
    pub async fn run(mut self) {
        tracing::info!("tick worker started");
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        loop {
            if *self.shutdown.borrow() {
                tracing::info!("tick worker shutting down");
                break;
            }

            self.orchestrator.on_signal(ActivitySignal::Tick).await;

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(TICK_INTERVAL_SECS)) => {}
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        tracing::info!("tick worker shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Spawn the tick worker.
///
/// Returns the shutdown sender; send `true` to stop the worker and clear
/// all timers - no further suggestions fire after that.
pub fn spawn(orchestrator: Arc<ProactiveOrchestrator>) -> watch::Sender<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = TickWorker::new(orchestrator, shutdown_rx);
    tokio::spawn(async move {
        worker.run().await;
    });
    shutdown_tx
}
