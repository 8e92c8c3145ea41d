use crate::model::FishRecord;
use crate::source::SnapshotSource;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    pub period: Duration,
    /// A fetch still running after this long is abandoned for the cycle.
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(3),
            timeout: Duration::from_millis(2500),
        }
    }
}

/// Handle to the background poll task. Dropping it stops polling and drops
/// any fetch that is still in flight.
#[derive(Debug)]
pub struct Poller {
    task: JoinHandle<()>,
}

impl Poller {
    pub fn shutdown(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts polling `source` every `cfg.period`, delivering each snapshot on
/// `tx`. Fetches run one at a time; a failed or timed out fetch skips the
/// cycle. The task ends when the receiver goes away.
pub fn spawn_poller<S: SnapshotSource>(
    mut source: S,
    tx: mpsc::Sender<Vec<FishRecord>>,
    cfg: PollerConfig,
) -> Poller {
    let task = tokio::spawn(async move {
        let mut ticker = time::interval(cfg.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;
        loop {
            ticker.tick().await;
            cycle += 1;
            match time::timeout(cfg.timeout, source.fetch()).await {
                Ok(Ok(records)) => {
                    debug!(cycle, fish = records.len(), "snapshot fetched");
                    if tx.send(records).await.is_err() {
                        info!("snapshot receiver closed; poller stopping");
                        break;
                    }
                }
                Ok(Err(err)) => debug!(cycle, error = %err, "snapshot fetch failed; skipping cycle"),
                Err(_) => debug!(cycle, timeout_ms = cfg.timeout.as_millis() as u64, "snapshot fetch timed out"),
            }
        }
    });
    Poller { task }
}
