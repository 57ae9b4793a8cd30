// ── Snapshot poller ──
//
// Lifecycle-gated periodic fetch of `GET /network_status`. Each `start()`
// opens a new poll generation; only responses tagged with the current
// generation while running may touch the state, so a response that lands
// after `stop()` or a restart is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use netaudit_api::AuditClient;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{LogEntry, Snapshot};
use crate::store::{Outcome, StateStore, StateUpdate};

/// Periodic snapshot fetcher. Cheaply cloneable.
#[derive(Clone)]
pub struct SnapshotPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    client: AuditClient,
    store: Arc<StateStore>,
    period: Duration,
    generation: AtomicU64,
    /// Token of the current poll loop, if one was started.
    cancel: Mutex<Option<CancellationToken>>,
    /// Held for the duration of every fetch: at most one in flight.
    in_flight: Mutex<()>,
}

impl SnapshotPoller {
    pub fn new(client: AuditClient, store: Arc<StateStore>, period: Duration) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                store,
                period,
                generation: AtomicU64::new(0),
                cancel: Mutex::new(None),
                in_flight: Mutex::new(()),
            }),
        }
    }

    /// Start polling. Any previous loop is cancelled and replaced; the
    /// first fetch fires immediately.
    pub async fn start(&self) {
        let mut slot = self.inner.cancel.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .store
            .apply(StateUpdate::PollerStarted { generation });

        let cancel = CancellationToken::new();
        *slot = Some(cancel.clone());
        drop(slot);

        info!(generation, period = ?self.inner.period, "snapshot poller started");
        tokio::spawn(poll_task(self.clone(), generation, cancel));
    }

    /// Stop polling. A no-op unless running; an in-flight request is left
    /// to finish and its response discarded.
    pub async fn stop(&self) {
        if let Some(cancel) = self.inner.cancel.lock().await.take() {
            cancel.cancel();
        }
        if self.inner.store.apply(StateUpdate::PollerStopped) == Outcome::Applied {
            info!("snapshot poller stopped");
        }
    }

    /// Fetch and convert one snapshot without touching any state.
    pub async fn fetch(&self) -> Result<Snapshot, CoreError> {
        let _guard = self.inner.in_flight.lock().await;
        let raw = self
            .inner
            .client
            .network_status()
            .await
            .map_err(CoreError::poll)?;
        Snapshot::try_from(raw)
    }

    /// One tick: fetch, then hand the outcome to the store tagged with
    /// `generation`. Returns `false` when the loop should end.
    async fn poll_once(&self, generation: u64) -> bool {
        match self.fetch().await {
            Ok(snapshot) => {
                let update = StateUpdate::Replace {
                    generation,
                    snapshot,
                };
                if self.inner.store.apply(update) == Outcome::Discarded {
                    debug!(generation, "late snapshot dropped");
                    return false;
                }
                true
            }
            Err(e) => {
                warn!(error = %e, generation, "snapshot poll failed, disconnecting");
                let reason = e.to_string();
                let entry = LogEntry::critical(
                    format!("Connection to audit service lost: {reason}"),
                    Utc::now(),
                );
                self.inner.store.apply(StateUpdate::PollFailed {
                    generation,
                    entry,
                    reason,
                });
                if let Some(cancel) = self.inner.cancel.lock().await.take_if(|_| {
                    self.inner.generation.load(Ordering::SeqCst) == generation
                }) {
                    cancel.cancel();
                }
                false
            }
        }
    }
}

/// Fetch on every tick until cancelled or a poll fails.
async fn poll_task(poller: SnapshotPoller, generation: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(poller.inner.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !poller.poll_once(generation).await {
                    break;
                }
            }
        }
    }
    debug!(generation, "poll loop exited");
}
