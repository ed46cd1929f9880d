//! Progress observation
//!
//! The observer is a background task that snapshots the shared counters on a
//! fixed interval and hands the copy to a renderer. It only ever reads the run
//! state, holding each lock just long enough to copy the values out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::state::{ProgressSnapshot, RunState};

/// Something that can display progress
pub trait ProgressRenderer: Send + Sync {
    /// Draw the latest snapshot
    fn render(&self, snapshot: &ProgressSnapshot);

    /// Remove any partially drawn output
    fn clear(&self);
}

/// Renderer that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ProgressRenderer for NullRenderer {
    fn render(&self, _snapshot: &ProgressSnapshot) {}

    fn clear(&self) {}
}

/// Handle to a running observer task
#[derive(Debug)]
pub struct ProgressObserver {
    handle: JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
}

impl ProgressObserver {
    /// Start polling `state` every `interval`
    pub fn spawn(
        state: Arc<RunState>,
        renderer: Arc<dyn ProgressRenderer>,
        interval: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        renderer.render(&state.snapshot());
                    }
                    _ = stop_rx.changed() => {
                        debug!("Progress observer received stop signal");
                        break;
                    }
                }
            }

            renderer.clear();
        });

        Self { handle, stop_tx }
    }

    /// Signal the observer and wait up to `join_timeout` for it to exit
    ///
    /// An observer that does not exit in time is aborted; returns whether it
    /// exited on its own.
    pub async fn stop(self, join_timeout: Duration) -> bool {
        let _ = self.stop_tx.send(true);
        let mut handle = self.handle;

        match tokio::time::timeout(join_timeout, &mut handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Progress observer ended abnormally: {}", e);
                false
            }
            Err(_) => {
                warn!(
                    "Progress observer did not stop within {}ms, abandoning it",
                    join_timeout.as_millis()
                );
                handle.abort();
                false
            }
        }
    }
}
