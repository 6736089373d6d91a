//! Handle to a running engine.

use autoroom_common::EngineError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::router::VoiceTransition;

/// Feeds transitions to a running engine and shuts it down.
///
/// Dropping the handle without calling [`EngineHandle::shutdown`] leaves the
/// background tasks running for the life of the runtime.
pub struct EngineHandle {
    tx: mpsc::Sender<VoiceTransition>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    dispatch: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl EngineHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<VoiceTransition>,
        cancel: CancellationToken,
        tracker: TaskTracker,
        dispatch: JoinHandle<()>,
        sweeper: JoinHandle<()>,
    ) -> Self {
        Self {
            tx,
            cancel,
            tracker,
            dispatch,
            sweeper,
        }
    }

    /// A sender the gateway adapter can own.
    pub fn sender(&self) -> mpsc::Sender<VoiceTransition> {
        self.tx.clone()
    }

    /// Queue a transition for dispatch.
    pub async fn submit(&self, transition: VoiceTransition) -> Result<(), EngineError> {
        self.tx
            .send(transition)
            .await
            .map_err(|_| EngineError::ShuttingDown)
    }

    /// Number of handlers currently running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop the sweeper and the dispatch loop, then wait for every running
    /// handler to finish. Transitions already queued are still handled;
    /// nothing is aborted mid-operation.
    pub async fn shutdown(self) {
        info!("Room manager shutting down");
        self.cancel.cancel();

        if let Err(e) = self.sweeper.await {
            warn!(error = %e, "Sweeper task ended abnormally");
        }
        if let Err(e) = self.dispatch.await {
            warn!(error = %e, "Dispatch task ended abnormally");
        }

        self.tracker.close();
        self.tracker.wait().await;
        info!("Room manager stopped");
    }
}
