use std::{future::Future, pin::Pin};

use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::app_error::AppResult;

const FAILURE_CHANNEL_CAPACITY: usize = 64;

type WriteFuture = Pin<Box<dyn Future<Output = AppResult<()>> + Send>>;

struct QueuedWrite {
    label: &'static str,
    task: WriteFuture,
}

/// A write that failed after being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub label: &'static str,
    pub message: String,
}

/// Fire-and-forget queue for non-critical writes.
///
/// Callers never wait on the write and never see its error. Failures are
/// logged and published on a broadcast channel that any part of the process
/// can subscribe to.
#[derive(Clone)]
pub struct BackgroundWriter {
    tx: mpsc::Sender<QueuedWrite>,
    failures: broadcast::Sender<WriteFailure>,
}

impl BackgroundWriter {
    /// Starts the worker task. The worker exits once every writer clone is dropped.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        let handle = tokio::spawn(run_worker(rx, failures.clone()));
        (Self { tx, failures }, handle)
    }

    pub fn dispatch<F>(&self, label: &'static str, write: F)
    where
        F: Future<Output = AppResult<()>> + Send + 'static,
    {
        let queued = QueuedWrite {
            label,
            task: Box::pin(write),
        };
        if let Err(e) = self.tx.try_send(queued) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "queue closed",
            };
            warn!(label, reason, "Dropped background write");
            publish(
                &self.failures,
                WriteFailure {
                    label,
                    message: format!("dropped: {reason}"),
                },
            );
        }
    }

    pub fn subscribe_failures(&self) -> broadcast::Receiver<WriteFailure> {
        self.failures.subscribe()
    }
}

async fn run_worker(mut rx: mpsc::Receiver<QueuedWrite>, failures: broadcast::Sender<WriteFailure>) {
    info!("Background write worker started");
    while let Some(write) = rx.recv().await {
        match write.task.await {
            Ok(()) => debug!(label = write.label, "Background write done"),
            Err(e) => {
                warn!(label = write.label, error = %e, "Background write failed");
                publish(
                    &failures,
                    WriteFailure {
                        label: write.label,
                        message: e.to_string(),
                    },
                );
            }
        }
    }
    info!("Background write worker stopped");
}

fn publish(failures: &broadcast::Sender<WriteFailure>, failure: WriteFailure) {
    // No subscribers is fine; the failure has already been logged.
    let _ = failures.send(failure);
}
