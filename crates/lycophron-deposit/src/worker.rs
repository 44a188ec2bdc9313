use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{PublishClient, PublishReceipt};
use crate::error::{DepositError, Result};
use crate::record::Record;

/// A unit of publishing work.
#[derive(Debug, Clone)]
pub struct PublishTask {
    pub record: Record,
}

/// Result of running one [`PublishTask`].
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub record_id: String,
    pub result: std::result::Result<PublishReceipt, String>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runner that accepts publish tasks and reports their outcomes.
#[async_trait]
pub trait TaskRunner: Send + Sync + Sized {
    /// Queue a task, waiting while the queue is full.
    async fn submit(&self, task: PublishTask) -> Result<()>;

    /// Stop accepting tasks and wait for queued ones to finish.
    async fn finish(self) -> Result<Vec<TaskOutcome>>;
}

/// Handle to a background publish worker started by [`spawn_worker`].
#[derive(Debug)]
pub struct WorkerHandle {
    sender: mpsc::Sender<PublishTask>,
    join: JoinHandle<Vec<TaskOutcome>>,
}

/// Start a background worker draining a bounded queue of publish tasks.
///
/// Tasks run one at a time in submission order. Must be called from within a
/// tokio runtime.
pub fn spawn_worker<C>(client: C, capacity: usize) -> WorkerHandle
where
    C: PublishClient + 'static,
{
    let (sender, mut receiver) = mpsc::channel::<PublishTask>(capacity.max(1));

    let join = tokio::spawn(async move {
        tracing::info!(event = "worker_started", client = client.name());
        let mut outcomes = Vec::new();

        while let Some(task) = receiver.recv().await {
            let record_id = task.record.id.clone();
            let result = client
                .publish(&task.record)
                .await
                .map_err(|err| err.to_string());

            match &result {
                Ok(receipt) => tracing::info!(
                    event = "record_published",
                    record_id = %record_id,
                    remote_id = receipt.remote_id.as_deref().unwrap_or("-")
                ),
                Err(message) => tracing::warn!(
                    event = "record_failed",
                    record_id = %record_id,
                    error = %message
                ),
            }

            outcomes.push(TaskOutcome { record_id, result });
        }

        tracing::info!(event = "worker_finished", tasks = outcomes.len());
        outcomes
    });

    WorkerHandle { sender, join }
}

#[async_trait]
impl TaskRunner for WorkerHandle {
    async fn submit(&self, task: PublishTask) -> Result<()> {
        self.sender
            .send(task)
            .await
            .map_err(|_| DepositError::WorkerClosed)
    }

    async fn finish(self) -> Result<Vec<TaskOutcome>> {
        let WorkerHandle { sender, join } = self;
        drop(sender);
        join.await
            .map_err(|err| DepositError::Worker(err.to_string()))
    }
}
