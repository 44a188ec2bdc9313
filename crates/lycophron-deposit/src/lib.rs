//! Deposit contracts: local records, storage, publishing and the background
//! worker that drives publication.

pub mod client;
pub mod error;
pub mod record;
pub mod storage;
pub mod worker;

pub use client::{DryRunClient, PublishClient, PublishReceipt};
pub use error::{DepositError, Result};
pub use record::{FILENAMES_SEPARATOR, Record, RecordStatus};
pub use storage::{MemoryStorage, StatusUpdate, Storage};
pub use worker::{PublishTask, TaskOutcome, TaskRunner, WorkerHandle, spawn_worker};
