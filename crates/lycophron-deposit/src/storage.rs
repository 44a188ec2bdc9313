use std::collections::BTreeMap;

use crate::error::{DepositError, Result};
use crate::record::{Record, RecordStatus};

/// A status change for one stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: String,
    pub status: RecordStatus,
    pub remote_id: Option<String>,
    pub error: Option<String>,
}

impl StatusUpdate {
    pub fn new(id: impl Into<String>, status: RecordStatus) -> Self {
        Self {
            id: id.into(),
            status,
            remote_id: None,
            error: None,
        }
    }

    pub fn published(id: impl Into<String>, remote_id: Option<String>) -> Self {
        Self {
            remote_id,
            ..Self::new(id, RecordStatus::Published)
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(id, RecordStatus::Failed)
        }
    }
}

/// Local record storage.
pub trait Storage {
    /// Insert records, replacing any stored record with the same id.
    ///
    /// Returns the number of records written.
    fn upsert(&mut self, records: Vec<Record>) -> Result<usize>;

    /// All records ordered by id.
    fn records(&self) -> Result<Vec<Record>>;

    /// Records awaiting publication, at most `limit` when given.
    fn pending(&self, limit: Option<usize>) -> Result<Vec<Record>> {
        let pending = self
            .records()?
            .into_iter()
            .filter(|record| record.status.is_pending());
        Ok(match limit {
            Some(limit) => pending.take(limit).collect(),
            None => pending.collect(),
        })
    }

    fn update_status(
        &mut self,
        id: &str,
        status: RecordStatus,
        remote_id: Option<String>,
        error: Option<String>,
    ) -> Result<()>;

    /// Apply several status changes in order.
    ///
    /// Persistent stores override this to write once per batch.
    fn apply_updates(&mut self, updates: Vec<StatusUpdate>) -> Result<()> {
        for update in updates {
            self.update_status(&update.id, update.status, update.remote_id, update.error)?;
        }
        Ok(())
    }
}

/// In-memory storage keyed by record id.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: BTreeMap<String, Record>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { records }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn upsert(&mut self, records: Vec<Record>) -> Result<usize> {
        let count = records.len();
        for record in records {
            self.records.insert(record.id.clone(), record);
        }
        Ok(count)
    }

    fn records(&self) -> Result<Vec<Record>> {
        Ok(self.records.values().cloned().collect())
    }

    fn update_status(
        &mut self,
        id: &str,
        status: RecordStatus,
        remote_id: Option<String>,
        error: Option<String>,
    ) -> Result<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| DepositError::UnknownRecord(id.to_string()))?;
        record.set_status(status);
        if remote_id.is_some() {
            record.remote_id = remote_id;
        }
        record.error = error;
        Ok(())
    }
}
