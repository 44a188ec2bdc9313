use std::path::{Path, PathBuf};

use lycophron_deposit::{DepositError, MemoryStorage, Record, RecordStatus, StatusUpdate, Storage};

use super::atomic::write_json_atomic;
use super::WorkspaceResult;

/// Record storage persisted as a JSON array in the project data directory.
///
/// Every mutation rewrites the file atomically; a batch of status updates is
/// written once.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    inner: MemoryStorage,
}

impl JsonRecordStore {
    pub fn open(path: &Path) -> WorkspaceResult<Self> {
        let inner = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let records: Vec<Record> = serde_json::from_str(&content)?;
            MemoryStorage::from_records(records)
        } else {
            MemoryStorage::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn persist(&self) -> lycophron_deposit::Result<()> {
        let records = self.inner.records()?;
        write_json_atomic(&self.path, &records)
            .map_err(|err| DepositError::Storage(err.to_string()))
    }
}

impl Storage for JsonRecordStore {
    fn upsert(&mut self, records: Vec<Record>) -> lycophron_deposit::Result<usize> {
        let count = self.inner.upsert(records)?;
        self.persist()?;
        Ok(count)
    }

    fn records(&self) -> lycophron_deposit::Result<Vec<Record>> {
        self.inner.records()
    }

    fn update_status(
        &mut self,
        id: &str,
        status: RecordStatus,
        remote_id: Option<String>,
        error: Option<String>,
    ) -> lycophron_deposit::Result<()> {
        self.inner.update_status(id, status, remote_id, error)?;
        self.persist()
    }

    fn apply_updates(&mut self, updates: Vec<StatusUpdate>) -> lycophron_deposit::Result<()> {
        self.inner.apply_updates(updates)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("records.json");

        let mut store = JsonRecordStore::open(&path).expect("open empty");
        assert_eq!(store.len(), 0);
        store
            .upsert(vec![Record::new("b"), Record::new("a")])
            .expect("upsert");
        store
            .update_status("a", RecordStatus::Failed, None, Some("boom".to_string()))
            .expect("update");

        let reopened = JsonRecordStore::open(&path).expect("reopen");
        let records = reopened.records().expect("records");
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records[0].status, RecordStatus::Failed);
        assert_eq!(records[0].error.as_deref(), Some("boom"));
    }

    #[test]
    fn batched_updates_are_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");

        let mut store = JsonRecordStore::open(&path).expect("open");
        store
            .upsert(vec![Record::new("a"), Record::new("b")])
            .expect("upsert");
        store
            .apply_updates(vec![
                StatusUpdate::published("a", None),
                StatusUpdate::new("b", RecordStatus::Queued),
            ])
            .expect("apply");

        let statuses: Vec<RecordStatus> = JsonRecordStore::open(&path)
            .expect("reopen")
            .records()
            .expect("records")
            .iter()
            .map(|record| record.status)
            .collect();
        assert_eq!(statuses, vec![RecordStatus::Published, RecordStatus::Queued]);
    }

    #[test]
    fn a_failed_batch_is_not_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");

        let mut store = JsonRecordStore::open(&path).expect("open");
        store.upsert(vec![Record::new("a")]).expect("upsert");
        let err = store
            .apply_updates(vec![
                StatusUpdate::published("a", None),
                StatusUpdate::new("missing", RecordStatus::Queued),
            ])
            .expect_err("unknown record");
        assert!(matches!(err, DepositError::UnknownRecord(_)));

        let reopened = JsonRecordStore::open(&path).expect("reopen");
        assert_eq!(reopened.records().expect("records")[0].status, RecordStatus::New);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(JsonRecordStore::open(&path).is_err());
    }
}
