use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use lycophron_core::{FILENAMES_FIELD, ID_FIELD};

use crate::error::{DepositError, Result};

/// Separator between file names inside the `filenames` column.
pub const FILENAMES_SEPARATOR: char = '\n';

/// Publication state of a local record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    New,
    Queued,
    Published,
    Failed,
}

impl RecordStatus {
    /// Records in these states are picked up by the next publish.
    ///
    /// `Queued` is included so records left queued by an interrupted run are
    /// submitted again.
    pub fn is_pending(self) -> bool {
        !matches!(self, RecordStatus::Published)
    }
}

/// A deposit record loaded from one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub filenames: Vec<String>,
    /// Non-empty cells keyed by column name, values kept verbatim.
    pub metadata: BTreeMap<String, String>,
    pub status: RecordStatus,
    pub remote_id: Option<String>,
    pub error: Option<String>,
    pub updated_at: String,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filenames: Vec::new(),
            metadata: BTreeMap::new(),
            status: RecordStatus::New,
            remote_id: None,
            error: None,
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Build a record from a CSV row.
    ///
    /// `row` is the 1-based data row number used in error messages. A
    /// header naming the same column twice is rejected, since a record holds
    /// one value per column.
    pub fn from_row<H, V>(row: usize, headers: &[H], values: &[V]) -> Result<Self>
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        if let Some(column) = first_repeated(headers) {
            return Err(DepositError::DuplicateColumn(column.to_string()));
        }
        if headers.len() != values.len() {
            return Err(DepositError::RowLength {
                row,
                expected: headers.len(),
                actual: values.len(),
            });
        }

        let mut id = None;
        let mut filenames = Vec::new();
        let mut metadata = BTreeMap::new();

        for (header, value) in headers.iter().zip(values) {
            let header = header.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match header {
                ID_FIELD => id = Some(value.to_string()),
                FILENAMES_FIELD => filenames = split_filenames(value),
                _ => {
                    metadata.insert(header.to_string(), value.to_string());
                }
            }
        }

        let id = id.ok_or(DepositError::MissingId(row))?;
        let mut record = Record::new(id);
        record.filenames = filenames;
        record.metadata = metadata;
        Ok(record)
    }

    /// Value for a column, including the `id` and `filenames` columns.
    pub fn value(&self, column: &str) -> Option<String> {
        match column {
            ID_FIELD => Some(self.id.clone()),
            FILENAMES_FIELD if self.filenames.is_empty() => None,
            FILENAMES_FIELD => {
                let separator = FILENAMES_SEPARATOR.to_string();
                Some(self.filenames.join(separator.as_str()))
            }
            _ => self.metadata.get(column).cloned(),
        }
    }

    pub fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
        self.updated_at = Utc::now().to_rfc3339();
    }
}

fn first_repeated<H: AsRef<str>>(headers: &[H]) -> Option<&str> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(H::as_ref)
        .find(|header| !seen.insert(*header))
}

fn split_filenames(value: &str) -> Vec<String> {
    value
        .split(FILENAMES_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
