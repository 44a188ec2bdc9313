use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lycophron_deposit::Record;

use crate::workspace::{WorkspaceError, WorkspaceResult};

const UTF8_BOM: char = '\u{feff}';

/// Header row and data rows of a CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Write a template: a single header row and no data rows.
pub fn write_template(path: &Path, headers: &[String]) -> WorkspaceResult<u64> {
    write_rows(path, headers, std::iter::empty::<Vec<String>>())
}

/// Write records under `columns`, leaving cells without a value empty.
pub fn write_records(path: &Path, columns: &[String], records: &[Record]) -> WorkspaceResult<u64> {
    let rows = records.iter().map(|record| {
        columns
            .iter()
            .map(|column| record.value(column).unwrap_or_default())
            .collect::<Vec<String>>()
    });
    write_rows(path, columns, rows)
}

/// Read only the first row of a CSV file.
///
/// An empty file yields no headers.
pub fn read_headers(path: &Path) -> WorkspaceResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    match reader.records().next() {
        Some(record) => Ok(normalize_headers(&record?)),
        None => Ok(Vec::new()),
    }
}

/// Read the header row and every data row.
///
/// Rows may differ in length from the header; callers decide how to treat
/// them.
pub fn read_table(path: &Path) -> WorkspaceResult<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = normalize_headers(reader.headers()?);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}

/// Header cells as written, except for a leading byte order mark.
fn normalize_headers(record: &csv::StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(idx, header)| match idx {
            0 => header.trim_start_matches(UTF8_BOM).to_string(),
            _ => header.to_string(),
        })
        .collect()
}

fn write_rows<I>(path: &Path, headers: &[String], rows: I) -> WorkspaceResult<u64>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let counting = CountingWriter::new(BufWriter::new(File::create(path)?));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let mut counting = writer
        .into_inner()
        .map_err(|err| WorkspaceError::Io(err.into_error()))?;
    counting.flush()?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
