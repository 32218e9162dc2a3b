//! CSV record loader.
//!
//! Reads `id`/`text` rows from a CSV file with a header row. Extra columns
//! are ignored, header names are trimmed, and values are kept verbatim as
//! strings (an ID of `007` stays `007`).

use std::path::Path;

use ragit_core::loader::{ID_COLUMN, RecordLoader, TEXT_COLUMN};
use ragit_types::error::LoadError;
use ragit_types::record::Record;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loads records from CSV files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvRecordLoader;

impl CsvRecordLoader {
    pub fn new() -> Self {
        Self
    }
}

impl RecordLoader for CsvRecordLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Record>, LoadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))?;
        let records = parse_records(&bytes)?;
        tracing::debug!(path = %path.display(), rows = records.len(), "Loaded CSV");
        Ok(records)
    }
}

/// Parse CSV bytes into records.
///
/// Fails with `MissingColumns` listing every required column the header
/// lacks, and with `Parse` on malformed rows.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Parse(e.to_string()))?
        .clone();
    let position = |column: &str| headers.iter().position(|h| h == column);

    let (id_idx, text_idx) = match (position(ID_COLUMN), position(TEXT_COLUMN)) {
        (Some(id), Some(text)) => (id, text),
        (id, text) => {
            let mut missing = Vec::new();
            if id.is_none() {
                missing.push(ID_COLUMN.to_string());
            }
            if text.is_none() {
                missing.push(TEXT_COLUMN.to_string());
            }
            return Err(LoadError::MissingColumns(missing));
        }
    };

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| LoadError::Parse(format!("row {}: {e}", line + 1)))?;
        let id = row.get(id_idx).unwrap_or_default();
        let text = row.get(text_idx).unwrap_or_default();
        records.push(Record::new(id, text));
    }
    Ok(records)
}
