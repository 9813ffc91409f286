use std::io::Read;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::dedup::{dedupe_batch, NaturalKey};
use crate::error::Result;
use crate::normalizer::{normalize, read_rows};
use crate::store::TransactionStore;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportResult {
    /// Rows that normalized into a candidate.
    pub parsed: usize,
    /// Rows dropped as unreadable or for a missing date, description or amount.
    pub dropped: usize,
    /// Candidates collapsed because the batch repeated a natural key.
    pub batch_duplicates: usize,
    pub imported: usize,
    /// Candidates already present in the store.
    pub skipped: usize,
}

impl ImportResult {
    pub fn merge(&mut self, other: &ImportResult) {
        self.parsed += other.parsed;
        self.dropped += other.dropped;
        self.batch_duplicates += other.batch_duplicates;
        self.imported += other.imported;
        self.skipped += other.skipped;
    }
}

/// Normalize, dedupe and store the rows of a CSV stream. Rows whose natural
/// key is already stored are skipped, so importing the same data again adds
/// nothing. A store failure aborts the import; rows inserted before it stay.
pub fn import_reader<R: Read>(conn: &Connection, reader: R) -> Result<ImportResult> {
    let mut normalizer = normalize(read_rows(reader)?);
    let batch = dedupe_batch(normalizer.by_ref());

    let mut result = ImportResult {
        parsed: batch.rows.len() + batch.duplicates,
        dropped: normalizer.dropped(),
        batch_duplicates: batch.duplicates,
        ..Default::default()
    };

    let store = TransactionStore::new(conn);
    for row in &batch.rows {
        if store.exists(&NaturalKey::from(row))? {
            debug!(date = %row.transaction_date, description = %row.description, "already stored");
            result.skipped += 1;
            continue;
        }
        store.insert(row)?;
        result.imported += 1;
    }

    info!(
        parsed = result.parsed,
        dropped = result.dropped,
        batch_duplicates = result.batch_duplicates,
        imported = result.imported,
        skipped = result.skipped,
        "import finished"
    );
    Ok(result)
}

pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let file = std::fs::File::open(file_path)?;
    info!(file = %file_path.display(), "importing");
    import_reader(conn, std::io::BufReader::new(file))
}
