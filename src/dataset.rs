//! Cumulative forecast dataset
//!
//! The dataset is a CSV file with one row per natural key. Each run reads it
//! once, merge-upserts the freshly extracted records and rewrites it once.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{DATASET_COLUMNS, ForecastRecord, NaturalKey};
use crate::{ForecastError, Result};

/// Row counts of one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Rows in the dataset before the merge
    pub prior: usize,
    /// Keys that were not in the dataset yet
    pub inserted: usize,
    /// Existing keys whose payload was replaced
    pub updated: usize,
    /// Rows written
    pub total: usize,
}

/// Drop repeated keys, keeping the first position and the last payload
fn dedup_last_wins(records: Vec<ForecastRecord>) -> Vec<ForecastRecord> {
    let mut positions: HashMap<NaturalKey, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<ForecastRecord> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(&record.key()) {
            Some(&position) => unique[position].update_payload(&record),
            None => {
                positions.insert(record.key(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

/// Merge-upsert `new` into `prior`.
///
/// Prior rows whose key is absent from `new` are kept unchanged and in their
/// original order; they are followed by the new rows in extraction order.
/// A key present in both ends up with the new payload.
#[must_use]
pub fn merge_records(
    prior: Vec<ForecastRecord>,
    new: Vec<ForecastRecord>,
) -> (Vec<ForecastRecord>, MergeSummary) {
    let prior_len = prior.len();
    let new = dedup_last_wins(new);
    let new_keys: HashSet<NaturalKey> = new.iter().map(ForecastRecord::key).collect();

    let mut seen: HashSet<NaturalKey> = HashSet::with_capacity(prior_len);
    let mut updated = 0;
    let mut merged: Vec<ForecastRecord> = Vec::with_capacity(prior_len + new.len());

    for record in prior {
        let key = record.key();
        if !seen.insert(key.clone()) {
            // Already handled this key; a hand-edited file may repeat it
            continue;
        }
        if new_keys.contains(&key) {
            updated += 1;
        } else {
            merged.push(record);
        }
    }

    let inserted = new.len() - updated;
    merged.extend(new);

    let summary = MergeSummary {
        prior: prior_len,
        inserted,
        updated,
        total: merged.len(),
    };
    (merged, summary)
}

/// Read a dataset file; `None` when it does not exist yet
pub fn load_dataset(path: &Path) -> Result<Option<Vec<ForecastRecord>>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ForecastError::dataset(format!("Failed to open {}: {e}", path.display())))?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(DATASET_COLUMNS.iter().copied()) {
        return Err(ForecastError::dataset(format!(
            "{} has unexpected columns: {}",
            path.display(),
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ForecastRecord>, csv::Error>>()
        .map_err(|e| ForecastError::dataset(format!("Failed to read {}: {e}", path.display())))?;
    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(Some(records))
}

/// Write `records` with a header row, replacing the file in one rename
pub fn write_dataset(path: &Path, records: &[ForecastRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    let written = write_rows(&staging, records)
        .and_then(|()| fs::rename(&staging, path).map_err(ForecastError::from));
    if written.is_err() && staging.exists() {
        if let Err(e) = fs::remove_file(&staging) {
            warn!("Failed to remove {}: {e}", staging.display());
        }
    }
    written
}

fn write_rows(staging: &Path, records: &[ForecastRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(staging)?;
    writer.write_record(DATASET_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Merge `records` into the dataset at `path`, creating it on the first run
pub fn merge_and_persist(records: Vec<ForecastRecord>, path: &Path) -> Result<MergeSummary> {
    let prior = match load_dataset(path)? {
        Some(prior) => prior,
        None => {
            info!("No dataset at {}, starting a new one", path.display());
            Vec::new()
        }
    };

    let (merged, summary) = merge_records(prior, records);
    write_dataset(path, &merged)?;
    info!(
        "Wrote {} rows to {} ({} inserted, {} updated)",
        summary.total,
        path.display(),
        summary.inserted,
        summary.updated
    );
    Ok(summary)
}
