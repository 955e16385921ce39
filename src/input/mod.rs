use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::diag::{DiagLevel, DiagSink};

/// Confusion-matrix counts recorded for a single decision threshold.
///
/// Counts are unsigned, so non-negativity holds by construction; a negative
/// count in the input is a deserialization failure, not a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConfusionCounts {
    #[serde(rename = "TP")]
    pub true_pos: u64,
    #[serde(rename = "FP")]
    pub false_pos: u64,
    #[serde(rename = "TN")]
    pub true_neg: u64,
    #[serde(rename = "FN")]
    pub false_neg: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRecord {
    threshold: f64,
    #[serde(flatten)]
    counts: ConfusionCounts,
}

// The outer container's keys carry no meaning; records may also arrive as a
// plain array. Keyed form is tried first so objects never fall through to
// the array branch.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDataset {
    Keyed(serde_json::Map<String, serde_json::Value>),
    Listed(Vec<RawRecord>),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("invalid data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-threshold confusion counts, iterated in ascending threshold order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<(f64, ConfusionCounts)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Records counts for a threshold. An existing entry for the same
    /// threshold is overwritten: last write wins.
    pub fn insert(&mut self, threshold: f64, counts: ConfusionCounts) {
        match self
            .records
            .binary_search_by(|(t, _)| t.total_cmp(&threshold))
        {
            Ok(idx) => self.records[idx].1 = counts,
            Err(idx) => self.records.insert(idx, (threshold, counts)),
        }
    }

    pub fn get(&self, threshold: f64) -> Option<ConfusionCounts> {
        self.records
            .binary_search_by(|(t, _)| t.total_cmp(&threshold))
            .ok()
            .map(|idx| self.records[idx].1)
    }

    pub fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|(t, _)| *t)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads per-threshold counts from a JSON file.
///
/// Accepts an object whose values are records, or an array of records.
/// Duplicate thresholds resolve in document order, later entries winning;
/// each one is reported through the sink.
pub fn load_dataset(path: &Path, diag: &dyn DiagSink) -> Result<Dataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => DatasetError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Load {
            path: path.to_path_buf(),
            source: err,
        },
    })?;

    let raw: RawDataset = serde_json::from_str(&text).map_err(|err| DatasetError::Parse {
        path: path.to_path_buf(),
        source: err,
    })?;

    let mut dataset = Dataset::new();
    match raw {
        RawDataset::Keyed(entries) => {
            for (_, value) in entries {
                let record: RawRecord =
                    serde_json::from_value(value).map_err(|err| DatasetError::Parse {
                        path: path.to_path_buf(),
                        source: err,
                    })?;
                insert_record(&mut dataset, record, diag);
            }
        }
        RawDataset::Listed(records) => {
            for record in records {
                insert_record(&mut dataset, record, diag);
            }
        }
    }

    diag.record(
        DiagLevel::Info,
        &format!(
            "loaded {} thresholds from {}",
            dataset.len(),
            path.display()
        ),
    );
    Ok(dataset)
}

fn insert_record(dataset: &mut Dataset, record: RawRecord, diag: &dyn DiagSink) {
    if dataset.get(record.threshold).is_some() {
        diag.record(
            DiagLevel::Warn,
            &format!(
                "duplicate threshold {}; keeping the later counts",
                record.threshold
            ),
        );
    }
    dataset.insert(record.threshold, record.counts);
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
