use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::diag::{DiagLevel, DiagSink, NoopSink};
use crate::input::{self, Dataset, DatasetError};

pub const DEFAULT_TARGET_RECALL: f64 = 0.9;

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("no counts recorded for threshold {threshold}")]
    UnknownThreshold { threshold: f64 },
    #[error("dataset holds no thresholds")]
    EmptyDataset,
    #[error("upper threshold not set; run find_upper_threshold first")]
    UpperThresholdUnset,
}

/// Picks the decision threshold with the best F1 score among those meeting
/// a recall floor.
///
/// Two phases: `find_upper_threshold` bisects the descending-sorted
/// thresholds for the largest one whose recall still reaches the target,
/// then `find_best_threshold` scans every threshold at or below it for the
/// maximal F1. `process` runs both after a load.
pub struct ThresholdFinder {
    target_recall: f64,
    dataset: Dataset,
    upper_threshold: Option<f64>,
    best_threshold: Option<f64>,
    diag: Box<dyn DiagSink>,
}

impl fmt::Debug for ThresholdFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThresholdFinder")
            .field("target_recall", &self.target_recall)
            .field("thresholds", &self.dataset.len())
            .field("upper_threshold", &self.upper_threshold)
            .field("best_threshold", &self.best_threshold)
            .finish_non_exhaustive()
    }
}

impl ThresholdFinder {
    pub fn new(target_recall: f64) -> Self {
        Self::with_diagnostics(target_recall, Box::new(NoopSink))
    }

    pub fn with_diagnostics(target_recall: f64, diag: Box<dyn DiagSink>) -> Self {
        Self {
            target_recall,
            dataset: Dataset::new(),
            upper_threshold: None,
            best_threshold: None,
            diag,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn upper_threshold(&self) -> Option<f64> {
        self.upper_threshold
    }

    pub fn best_threshold(&self) -> Option<f64> {
        self.best_threshold
    }

    /// Replaces the dataset wholesale and clears both derived thresholds.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.upper_threshold = None;
        self.best_threshold = None;
    }

    /// Loads counts from `path`, fully replacing previously loaded data.
    pub fn load_data(&mut self, path: &Path) -> Result<(), ThresholdError> {
        let dataset = input::load_dataset(path, self.diag.as_ref())?;
        self.set_dataset(dataset);
        Ok(())
    }

    /// TP / (TP + FN) at `threshold`; 0.0 when there are no actual
    /// positives, with a warn record.
    pub fn recall_at(&self, threshold: f64) -> Result<f64, ThresholdError> {
        let counts = self
            .dataset
            .get(threshold)
            .ok_or(ThresholdError::UnknownThreshold { threshold })?;
        let actual_pos = counts.true_pos + counts.false_neg;
        if actual_pos == 0 {
            self.diag.record(
                DiagLevel::Warn,
                &format!("recall: TP + FN is zero at threshold {threshold}"),
            );
            return Ok(0.0);
        }
        Ok(counts.true_pos as f64 / actual_pos as f64)
    }

    /// Harmonic mean of precision and recall at `threshold`; 0.0 when no
    /// positives were predicted or when precision and recall are both zero,
    /// with a warn record.
    pub fn f1_at(&self, threshold: f64) -> Result<f64, ThresholdError> {
        let counts = self
            .dataset
            .get(threshold)
            .ok_or(ThresholdError::UnknownThreshold { threshold })?;
        let predicted_pos = counts.true_pos + counts.false_pos;
        if predicted_pos == 0 {
            self.diag.record(
                DiagLevel::Warn,
                &format!("f1: TP + FP is zero at threshold {threshold}"),
            );
            return Ok(0.0);
        }
        let precision = counts.true_pos as f64 / predicted_pos as f64;
        let recall = self.recall_at(threshold)?;
        if precision + recall == 0.0 {
            self.diag.record(
                DiagLevel::Warn,
                &format!("f1: precision + recall is zero at threshold {threshold}"),
            );
            return Ok(0.0);
        }
        Ok(2.0 * precision * recall / (precision + recall))
    }

    /// Bisects the descending-sorted thresholds for the largest one whose
    /// recall reaches the target.
    ///
    /// Precondition on the data: recall must be non-increasing in
    /// threshold. The bisection does not verify this; on non-monotonic
    /// data the result is whatever it converges to on the descending index
    /// space. When no threshold reaches the target the search lands on the
    /// smallest threshold, the recall-maximizing edge.
    pub fn find_upper_threshold(&mut self) -> Result<f64, ThresholdError> {
        if self.dataset.is_empty() {
            return Err(ThresholdError::EmptyDataset);
        }
        let mut thresholds: Vec<f64> = self.dataset.thresholds().collect();
        thresholds.reverse();

        let mut lo = 0usize;
        let mut hi = thresholds.len() - 1;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let recall = self.recall_at(thresholds[mid])?;
            self.diag.record(
                DiagLevel::Debug,
                &format!("recall {recall} at threshold {}", thresholds[mid]),
            );
            if recall >= self.target_recall {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        let upper = thresholds[lo];
        self.upper_threshold = Some(upper);
        self.diag.record(
            DiagLevel::Info,
            &format!(
                "upper threshold for recall >= {}: {upper}",
                self.target_recall
            ),
        );
        Ok(upper)
    }

    /// Scans every threshold at or below the upper threshold, in ascending
    /// order, for the maximal F1. Strict comparison: on ties the earlier,
    /// smaller threshold stands.
    ///
    /// Errors when `find_upper_threshold` has not run since the last load.
    pub fn find_best_threshold(&mut self) -> Result<f64, ThresholdError> {
        let upper = match self.upper_threshold {
            Some(upper) => upper,
            None => {
                self.diag.record(
                    DiagLevel::Error,
                    "upper threshold not set; run find_upper_threshold first",
                );
                return Err(ThresholdError::UpperThresholdUnset);
            }
        };

        let candidates: Vec<f64> = self.dataset.thresholds().filter(|t| *t <= upper).collect();

        let mut best_threshold = None;
        let mut best_f1 = -1.0f64;
        for threshold in candidates {
            let f1 = self.f1_at(threshold)?;
            self.diag.record(
                DiagLevel::Debug,
                &format!("f1 {f1} at threshold {threshold}"),
            );
            if f1 > best_f1 {
                best_f1 = f1;
                best_threshold = Some(threshold);
            }
        }

        let best = best_threshold.ok_or(ThresholdError::EmptyDataset)?;
        self.best_threshold = Some(best);
        self.diag.record(
            DiagLevel::Info,
            &format!("best threshold by f1: {best}"),
        );
        Ok(best)
    }

    /// Loads the data and runs both search phases; external callers use
    /// this one entry point.
    pub fn process(&mut self, path: &Path) -> Result<f64, ThresholdError> {
        self.load_data(path)?;
        self.find_upper_threshold()?;
        self.find_best_threshold()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/threshold/tests.rs"]
mod tests;
