//! Scores detected checkpoint frames against hand-annotated ones.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::CompletedRep;

/// Detections within this many frames of an annotation count as hits.
pub const FRAME_TOLERANCE: u64 = 2;

/// One hand-labelled checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub frame_index: u64,
    pub position: String,
    #[serde(default)]
    pub notes: String,
}

pub fn load_annotations(path: &Path) -> Result<Vec<Annotation>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse annotations in {}", path.display()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Detected frames with no annotation nearby.
    pub unmatched_detections: Vec<u64>,
    /// Annotated frames with no detection nearby.
    pub missed_annotations: Vec<u64>,
}

impl PositionMetrics {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Compare detected and annotated frames for one position name.
pub fn evaluate_position(detected: &BTreeSet<u64>, annotated: &BTreeSet<u64>) -> PositionMetrics {
    let near = |frame: u64, others: &BTreeSet<u64>| {
        others
            .range(frame.saturating_sub(FRAME_TOLERANCE)..=frame + FRAME_TOLERANCE)
            .next()
            .is_some()
    };

    let mut metrics = PositionMetrics::default();
    for &frame in detected {
        if near(frame, annotated) {
            metrics.true_positives += 1;
        } else {
            metrics.false_positives += 1;
            metrics.unmatched_detections.push(frame);
        }
    }
    for &frame in annotated {
        if !near(frame, detected) {
            metrics.false_negatives += 1;
            metrics.missed_annotations.push(frame);
        }
    }
    metrics
}

/// Per-position metrics for every position named by either side.
///
/// Checkpoints without a source frame index are skipped.
pub fn evaluate_reps<A>(
    reps: &[CompletedRep<A>],
    annotations: &[Annotation],
) -> BTreeMap<String, PositionMetrics> {
    let mut detected: BTreeMap<String, BTreeSet<u64>> = BTreeMap::new();
    for position in reps.iter().flat_map(|rep| rep.positions.iter()) {
        if let Some(frame) = position.frame_index {
            detected
                .entry(position.name.to_string())
                .or_default()
                .insert(frame);
        }
    }

    let mut annotated: BTreeMap<String, BTreeSet<u64>> = BTreeMap::new();
    for annotation in annotations {
        annotated
            .entry(annotation.position.clone())
            .or_default()
            .insert(annotation.frame_index);
    }

    let names: BTreeSet<&String> = detected.keys().chain(annotated.keys()).collect();
    let empty = BTreeSet::new();
    names
        .into_iter()
        .map(|name| {
            let metrics = evaluate_position(
                detected.get(name).unwrap_or(&empty),
                annotated.get(name).unwrap_or(&empty),
            );
            (name.clone(), metrics)
        })
        .collect()
}
