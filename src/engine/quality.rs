use std::collections::BTreeMap;

use serde::Serialize;

pub const GREAT_REP: &str = "Great rep!";

/// Form score for one completed rep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepQuality {
    /// 0..=100.
    pub score: u8,
    /// Never empty.
    pub feedback: Vec<String>,
    pub metrics: BTreeMap<&'static str, f64>,
}

/// Accumulates stacked deductions from a perfect 100.
#[derive(Debug, Clone)]
pub struct QualityBuilder {
    score: i32,
    feedback: Vec<String>,
    metrics: BTreeMap<&'static str, f64>,
}

impl QualityBuilder {
    pub fn new() -> Self {
        Self {
            score: 100,
            feedback: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(mut self, name: &'static str, value: f64) -> Self {
        self.metrics.insert(name, value);
        self
    }

    pub fn deduct(&mut self, points: i32, message: &str) {
        self.score -= points;
        self.feedback.push(message.to_string());
    }

    pub fn finish(mut self) -> RepQuality {
        if self.feedback.is_empty() {
            self.feedback.push(GREAT_REP.to_string());
        }
        RepQuality {
            score: self.score.clamp(0, 100) as u8,
            feedback: self.feedback,
            metrics: self.metrics,
        }
    }
}

impl Default for QualityBuilder {
    fn default() -> Self {
        Self::new()
    }
}
