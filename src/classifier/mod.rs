//! Tells a kettlebell swing from a pistol squat by how differently the two
//! knees bend. Swings load both legs alike; pistols bend one and hold the
//! other straight.

pub mod config;

use std::sync::Arc;

use serde::Serialize;

use crate::engine::signal::BoundedHistory;
use crate::exercises::Exercise;
use crate::skeleton::{Side, Skeleton};
use crate::utils::logging::{default_sink, LogSink};
use crate::{log_debug, log_info};

pub use config::ClassifierConfig;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub exercise: Exercise,
    /// 0..=100.
    pub confidence: f64,
    pub reason: String,
}

impl DetectionResult {
    fn pending() -> Self {
        Self {
            exercise: Exercise::Unknown,
            confidence: 0.0,
            reason: "Collecting movement data".to_string(),
        }
    }
}

pub struct ExerciseClassifier {
    config: ClassifierConfig,
    samples: BoundedHistory<f64>,
    max_asymmetry: f64,
    frames_seen: u32,
    result: DetectionResult,
    locked: bool,
    sink: Arc<dyn LogSink>,
}

impl ExerciseClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_sink(config, default_sink())
    }

    pub fn with_sink(config: ClassifierConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            samples: BoundedHistory::new(config.max_samples),
            config,
            max_asymmetry: 0.0,
            frames_seen: 0,
            result: DetectionResult::pending(),
            locked: false,
            sink,
        }
    }

    /// Feed one frame. Frames after the lock are ignored.
    pub fn process_frame(&mut self, skeleton: &Skeleton) -> &DetectionResult {
        if self.locked {
            return &self.result;
        }
        self.frames_seen += 1;

        if let (Some(left), Some(right)) = (
            skeleton.try_knee_angle(Side::Left),
            skeleton.try_knee_angle(Side::Right),
        ) {
            let asymmetry = (left - right).abs();
            self.samples.push(asymmetry);
            self.max_asymmetry = self.max_asymmetry.max(asymmetry);
        }

        if self.samples.len() >= self.config.min_samples {
            self.result = self.classify();
            if self.result.confidence >= self.config.lock_confidence {
                self.lock("confident");
                return &self.result;
            }
        }

        if self.frames_seen >= self.config.max_frames {
            self.lock("frame_budget");
        }
        &self.result
    }

    pub fn result(&self) -> &DetectionResult {
        &self.result
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Force a verdict. Only honored while still undecided.
    pub fn lock_exercise(&mut self, exercise: Exercise) -> bool {
        if self.locked {
            return false;
        }
        self.result = DetectionResult {
            exercise,
            confidence: 100.0,
            reason: "Selected manually".to_string(),
        };
        self.lock("manual");
        true
    }

    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn max_asymmetry(&self) -> f64 {
        self.max_asymmetry
    }

    fn lock(&mut self, cause: &str) {
        self.locked = true;
        log_info!(
            self.sink,
            "exercise_locked",
            exercise = self.result.exercise.as_str(),
            confidence = self.result.confidence,
            cause = cause,
            frames = self.frames_seen
        );
    }

    fn classify(&self) -> DetectionResult {
        let c = &self.config;
        let max = self.max_asymmetry;
        let above = self
            .samples
            .iter()
            .filter(|&&a| a > c.moderate_asymmetry)
            .count();
        let ratio = above as f64 / self.samples.len().max(1) as f64;
        let bilateral_max = c.bilateral_factor * c.moderate_asymmetry;

        log_debug!(
            self.sink,
            "classifier_evaluated",
            samples = self.samples.len(),
            max_asymmetry = max,
            ratio = ratio
        );

        if max > c.strong_asymmetry {
            let excess = ((max - c.strong_asymmetry) / c.strong_saturation).min(1.0);
            DetectionResult {
                exercise: Exercise::PistolSquat,
                confidence: 70.0 + 30.0 * excess,
                reason: format!("One knee bent {max:.0}° more than the other"),
            }
        } else if max > c.moderate_asymmetry && ratio >= c.moderate_ratio {
            DetectionResult {
                exercise: Exercise::PistolSquat,
                confidence: (50.0 + 50.0 * ratio).min(100.0),
                reason: format!(
                    "{:.0}% of frames show over {:.0}° knee asymmetry",
                    ratio * 100.0,
                    c.moderate_asymmetry
                ),
            }
        } else if max < bilateral_max {
            DetectionResult {
                exercise: Exercise::KettlebellSwing,
                confidence: 70.0 + 30.0 * (1.0 - max / bilateral_max),
                reason: format!("Both knees move together (max asymmetry {max:.0}°)"),
            }
        } else {
            DetectionResult {
                exercise: Exercise::Unknown,
                confidence: (20.0 + 50.0 * ratio).min(60.0),
                reason: format!("Ambiguous knee asymmetry (max {max:.0}°)"),
            }
        }
    }
}
