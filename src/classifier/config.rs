use serde::{Deserialize, Serialize};

/// Thresholds for telling exercises apart by knee asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    /// Asymmetry samples kept for the ratio test.
    pub max_samples: usize,
    /// No verdict before this many samples.
    pub min_samples: usize,
    /// Verdicts at or above this confidence lock immediately.
    pub lock_confidence: f64,
    /// Lock whatever the current verdict is after this many frames.
    pub max_frames: u32,

    /// Peak asymmetry that alone means a single-leg exercise.
    pub strong_asymmetry: f64,
    /// Degrees above `strong_asymmetry` at which confidence saturates.
    pub strong_saturation: f64,
    /// Asymmetry that counts towards the ratio test.
    pub moderate_asymmetry: f64,
    /// Share of samples above `moderate_asymmetry` needed for the ratio test.
    pub moderate_ratio: f64,
    /// Peak asymmetry below `bilateral_factor * moderate_asymmetry` means both
    /// legs move together.
    pub bilateral_factor: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_samples: 200,
            min_samples: 60,
            lock_confidence: 70.0,
            max_frames: 120,
            strong_asymmetry: 80.0,
            strong_saturation: 40.0,
            moderate_asymmetry: 35.0,
            moderate_ratio: 0.3,
            bilateral_factor: 0.7,
        }
    }
}
