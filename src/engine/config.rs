use serde::{Deserialize, Serialize};

/// Debounce settings shared by every analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Frames that must be spent in a phase before any transition is considered.
    pub min_dwell_frames: u32,

    /// Consecutive frames a sustained condition must hold before it fires.
    pub confirm_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_dwell_frames: 2,
            confirm_frames: 2,
        }
    }
}
