use serde::{Deserialize, Serialize};

use crate::skeleton::Side;

/// Tunable thresholds for the kettlebell swing phase machine.
///
/// Arm angles are compared by magnitude, so these hold for either camera side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KettlebellConfig {
    /// TOP→CONNECT: arm back near vertical...
    pub connect_arm_max: f64,
    /// ...with the torso still upright.
    pub connect_spine_max: f64,

    /// CONNECT→BOTTOM: arm vertical between the legs, torso hinged, hips flexed.
    pub bottom_arm_max: f64,
    pub bottom_spine_min: f64,
    pub bottom_hip_max: f64,

    /// BOTTOM→RELEASE: arm swinging forward again with the torso upright.
    pub release_arm_min: f64,
    pub release_spine_max: f64,

    /// RELEASE→TOP gates, checked on the frame the wrist apex is confirmed.
    pub top_spine_max: f64,
    pub top_hip_min: f64,
    /// Apexes below this wrist height (pixels above the shoulders) are ignored.
    pub wrist_floor: f64,

    /// Wrist samples kept while in RELEASE.
    pub wrist_history: usize,
    /// Half-width of the moving average over wrist height.
    pub smoothing_radius: usize,

    /// Arm and wrist to read first; `None` means left with automatic fallback.
    pub preferred_side: Option<Side>,
}

impl Default for KettlebellConfig {
    fn default() -> Self {
        Self {
            connect_arm_max: 22.0,
            connect_spine_max: 22.0,
            bottom_arm_max: 12.0,
            bottom_spine_min: 35.0,
            bottom_hip_max: 140.0,
            release_arm_min: 15.0,
            release_spine_max: 22.0,
            top_spine_max: 30.0,
            top_hip_min: 140.0,
            wrist_floor: 0.0,
            wrist_history: 30,
            smoothing_radius: 2,
            preferred_side: None,
        }
    }
}
