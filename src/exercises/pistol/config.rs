use serde::{Deserialize, Serialize};

/// Signal whose running minimum marks the bottom of a pistol squat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TroughSignal {
    /// Negated ear y in pixels; falls back to the knee for descents that
    /// start without a visible ear.
    EarHeight,
    /// Working-leg knee angle in degrees.
    KneeAngle,
}

/// Tunable thresholds for the pistol squat phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PistolSquatConfig {
    /// STANDING→DESCENDING once the working knee bends below this.
    pub descend_knee_max: f64,
    /// BOTTOM→ASCENDING needs the smoothed knee rising and above this.
    pub ascend_knee_min: f64,
    /// ASCENDING→STANDING: knee straight enough...
    pub standing_knee_min: f64,
    /// ...and torso upright enough.
    pub standing_spine_max: f64,

    /// Frames leaning further than this are dropped without touching state.
    pub posture_spine_max: f64,

    pub trough_signal: TroughSignal,
    /// Rise above the running minimum that counts as ascending, per signal.
    pub ear_rise_px: f64,
    pub knee_rise_deg: f64,
    pub trough_confirm_frames: u32,

    /// Floor applied to the working knee before smoothing.
    pub min_knee_angle: f64,
    pub smoothing_alpha: f64,

    /// Knee difference that casts a working-leg vote.
    pub leg_vote_threshold: f64,
    pub leg_votes_to_lock: u32,

    /// Frames kept for picking the mid-descent and mid-ascent checkpoints.
    pub recent_frames: usize,
}

impl Default for PistolSquatConfig {
    fn default() -> Self {
        Self {
            descend_knee_max: 140.0,
            ascend_knee_min: 90.0,
            standing_knee_min: 150.0,
            standing_spine_max: 25.0,
            posture_spine_max: 60.0,
            trough_signal: TroughSignal::EarHeight,
            ear_rise_px: 5.0,
            knee_rise_deg: 2.0,
            trough_confirm_frames: 3,
            min_knee_angle: 30.0,
            smoothing_alpha: 0.3,
            leg_vote_threshold: 20.0,
            leg_votes_to_lock: 5,
            recent_frames: 90,
        }
    }
}
