use crate::engine::{QualityBuilder, RepQuality};

use super::{SwingAngles, SwingPhase};

/// Extremes seen across one swing, reset when the rep completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingMetrics {
    pub max_spine: f64,
    pub max_arm: f64,
    pub min_knee: f64,
}

impl SwingMetrics {
    pub fn new() -> Self {
        Self {
            max_spine: 0.0,
            max_arm: 0.0,
            min_knee: 180.0,
        }
    }

    pub fn observe(&mut self, angles: &SwingAngles) {
        self.max_spine = self.max_spine.max(angles.spine);
        self.max_arm = self.max_arm.max(angles.arm.abs());
        self.min_knee = self.min_knee.min(angles.knee);
    }
}

impl Default for SwingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// How representative a frame is of `phase`; higher is better.
pub fn peak_score(phase: SwingPhase, angles: &SwingAngles) -> f64 {
    match phase {
        SwingPhase::Top => angles.arm.abs(),
        SwingPhase::Bottom => angles.spine,
        SwingPhase::Connect | SwingPhase::Release => 90.0 - angles.arm.abs(),
    }
}

/// Knee angle of a locked-out leg; flexion is measured from here.
const STRAIGHT_KNEE: f64 = 175.0;

pub fn score_rep(metrics: &SwingMetrics) -> RepQuality {
    let knee_flexion = (STRAIGHT_KNEE - metrics.min_knee).max(0.0);
    let mut quality = QualityBuilder::new()
        .metric("maxSpineAngle", metrics.max_spine)
        .metric("maxArmAngle", metrics.max_arm)
        .metric("kneeFlexion", knee_flexion);

    if metrics.max_spine < 40.0 {
        quality.deduct(20, "Hinge deeper at the bottom");
    } else if metrics.max_spine <= 55.0 {
        quality.deduct(10, "Hinge a little deeper");
    }

    if metrics.max_arm < 60.0 {
        quality.deduct(15, "Drive your hips harder to float the bell");
    } else if metrics.max_arm <= 75.0 {
        quality.deduct(5, "Finish with a stronger hip snap");
    }

    if knee_flexion > 30.0 {
        quality.deduct(15, "Hinge, don't squat");
    }

    quality.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::quality::GREAT_REP;

    fn metrics(max_spine: f64, max_arm: f64, min_knee: f64) -> SwingMetrics {
        SwingMetrics {
            max_spine,
            max_arm,
            min_knee,
        }
    }

    #[test]
    fn clean_swing_scores_full_marks() {
        let quality = score_rep(&metrics(70.0, 85.0, 165.0));
        assert_eq!(quality.score, 100);
        assert_eq!(quality.feedback, vec![GREAT_REP.to_string()]);
        assert_eq!(quality.metrics["kneeFlexion"], 10.0);
    }

    #[test]
    fn deductions_stack() {
        let quality = score_rep(&metrics(30.0, 50.0, 130.0));
        assert_eq!(quality.score, 100 - 20 - 15 - 15);
        assert_eq!(quality.feedback.len(), 3);
    }

    #[test]
    fn borderline_bands_take_small_deductions() {
        assert_eq!(score_rep(&metrics(50.0, 90.0, 170.0)).score, 90);
        assert_eq!(score_rep(&metrics(60.0, 70.0, 170.0)).score, 95);
    }

    #[test]
    fn observe_tracks_magnitude_of_arm() {
        let mut m = SwingMetrics::new();
        m.observe(&SwingAngles {
            arm: -80.0,
            spine: 45.0,
            hip: 120.0,
            knee: 150.0,
            wrist_height: 0.0,
        });
        assert_eq!(m.max_arm, 80.0);
        assert_eq!(m.max_spine, 45.0);
        assert_eq!(m.min_knee, 150.0);
    }

    #[test]
    fn peak_scores_by_phase() {
        let angles = SwingAngles {
            arm: -20.0,
            spine: 50.0,
            hip: 120.0,
            knee: 170.0,
            wrist_height: 0.0,
        };
        assert_eq!(peak_score(SwingPhase::Top, &angles), 20.0);
        assert_eq!(peak_score(SwingPhase::Bottom, &angles), 50.0);
        assert_eq!(peak_score(SwingPhase::Connect, &angles), 70.0);
    }
}
