use crate::engine::{QualityBuilder, RepQuality};
use crate::skeleton::Side;

use super::{SquatAngles, SquatPhase};

/// Extremes seen across one pistol squat, reset when the rep completes.
///
/// Knee minima are kept per side so frames seen before the working leg
/// locks are attributed to the right leg once it does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquatMetrics {
    pub working_leg: Side,
    pub min_left_knee: f64,
    pub min_right_knee: f64,
    pub max_spine: f64,
}

impl SquatMetrics {
    pub fn new() -> Self {
        Self::for_leg(Side::Left)
    }

    pub fn for_leg(working_leg: Side) -> Self {
        Self {
            working_leg,
            min_left_knee: 180.0,
            min_right_knee: 180.0,
            max_spine: 0.0,
        }
    }

    pub fn observe(&mut self, left_knee: f64, right_knee: f64, spine: f64) {
        self.min_left_knee = self.min_left_knee.min(left_knee);
        self.min_right_knee = self.min_right_knee.min(right_knee);
        self.max_spine = self.max_spine.max(spine);
    }

    pub fn min_knee(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.min_left_knee,
            Side::Right => self.min_right_knee,
        }
    }

    pub fn min_working_knee(&self) -> f64 {
        self.min_knee(self.working_leg)
    }

    pub fn min_extended_knee(&self) -> f64 {
        self.min_knee(self.working_leg.opposite())
    }
}

impl Default for SquatMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn peak_score(phase: SquatPhase, angles: &SquatAngles) -> f64 {
    match phase {
        SquatPhase::Standing => angles.working_knee,
        SquatPhase::Descending | SquatPhase::Bottom | SquatPhase::Ascending => {
            180.0 - angles.working_knee
        }
    }
}

pub fn score_rep(metrics: &SquatMetrics) -> RepQuality {
    let working_knee = metrics.min_working_knee();
    let extended_knee = metrics.min_extended_knee();
    let mut quality = QualityBuilder::new()
        .metric("depth", 180.0 - working_knee)
        .metric("maxSpineAngle", metrics.max_spine)
        .metric("minExtendedKnee", extended_knee);

    if working_knee > 90.0 {
        quality.deduct(25, "Go deeper");
    } else if working_knee >= 70.0 {
        quality.deduct(10, "Sink a little lower at the bottom");
    }

    if metrics.max_spine > 50.0 {
        quality.deduct(20, "Keep your chest up");
    } else if metrics.max_spine >= 35.0 {
        quality.deduct(5, "Lean forward a little less");
    }

    if extended_knee < 140.0 {
        quality.deduct(15, "Keep the extended leg straight");
    } else if extended_knee <= 160.0 {
        quality.deduct(5, "Lock out the extended leg");
    }

    quality.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::quality::GREAT_REP;

    fn metrics(min_working_knee: f64, max_spine: f64, min_extended_knee: f64) -> SquatMetrics {
        let mut metrics = SquatMetrics::for_leg(Side::Left);
        metrics.observe(min_working_knee, min_extended_knee, max_spine);
        metrics
    }

    #[test]
    fn deep_upright_rep_is_great() {
        let quality = score_rep(&metrics(55.0, 20.0, 172.0));
        assert_eq!(quality.score, 100);
        assert_eq!(quality.feedback, vec![GREAT_REP.to_string()]);
        assert_eq!(quality.metrics["depth"], 125.0);
    }

    #[test]
    fn shallow_rep_loses_most() {
        let quality = score_rep(&metrics(110.0, 55.0, 130.0));
        assert_eq!(quality.score, 100 - 25 - 20 - 15);
        assert_eq!(quality.feedback[0], "Go deeper");
    }

    #[test]
    fn middle_bands() {
        assert_eq!(score_rep(&metrics(80.0, 40.0, 150.0)).score, 80);
    }

    #[test]
    fn minima_follow_the_working_leg() {
        let mut metrics = SquatMetrics::new();
        metrics.observe(170.0, 100.0, 15.0);
        metrics.observe(170.0, 60.0, 15.0);
        assert_eq!(metrics.min_extended_knee(), 60.0);

        metrics.working_leg = Side::Right;
        assert_eq!(metrics.min_working_knee(), 60.0);
        assert_eq!(metrics.min_extended_knee(), 170.0);
        assert_eq!(score_rep(&metrics).score, 100);
    }
}
