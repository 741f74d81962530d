//! Kettlebell swing: TOP → CONNECT → BOTTOM → RELEASE → TOP.
//!
//! The first three transitions are level conditions on arm, spine and hip.
//! The return to TOP is an event: a lagged local maximum of the smoothed
//! wrist height collected while in RELEASE. Re-entering TOP completes a rep.

pub mod config;
pub mod scoring;

use std::sync::Arc;

use serde::Serialize;

use crate::engine::signal::{lagged_local_max, moving_average, BoundedHistory};
use crate::engine::{
    CompletedRep, EngineConfig, FrameResult, PeakKind, Phase, PhaseEngine, PhasePeak, RepQuality,
    Transition,
};
use crate::skeleton::Skeleton;
use crate::utils::logging::{default_sink, LogSink};
use crate::{log_debug, log_info};

pub use config::KettlebellConfig;
pub use scoring::SwingMetrics;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingPhase {
    Top,
    Connect,
    Bottom,
    Release,
}

impl Phase for SwingPhase {
    const CYCLE: &'static [Self] = &[
        SwingPhase::Top,
        SwingPhase::Connect,
        SwingPhase::Bottom,
        SwingPhase::Release,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SwingPhase::Top => "top",
            SwingPhase::Connect => "connect",
            SwingPhase::Bottom => "bottom",
            SwingPhase::Release => "release",
        }
    }

    fn peak_kind(&self) -> PeakKind {
        match self {
            SwingPhase::Top | SwingPhase::Bottom => PeakKind::Extremal,
            SwingPhase::Connect | SwingPhase::Release => PeakKind::Timing,
        }
    }
}

/// Angle readout stored with every swing checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingAngles {
    /// Signed shoulder→elbow angle from vertical.
    pub arm: f64,
    pub spine: f64,
    pub hip: f64,
    pub knee: f64,
    pub wrist_height: f64,
}

impl SwingAngles {
    fn measure(skeleton: &Skeleton, config: &KettlebellConfig) -> Self {
        Self {
            arm: skeleton.arm_to_vertical(config.preferred_side),
            spine: skeleton.spine_angle(),
            hip: skeleton.hip_angle(),
            knee: skeleton.knee_angle(),
            wrist_height: skeleton.wrist_height(config.preferred_side),
        }
    }
}

/// Everything the transition predicates look at for one frame.
struct SwingFrame {
    angles: SwingAngles,
    wrist_apex: bool,
    config: KettlebellConfig,
}

fn arm_back_to_vertical(f: &SwingFrame) -> bool {
    f.angles.arm.abs() < f.config.connect_arm_max && f.angles.spine < f.config.connect_spine_max
}

fn hinged_at_bottom(f: &SwingFrame) -> bool {
    f.angles.arm.abs() < f.config.bottom_arm_max
        && f.angles.spine > f.config.bottom_spine_min
        && f.angles.hip < f.config.bottom_hip_max
}

fn driving_forward(f: &SwingFrame) -> bool {
    f.angles.arm.abs() > f.config.release_arm_min && f.angles.spine < f.config.release_spine_max
}

fn floated_to_top(f: &SwingFrame) -> bool {
    f.wrist_apex
}

const TRANSITIONS: [Transition<SwingPhase, SwingFrame>; 4] = [
    Transition::sustained(SwingPhase::Top, SwingPhase::Connect, arm_back_to_vertical),
    Transition::sustained(SwingPhase::Connect, SwingPhase::Bottom, hinged_at_bottom),
    Transition::sustained(SwingPhase::Bottom, SwingPhase::Release, driving_forward),
    Transition::event(SwingPhase::Release, SwingPhase::Top, floated_to_top),
];

#[derive(Debug, Clone)]
struct WristSample {
    height: f64,
    skeleton: Arc<Skeleton>,
    angles: SwingAngles,
}

pub struct KettlebellSwingAnalyzer {
    config: KettlebellConfig,
    engine: PhaseEngine<SwingPhase, SwingAngles>,
    wrist: BoundedHistory<WristSample>,
    metrics: SwingMetrics,
    sink: Arc<dyn LogSink>,
}

impl KettlebellSwingAnalyzer {
    pub fn new(config: KettlebellConfig, engine: EngineConfig) -> Self {
        Self::with_sink(config, engine, default_sink())
    }

    pub fn with_sink(config: KettlebellConfig, engine: EngineConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            wrist: BoundedHistory::new(config.wrist_history),
            config,
            engine: PhaseEngine::new(engine),
            metrics: SwingMetrics::new(),
            sink,
        }
    }

    pub fn config(&self) -> &KettlebellConfig {
        &self.config
    }

    pub fn phase(&self) -> SwingPhase {
        self.engine.phase()
    }

    pub fn rep_count(&self) -> u32 {
        self.engine.rep_count()
    }

    pub fn last_quality(&self) -> Option<&RepQuality> {
        self.engine.last_quality()
    }

    pub fn process_frame(&mut self, skeleton: impl Into<Arc<Skeleton>>) -> FrameResult<SwingAngles> {
        let skeleton = skeleton.into();
        if !skeleton.has_keypoints() {
            return FrameResult::no_skeleton(self.phase().as_str(), self.rep_count());
        }

        let angles = SwingAngles::measure(&skeleton, &self.config);
        self.metrics.observe(&angles);

        if self.engine.phase() == SwingPhase::Release {
            self.wrist.push(WristSample {
                height: angles.wrist_height,
                skeleton: Arc::clone(&skeleton),
                angles,
            });
        }
        let apex = self.wrist_apex(&angles);

        let ctx = SwingFrame {
            angles,
            wrist_apex: apex.is_some(),
            config: self.config,
        };
        let mut completed = None;
        if let Some(next) = self.engine.evaluate(&TRANSITIONS, &ctx) {
            let from = self.engine.phase();
            log_debug!(
                self.sink,
                "phase_transition",
                from = from.as_str(),
                to = next.as_str(),
                frames = self.engine.frames_in_phase()
            );
            if next == SwingPhase::Top {
                completed = Some(self.complete_rep(apex));
            } else {
                self.engine.transition_to(next);
                if next == SwingPhase::Release {
                    self.wrist.clear();
                }
            }
        }

        self.offer(&skeleton, angles);

        FrameResult {
            phase: self.phase().as_str(),
            rep_count: self.rep_count(),
            rep_completed: completed.is_some(),
            skeleton_detected: true,
            completed,
        }
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.wrist.clear();
        self.metrics = SwingMetrics::new();
    }

    /// The confirmed apex sample, if the wrist just peaked above the floor.
    ///
    /// The spine and hip gates apply to the current frame; the returned sample
    /// is the one two frames back.
    fn wrist_apex(&self, current: &SwingAngles) -> Option<WristSample> {
        let n = self.wrist.len();
        if n < 4 {
            return None;
        }
        let radius = self.config.smoothing_radius;
        let height = |i: usize| self.wrist.get(i).map_or(0.0, |s| s.height);
        let smoothed: Vec<f64> = (n - 4..n)
            .map(|i| moving_average(n, i, radius, height))
            .collect();

        let apex_height = smoothed[1];
        let peaked = lagged_local_max(&smoothed)
            && current.spine < self.config.top_spine_max
            && current.hip > self.config.top_hip_min
            && apex_height >= self.config.wrist_floor;
        if !peaked {
            return None;
        }
        self.wrist.get(n - 3).cloned()
    }

    fn complete_rep(&mut self, apex: Option<WristSample>) -> CompletedRep<SwingAngles> {
        self.engine.transition_to(SwingPhase::Top);
        self.wrist.clear();

        if let Some(sample) = apex {
            let score = scoring::peak_score(SwingPhase::Top, &sample.angles);
            let better = self
                .engine
                .peak(SwingPhase::Top)
                .map_or(true, |existing| score > existing.score);
            if better {
                self.engine
                    .store_peak(SwingPhase::Top, PhasePeak::new(sample.skeleton, score, sample.angles));
            }
        }

        let rep = self.engine.complete_rep(&self.metrics, scoring::score_rep);
        self.metrics = SwingMetrics::new();
        log_info!(
            self.sink,
            "rep_completed",
            exercise = "kettlebell-swing",
            reps = rep.rep_number,
            score = rep.quality.score,
            checkpoints = rep.positions.len()
        );
        rep
    }

    fn offer(&mut self, skeleton: &Arc<Skeleton>, angles: SwingAngles) {
        let phase = self.engine.phase();
        let score = scoring::peak_score(phase, &angles);
        self.engine
            .offer_peak(PhasePeak::new(Arc::clone(skeleton), score, angles));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{Joint, Keypoint};

    fn arms_down_skeleton(ts: f64) -> Skeleton {
        Skeleton::from_joints(
            [
                (Joint::LeftShoulder, Keypoint::new(100.0, 100.0, 0.9)),
                (Joint::LeftElbow, Keypoint::new(100.0, 150.0, 0.9)),
                (Joint::LeftWrist, Keypoint::new(100.0, 200.0, 0.9)),
            ],
            10.0,
            ts,
        )
    }

    #[test]
    fn frames_without_keypoints_change_nothing() {
        let mut analyzer = KettlebellSwingAnalyzer::new(KettlebellConfig::default(), EngineConfig::default());
        let result = analyzer.process_frame(Skeleton::empty(0.0));
        assert!(!result.skeleton_detected);
        assert_eq!(result.phase, "top");
        assert_eq!(analyzer.rep_count(), 0);
    }

    #[test]
    fn arm_hanging_at_the_top_moves_to_connect() {
        let mut analyzer = KettlebellSwingAnalyzer::new(KettlebellConfig::default(), EngineConfig::default());
        let phases: Vec<&str> = (0..3)
            .map(|i| analyzer.process_frame(arms_down_skeleton(i as f64 * 33.0)).phase)
            .collect();
        assert_eq!(phases, vec!["top", "connect", "connect"]);
    }

    #[test]
    fn reset_restores_the_start() {
        let mut analyzer = KettlebellSwingAnalyzer::new(KettlebellConfig::default(), EngineConfig::default());
        for i in 0..4 {
            analyzer.process_frame(arms_down_skeleton(i as f64));
        }
        analyzer.reset();
        assert_eq!(analyzer.phase(), SwingPhase::Top);
        assert_eq!(analyzer.rep_count(), 0);
        assert!(analyzer.last_quality().is_none());
    }
}
