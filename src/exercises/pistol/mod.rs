//! Pistol squat: STANDING → DESCENDING → BOTTOM → ASCENDING → STANDING.
//!
//! Single-leg squat, so the working leg is detected first and every knee
//! reading after that comes from it. BOTTOM is confirmed by a trough in the
//! descent signal; the mid-descent and mid-ascent checkpoints are picked
//! after the fact from a buffer of recent frames.

pub mod config;
pub mod scoring;
pub mod working_leg;

use std::sync::Arc;

use serde::Serialize;

use crate::engine::signal::{BoundedHistory, Ema, TroughTracker, TroughUpdate};
use crate::engine::{
    CompletedRep, EngineConfig, FrameResult, PeakKind, Phase, PhaseEngine, PhasePeak, RepQuality,
    Transition,
};
use crate::skeleton::{Side, Skeleton};
use crate::utils::logging::{default_sink, LogSink};
use crate::{log_debug, log_info};

pub use config::{PistolSquatConfig, TroughSignal};
pub use scoring::SquatMetrics;
pub use working_leg::WorkingLegDetector;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SquatPhase {
    Standing,
    Descending,
    Bottom,
    Ascending,
}

impl Phase for SquatPhase {
    const CYCLE: &'static [Self] = &[
        SquatPhase::Standing,
        SquatPhase::Descending,
        SquatPhase::Bottom,
        SquatPhase::Ascending,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SquatPhase::Standing => "standing",
            SquatPhase::Descending => "descending",
            SquatPhase::Bottom => "bottom",
            SquatPhase::Ascending => "ascending",
        }
    }

    fn peak_kind(&self) -> PeakKind {
        match self {
            SquatPhase::Standing => PeakKind::Extremal,
            _ => PeakKind::Timing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquatAngles {
    pub working_leg: Side,
    /// Clamped to the configured floor.
    pub working_knee: f64,
    pub extended_knee: f64,
    pub spine: f64,
    pub hip: f64,
    pub ear_y: Option<f64>,
}

struct SquatFrame {
    angles: SquatAngles,
    smoothed_knee: f64,
    rising: bool,
    trough_confirmed: bool,
    config: PistolSquatConfig,
}

fn knee_bending(f: &SquatFrame) -> bool {
    f.angles.working_knee < f.config.descend_knee_max
}

fn trough_confirmed(f: &SquatFrame) -> bool {
    f.trough_confirmed
}

fn driving_up(f: &SquatFrame) -> bool {
    f.rising && f.smoothed_knee > f.config.ascend_knee_min
}

fn stood_tall(f: &SquatFrame) -> bool {
    f.angles.working_knee > f.config.standing_knee_min && f.angles.spine < f.config.standing_spine_max
}

const TRANSITIONS: [Transition<SquatPhase, SquatFrame>; 4] = [
    Transition::sustained(SquatPhase::Standing, SquatPhase::Descending, knee_bending),
    Transition::event(SquatPhase::Descending, SquatPhase::Bottom, trough_confirmed),
    Transition::sustained(SquatPhase::Bottom, SquatPhase::Ascending, driving_up),
    Transition::sustained(SquatPhase::Ascending, SquatPhase::Standing, stood_tall),
];

#[derive(Debug, Clone)]
struct RecentFrame {
    phase: SquatPhase,
    skeleton: Arc<Skeleton>,
    angles: SquatAngles,
}

/// Trough tracker for one descent, latched to the signal it started with.
#[derive(Debug, Clone)]
struct Descent {
    signal: TroughSignal,
    tracker: TroughTracker<(Arc<Skeleton>, SquatAngles)>,
}

impl Descent {
    fn start(config: &PistolSquatConfig, angles: &SquatAngles) -> Self {
        let signal = match (config.trough_signal, angles.ear_y) {
            (TroughSignal::EarHeight, Some(_)) => TroughSignal::EarHeight,
            _ => TroughSignal::KneeAngle,
        };
        let rise = match signal {
            TroughSignal::EarHeight => config.ear_rise_px,
            TroughSignal::KneeAngle => config.knee_rise_deg,
        };
        Self {
            signal,
            tracker: TroughTracker::new(rise, config.trough_confirm_frames),
        }
    }

    /// Feed one frame; `None` when the frame lacks the latched signal.
    fn update(&mut self, skeleton: &Arc<Skeleton>, angles: &SquatAngles) -> Option<TroughUpdate> {
        let value = match self.signal {
            TroughSignal::EarHeight => -angles.ear_y?,
            TroughSignal::KneeAngle => angles.working_knee,
        };
        Some(self.tracker.update(value, (Arc::clone(skeleton), *angles)))
    }
}

pub struct PistolSquatAnalyzer {
    config: PistolSquatConfig,
    engine: PhaseEngine<SquatPhase, SquatAngles>,
    leg: WorkingLegDetector,
    knee_ema: Ema,
    last_smoothed: Option<f64>,
    descent: Option<Descent>,
    recent: BoundedHistory<RecentFrame>,
    metrics: SquatMetrics,
    sink: Arc<dyn LogSink>,
}

impl PistolSquatAnalyzer {
    pub fn new(config: PistolSquatConfig, engine: EngineConfig) -> Self {
        Self::with_sink(config, engine, default_sink())
    }

    pub fn with_sink(config: PistolSquatConfig, engine: EngineConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            engine: PhaseEngine::new(engine),
            leg: WorkingLegDetector::new(config.leg_vote_threshold, config.leg_votes_to_lock),
            knee_ema: Ema::new(config.smoothing_alpha),
            last_smoothed: None,
            descent: None,
            recent: BoundedHistory::new(config.recent_frames),
            metrics: SquatMetrics::new(),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &PistolSquatConfig {
        &self.config
    }

    pub fn phase(&self) -> SquatPhase {
        self.engine.phase()
    }

    pub fn rep_count(&self) -> u32 {
        self.engine.rep_count()
    }

    pub fn last_quality(&self) -> Option<&RepQuality> {
        self.engine.last_quality()
    }

    /// Detected working leg; left until the detector has locked.
    pub fn working_leg(&self) -> Side {
        self.leg.working_leg()
    }

    pub fn is_leg_locked(&self) -> bool {
        self.leg.is_locked()
    }

    pub fn process_frame(&mut self, skeleton: impl Into<Arc<Skeleton>>) -> FrameResult<SquatAngles> {
        let skeleton = skeleton.into();
        if !skeleton.has_keypoints() {
            return FrameResult::no_skeleton(self.phase().as_str(), self.rep_count());
        }

        if skeleton.spine_angle() > self.config.posture_spine_max {
            log_debug!(
                self.sink,
                "posture_rejected",
                spine = skeleton.spine_angle(),
                phase = self.phase().as_str()
            );
            return FrameResult {
                phase: self.phase().as_str(),
                rep_count: self.rep_count(),
                rep_completed: false,
                skeleton_detected: true,
                completed: None,
            };
        }

        if let Some(side) = self.leg.observe(&skeleton) {
            self.metrics.working_leg = side;
            log_info!(self.sink, "working_leg_locked", side = side.as_str());
        }

        let angles = self.measure(&skeleton);
        let smoothed_knee = self.knee_ema.update(angles.working_knee);
        let rising = self.last_smoothed.is_some_and(|prev| smoothed_knee > prev);
        self.last_smoothed = Some(smoothed_knee);
        let floor = self.config.min_knee_angle;
        self.metrics.observe(
            skeleton.knee_angle_for(Side::Left).max(floor),
            skeleton.knee_angle_for(Side::Right).max(floor),
            angles.spine,
        );

        let trough_confirmed = match (self.engine.phase(), self.descent.as_mut()) {
            (SquatPhase::Descending, Some(descent)) => {
                descent.update(&skeleton, &angles) == Some(TroughUpdate::Confirmed)
            }
            _ => false,
        };

        let ctx = SquatFrame {
            angles,
            smoothed_knee,
            rising,
            trough_confirmed,
            config: self.config,
        };
        let mut completed = None;
        if let Some(next) = self.engine.evaluate(&TRANSITIONS, &ctx) {
            log_debug!(
                self.sink,
                "phase_transition",
                from = self.engine.phase().as_str(),
                to = next.as_str(),
                frames = self.engine.frames_in_phase()
            );
            self.engine.transition_to(next);
            match next {
                SquatPhase::Descending => {
                    let mut descent = Descent::start(&self.config, &angles);
                    descent.update(&skeleton, &angles);
                    self.descent = Some(descent);
                }
                SquatPhase::Bottom => self.confirm_bottom(),
                SquatPhase::Ascending => {}
                SquatPhase::Standing => completed = Some(self.complete_rep()),
            }
        }

        self.recent.push(RecentFrame {
            phase: self.engine.phase(),
            skeleton: Arc::clone(&skeleton),
            angles,
        });
        let score = scoring::peak_score(self.engine.phase(), &angles);
        self.engine.offer_peak(PhasePeak::new(skeleton, score, angles));

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
        self.leg.reset();
        self.knee_ema.reset();
        self.last_smoothed = None;
        self.descent = None;
        self.recent.clear();
        self.metrics = SquatMetrics::new();
    }

    fn measure(&self, skeleton: &Skeleton) -> SquatAngles {
        let side = self.leg.working_leg();
        SquatAngles {
            working_leg: side,
            working_knee: skeleton
                .knee_angle_for(side)
                .max(self.config.min_knee_angle),
            extended_knee: skeleton.knee_angle_for(side.opposite()),
            spine: skeleton.spine_angle(),
            hip: skeleton.hip_angle_for(side),
            ear_y: skeleton.ear_y(),
        }
    }

    /// Store the trough as BOTTOM and pick the mid-descent checkpoint.
    fn confirm_bottom(&mut self) {
        let Some((_, (skeleton, angles))) = self
            .descent
            .take()
            .and_then(|mut descent| descent.tracker.take_minimum())
        else {
            return;
        };
        let score = scoring::peak_score(SquatPhase::Bottom, &angles);
        self.engine
            .store_peak(SquatPhase::Bottom, PhasePeak::new(skeleton, score, angles));

        if let Some(mid) = self.midway_frame(SquatPhase::Descending) {
            let score = scoring::peak_score(SquatPhase::Descending, &mid.angles);
            self.engine.store_peak(
                SquatPhase::Descending,
                PhasePeak::new(mid.skeleton, score, mid.angles),
            );
        }
    }

    fn complete_rep(&mut self) -> CompletedRep<SquatAngles> {
        if let Some(mid) = self.midway_frame(SquatPhase::Ascending) {
            let score = scoring::peak_score(SquatPhase::Ascending, &mid.angles);
            self.engine.store_peak(
                SquatPhase::Ascending,
                PhasePeak::new(mid.skeleton, score, mid.angles),
            );
        }

        let rep = self.engine.complete_rep(&self.metrics, scoring::score_rep);
        self.metrics = SquatMetrics::for_leg(self.leg.working_leg());
        self.recent.clear();
        self.descent = None;
        log_info!(
            self.sink,
            "rep_completed",
            exercise = "pistol-squat",
            reps = rep.rep_number,
            score = rep.quality.score,
            depth = rep.quality.metrics.get("depth").copied().unwrap_or(0.0)
        );
        rep
    }

    /// Buffered frame of `phase` whose working knee is nearest halfway between
    /// the standing baseline and the bottom.
    ///
    /// Descent candidates end at the trough and ascent candidates start there,
    /// since DESCENDING also spans the confirming frames after the minimum.
    fn midway_frame(&self, phase: SquatPhase) -> Option<RecentFrame> {
        let baseline = self
            .engine
            .peak(SquatPhase::Standing)
            .map_or(180.0, |p| p.angles.working_knee);
        let bottom = self.engine.peak(SquatPhase::Bottom)?;
        let bottom_ms = bottom.timestamp_ms;
        let target = (baseline + bottom.angles.working_knee) / 2.0;
        let on_side_of_trough = |frame: &RecentFrame| match phase {
            SquatPhase::Descending => frame.skeleton.timestamp_ms() <= bottom_ms,
            _ => frame.skeleton.timestamp_ms() >= bottom_ms,
        };

        self.recent
            .iter()
            .filter(|frame| frame.phase == phase && on_side_of_trough(*frame))
            .min_by(|a, b| {
                let da = (a.angles.working_knee - target).abs();
                let db = (b.angles.working_knee - target).abs();
                da.total_cmp(&db)
            })
            .cloned()
    }
}
