//! Exercise-agnostic phase-machine bookkeeping.
//!
//! A concrete analyzer picks a [`Phase`] enum, an angle-record type `A` for
//! its checkpoints, a transition table of pure predicates, and a pure quality
//! function. [`PhaseEngine`] handles everything else: dwell and confirmation
//! counting, per-phase peak tracking, and the rep completion protocol.

pub mod config;
pub mod quality;
pub mod signal;
pub mod state;
pub mod transition;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::Serialize;

use crate::skeleton::Skeleton;
use crate::thumbnail::Thumbnail;

pub use config::EngineConfig;
pub use quality::{QualityBuilder, RepQuality};
pub use state::PhaseEngine;
pub use transition::{Transition, Trigger};

/// How a phase picks its representative frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakKind {
    /// Keep the frame with the highest score seen while in the phase.
    Extremal,
    /// Keep the first frame offered; its timing is what matters.
    Timing,
}

/// A closed set of movement phases forming one repetition cycle.
pub trait Phase: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every phase in cycle order, starting with the rest phase.
    const CYCLE: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn peak_kind(&self) -> PeakKind;

    fn start() -> Self {
        Self::CYCLE[0]
    }
}

/// Representative frame for one phase.
#[derive(Debug, Clone)]
pub struct PhasePeak<A> {
    pub skeleton: Arc<Skeleton>,
    pub score: f64,
    pub timestamp_ms: f64,
    pub video_time: Option<f64>,
    pub angles: A,
}

impl<A> PhasePeak<A> {
    pub fn new(skeleton: Arc<Skeleton>, score: f64, angles: A) -> Self {
        Self {
            timestamp_ms: skeleton.timestamp_ms(),
            video_time: skeleton.video_time(),
            skeleton,
            score,
            angles,
        }
    }
}

/// A finalized checkpoint handed downstream when a rep completes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPosition<A> {
    pub name: &'static str,
    #[serde(skip)]
    pub skeleton: Arc<Skeleton>,
    pub frame_index: Option<u64>,
    pub timestamp_ms: f64,
    pub video_time: Option<f64>,
    pub score: f64,
    pub angles: A,
    #[serde(skip)]
    pub thumbnail: Option<Thumbnail>,
}

impl<A> RepPosition<A> {
    pub(crate) fn from_peak(name: &'static str, peak: PhasePeak<A>) -> Self {
        let thumbnail = peak.skeleton.frame().map(|frame| Thumbnail::from_frame(frame));
        Self {
            name,
            frame_index: peak.skeleton.frame_index(),
            timestamp_ms: peak.timestamp_ms,
            video_time: peak.video_time,
            score: peak.score,
            angles: peak.angles,
            thumbnail,
            skeleton: peak.skeleton,
        }
    }

    pub fn map_angles<B>(self, f: impl FnOnce(A) -> B) -> RepPosition<B> {
        RepPosition {
            name: self.name,
            skeleton: self.skeleton,
            frame_index: self.frame_index,
            timestamp_ms: self.timestamp_ms,
            video_time: self.video_time,
            score: self.score,
            angles: f(self.angles),
            thumbnail: self.thumbnail,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRep<A> {
    pub rep_number: u32,
    pub positions: Vec<RepPosition<A>>,
    pub quality: RepQuality,
}

impl<A> CompletedRep<A> {
    pub fn position(&self, name: &str) -> Option<&RepPosition<A>> {
        self.positions.iter().find(|p| p.name == name)
    }

    pub fn position_names(&self) -> Vec<&'static str> {
        self.positions.iter().map(|p| p.name).collect()
    }

    pub fn map_angles<B>(self, f: impl Fn(A) -> B) -> CompletedRep<B> {
        CompletedRep {
            rep_number: self.rep_number,
            positions: self
                .positions
                .into_iter()
                .map(|p| p.map_angles(&f))
                .collect(),
            quality: self.quality,
        }
    }
}

/// What an analyzer reports for every frame it is fed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult<A> {
    pub phase: &'static str,
    pub rep_count: u32,
    pub rep_completed: bool,
    /// False when the frame carried no keypoints; nothing else changed.
    pub skeleton_detected: bool,
    pub completed: Option<CompletedRep<A>>,
}

impl<A> FrameResult<A> {
    pub fn no_skeleton(phase: &'static str, rep_count: u32) -> Self {
        Self {
            phase,
            rep_count,
            rep_completed: false,
            skeleton_detected: false,
            completed: None,
        }
    }

    pub fn map_angles<B>(self, f: impl Fn(A) -> B) -> FrameResult<B> {
        FrameResult {
            phase: self.phase,
            rep_count: self.rep_count,
            rep_completed: self.rep_completed,
            skeleton_detected: self.skeleton_detected,
            completed: self.completed.map(|rep| rep.map_angles(f)),
        }
    }
}
