//! One recording from first frame to last: classify, then analyze.
//!
//! Frames seen while the classifier is still deciding are buffered and
//! replayed through the chosen analyzer once it locks, so reps performed
//! during detection still count.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::classifier::{DetectionResult, ExerciseClassifier};
use crate::engine::signal::BoundedHistory;
use crate::engine::{FrameResult, RepQuality};
use crate::exercises::{CheckpointAngles, Exercise, ExerciseAnalyzer};
use crate::settings::AnalyzerSettings;
use crate::skeleton::Skeleton;
use crate::utils::logging::{default_sink, LogSink};
use crate::log_info;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Detecting,
    Analyzing,
    /// The classifier locked without recognizing the exercise.
    Undetermined,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Detecting => "detecting",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Undetermined => "undetermined",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub exercise: Exercise,
    pub detection: DetectionResult,
    pub rep_count: u32,
    pub last_quality: Option<RepQuality>,
}

pub struct ExerciseSession {
    id: String,
    started_at: DateTime<Utc>,
    settings: AnalyzerSettings,
    classifier: ExerciseClassifier,
    analyzer: Option<ExerciseAnalyzer>,
    pending: BoundedHistory<Arc<Skeleton>>,
    status: SessionStatus,
    sink: Arc<dyn LogSink>,
}

impl ExerciseSession {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self::with_sink(settings, default_sink())
    }

    pub fn with_sink(settings: AnalyzerSettings, sink: Arc<dyn LogSink>) -> Self {
        let session = Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            classifier: ExerciseClassifier::with_sink(settings.classifier, Arc::clone(&sink)),
            analyzer: None,
            pending: BoundedHistory::new(settings.classifier.max_frames as usize),
            status: SessionStatus::Detecting,
            settings,
            sink,
        };
        log_info!(session.sink, "session_started", id = session.id.as_str());
        session
    }

    /// Skip detection and analyze `exercise` from the first frame.
    pub fn for_exercise(exercise: Exercise, settings: AnalyzerSettings, sink: Arc<dyn LogSink>) -> Self {
        let mut session = Self::with_sink(settings, sink);
        // Nothing is buffered yet, so there is nothing to replay.
        let _ = session.select_exercise(exercise);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn detection(&self) -> &DetectionResult {
        self.classifier.result()
    }

    pub fn analyzer(&self) -> Option<&ExerciseAnalyzer> {
        self.analyzer.as_ref()
    }

    pub fn rep_count(&self) -> u32 {
        self.analyzer.as_ref().map_or(0, ExerciseAnalyzer::rep_count)
    }

    /// Lock the exercise by hand and replay the frames buffered so far.
    ///
    /// Returns the replayed results, or `None` once detection has already
    /// decided.
    #[must_use]
    pub fn select_exercise(&mut self, exercise: Exercise) -> Option<Vec<FrameResult<CheckpointAngles>>> {
        if self.status != SessionStatus::Detecting || !self.classifier.lock_exercise(exercise) {
            return None;
        }
        Some(self.start_analyzer())
    }

    /// Feed one frame.
    ///
    /// Returns nothing while detecting, every buffered frame's result on the
    /// frame detection locks, and one result per frame after that.
    pub fn process_frame(&mut self, skeleton: impl Into<Arc<Skeleton>>) -> Vec<FrameResult<CheckpointAngles>> {
        let skeleton = skeleton.into();
        match self.status {
            SessionStatus::Analyzing => self
                .analyzer
                .as_mut()
                .map(|analyzer| vec![analyzer.process_frame(skeleton)])
                .unwrap_or_default(),
            SessionStatus::Undetermined => Vec::new(),
            SessionStatus::Detecting => {
                self.classifier.process_frame(&skeleton);
                self.pending.push(skeleton);
                if self.classifier.is_locked() {
                    self.start_analyzer()
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            started_at: self.started_at,
            status: self.status,
            exercise: self
                .analyzer
                .as_ref()
                .map_or(Exercise::Unknown, ExerciseAnalyzer::exercise),
            detection: self.classifier.result().clone(),
            rep_count: self.rep_count(),
            last_quality: self
                .analyzer
                .as_ref()
                .and_then(|a| a.last_quality().cloned()),
        }
    }

    /// Build the analyzer for the locked exercise and replay buffered frames.
    fn start_analyzer(&mut self) -> Vec<FrameResult<CheckpointAngles>> {
        let exercise = self.classifier.result().exercise;
        let Some(mut analyzer) =
            ExerciseAnalyzer::for_exercise(exercise, &self.settings, Arc::clone(&self.sink))
        else {
            self.status = SessionStatus::Undetermined;
            self.pending.clear();
            log_info!(self.sink, "session_undetermined", id = self.id.as_str());
            return Vec::new();
        };

        let results: Vec<_> = self
            .pending
            .iter()
            .map(|skeleton| analyzer.process_frame(Arc::clone(skeleton)))
            .collect();
        log_info!(
            self.sink,
            "session_analyzing",
            exercise = exercise.as_str(),
            replayed = results.len(),
            reps = analyzer.rep_count()
        );
        self.pending.clear();
        self.analyzer = Some(analyzer);
        self.status = SessionStatus::Analyzing;
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::NullSink;

    #[test]
    fn forced_exercise_skips_detection() {
        let mut session =
            ExerciseSession::for_exercise(Exercise::KettlebellSwing, AnalyzerSettings::default(), Arc::new(NullSink));
        assert_eq!(session.status(), SessionStatus::Analyzing);
        assert_eq!(session.process_frame(Skeleton::empty(0.0)).len(), 1);
        assert!(session.select_exercise(Exercise::PistolSquat).is_none());
        assert!(Uuid::parse_str(session.id()).is_ok());
    }

    #[test]
    fn undetermined_after_frame_budget() {
        let mut session = ExerciseSession::with_sink(AnalyzerSettings::default(), Arc::new(NullSink));
        for i in 0..119 {
            assert!(session.process_frame(Skeleton::empty(i as f64)).is_empty());
        }
        assert_eq!(session.status(), SessionStatus::Detecting);
        session.process_frame(Skeleton::empty(119.0));
        assert_eq!(session.status(), SessionStatus::Undetermined);
        assert_eq!(session.summary().exercise, Exercise::Unknown);
        assert!(session.process_frame(Skeleton::empty(120.0)).is_empty());
    }

    #[test]
    fn status_names_match_serialized_form() {
        for status in [
            SessionStatus::Detecting,
            SessionStatus::Analyzing,
            SessionStatus::Undetermined,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
