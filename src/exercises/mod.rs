pub mod kettlebell;
pub mod pistol;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{FrameResult, RepQuality};
use crate::settings::AnalyzerSettings;
use crate::skeleton::{Side, Skeleton};
use crate::utils::logging::LogSink;

pub use kettlebell::{KettlebellSwingAnalyzer, SwingAngles, SwingPhase};
pub use pistol::{PistolSquatAnalyzer, SquatAngles, SquatPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exercise {
    KettlebellSwing,
    PistolSquat,
    Unknown,
}

impl Exercise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::KettlebellSwing => "kettlebell-swing",
            Exercise::PistolSquat => "pistol-squat",
            Exercise::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kettlebell-swing" | "kettlebell" | "swing" => Ok(Exercise::KettlebellSwing),
            "pistol-squat" | "pistol" => Ok(Exercise::PistolSquat),
            "unknown" => Ok(Exercise::Unknown),
            other => Err(anyhow!(
                "unknown exercise {other:?}: expected \"kettlebell-swing\" or \"pistol-squat\""
            )),
        }
    }
}

/// Checkpoint angles from whichever analyzer produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckpointAngles {
    Swing(SwingAngles),
    Squat(SquatAngles),
}

/// Every supported exercise analyzer behind one interface.
pub enum ExerciseAnalyzer {
    KettlebellSwing(KettlebellSwingAnalyzer),
    PistolSquat(PistolSquatAnalyzer),
}

impl ExerciseAnalyzer {
    /// Build the analyzer for `exercise`; `None` for [`Exercise::Unknown`].
    pub fn for_exercise(
        exercise: Exercise,
        settings: &AnalyzerSettings,
        sink: Arc<dyn LogSink>,
    ) -> Option<Self> {
        match exercise {
            Exercise::KettlebellSwing => Some(ExerciseAnalyzer::KettlebellSwing(
                KettlebellSwingAnalyzer::with_sink(settings.kettlebell, settings.engine, sink),
            )),
            Exercise::PistolSquat => Some(ExerciseAnalyzer::PistolSquat(
                PistolSquatAnalyzer::with_sink(settings.pistol, settings.engine, sink),
            )),
            Exercise::Unknown => None,
        }
    }

    pub fn exercise(&self) -> Exercise {
        match self {
            ExerciseAnalyzer::KettlebellSwing(_) => Exercise::KettlebellSwing,
            ExerciseAnalyzer::PistolSquat(_) => Exercise::PistolSquat,
        }
    }

    pub fn process_frame(&mut self, skeleton: impl Into<Arc<Skeleton>>) -> FrameResult<CheckpointAngles> {
        match self {
            ExerciseAnalyzer::KettlebellSwing(a) => {
                a.process_frame(skeleton).map_angles(CheckpointAngles::Swing)
            }
            ExerciseAnalyzer::PistolSquat(a) => {
                a.process_frame(skeleton).map_angles(CheckpointAngles::Squat)
            }
        }
    }

    pub fn phase_name(&self) -> &'static str {
        use crate::engine::Phase;
        match self {
            ExerciseAnalyzer::KettlebellSwing(a) => a.phase().as_str(),
            ExerciseAnalyzer::PistolSquat(a) => a.phase().as_str(),
        }
    }

    pub fn rep_count(&self) -> u32 {
        match self {
            ExerciseAnalyzer::KettlebellSwing(a) => a.rep_count(),
            ExerciseAnalyzer::PistolSquat(a) => a.rep_count(),
        }
    }

    pub fn last_quality(&self) -> Option<&RepQuality> {
        match self {
            ExerciseAnalyzer::KettlebellSwing(a) => a.last_quality(),
            ExerciseAnalyzer::PistolSquat(a) => a.last_quality(),
        }
    }

    /// Working leg for single-leg exercises.
    pub fn working_leg(&self) -> Option<Side> {
        match self {
            ExerciseAnalyzer::KettlebellSwing(_) => None,
            ExerciseAnalyzer::PistolSquat(a) => Some(a.working_leg()),
        }
    }

    pub fn reset(&mut self) {
        match self {
            ExerciseAnalyzer::KettlebellSwing(a) => a.reset(),
            ExerciseAnalyzer::PistolSquat(a) => a.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::NullSink;

    #[test]
    fn parses_cli_names() {
        assert_eq!("pistol".parse::<Exercise>().unwrap(), Exercise::PistolSquat);
        assert_eq!(
            "Kettlebell-Swing".parse::<Exercise>().unwrap(),
            Exercise::KettlebellSwing
        );
        assert!("deadlift".parse::<Exercise>().is_err());
    }

    #[test]
    fn factory_covers_known_exercises() {
        let settings = AnalyzerSettings::default();
        let sink: Arc<dyn LogSink> = Arc::new(NullSink);
        let swing = ExerciseAnalyzer::for_exercise(Exercise::KettlebellSwing, &settings, sink.clone());
        assert_eq!(swing.map(|a| a.phase_name()), Some("top"));
        let pistol = ExerciseAnalyzer::for_exercise(Exercise::PistolSquat, &settings, sink.clone());
        assert_eq!(pistol.map(|a| a.phase_name()), Some("standing"));
        assert!(ExerciseAnalyzer::for_exercise(Exercise::Unknown, &settings, sink).is_none());
    }

    #[test]
    fn empty_frames_report_no_skeleton() {
        let settings = AnalyzerSettings::default();
        let mut analyzer =
            ExerciseAnalyzer::for_exercise(Exercise::PistolSquat, &settings, Arc::new(NullSink)).unwrap();
        let result = analyzer.process_frame(Skeleton::empty(0.0));
        assert!(!result.skeleton_detected);
        assert_eq!(analyzer.rep_count(), 0);
        assert_eq!(analyzer.working_leg(), Some(Side::Left));
    }
}
