//! Replay a `.posetrack.json` through an exercise session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::engine::CompletedRep;
use crate::evaluation::{evaluate_reps, load_annotations};
use crate::exercises::{CheckpointAngles, Exercise};
use crate::posetrack::PoseTrack;
use crate::session::ExerciseSession;
use crate::settings::AnalyzerSettings;
use crate::utils::default_sink;

#[derive(Debug, Parser)]
#[command(name = "swing-analyzer", version, about = "Count reps and score form from pose keypoints")]
pub struct Cli {
    /// Pose track extracted from a video.
    pub posetrack: PathBuf,

    /// Skip detection and analyze this exercise (kettlebell-swing, pistol-squat).
    #[arg(short, long)]
    pub exercise: Option<Exercise>,

    /// JSON file overriding analyzer thresholds.
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Hand-labelled checkpoints to score detections against.
    #[arg(short, long)]
    pub annotations: Option<PathBuf>,

    /// Keypoints scored below this are treated as missing.
    #[arg(long, default_value_t = 0.3)]
    pub min_score: f64,

    /// Print one JSON object per completed rep instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => AnalyzerSettings::load(path)?,
        None => AnalyzerSettings::default(),
    };
    let track = PoseTrack::load(&cli.posetrack)?;
    log::info!(
        "Loaded {} frames ({}, {:.1} fps) from {}",
        track.frames.len(),
        track.metadata.keypoint_format.as_str(),
        track.metadata.fps,
        cli.posetrack.display()
    );

    let mut session = match cli.exercise {
        Some(exercise) => ExerciseSession::for_exercise(exercise, settings, default_sink()),
        None => ExerciseSession::new(settings),
    };

    let mut reps: Vec<CompletedRep<CheckpointAngles>> = Vec::new();
    for skeleton in track.skeletons(cli.min_score) {
        for result in session.process_frame(skeleton) {
            if let Some(rep) = result.completed {
                print_rep(&rep, cli.json)?;
                reps.push(rep);
            }
        }
    }

    let summary = session.summary();
    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "{} reps of {} ({}; detection {:.0}%: {})",
            summary.rep_count,
            summary.exercise,
            summary.status.as_str(),
            summary.detection.confidence,
            summary.detection.reason
        );
    }

    if let Some(path) = &cli.annotations {
        let annotations = load_annotations(path)?;
        let metrics = evaluate_reps(&reps, &annotations);
        if cli.json {
            println!("{}", serde_json::to_string(&metrics)?);
        } else {
            for (position, m) in &metrics {
                println!(
                    "{position:>10}: precision {:.2}  recall {:.2}  f1 {:.2}  (tp {}, fp {}, fn {})",
                    m.precision(),
                    m.recall(),
                    m.f1(),
                    m.true_positives,
                    m.false_positives,
                    m.false_negatives
                );
            }
        }
    }
    Ok(())
}

fn print_rep(rep: &CompletedRep<CheckpointAngles>, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(rep).context("Failed to serialize rep")?;
        println!("{line}");
        return Ok(());
    }

    let checkpoints: Vec<String> = rep
        .positions
        .iter()
        .map(|p| match p.frame_index {
            Some(frame) => format!("{}@{}", p.name, frame),
            None => format!("{}@{:.0}ms", p.name, p.timestamp_ms),
        })
        .collect();
    println!(
        "Rep {} score {}: {} | {}",
        rep.rep_number,
        rep.quality.score,
        checkpoints.join(" "),
        rep.quality.feedback.join("; ")
    );
    Ok(())
}
