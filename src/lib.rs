pub mod classifier;
pub mod cli;
pub mod engine;
pub mod evaluation;
pub mod exercises;
pub mod posetrack;
pub mod session;
pub mod settings;
pub mod skeleton;
pub mod thumbnail;
pub mod utils;

pub use classifier::{ClassifierConfig, DetectionResult, ExerciseClassifier};
pub use engine::{CompletedRep, EngineConfig, FrameResult, RepPosition, RepQuality};
pub use exercises::{
    CheckpointAngles, Exercise, ExerciseAnalyzer, KettlebellSwingAnalyzer, PistolSquatAnalyzer,
};
pub use session::ExerciseSession;
pub use settings::AnalyzerSettings;
pub use skeleton::{Joint, Keypoint, Side, Skeleton};

use clap::Parser;

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(err) = cli::execute(cli::Cli::parse()) {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
