mod common;

use swing_analyzer_lib::classifier::{ClassifierConfig, ExerciseClassifier};
use swing_analyzer_lib::exercises::Exercise;
use swing_analyzer_lib::session::{ExerciseSession, SessionStatus};
use swing_analyzer_lib::settings::AnalyzerSettings;
use swing_analyzer_lib::skeleton::Skeleton;
use swing_analyzer_lib::utils::NullSink;

use std::sync::Arc;

use common::{pistol_rep, swing_rep, Clip, Pose};

/// Both knees bend together, never more than 19° apart.
fn bilateral_pattern() -> Vec<Skeleton> {
    (0..20)
        .map(|i| {
            let asymmetry = f64::from(i);
            Pose::squat(160.0, 160.0 - asymmetry, 100.0).skeleton(f64::from(i) * 33.0)
        })
        .collect()
}

/// One knee sweeps 170→50→170 while the other stays at 175°.
fn single_leg_pattern() -> Vec<Skeleton> {
    (0..20)
        .map(|i| {
            let phase = f64::from(i) / 20.0 * std::f64::consts::TAU;
            let knee = 110.0 + 60.0 * phase.cos();
            Pose::squat(175.0, knee, 100.0).skeleton(f64::from(i) * 33.0)
        })
        .collect()
}

fn feed_until_locked(classifier: &mut ExerciseClassifier, pattern: &[Skeleton]) {
    for frame in pattern.iter().cycle().take(120) {
        classifier.process_frame(frame);
        if classifier.is_locked() {
            break;
        }
    }
}

#[test]
fn bilateral_knees_lock_to_kettlebell() {
    let mut classifier = ExerciseClassifier::new(ClassifierConfig::default());
    feed_until_locked(&mut classifier, &bilateral_pattern());

    assert!(classifier.is_locked());
    let result = classifier.result();
    assert_eq!(result.exercise, Exercise::KettlebellSwing);
    assert!(result.confidence > 70.0);
    assert_eq!(classifier.frames_seen(), 60);
}

#[test]
fn one_pinned_knee_locks_to_pistol() {
    let mut classifier = ExerciseClassifier::new(ClassifierConfig::default());
    feed_until_locked(&mut classifier, &single_leg_pattern());

    assert!(classifier.is_locked());
    let result = classifier.result();
    assert_eq!(result.exercise, Exercise::PistolSquat);
    assert!(result.confidence > 70.0);
}

#[test]
fn locked_result_is_frozen() {
    let mut classifier = ExerciseClassifier::new(ClassifierConfig::default());
    feed_until_locked(&mut classifier, &bilateral_pattern());
    let locked = classifier.result().clone();

    for frame in single_leg_pattern().iter().cycle().take(200) {
        classifier.process_frame(frame);
    }
    assert_eq!(classifier.result(), &locked);
    assert!(!classifier.lock_exercise(Exercise::PistolSquat));
}

#[test]
fn moderate_asymmetry_needs_enough_frames_above_threshold() {
    // Asymmetry of 40° on every other frame: half the samples are above 35°.
    let frames: Vec<Skeleton> = (0..2)
        .map(|i| Pose::squat(170.0, 170.0 - 40.0 * f64::from(i), 100.0).skeleton(0.0))
        .collect();
    let mut classifier = ExerciseClassifier::new(ClassifierConfig::default());
    feed_until_locked(&mut classifier, &frames);

    let result = classifier.result();
    assert_eq!(result.exercise, Exercise::PistolSquat);
    assert!((result.confidence - 75.0).abs() < 1e-6);
}

#[test]
fn ambiguous_motion_locks_unknown_at_the_frame_budget() {
    // 30° of asymmetry: too much for a swing, too little for a pistol.
    let frame = Pose::squat(170.0, 140.0, 100.0).skeleton(0.0);
    let mut classifier = ExerciseClassifier::new(ClassifierConfig::default());
    for _ in 0..119 {
        classifier.process_frame(&frame);
    }
    assert!(!classifier.is_locked());
    assert_eq!(classifier.result().exercise, Exercise::Unknown);
    assert!(classifier.result().confidence <= 60.0);

    classifier.process_frame(&frame);
    assert!(classifier.is_locked());
    assert_eq!(classifier.result().exercise, Exercise::Unknown);
}

#[test]
fn session_replays_frames_seen_during_detection() {
    let mut clip = Clip::new();
    for _ in 0..4 {
        clip = swing_rep(clip);
    }
    let mut session = ExerciseSession::with_sink(AnalyzerSettings::default(), Arc::new(NullSink));

    let mut completed = 0;
    for frame in clip.frames() {
        completed += session
            .process_frame(Arc::clone(frame))
            .iter()
            .filter(|r| r.rep_completed)
            .count();
    }

    assert_eq!(session.status(), SessionStatus::Analyzing);
    assert_eq!(session.summary().exercise, Exercise::KettlebellSwing);
    assert_eq!(session.rep_count(), 4);
    assert_eq!(completed, 4);
}

#[test]
fn manual_selection_returns_replayed_reps() {
    let clip = swing_rep(swing_rep(Clip::new()));
    let mut session = ExerciseSession::with_sink(AnalyzerSettings::default(), Arc::new(NullSink));
    for frame in clip.frames() {
        assert!(session.process_frame(Arc::clone(frame)).is_empty());
    }
    assert_eq!(session.status(), SessionStatus::Detecting);

    let replayed = session
        .select_exercise(Exercise::KettlebellSwing)
        .expect("selection while detecting");
    assert_eq!(replayed.len(), clip.frames().len());

    let reps: Vec<u32> = replayed
        .iter()
        .filter_map(|r| r.completed.as_ref().map(|rep| rep.rep_number))
        .collect();
    assert_eq!(reps, vec![1, 2]);
    assert_eq!(session.rep_count(), 2);
    assert_eq!(session.status(), SessionStatus::Analyzing);
    assert!(session.select_exercise(Exercise::PistolSquat).is_none());
}

#[test]
fn session_detects_pistol_squats() {
    let mut clip = Clip::new();
    for _ in 0..3 {
        clip = pistol_rep(clip);
    }
    let mut session = ExerciseSession::with_sink(AnalyzerSettings::default(), Arc::new(NullSink));
    for frame in clip.frames() {
        session.process_frame(Arc::clone(frame));
    }
    assert_eq!(session.summary().exercise, Exercise::PistolSquat);
    assert_eq!(session.rep_count(), 3);
}
