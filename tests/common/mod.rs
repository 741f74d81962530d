//! Synthetic pose fixtures: keypoints laid out so the skeleton's measured
//! angles come out at the requested values.

#![allow(dead_code)]

use std::sync::Arc;

use swing_analyzer_lib::skeleton::{Joint, Keypoint, Skeleton};

const SEGMENT: f64 = 100.0;
const CONFIDENCE: f64 = 0.9;
const HIP: (f64, f64) = (320.0, 300.0);

/// Target angles for one synthetic frame.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    /// Signed shoulder→elbow angle from straight down.
    pub arm: f64,
    pub spine: f64,
    pub hip: f64,
    pub left_knee: f64,
    pub right_knee: f64,
    /// Wrist height above the shoulders.
    pub wrist_height: f64,
    pub ear_y: Option<f64>,
}

impl Pose {
    pub fn swing(arm: f64, spine: f64, hip: f64) -> Self {
        Self {
            arm,
            spine,
            hip,
            left_knee: 170.0,
            right_knee: 170.0,
            wrist_height: -30.0,
            ear_y: None,
        }
    }

    pub fn squat(left_knee: f64, right_knee: f64, ear_y: f64) -> Self {
        Self {
            arm: 0.0,
            spine: 15.0,
            hip: 120.0,
            left_knee,
            right_knee,
            wrist_height: -60.0,
            ear_y: Some(ear_y),
        }
    }

    pub fn with_wrist(mut self, wrist_height: f64) -> Self {
        self.wrist_height = wrist_height;
        self
    }

    pub fn with_spine(mut self, spine: f64) -> Self {
        self.spine = spine;
        self
    }

    pub fn skeleton(&self, timestamp_ms: f64) -> Skeleton {
        // Directions are measured from straight down, positive toward +x.
        let toward = |from: (f64, f64), deg: f64| {
            let rad = deg.to_radians();
            (from.0 + SEGMENT * rad.sin(), from.1 + SEGMENT * rad.cos())
        };
        let kp = |p: (f64, f64)| Keypoint::new(p.0, p.1, CONFIDENCE);

        let shoulder_dir = 180.0 - self.spine;
        let thigh_dir = shoulder_dir - self.hip;
        let shoulder = toward(HIP, shoulder_dir);
        let knee = toward(HIP, thigh_dir);
        let elbow = toward(shoulder, self.arm);
        let wrist = (elbow.0, shoulder.1 - self.wrist_height);
        let ankle = |knee_angle: f64| toward(knee, thigh_dir + 180.0 + knee_angle);

        let mut joints = vec![
            (Joint::LeftShoulder, kp(shoulder)),
            (Joint::RightShoulder, kp(shoulder)),
            (Joint::LeftElbow, kp(elbow)),
            (Joint::RightElbow, kp(elbow)),
            (Joint::LeftWrist, kp(wrist)),
            (Joint::RightWrist, kp(wrist)),
            (Joint::LeftHip, kp(HIP)),
            (Joint::RightHip, kp(HIP)),
            (Joint::LeftKnee, kp(knee)),
            (Joint::RightKnee, kp(knee)),
            (Joint::LeftAnkle, kp(ankle(self.left_knee))),
            (Joint::RightAnkle, kp(ankle(self.right_knee))),
        ];
        if let Some(ear_y) = self.ear_y {
            joints.push((Joint::LeftEar, kp((shoulder.0, ear_y))));
            joints.push((Joint::RightEar, kp((shoulder.0, ear_y))));
        }
        Skeleton::from_joints(joints, self.spine, timestamp_ms)
    }
}

pub const FRAME_MS: f64 = 33.3;

/// Turns poses into timestamped skeletons with frame indices.
pub struct Clip {
    frames: Vec<Arc<Skeleton>>,
}

impl Clip {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn hold(mut self, pose: Pose, frames: usize) -> Self {
        for _ in 0..frames {
            self.push(pose);
        }
        self
    }

    pub fn then(mut self, poses: impl IntoIterator<Item = Pose>) -> Self {
        for pose in poses {
            self.push(pose);
        }
        self
    }

    fn push(&mut self, pose: Pose) {
        let index = self.frames.len() as u64;
        let skeleton = pose
            .skeleton(index as f64 * FRAME_MS)
            .with_frame_index(index)
            .with_video_time(index as f64 * FRAME_MS / 1000.0);
        self.frames.push(Arc::new(skeleton));
    }

    pub fn frames(&self) -> &[Arc<Skeleton>] {
        &self.frames
    }

    pub fn mirrored(&self, axis_x: f64) -> Vec<Arc<Skeleton>> {
        self.frames
            .iter()
            .map(|s| Arc::new(s.mirrored(axis_x)))
            .collect()
    }
}

/// One kettlebell swing: top, connect, bottom, release held three frames
/// each, then the wrist floating up to its apex and dropping back.
pub fn swing_rep(clip: Clip) -> Clip {
    clip.hold(Pose::swing(80.0, 10.0, 170.0), 3)
        .hold(Pose::swing(20.0, 20.0, 155.0), 3)
        .hold(Pose::swing(-10.0, 50.0, 120.0), 3)
        .hold(Pose::swing(20.0, 15.0, 155.0), 3)
        .then(
            [10.0, 20.0, 30.0, 50.0, 50.0, 50.0, 40.0, 30.0]
                .into_iter()
                .map(|h| Pose::swing(60.0, 10.0, 170.0).with_wrist(h)),
        )
}

/// One pistol squat on the right leg; the left leg stays extended.
pub fn pistol_rep(clip: Clip) -> Clip {
    const RIGHT_KNEE_AND_EAR: [(f64, f64); 17] = [
        (145.0, 120.0),
        (130.0, 135.0),
        (115.0, 150.0),
        (100.0, 165.0),
        (85.0, 180.0),
        (75.0, 190.0),
        (70.0, 200.0),
        (60.0, 210.0),
        (70.0, 203.0),
        (80.0, 196.0),
        (95.0, 185.0),
        (110.0, 170.0),
        (125.0, 155.0),
        (140.0, 140.0),
        (155.0, 125.0),
        (165.0, 110.0),
        (170.0, 100.0),
    ];
    clip.hold(Pose::squat(170.0, 170.0, 100.0), 4)
        .then(
            RIGHT_KNEE_AND_EAR
                .into_iter()
                .map(|(knee, ear)| Pose::squat(170.0, knee, ear)),
        )
        .hold(Pose::squat(170.0, 170.0, 100.0), 2)
}
