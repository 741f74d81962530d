//! Per-frame pose snapshot.
//!
//! A [`Skeleton`] is immutable once built. The per-side hip and knee angles
//! are measured eagerly in the constructor, so every later query is a field
//! read. Everything else lives in [`geometry`].

pub mod formats;
pub mod geometry;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

pub use formats::KeypointFormat;
pub use geometry::{BoundingBox, Facing};

use geometry::JointAngles;

/// 2D keypoint in screen coordinates (y grows downward) with detector confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub score: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, score: f64) -> Self {
        Self { x, y, score }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(anyhow!("invalid side {other:?}: expected \"left\" or \"right\"")),
        }
    }
}

/// Body joints the engine reads. Discriminants follow COCO-17 order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const COUNT: usize = 17;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "left_eye",
            Joint::RightEye => "right_eye",
            Joint::LeftEar => "left_ear",
            Joint::RightEar => "right_ear",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Joint> {
        Joint::ALL.into_iter().find(|joint| joint.as_str() == name)
    }

    /// Same joint on the other side of the body; centre joints map to themselves.
    pub fn mirrored(self) -> Joint {
        match self {
            Joint::Nose => Joint::Nose,
            Joint::LeftEye => Joint::RightEye,
            Joint::RightEye => Joint::LeftEye,
            Joint::LeftEar => Joint::RightEar,
            Joint::RightEar => Joint::LeftEar,
            Joint::LeftShoulder => Joint::RightShoulder,
            Joint::RightShoulder => Joint::LeftShoulder,
            Joint::LeftElbow => Joint::RightElbow,
            Joint::RightElbow => Joint::LeftElbow,
            Joint::LeftWrist => Joint::RightWrist,
            Joint::RightWrist => Joint::LeftWrist,
            Joint::LeftHip => Joint::RightHip,
            Joint::RightHip => Joint::LeftHip,
            Joint::LeftKnee => Joint::RightKnee,
            Joint::RightKnee => Joint::LeftKnee,
            Joint::LeftAnkle => Joint::RightAnkle,
            Joint::RightAnkle => Joint::LeftAnkle,
        }
    }

    pub fn ear(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftEar,
            Side::Right => Joint::RightEar,
        }
    }

    pub fn shoulder(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftShoulder,
            Side::Right => Joint::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftElbow,
            Side::Right => Joint::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftWrist,
            Side::Right => Joint::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftHip,
            Side::Right => Joint::RightHip,
        }
    }

    pub fn knee(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftKnee,
            Side::Right => Joint::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Joint {
        match side {
            Side::Left => Joint::LeftAnkle,
            Side::Right => Joint::RightAnkle,
        }
    }
}

pub type KeypointSet = [Option<Keypoint>; Joint::COUNT];

/// Immutable per-frame pose snapshot.
#[derive(Debug, Clone)]
pub struct Skeleton {
    keypoints: KeypointSet,
    spine_angle: f64,
    timestamp_ms: f64,
    video_time: Option<f64>,
    frame_index: Option<u64>,
    /// Captured video frame, only ever used to build checkpoint thumbnails.
    frame: Option<Arc<RgbaImage>>,
    angles: JointAngles,
}

impl Skeleton {
    /// `spine_angle` is computed upstream (shoulder/hip midpoints vs. vertical).
    pub fn new(keypoints: KeypointSet, spine_angle: f64, timestamp_ms: f64) -> Self {
        let angles = JointAngles::measure(&keypoints);
        Self {
            keypoints,
            spine_angle,
            timestamp_ms,
            video_time: None,
            frame_index: None,
            frame: None,
            angles,
        }
    }

    pub fn from_joints<I>(joints: I, spine_angle: f64, timestamp_ms: f64) -> Self
    where
        I: IntoIterator<Item = (Joint, Keypoint)>,
    {
        let mut keypoints: KeypointSet = [None; Joint::COUNT];
        for (joint, keypoint) in joints {
            keypoints[joint.index()] = Some(keypoint);
        }
        Self::new(keypoints, spine_angle, timestamp_ms)
    }

    /// A frame where the pose model found nobody.
    pub fn empty(timestamp_ms: f64) -> Self {
        Self::new([None; Joint::COUNT], 0.0, timestamp_ms)
    }

    pub fn with_video_time(mut self, video_time: f64) -> Self {
        self.video_time = Some(video_time);
        self
    }

    pub fn with_frame_index(mut self, frame_index: u64) -> Self {
        self.frame_index = Some(frame_index);
        self
    }

    pub fn with_frame(mut self, frame: Arc<RgbaImage>) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn keypoint(&self, joint: Joint) -> Option<&Keypoint> {
        self.keypoints[joint.index()].as_ref()
    }

    pub fn keypoints(&self) -> &KeypointSet {
        &self.keypoints
    }

    pub fn has_keypoints(&self) -> bool {
        self.keypoints.iter().any(Option::is_some)
    }

    pub fn spine_angle(&self) -> f64 {
        self.spine_angle
    }

    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    pub fn video_time(&self) -> Option<f64> {
        self.video_time
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn frame(&self) -> Option<&Arc<RgbaImage>> {
        self.frame.as_ref()
    }

    /// Horizontally flipped copy about `axis_x`, with left/right joints swapped.
    pub fn mirrored(&self, axis_x: f64) -> Skeleton {
        let mut keypoints: KeypointSet = [None; Joint::COUNT];
        for joint in Joint::ALL {
            if let Some(kp) = self.keypoint(joint) {
                keypoints[joint.mirrored().index()] =
                    Some(Keypoint::new(2.0 * axis_x - kp.x, kp.y, kp.score));
            }
        }
        let mut mirrored = Skeleton::new(keypoints, self.spine_angle, self.timestamp_ms);
        mirrored.video_time = self.video_time;
        mirrored.frame_index = self.frame_index;
        mirrored.frame = self.frame.clone();
        mirrored
    }
}
