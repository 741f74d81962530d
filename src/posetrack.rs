//! `.posetrack.json` files: keypoints extracted offline from a video.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skeleton::geometry::spine_angle_from_keypoints;
use crate::skeleton::{Joint, Keypoint, KeypointFormat, KeypointSet, Skeleton};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseTrackMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub model_version: Option<String>,
    pub keypoint_format: KeypointFormat,
    #[serde(default)]
    pub keypoint_count: usize,
    #[serde(default)]
    pub source_video_hash: Option<String>,
    #[serde(default)]
    pub source_video_name: Option<String>,
    #[serde(default)]
    pub source_video_duration: Option<f64>,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frame_count: usize,
    #[serde(default)]
    pub fps: f64,
    #[serde(default)]
    pub video_width: u32,
    #[serde(default)]
    pub video_height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseKeypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedKeypoint {
    #[serde(flatten)]
    pub point: PoseKeypoint,
    #[serde(default)]
    pub name: Option<String>,
}

/// Angles the extractor computed per frame. Only the spine angle is used.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrecomputedAngles {
    pub spine_angle: Option<f64>,
    pub arm_to_spine_angle: Option<f64>,
    pub arm_to_vertical_angle: Option<f64>,
    pub hip_angle: Option<f64>,
    pub knee_angle: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    pub frame_index: u64,
    /// Milliseconds from the start of the video.
    pub timestamp: f64,
    #[serde(default)]
    pub video_time: Option<f64>,
    #[serde(default)]
    pub keypoints: Vec<NamedKeypoint>,
    /// Mean keypoint confidence; 0 when nobody was detected.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub angles: Option<PrecomputedAngles>,
}

impl PoseFrame {
    /// Convert to a [`Skeleton`], dropping keypoints scored below `min_score`.
    ///
    /// Keypoints are matched by name first and by position in `format`
    /// otherwise. A frame scored 0 becomes an empty skeleton.
    pub fn to_skeleton(&self, format: KeypointFormat, min_score: f64) -> Skeleton {
        let mut keypoints: KeypointSet = [None; Joint::COUNT];
        if self.score > 0.0 {
            for (index, kp) in self.keypoints.iter().enumerate() {
                let joint = kp
                    .name
                    .as_deref()
                    .and_then(Joint::from_name)
                    .or_else(|| format.joint_at(index));
                let Some(joint) = joint else {
                    continue;
                };
                if kp.point.score > 0.0 && kp.point.score >= min_score {
                    keypoints[joint.index()] = Some(Keypoint::new(kp.point.x, kp.point.y, kp.point.score));
                }
            }
        }

        let spine = self
            .angles
            .and_then(|a| a.spine_angle)
            .or_else(|| spine_angle_from_keypoints(&keypoints))
            .unwrap_or(0.0);

        let mut skeleton = Skeleton::new(keypoints, spine, self.timestamp)
            .with_frame_index(self.frame_index);
        if let Some(video_time) = self.video_time {
            skeleton = skeleton.with_video_time(video_time);
        }
        skeleton
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseTrack {
    pub metadata: PoseTrackMetadata,
    pub frames: Vec<PoseFrame>,
}

impl PoseTrack {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read posetrack from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse posetrack in {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let track: PoseTrack = serde_json::from_str(json)?;
        Ok(track)
    }

    /// Every frame as a skeleton, in file order.
    pub fn skeletons(&self, min_score: f64) -> Vec<Skeleton> {
        self.frames
            .iter()
            .map(|frame| frame.to_skeleton(self.metadata.keypoint_format, min_score))
            .collect()
    }
}
