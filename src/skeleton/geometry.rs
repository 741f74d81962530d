//! Joint angles, wrist height, bounding box and facing direction.
//!
//! Every accessor is total. Missing keypoints fall back to anatomically
//! neutral values: 180° (fully extended) for hip and knee, 0° for arm angle
//! and wrist height. Only [`Skeleton::angle`] and the `try_*` variants expose
//! availability.

use serde::Serialize;

use super::{Joint, Keypoint, KeypointSet, Side, Skeleton};

/// Angle reported for a joint whose keypoints are missing.
pub const NEUTRAL_EXTENDED: f64 = 180.0;

/// Minimum keypoint score for a side to be used without falling back.
pub const RELIABLE_SCORE: f64 = 0.5;

/// Knee/ankle x offsets smaller than this give no facing signal.
pub const FACING_NOISE: f64 = 5.0;

/// Vectors shorter than this are treated as degenerate.
const MIN_VECTOR_LEN: f64 = 1e-6;

/// Angle at `vertex` formed by `p1`-`vertex`-`p2`, in degrees.
///
/// Degenerate (zero-length) vectors yield 0°.
pub fn angle_between(p1: (f64, f64), vertex: (f64, f64), p2: (f64, f64)) -> f64 {
    let v1 = (p1.0 - vertex.0, p1.1 - vertex.1);
    let v2 = (p2.0 - vertex.0, p2.1 - vertex.1);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if mag1 < MIN_VECTOR_LEN || mag2 < MIN_VECTOR_LEN {
        return 0.0;
    }

    let cos_angle = ((v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Signed angle between `v` and straight down (screen +y), in (-180, 180].
///
/// Positive when `v` leans toward +x. Mirroring the image flips the sign and
/// keeps the magnitude.
pub fn signed_angle_from_down(v: (f64, f64)) -> f64 {
    if v.0.hypot(v.1) < MIN_VECTOR_LEN {
        return 0.0;
    }
    v.0.atan2(v.1).to_degrees()
}

/// Spine lean from vertical using shoulder and hip midpoints.
///
/// 0° is upright, 90° horizontal. This is what upstream pose extraction
/// supplies as the skeleton's spine angle; analyzers never call it.
pub fn spine_angle_from_keypoints(keypoints: &KeypointSet) -> Option<f64> {
    let shoulder = midpoint(keypoints, Joint::LeftShoulder, Joint::RightShoulder)?;
    let hip = midpoint(keypoints, Joint::LeftHip, Joint::RightHip)?;

    let spine = (shoulder.0 - hip.0, shoulder.1 - hip.1);
    let len = spine.0.hypot(spine.1);
    if len < MIN_VECTOR_LEN {
        return Some(0.0);
    }
    // Vertical is negative y in screen coordinates.
    let cos_spine = (-spine.1 / len).clamp(-1.0, 1.0);
    Some(cos_spine.acos().to_degrees())
}

fn midpoint(keypoints: &KeypointSet, a: Joint, b: Joint) -> Option<(f64, f64)> {
    match (keypoints[a.index()], keypoints[b.index()]) {
        (Some(a), Some(b)) => Some(((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)),
        (Some(only), None) | (None, Some(only)) => Some(only.position()),
        (None, None) => None,
    }
}

fn three_point(keypoints: &KeypointSet, p1: Joint, vertex: Joint, p2: Joint) -> Option<f64> {
    let p1 = keypoints[p1.index()]?;
    let vertex = keypoints[vertex.index()]?;
    let p2 = keypoints[p2.index()]?;
    Some(angle_between(p1.position(), vertex.position(), p2.position()))
}

/// Hip and knee angles per side, measured once when the skeleton is built.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JointAngles {
    left_hip: Option<f64>,
    right_hip: Option<f64>,
    left_knee: Option<f64>,
    right_knee: Option<f64>,
}

impl JointAngles {
    pub(crate) fn measure(keypoints: &KeypointSet) -> Self {
        let hip = |side| {
            three_point(keypoints, Joint::knee(side), Joint::hip(side), Joint::shoulder(side))
        };
        let knee = |side| {
            three_point(keypoints, Joint::hip(side), Joint::knee(side), Joint::ankle(side))
        };
        Self {
            left_hip: hip(Side::Left),
            right_hip: hip(Side::Right),
            left_knee: knee(Side::Left),
            right_knee: knee(Side::Right),
        }
    }

    fn hip(&self, side: Side) -> Option<f64> {
        match side {
            Side::Left => self.left_hip,
            Side::Right => self.right_hip,
        }
    }

    fn knee(&self, side: Side) -> Option<f64> {
        match side {
            Side::Left => self.left_knee,
            Side::Right => self.right_knee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
    Indeterminate,
}

impl Skeleton {
    /// Angle at `vertex`, or `None` when any of the three keypoints is missing.
    pub fn angle(&self, p1: Joint, vertex: Joint, p2: Joint) -> Option<f64> {
        three_point(self.keypoints(), p1, vertex, p2)
    }

    /// Signed shoulder→elbow angle from straight down.
    ///
    /// Uses `preferred` (left when `None`) unless that side is missing or below
    /// [`RELIABLE_SCORE`], in which case the more confident side wins. 0° when
    /// neither arm is visible.
    pub fn arm_to_vertical(&self, preferred: Option<Side>) -> f64 {
        let preferred = preferred.unwrap_or(Side::Left);
        let reliability = |side| -> Option<f64> {
            let shoulder = self.keypoint(Joint::shoulder(side))?;
            let elbow = self.keypoint(Joint::elbow(side))?;
            Some(shoulder.score.min(elbow.score))
        };

        let side = match (reliability(preferred), reliability(preferred.opposite())) {
            (Some(score), _) if score >= RELIABLE_SCORE => preferred,
            (Some(own), Some(other)) => {
                if other > own {
                    preferred.opposite()
                } else {
                    preferred
                }
            }
            (Some(_), None) => preferred,
            (None, Some(_)) => preferred.opposite(),
            (None, None) => return 0.0,
        };

        match (
            self.keypoint(Joint::shoulder(side)),
            self.keypoint(Joint::elbow(side)),
        ) {
            (Some(shoulder), Some(elbow)) => {
                signed_angle_from_down((elbow.x - shoulder.x, elbow.y - shoulder.y))
            }
            _ => 0.0,
        }
    }

    /// Knee-hip-shoulder angle on one side, if measurable.
    pub fn try_hip_angle(&self, side: Side) -> Option<f64> {
        self.angles.hip(side)
    }

    /// Hip-knee-ankle angle on one side, if measurable.
    pub fn try_knee_angle(&self, side: Side) -> Option<f64> {
        self.angles.knee(side)
    }

    pub fn hip_angle_for(&self, side: Side) -> f64 {
        self.try_hip_angle(side).unwrap_or(NEUTRAL_EXTENDED)
    }

    pub fn knee_angle_for(&self, side: Side) -> f64 {
        self.try_knee_angle(side).unwrap_or(NEUTRAL_EXTENDED)
    }

    /// Left hip angle, falling back to the right side, then to 180°.
    pub fn hip_angle(&self) -> f64 {
        self.try_hip_angle(Side::Left)
            .or_else(|| self.try_hip_angle(Side::Right))
            .unwrap_or(NEUTRAL_EXTENDED)
    }

    /// Left knee angle, falling back to the right side, then to 180°.
    pub fn knee_angle(&self) -> f64 {
        self.try_knee_angle(Side::Left)
            .or_else(|| self.try_knee_angle(Side::Right))
            .unwrap_or(NEUTRAL_EXTENDED)
    }

    /// Wrist height above the shoulder midpoint (positive = above).
    ///
    /// With no preference the visible wrists are averaged; with a preference
    /// the other wrist is only used when the preferred one is missing.
    pub fn wrist_height(&self, preferred: Option<Side>) -> f64 {
        let Some(shoulder_y) =
            midpoint(self.keypoints(), Joint::LeftShoulder, Joint::RightShoulder).map(|p| p.1)
        else {
            return 0.0;
        };
        let height = |side| self.keypoint(Joint::wrist(side)).map(|w| shoulder_y - w.y);

        match preferred {
            Some(side) => height(side).or_else(|| height(side.opposite())).unwrap_or(0.0),
            None => match (height(Side::Left), height(Side::Right)) {
                (Some(l), Some(r)) => (l + r) / 2.0,
                (Some(h), None) | (None, Some(h)) => h,
                (None, None) => 0.0,
            },
        }
    }

    /// Mean screen y of the visible ears; larger means lower in the frame.
    pub fn ear_y(&self) -> Option<f64> {
        match (self.keypoint(Joint::LeftEar), self.keypoint(Joint::RightEar)) {
            (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
            (Some(ear), None) | (None, Some(ear)) => Some(ear.y),
            (None, None) => None,
        }
    }

    /// Box around keypoints scoring at least `min_confidence`, grown on each
    /// side by `padding` times its width/height. `None` below three points.
    pub fn bounding_box(&self, min_confidence: f64, padding: f64) -> Option<BoundingBox> {
        let points: Vec<&Keypoint> = self
            .keypoints()
            .iter()
            .flatten()
            .filter(|kp| kp.score >= min_confidence)
            .collect();
        if points.len() < 3 {
            return None;
        }

        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for kp in points {
            bbox.min_x = bbox.min_x.min(kp.x);
            bbox.min_y = bbox.min_y.min(kp.y);
            bbox.max_x = bbox.max_x.max(kp.x);
            bbox.max_y = bbox.max_y.max(kp.y);
        }

        let pad_x = bbox.width() * padding;
        let pad_y = bbox.height() * padding;
        Some(BoundingBox {
            min_x: bbox.min_x - pad_x,
            min_y: bbox.min_y - pad_y,
            max_x: bbox.max_x + pad_x,
            max_y: bbox.max_y + pad_y,
        })
    }

    /// Which way the athlete faces, from the knee's x offset over the ankle.
    pub fn facing_direction(&self) -> Facing {
        let offsets: Vec<f64> = [Side::Left, Side::Right]
            .into_iter()
            .filter_map(|side| {
                let knee = self.keypoint(Joint::knee(side))?;
                let ankle = self.keypoint(Joint::ankle(side))?;
                Some(knee.x - ankle.x)
            })
            .collect();
        if offsets.is_empty() {
            return Facing::Indeterminate;
        }

        let mean = offsets.iter().sum::<f64>() / offsets.len() as f64;
        if mean.abs() < FACING_NOISE {
            Facing::Indeterminate
        } else if mean > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}
