//! Keypoint layouts emitted by upstream pose models.

use serde::{Deserialize, Serialize};

use super::Joint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeypointFormat {
    #[serde(rename = "coco-17")]
    Coco17,
    #[serde(rename = "blazepose-33")]
    BlazePose33,
}

/// BlazePose-33 indices of the joints the engine reads.
const BLAZEPOSE_JOINTS: [(usize, Joint); Joint::COUNT] = [
    (0, Joint::Nose),
    (2, Joint::LeftEye),
    (5, Joint::RightEye),
    (7, Joint::LeftEar),
    (8, Joint::RightEar),
    (11, Joint::LeftShoulder),
    (12, Joint::RightShoulder),
    (13, Joint::LeftElbow),
    (14, Joint::RightElbow),
    (15, Joint::LeftWrist),
    (16, Joint::RightWrist),
    (23, Joint::LeftHip),
    (24, Joint::RightHip),
    (25, Joint::LeftKnee),
    (26, Joint::RightKnee),
    (27, Joint::LeftAnkle),
    (28, Joint::RightAnkle),
];

impl KeypointFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeypointFormat::Coco17 => "coco-17",
            KeypointFormat::BlazePose33 => "blazepose-33",
        }
    }

    pub fn keypoint_count(&self) -> usize {
        match self {
            KeypointFormat::Coco17 => 17,
            KeypointFormat::BlazePose33 => 33,
        }
    }

    /// Joint stored at `index` in this layout, if the engine uses it.
    pub fn joint_at(&self, index: usize) -> Option<Joint> {
        match self {
            KeypointFormat::Coco17 => Joint::ALL.get(index).copied(),
            KeypointFormat::BlazePose33 => BLAZEPOSE_JOINTS
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, joint)| *joint),
        }
    }

    /// Guess the layout from how many keypoints a frame carries.
    pub fn from_count(count: usize) -> Option<KeypointFormat> {
        match count {
            17 => Some(KeypointFormat::Coco17),
            33 => Some(KeypointFormat::BlazePose33),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coco_indices_follow_joint_order() {
        assert_eq!(KeypointFormat::Coco17.joint_at(0), Some(Joint::Nose));
        assert_eq!(KeypointFormat::Coco17.joint_at(13), Some(Joint::LeftKnee));
        assert_eq!(KeypointFormat::Coco17.joint_at(17), None);
    }

    #[test]
    fn blazepose_skips_hand_and_face_detail() {
        let format = KeypointFormat::BlazePose33;
        assert_eq!(format.joint_at(25), Some(Joint::LeftKnee));
        assert_eq!(format.joint_at(8), Some(Joint::RightEar));
        assert_eq!(format.joint_at(17), None);
        assert_eq!(format.keypoint_count(), 33);
    }

    #[test]
    fn format_names_match_posetrack_metadata() {
        let parsed: KeypointFormat = serde_json::from_str("\"blazepose-33\"").unwrap();
        assert_eq!(parsed, KeypointFormat::BlazePose33);
        assert_eq!(KeypointFormat::Coco17.as_str(), "coco-17");
        assert_eq!(KeypointFormat::from_count(17), Some(KeypointFormat::Coco17));
    }
}
