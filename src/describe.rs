//! Words for joint angles, fed into image prompts.

use crate::angles::{AngleMap, Joint, JointKind};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// At or above this an elbow reads as straight.
pub const ELBOW_STRAIGHT_DEG: f64 = 150.;
/// Above this an elbow reads as slightly bent.
pub const ELBOW_SLIGHT_DEG: f64 = 90.;
pub const KNEE_STRAIGHT_DEG: f64 = 160.;
pub const KNEE_SLIGHT_DEG: f64 = 110.;

/// Phrase for a single joint.
///
/// Elbows and knees are bucketed by how far they flex. Shoulders and hips
/// describe orientation, so they only report the angle.
pub fn describe_joint(joint: Joint, degrees: f64) -> String {
    match joint.kind() {
        JointKind::Elbow => flexion(degrees, ELBOW_STRAIGHT_DEG, ELBOW_SLIGHT_DEG),
        JointKind::Knee => flexion(degrees, KNEE_STRAIGHT_DEG, KNEE_SLIGHT_DEG),
        JointKind::Shoulder | JointKind::Hip => format!("at {degrees:.1} degrees"),
        JointKind::Spine => format!("spine aligned at {degrees:.1} degrees"),
    }
}

fn flexion(degrees: f64, straight: f64, slight: f64) -> String {
    if degrees >= straight {
        "straight".to_string()
    } else if degrees > slight {
        format!("slightly bent at {degrees:.1} degrees")
    } else {
        format!("bent at {degrees:.1} degrees")
    }
}

/// One phrase per joint, keyed `<joint>_desc`.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseDescription {
    phrases: Vec<(Joint, String)>,
}

impl PoseDescription {
    /// What callers get when there are no landmarks at all.
    pub fn fallback() -> Self {
        describe(&AngleMap::uniform(crate::params::AnalysisParams::default().default_angle_deg))
    }

    pub fn get(&self, joint: Joint) -> &str {
        self.phrases
            .iter()
            .find(|(j, _)| *j == joint)
            .map(|(_, phrase)| phrase.as_str())
            .unwrap_or_default()
    }

    /// `(key, phrase)` pairs in joint order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &str)> {
        self.phrases
            .iter()
            .map(|(joint, phrase)| (key(*joint), phrase.as_str()))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

pub fn key(joint: Joint) -> String {
    format!("{}_desc", joint.name())
}

impl Serialize for PoseDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.phrases.len()))?;
        for (key, phrase) in self.entries() {
            map.serialize_entry(&key, phrase)?;
        }
        map.end()
    }
}

pub fn describe(angles: &AngleMap) -> PoseDescription {
    let phrases = angles
        .iter()
        .map(|(joint, reading)| (joint, describe_joint(joint, reading.degrees)))
        .collect();

    PoseDescription { phrases }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elbow_band_edges() {
        assert_eq!(describe_joint(Joint::LeftElbow, 150.), "straight");
        assert_eq!(
            describe_joint(Joint::LeftElbow, 149.9),
            "slightly bent at 149.9 degrees"
        );
        assert_eq!(
            describe_joint(Joint::RightElbow, 90.1),
            "slightly bent at 90.1 degrees"
        );
        assert_eq!(describe_joint(Joint::RightElbow, 90.), "bent at 90.0 degrees");
        assert_eq!(describe_joint(Joint::RightElbow, 89.9), "bent at 89.9 degrees");
    }

    #[test]
    fn knee_band_edges() {
        assert_eq!(describe_joint(Joint::LeftKnee, 160.), "straight");
        assert_eq!(
            describe_joint(Joint::LeftKnee, 155.),
            "slightly bent at 155.0 degrees"
        );
        assert_eq!(describe_joint(Joint::RightKnee, 110.), "bent at 110.0 degrees");
        assert_eq!(describe_joint(Joint::RightKnee, 109.9), "bent at 109.9 degrees");
    }

    #[test]
    fn orientation_joints_only_report_angle() {
        assert_eq!(describe_joint(Joint::RightShoulder, 175.), "at 175.0 degrees");
        assert_eq!(describe_joint(Joint::LeftHip, 12.34), "at 12.3 degrees");
        assert_eq!(describe_joint(Joint::Spine, 88.), "spine aligned at 88.0 degrees");
    }

    #[test]
    fn every_joint_has_a_key() {
        let description = describe(&AngleMap::uniform(120.));
        let keys: Vec<String> = description.entries().map(|(k, _)| k).collect();

        assert_eq!(
            keys,
            [
                "right_shoulder_desc",
                "right_elbow_desc",
                "left_shoulder_desc",
                "left_elbow_desc",
                "right_hip_desc",
                "right_knee_desc",
                "left_hip_desc",
                "left_knee_desc",
                "spine_desc",
            ]
        );
    }

    #[test]
    fn describing_twice_is_identical() {
        let angles = AngleMap::uniform(100.).with(Joint::Spine, 42.);
        assert_eq!(describe(&angles), describe(&angles));
    }

    #[test]
    fn fallback_is_complete_and_neutral() {
        let fallback = PoseDescription::fallback();
        assert_eq!(fallback.len(), 9);
        assert_eq!(fallback.get(Joint::Spine), "spine aligned at 90.0 degrees");
        assert_eq!(fallback.get(Joint::LeftElbow), "bent at 90.0 degrees");
    }
}
