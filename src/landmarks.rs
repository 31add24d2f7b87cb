use anyhow::Context;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of landmarks the body detector reports for a single person.
pub const LANDMARK_COUNT: usize = 33;

/// Body landmark indices in the order the detector emits them.
///
/// This table is the only place that knows the detector's numbering. If the
/// detector ever reorders its output, this is the one thing to update.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LandmarkId {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkId {
    pub const ALL: [LandmarkId; LANDMARK_COUNT] = [
        LandmarkId::Nose,
        LandmarkId::LeftEyeInner,
        LandmarkId::LeftEye,
        LandmarkId::LeftEyeOuter,
        LandmarkId::RightEyeInner,
        LandmarkId::RightEye,
        LandmarkId::RightEyeOuter,
        LandmarkId::LeftEar,
        LandmarkId::RightEar,
        LandmarkId::MouthLeft,
        LandmarkId::MouthRight,
        LandmarkId::LeftShoulder,
        LandmarkId::RightShoulder,
        LandmarkId::LeftElbow,
        LandmarkId::RightElbow,
        LandmarkId::LeftWrist,
        LandmarkId::RightWrist,
        LandmarkId::LeftPinky,
        LandmarkId::RightPinky,
        LandmarkId::LeftIndex,
        LandmarkId::RightIndex,
        LandmarkId::LeftThumb,
        LandmarkId::RightThumb,
        LandmarkId::LeftHip,
        LandmarkId::RightHip,
        LandmarkId::LeftKnee,
        LandmarkId::RightKnee,
        LandmarkId::LeftAnkle,
        LandmarkId::RightAnkle,
        LandmarkId::LeftHeel,
        LandmarkId::RightHeel,
        LandmarkId::LeftFootIndex,
        LandmarkId::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LandmarkId::Nose => "nose",
            LandmarkId::LeftEyeInner => "left_eye_inner",
            LandmarkId::LeftEye => "left_eye",
            LandmarkId::LeftEyeOuter => "left_eye_outer",
            LandmarkId::RightEyeInner => "right_eye_inner",
            LandmarkId::RightEye => "right_eye",
            LandmarkId::RightEyeOuter => "right_eye_outer",
            LandmarkId::LeftEar => "left_ear",
            LandmarkId::RightEar => "right_ear",
            LandmarkId::MouthLeft => "mouth_left",
            LandmarkId::MouthRight => "mouth_right",
            LandmarkId::LeftShoulder => "left_shoulder",
            LandmarkId::RightShoulder => "right_shoulder",
            LandmarkId::LeftElbow => "left_elbow",
            LandmarkId::RightElbow => "right_elbow",
            LandmarkId::LeftWrist => "left_wrist",
            LandmarkId::RightWrist => "right_wrist",
            LandmarkId::LeftPinky => "left_pinky",
            LandmarkId::RightPinky => "right_pinky",
            LandmarkId::LeftIndex => "left_index",
            LandmarkId::RightIndex => "right_index",
            LandmarkId::LeftThumb => "left_thumb",
            LandmarkId::RightThumb => "right_thumb",
            LandmarkId::LeftHip => "left_hip",
            LandmarkId::RightHip => "right_hip",
            LandmarkId::LeftKnee => "left_knee",
            LandmarkId::RightKnee => "right_knee",
            LandmarkId::LeftAnkle => "left_ankle",
            LandmarkId::RightAnkle => "right_ankle",
            LandmarkId::LeftHeel => "left_heel",
            LandmarkId::RightHeel => "right_heel",
            LandmarkId::LeftFootIndex => "left_foot_index",
            LandmarkId::RightFootIndex => "right_foot_index",
        }
    }
}

/// Bones drawn between landmarks, as published alongside the detector.
pub const CONNECTIONS: [(LandmarkId, LandmarkId); 35] = {
    use LandmarkId::*;
    [
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
        (LeftAnkle, LeftHeel),
        (RightAnkle, RightHeel),
        (LeftHeel, LeftFootIndex),
        (RightHeel, RightFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};

/// A single detected body point.
///
/// `x` and `y` are normalized to the image (0 to 1), `z` is relative depth
/// and `visibility` is the detector's confidence in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 1.0,
        }
    }

    pub fn with_visibility(self, visibility: f64) -> Self {
        Self { visibility, ..self }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Why a landmark could not be used.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LandmarkFault {
    /// The detector output is too short to contain this index.
    Missing(LandmarkId),
    /// A coordinate is NaN or infinite.
    Malformed(LandmarkId),
    /// Visibility is under the configured minimum.
    LowVisibility(LandmarkId),
}

impl std::fmt::Display for LandmarkFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandmarkFault::Missing(id) => write!(f, "landmark {} is missing", id.name()),
            LandmarkFault::Malformed(id) => {
                write!(f, "landmark {} has a non-finite coordinate", id.name())
            }
            LandmarkFault::LowVisibility(id) => {
                write!(f, "landmark {} is below the visibility minimum", id.name())
            }
        }
    }
}

impl std::error::Error for LandmarkFault {}

/// The landmarks reported for one person in one still image.
///
/// Read only: analysis borrows the set and never changes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Look up a landmark that is present, finite and at least `min_visibility` confident.
    pub fn get(&self, id: LandmarkId, min_visibility: f64) -> Result<&Landmark, LandmarkFault> {
        let landmark = self
            .points
            .get(id.index())
            .ok_or(LandmarkFault::Missing(id))?;

        if !landmark.is_finite() {
            return Err(LandmarkFault::Malformed(id));
        }
        if landmark.visibility < min_visibility {
            return Err(LandmarkFault::LowVisibility(id));
        }

        Ok(landmark)
    }
}

impl FromIterator<Landmark> for LandmarkSet {
    fn from_iter<T: IntoIterator<Item = Landmark>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Detector output on disk: either a bare array or `{"landmarks": [...]}`.
/// `null` in either position means no person was found.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Wrapped { landmarks: Option<LandmarkSet> },
    Bare(Option<LandmarkSet>),
}

/// Parse detector output. `Ok(None)` means the detector found no pose.
pub fn parse(json: &str) -> Result<Option<LandmarkSet>> {
    let file: LandmarkFile = serde_json::from_str(json).context("invalid landmark JSON")?;

    Ok(match file {
        LandmarkFile::Wrapped { landmarks } => landmarks,
        LandmarkFile::Bare(landmarks) => landmarks,
    })
}

pub fn load(path: &Path) -> Result<Option<LandmarkSet>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read landmarks from {}", path.display()))?;
    let landmarks =
        parse(&json).with_context(|| format!("failed to parse {}", path.display()))?;

    if let Some(set) = &landmarks {
        if !set.is_complete() {
            log::warn!(
                "{} holds {} landmarks, expected {}",
                path.display(),
                set.len(),
                LANDMARK_COUNT
            );
        }
    }

    Ok(landmarks)
}
