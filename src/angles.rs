//! Joint angles from detected landmarks.
//!
//! Every joint angle is the unsigned interior angle at a vertex landmark,
//! between the limbs running to a distal and a proximal landmark. Angles are
//! recomputed from the landmarks on every call and never cached.

use crate::landmarks::{LandmarkFault, LandmarkId, LandmarkSet};
use crate::params::AnalysisParams;
use serde::ser::{Serialize, SerializeMap, Serializer};
use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

/// How a joint is described in words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JointKind {
    Elbow,
    Knee,
    Shoulder,
    Hip,
    Spine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    RightShoulder,
    RightElbow,
    LeftShoulder,
    LeftElbow,
    RightHip,
    RightKnee,
    LeftHip,
    LeftKnee,
    Spine,
}

/// A point used to build an angle: a landmark, or the midpoint of two.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    Point(LandmarkId),
    Midpoint(LandmarkId, LandmarkId),
}

impl Joint {
    pub const ALL: [Joint; 9] = [
        Joint::RightShoulder,
        Joint::RightElbow,
        Joint::LeftShoulder,
        Joint::LeftElbow,
        Joint::RightHip,
        Joint::RightKnee,
        Joint::LeftHip,
        Joint::LeftKnee,
        Joint::Spine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Joint::RightShoulder => "right_shoulder",
            Joint::RightElbow => "right_elbow",
            Joint::LeftShoulder => "left_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightHip => "right_hip",
            Joint::RightKnee => "right_knee",
            Joint::LeftHip => "left_hip",
            Joint::LeftKnee => "left_knee",
            Joint::Spine => "spine",
        }
    }

    pub fn kind(self) -> JointKind {
        match self {
            Joint::RightShoulder | Joint::LeftShoulder => JointKind::Shoulder,
            Joint::RightElbow | Joint::LeftElbow => JointKind::Elbow,
            Joint::RightHip | Joint::LeftHip => JointKind::Hip,
            Joint::RightKnee | Joint::LeftKnee => JointKind::Knee,
            Joint::Spine => JointKind::Spine,
        }
    }

    /// The (distal, vertex, proximal) anchors the angle is measured between.
    pub fn anchors(self) -> [Anchor; 3] {
        use Anchor::{Midpoint, Point};
        use LandmarkId::*;

        match self {
            Joint::RightShoulder => [Point(RightElbow), Point(RightShoulder), Point(RightHip)],
            Joint::RightElbow => [Point(RightWrist), Point(RightElbow), Point(RightShoulder)],
            Joint::LeftShoulder => [Point(LeftElbow), Point(LeftShoulder), Point(LeftHip)],
            Joint::LeftElbow => [Point(LeftWrist), Point(LeftElbow), Point(LeftShoulder)],
            Joint::RightHip => [Point(RightKnee), Point(RightHip), Point(RightShoulder)],
            Joint::RightKnee => [Point(RightAnkle), Point(RightKnee), Point(RightHip)],
            Joint::LeftHip => [Point(LeftKnee), Point(LeftHip), Point(LeftShoulder)],
            Joint::LeftKnee => [Point(LeftAnkle), Point(LeftKnee), Point(LeftHip)],
            Joint::Spine => [
                Point(Nose),
                Midpoint(LeftShoulder, RightShoulder),
                Midpoint(LeftHip, RightHip),
            ],
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Why a joint angle could not be measured.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AngleError {
    /// The detector did not give a usable landmark.
    Landmark(LandmarkFault),
    /// A limb vector has zero length, so the angle is undefined.
    Degenerate(Joint),
}

impl std::fmt::Display for AngleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngleError::Landmark(fault) => write!(f, "{fault}"),
            AngleError::Degenerate(joint) => {
                write!(f, "{} has a zero-length limb", joint.name())
            }
        }
    }
}

impl std::error::Error for AngleError {}

impl From<LandmarkFault> for AngleError {
    fn from(fault: LandmarkFault) -> Self {
        AngleError::Landmark(fault)
    }
}

/// Interior angle at `vertex` in degrees, between `distal` and `proximal`.
///
/// Returns `None` when either limb vector has zero length.
pub fn angle_between(distal: [f64; 3], vertex: [f64; 3], proximal: [f64; 3]) -> Option<f64> {
    let v1 = sub(distal, vertex);
    let v2 = sub(proximal, vertex);
    let norms = norm(v1) * norm(v2);
    if norms == 0. || !norms.is_finite() {
        return None;
    }

    // Rounding can push the cosine just outside [-1, 1].
    let cos = (dot(v1, v2) / norms).clamp(-1., 1.);
    Some(Angle::new::<radian>(cos.acos()).get::<degree>())
}

/// Measure one joint. Does not substitute any default.
pub fn joint_angle(
    landmarks: &LandmarkSet,
    joint: Joint,
    min_visibility: f64,
) -> Result<f64, AngleError> {
    let [distal, vertex, proximal] = joint.anchors();
    let distal = resolve(landmarks, distal, min_visibility)?;
    let vertex = resolve(landmarks, vertex, min_visibility)?;
    let proximal = resolve(landmarks, proximal, min_visibility)?;

    angle_between(distal, vertex, proximal).ok_or(AngleError::Degenerate(joint))
}

fn resolve(
    landmarks: &LandmarkSet,
    anchor: Anchor,
    min_visibility: f64,
) -> Result<[f64; 3], AngleError> {
    match anchor {
        Anchor::Point(id) => Ok(landmarks.get(id, min_visibility)?.xyz()),
        Anchor::Midpoint(a, b) => {
            let a = landmarks.get(a, min_visibility)?.xyz();
            let b = landmarks.get(b, min_visibility)?.xyz();
            Ok(midpoint(a, b))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AngleSource {
    Measured,
    /// The default angle stands in, for the given reason.
    Fallback(AngleError),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleReading {
    pub degrees: f64,
    pub source: AngleSource,
}

impl AngleReading {
    pub fn measured(degrees: f64) -> Self {
        Self {
            degrees,
            source: AngleSource::Measured,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.source == AngleSource::Measured
    }
}

/// One reading for each of the nine joints.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleMap {
    readings: [AngleReading; 9],
}

impl AngleMap {
    /// Every joint measured at the same angle.
    pub fn uniform(degrees: f64) -> Self {
        Self {
            readings: [AngleReading::measured(degrees); 9],
        }
    }

    /// Replace one joint with a measured value.
    pub fn with(mut self, joint: Joint, degrees: f64) -> Self {
        self.readings[joint.slot()] = AngleReading::measured(degrees);
        self
    }

    pub fn degrees(&self, joint: Joint) -> f64 {
        self.readings[joint.slot()].degrees
    }

    pub fn reading(&self, joint: Joint) -> &AngleReading {
        &self.readings[joint.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, &AngleReading)> {
        Joint::ALL.into_iter().zip(self.readings.iter())
    }

    pub fn measured_count(&self) -> usize {
        self.readings.iter().filter(|r| r.is_measured()).count()
    }
}

impl Serialize for AngleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.readings.len()))?;
        for (joint, reading) in self.iter() {
            map.serialize_entry(joint.name(), &reading.degrees)?;
        }
        map.end()
    }
}

/// Compute all nine joint angles.
///
/// Joints that cannot be measured get `params.default_angle_deg`, with the
/// reason kept on the reading and logged.
pub fn compute_angles(landmarks: &LandmarkSet, params: &AnalysisParams) -> AngleMap {
    let readings = Joint::ALL.map(|joint| {
        match joint_angle(landmarks, joint, params.min_visibility) {
            Ok(degrees) => AngleReading::measured(degrees),
            Err(err) => {
                log::warn!(
                    "using {:.1} degrees for {}: {}",
                    params.default_angle_deg,
                    joint.name(),
                    err
                );
                AngleReading {
                    degrees: params.default_angle_deg,
                    source: AngleSource::Fallback(err),
                }
            }
        }
    });

    AngleMap { readings }
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [(a[0] + b[0]) / 2., (a[1] + b[1]) / 2., (a[2] + b[2]) / 2.]
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::landmarks::{LANDMARK_COUNT, Landmark};

    /// Front view of someone standing in a T-pose, y grows downward.
    pub(crate) fn t_pose() -> LandmarkSet {
        let mut points = vec![Landmark::new(0.5, 0.1, 0.); LANDMARK_COUNT];
        let mut set = |id: LandmarkId, x: f64, y: f64| points[id.index()] = Landmark::new(x, y, 0.);

        set(LandmarkId::Nose, 0.5, 0.1);
        set(LandmarkId::LeftShoulder, 0.6, 0.2);
        set(LandmarkId::RightShoulder, 0.4, 0.2);
        set(LandmarkId::LeftElbow, 0.75, 0.2);
        set(LandmarkId::RightElbow, 0.25, 0.2);
        set(LandmarkId::LeftWrist, 0.9, 0.2);
        set(LandmarkId::RightWrist, 0.1, 0.2);
        set(LandmarkId::LeftHip, 0.55, 0.5);
        set(LandmarkId::RightHip, 0.45, 0.5);
        set(LandmarkId::LeftKnee, 0.55, 0.7);
        set(LandmarkId::RightKnee, 0.45, 0.7);
        set(LandmarkId::LeftAnkle, 0.55, 0.9);
        set(LandmarkId::RightAnkle, 0.45, 0.9);

        LandmarkSet::new(points)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn right_angle() {
        let angle = angle_between([1., 0., 0.], [0., 0., 0.], [0., 1., 0.]).unwrap();
        assert!(close(angle, 90.));
    }

    #[test]
    fn straight_and_folded() {
        let straight = angle_between([-1., 0., 0.], [0., 0., 0.], [2., 0., 0.]).unwrap();
        let folded = angle_between([1., 0., 0.], [0., 0., 0.], [3., 0., 0.]).unwrap();
        assert!(close(straight, 180.));
        assert!(close(folded, 0.));
    }

    #[test]
    fn nearly_collinear_stays_in_range() {
        let angle = angle_between(
            [0.1 + 1e-17, 0.3, 0.],
            [0.2, 0.6, 0.],
            [0.3, 0.9 - 1e-17, 0.],
        )
        .unwrap();
        assert!(angle.is_finite());
        assert!((0. ..=180.).contains(&angle));
    }

    #[test]
    fn zero_length_limb_is_none() {
        assert_eq!(angle_between([0.5, 0.5, 0.], [0.5, 0.5, 0.], [1., 0., 0.]), None);
    }

    #[test]
    fn t_pose_angles() {
        let angles = compute_angles(&t_pose(), &AnalysisParams::default());

        assert_eq!(angles.measured_count(), 9);
        for joint in [Joint::LeftElbow, Joint::RightElbow, Joint::LeftKnee, Joint::RightKnee] {
            assert!(close(angles.degrees(joint), 180.), "{}", joint.name());
        }
        assert!(close(angles.degrees(Joint::Spine), 180.));
        for (_, reading) in angles.iter() {
            assert!((0. ..=180.).contains(&reading.degrees));
        }
    }

    #[test]
    fn missing_landmarks_fall_back_per_joint() {
        let mut points = t_pose().points().to_vec();
        points.truncate(LandmarkId::LeftKnee.index());
        let params = AnalysisParams::default();
        let angles = compute_angles(&LandmarkSet::new(points), &params);

        assert!(angles.reading(Joint::RightElbow).is_measured());
        assert_eq!(angles.degrees(Joint::LeftKnee), params.default_angle_deg);
        assert_eq!(
            angles.reading(Joint::RightKnee).source,
            AngleSource::Fallback(AngleError::Landmark(LandmarkFault::Missing(
                LandmarkId::RightKnee
            )))
        );
    }

    #[test]
    fn degenerate_limb_is_reported() {
        let mut points = t_pose().points().to_vec();
        points[LandmarkId::RightWrist.index()] = points[LandmarkId::RightElbow.index()];
        let angles = compute_angles(&LandmarkSet::new(points), &AnalysisParams::default());

        assert_eq!(
            angles.reading(Joint::RightElbow).source,
            AngleSource::Fallback(AngleError::Degenerate(Joint::RightElbow))
        );
        assert_eq!(angles.degrees(Joint::RightElbow), 90.);
    }

    #[test]
    fn empty_set_yields_full_neutral_map() {
        let angles = compute_angles(&LandmarkSet::new(Vec::new()), &AnalysisParams::default());

        assert_eq!(angles.measured_count(), 0);
        assert_eq!(angles.iter().count(), 9);
        assert!(angles.iter().all(|(_, r)| r.degrees == 90.));
    }

    #[test]
    fn serializes_by_joint_name() {
        let json = serde_json::to_value(AngleMap::uniform(90.).with(Joint::Spine, 45.)).unwrap();
        assert_eq!(json["spine"], 45.);
        assert_eq!(json["left_knee"], 90.);
        assert_eq!(json.as_object().unwrap().len(), 9);
    }
}
