//! Left/right balance of paired body parts.

use crate::angles::{midpoint, norm, sub};
use crate::landmarks::{LandmarkFault, LandmarkId, LandmarkSet};
use crate::params::AnalysisParams;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyPair {
    Shoulders,
    Elbows,
    Hips,
    Knees,
}

impl BodyPair {
    pub const ALL: [BodyPair; 4] = [
        BodyPair::Shoulders,
        BodyPair::Elbows,
        BodyPair::Hips,
        BodyPair::Knees,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BodyPair::Shoulders => "shoulders",
            BodyPair::Elbows => "elbows",
            BodyPair::Hips => "hips",
            BodyPair::Knees => "knees",
        }
    }

    /// (left, right) landmarks.
    pub fn landmarks(self) -> (LandmarkId, LandmarkId) {
        match self {
            BodyPair::Shoulders => (LandmarkId::LeftShoulder, LandmarkId::RightShoulder),
            BodyPair::Elbows => (LandmarkId::LeftElbow, LandmarkId::RightElbow),
            BodyPair::Hips => (LandmarkId::LeftHip, LandmarkId::RightHip),
            BodyPair::Knees => (LandmarkId::LeftKnee, LandmarkId::RightKnee),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Balance of `left` and `right` about `center`, in [0, 1].
///
/// 1.0 means both points are equally far from the centre. Two points sitting
/// on the centre also score 1.0.
pub fn symmetry_score(left: [f64; 3], right: [f64; 3], center: [f64; 3]) -> f64 {
    let d_left = norm(sub(left, center));
    let d_right = norm(sub(right, center));
    let d_max = d_left.max(d_right);
    if d_max == 0. {
        return 1.;
    }

    1. - (d_right - d_left).abs() / d_max
}

/// Centre of the torso: the mean of both shoulders and both hips.
pub fn torso_center(
    landmarks: &LandmarkSet,
    min_visibility: f64,
) -> Result<[f64; 3], LandmarkFault> {
    let shoulders = midpoint(
        landmarks.get(LandmarkId::LeftShoulder, min_visibility)?.xyz(),
        landmarks.get(LandmarkId::RightShoulder, min_visibility)?.xyz(),
    );
    let hips = midpoint(
        landmarks.get(LandmarkId::LeftHip, min_visibility)?.xyz(),
        landmarks.get(LandmarkId::RightHip, min_visibility)?.xyz(),
    );

    Ok(midpoint(shoulders, hips))
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SymmetryReading {
    pub score: f64,
    /// Why the neutral score stands in, if it does.
    pub fallback: Option<LandmarkFault>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryMap {
    readings: [SymmetryReading; 4],
}

impl SymmetryMap {
    pub fn uniform(score: f64) -> Self {
        Self {
            readings: [SymmetryReading {
                score,
                fallback: None,
            }; 4],
        }
    }

    pub fn with(mut self, pair: BodyPair, score: f64) -> Self {
        self.readings[pair.slot()] = SymmetryReading {
            score,
            fallback: None,
        };
        self
    }

    pub fn score(&self, pair: BodyPair) -> f64 {
        self.readings[pair.slot()].score
    }

    pub fn reading(&self, pair: BodyPair) -> &SymmetryReading {
        &self.readings[pair.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPair, &SymmetryReading)> {
        BodyPair::ALL.into_iter().zip(self.readings.iter())
    }
}

impl Serialize for SymmetryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.readings.len()))?;
        for (pair, reading) in self.iter() {
            map.serialize_entry(pair.name(), &reading.score)?;
        }
        map.end()
    }
}

/// Score every body pair against the torso centre.
///
/// Pairs that cannot be scored get `params.neutral_symmetry`.
pub fn compute_symmetry(landmarks: &LandmarkSet, params: &AnalysisParams) -> SymmetryMap {
    let min_visibility = params.min_visibility;
    let center = torso_center(landmarks, min_visibility);

    let readings = BodyPair::ALL.map(|pair| {
        let (left, right) = pair.landmarks();
        let scored = center.and_then(|center| {
            let left = landmarks.get(left, min_visibility)?.xyz();
            let right = landmarks.get(right, min_visibility)?.xyz();
            Ok(symmetry_score(left, right, center))
        });

        match scored {
            Ok(score) => SymmetryReading {
                score,
                fallback: None,
            },
            Err(fault) => {
                log::warn!(
                    "using symmetry {:.2} for {}: {}",
                    params.neutral_symmetry,
                    pair.name(),
                    fault
                );
                SymmetryReading {
                    score: params.neutral_symmetry,
                    fallback: Some(fault),
                }
            }
        }
    });

    SymmetryMap { readings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::tests::t_pose;
    use crate::landmarks::Landmark;

    #[test]
    fn coincident_points_on_center_score_one() {
        let p = [0.3, 0.4, 0.];
        let score = symmetry_score(p, p, p);
        assert_eq!(score, 1.);
        assert!(!score.is_nan());
    }

    #[test]
    fn mirrored_points_score_one() {
        let score = symmetry_score([0.4, 0.2, 0.], [0.6, 0.2, 0.], [0.5, 0.5, 0.]);
        assert!((score - 1.).abs() < 1e-9);
    }

    #[test]
    fn uneven_distances_lower_the_score() {
        // 0.1 vs 0.2 away from the centre.
        let score = symmetry_score([0.4, 0.5, 0.], [0.7, 0.5, 0.], [0.5, 0.5, 0.]);
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn t_pose_is_balanced() {
        let symmetry = compute_symmetry(&t_pose(), &AnalysisParams::default());
        for (pair, reading) in symmetry.iter() {
            assert!(reading.fallback.is_none(), "{}", pair.name());
            assert!((reading.score - 1.).abs() < 1e-9, "{}", pair.name());
        }
    }

    #[test]
    fn raised_elbow_is_unbalanced() {
        let mut points = t_pose().points().to_vec();
        points[LandmarkId::RightElbow.index()] = Landmark::new(0.45, 0.3, 0.);
        let symmetry = compute_symmetry(&LandmarkSet::new(points), &AnalysisParams::default());

        assert!(symmetry.score(BodyPair::Elbows) < 0.85);
        assert!((symmetry.score(BodyPair::Knees) - 1.).abs() < 1e-9);
    }

    #[test]
    fn missing_torso_falls_back_to_neutral() {
        let symmetry = compute_symmetry(&LandmarkSet::new(Vec::new()), &AnalysisParams::default());
        for (_, reading) in symmetry.iter() {
            assert_eq!(reading.score, 1.);
            assert_eq!(
                reading.fallback,
                Some(LandmarkFault::Missing(LandmarkId::LeftShoulder))
            );
        }
    }
}
