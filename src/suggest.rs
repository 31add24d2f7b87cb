//! Rule based pose improvement suggestions.

use crate::angles::{AngleMap, Joint, compute_angles};
use crate::landmarks::LandmarkSet;
use crate::params::AnalysisParams;
use crate::symmetry::{SymmetryMap, compute_symmetry};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const NO_POSE: &str = "No pose detected";
pub const NO_SUGGESTIONS: &str = "Unable to generate pose suggestions";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Suggestion {
    /// Stable identifier, e.g. `shoulders_symmetry` or `spine`.
    pub key: String,
    /// Body area the suggestion is about.
    pub point: String,
    pub suggestion: String,
    pub reason: String,
}

impl Suggestion {
    fn new(
        key: impl Into<String>,
        point: impl Into<String>,
        suggestion: impl Into<String>,
        reason: String,
    ) -> Self {
        Self {
            key: key.into(),
            point: point.into(),
            suggestion: suggestion.into(),
            reason,
        }
    }
}

/// Evaluate every rule against the measurements.
///
/// Rules are independent and all of them run. The result is never empty: when
/// nothing triggers, a single `general` suggestion says the pose is fine.
pub fn suggest(symmetry: &SymmetryMap, angles: &AngleMap) -> Vec<Suggestion> {
    suggest_with(symmetry, angles, &AnalysisParams::default())
}

/// Like [`suggest`] with explicit thresholds.
///
/// Placeholder readings never trigger a rule: a pair scored with the neutral
/// fallback is skipped, and a joint rule only looks at measured joints.
pub fn suggest_with(
    symmetry: &SymmetryMap,
    angles: &AngleMap,
    params: &AnalysisParams,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let measured = |joint: Joint| {
        let reading = angles.reading(joint);
        reading.is_measured().then_some(reading.degrees)
    };

    for (pair, reading) in symmetry.iter() {
        if reading.fallback.is_none() && reading.score < params.symmetry_threshold {
            suggestions.push(Suggestion::new(
                format!("{}_symmetry", pair.name()),
                pair.name(),
                format!("Consider adjusting {} alignment for better balance.", pair.name()),
                format!(
                    "{} symmetry is {:.2}, below {:.2}",
                    pair.name(),
                    reading.score,
                    params.symmetry_threshold
                ),
            ));
        }
    }

    if let Some(spine) = measured(Joint::Spine) {
        if spine < params.spine_min_deg {
            suggestions.push(Suggestion::new(
                "spine",
                "spine",
                "Consider straightening your spine for better posture.",
                format!("spine angle is {spine:.1} degrees, below {:.1}", params.spine_min_deg),
            ));
        }
    }

    // Both knees have to be measured and bent.
    if let (Some(left_knee), Some(right_knee)) =
        (measured(Joint::LeftKnee), measured(Joint::RightKnee))
    {
        if left_knee < params.knee_bend_deg && right_knee < params.knee_bend_deg {
            suggestions.push(Suggestion::new(
                "knees",
                "knees",
                "Deep knee bend detected — ensure stable balance.",
                format!(
                    "both knees under {:.1} degrees (left {left_knee:.1}, right {right_knee:.1})",
                    params.knee_bend_deg
                ),
            ));
        }
    }

    let sharp_elbows: Vec<String> = [Joint::LeftElbow, Joint::RightElbow]
        .into_iter()
        .filter_map(|joint| {
            let degrees = measured(joint)?;
            (degrees < params.elbow_bend_deg).then(|| format!("{} {degrees:.1}", joint.name()))
        })
        .collect();
    if !sharp_elbows.is_empty() {
        suggestions.push(Suggestion::new(
            "elbows",
            "elbows",
            "Sharp elbow bend — check arm positioning.",
            format!(
                "under {:.1} degrees: {}",
                params.elbow_bend_deg,
                sharp_elbows.join(", ")
            ),
        ));
    }

    if suggestions.is_empty() {
        suggestions.push(Suggestion::new(
            "general",
            "overall",
            "Pose looks well balanced. Keep it up.",
            "no alignment or bend rule was triggered".to_string(),
        ));
    }

    suggestions
}

/// Suggestions for a detection, or a single error message.
///
/// Serializes as `{"error": "..."}` or as a map of suggestion key to text.
#[derive(Clone, Debug, PartialEq)]
pub enum SuggestionOutcome {
    Error(String),
    Suggestions(Vec<Suggestion>),
}

impl SuggestionOutcome {
    pub fn error(&self) -> Option<&str> {
        match self {
            SuggestionOutcome::Error(message) => Some(message.as_str()),
            SuggestionOutcome::Suggestions(_) => None,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            SuggestionOutcome::Error(_) => &[],
            SuggestionOutcome::Suggestions(suggestions) => suggestions.as_slice(),
        }
    }
}

impl Serialize for SuggestionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SuggestionOutcome::Error(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
            SuggestionOutcome::Suggestions(suggestions) => {
                let mut map = serializer.serialize_map(Some(suggestions.len()))?;
                for suggestion in suggestions {
                    map.serialize_entry(&suggestion.key, &suggestion.suggestion)?;
                }
                map.end()
            }
        }
    }
}

/// Analyze a detection end to end and produce suggestions.
///
/// `None` means the detector found nobody. A detection where not a single
/// joint could be measured is reported as an error too, rather than
/// producing advice about placeholder angles.
pub fn suggest_for(
    landmarks: Option<&LandmarkSet>,
    params: &AnalysisParams,
) -> SuggestionOutcome {
    let Some(landmarks) = landmarks else {
        return SuggestionOutcome::Error(NO_POSE.to_string());
    };

    let angles = compute_angles(landmarks, params);
    if angles.measured_count() == 0 {
        log::warn!("no joint angle could be measured from {} landmarks", landmarks.len());
        return SuggestionOutcome::Error(NO_SUGGESTIONS.to_string());
    }

    let symmetry = compute_symmetry(landmarks, params);
    SuggestionOutcome::Suggestions(suggest_with(&symmetry, &angles, params))
}
