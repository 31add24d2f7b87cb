use crate::angles::{AngleMap, AngleSource, compute_angles};
use crate::describe::{PoseDescription, describe};
use crate::landmarks::LandmarkSet;
use crate::params::AnalysisParams;
use crate::suggest::{SuggestionOutcome, suggest_for};
use crate::symmetry::{SymmetryMap, compute_symmetry};
use chrono::prelude::*;
use std::fmt;
use std::path::PathBuf;

/// Everything the analysis produced for one detection.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PoseReport {
    pub source: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
    /// `None` when the detector found no pose.
    pub angles: Option<AngleMap>,
    pub symmetry: Option<SymmetryMap>,
    pub descriptions: PoseDescription,
    pub suggestions: SuggestionOutcome,
}

impl PoseReport {
    pub fn new(
        source: Option<PathBuf>,
        landmarks: Option<&LandmarkSet>,
        params: &AnalysisParams,
    ) -> Self {
        let suggestions = suggest_for(landmarks, params);

        let (angles, symmetry, descriptions) = match landmarks {
            Some(landmarks) => {
                let angles = compute_angles(landmarks, params);
                let symmetry = compute_symmetry(landmarks, params);
                let descriptions = describe(&angles);
                (Some(angles), Some(symmetry), descriptions)
            }
            None => (None, None, PoseDescription::fallback()),
        };

        Self {
            source,
            generated_at: Utc::now(),
            angles,
            symmetry,
            descriptions,
            suggestions,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Human readable report, one section per line group.
impl fmt::Display for PoseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            writeln!(f, "# {}", source.display())?;
        }

        writeln!(f, "Pose features:")?;
        for (key, phrase) in self.descriptions.entries() {
            writeln!(f, "- {}: {}", label(&key), phrase)?;
        }

        if let Some(angles) = &self.angles {
            let fallbacks: Vec<String> = angles
                .iter()
                .filter_map(|(joint, reading)| match reading.source {
                    AngleSource::Measured => None,
                    AngleSource::Fallback(err) => Some(format!("{} ({})", joint.name(), err)),
                })
                .collect();
            if !fallbacks.is_empty() {
                writeln!(f, "Not measured: {}", fallbacks.join(", "))?;
            }
        }

        if let Some(symmetry) = &self.symmetry {
            writeln!(f, "Symmetry:")?;
            for (pair, reading) in symmetry.iter() {
                writeln!(f, "- {}: {:.2}", label(pair.name()), reading.score)?;
            }
        }

        match &self.suggestions {
            SuggestionOutcome::Error(message) => writeln!(f, "Error: {message}"),
            SuggestionOutcome::Suggestions(suggestions) => {
                writeln!(f, "Suggestions:")?;
                for suggestion in suggestions {
                    writeln!(
                        f,
                        "- [{}] {} ({})",
                        label(&suggestion.point),
                        suggestion.suggestion,
                        suggestion.reason
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// `left_knee_desc` becomes `Left Knee`.
pub fn label(key: &str) -> String {
    key.trim_end_matches("_desc")
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::tests::t_pose;

    #[test]
    fn labels_are_title_case() {
        assert_eq!(label("left_knee_desc"), "Left Knee");
        assert_eq!(label("spine_desc"), "Spine");
        assert_eq!(label("shoulders"), "Shoulders");
    }

    #[test]
    fn missing_pose_report() {
        let report = PoseReport::new(None, None, &AnalysisParams::default());

        assert!(report.angles.is_none());
        assert_eq!(report.descriptions.len(), 9);
        assert_eq!(report.suggestions.error(), Some("No pose detected"));
        assert!(report.to_string().contains("Error: No pose detected"));
    }

    #[test]
    fn t_pose_report() {
        let report = PoseReport::new(
            Some(PathBuf::from("t_pose.json")),
            Some(&t_pose()),
            &AnalysisParams::default(),
        );
        let text = report.to_string();

        assert!(text.starts_with("# t_pose.json"));
        assert!(text.contains("- Left Elbow: straight"));
        assert!(text.contains("- Right Knee: straight"));
        assert!(!text.contains("Not measured"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["descriptions"]["left_knee_desc"], "straight");
        assert!(json["suggestions"]["general"].is_string());
        assert_eq!(json["angles"].as_object().unwrap().len(), 9);
    }
}
