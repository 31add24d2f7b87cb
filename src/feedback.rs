//! Structured critique returned by a vision-language model.
//!
//! The model is asked to answer with a JSON object of the shape
//! `{"pose_analysis": {"current_pose": .., "strong_points": [..], "suggestions": [..]}}`
//! but usually wraps it in prose or a code fence, so the object is cut out of
//! the surrounding text before parsing.

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const ANALYSIS_FAILED: &str = "The pose could not be analyzed.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub point: String,
    pub suggestion: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseFeedback {
    pub current_pose: String,
    #[serde(default)]
    pub strong_points: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<FeedbackItem>,
}

#[derive(Deserialize)]
struct Envelope {
    pose_analysis: PoseFeedback,
}

impl PoseFeedback {
    /// Shown when the model's answer cannot be used.
    pub fn unavailable() -> Self {
        Self {
            current_pose: ANALYSIS_FAILED.to_string(),
            strong_points: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl fmt::Display for PoseFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current pose: {}", self.current_pose)?;
        if !self.strong_points.is_empty() {
            writeln!(f, "Strong points:")?;
            for point in &self.strong_points {
                writeln!(f, "- {point}")?;
            }
        }
        if !self.suggestions.is_empty() {
            writeln!(f, "Suggestions:")?;
            for item in &self.suggestions {
                writeln!(f, "- {}: {} ({})", item.point, item.suggestion, item.reason)?;
            }
        }
        Ok(())
    }
}

/// Cut the outermost `{ .. }` span out of `text`.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub fn parse(text: &str) -> Result<PoseFeedback> {
    let json = json_span(text).ok_or_else(|| anyhow!("no JSON object in model response"))?;
    let envelope: Envelope =
        serde_json::from_str(json).context("model response is not a pose analysis")?;

    Ok(envelope.pose_analysis)
}

/// Parse `text`, or fall back to [`PoseFeedback::unavailable`] and log why.
pub fn parse_or_unavailable(text: &str) -> PoseFeedback {
    match parse(text) {
        Ok(feedback) => feedback,
        Err(err) => {
            log::error!("error analyzing pose for improvements: {err:#}");
            PoseFeedback::unavailable()
        }
    }
}

pub fn load(path: &Path) -> Result<PoseFeedback> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model response {}", path.display()))?;

    Ok(parse_or_unavailable(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"Here is my analysis:
```json
{
    "pose_analysis": {
        "current_pose": "Standing with arms raised",
        "strong_points": ["Straight back", "Even weight"],
        "suggestions": [
            {
                "point": "Shoulders",
                "suggestion": "Relax the shoulders",
                "reason": "Raised shoulders look tense"
            }
        ]
    }
}
```
Good luck!"#;

    #[test]
    fn extracts_json_from_prose() {
        let feedback = parse(RESPONSE).unwrap();

        assert_eq!(feedback.current_pose, "Standing with arms raised");
        assert_eq!(feedback.strong_points.len(), 2);
        assert_eq!(feedback.suggestions[0].point, "Shoulders");
        assert!(feedback.to_string().contains("- Shoulders: Relax the shoulders"));
    }

    #[test]
    fn empty_sections_are_left_out() {
        let text = PoseFeedback::unavailable().to_string();
        assert_eq!(text, format!("Current pose: {ANALYSIS_FAILED}\n"));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let feedback = parse(r#"{"pose_analysis": {"current_pose": "Sitting"}}"#).unwrap();
        assert!(feedback.strong_points.is_empty());
        assert!(feedback.suggestions.is_empty());
    }

    #[test]
    fn unusable_answers_fall_back() {
        for text in ["no json here", "} backwards {", r#"{"other": 1}"#, "{ not json }"] {
            assert!(parse(text).is_err(), "{text}");
            assert_eq!(parse_or_unavailable(text), PoseFeedback::unavailable());
        }
    }
}
