use anyhow::Context;
use anyhow::Result;
use std::{io::Read, path::Path};

/// Tunables for pose analysis, read from TOML.
///
/// Any field left out of the file keeps its default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Angle substituted for a joint that could not be measured.
    pub default_angle_deg: f64,
    /// Symmetry score substituted for a pair that could not be measured.
    pub neutral_symmetry: f64,
    /// Landmarks less confident than this are treated as not detected.
    pub min_visibility: f64,
    pub symmetry_threshold: f64,
    pub spine_min_deg: f64,
    pub knee_bend_deg: f64,
    pub elbow_bend_deg: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            default_angle_deg: 90.,
            neutral_symmetry: 1.,
            min_visibility: 0.,
            symmetry_threshold: 0.85,
            spine_min_deg: 70.,
            knee_bend_deg: 160.,
            elbow_bend_deg: 90.,
        }
    }
}

pub fn parse(toml: &str) -> Result<AnalysisParams> {
    Ok(toml::from_str(toml)?)
}

pub fn load(path: &Path) -> Result<AnalysisParams> {
    let mut buffer = String::new();
    std::fs::File::open(path)
        .with_context(|| format!("failed to open params {}", path.display()))?
        .read_to_string(&mut buffer)?;

    parse(&buffer).with_context(|| format!("invalid params in {}", path.display()))
}
