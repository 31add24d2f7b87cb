//! Pose analysis for detected body landmarks.
//!
//! A pose detector produces 33 normalized landmarks per person. From those
//! this crate derives nine joint angles and four left/right symmetry scores,
//! turns them into short phrases for image prompts, and suggests how the pose
//! could be improved. Analysis never fails: unusable landmarks degrade to
//! neutral values so a caller always has something to show.

pub mod analyze;
pub mod angles;
pub mod cli;
pub mod describe;
pub mod feedback;
pub mod landmarks;
pub mod params;
pub mod render;
pub mod report;
pub mod suggest;
pub mod symmetry;

pub use angles::{AngleMap, Joint, compute_angles};
pub use describe::{PoseDescription, describe};
pub use landmarks::{Landmark, LandmarkId, LandmarkSet};
pub use params::AnalysisParams;
pub use suggest::{Suggestion, SuggestionOutcome, suggest, suggest_for};
pub use symmetry::{BodyPair, SymmetryMap, compute_symmetry};
