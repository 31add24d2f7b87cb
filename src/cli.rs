use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Commands {
    /// Describe the pose in one or more landmark files and suggest improvements.
    Analyze {
        /// JSON landmark files written by the pose detector.
        #[arg(required = true)]
        landmarks: Vec<PathBuf>,

        /// Optional path to TOML formatted AnalysisParams.
        ///
        /// If not provided, the default AnalysisParams is used.
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// File path for the report. Printed to stdout if not provided.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format for the report.
        ///
        /// If not provided, the format is inferred from the output file extension.
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,
    },

    /// Draw the detected skeleton as an image.
    Render {
        /// JSON landmark file written by the pose detector.
        landmarks: PathBuf,

        /// Image path, the format follows the extension.
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 512)]
        width: u32,

        #[arg(long, default_value_t = 512)]
        height: u32,
    },

    /// Turn a vision model's pose critique into structured feedback.
    Feedback {
        /// Text file holding the model's raw answer.
        response: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[non_exhaustive]
pub enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone()
    }
}
