use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use pose_kit::cli::Cli;
use pose_kit::cli::Commands;
use pose_kit::cli::ReportFormat;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command() {
        Commands::Analyze {
            landmarks,
            params,
            output,
            format,
        } => pose_kit::analyze::run(landmarks, params, output, format),
        Commands::Render {
            landmarks,
            output,
            width,
            height,
        } => pose_kit::render::run(landmarks, output, *width, *height),
        Commands::Feedback { response, format } => {
            let feedback = pose_kit::feedback::load(response)?;
            match format {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&feedback)?),
                _ => print!("{feedback}"),
            }
            Ok(())
        }
        _ => bail!("this command has not been implemented!"),
    }
}
