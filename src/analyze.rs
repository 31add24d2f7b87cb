use crate::cli::ReportFormat;
use crate::landmarks;
use crate::params::{self, AnalysisParams};
use crate::report::PoseReport;
use anyhow::Context;
use anyhow::Result;
use rayon::prelude::*;
use std::{
    ffi::OsStr,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

pub fn run(
    inputs: &[PathBuf],
    params: &Option<PathBuf>,
    output: &Option<PathBuf>,
    format: &Option<ReportFormat>,
) -> Result<()> {
    let params = match params {
        Some(path) => params::load(path)?,
        None => AnalysisParams::default(),
    };

    let reports = analyze_files(inputs, &params)?;

    let format = format
        .or_else(|| {
            match output
                .as_ref()
                .and_then(|path| path.extension())
                .map(|os_str: &OsStr| os_str.to_str())
            {
                Some(Some("json")) => Some(ReportFormat::Json),
                _ => None,
            }
        })
        .unwrap_or(ReportFormat::Text);

    let rendered = render(&reports, format)?;

    match output {
        Some(path) => {
            let mut file = BufWriter::new(
                File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
            );
            file.write_all(rendered.as_bytes())?;
            file.flush()?;
            log::info!("wrote {} report(s) to {}", reports.len(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Analyze each landmark file independently, in parallel.
///
/// Reports come back in input order. A file that cannot be read or parsed
/// fails the whole batch.
pub fn analyze_files(inputs: &[PathBuf], params: &AnalysisParams) -> Result<Vec<PoseReport>> {
    inputs
        .par_iter()
        .map(|path| -> Result<PoseReport> {
            let landmarks = landmarks::load(path)?;
            if landmarks.is_none() {
                log::info!("{}: no pose detected", path.display());
            }
            Ok(PoseReport::new(Some(path.clone()), landmarks.as_ref(), params))
        })
        .collect()
}

fn render(reports: &[PoseReport], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(reports
            .iter()
            .map(PoseReport::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        ReportFormat::Json => {
            let mut json = match reports {
                [report] => serde_json::to_string_pretty(report)?,
                _ => serde_json::to_string_pretty(reports)?,
            };
            json.push('\n');
            Ok(json)
        }
    }
}
