//! `imgconv convert`

use clap::Args;
use tabled::Tabled;

use imgconv_core::config::AppConfig;
use imgconv_core::result::AppResult;
use plugin_image_converter::plugin::CONVERT_COMMAND;
use plugin_image_converter::{
    CommandOutput, ConversionOutcome, ConversionReport, ImageConversion, NoopProgress, Progress,
    ProgressObserver,
};

use super::{Cli, Session, unexpected};
use crate::output::{self, OutputFormat};

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Print progress to stderr after every converted image
    #[arg(long)]
    pub progress: bool,
}

/// One row of the per-image result table.
#[derive(Debug, Tabled)]
struct ImageRow {
    #[tabled(rename = "Image")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Context")]
    context: String,
    #[tabled(rename = "Faces")]
    faces: usize,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&ImageConversion> for ImageRow {
    fn from(image: &ImageConversion) -> Self {
        Self {
            name: image.display_name(),
            size: format!("{} x {}", image.width, image.height),
            context: image.context.clone(),
            faces: image.faces,
            result: match (&image.error, image.success) {
                (_, true) => "converted".to_string(),
                (Some(error), false) => format!("failed: {error}"),
                (None, false) => "failed".to_string(),
            },
        }
    }
}

/// Convert every image in the scene.
pub fn execute(args: &ConvertArgs, cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let mut session = Session::open(cli, config)?;

    let mut report_progress = |p: Progress| eprintln!("{p}");
    let mut quiet = NoopProgress;
    let observer: &mut dyn ProgressObserver = if args.progress {
        &mut report_progress
    } else {
        &mut quiet
    };

    let report = match session.run(CONVERT_COMMAND, observer, cli.format)? {
        CommandOutput::Converted(report) => report,
        other => return Err(unexpected(&other)),
    };

    match cli.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => print_table(&report, &session),
    }
    Ok(())
}

fn print_table(report: &ConversionReport, session: &Session) {
    if report.outcome == ConversionOutcome::Converted {
        let rows: Vec<ImageRow> = report.images.iter().map(ImageRow::from).collect();
        output::print_list(&rows, report, OutputFormat::Table);
        for failure in &report.failed_containers {
            output::print_warning(&format!(
                "Skipped {} in {}: {}",
                failure.label, failure.context, failure.error
            ));
        }
    }
    session.print_messages(OutputFormat::Table);
    if report.outcome == ConversionOutcome::Converted {
        output::print_success(&format!(
            "{} of {} image(s) converted into {} face(s) in {} ms",
            report.converted,
            report.total_images,
            report.faces_created,
            report.duration_ms()
        ));
    }
}
