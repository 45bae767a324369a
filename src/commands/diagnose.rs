//! `imgconv diagnose`

use imgconv_core::config::AppConfig;
use imgconv_core::result::AppResult;
use plugin_image_converter::plugin::DIAGNOSE_COMMAND;
use plugin_image_converter::{CommandOutput, NoopProgress};

use super::{Cli, Session, unexpected};
use crate::output::{self, OutputFormat};

/// Print where images and textured faces sit in the hierarchy.
pub fn execute(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let mut session = Session::open(cli, config)?;
    let report = match session.run(DIAGNOSE_COMMAND, &mut NoopProgress, cli.format)? {
        CommandOutput::Diagnosed(report) => report,
        other => return Err(unexpected(&other)),
    };

    match cli.format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            for line in &report.trace {
                println!("{line}");
            }
            output::print_kv("Images", &report.images.to_string());
            output::print_kv(
                "Faces with textures",
                &report.faces_with_textures.to_string(),
            );
            output::print_kv("Groups", &report.groups.to_string());
            output::print_kv("Component instances", &report.components.to_string());
            for skipped in &report.skipped_containers {
                output::print_warning(&format!(
                    "Skipped {} in {}: {}",
                    skipped.label, skipped.context, skipped.error
                ));
            }
            session.print_messages(cli.format);
        }
    }
    Ok(())
}
