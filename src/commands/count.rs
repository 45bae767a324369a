//! `imgconv count`

use serde::Serialize;

use imgconv_core::config::AppConfig;
use imgconv_core::result::AppResult;
use plugin_image_converter::plugin::COUNT_COMMAND;
use plugin_image_converter::{CommandOutput, NoopProgress};

use super::{Cli, Session, unexpected};
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct CountResult<'a> {
    scene: &'a str,
    images: usize,
}

/// Count images and report the total.
pub fn execute(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let mut session = Session::open(cli, config)?;
    let result = session.run(COUNT_COMMAND, &mut NoopProgress, cli.format)?;
    let images = match result {
        CommandOutput::Counted { images } => images,
        other => return Err(unexpected(&other)),
    };

    match cli.format {
        OutputFormat::Json => output::print_json(&CountResult {
            scene: cli.scene.as_deref().unwrap_or_default(),
            images,
        }),
        OutputFormat::Table => session.print_messages(cli.format),
    }
    Ok(())
}
