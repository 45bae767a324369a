//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use imgconv_core::config::AppConfig;
use imgconv_core::result::AppResult;
use plugin_image_converter::ConverterConfig;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    #[serde(flatten)]
    app: &'a AppConfig,
    image_converter: ConverterConfig,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let converter = ConverterConfig::load(config_path)?;
            match format {
                OutputFormat::Json => output::print_json(&EffectiveConfig {
                    app: config,
                    image_converter: converter,
                }),
                OutputFormat::Table => {
                    println!("Configuration '{config_path}'");
                    output::print_kv("logging.level", &config.logging.level);
                    output::print_kv("logging.format", &config.logging.format);
                    output::print_kv("host.name", &config.host.name);
                    output::print_kv("host.version", &config.host.version.to_string());
                    output::print_kv("operation_name", &converter.operation_name);
                    output::print_kv(
                        "min_host_version",
                        &converter.min_host_version.to_string(),
                    );
                    output::print_kv("max_depth", &converter.max_depth.to_string());
                    output::print_kv("status_updates", &converter.status_updates.to_string());
                    output::print_kv("root_label", &converter.root_label);
                }
            }
        }
    }
    Ok(())
}
