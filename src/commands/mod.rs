//! CLI command definitions and dispatch.

pub mod config;
pub mod convert;
pub mod count;
pub mod diagnose;
pub mod menu;

use clap::{Parser, Subcommand};

use imgconv_core::config::AppConfig;
use imgconv_core::error::{AppError, ErrorKind};
use imgconv_core::result::AppResult;
use imgconv_host::{MemoryModel, SceneDocument};
use plugin_image_converter::{
    CommandOutput, CommandRegistry, ConverterConfig, ImageConverterPlugin, ProgressObserver,
};

use crate::output::{self, OutputFormat};

/// Convert raster images in a CAD scene into textured faces
#[derive(Debug, Parser)]
#[command(name = "imgconv", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/imgconv.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// JSON scene file to load into the host
    #[arg(short, long, global = true)]
    pub scene: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count image entities in the scene
    Count,
    /// Convert every image in the scene into faces
    Convert(convert::ConvertArgs),
    /// Trace where images and textured faces sit in the hierarchy
    Diagnose,
    /// List the commands the plugin registers
    Commands,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Count => count::execute(self, config),
            Commands::Convert(args) => convert::execute(args, self, config),
            Commands::Diagnose => diagnose::execute(self, config),
            Commands::Commands => menu::execute(self, config),
            Commands::Config(args) => config::execute(args, &self.config, config, self.format),
        }
    }

    fn scene_path(&self) -> AppResult<&str> {
        self.scene
            .as_deref()
            .ok_or_else(|| AppError::validation("A scene file is required (--scene <FILE>)"))
    }
}

/// A loaded scene with the plugin initialized and its commands registered.
pub struct Session {
    pub model: MemoryModel,
    pub plugin: ImageConverterPlugin,
    pub registry: CommandRegistry,
}

impl Session {
    /// Load the scene named by `--scene` and initialize the plugin on it.
    pub fn open(cli: &Cli, config: &AppConfig) -> AppResult<Self> {
        let path = cli.scene_path()?;
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::NotFound,
                format!("Failed to read scene '{path}': {e}"),
                e,
            )
        })?;
        let mut model = SceneDocument::from_json(&text)?.to_model(&config.host)?;
        tracing::info!(
            scene = %path,
            host = %model_name(&model),
            "Scene loaded"
        );

        let converter_config = ConverterConfig::load(&cli.config)?;
        let mut plugin = ImageConverterPlugin::new(converter_config);
        if let Err(e) = plugin.initialize(&mut model) {
            print_messages(&model, cli.format);
            return Err(e.into());
        }

        let mut registry = CommandRegistry::new();
        plugin.register_commands(&mut registry)?;
        Ok(Self {
            model,
            plugin,
            registry,
        })
    }

    /// Run a registered command. On failure the host's messages are shown
    /// before the error is returned.
    pub fn run(
        &mut self,
        id: &str,
        observer: &mut dyn ProgressObserver,
        format: OutputFormat,
    ) -> AppResult<CommandOutput> {
        match self.registry.run(id, &mut self.model, observer) {
            Ok(output) => Ok(output),
            Err(e) => {
                print_messages(&self.model, format);
                Err(e.into())
            }
        }
    }

    /// Show the host's messages.
    pub fn print_messages(&self, format: OutputFormat) {
        print_messages(&self.model, format);
    }
}

/// A command answered with another command's output.
fn unexpected(output: &CommandOutput) -> AppError {
    AppError::internal(format!("Unexpected command output: {output:?}"))
}

fn model_name(model: &MemoryModel) -> String {
    use imgconv_core::SceneHost;
    format!("{} {}", model.name(), model.version())
}

/// Message boxes the host showed, in table mode only.
fn print_messages(model: &MemoryModel, format: OutputFormat) {
    if format == OutputFormat::Table {
        for message in model.messages() {
            output::print_kv("Message", message);
        }
    }
}
