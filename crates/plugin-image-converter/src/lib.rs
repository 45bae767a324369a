//! # Plugin Image Converter
//!
//! Converts raster image entities of a host CAD model into textured faces.
//!
//! The [`SceneWalker`] does a depth-first walk of the scene graph: at every
//! container it snapshots the children, explodes the images it owns inside
//! that container's edit context, then descends into child groups and
//! component instances. Failures of single images or containers are
//! recorded and skipped; anything that leaves the walker and the host
//! disagreeing about the edit context aborts the walk.
//!
//! [`ImageConverter`] wraps the walk in an undoable host operation and
//! reports to the user. [`ImageConverterPlugin`] gates on the host version
//! and registers the menu commands.

pub mod commands;
pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod metrics;
pub mod models;
pub mod plugin;
pub mod progress;
pub mod walker;

pub use commands::{CommandHandler, CommandOutput, CommandRegistry};
pub use config::ConverterConfig;
pub use context::ContextScope;
pub use converter::ImageConverter;
pub use error::ConversionError;
pub use metrics::{MetricsSnapshot, WalkMetrics};
pub use models::{
    ContainerFailure, ConversionOutcome, ConversionReport, DiagnosticReport, ImageConversion,
    WalkOutcome, WalkState,
};
pub use plugin::{ImageConverterPlugin, PluginInfo};
pub use progress::{NoopProgress, Progress, ProgressObserver, RecordingProgress};
pub use walker::SceneWalker;
