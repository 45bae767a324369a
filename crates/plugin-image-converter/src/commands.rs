//! Command registry. Plugins register menu commands by id; the host menu
//! lists them in registration order.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use imgconv_core::traits::host::SceneHost;

use crate::error::ConversionError;
use crate::models::{ConversionReport, DiagnosticReport};
use crate::progress::ProgressObserver;

/// A menu command.
pub trait CommandHandler: std::fmt::Debug {
    /// Stable id, unique within a registry.
    fn id(&self) -> &str;

    /// Menu label.
    fn label(&self) -> &str;

    /// Whether the command also appears in the context menu.
    fn in_context_menu(&self) -> bool {
        false
    }

    /// Run against the host.
    fn run(
        &self,
        host: &mut dyn SceneHost,
        observer: &mut dyn ProgressObserver,
    ) -> Result<CommandOutput, ConversionError>;
}

/// What a command produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandOutput {
    Converted(ConversionReport),
    Counted { images: usize },
    Diagnosed(DiagnosticReport),
}

#[derive(Debug)]
struct CommandEntry {
    handler: Arc<dyn CommandHandler>,
    plugin_id: String,
}

/// Registered commands, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Returns `false`, leaving the registry unchanged,
    /// if a command with the same id is already registered.
    pub fn register(&mut self, plugin_id: &str, handler: Arc<dyn CommandHandler>) -> bool {
        if self.get(handler.id()).is_some() {
            debug!(
                plugin_id = %plugin_id,
                command = %handler.id(),
                "Command already registered"
            );
            return false;
        }
        info!(
            plugin_id = %plugin_id,
            command = %handler.id(),
            label = %handler.label(),
            "Registered command"
        );
        self.entries.push(CommandEntry {
            handler,
            plugin_id: plugin_id.to_string(),
        });
        true
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.entries
            .iter()
            .find(|e| e.handler.id() == id)
            .map(|e| &e.handler)
    }

    /// Menu labels in registration order.
    pub fn menu(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.handler.label()).collect()
    }

    /// Context menu labels in registration order.
    pub fn context_menu(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.handler.in_context_menu())
            .map(|e| e.handler.label())
            .collect()
    }

    /// Registered commands as (plugin id, handler).
    pub fn commands(&self) -> impl Iterator<Item = (&str, &Arc<dyn CommandHandler>)> {
        self.entries
            .iter()
            .map(|e| (e.plugin_id.as_str(), &e.handler))
    }

    /// Run the command registered as `id`.
    pub fn run(
        &self,
        id: &str,
        host: &mut dyn SceneHost,
        observer: &mut dyn ProgressObserver,
    ) -> Result<CommandOutput, ConversionError> {
        let handler = self.get(id).ok_or_else(|| ConversionError::UnknownCommand {
            id: id.to_string(),
        })?;
        debug!(command = %id, "Running command");
        handler.run(host, observer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
