//! Unified error type for the image converter plugin.
//!
//! Host, edit-context, traversal, and plugin errors are consolidated into a
//! single `ConversionError` enum that maps cleanly to
//! `imgconv_core::error::AppError`.

use imgconv_core::error::AppError;
use imgconv_core::types::id::EntityId;
use imgconv_core::types::path::ContextPath;
use thiserror::Error;

/// Unified error type for all image conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- Host errors ---
    /// A host call failed.
    #[error("Host error: {0}")]
    Host(#[from] AppError),

    /// The host refused to open a container's edit context.
    #[error("Failed to open edit context of {container}: {source}")]
    EnterFailed {
        /// The container that could not be opened.
        container: EntityId,
        /// The host error.
        source: AppError,
    },

    /// The host refused to close a container's edit context. The parent
    /// context was restored.
    #[error("Failed to close edit context of {container}: {source}")]
    ExitFailed {
        /// The container that could not be closed.
        container: EntityId,
        /// The host error.
        source: AppError,
    },

    // --- Traversal errors (fatal) ---
    /// The host's active path no longer matches the walker's position.
    #[error("Edit context mismatch: walker expected {expected}, host is at {actual}")]
    ContextMismatch {
        /// Where the walker believes it is.
        expected: ContextPath,
        /// Where the host says it is.
        actual: ContextPath,
    },

    /// Containers are nested deeper than the configured limit, usually a
    /// definition that contains an instance of itself.
    #[error("Container nesting depth {depth} exceeds limit of {limit}")]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Closing a context failed and the parent could not be restored.
    #[error("Failed to restore edit context {path}: {reason}")]
    RestoreFailed {
        /// The path that should have been restored.
        path: ContextPath,
        /// Why the host refused.
        reason: String,
    },

    // --- Plugin errors ---
    /// The host is older than the plugin supports.
    #[error("Host version {version} is not supported (requires {required} or newer)")]
    UnsupportedHost {
        /// Reported host version.
        version: u32,
        /// Minimum supported version.
        required: u32,
    },

    /// No command with this id is registered.
    #[error("Unknown command: {id}")]
    UnknownCommand {
        /// The requested command id.
        id: String,
    },

    /// Commands were registered before the plugin was initialized.
    #[error("Image converter plugin not initialized")]
    NotInitialized,

    /// Converter configuration failed validation.
    #[error("Invalid converter configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
}

impl ConversionError {
    /// Whether the error must abort the whole walk.
    ///
    /// Everything else is recovered at the level of the image or container
    /// it happened in.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ContextMismatch { .. } | Self::DepthExceeded { .. } | Self::RestoreFailed { .. }
        )
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Host(inner) => inner,
            ConversionError::UnknownCommand { .. } => AppError::not_found(err.to_string()),
            ConversionError::UnsupportedHost { .. } | ConversionError::NotInitialized => {
                AppError::plugin(err.to_string())
            }
            ConversionError::InvalidConfig(_) => AppError::configuration(err.to_string()),
            ConversionError::EnterFailed { .. } | ConversionError::ExitFailed { .. } => {
                AppError::host(err.to_string())
            }
            _ => AppError::internal(err.to_string()),
        }
    }
}
