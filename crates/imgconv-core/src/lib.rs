//! # imgconv-core
//!
//! Core crate for the image converter. Contains the host trait the scene
//! walker drives, configuration schemas, typed entity identifiers, scene
//! value types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other converter crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use traits::host::SceneHost;
pub use types::entity::{EntityKind, EntityOwner, ImageInfo, Material, Texture};
pub use types::id::{DefinitionId, EntityId};
pub use types::path::ContextPath;
