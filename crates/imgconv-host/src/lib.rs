//! # imgconv-host
//!
//! An in-memory implementation of [`imgconv_core::SceneHost`].
//!
//! [`MemoryModel`] keeps an arena of entities grouped into collections
//! (the model root, one per group, one per component definition), a stack
//! of open edit contexts, and a single undoable operation backed by a
//! snapshot of the scene. Failure injection hooks let callers make the
//! host refuse edit contexts or explodes. [`SceneDocument`] describes a
//! scene in JSON for the CLI and tests.

pub mod document;
pub mod model;

pub use document::{NodeSpec, SceneDocument};
pub use model::{Collection, ImageSpec, MemoryModel, OperationEvent};
