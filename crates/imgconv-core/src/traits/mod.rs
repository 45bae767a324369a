//! Core traits implemented by host backends.

pub mod host;

pub use host::SceneHost;
