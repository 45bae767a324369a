//! Shared scene types used across all converter crates.

pub mod entity;
pub mod id;
pub mod path;
