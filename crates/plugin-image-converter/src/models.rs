//! Results and state of conversion walks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use imgconv_core::types::entity::ImageInfo;
use imgconv_core::types::id::EntityId;
use imgconv_core::types::path::ContextPath;

/// Where a walker is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WalkState {
    /// No walk has run.
    #[default]
    Idle,
    /// Walking; `path` is the context currently being processed.
    InProgress { path: ContextPath },
    /// The last walk reached the end of the tree.
    Done,
    /// The last walk stopped on a fatal error.
    Aborted,
}

/// Result of exploding a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConversion {
    /// The image entity. It no longer exists when `success` is set.
    pub image: EntityId,
    pub name: Option<String>,
    pub width: f64,
    pub height: f64,
    /// Name of the image's backing material.
    pub material: Option<String>,
    /// Trail of the context the image was found in.
    pub context: String,
    /// Faces the image was exploded into.
    pub faces: usize,
    pub success: bool,
    pub error: Option<String>,
}

impl ImageConversion {
    pub(crate) fn pending(image: EntityId, info: &ImageInfo, context: &str) -> Self {
        Self {
            image,
            name: info.name.clone(),
            width: info.width,
            height: info.height,
            material: info.material.as_ref().map(|m| m.name.clone()),
            context: context.to_string(),
            faces: 0,
            success: false,
            error: None,
        }
    }

    pub(crate) fn unreadable(image: EntityId, context: &str, error: String) -> Self {
        Self {
            image,
            name: None,
            width: 0.0,
            height: 0.0,
            material: None,
            context: context.to_string(),
            faces: 0,
            success: false,
            error: Some(error),
        }
    }

    /// Name for messages, falling back to the short id.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Image {}", self.image.short()),
        }
    }
}

/// A container skipped after a recoverable failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerFailure {
    pub container: EntityId,
    /// `Group(name)` or `Component(definition)`.
    pub label: String,
    /// Trail of the context that owns the container.
    pub context: String,
    pub error: String,
}

/// Everything a conversion walk did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkOutcome {
    /// Images counted before the walk.
    pub total_images: usize,
    pub converted: usize,
    pub faces_created: usize,
    /// Every image attempted, in walk order.
    pub images: Vec<ImageConversion>,
    pub failed_containers: Vec<ContainerFailure>,
}

impl WalkOutcome {
    pub fn new(total_images: usize) -> Self {
        Self {
            total_images,
            ..Default::default()
        }
    }

    pub fn failed_images(&self) -> impl Iterator<Item = &ImageConversion> {
        self.images.iter().filter(|i| !i.success)
    }
}

/// Findings of a read-only diagnostic walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub images: usize,
    /// Faces painted with a textured material.
    pub faces_with_textures: usize,
    pub groups: usize,
    pub components: usize,
    /// One line per finding, in walk order.
    pub trace: Vec<String>,
    pub skipped_containers: Vec<ContainerFailure>,
}

impl DiagnosticReport {
    /// Append the findings of a fully read container.
    pub fn absorb(&mut self, other: DiagnosticReport) {
        self.images += other.images;
        self.faces_with_textures += other.faces_with_textures;
        self.groups += other.groups;
        self.components += other.components;
        self.trace.extend(other.trace);
        self.skipped_containers.extend(other.skipped_containers);
    }

    /// Summary lines written after the trace.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("Image entities: {}", self.images),
            format!("Faces with textures: {}", self.faces_with_textures),
            format!("Groups: {}", self.groups),
            format!("Component instances: {}", self.components),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The walk ran and the operation was committed.
    Converted,
    /// The model held no images; the operation was aborted.
    NothingToDo,
}

/// Result of the user-facing convert command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub outcome: ConversionOutcome,
    pub total_images: usize,
    pub converted: usize,
    pub faces_created: usize,
    pub images: Vec<ImageConversion>,
    pub failed_containers: Vec<ContainerFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConversionReport {
    pub(crate) fn nothing_to_do(started_at: DateTime<Utc>) -> Self {
        Self {
            outcome: ConversionOutcome::NothingToDo,
            total_images: 0,
            converted: 0,
            faces_created: 0,
            images: Vec::new(),
            failed_containers: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub(crate) fn from_outcome(outcome: WalkOutcome, started_at: DateTime<Utc>) -> Self {
        Self {
            outcome: ConversionOutcome::Converted,
            total_images: outcome.total_images,
            converted: outcome.converted,
            faces_created: outcome.faces_created,
            images: outcome.images,
            failed_containers: outcome.failed_containers,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failed_images(&self) -> usize {
        self.images.iter().filter(|i| !i.success).count()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
