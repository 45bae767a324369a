//! Scene value types: entity kinds, owners, materials, and image metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::EntityId;

/// The kind of a scene entity.
///
/// Only containers and images drive traversal. Faces matter to diagnosis
/// and to conversion results. Everything else the host knows about
/// (edges, guides, text, dimensions) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A raster image placed in the scene.
    Image,
    /// A group owning its own entity collection.
    Group,
    /// An instance of a component definition.
    ComponentInstance,
    /// A planar face.
    Face,
    /// Any entity irrelevant to the walk.
    Other,
}

impl EntityKind {
    /// Returns `true` for groups and component instances.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group | Self::ComponentInstance)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "Image"),
            Self::Group => write!(f, "Group"),
            Self::ComponentInstance => write!(f, "Component"),
            Self::Face => write!(f, "Face"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// The owner of an entity collection as seen by the walker.
///
/// A component instance exposes the collection of its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityOwner {
    /// The model root.
    Root,
    /// A group or component instance.
    Container(EntityId),
}

/// A texture attached to a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    /// Texture (file) name.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A material that can be painted on faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name, unique within a model.
    pub name: String,
    /// Optional texture.
    #[serde(default)]
    pub texture: Option<Texture>,
}

impl Material {
    /// Create an untextured material.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
        }
    }

    /// Create a material backed by a texture of the given pixel size.
    pub fn textured(
        name: impl Into<String>,
        texture: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            texture: Some(Texture {
                name: texture.into(),
                width,
                height,
            }),
        }
    }

    /// Returns `true` if the material carries a texture.
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

/// What the walker records about an image before exploding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Entity name, if the image was named.
    pub name: Option<String>,
    /// Width in model units.
    pub width: f64,
    /// Height in model units.
    pub height: f64,
    /// Material backing the image, if any.
    pub material: Option<Material>,
}
