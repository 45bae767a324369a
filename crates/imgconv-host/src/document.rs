//! JSON scene descriptions that build a [`MemoryModel`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use imgconv_core::config::host::HostConfig;
use imgconv_core::error::AppError;
use imgconv_core::result::AppResult;
use imgconv_core::types::entity::Material;
use imgconv_core::types::id::DefinitionId;

use crate::model::{Collection, ImageSpec, MemoryModel};

/// A scene: host identity, component definitions, and root entities.
///
/// ```json
/// {
///   "version": 24,
///   "definitions": [
///     { "name": "Sign", "entities": [{ "type": "image", "width": 2.0, "height": 1.0 }] }
///   ],
///   "entities": [
///     { "type": "group", "name": "Lobby", "entities": [{ "type": "component", "definition": "Sign" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Host name; falls back to the configured host.
    #[serde(default)]
    pub host: Option<String>,
    /// Host major version; falls back to the configured host.
    #[serde(default)]
    pub version: Option<u32>,
    /// Whether the host's explode keeps image materials on new faces.
    #[serde(default)]
    pub preserve_materials: bool,
    /// Component definitions, referenced by name from `component` nodes.
    #[serde(default)]
    pub definitions: Vec<DefinitionSpec>,
    /// Entities at the model root.
    #[serde(default)]
    pub entities: Vec<NodeSpec>,
}

/// A named component definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSpec {
    /// Definition name, unique within the document.
    pub name: String,
    /// Entities of the definition.
    #[serde(default)]
    pub entities: Vec<NodeSpec>,
}

/// One entity of a scene description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSpec {
    /// A raster image.
    Image {
        /// Entity name.
        #[serde(default)]
        name: Option<String>,
        /// Width in model units.
        width: f64,
        /// Height in model units.
        height: f64,
        /// Backing material.
        #[serde(default)]
        material: Option<Material>,
        /// Faces produced when exploded.
        #[serde(default = "default_faces")]
        faces: usize,
        /// Make the host reject exploding this image.
        #[serde(default)]
        reject_explode: bool,
    },
    /// A group and its entities.
    Group {
        /// Entity name.
        #[serde(default)]
        name: Option<String>,
        /// Nested entities.
        #[serde(default)]
        entities: Vec<NodeSpec>,
        /// Make the host refuse to open this group.
        #[serde(default)]
        refuse_context: bool,
    },
    /// An instance of a named definition.
    Component {
        /// Definition name.
        definition: String,
        /// Instance name.
        #[serde(default)]
        name: Option<String>,
        /// Make the host refuse to open this instance.
        #[serde(default)]
        refuse_context: bool,
    },
    /// A face.
    Face {
        /// Painted material.
        #[serde(default)]
        material: Option<Material>,
    },
    /// An edge or any other entity the walker ignores.
    Edge,
}

fn default_faces() -> usize {
    1
}

impl SceneDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a model from this document.
    pub fn to_model(&self, host: &HostConfig) -> AppResult<MemoryModel> {
        let mut model = MemoryModel::new(
            self.host.clone().unwrap_or_else(|| host.name.clone()),
            self.version.unwrap_or(host.version),
        );
        model.preserve_materials_on_explode(self.preserve_materials);

        let mut definitions: HashMap<String, DefinitionId> = HashMap::new();
        for definition in &self.definitions {
            if definitions.contains_key(&definition.name) {
                return Err(AppError::validation(format!(
                    "Duplicate component definition: {}",
                    definition.name
                )));
            }
            let id = model.add_definition(&definition.name);
            definitions.insert(definition.name.clone(), id);
        }

        for definition in &self.definitions {
            let id = definitions[&definition.name];
            add_nodes(
                &mut model,
                Collection::Definition(id),
                &definition.entities,
                &definitions,
            )?;
        }

        add_nodes(&mut model, Collection::Root, &self.entities, &definitions)?;
        Ok(model)
    }
}

fn add_nodes(
    model: &mut MemoryModel,
    parent: Collection,
    nodes: &[NodeSpec],
    definitions: &HashMap<String, DefinitionId>,
) -> AppResult<()> {
    for node in nodes {
        match node {
            NodeSpec::Image {
                name,
                width,
                height,
                material,
                faces,
                reject_explode,
            } => {
                let spec = ImageSpec {
                    name: name.clone(),
                    width: *width,
                    height: *height,
                    material: material.clone(),
                    faces: *faces,
                };
                let id = model.add_image(parent, spec)?;
                if *reject_explode {
                    model.reject_explode(id);
                }
            }
            NodeSpec::Group {
                name,
                entities,
                refuse_context,
            } => {
                let id = model.add_group(parent, name.as_deref())?;
                if *refuse_context {
                    model.refuse_context(id);
                }
                add_nodes(model, Collection::Group(id), entities, definitions)?;
            }
            NodeSpec::Component {
                definition,
                name,
                refuse_context,
            } => {
                let definition_id = definitions.get(definition).ok_or_else(|| {
                    AppError::validation(format!("Unknown component definition: {definition}"))
                })?;
                let id = model.add_component(parent, *definition_id, name.as_deref())?;
                if *refuse_context {
                    model.refuse_context(id);
                }
            }
            NodeSpec::Face { material } => {
                model.add_face(parent, material.clone())?;
            }
            NodeSpec::Edge => {
                model.add_other(parent, None)?;
            }
        }
    }
    Ok(())
}
