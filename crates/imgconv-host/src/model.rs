//! In-memory scene model implementing [`SceneHost`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use imgconv_core::error::AppError;
use imgconv_core::result::AppResult;
use imgconv_core::traits::host::SceneHost;
use imgconv_core::types::entity::{EntityKind, EntityOwner, ImageInfo, Material};
use imgconv_core::types::id::{DefinitionId, EntityId};
use imgconv_core::types::path::ContextPath;

/// An entity collection inside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The model root.
    Root,
    /// The collection owned by a group.
    Group(EntityId),
    /// The collection of a component definition, shared by its instances.
    Definition(DefinitionId),
}

/// Description of an image to place in the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    /// Entity name.
    pub name: Option<String>,
    /// Width in model units.
    pub width: f64,
    /// Height in model units.
    pub height: f64,
    /// Material backing the image.
    pub material: Option<Material>,
    /// Number of faces the image decomposes into when exploded.
    pub faces: usize,
}

impl ImageSpec {
    /// A named image that explodes into a single face.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: Some(name.into()),
            width,
            height,
            material: None,
            faces: 1,
        }
    }

    /// Set the backing material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Set how many faces the image explodes into.
    pub fn with_faces(mut self, faces: usize) -> Self {
        self.faces = faces;
        self
    }
}

/// Undo-stack events, in the order the host saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationEvent {
    /// An operation was opened.
    Started(String),
    /// The open operation was committed.
    Committed(String),
    /// The open operation was aborted and rolled back.
    Aborted(String),
}

#[derive(Debug, Clone)]
enum Payload {
    Image {
        width: f64,
        height: f64,
        material: Option<Material>,
        faces: usize,
    },
    Group,
    Component {
        definition: DefinitionId,
    },
    Face {
        material: Option<Material>,
    },
    Other,
}

#[derive(Debug, Clone)]
struct Entity {
    name: Option<String>,
    owner: Collection,
    payload: Payload,
}

impl Entity {
    fn kind(&self) -> EntityKind {
        match self.payload {
            Payload::Image { .. } => EntityKind::Image,
            Payload::Group => EntityKind::Group,
            Payload::Component { .. } => EntityKind::ComponentInstance,
            Payload::Face { .. } => EntityKind::Face,
            Payload::Other => EntityKind::Other,
        }
    }
}

#[derive(Debug, Clone)]
struct SceneState {
    entities: HashMap<EntityId, Entity>,
    collections: HashMap<Collection, Vec<EntityId>>,
    definitions: HashMap<DefinitionId, String>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            collections: HashMap::from([(Collection::Root, Vec::new())]),
            definitions: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    refused_contexts: HashSet<EntityId>,
    failing_exits: HashSet<EntityId>,
    rejected_explodes: HashSet<EntityId>,
    unreadable: HashSet<EntityId>,
}

/// An in-memory host model.
#[derive(Debug)]
pub struct MemoryModel {
    /// Host application name.
    name: String,
    /// Host major version.
    version: u32,
    /// Current scene.
    state: SceneState,
    /// Open operation name and the scene as it was when it opened.
    open_operation: Option<(String, SceneState)>,
    /// Undo-stack history.
    operations: Vec<OperationEvent>,
    /// Open edit contexts, outermost first.
    active_path: Vec<EntityId>,
    /// Current status line.
    status_text: String,
    /// Every non-empty status line shown.
    status_history: Vec<String>,
    /// Every message box shown.
    messages: Vec<String>,
    /// Whether explode copies the image material onto the new faces.
    preserve_materials: bool,
    /// Injected failures.
    faults: Faults,
}

impl MemoryModel {
    /// Create an empty model for a host with the given identity.
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            state: SceneState::default(),
            open_operation: None,
            operations: Vec::new(),
            active_path: Vec::new(),
            status_text: String::new(),
            status_history: Vec::new(),
            messages: Vec::new(),
            preserve_materials: false,
            faults: Faults::default(),
        }
    }

    // --- Building ---

    /// Add a group to `parent`.
    pub fn add_group(&mut self, parent: Collection, name: Option<&str>) -> AppResult<EntityId> {
        let id = self.insert(
            parent,
            Entity {
                name: name.map(str::to_string),
                owner: parent,
                payload: Payload::Group,
            },
        )?;
        self.state.collections.insert(Collection::Group(id), Vec::new());
        Ok(id)
    }

    /// Create an empty component definition.
    pub fn add_definition(&mut self, name: &str) -> DefinitionId {
        let id = DefinitionId::new();
        self.state.definitions.insert(id, name.to_string());
        self.state
            .collections
            .insert(Collection::Definition(id), Vec::new());
        id
    }

    /// Place an instance of `definition` in `parent`.
    pub fn add_component(
        &mut self,
        parent: Collection,
        definition: DefinitionId,
        name: Option<&str>,
    ) -> AppResult<EntityId> {
        if !self.state.definitions.contains_key(&definition) {
            return Err(AppError::not_found(format!(
                "Component definition not found: {definition}"
            )));
        }
        self.insert(
            parent,
            Entity {
                name: name.map(str::to_string),
                owner: parent,
                payload: Payload::Component { definition },
            },
        )
    }

    /// Place an image in `parent`.
    pub fn add_image(&mut self, parent: Collection, spec: ImageSpec) -> AppResult<EntityId> {
        self.insert(
            parent,
            Entity {
                name: spec.name,
                owner: parent,
                payload: Payload::Image {
                    width: spec.width,
                    height: spec.height,
                    material: spec.material,
                    faces: spec.faces,
                },
            },
        )
    }

    /// Add a face to `parent`.
    pub fn add_face(
        &mut self,
        parent: Collection,
        material: Option<Material>,
    ) -> AppResult<EntityId> {
        self.insert(
            parent,
            Entity {
                name: None,
                owner: parent,
                payload: Payload::Face { material },
            },
        )
    }

    /// Add an entity the walker ignores (edge, guide, text).
    pub fn add_other(&mut self, parent: Collection, name: Option<&str>) -> AppResult<EntityId> {
        self.insert(
            parent,
            Entity {
                name: name.map(str::to_string),
                owner: parent,
                payload: Payload::Other,
            },
        )
    }

    /// Make explode copy the image material onto the faces it creates.
    /// Off by default.
    pub fn preserve_materials_on_explode(&mut self, preserve: bool) {
        self.preserve_materials = preserve;
    }

    // --- Failure injection ---

    /// Refuse to open the edit context of `container`.
    pub fn refuse_context(&mut self, container: EntityId) {
        self.faults.refused_contexts.insert(container);
    }

    /// Refuse to close the edit context of `container` once open.
    pub fn fail_exit(&mut self, container: EntityId) {
        self.faults.failing_exits.insert(container);
    }

    /// Reject explode requests for `image`.
    pub fn reject_explode(&mut self, image: EntityId) {
        self.faults.rejected_explodes.insert(image);
    }

    /// Fail every kind query for `id`.
    pub fn fail_read(&mut self, id: EntityId) {
        self.faults.unreadable.insert(id);
    }

    // --- Inspection ---

    /// Number of entities of `kind` stored in the model. Entities inside a
    /// definition count once regardless of how many instances exist.
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.state
            .entities
            .values()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// All entities of `kind`, in no particular order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.state
            .entities
            .iter()
            .filter(|(_, e)| e.kind() == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Entities of a collection, in order.
    pub fn collection(&self, collection: Collection) -> AppResult<Vec<EntityId>> {
        self.state
            .collections
            .get(&collection)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Collection not found: {collection:?}")))
    }

    /// Current status line.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Every non-empty status line shown so far.
    pub fn status_history(&self) -> &[String] {
        &self.status_history
    }

    /// Every message box shown so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Undo-stack history.
    pub fn operations(&self) -> &[OperationEvent] {
        &self.operations
    }

    /// Whether an operation is open.
    pub fn has_open_operation(&self) -> bool {
        self.open_operation.is_some()
    }

    // --- Internals ---

    fn insert(&mut self, parent: Collection, entity: Entity) -> AppResult<EntityId> {
        let id = EntityId::new();
        let members = self
            .state
            .collections
            .get_mut(&parent)
            .ok_or_else(|| AppError::not_found(format!("Collection not found: {parent:?}")))?;
        members.push(id);
        self.state.entities.insert(id, entity);
        Ok(id)
    }

    fn entity(&self, id: EntityId) -> AppResult<&Entity> {
        self.state
            .entities
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Entity not found: {id}")))
    }

    fn entity_mut(&mut self, id: EntityId) -> AppResult<&mut Entity> {
        self.state
            .entities
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Entity not found: {id}")))
    }

    /// Collection exposed by a container entity.
    fn collection_of(&self, container: EntityId) -> AppResult<Collection> {
        match self.entity(container)?.payload {
            Payload::Group => Ok(Collection::Group(container)),
            Payload::Component { definition } => Ok(Collection::Definition(definition)),
            _ => Err(AppError::validation(format!(
                "Entity {container} is not a group or component instance"
            ))),
        }
    }

    fn active_collection(&self) -> AppResult<Collection> {
        match self.active_path.last() {
            Some(id) => self.collection_of(*id),
            None => Ok(Collection::Root),
        }
    }

    /// Check that each container in `path` lives in the collection of the
    /// one before it, starting from the root.
    fn validate_path(&self, path: &[EntityId]) -> AppResult<()> {
        let mut current = Collection::Root;
        for id in path {
            let entity = self.entity(*id)?;
            if entity.owner != current {
                return Err(AppError::conflict(format!(
                    "Entity {id} is not reachable from the previous path element"
                )));
            }
            current = self.collection_of(*id)?;
        }
        Ok(())
    }
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new("Memory Host", 24)
    }
}

impl SceneHost for MemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn start_operation(&mut self, name: &str) -> AppResult<()> {
        if let Some((open, _)) = &self.open_operation {
            return Err(AppError::conflict(format!(
                "Operation '{open}' is already open"
            )));
        }
        self.open_operation = Some((name.to_string(), self.state.clone()));
        self.operations.push(OperationEvent::Started(name.to_string()));
        debug!(operation = name, "Operation started");
        Ok(())
    }

    fn commit_operation(&mut self) -> AppResult<()> {
        let (name, _) = self
            .open_operation
            .take()
            .ok_or_else(|| AppError::conflict("No operation is open"))?;
        debug!(operation = %name, "Operation committed");
        self.operations.push(OperationEvent::Committed(name));
        Ok(())
    }

    fn abort_operation(&mut self) -> AppResult<()> {
        let (name, snapshot) = self
            .open_operation
            .take()
            .ok_or_else(|| AppError::conflict("No operation is open"))?;
        self.state = snapshot;
        if self.validate_path(&self.active_path).is_err() {
            self.active_path.clear();
        }
        debug!(operation = %name, "Operation aborted, model rolled back");
        self.operations.push(OperationEvent::Aborted(name));
        Ok(())
    }

    fn children(&self, owner: EntityOwner) -> AppResult<Vec<EntityId>> {
        let collection = match owner {
            EntityOwner::Root => Collection::Root,
            EntityOwner::Container(id) => self.collection_of(id)?,
        };
        self.collection(collection)
    }

    fn kind(&self, id: EntityId) -> AppResult<EntityKind> {
        if self.faults.unreadable.contains(&id) {
            return Err(AppError::host(format!("Host cannot read entity {id}")));
        }
        Ok(self.entity(id)?.kind())
    }

    fn entity_name(&self, id: EntityId) -> AppResult<Option<String>> {
        Ok(self.entity(id)?.name.clone())
    }

    fn definition_name(&self, id: EntityId) -> AppResult<Option<String>> {
        match self.entity(id)?.payload {
            Payload::Component { definition } => {
                Ok(self.state.definitions.get(&definition).cloned())
            }
            _ => Ok(None),
        }
    }

    fn image_info(&self, id: EntityId) -> AppResult<ImageInfo> {
        let entity = self.entity(id)?;
        match &entity.payload {
            Payload::Image {
                width,
                height,
                material,
                ..
            } => Ok(ImageInfo {
                name: entity.name.clone(),
                width: *width,
                height: *height,
                material: material.clone(),
            }),
            _ => Err(AppError::validation(format!("Entity {id} is not an image"))),
        }
    }

    fn material_of(&self, id: EntityId) -> AppResult<Option<Material>> {
        match &self.entity(id)?.payload {
            Payload::Image { material, .. } | Payload::Face { material } => Ok(material.clone()),
            _ => Ok(None),
        }
    }

    fn set_material(&mut self, id: EntityId, material: &Material) -> AppResult<()> {
        match &mut self.entity_mut(id)?.payload {
            Payload::Image { material: slot, .. } | Payload::Face { material: slot } => {
                *slot = Some(material.clone());
                Ok(())
            }
            _ => Err(AppError::validation(format!(
                "Entity {id} cannot carry a material"
            ))),
        }
    }

    fn active_path(&self) -> ContextPath {
        ContextPath::from(self.active_path.clone())
    }

    fn enter_context(&mut self, container: EntityId) -> AppResult<()> {
        let active = self.active_collection()?;
        let entity = self.entity(container)?;
        if !entity.kind().is_container() {
            return Err(AppError::validation(format!(
                "Entity {container} is not a group or component instance"
            )));
        }
        if entity.owner != active {
            return Err(AppError::conflict(format!(
                "Container {container} is not in the active edit context"
            )));
        }
        if self.faults.refused_contexts.contains(&container) {
            return Err(AppError::host(format!(
                "Host refused to open the edit context of {container}"
            )));
        }
        self.active_path.push(container);
        debug!(
            container = %container.short(),
            depth = self.active_path.len(),
            "Entered edit context"
        );
        Ok(())
    }

    fn exit_context(&mut self) -> AppResult<()> {
        let innermost = *self
            .active_path
            .last()
            .ok_or_else(|| AppError::conflict("Already at the model root"))?;
        if self.faults.failing_exits.contains(&innermost) {
            return Err(AppError::host(format!(
                "Host failed to close the edit context of {innermost}"
            )));
        }
        self.active_path.pop();
        debug!(
            container = %innermost.short(),
            depth = self.active_path.len(),
            "Closed edit context"
        );
        Ok(())
    }

    fn set_active_path(&mut self, path: &[EntityId]) -> AppResult<()> {
        self.validate_path(path)?;
        self.active_path = path.to_vec();
        Ok(())
    }

    fn explode(&mut self, image: EntityId) -> AppResult<Vec<EntityId>> {
        let active = self.active_collection()?;
        let entity = self.entity(image)?;
        let (material, faces) = match &entity.payload {
            Payload::Image {
                material, faces, ..
            } => (material.clone(), *faces),
            _ => {
                return Err(AppError::validation(format!("Entity {image} is not an image")));
            }
        };
        if entity.owner != active {
            return Err(AppError::conflict(format!(
                "Image {image} is not in the active edit context"
            )));
        }
        if self.faults.rejected_explodes.contains(&image) {
            return Err(AppError::host(format!("Host rejected explode of image {image}")));
        }

        let face_material = if self.preserve_materials { material } else { None };
        let mut produced = Vec::with_capacity(faces * 2);
        for _ in 0..faces {
            let face = EntityId::new();
            self.state.entities.insert(
                face,
                Entity {
                    name: None,
                    owner: active,
                    payload: Payload::Face {
                        material: face_material.clone(),
                    },
                },
            );
            let edge = EntityId::new();
            self.state.entities.insert(
                edge,
                Entity {
                    name: None,
                    owner: active,
                    payload: Payload::Other,
                },
            );
            produced.push(face);
            produced.push(edge);
        }

        self.state.entities.remove(&image);
        let members = self
            .state
            .collections
            .get_mut(&active)
            .ok_or_else(|| AppError::internal(format!("Collection not found: {active:?}")))?;
        let position = members
            .iter()
            .position(|id| *id == image)
            .ok_or_else(|| AppError::internal(format!("Image {image} missing from its collection")))?;
        let tail = members.split_off(position + 1);
        members.truncate(position);
        members.extend(produced.iter().copied());
        members.extend(tail);

        debug!(image = %image.short(), faces, "Exploded image");
        Ok(produced)
    }

    fn set_status_text(&mut self, text: &str) {
        self.status_text = text.to_string();
        if !text.is_empty() {
            self.status_history.push(text.to_string());
        }
    }

    fn messagebox(&mut self, text: &str) {
        info!(host = %self.name, message = text, "Message box");
        self.messages.push(text.to_string());
    }
}
