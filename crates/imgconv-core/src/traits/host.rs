//! Host trait for the CAD application the converter runs inside.

use crate::result::AppResult;
use crate::types::entity::{EntityKind, EntityOwner, ImageInfo, Material};
use crate::types::id::EntityId;
use crate::types::path::ContextPath;

/// The host CAD environment as seen by the scene walker.
///
/// The host owns the entity model, the undo stack, and a single "active
/// edit context": the container whose entities mutating primitives such as
/// [`SceneHost::explode`] operate on. The in-memory implementation lives
/// in `imgconv-host`.
///
/// All calls are synchronous. A host is driven by one caller at a time;
/// mutating calls take `&mut self`.
pub trait SceneHost: std::fmt::Debug {
    /// Host application name.
    fn name(&self) -> &str;

    /// Host major version.
    fn version(&self) -> u32;

    /// Open an undoable operation. Only one may be open at a time.
    fn start_operation(&mut self, name: &str) -> AppResult<()>;

    /// Commit the open operation.
    fn commit_operation(&mut self) -> AppResult<()>;

    /// Abort the open operation, rolling the model back to its state at
    /// [`SceneHost::start_operation`].
    fn abort_operation(&mut self) -> AppResult<()>;

    /// Ordered entities owned by `owner`. Component instances expose the
    /// entities of their definition.
    fn children(&self, owner: EntityOwner) -> AppResult<Vec<EntityId>>;

    /// Kind of an entity.
    fn kind(&self, id: EntityId) -> AppResult<EntityKind>;

    /// Entity name, if set.
    fn entity_name(&self, id: EntityId) -> AppResult<Option<String>>;

    /// Definition name of a component instance; `None` for other kinds.
    fn definition_name(&self, id: EntityId) -> AppResult<Option<String>>;

    /// Name, size, and material of an image.
    fn image_info(&self, id: EntityId) -> AppResult<ImageInfo>;

    /// Material painted on an entity.
    fn material_of(&self, id: EntityId) -> AppResult<Option<Material>>;

    /// Paint `material` on an entity.
    fn set_material(&mut self, id: EntityId, material: &Material) -> AppResult<()>;

    /// Containers from the root to the active edit context.
    fn active_path(&self) -> ContextPath;

    /// Open the edit context of a container owned by the active context.
    fn enter_context(&mut self, container: EntityId) -> AppResult<()>;

    /// Close the innermost open edit context.
    fn exit_context(&mut self) -> AppResult<()>;

    /// Replace the whole active path. An empty slice returns to the root.
    fn set_active_path(&mut self, path: &[EntityId]) -> AppResult<()>;

    /// Destroy an image owned by the active context and return the
    /// entities that replace it. The returned entities need not carry the
    /// image's material.
    fn explode(&mut self, image: EntityId) -> AppResult<Vec<EntityId>>;

    /// Show text on the status line. Empty text clears it.
    fn set_status_text(&mut self, text: &str);

    /// Show a message to the user.
    fn messagebox(&mut self, text: &str);

    /// Entities of the active edit context.
    fn active_entities(&self) -> AppResult<Vec<EntityId>> {
        self.children(self.active_path().owner())
    }
}
