//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use imgconv_core::types::entity::{EntityKind, EntityOwner, ImageInfo, Material};
use imgconv_core::types::id::EntityId;
use imgconv_core::types::path::ContextPath;
use imgconv_core::{AppResult, SceneHost};
use imgconv_host::{Collection, ImageSpec, MemoryModel};
use plugin_image_converter::{ConverterConfig, ImageConverter};

/// Converter with default settings.
pub fn converter() -> ImageConverter {
    ImageConverter::new(ConverterConfig::default()).expect("valid config")
}

pub fn photo() -> Material {
    Material::textured("photo", "photo.png", 512, 384)
}

/// Ids of the entities in [`lobby`].
pub struct Lobby {
    pub model: MemoryModel,
    pub group: EntityId,
    pub component: EntityId,
}

/// A group holding two images and a component instance whose definition
/// holds one more image.
pub fn lobby() -> Lobby {
    let mut model = MemoryModel::default();
    let group = model
        .add_group(Collection::Root, Some("Lobby"))
        .expect("group");
    model
        .add_image(
            Collection::Group(group),
            ImageSpec::new("poster", 2.0, 3.0).with_material(photo()),
        )
        .expect("poster");
    model
        .add_image(Collection::Group(group), ImageSpec::new("banner", 4.0, 1.0))
        .expect("banner");

    let sign = model.add_definition("Sign");
    model
        .add_image(
            Collection::Definition(sign),
            ImageSpec::new("arrow", 1.0, 1.0).with_material(photo()),
        )
        .expect("arrow");
    model
        .add_other(Collection::Definition(sign), Some("edge"))
        .expect("edge");
    let component = model
        .add_component(Collection::Group(group), sign, Some("entrance sign"))
        .expect("component");

    Lobby {
        model,
        group,
        component,
    }
}

/// Write a scene file into a fresh temp dir.
pub fn write_scene(json: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scene.json");
    std::fs::write(&path, json).expect("write scene");
    (dir, path)
}

/// A host that drifts out of step with the walker's path.
///
/// Exiting `stuck_exit` reports success without leaving the context.
/// Entering the first container of `overshoot` also enters the second.
#[derive(Debug)]
pub struct DriftingHost {
    pub inner: MemoryModel,
    pub stuck_exit: Option<EntityId>,
    pub overshoot: Option<(EntityId, EntityId)>,
}

impl DriftingHost {
    pub fn new(inner: MemoryModel) -> Self {
        Self {
            inner,
            stuck_exit: None,
            overshoot: None,
        }
    }
}

impl SceneHost for DriftingHost {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> u32 {
        self.inner.version()
    }

    fn start_operation(&mut self, name: &str) -> AppResult<()> {
        self.inner.start_operation(name)
    }

    fn commit_operation(&mut self) -> AppResult<()> {
        self.inner.commit_operation()
    }

    fn abort_operation(&mut self) -> AppResult<()> {
        self.inner.abort_operation()
    }

    fn children(&self, owner: EntityOwner) -> AppResult<Vec<EntityId>> {
        self.inner.children(owner)
    }

    fn kind(&self, id: EntityId) -> AppResult<EntityKind> {
        self.inner.kind(id)
    }

    fn entity_name(&self, id: EntityId) -> AppResult<Option<String>> {
        self.inner.entity_name(id)
    }

    fn definition_name(&self, id: EntityId) -> AppResult<Option<String>> {
        self.inner.definition_name(id)
    }

    fn image_info(&self, id: EntityId) -> AppResult<ImageInfo> {
        self.inner.image_info(id)
    }

    fn material_of(&self, id: EntityId) -> AppResult<Option<Material>> {
        self.inner.material_of(id)
    }

    fn set_material(&mut self, id: EntityId, material: &Material) -> AppResult<()> {
        self.inner.set_material(id, material)
    }

    fn active_path(&self) -> ContextPath {
        self.inner.active_path()
    }

    fn enter_context(&mut self, container: EntityId) -> AppResult<()> {
        self.inner.enter_context(container)?;
        match self.overshoot {
            Some((outer, inner)) if outer == container => self.inner.enter_context(inner),
            _ => Ok(()),
        }
    }

    fn exit_context(&mut self) -> AppResult<()> {
        if self.stuck_exit.is_some() && self.inner.active_path().last() == self.stuck_exit {
            return Ok(());
        }
        self.inner.exit_context()
    }

    fn set_active_path(&mut self, path: &[EntityId]) -> AppResult<()> {
        self.inner.set_active_path(path)
    }

    fn explode(&mut self, image: EntityId) -> AppResult<Vec<EntityId>> {
        self.inner.explode(image)
    }

    fn set_status_text(&mut self, text: &str) {
        self.inner.set_status_text(text)
    }

    fn messagebox(&mut self, text: &str) {
        self.inner.messagebox(text)
    }
}
