//! Depth-first scene walker.
//!
//! The walker visits containers in pre-order. At each container it takes a
//! snapshot of the children, explodes the images in the snapshot, then
//! descends into the groups and component instances in the snapshot. The
//! snapshot is taken before anything is mutated, so faces created by
//! explode are never revisited.
//!
//! Explode only works on entities of the active edit context, so every
//! container is opened with a [`ContextScope`] before its images are
//! touched. After each child container the walker checks that the host is
//! back where it expects; a mismatch aborts the whole walk.
//!
//! Component instances share their definition's entities. The first
//! instance visited converts the definition's images; later instances see
//! only the resulting faces.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use imgconv_core::traits::host::SceneHost;
use imgconv_core::types::entity::{EntityKind, EntityOwner, Material};
use imgconv_core::types::id::EntityId;
use imgconv_core::types::path::ContextPath;

use crate::config::ConverterConfig;
use crate::context::{self, ContextScope};
use crate::error::ConversionError;
use crate::metrics::WalkMetrics;
use crate::models::{ContainerFailure, DiagnosticReport, ImageConversion, WalkOutcome, WalkState};
use crate::progress::{Progress, ProgressObserver};

/// Walks a host's scene graph.
#[derive(Debug)]
pub struct SceneWalker {
    config: ConverterConfig,
    metrics: Arc<WalkMetrics>,
    state: WalkState,
}

impl SceneWalker {
    pub fn new(config: ConverterConfig, metrics: Arc<WalkMetrics>) -> Self {
        Self {
            config,
            metrics,
            state: WalkState::Idle,
        }
    }

    /// Current walk state.
    pub fn state(&self) -> &WalkState {
        &self.state
    }

    /// Count images reachable from the root without opening any context.
    ///
    /// Every component instance is counted separately, so an image in a
    /// definition placed twice counts twice.
    pub fn count_images<H: SceneHost + ?Sized>(&self, host: &H) -> Result<usize, ConversionError> {
        self.count_in(host, EntityOwner::Root, 0)
    }

    fn count_in<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        owner: EntityOwner,
        depth: usize,
    ) -> Result<usize, ConversionError> {
        self.check_depth(depth)?;
        let mut count = 0;
        for id in host.children(owner)? {
            match host.kind(id)? {
                EntityKind::Image => count += 1,
                EntityKind::Group | EntityKind::ComponentInstance => {
                    match self.count_in(host, EntityOwner::Container(id), depth + 1) {
                        Ok(n) => count += n,
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => warn!(
                            container = %id.short(),
                            error = %e,
                            "Skipping unreadable container while counting images"
                        ),
                    }
                }
                EntityKind::Face | EntityKind::Other => {}
            }
        }
        Ok(count)
    }

    /// Convert every image in the model and return how many succeeded.
    pub fn convert_images<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        observer: &mut dyn ProgressObserver,
    ) -> Result<usize, ConversionError> {
        let total = self.count_images(&*host)?;
        Ok(self.convert_walk(host, total, observer)?.converted)
    }

    /// Walk from the root converting images. `total_images` is only used
    /// for progress reporting.
    ///
    /// If the host is inside a context on entry, it is first returned to
    /// the root. On a fatal error the host is returned to the root before
    /// the error is handed back.
    pub fn convert_walk<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        total_images: usize,
        observer: &mut dyn ProgressObserver,
    ) -> Result<WalkOutcome, ConversionError> {
        let started = Instant::now();
        if !host.active_path().is_root() {
            info!(path = %host.active_path(), "Returning to the model root before converting");
            context::close_to_root(host)?;
        }

        let root = ContextPath::root();
        let trail = self.config.root_label.clone();
        let mut outcome = WalkOutcome::new(total_images);

        match self.process_context(host, &root, &trail, &mut outcome, observer) {
            Ok(()) => {
                self.state = WalkState::Done;
                self.metrics.record_walk_completed(started.elapsed());
                info!(
                    converted = outcome.converted,
                    total = total_images,
                    faces = outcome.faces_created,
                    failed_images = outcome.failed_images().count(),
                    failed_containers = outcome.failed_containers.len(),
                    "Image conversion walk completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.state = WalkState::Aborted;
                self.metrics.record_walk_aborted();
                error!(error = %e, converted = outcome.converted, "Image conversion walk aborted");
                if let Err(reset) = context::close_to_root(host) {
                    error!(error = %reset, "Failed to return to the model root after abort");
                }
                Err(e)
            }
        }
    }

    fn process_context<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        path: &ContextPath,
        trail: &str,
        outcome: &mut WalkOutcome,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(), ConversionError> {
        self.check_depth(path.depth())?;
        self.ensure_position(&*host, path)?;
        self.state = WalkState::InProgress { path: path.clone() };

        if self.config.status_updates {
            let name = match path.last() {
                Some(id) => context_name(&*host, id),
                None => self.config.root_label.clone(),
            };
            host.set_status_text(&format!("Processing: {name}..."));
        }

        let mut images = Vec::new();
        let mut containers = Vec::new();
        for id in host.active_entities()? {
            match host.kind(id)? {
                EntityKind::Image => images.push(id),
                kind @ (EntityKind::Group | EntityKind::ComponentInstance) => {
                    containers.push((id, kind))
                }
                EntityKind::Face | EntityKind::Other => {}
            }
        }
        debug!(
            path = %path,
            images = images.len(),
            containers = containers.len(),
            "Processing edit context"
        );

        for image in images {
            let result = self.convert_image(host, image, trail);
            if result.success {
                outcome.converted += 1;
                outcome.faces_created += result.faces;
                let progress = Progress {
                    converted: outcome.converted,
                    total: outcome.total_images,
                };
                if self.config.status_updates {
                    host.set_status_text(&progress.to_string());
                }
                observer.on_progress(progress);
            }
            outcome.images.push(result);
        }

        for (container, kind) in containers {
            let label = container_label(&*host, container, kind);
            let child_trail = format!("{trail} > {label}");
            match self.descend(host, path, container, &child_trail, outcome, observer) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        container = %label,
                        context = %trail,
                        error = %e,
                        "Skipping container after failure"
                    );
                    self.metrics.record_container_failed();
                    outcome.failed_containers.push(ContainerFailure {
                        container,
                        label,
                        context: trail.to_string(),
                        error: e.to_string(),
                    });
                }
            }
            self.ensure_position(&*host, path)?;
            self.state = WalkState::InProgress { path: path.clone() };
        }
        Ok(())
    }

    fn descend<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        parent: &ContextPath,
        container: EntityId,
        trail: &str,
        outcome: &mut WalkOutcome,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(), ConversionError> {
        let mut scope = ContextScope::enter(host, parent, container)?;
        self.metrics.record_container_entered();
        let path = scope.path().clone();
        self.process_context(scope.host(), &path, trail, outcome, observer)?;
        scope.close()
    }

    fn convert_image<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        image: EntityId,
        trail: &str,
    ) -> ImageConversion {
        self.metrics.record_image_attempted();
        let info = match host.image_info(image) {
            Ok(info) => info,
            Err(e) => {
                warn!(image = %image.short(), context = %trail, error = %e, "Cannot read image");
                self.metrics.record_image_failed();
                return ImageConversion::unreadable(image, trail, e.to_string());
            }
        };
        let mut result = ImageConversion::pending(image, &info, trail);
        let name = result.display_name();

        let produced = match host.explode(image) {
            Ok(produced) => produced,
            Err(e) => {
                warn!(image = %name, context = %trail, error = %e, "Host rejected image explode");
                self.metrics.record_image_failed();
                result.error = Some(e.to_string());
                return result;
            }
        };

        for entity in produced {
            match host.kind(entity) {
                Ok(EntityKind::Face) => {
                    result.faces += 1;
                    if let Some(material) = &info.material {
                        if let Err(e) = host.set_material(entity, material) {
                            warn!(image = %name, error = %e, "Failed to reapply image material to face");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(image = %name, error = %e, "Cannot read exploded entity"),
            }
        }

        if result.faces == 0 {
            warn!(image = %name, context = %trail, "Image exploded into no faces");
            self.metrics.record_image_failed();
            result.error = Some("explode produced no faces".to_string());
            return result;
        }

        result.success = true;
        self.metrics.record_image_converted(result.faces);
        debug!(image = %name, faces = result.faces, context = %trail, "Converted image to geometry");
        result
    }

    /// Read-only walk collecting images, textured faces, and containers.
    pub fn diagnose<H: SceneHost + ?Sized>(
        &self,
        host: &H,
    ) -> Result<DiagnosticReport, ConversionError> {
        let mut report = DiagnosticReport::default();
        let trail = self.config.root_label.clone();
        self.diagnose_in(host, EntityOwner::Root, &trail, 0, &mut report)?;
        Ok(report)
    }

    fn diagnose_in<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        owner: EntityOwner,
        trail: &str,
        depth: usize,
        report: &mut DiagnosticReport,
    ) -> Result<(), ConversionError> {
        self.check_depth(depth)?;
        for id in host.children(owner)? {
            match host.kind(id)? {
                EntityKind::Image => {
                    report.images += 1;
                    report.trace.push(format!("Found Image in context: {trail}"));
                }
                EntityKind::Face => {
                    if let Some(material) = host.material_of(id)?.filter(Material::has_texture) {
                        report.faces_with_textures += 1;
                        report.trace.push(format!(
                            "Found Face with texture '{}' in context: {trail}",
                            material.name
                        ));
                    }
                }
                kind @ (EntityKind::Group | EntityKind::ComponentInstance) => {
                    if kind == EntityKind::Group {
                        report.groups += 1;
                    } else {
                        report.components += 1;
                    }
                    let label = container_label(host, id, kind);
                    let child_trail = format!("{trail} > {label}");
                    let owner = EntityOwner::Container(id);
                    // A container's findings only count once all of it was read.
                    let mut scratch = DiagnosticReport::default();
                    match self.diagnose_in(host, owner, &child_trail, depth + 1, &mut scratch) {
                        Ok(()) => report.absorb(scratch),
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => {
                            warn!(container = %label, error = %e, "Skipping unreadable container");
                            report.skipped_containers.push(ContainerFailure {
                                container: id,
                                label,
                                context: trail.to_string(),
                                error: e.to_string(),
                            });
                        }
                    }
                }
                EntityKind::Other => {}
            }
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<(), ConversionError> {
        if depth > self.config.max_depth {
            return Err(ConversionError::DepthExceeded {
                depth,
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn ensure_position<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        expected: &ContextPath,
    ) -> Result<(), ConversionError> {
        let actual = host.active_path();
        if actual != *expected {
            return Err(ConversionError::ContextMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// `Group(name)` or `Component(definition)` for context trails.
fn container_label<H: SceneHost + ?Sized>(host: &H, id: EntityId, kind: EntityKind) -> String {
    match kind {
        EntityKind::ComponentInstance => {
            let definition = host.definition_name(id).ok().flatten().unwrap_or_default();
            format!("Component({definition})")
        }
        _ => {
            let name = host.entity_name(id).ok().flatten().unwrap_or_default();
            format!("Group({name})")
        }
    }
}

/// Name of a container for the status line: its own name, else its
/// definition name, else its short id.
fn context_name<H: SceneHost + ?Sized>(host: &H, id: EntityId) -> String {
    host.entity_name(id)
        .ok()
        .flatten()
        .filter(|n| !n.is_empty())
        .or_else(|| host.definition_name(id).ok().flatten())
        .unwrap_or_else(|| id.short())
}
