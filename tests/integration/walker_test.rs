//! Integration tests for the scene walker.

mod helpers;

use std::sync::Arc;

use imgconv_core::SceneHost;
use imgconv_core::types::entity::{EntityKind, Material};
use imgconv_core::types::path::ContextPath;
use imgconv_host::{Collection, ImageSpec, MemoryModel};
use plugin_image_converter::metrics::WalkMetrics;
use plugin_image_converter::{
    ContextScope, ConversionError, ConverterConfig, NoopProgress, RecordingProgress, SceneWalker,
    WalkState,
};

fn walker() -> SceneWalker {
    SceneWalker::new(ConverterConfig::default(), Arc::new(WalkMetrics::new()))
}

#[test]
fn test_empty_model_counts_and_converts_nothing() {
    let mut model = MemoryModel::default();
    let mut walker = walker();

    assert_eq!(walker.count_images(&model).expect("count"), 0);
    assert_eq!(
        walker
            .convert_images(&mut model, &mut NoopProgress)
            .expect("convert"),
        0
    );
    let report = walker.diagnose(&model).expect("diagnose");
    assert_eq!(report.images, 0);
    assert!(report.trace.is_empty());
}

#[test]
fn test_single_root_image() {
    let mut model = MemoryModel::default();
    model
        .add_image(
            Collection::Root,
            ImageSpec::new("logo", 2.0, 1.0).with_material(helpers::photo()),
        )
        .expect("logo");

    let mut walker = walker();
    assert_eq!(walker.count_images(&model).expect("count"), 1);
    assert_eq!(
        walker
            .convert_images(&mut model, &mut NoopProgress)
            .expect("convert"),
        1
    );
    assert_eq!(model.count_kind(EntityKind::Image), 0);
    assert_eq!(model.count_kind(EntityKind::Face), 1);
    assert_eq!(walker.state(), &WalkState::Done);
}

#[test]
fn test_lobby_scenario() {
    let mut lobby = helpers::lobby();
    let mut walker = walker();

    let report = walker.diagnose(&lobby.model).expect("diagnose");
    assert_eq!(report.images, 3);
    assert_eq!(report.groups, 1);
    assert_eq!(report.components, 1);
    assert_eq!(
        report.trace,
        vec![
            "Found Image in context: Model Root > Group(Lobby)",
            "Found Image in context: Model Root > Group(Lobby)",
            "Found Image in context: Model Root > Group(Lobby) > Component(Sign)",
        ]
    );

    assert_eq!(walker.count_images(&lobby.model).expect("count"), 3);
    let outcome = walker
        .convert_walk(&mut lobby.model, 3, &mut NoopProgress)
        .expect("convert");
    assert_eq!(outcome.converted, 3);
    assert!(outcome.failed_containers.is_empty());
    assert_eq!(
        outcome
            .images
            .iter()
            .map(|i| i.display_name())
            .collect::<Vec<_>>(),
        vec!["poster", "banner", "arrow"]
    );
    assert_eq!(lobby.model.count_kind(EntityKind::Image), 0);
    assert!(lobby.model.active_path().is_root());

    // Faces created by explode are textured and show up in a later diagnosis.
    let after = walker.diagnose(&lobby.model).expect("diagnose");
    assert_eq!(after.images, 0);
    assert_eq!(after.faces_with_textures, 2);
}

#[test]
fn test_count_matches_enumeration_in_any_order() {
    fn build(reversed: bool) -> MemoryModel {
        let mut model = MemoryModel::default();
        let mut steps: Vec<Box<dyn Fn(&mut MemoryModel)>> = vec![
            Box::new(|m: &mut MemoryModel| {
                m.add_image(Collection::Root, ImageSpec::new("a", 1.0, 1.0))
                    .expect("a");
            }),
            Box::new(|m: &mut MemoryModel| {
                let g = m.add_group(Collection::Root, Some("g")).expect("g");
                m.add_image(Collection::Group(g), ImageSpec::new("b", 1.0, 1.0))
                    .expect("b");
                let inner = m.add_group(Collection::Group(g), None).expect("inner");
                m.add_image(Collection::Group(inner), ImageSpec::new("c", 1.0, 1.0))
                    .expect("c");
            }),
            Box::new(|m: &mut MemoryModel| {
                m.add_face(Collection::Root, Some(Material::new("plain")))
                    .expect("face");
            }),
        ];
        if reversed {
            steps.reverse();
        }
        for step in &steps {
            step(&mut model);
        }
        model
    }

    let walker = walker();
    for reversed in [false, true] {
        let model = build(reversed);
        let counted = walker.count_images(&model).expect("count");
        assert_eq!(counted, model.count_kind(EntityKind::Image));
        assert_eq!(counted, 3);
    }
}

#[test]
fn test_shared_definition_converts_at_most_count() {
    let mut model = MemoryModel::default();
    let tile = model.add_definition("Tile");
    model
        .add_image(Collection::Definition(tile), ImageSpec::new("t", 1.0, 1.0))
        .expect("t");
    for _ in 0..3 {
        model
            .add_component(Collection::Root, tile, None)
            .expect("instance");
    }

    let mut walker = walker();
    let counted = walker.count_images(&model).expect("count");
    let converted = walker
        .convert_images(&mut model, &mut NoopProgress)
        .expect("convert");
    assert_eq!(counted, 3);
    assert_eq!(converted, 1);
    assert!(converted <= counted);
}

#[test]
fn test_second_run_finds_nothing() {
    let mut lobby = helpers::lobby();
    let mut walker = walker();
    assert_eq!(
        walker
            .convert_images(&mut lobby.model, &mut NoopProgress)
            .expect("first"),
        3
    );
    assert_eq!(
        walker
            .convert_images(&mut lobby.model, &mut NoopProgress)
            .expect("second"),
        0
    );
}

#[test]
fn test_materials_survive_explode() {
    let mut lobby = helpers::lobby();
    walker()
        .convert_images(&mut lobby.model, &mut NoopProgress)
        .expect("convert");

    let textured: Vec<_> = lobby
        .model
        .entities_of_kind(EntityKind::Face)
        .into_iter()
        .filter_map(|face| lobby.model.material_of(face).expect("material"))
        .collect();
    assert_eq!(textured.len(), 2);
    assert!(textured.iter().all(|m| m.name == "photo" && m.has_texture()));
}

#[test]
fn test_refused_container_does_not_block_siblings() {
    let mut lobby = helpers::lobby();
    let side = lobby
        .model
        .add_group(Collection::Root, Some("Side"))
        .expect("side");
    lobby
        .model
        .add_image(Collection::Group(side), ImageSpec::new("side", 1.0, 1.0))
        .expect("side image");
    lobby.model.refuse_context(lobby.group);

    let mut walker = walker();
    let outcome = walker
        .convert_walk(&mut lobby.model, 4, &mut NoopProgress)
        .expect("convert");

    assert_eq!(outcome.converted, 1);
    assert_eq!(outcome.failed_containers.len(), 1);
    assert_eq!(outcome.failed_containers[0].container, lobby.group);
    assert_eq!(outcome.failed_containers[0].context, "Model Root");
    assert_eq!(lobby.model.count_kind(EntityKind::Image), 3);
    assert!(lobby.model.active_path().is_root());
}

#[test]
fn test_failed_exit_is_recovered() {
    let mut lobby = helpers::lobby();
    lobby.model.fail_exit(lobby.component);

    let mut walker = walker();
    let outcome = walker
        .convert_walk(&mut lobby.model, 3, &mut NoopProgress)
        .expect("convert");

    assert_eq!(outcome.converted, 3);
    assert_eq!(outcome.failed_containers.len(), 1);
    assert_eq!(outcome.failed_containers[0].label, "Component(Sign)");
    assert!(lobby.model.active_path().is_root());
}

#[test]
fn test_zero_face_image_is_skipped() {
    let mut model = MemoryModel::default();
    model
        .add_image(
            Collection::Root,
            ImageSpec::new("blank", 1.0, 1.0).with_faces(0),
        )
        .expect("blank");
    model
        .add_image(Collection::Root, ImageSpec::new("ok", 1.0, 1.0))
        .expect("ok");

    let mut walker = walker();
    let outcome = walker
        .convert_walk(&mut model, 2, &mut NoopProgress)
        .expect("convert");

    assert_eq!(outcome.converted, 1);
    let failed: Vec<_> = outcome.failed_images().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].display_name(), "blank");
    assert_eq!(failed[0].faces, 0);
}

#[test]
fn test_progress_is_strictly_increasing() {
    let mut lobby = helpers::lobby();
    let mut recorder = RecordingProgress::new();
    let mut walker = walker();
    let converted = walker
        .convert_images(&mut lobby.model, &mut recorder)
        .expect("convert");

    let updates = recorder.updates();
    assert_eq!(updates.len(), converted);
    assert!(updates.windows(2).all(|w| w[0].converted < w[1].converted));
    assert!(updates.iter().all(|p| p.total == 3));
    assert_eq!(recorder.last().map(|p| p.converted), Some(converted));
}

#[test]
fn test_walker_metrics_accumulate() {
    let metrics = Arc::new(WalkMetrics::new());
    let mut walker = SceneWalker::new(ConverterConfig::default(), Arc::clone(&metrics));
    let mut lobby = helpers::lobby();
    walker
        .convert_images(&mut lobby.model, &mut NoopProgress)
        .expect("convert");

    let snap = metrics.snapshot();
    assert_eq!(snap.images_attempted, 3);
    assert_eq!(snap.images_converted, 3);
    assert_eq!(snap.containers_entered, 2);
    assert_eq!(snap.walks_completed, 1);
}

#[test]
fn test_scope_puts_back_a_host_that_enters_too_deep() {
    let lobby = helpers::lobby();
    let mut host = helpers::DriftingHost::new(lobby.model);
    host.overshoot = Some((lobby.group, lobby.component));

    let err = ContextScope::enter(&mut host, &ContextPath::root(), lobby.group)
        .expect_err("host went too deep");

    assert!(matches!(err, ConversionError::ContextMismatch { .. }));
    assert_eq!(host.active_path().depth(), 0);
}

#[test]
fn test_walk_aborts_when_host_enters_too_deep() {
    let lobby = helpers::lobby();
    let mut host = helpers::DriftingHost::new(lobby.model);
    host.overshoot = Some((lobby.group, lobby.component));

    let mut walker = walker();
    let err = walker
        .convert_walk(&mut host, 3, &mut NoopProgress)
        .expect_err("fatal");

    assert!(err.is_fatal());
    assert_eq!(walker.state(), &WalkState::Aborted);
    assert!(host.active_path().is_root());
    assert_eq!(host.inner.count_kind(EntityKind::Image), 3);
}
