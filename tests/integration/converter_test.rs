//! Integration tests for the transactional converter and plugin commands.

mod helpers;

use imgconv_core::SceneHost;
use imgconv_core::config::host::HostConfig;
use imgconv_core::types::entity::EntityKind;
use imgconv_host::{Collection, ImageSpec, MemoryModel, OperationEvent, SceneDocument};
use plugin_image_converter::plugin::{CONVERT_COMMAND, COUNT_COMMAND, DIAGNOSE_COMMAND};
use plugin_image_converter::{
    CommandOutput, CommandRegistry, ConversionError, ConversionOutcome, ImageConverterPlugin,
    NoopProgress, RecordingProgress,
};

#[test]
fn test_convert_then_nothing_to_do() {
    let mut lobby = helpers::lobby();
    let converter = helpers::converter();

    let first = converter.convert_images(&mut lobby.model).expect("first");
    assert_eq!(first.outcome, ConversionOutcome::Converted);
    assert_eq!(first.total_images, 3);
    assert_eq!(first.converted, 3);
    assert!(first.finished_at >= first.started_at);

    let second = converter.convert_images(&mut lobby.model).expect("second");
    assert_eq!(second.outcome, ConversionOutcome::NothingToDo);
    assert_eq!(second.converted, 0);

    assert_eq!(
        lobby.model.messages(),
        &[
            "Successfully converted 3 image(s) to geometry.",
            "No Image entities found to convert.",
        ]
    );
    assert!(matches!(
        lobby.model.operations(),
        [
            OperationEvent::Started(_),
            OperationEvent::Committed(_),
            OperationEvent::Started(_),
            OperationEvent::Aborted(_),
        ]
    ));
}

#[test]
fn test_fatal_walk_error_rolls_back_model() {
    let lobby = helpers::lobby();
    let mut model = lobby.model;
    model
        .add_image(Collection::Root, ImageSpec::new("top", 1.0, 1.0))
        .expect("top");
    let mut host = helpers::DriftingHost::new(model);
    host.stuck_exit = Some(lobby.component);

    let err = helpers::converter()
        .convert_images(&mut host)
        .expect_err("host out of step");

    assert!(matches!(err, ConversionError::ContextMismatch { .. }));
    assert_eq!(host.inner.count_kind(EntityKind::Image), 4);
    assert_eq!(host.inner.count_kind(EntityKind::Face), 0);
    assert!(matches!(
        host.inner.operations().last(),
        Some(OperationEvent::Aborted(_))
    ));
    assert!(!host.inner.has_open_operation());
    assert!(host.inner.active_path().is_root());
    assert_eq!(host.inner.status_text(), "");
    assert!(
        host.inner
            .messages()
            .last()
            .is_some_and(|m| m.starts_with("Error during conversion: Edit context mismatch"))
    );
}

#[test]
fn test_progress_reaches_converted_count() {
    let mut lobby = helpers::lobby();
    let mut recorder = RecordingProgress::new();
    let report = helpers::converter()
        .convert_images_with(&mut lobby.model, &mut recorder)
        .expect("convert");

    assert_eq!(recorder.last().map(|p| p.converted), Some(report.converted));
    assert!(
        lobby
            .model
            .status_history()
            .iter()
            .any(|s| s == "Processing: entrance sign...")
    );
    assert_eq!(lobby.model.status_text(), "");
}

#[test]
fn test_plugin_commands_end_to_end() {
    let doc = SceneDocument::from_json(
        r#"{
            "version": 23,
            "definitions": [
                { "name": "Sign", "entities": [{ "type": "image", "width": 1.0, "height": 1.0 }] }
            ],
            "entities": [
                { "type": "image", "name": "logo", "width": 2.0, "height": 2.0 },
                { "type": "group", "name": "Wing", "entities": [
                    { "type": "component", "definition": "Sign" }
                ] }
            ]
        }"#,
    )
    .expect("parse");
    let mut model = doc.to_model(&HostConfig::default()).expect("model");

    let mut plugin = ImageConverterPlugin::default();
    plugin.initialize(&mut model).expect("init");
    let mut registry = CommandRegistry::new();
    plugin.register_commands(&mut registry).expect("register");
    assert_eq!(
        registry.menu(),
        vec!["Convert Images to Geometry", "Count Images", "Debug Context"]
    );

    let counted = registry
        .run(COUNT_COMMAND, &mut model, &mut NoopProgress)
        .expect("count");
    assert!(matches!(counted, CommandOutput::Counted { images: 2 }));

    match registry
        .run(DIAGNOSE_COMMAND, &mut model, &mut NoopProgress)
        .expect("diagnose")
    {
        CommandOutput::Diagnosed(report) => {
            assert_eq!(report.groups, 1);
            assert_eq!(report.components, 1);
        }
        other => panic!("unexpected output: {other:?}"),
    }

    match registry
        .run(CONVERT_COMMAND, &mut model, &mut NoopProgress)
        .expect("convert")
    {
        CommandOutput::Converted(report) => assert_eq!(report.converted, 2),
        other => panic!("unexpected output: {other:?}"),
    }
    assert_eq!(model.count_kind(EntityKind::Image), 0);

    let err = registry
        .run("explode", &mut model, &mut NoopProgress)
        .expect_err("unknown");
    assert!(matches!(err, ConversionError::UnknownCommand { .. }));
}

#[test]
fn test_version_gate() {
    let mut old = MemoryModel::new("Studio", 20);
    let mut plugin = ImageConverterPlugin::default();
    assert!(matches!(
        plugin.initialize(&mut old),
        Err(ConversionError::UnsupportedHost { .. })
    ));
    assert!(plugin.converter().is_none());

    let mut current = MemoryModel::new("Studio", 21);
    plugin.initialize(&mut current).expect("init");
    assert!(plugin.converter().is_some());
    assert_eq!(current.version(), 21);
}
