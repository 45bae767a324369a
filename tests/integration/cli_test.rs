//! End-to-end tests for the `imgconv` binary.

mod helpers;

use std::path::Path;
use std::process::{Command, Output};

const SCENE: &str = r#"{
    "version": 24,
    "definitions": [
        { "name": "Sign", "entities": [{ "type": "image", "name": "arrow", "width": 1.0, "height": 1.0 }] }
    ],
    "entities": [
        { "type": "image", "name": "logo", "width": 2.0, "height": 2.0 },
        { "type": "group", "name": "Lobby", "entities": [
            { "type": "image", "name": "poster", "width": 3.0, "height": 2.0 },
            { "type": "component", "name": "entrance sign", "definition": "Sign" }
        ] }
    ]
}"#;

fn imgconv(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("none.toml");
    Command::new(env!("CARGO_BIN_EXE_imgconv"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("run imgconv")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "imgconv failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn test_count_json() {
    let (dir, scene) = helpers::write_scene(SCENE);
    let scene = scene.to_string_lossy();
    let out = imgconv(dir.path(), &["--scene", &scene, "--format", "json", "count"]);

    assert_eq!(json(&out)["images"], 3);
}

#[test]
fn test_convert_json() {
    let (dir, scene) = helpers::write_scene(SCENE);
    let scene = scene.to_string_lossy();
    let out = imgconv(
        dir.path(),
        &["--scene", &scene, "--format", "json", "convert"],
    );

    let report = json(&out);
    assert_eq!(report["outcome"], "converted");
    assert_eq!(report["converted"], 3);
    assert_eq!(report["images"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_diagnose_table_prints_trace() {
    let (dir, scene) = helpers::write_scene(SCENE);
    let scene = scene.to_string_lossy();
    let out = imgconv(dir.path(), &["--scene", &scene, "diagnose"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found Image in context: Model Root > Group(Lobby) > Component(Sign)"));
    assert!(stdout.contains("Diagnostics complete. Check the log for details."));
}

#[test]
fn test_old_host_fails() {
    let (dir, scene) = helpers::write_scene(r#"{ "version": 20, "entities": [] }"#);
    let scene = scene.to_string_lossy();
    let out = imgconv(dir.path(), &["--scene", &scene, "count"]);

    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Image Converter requires host version 21 or newer."));
}

#[test]
fn test_commands_listing() {
    let (dir, scene) = helpers::write_scene(SCENE);
    let scene = scene.to_string_lossy();
    let out = imgconv(
        dir.path(),
        &["--scene", &scene, "--format", "json", "commands"],
    );

    let rows = json(&out);
    let ids: Vec<_> = rows
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|row| row["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["convert", "count", "diagnose"]);
    assert_eq!(rows[0]["context_menu"], true);
}

#[test]
fn test_config_show_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = imgconv(dir.path(), &["--format", "json", "config", "show"]);

    let config = json(&out);
    assert_eq!(config["image_converter"]["min_host_version"], 21);
    assert_eq!(config["image_converter"]["root_label"], "Model Root");
    assert!(config["logging"].is_object());
}

#[test]
fn test_missing_scene_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = imgconv(dir.path(), &["count"]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--scene"));
}
