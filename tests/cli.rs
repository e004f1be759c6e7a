//! Command-line tests for the `flutter-appsettings` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pubspec.yaml"), "name: cli_target\n").unwrap();
    dir
}

fn bin() -> Command {
    Command::cargo_bin("flutter-appsettings").unwrap()
}

#[test]
fn test_bootstrap_local_and_dev() {
    let dir = project();

    bin()
        .args(["bootstrap", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("appsettings.json"));

    bin()
        .args(["bootstrap", "-c", "dev", "-p"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("appsettings.dev.json"));

    assert_eq!(
        fs::read_to_string(dir.path().join("appsettings.dev.json")).unwrap(),
        "{}\n"
    );
}

#[test]
fn test_bootstrap_existing_file_fails() {
    let dir = project();
    fs::write(dir.path().join("appsettings.json"), "{\"WEB\":{}}").unwrap();

    bin()
        .args(["bootstrap", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        fs::read_to_string(dir.path().join("appsettings.json")).unwrap(),
        "{\"WEB\":{}}"
    );
}

#[test]
fn test_bootstrap_unknown_environment() {
    let dir = project();

    bin()
        .args(["bootstrap", "-c", "prod", "-p"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment"));
}

#[test]
fn test_path_without_pubspec_fails() {
    let dir = TempDir::new().unwrap();

    bin()
        .args(["show", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("pubspec.yaml"));
}

#[test]
fn test_project_found_from_subdirectory() {
    let dir = project();
    let nested = dir.path().join("lib");
    fs::create_dir_all(&nested).unwrap();

    bin()
        .current_dir(&nested)
        .args(["show", "--args"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--web-renderer canvaskit --web-port 30001"));
}

#[test]
fn test_show_json() {
    let dir = project();
    fs::write(
        dir.path().join("appsettings.dev.json"),
        r#"{ "WEB": { "WEB_PORT": 8080 }, "DART_DEFINES": { "A": false, "B": "X" } }"#,
    )
    .unwrap();

    let output = bin()
        .args(["show", "--path"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["settings"]["WEB"]["WEB_PORT"], 8080);
    assert_eq!(json["settings"]["WEB"]["WEB_RENDERER"], "canvaskit");
    assert_eq!(json["settings"]["DART_DEFINES"]["A"], false);
    assert_eq!(json["sources"][0]["layer"], "dev");
    assert_eq!(json["sources"].as_array().unwrap().len(), 1);
}

#[test]
fn test_show_args() {
    let dir = project();
    fs::write(
        dir.path().join("appsettings.json"),
        r#"{ "IOS": { "FLAVOR": "dev" }, "DART_DEFINES": { "A": false, "B": "X" } }"#,
    )
    .unwrap();

    bin()
        .args(["show", "--args", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--dart-define=A=false --dart-define=B=X"))
        .stdout(predicate::str::contains("-Pdart-defines=QT1mYWxzZQ==,Qj1Y"))
        .stdout(predicate::str::contains("build ios --config-only --no-codesign"))
        .stdout(predicate::str::contains("--flavor dev"));
}

#[test]
fn test_reflect_without_ios() {
    let dir = project();
    fs::write(
        dir.path().join("appsettings.json"),
        r#"{ "DART_DEFINES": { "ENV": "local" } }"#,
    )
    .unwrap();

    bin()
        .args(["reflect", "--no-ios", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Run configuration: created"))
        .stdout(predicate::str::contains("Android workspace: skipped"))
        .stdout(predicate::str::contains("Done reflecting settings."));

    let run = fs::read_to_string(dir.path().join(".run/main.dart.run.xml")).unwrap();
    assert!(run.contains("--dart-define=ENV=local"));
}

#[test]
fn test_reflect_invalid_settings() {
    let dir = project();
    fs::write(
        dir.path().join("appsettings.json"),
        r#"{ "DART_DEFINES": { "CFG": { "nested": true } } }"#,
    )
    .unwrap();

    bin()
        .args(["reflect", "--no-ios", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported value kind"));
}
