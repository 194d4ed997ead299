//! CLI integration tests against the real binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::{fs, io::Write, path::Path};
use tempfile::TempDir;
use zip::{ZipWriter, write::SimpleFileOptions};

#[allow(deprecated)]
fn resources_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_resources").unwrap();
    cmd.current_dir(dir);
    cmd
}

/// Workspace with the fixture config and a populated generation root.
fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/resources.toml"),
        temp.path().join("resources.toml"),
    )
    .unwrap();
    fs::create_dir_all(temp.path().join("res")).unwrap();
    fs::write(temp.path().join("res/icon.png"), b"png").unwrap();
    temp
}

fn library(path: &Path, manifest: &str) {
    let mut zip = ZipWriter::new(fs::File::create(path).unwrap());
    zip.start_file("manifest", SimpleFileOptions::default()).unwrap();
    zip.write_all(manifest.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[test]
fn help_lists_lifecycle_hooks() {
    let temp = TempDir::new().unwrap();
    resources_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compile-complete"))
        .stdout(predicate::str::contains("framework-link"))
        .stdout(predicate::str::contains("test-link"));
}

#[test]
fn test_link_without_upstream_succeeds() {
    let temp = workspace();
    resources_cmd(temp.path())
        .args(["test-link", "--output-dir", "test.kexe.dir"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 file(s) from 0 of 0 libraries"));
}

#[test]
fn compile_then_static_framework_link_persists_follow_up() {
    let temp = workspace();
    library(&temp.path().join("shared.klib"), "unique_name=shared\n");

    resources_cmd(temp.path())
        .args(["compile-complete", "--artifact", "shared.klib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resources/shared.bundle"));

    resources_cmd(temp.path())
        .args([
            "framework-link",
            "--output-dir",
            "shared.framework",
            "--artifact",
            "shared.klib",
            "--static",
            "--configuration",
            "Release",
            "--follow-ups",
            "follow-ups.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "copyFrameworkResourcesToAppReleaseIosArm64 -> copyResourcesReleaseFrameworkIosArm64",
        ));

    assert_eq!(
        fs::read(temp.path().join("shared.framework/shared.bundle/Contents/Resources/icon.png"))
            .unwrap(),
        b"png"
    );
    let follow_ups: serde_json::Value =
        serde_json::from_slice(&fs::read(temp.path().join("follow-ups.json")).unwrap()).unwrap();
    assert_eq!(follow_ups[0]["platform"], "iosArm64");
    assert_eq!(follow_ups[0]["configuration"], "Release");
    assert_eq!(
        follow_ups[0]["depends_on"][0],
        "copyResourcesReleaseFrameworkIosArm64"
    );
}

#[test]
fn malformed_manifest_exits_with_error() {
    let temp = workspace();
    library(&temp.path().join("broken.klib"), "abi_version=1\n");

    resources_cmd(temp.path())
        .args(["compile-complete", "--artifact", "broken.klib"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("unique_name"));
}

#[test]
fn missing_package_is_reported() {
    let temp = TempDir::new().unwrap();
    resources_cmd(temp.path())
        .args([
            "test-link",
            "--output-dir",
            "out",
            "--platform",
            "iosArm64",
            "--generation-dir",
            ".",
        ])
        .env_remove("KODEGEN_RESOURCES_PACKAGE")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("resources_package is required"));
}
