//! End-to-end resource propagation across modules.

use kodegen_bundler_resources::bundler::{
    BuildConfiguration, Platform, SettingsBuilder,
    archive::ZipArchiver,
    klib::ResourceMergeWalker,
    settings::AssetCompilerSettings,
    stage::{FollowUpKey, FollowUpRegistry, FrameworkLink, StageOrchestrator},
};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempDir;
use zip::{ZipWriter, write::SimpleFileOptions};

fn compiled_library(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{name}.klib"));
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    let options = SimpleFileOptions::default();
    zip.start_file("default/manifest", options).unwrap();
    zip.write_all(b"ignored=nested\n").unwrap();
    zip.start_file("manifest", options).unwrap();
    zip.write_all(format!("unique_name={name}\nabi_version=1.8.0\n").as_bytes())
        .unwrap();
    zip.finish().unwrap();
    path
}

fn library_with_resources(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(format!("{name}.klib"));
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    let options = SimpleFileOptions::default();
    zip.start_file("manifest", options).unwrap();
    zip.write_all(format!("unique_name={name}\n").as_bytes()).unwrap();
    for (file, content) in files {
        zip.start_file(format!("resources/{file}"), options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn module(
    root: &Path,
    name: &str,
    files: &[(&str, &[u8])],
    follow_ups: &Arc<FollowUpRegistry>,
) -> StageOrchestrator {
    let res = root.join(name).join("generated/res");
    std::fs::create_dir_all(&res).unwrap();
    for (file, content) in files {
        std::fs::write(res.join(file), content).unwrap();
    }
    let settings = SettingsBuilder::new()
        .resources_package(format!("com.example.{name}"))
        .platform(Platform::IosArm64)
        .generation_dir(&res)
        .asset_compiler(AssetCompilerSettings {
            program: "kodegen-missing-actool".into(),
            ..Default::default()
        })
        .build()
        .unwrap();
    StageOrchestrator::new(name, settings, Arc::new(ZipArchiver), Arc::clone(follow_ups))
}

#[tokio::test]
async fn upstream_resources_reach_downstream_framework() {
    let temp = TempDir::new().unwrap();
    let follow_ups = Arc::new(FollowUpRegistry::new());
    let icon: &[u8] = b"\x89PNG\r\n\x1a\nicon";

    let mut a = module(temp.path(), "a", &[("icon.png", icon)], &follow_ups);
    let a_lib = compiled_library(temp.path(), "a");
    a.on_compile_complete(&a_lib).await.unwrap();

    let mut b = module(temp.path(), "b", &[], &follow_ups);
    let b_lib = compiled_library(temp.path(), "b");
    b.on_compile_complete(&b_lib).await.unwrap();

    let b_out = temp.path().join("B.out");
    let report = b
        .on_framework_link_complete(
            FrameworkLink::new(&b_out, Platform::IosArm64, BuildConfiguration::Debug)
                .upstream([&a_lib]),
        )
        .await
        .unwrap();

    assert_eq!(report.merge.scanned, 2);
    assert_eq!(
        std::fs::read(b_out.join("a.bundle/Contents/Resources/icon.png")).unwrap(),
        icon
    );
    assert!(b_out.join("b.bundle/Contents/Info.plist").is_file());
    assert!(report.follow_up.is_none());
}

#[tokio::test]
async fn static_frameworks_for_same_target_register_one_follow_up() {
    let temp = TempDir::new().unwrap();
    let follow_ups = Arc::new(FollowUpRegistry::new());

    for name in ["first", "second"] {
        let mut stage = module(temp.path(), name, &[("strings.txt", b"s")], &follow_ups);
        stage
            .on_compile_complete(&compiled_library(temp.path(), name))
            .await
            .unwrap();
        stage
            .on_framework_link_complete(
                FrameworkLink::new(
                    temp.path().join(format!("{name}.framework")),
                    Platform::IosArm64,
                    BuildConfiguration::Release,
                )
                .static_framework(true),
            )
            .await
            .unwrap();
    }

    assert_eq!(follow_ups.len(), 1);
    let task = follow_ups
        .get(FollowUpKey::new(Platform::IosArm64, BuildConfiguration::Release))
        .unwrap();
    assert_eq!(task.name(), "copyFrameworkResourcesToAppReleaseIosArm64");
    assert_eq!(task.dependencies(), ["copyResourcesReleaseFrameworkIosArm64"]);
}

#[tokio::test]
async fn test_link_never_registers_follow_ups() {
    let temp = TempDir::new().unwrap();
    let follow_ups = Arc::new(FollowUpRegistry::new());
    let mut stage = module(temp.path(), "shared", &[("a.txt", b"a")], &follow_ups);
    stage
        .on_compile_complete(&compiled_library(temp.path(), "shared"))
        .await
        .unwrap();

    let out = temp.path().join("test.kexe.dir");
    let report = stage.on_test_link_complete(&out, &[]).await.unwrap();

    assert_eq!(report.with_resources, 1);
    assert!(out.join("shared.bundle/Contents/Resources/a.txt").is_file());
    assert!(follow_ups.is_empty());
}

#[tokio::test]
async fn disjoint_upstreams_merge_in_any_order() {
    let temp = TempDir::new().unwrap();
    let a = library_with_resources(temp.path(), "a", &[("a.bundle/x.txt", b"x")]);
    let b = library_with_resources(temp.path(), "b", &[("b.bundle/y.txt", b"y")]);
    let walker = ResourceMergeWalker::new(Arc::new(ZipArchiver), "klib");

    let forward = temp.path().join("forward");
    let backward = temp.path().join("backward");
    walker.merge_into(&forward, &[a.clone(), b.clone()]).await.unwrap();
    walker.merge_into(&backward, &[b, a]).await.unwrap();

    for out in [&forward, &backward] {
        assert_eq!(std::fs::read(out.join("a.bundle/x.txt")).unwrap(), b"x");
        assert_eq!(std::fs::read(out.join("b.bundle/y.txt")).unwrap(), b"y");
    }
}

#[tokio::test]
async fn overlapping_upstreams_keep_the_last_writer() {
    let temp = TempDir::new().unwrap();
    let a = library_with_resources(temp.path(), "a", &[("shared/theme.json", b"from a")]);
    let b = library_with_resources(temp.path(), "b", &[("shared/theme.json", b"from b")]);
    let walker = ResourceMergeWalker::new(Arc::new(ZipArchiver), "klib");
    let out = temp.path().join("out");

    walker.merge_into(&out, &[a.clone(), b.clone()]).await.unwrap();
    assert_eq!(std::fs::read(out.join("shared/theme.json")).unwrap(), b"from b");

    walker.merge_into(&out, &[b, a]).await.unwrap();
    assert_eq!(std::fs::read(out.join("shared/theme.json")).unwrap(), b"from a");
}

#[tokio::test]
async fn rerunning_a_link_merge_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let a = library_with_resources(temp.path(), "a", &[("a.bundle/x.txt", b"x")]);
    let walker = ResourceMergeWalker::new(Arc::new(ZipArchiver), "klib");
    let out = temp.path().join("out");

    let first = walker.merge_into(&out, std::slice::from_ref(&a)).await.unwrap();
    let second = walker.merge_into(&out, &[a]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(out.join("a.bundle/x.txt")).unwrap(), b"x");
}
