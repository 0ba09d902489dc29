//! Finalizer pipeline: portable executable → runtime ‖ squashfs.

#![cfg(unix)]

mod common;

use common::{STUB_SOURCE, offline_tools, settings, wrap_settings, write_script};
use dockpanel_bundler::bundler::{Bundler, Error, PackageType, SettingsBuilder, portable_path};
use std::os::unix::fs::PermissionsExt;
use std::process::Command;

const RUNTIME_BYTES: &[u8] = b"\x7fELF-fake-runtime\x00\x01\x02";

// Writes a squashfs-looking file after checking the flags it is given.
const FAKE_MKSQUASHFS: &str = r#"#!/bin/sh
[ -x "$1/AppRun" ] || exit 8
[ "$3" = "-root-owned" ] && [ "$4" = "-noappend" ] || exit 7
printf 'hsqs-payload' > "$2"
"#;

async fn build_portable(tmp: &std::path::Path) -> anyhow::Result<std::path::PathBuf> {
    let source = tmp.join("dockpanel.py");
    std::fs::write(&source, STUB_SOURCE)?;
    let settings = settings(&source, &tmp.join("build"));
    Bundler::new(settings.clone())
        .bundle_types(&[PackageType::Portable])
        .await?;
    Ok(portable_path(&settings))
}

#[tokio::test]
async fn test_runtime_is_strict_prefix_of_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let build = tmp.path().join("build");
    let portable = build_portable(tmp.path()).await?;

    std::fs::write(build.join("runtime-x86_64"), RUNTIME_BYTES)?;
    let mksquashfs = tmp.path().join("tools/mksquashfs");
    write_script(&mksquashfs, FAKE_MKSQUASHFS);

    let artifacts = Bundler::new(wrap_settings(&portable, &build, &mksquashfs))
        .bundle_types(&[PackageType::WrappedAppImage])
        .await?;

    let output = build.join("Dockpanel-x86_64.AppImage");
    assert_eq!(artifacts[0].paths, vec![output.clone()]);

    let bytes = std::fs::read(&output)?;
    assert!(bytes.len() > RUNTIME_BYTES.len());
    assert!(bytes.starts_with(RUNTIME_BYTES));
    assert_eq!(&bytes[RUNTIME_BYTES.len()..], b"hsqs-payload");

    let mode = std::fs::metadata(&output)?.permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert!(!build.join("Dockpanel.squashfs").exists());

    // The AppDir holds the portable executable under the exec name.
    assert_eq!(
        std::fs::read(build.join("Dockpanel.AppDir/usr/bin/dockpanel"))?,
        std::fs::read(&portable)?
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_squashfs_output_fails() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let build = tmp.path().join("build");
    let portable = build_portable(tmp.path()).await?;

    std::fs::write(build.join("runtime-x86_64"), RUNTIME_BYTES)?;
    let mksquashfs = tmp.path().join("tools/mksquashfs");
    write_script(&mksquashfs, "#!/bin/sh\nexit 0\n");

    let err = Bundler::new(wrap_settings(&portable, &build, &mksquashfs))
        .bundle_types(&[PackageType::WrappedAppImage])
        .await
        .unwrap_err();

    assert!(err.is_postcondition_failure());
    assert!(!build.join("Dockpanel-x86_64.AppImage").exists());
    Ok(())
}

#[tokio::test]
async fn test_unknown_mksquashfs_is_reported() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let build = tmp.path().join("build");
    let portable = build_portable(tmp.path()).await?;
    std::fs::write(build.join("runtime-x86_64"), RUNTIME_BYTES)?;

    let err = Bundler::new(wrap_settings(
        &portable,
        &build,
        std::path::Path::new("no-such-mksquashfs-binary"),
    ))
    .bundle_types(&[PackageType::WrappedAppImage])
    .await
    .unwrap_err();

    assert!(matches!(err.root(), Error::ToolNotFound(name) if name == "no-such-mksquashfs-binary"));
    Ok(())
}

#[tokio::test]
async fn test_portable_and_wrap_in_one_run() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let build = tmp.path().join("build");
    let source = tmp.path().join("dockpanel.py");
    std::fs::write(&source, STUB_SOURCE)?;

    std::fs::create_dir_all(&build)?;
    std::fs::write(build.join("runtime-x86_64"), RUNTIME_BYTES)?;
    let mksquashfs = tmp.path().join("tools/mksquashfs");
    write_script(&mksquashfs, FAKE_MKSQUASHFS);

    let settings = SettingsBuilder::new()
        .source(&source)
        .build_directory(&build)
        .tools(offline_tools(Some(mksquashfs)))
        .build()?;

    let artifacts = Bundler::new(settings.clone())
        .bundle_types(&[PackageType::WrappedAppImage, PackageType::Portable])
        .await?;

    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].package_type, PackageType::Portable);
    assert_eq!(artifacts[1].package_type, PackageType::WrappedAppImage);

    let output = build.join("Dockpanel-x86_64.AppImage");
    assert_eq!(artifacts[1].paths, vec![output.clone()]);
    assert!(std::fs::read(&output)?.starts_with(RUNTIME_BYTES));
    assert!(!build.join("dockpanel-x86_64.AppImage").exists());

    // The wrapped binary is the portable executable, not the raw source.
    let wrapped = std::fs::read(build.join("Dockpanel.AppDir/usr/bin/dockpanel"))?;
    assert_eq!(wrapped, std::fs::read(portable_path(&settings))?);
    assert_ne!(wrapped, STUB_SOURCE.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_generated_wrapper_script_builds_appimage() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let portable = build_portable(tmp.path()).await?;
    let portable_dir = portable.parent().expect("portable directory");

    let script_build = portable_dir.join("appimage-build");
    std::fs::create_dir_all(&script_build)?;
    std::fs::write(script_build.join("runtime-x86_64"), RUNTIME_BYTES)?;
    let bin = tmp.path().join("bin");
    write_script(&bin.join("mksquashfs"), FAKE_MKSQUASHFS);

    let output = Command::new(portable_dir.join("make-appimage.sh"))
        .env("PATH", format!("{}:/usr/bin:/bin", bin.display()))
        .env_remove("BUILD_DIR")
        .output()?;
    assert!(output.status.success(), "{output:?}");

    let appimage = script_build.join("Dockpanel-x86_64.AppImage");
    let bytes = std::fs::read(&appimage)?;
    assert!(bytes.starts_with(RUNTIME_BYTES));
    assert_eq!(&bytes[RUNTIME_BYTES.len()..], b"hsqs-payload");
    assert!(!script_build.join("Dockpanel.squashfs").exists());

    let app_dir = script_build.join("Dockpanel.AppDir");
    assert_eq!(std::fs::read(app_dir.join("usr/bin/dockpanel"))?, std::fs::read(&portable)?);
    let desktop = std::fs::read_to_string(app_dir.join("dockpanel.desktop"))?;
    assert!(desktop.lines().any(|l| l == "Exec=dockpanel"));
    Ok(())
}
