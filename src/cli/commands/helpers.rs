//! Shared helper functions for command execution.

use crate::bundler::{Arch, BundledArtifact, PackageSettings, Settings, SettingsBuilder};
use crate::cli::{Args, RuntimeConfig, args::NameArgs};
use crate::config::ConfigFile;
use crate::error::{CliError, Result};
use std::path::Path;

/// Loads `--config` (or the default config file) for this invocation
pub(super) async fn load_config(args: &Args) -> Result<ConfigFile> {
    ConfigFile::load(args.config.as_deref()).await
}

/// Architecture selected with `--arch`
pub(super) fn target_arch(args: &Args) -> Result<Arch> {
    Ok(Arch::from_target(&args.arch)?)
}

/// Fails with [`CliError::InputNotFound`] unless `path` is an existing file
pub(super) async fn require_input(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(CliError::InputNotFound {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// Applies `--name` / `--display-name` over the configured package metadata
pub(super) fn apply_names(mut package: PackageSettings, names: &NameArgs) -> PackageSettings {
    if let Some(name) = &names.name {
        package.product_name = name.clone();
    }
    if let Some(display_name) = &names.display_name {
        package.display_name = display_name.clone();
    }
    package
}

/// Settings builder with the source and build directory already set
pub(super) fn settings_builder(args: &Args, source: &Path) -> SettingsBuilder {
    SettingsBuilder::new()
        .source(source)
        .build_directory(&args.build_dir)
}

/// Logs the settings a pipeline is about to run with
pub(super) fn describe_settings(settings: &Settings, config: &RuntimeConfig) {
    config.verbose_println(&format!(
        "{} {} ({}), exec `{}`",
        settings.display_name(),
        settings.version_string(),
        settings.binary_arch().appimage_name(),
        settings.exec_name()
    ));
    config.verbose_println(&format!(
        "Build directory: {}",
        settings.build_directory().display()
    ));
}

/// Print the artifacts created by a pipeline
pub(super) fn print_bundle_summary(artifacts: &[BundledArtifact], config: &RuntimeConfig) {
    if artifacts.is_empty() {
        config.warning_println("No artifacts were created");
        return;
    }

    let _ = config.output().section("Artifacts");
    for artifact in artifacts {
        config.println(&format!("  {}:", artifact.package_type));
        for path in &artifact.paths {
            config.indent(&format!("📦 {}", path.display()));
        }
        let size_mb = artifact.size as f64 / 1_048_576.0;
        config.indent(&format!("Size: {:.2} MB", size_mb));
        config.indent(&format!("🔐 SHA256: {}", artifact.checksum));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_names_overrides_only_given_values() {
        let names = NameArgs {
            name: Some("panel".into()),
            display_name: None,
        };
        let package = apply_names(PackageSettings::default(), &names);

        assert_eq!(package.product_name, "panel");
        assert_eq!(package.display_name, "Dockpanel");
    }

    #[tokio::test]
    async fn test_require_input_rejects_directories() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(require_input(tmp.path()).await.is_err());

        let file = tmp.path().join("dockpanel.py");
        std::fs::write(&file, "print('ok')\n").unwrap();
        assert!(require_input(&file).await.is_ok());
    }
}
