//! `portable` command: application source → single-file launcher.

use super::helpers::{
    apply_names, describe_settings, load_config, print_bundle_summary, require_input,
    settings_builder, target_arch,
};
use crate::bundler::{Bundler, PackageType};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

/// Execute portable command
pub(super) async fn execute_portable(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Portable { source, names } = &args.command else {
        unreachable!("execute_portable called with non-Portable command");
    };

    require_input(source).await?;
    let file = load_config(args).await?;

    let arch = target_arch(args)?;
    let settings = settings_builder(args, source)
        .package_settings(apply_names(file.package_settings(), names))
        .tools(file.tool_settings(arch))
        .arch(arch)
        .build()?;
    describe_settings(&settings, config);

    config.progress_println(&format!(
        "Building portable executable from {}...",
        settings.source().display()
    ));

    let bundler = Bundler::new(settings);
    let artifacts = bundler.bundle_types(&[PackageType::Portable]).await?;

    if let Some(artifact) = artifacts.first() {
        if let Some(executable) = artifact.paths.first() {
            config.success_println(&format!("Portable executable: {}", executable.display()));
        }
        if let Some(wrapper) = artifact.paths.get(1) {
            config.indent(&format!(
                "Run {} on a host with mksquashfs to produce an AppImage",
                wrapper.display()
            ));
        }
    }
    print_bundle_summary(&artifacts, config);
    Ok(0)
}
