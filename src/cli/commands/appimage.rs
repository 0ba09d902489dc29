//! `appimage` command: application source → `<name>-<arch>.AppImage`.

use super::helpers::{
    apply_names, describe_settings, load_config, print_bundle_summary, require_input,
    settings_builder, target_arch,
};
use crate::bundler::{BundleSettings, Bundler, PackageType};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

/// Execute appimage command
pub(super) async fn execute_appimage(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Appimage {
        source,
        names,
        icon,
        appimagetool_url,
        extract_and_run,
    } = &args.command
    else {
        unreachable!("execute_appimage called with non-Appimage command");
    };

    require_input(source).await?;
    if let Some(icon) = icon {
        require_input(icon).await?;
    }

    let file = load_config(args).await?;
    let arch = target_arch(args)?;

    let mut tools = file.tool_settings(arch);
    if let Some(url) = appimagetool_url {
        tools.appimagetool_url = url.clone();
    }
    tools.extract_and_run = *extract_and_run;

    let settings = settings_builder(args, source)
        .package_settings(apply_names(file.package_settings(), names))
        .bundle_settings(BundleSettings {
            exec_name: None,
            icon: icon.clone(),
        })
        .tools(tools)
        .arch(arch)
        .build()?;
    describe_settings(&settings, config);

    config.progress_println(&format!(
        "Building AppImage from {}...",
        settings.source().display()
    ));

    let bundler = Bundler::new(settings);
    let artifacts = bundler.bundle_types(&[PackageType::AppImage]).await?;

    if let Some(path) = artifacts.first().and_then(|a| a.paths.first()) {
        config.success_println(&format!("AppImage created: {}", path.display()));
    }
    print_bundle_summary(&artifacts, config);
    Ok(0)
}
