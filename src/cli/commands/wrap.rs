//! `wrap` command: portable executable → `<Name>-<arch>.AppImage`.

use super::helpers::{
    describe_settings, load_config, print_bundle_summary, require_input, target_arch,
};
use crate::bundler::{BundleSettings, Bundler, PackageType, SettingsBuilder};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, Result};

/// Execute wrap command
pub(super) async fn execute_wrap(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Wrap {
        portable,
        name,
        exec,
        icon,
        runtime_url,
        mksquashfs,
    } = &args.command
    else {
        unreachable!("execute_wrap called with non-Wrap command");
    };

    let file = load_config(args).await?;
    let arch = target_arch(args)?;
    let mut package = file.package_settings();

    let portable = match portable {
        Some(path) => path.clone(),
        // Where the portable command writes with the same configuration.
        None => args
            .build_dir
            .join("portable")
            .join(package.product_name.to_lowercase()),
    };
    require_input(&portable).await?;
    if let Some(icon) = icon {
        require_input(icon).await?;
    }

    let exec_name = match exec {
        Some(exec) => exec.clone(),
        None => portable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::InvalidArguments {
                reason: format!("{} has no file name", portable.display()),
            })?,
    };
    package.product_name = name.clone().unwrap_or_else(|| package.display_file_name());

    let mut tools = file.tool_settings(arch);
    if let Some(url) = runtime_url {
        tools.runtime_url = url.clone();
    }
    if let Some(path) = mksquashfs {
        tools.mksquashfs = Some(path.clone());
    }

    let settings = SettingsBuilder::new()
        .source(&portable)
        .build_directory(&args.build_dir)
        .package_settings(package)
        .bundle_settings(BundleSettings {
            exec_name: Some(exec_name),
            icon: icon.clone(),
        })
        .tools(tools)
        .arch(arch)
        .build()?;
    describe_settings(&settings, config);

    config.progress_println(&format!(
        "Wrapping {} into an AppImage...",
        settings.source().display()
    ));

    let bundler = Bundler::new(settings);
    let artifacts = bundler.bundle_types(&[PackageType::WrappedAppImage]).await?;

    if let Some(path) = artifacts.first().and_then(|a| a.paths.first()) {
        config.success_println(&format!("AppImage created: {}", path.display()));
    }
    print_bundle_summary(&artifacts, config);
    Ok(0)
}
