//! AppImage bundler - packages the application source with `appimagetool`.

use crate::bundler::{
    error::{Context, Error, Result},
    platform::linux::appdir::AppDir,
    settings::Settings,
    utils::{fs, tools},
};
use std::path::PathBuf;

/// Bundle project as AppImage.
///
/// # Process
///
/// 1. Assembles `<name>.AppDir` around the application source
/// 2. Fetches `appimagetool` into the build directory unless already cached
/// 3. Runs `appimagetool <AppDir> <name>-<arch>.AppImage` with `ARCH` set
/// 4. Fails with [`Error::MissingOutput`] if the AppImage was not written
///
/// # Returns
///
/// Vector containing the path to the generated .AppImage file.
pub async fn bundle_project(settings: &Settings) -> Result<Vec<PathBuf>> {
    let arch = settings.binary_arch();

    log::info!(
        "Building AppImage for {} {}",
        settings.product_name(),
        settings.version_string()
    );
    log::debug!("Using architecture: {}", arch.appimage_name());

    let build_dir = settings.build_directory();
    fs::create_dir_all(build_dir, false).await?;

    let app_dir = AppDir::assemble(settings, settings.source()).await?;
    log::debug!("Entry point installed as {}", app_dir.binary_path().display());

    let appimagetool = build_dir.join(format!("appimagetool-{}.AppImage", arch.appimage_name()));
    tools::fetch_tool(&settings.tools().appimagetool_url, &appimagetool)
        .await
        .context("failed to fetch appimagetool")?;

    let appimage_path = settings.appimage_path();
    fs::remove_file(&appimage_path).await?;

    tools::run_tool(
        &appimagetool,
        [app_dir.root().as_os_str(), appimage_path.as_os_str()],
        arch,
        settings.tools().extract_and_run,
    )
    .await?;

    if !fs::exists(&appimage_path).await {
        return Err(Error::MissingOutput {
            path: appimage_path,
        });
    }
    fs::set_executable(&appimage_path).await?;

    log::info!("✓ Created AppImage: {}", appimage_path.display());

    Ok(vec![appimage_path])
}
