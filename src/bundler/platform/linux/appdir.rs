//! AppDir assembly.
//!
//! Lays out the directory tree consumed by AppImage tooling:
//!
//! ```text
//! <name>.AppDir/
//!   ├── AppRun                    execs usr/bin/<exec> "$@"
//!   ├── <exec>.desktop
//!   ├── <exec>.png
//!   ├── .DirIcon
//!   └── usr/
//!       ├── bin/<exec>
//!       └── share/{applications,icons/hicolor/...}
//! ```
//!
//! The previous AppDir is removed first. Any filesystem error aborts.

use crate::bundler::{
    error::Result,
    platform::linux::freedesktop::{self, DesktopEntry},
    resources::templates::{AppRunContext, Templates},
    settings::Settings,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// A fully assembled AppDir.
#[derive(Debug, Clone)]
pub struct AppDir {
    root: PathBuf,
    exec_name: String,
}

impl AppDir {
    /// Builds `settings.app_dir()` around `entry_point`.
    pub async fn assemble(settings: &Settings, entry_point: &Path) -> Result<Self> {
        let root = settings.app_dir();
        let exec_name = settings.exec_name();

        log::info!("Assembling {}", root.display());

        fs::create_dir_all(&root, true).await?;
        for dir in [
            "usr/bin",
            "usr/share/applications",
            "usr/share/icons/hicolor/256x256/apps",
            "usr/share/icons/hicolor/scalable/apps",
        ] {
            fs::create_dir_all(&root.join(dir), false).await?;
        }

        let binary = root.join("usr/bin").join(&exec_name);
        fs::copy_file(entry_point, &binary).await?;
        fs::set_executable(&binary).await?;

        DesktopEntry::from_settings(settings).install(&root).await?;
        freedesktop::install_icons(settings, &root).await?;

        let templates = Templates::new()?;
        let app_run = templates.app_run(&AppRunContext { exec: &exec_name })?;
        fs::write_executable(&root.join("AppRun"), app_run).await?;

        log::debug!(
            "AppDir {} holds {} files",
            root.display(),
            fs::count_files(&root)?
        );

        Ok(Self { root, exec_name })
    }

    /// Root of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The installed application binary, `usr/bin/<exec>`.
    pub fn binary_path(&self) -> PathBuf {
        self.root.join("usr/bin").join(&self.exec_name)
    }
}
