//! FreeDesktop.org desktop entry and icon theme integration.
//!
//! Writes the `.desktop` file and installs icons into the hicolor theme
//! layout inside an AppDir:
//!
//! ```text
//! <AppDir>/
//!   ├── <exec>.desktop
//!   ├── <exec>.png              root icon picked up by AppImage tools
//!   ├── .DirIcon -> <exec>.png
//!   └── usr/share/
//!       ├── applications/<exec>.desktop
//!       └── icons/hicolor/
//!           ├── 256x256/apps/<exec>.png
//!           └── scalable/apps/<exec>.svg
//! ```

use crate::bundler::{
    error::Result,
    resources::icons::{self, RASTER_ICON_SIZE},
    settings::Settings,
    utils::fs,
};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// A `[Desktop Entry]` for an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    /// `Name`, shown in menus.
    pub name: String,
    /// `Comment`.
    pub comment: String,
    /// Must equal the basename of the installed binary.
    pub exec: String,
    /// Icon name, without extension.
    pub icon: String,
    /// `Categories`, written `;`-terminated.
    pub categories: Vec<String>,
    /// `Terminal`.
    pub terminal: bool,
}

impl DesktopEntry {
    /// Builds the entry for the packaged application.
    pub fn from_settings(settings: &Settings) -> Self {
        let exec = settings.exec_name();
        Self {
            name: settings.display_name().to_string(),
            comment: settings.comment().to_string(),
            icon: exec.clone(),
            exec,
            categories: settings.categories().to_vec(),
            terminal: false,
        }
    }

    /// File name of the entry, `<exec>.desktop`.
    pub fn file_name(&self) -> String {
        format!("{}.desktop", self.exec)
    }

    /// Writes the entry to the AppDir root and to `usr/share/applications`.
    pub async fn install(&self, app_dir: &Path) -> Result<Vec<PathBuf>> {
        let content = self.to_string();
        let root = app_dir.join(self.file_name());
        let shared = app_dir
            .join("usr/share/applications")
            .join(self.file_name());

        for path in [&root, &shared] {
            fs::write_file(path, &content).await?;
        }
        Ok(vec![root, shared])
    }
}

impl fmt::Display for DesktopEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Desktop Entry]")?;
        writeln!(f, "Type=Application")?;
        writeln!(f, "Name={}", escape_value(&self.name))?;
        writeln!(f, "Comment={}", escape_value(&self.comment))?;
        writeln!(f, "Exec={}", self.exec)?;
        writeln!(f, "Icon={}", self.icon)?;
        write!(f, "Categories=")?;
        for category in &self.categories {
            write!(f, "{};", escape_value(category))?;
        }
        writeln!(f)?;
        writeln!(f, "Terminal={}", self.terminal)
    }
}

// Desktop entry string escapes; `;` is the list separator.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ';' => out.push_str("\\;"),
            c => out.push(c),
        }
    }
    out
}

/// Installs the application icon into `app_dir`.
///
/// Always writes the vector placeholder into `scalable/apps`. The raster icon
/// is the configured icon resized to [`RASTER_ICON_SIZE`], or the rasterized
/// placeholder. Returns the path of the root raster icon.
pub async fn install_icons(settings: &Settings, app_dir: &Path) -> Result<PathBuf> {
    let exec = settings.exec_name();

    let svg_path = app_dir
        .join("usr/share/icons/hicolor/scalable/apps")
        .join(format!("{exec}.svg"));
    fs::write_file(&svg_path, icons::placeholder_svg()).await?;

    let raster = match &settings.bundle_settings().icon {
        Some(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || {
                icons::load_and_resize(&path, RASTER_ICON_SIZE, RASTER_ICON_SIZE)
            })
            .await
            .map_err(|e| {
                crate::bundler::Error::GenericError(format!("Icon resize task failed: {e}"))
            })??
        }
        None => icons::placeholder_raster(RASTER_ICON_SIZE),
    };
    let png = icons::encode_png(&raster)?;

    let sized_path = app_dir
        .join(format!(
            "usr/share/icons/hicolor/{0}x{0}/apps",
            RASTER_ICON_SIZE
        ))
        .join(format!("{exec}.png"));
    let root_path = app_dir.join(format!("{exec}.png"));

    fs::write_file(&sized_path, &png).await?;
    fs::write_file(&root_path, &png).await?;

    #[cfg(unix)]
    fs::symlink_file(Path::new(&format!("{exec}.png")), &app_dir.join(".DirIcon")).await?;

    log::debug!(
        "Installed icons for {} ({} bytes PNG)",
        exec,
        png.len()
    );
    Ok(root_path)
}
