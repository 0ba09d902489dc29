//! Configuration file loading.
//!
//! Values are layered: built-in defaults, then `dockpanel-bundle.toml` (or the
//! file named by `--config`), then command line flags and environment. This
//! module handles the first two layers; the CLI applies the last one before
//! handing everything to [`SettingsBuilder`](crate::bundler::SettingsBuilder).

use crate::bundler::{Arch, PackageSettings, ToolSettings};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dockpanel-bundle.toml";

/// Parsed `dockpanel-bundle.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// `[package]` table
    #[serde(default)]
    pub package: PackageSection,

    /// `[tools]` table
    #[serde(default)]
    pub tools: ToolsSection,
}

/// `[package]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    /// Base name of the AppDir and AppImage
    pub name: Option<String>,
    /// Desktop entry `Name`
    pub display_name: Option<String>,
    /// Version string
    pub version: Option<String>,
    /// Desktop entry `Comment`
    pub comment: Option<String>,
    /// Desktop entry `Categories`
    pub categories: Option<Vec<String>>,
}

/// `[tools]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    /// Download URL of appimagetool
    pub appimagetool_url: Option<String>,
    /// Download URL of the AppImage runtime
    pub runtime_url: Option<String>,
    /// mksquashfs binary
    pub mksquashfs: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads the config file.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in the
    /// working directory is used when present and defaults otherwise.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !tokio::fs::try_exists(&default).await.unwrap_or(false) {
                    log::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        log::debug!("Loaded configuration from {}", path.display());
        Self::parse(&text, &path)
    }

    /// Parses config text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Package metadata with file values over the defaults.
    pub fn package_settings(&self) -> PackageSettings {
        let defaults = PackageSettings::default();
        let section = self.package.clone();
        PackageSettings {
            product_name: section.name.unwrap_or(defaults.product_name),
            display_name: section.display_name.unwrap_or(defaults.display_name),
            version: section.version.unwrap_or(defaults.version),
            comment: section.comment.unwrap_or(defaults.comment),
            categories: section.categories.unwrap_or(defaults.categories),
        }
    }

    /// Tool locations with file values over the defaults for `arch`.
    pub fn tool_settings(&self, arch: Arch) -> ToolSettings {
        let defaults = ToolSettings::for_arch(arch);
        let section = self.tools.clone();
        ToolSettings {
            appimagetool_url: section.appimagetool_url.unwrap_or(defaults.appimagetool_url),
            runtime_url: section.runtime_url.unwrap_or(defaults.runtime_url),
            mksquashfs: section.mksquashfs.or(defaults.mksquashfs),
            extract_and_run: defaults.extract_and_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackagerError;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ConfigFile::parse("", Path::new("x.toml")).unwrap();
        let package = config.package_settings();

        assert_eq!(package.product_name, "dockpanel");
        assert_eq!(package.display_name, "Dockpanel");
        assert_eq!(
            config.tool_settings(Arch::X86_64).runtime_url,
            "https://github.com/AppImage/AppImageKit/releases/download/continuous/runtime-x86_64"
        );
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = ConfigFile::parse(
            r#"
            [package]
            name = "panel"
            categories = ["Utility"]

            [tools]
            mksquashfs = "/opt/squashfs/bin/mksquashfs"
            "#,
            Path::new("x.toml"),
        )
        .unwrap();

        let package = config.package_settings();
        assert_eq!(package.product_name, "panel");
        assert_eq!(package.display_name, "Dockpanel");
        assert_eq!(package.categories, vec!["Utility".to_string()]);
        assert_eq!(
            config.tool_settings(Arch::X86_64).mksquashfs,
            Some(PathBuf::from("/opt/squashfs/bin/mksquashfs"))
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ConfigFile::parse("[package]\nnmae = \"typo\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(
            err,
            PackagerError::Config(ConfigError::Parse { .. })
        ));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_an_error() {
        let err = ConfigFile::load(Some(Path::new("/nonexistent/dockpanel-bundle.toml")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackagerError::Config(ConfigError::NotFound { .. })
        ));
    }
}
