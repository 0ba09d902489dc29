//! Configuration structures for bundling operations.
//!
//! [`Settings`] is the immutable, validated view every pipeline reads from.
//! It is assembled with [`SettingsBuilder`] from the merged configuration file
//! and command line values.

use std::path::{Path, PathBuf};

/// Release channel the AppImage tools are fetched from.
pub const APPIMAGEKIT_RELEASE_URL: &str =
    "https://github.com/AppImage/AppImageKit/releases/download/continuous";

/// CPU architecture the AppImage is built for.
///
/// The architecture decides the tool download names (`appimagetool-<arch>.AppImage`,
/// `runtime-<arch>`), the `ARCH` variable handed to the tools and the output
/// file suffix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    X86_64,
    /// x86 / i686 (32-bit)
    X86,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
    /// ARM with hard-float (32-bit)
    Armhf,
}

impl Arch {
    /// Name used by AppImageKit for this architecture.
    pub fn appimage_name(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::X86 => "i686",
            Arch::AArch64 => "aarch64",
            Arch::Armhf => "armhf",
        }
    }

    /// Detects the architecture from a target triple or an `ARCH`-style name.
    pub fn from_target(target: &str) -> crate::bundler::Result<Self> {
        if target.starts_with("x86_64") || target == "amd64" {
            Ok(Arch::X86_64)
        } else if target.starts_with("i686") || target.starts_with("i386") || target == "x86" {
            Ok(Arch::X86)
        } else if target.starts_with("aarch64") || target == "arm64" {
            Ok(Arch::AArch64)
        } else if target.starts_with("arm") && target.ends_with("hf") {
            Ok(Arch::Armhf)
        } else {
            Err(crate::bundler::Error::ArchError(target.to_string()))
        }
    }
}

/// Package metadata shared by every pipeline.
#[derive(Debug, Clone)]
pub struct PackageSettings {
    /// Base name of the produced artifacts (`<name>.AppDir`, `<name>-x86_64.AppImage`).
    pub product_name: String,

    /// Human-readable name written to the desktop entry.
    pub display_name: String,

    /// Version string, reported in logs and summaries.
    pub version: String,

    /// One-line description used as the desktop entry `Comment`.
    pub comment: String,

    /// Desktop menu categories, without trailing separators.
    pub categories: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            product_name: "dockpanel".into(),
            display_name: "Dockpanel".into(),
            version: "2.0.0".into(),
            comment: "Universal System Management Tool".into(),
            categories: vec!["System".into(), "Settings".into()],
        }
    }
}

impl PackageSettings {
    /// Display name with every character outside `[A-Za-z0-9._-]` replaced by `-`.
    ///
    /// Names the AppImage produced from a portable executable.
    pub fn display_file_name(&self) -> String {
        self.display_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

/// How the application is laid out inside the bundle.
#[derive(Debug, Clone, Default)]
pub struct BundleSettings {
    /// Basename of the installed binary in `usr/bin`.
    ///
    /// Default: None (the lower-cased product name)
    pub exec_name: Option<String>,

    /// Raster icon that replaces the generated placeholder.
    ///
    /// Default: None (placeholder icon is rendered)
    pub icon: Option<PathBuf>,
}

/// Locations of the external packaging tools.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Download URL of `appimagetool`.
    pub appimagetool_url: String,

    /// Download URL of the AppImage type 2 runtime.
    pub runtime_url: String,

    /// `mksquashfs` binary. Looked up on `PATH` when not set.
    pub mksquashfs: Option<PathBuf>,

    /// Pass `APPIMAGE_EXTRACT_AND_RUN=1` so AppImage tools run without FUSE.
    pub extract_and_run: bool,
}

impl ToolSettings {
    /// Default tool locations for the given architecture.
    pub fn for_arch(arch: Arch) -> Self {
        Self {
            appimagetool_url: format!(
                "{}/appimagetool-{}.AppImage",
                APPIMAGEKIT_RELEASE_URL,
                arch.appimage_name()
            ),
            runtime_url: format!("{}/runtime-{}", APPIMAGEKIT_RELEASE_URL, arch.appimage_name()),
            mksquashfs: None,
            extract_and_run: false,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::for_arch(Arch::default())
    }
}

/// The main bundler settings.
///
/// # See Also
///
/// - [`SettingsBuilder`] - Builder for constructing Settings
#[derive(Clone, Debug)]
pub struct Settings {
    package: PackageSettings,
    bundle_settings: BundleSettings,
    tools: ToolSettings,

    /// File that is packaged: the application source or a portable executable.
    source: PathBuf,

    /// Working directory for AppDirs, staging files, tool caches and outputs.
    build_directory: PathBuf,

    arch: Arch,
}

impl Settings {
    /// Returns the product name used for artifact file names.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the display name used in the desktop entry.
    pub fn display_name(&self) -> &str {
        &self.package.display_name
    }

    /// Display name reduced to characters that are safe in file names.
    pub fn display_file_name(&self) -> String {
        self.package.display_file_name()
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Returns the desktop entry comment.
    pub fn comment(&self) -> &str {
        &self.package.comment
    }

    /// Returns the desktop menu categories.
    pub fn categories(&self) -> &[String] {
        &self.package.categories
    }

    /// Basename of the installed binary; also the desktop `Exec` and `Icon` value.
    pub fn exec_name(&self) -> String {
        self.bundle_settings
            .exec_name
            .clone()
            .unwrap_or_else(|| self.package.product_name.to_lowercase())
    }

    /// Returns the file being packaged.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the build directory.
    pub fn build_directory(&self) -> &Path {
        &self.build_directory
    }

    /// Returns the target architecture.
    pub fn binary_arch(&self) -> Arch {
        self.arch
    }

    /// Returns the bundle settings.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Returns the tool settings.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Settings that wrap `portable` into `<display name>-<arch>.AppImage`.
    ///
    /// The exec name stays the same, so the AppDir binary keeps the portable
    /// executable's file name.
    pub fn wrapping(&self, portable: PathBuf) -> Settings {
        let mut wrapped = self.clone();
        wrapped.bundle_settings.exec_name = Some(self.exec_name());
        wrapped.package.product_name = self.display_file_name();
        wrapped.source = portable;
        wrapped
    }

    /// Path of the AppDir assembled for this product.
    pub fn app_dir(&self) -> PathBuf {
        self.build_directory
            .join(format!("{}.AppDir", self.package.product_name))
    }

    /// Path of the final AppImage (`<name>-<arch>.AppImage`).
    pub fn appimage_path(&self) -> PathBuf {
        self.build_directory.join(format!(
            "{}-{}.AppImage",
            self.package.product_name,
            self.arch.appimage_name()
        ))
    }
}

/// Builder for constructing [`Settings`].
///
/// ```no_run
/// use dockpanel_bundler::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> dockpanel_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source("dockpanel.py")
///     .build_directory("build")
///     .package_settings(PackageSettings::default())
///     .build()?;
/// assert_eq!(settings.exec_name(), "dockpanel");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    package_settings: Option<PackageSettings>,
    bundle_settings: BundleSettings,
    tools: Option<ToolSettings>,
    source: Option<PathBuf>,
    build_directory: Option<PathBuf>,
    arch: Option<Arch>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the file to package.
    ///
    /// # Required
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build directory.
    ///
    /// # Required
    pub fn build_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets package metadata.
    ///
    /// Default: [`PackageSettings::default`]
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets bundle layout settings.
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Sets tool locations.
    ///
    /// Default: AppImageKit continuous release for the target architecture
    pub fn tools(mut self, tools: ToolSettings) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sets the target architecture.
    ///
    /// Default: [`Arch::X86_64`]
    pub fn arch(mut self, arch: Arch) -> Self {
        self.arch = Some(arch);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` or `build_directory` is missing, or if a
    /// name would escape the build directory.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let arch = self.arch.unwrap_or_default();
        let package = self.package_settings.unwrap_or_default();

        validate_file_name("product name", &package.product_name)?;
        for (what, value) in [
            ("display name", &package.display_name),
            ("version", &package.version),
            ("comment", &package.comment),
        ] {
            if value.chars().any(char::is_control) {
                crate::bail!("{} must be a single line without control characters", what);
            }
        }
        if let Some(exec) = &self.bundle_settings.exec_name {
            validate_file_name("executable name", exec)?;
        }

        Ok(Settings {
            package,
            bundle_settings: self.bundle_settings,
            tools: self.tools.unwrap_or_else(|| ToolSettings::for_arch(arch)),
            source: self.source.context("source is required")?,
            build_directory: self
                .build_directory
                .context("build_directory is required")?,
            arch,
        })
    }
}

// Names end up in paths and unquoted shell words, so keep them to a safe alphabet.
fn validate_file_name(what: &str, name: &str) -> crate::bundler::Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if name.is_empty() || !valid_chars || name.starts_with('.') {
        crate::bail!(
            "invalid {} {:?}: use letters, digits, '-', '_' and '.' only",
            what,
            name
        );
    }
    Ok(())
}
