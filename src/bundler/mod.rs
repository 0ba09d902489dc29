//! Packaging pipelines for Dockpanel.
//!
//! This module turns a single application file into Linux deliverables:
//! an AppImage built with `appimagetool`, a single-file portable executable,
//! and an AppImage assembled directly from that portable executable.
//!
//! # Configuration
//!
//! Pipelines read a validated [`Settings`] built with [`SettingsBuilder`]:
//!
//! ```no_run
//! use dockpanel_bundler::bundler::{Bundler, PackageType, SettingsBuilder};
//!
//! # async fn example() -> dockpanel_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .source("dockpanel.py")
//!     .build_directory("build")
//!     .build()?;
//!
//! let bundler = Bundler::new(settings);
//! let artifacts = bundler.bundle_types(&[PackageType::Portable]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Formats
//!
//! | Type | Input | Output |
//! |------|-------|--------|
//! | [`PackageType::AppImage`] | application source | `<name>-<arch>.AppImage` |
//! | [`PackageType::Portable`] | application source | `portable/<exec>`, `portable/make-appimage.sh` |
//! | [`PackageType::WrappedAppImage`] | portable executable | `<Name>-<arch>.AppImage` |

#![warn(missing_docs)]

mod builder;
mod error;
pub(crate) mod platform;
pub mod resources;
mod settings;
pub(crate) mod utils;

// Public re-exports
pub use builder::Bundler;
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::PackageType;
pub use platform::linux::{
    finalize::{AppImageReport, inspect},
    portable::{compose, extract_payload, portable_path, split},
};
pub use settings::{
    APPIMAGEKIT_RELEASE_URL, Arch, BundleSettings, PackageSettings, Settings, SettingsBuilder,
    ToolSettings,
};
pub use utils::tools::FetchOutcome;

/// A bundled artifact result.
///
/// # Fields
///
/// - `package_type`: The pipeline that created the artifact
/// - `paths`: All files created as part of this bundle (main artifact first)
/// - `size`: Total size of all files in bytes
/// - `checksum`: SHA-256 checksum of the main artifact
///
/// # Examples
///
/// ```no_run
/// use dockpanel_bundler::bundler::{Bundler, PackageType, Settings};
///
/// # async fn example(settings: Settings) -> dockpanel_bundler::bundler::Result<()> {
/// let bundler = Bundler::new(settings);
/// let artifacts = bundler.bundle_types(&[PackageType::AppImage]).await?;
///
/// for artifact in artifacts {
///     println!("Created {}: {} bytes", artifact.package_type, artifact.size);
///     println!("SHA256: {}", artifact.checksum);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// The package type that was created.
    pub package_type: PackageType,

    /// Paths to all files created as part of this bundle.
    pub paths: Vec<std::path::PathBuf>,

    /// Total size of the created files in bytes.
    pub size: u64,

    /// SHA-256 checksum of the main artifact for integrity verification.
    pub checksum: String,
}
