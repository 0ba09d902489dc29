//! Platform-specific bundling implementations.
//!
//! Every output of this tool targets Linux desktops, so the only platform
//! module is [`linux`]. It is compiled on every host; the subprocesses it
//! drives (`appimagetool`, `mksquashfs`) decide whether a build can succeed.
//!
//! # Bundling Order
//!
//! [`PackageType::WrappedAppImage`] consumes the portable executable, so when
//! both are requested the portable build runs first. The
//! [`PackageType::priority()`] method ensures that order.

pub mod linux;

use std::fmt;

/// Supported package types for bundling.
///
/// # Examples
///
/// ```no_run
/// use dockpanel_bundler::bundler::PackageType;
///
/// for pkg_type in PackageType::all() {
///     println!("Creating {} package", pkg_type);
/// }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum PackageType {
    /// AppImage built from the application source with `appimagetool`.
    AppImage,

    /// Single-file portable executable plus the `make-appimage.sh` generator.
    Portable,

    /// AppImage assembled from a portable executable with the type 2 runtime
    /// and `mksquashfs`.
    ///
    /// Requires [`Portable`](Self::Portable) output to exist first.
    WrappedAppImage,
}

impl PackageType {
    /// Returns the short name for this package type.
    ///
    /// This is the lowercase identifier used in CLI output.
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageType::AppImage => "appimage",
            PackageType::Portable => "portable",
            PackageType::WrappedAppImage => "wrapped-appimage",
        }
    }

    /// Returns the priority for bundling order.
    ///
    /// Lower numbers are bundled first.
    ///
    /// - `0`: Independent packages (appimage, portable)
    /// - `1`: Dependent packages (wrapped-appimage - requires portable)
    pub fn priority(&self) -> u32 {
        match self {
            PackageType::AppImage => 0,
            PackageType::Portable => 0,
            PackageType::WrappedAppImage => 1,
        }
    }

    /// Returns every package type.
    pub fn all() -> Vec<PackageType> {
        vec![
            PackageType::AppImage,
            PackageType::Portable,
            PackageType::WrappedAppImage,
        ]
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
