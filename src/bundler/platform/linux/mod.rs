//! Linux bundling support: AppImages and the portable launcher.
//!
//! # Pipelines
//!
//! - [`appimage`]: application source → AppDir → `appimagetool`
//! - [`portable`]: application source → self-extracting shell launcher
//! - [`finalize`]: portable executable → AppDir → `mksquashfs` → runtime ‖ squashfs
//!
//! # Build Requirements
//!
//! | Pipeline | Required Tools |
//! |----------|----------------|
//! | appimage | `appimagetool` (downloaded and cached) |
//! | portable | none |
//! | wrap | AppImage runtime (downloaded and cached), `mksquashfs` |
//!
//! # Output Location
//!
//! Everything lives below the build directory:
//! - `build/dockpanel.AppDir/`, `build/dockpanel-x86_64.AppImage`
//! - `build/portable/dockpanel`, `build/portable/make-appimage.sh`
//! - `build/appimagetool-x86_64.AppImage`, `build/runtime-x86_64` (tool cache)
//!
//! # Desktop Integration
//!
//! The [`freedesktop`] module writes the `.desktop` entry and icons.

pub mod appdir;
pub mod appimage;
pub mod finalize;
pub mod freedesktop;
pub mod portable;
