//! # Dockpanel Bundler
//!
//! Packages the Dockpanel application source for Linux desktops.
//!
//! ## Features
//!
//! - **AppImage**: assembles an AppDir and runs `appimagetool` on it
//! - **Portable executable**: one file holding a shell launcher and the source
//! - **Wrap**: turns a portable executable into an AppImage with the type 2
//!   runtime and `mksquashfs`, no `appimagetool` needed
//! - **Tool cache**: downloaded tools live in the build directory and are reused
//!
//! ## Usage
//!
//! ```bash
//! dockpanel_bundler appimage dockpanel.py     # build/dockpanel-x86_64.AppImage
//! dockpanel_bundler portable dockpanel.py     # build/portable/dockpanel
//! dockpanel_bundler wrap                      # build/Dockpanel-x86_64.AppImage
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;

// Re-export main types for public API
pub use bundler::{BundleSettings, BundledArtifact, Bundler, PackageType, Settings};
pub use cli::Args;
pub use config::ConfigFile;
pub use error::{CliError, ConfigError, PackagerError, Result};
