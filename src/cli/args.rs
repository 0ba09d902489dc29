//! Command line argument parsing and validation.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Packages Dockpanel as an AppImage or a portable executable
#[derive(Parser, Debug)]
#[command(
    name = "dockpanel_bundler",
    version,
    about = "Packages Dockpanel as an AppImage or a portable executable",
    long_about = "Packages the Dockpanel application source for Linux desktops.

Usage:
  dockpanel_bundler appimage dockpanel.py
  dockpanel_bundler portable dockpanel.py
  dockpanel_bundler wrap build/portable/dockpanel

Tools (appimagetool, the AppImage runtime) are downloaded into the build
directory once and reused afterwards."
)]
pub struct Args {
    /// Configuration file (default: dockpanel-bundle.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory for AppDirs, tool caches and outputs
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "DOCKPANEL_BUILD_DIR",
        default_value = "build"
    )]
    pub build_dir: PathBuf,

    /// Target architecture (x86_64, i686, aarch64, armhf)
    #[arg(long, global = true, value_name = "ARCH", default_value = "x86_64")]
    pub arch: String,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print additional detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Packaging pipeline to run
    #[command(subcommand)]
    pub command: Command,
}

/// Name overrides shared by the source-based pipelines.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct NameArgs {
    /// Base name of the AppDir and artifacts (default: from config, "dockpanel")
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Name shown in the desktop menu (default: from config, "Dockpanel")
    #[arg(long, value_name = "NAME")]
    pub display_name: Option<String>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build <name>-x86_64.AppImage from the application source with appimagetool
    Appimage {
        /// Application source file
        #[arg(value_name = "SOURCE", default_value = "dockpanel.py")]
        source: PathBuf,

        /// Name overrides
        #[command(flatten)]
        names: NameArgs,

        /// PNG icon to use instead of the generated placeholder
        #[arg(long, value_name = "PNG")]
        icon: Option<PathBuf>,

        /// Where to download appimagetool from
        #[arg(long, value_name = "URL", env = "APPIMAGETOOL_URL")]
        appimagetool_url: Option<String>,

        /// Run appimagetool without FUSE (APPIMAGE_EXTRACT_AND_RUN=1)
        #[arg(long)]
        extract_and_run: bool,
    },

    /// Build a single-file portable executable and its AppImage wrapper script
    Portable {
        /// Application source file
        #[arg(value_name = "SOURCE", default_value = "dockpanel.py")]
        source: PathBuf,

        /// Name overrides
        #[command(flatten)]
        names: NameArgs,
    },

    /// Wrap a portable executable into <Name>-x86_64.AppImage
    Wrap {
        /// Portable executable (default: <build-dir>/portable/dockpanel)
        #[arg(value_name = "PORTABLE")]
        portable: Option<PathBuf>,

        /// AppImage base name (default: display name, "Dockpanel")
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Binary name inside the AppImage (default: file name of PORTABLE)
        #[arg(long, value_name = "NAME")]
        exec: Option<String>,

        /// PNG icon to use instead of the generated placeholder
        #[arg(long, value_name = "PNG")]
        icon: Option<PathBuf>,

        /// Where to download the AppImage runtime from
        #[arg(long, value_name = "URL", env = "APPIMAGE_RUNTIME_URL")]
        runtime_url: Option<String>,

        /// mksquashfs binary (default: looked up on PATH)
        #[arg(long, value_name = "PATH", env = "MKSQUASHFS")]
        mksquashfs: Option<PathBuf>,
    },

    /// Write the application source embedded in a portable executable
    Extract {
        /// Portable executable
        #[arg(value_name = "PORTABLE")]
        portable: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report the runtime header and payload offset of an AppImage
    Inspect {
        /// AppImage file
        #[arg(value_name = "APPIMAGE")]
        appimage: PathBuf,
    },
}

impl Command {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::Appimage { .. } => "appimage",
            Command::Portable { .. } => "portable",
            Command::Wrap { .. } => "wrap",
            Command::Extract { .. } => "extract",
            Command::Inspect { .. } => "inspect",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.build_dir.as_os_str().is_empty() {
            return Err("--build-dir must not be empty".to_string());
        }

        crate::bundler::Arch::from_target(&self.arch).map_err(|e| e.to_string())?;

        let urls = match &self.command {
            Command::Appimage {
                appimagetool_url, ..
            } => vec![("--appimagetool-url", appimagetool_url)],
            Command::Wrap { runtime_url, .. } => vec![("--runtime-url", runtime_url)],
            _ => Vec::new(),
        };
        for (flag, url) in urls {
            if let Some(url) = url {
                crate::bundler::utils::http::validate_url(url)
                    .map_err(|e| format!("{flag}: {e}"))?;
            }
        }

        let names = match &self.command {
            Command::Appimage { names, .. } | Command::Portable { names, .. } => {
                vec![names.name.as_deref()]
            }
            Command::Wrap { name, exec, .. } => vec![name.as_deref(), exec.as_deref()],
            _ => Vec::new(),
        };
        if names.into_iter().flatten().any(str::is_empty) {
            return Err("Names must not be empty".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_appimage_defaults() {
        let args = parse(&["dockpanel_bundler", "appimage"]);
        match args.command {
            Command::Appimage { source, names, .. } => {
                assert_eq!(source, PathBuf::from("dockpanel.py"));
                assert!(names.name.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["dockpanel_bundler", "portable", "--build-dir", "out", "-q"]);
        assert_eq!(args.build_dir, PathBuf::from("out"));
        assert!(args.quiet);
        assert_eq!(args.command.name(), "portable");
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let args = parse(&[
            "dockpanel_bundler",
            "wrap",
            "--runtime-url",
            "ftp://example.com/runtime",
        ]);
        let err = args.validate().unwrap_err();
        assert!(err.starts_with("--runtime-url"));
    }

    #[test]
    fn test_validate_rejects_unknown_arch() {
        let args = parse(&["dockpanel_bundler", "portable", "--arch", "sparc64"]);
        assert!(args.validate().unwrap_err().contains("sparc64"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let args = parse(&["dockpanel_bundler", "wrap", "--exec", ""]);
        assert!(args.validate().is_err());
    }
}
