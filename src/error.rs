//! Error types for dockpanel_bundler operations.
//!
//! Every failure carries an actionable message plus recovery suggestions that
//! `main` prints under the error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dockpanel_bundler operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all dockpanel_bundler operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}", path.display())]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// TOML parsing error
        #[source]
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Input file given on the command line does not exist
    #[error("Input file not found: {}", path.display())]
    InputNotFound {
        /// Missing path
        path: PathBuf,
    },
}

impl PackagerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as BundlerError;

        match self {
            PackagerError::Cli(CliError::InputNotFound { path }) => vec![
                format!("Check that {} exists", path.display()),
                "Run `dockpanel_bundler portable` first to create the portable executable"
                    .to_string(),
            ],
            PackagerError::Config(ConfigError::Parse { .. }) => vec![
                "Only [package] and [tools] sections are recognized".to_string(),
                "Check the file with a TOML validator".to_string(),
            ],
            PackagerError::Bundler(e) => match e.root() {
                BundlerError::ToolNotFound(tool) if tool == "mksquashfs" => vec![
                    "Install squashfs-tools from your package manager".to_string(),
                    "Or point --mksquashfs / MKSQUASHFS at the binary".to_string(),
                ],
                BundlerError::HttpError(_) | BundlerError::UrlParse(_) => vec![
                    "Check network access to github.com".to_string(),
                    "Or place the tool in the build directory by hand; cached tools are reused"
                        .to_string(),
                ],
                BundlerError::ToolFailed { tool, .. } if tool.starts_with("appimagetool") => vec![
                    "Re-run with --extract-and-run on hosts without FUSE".to_string(),
                    "Set RUST_LOG=debug to see the exact command line".to_string(),
                ],
                BundlerError::MissingOutput { .. } | BundlerError::RuntimePrefixMismatch { .. } => {
                    vec![
                        "Inspect the tool output above for errors".to_string(),
                        "Delete the cached tool in the build directory to force a fresh download"
                            .to_string(),
                    ]
                }
                BundlerError::SentinelNotFound { .. } => vec![
                    "The file is not a portable executable built by this tool".to_string(),
                ],
                _ => vec!["Check the error message above for specific details".to_string()],
            },
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Process exit status for this error.
    ///
    /// Every failure exits with status 1, including a packaging tool that
    /// finished without producing its output.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether a packaging tool ran but left no usable artifact.
    pub fn is_postcondition_failure(&self) -> bool {
        matches!(self, PackagerError::Bundler(e) if e.is_postcondition_failure())
    }
}
