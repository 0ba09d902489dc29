//! Error types for bundler operations.
//!
//! Every packaging step is fail-fast: the first error aborts the pipeline and
//! is reported with the context it was raised in. Filesystem failures carry
//! the offending path, tool failures carry the tool name and exit code.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dockpanel_bundler::bundler::{ErrorExt, Result};
//!
//! fn read_source(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path).fs_context("reading application source", path)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::PathBuf,
};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "copying entry point")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// A child process could not be spawned.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// A packaging tool ran but exited unsuccessfully.
    #[error("{tool} exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    ToolFailed {
        /// Tool name as shown to the user
        tool: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// A required tool is neither configured nor on `PATH`.
    #[error("required tool `{0}` was not found in PATH")]
    ToolNotFound(String),

    /// The packaging tool finished but its expected output is absent.
    #[error("expected output {} was not produced", path.display())]
    MissingOutput {
        /// Where the artifact should have been written
        path: PathBuf,
    },

    /// A built artifact does not start with the runtime it was built from.
    #[error("{} does not start with the runtime header", path.display())]
    RuntimePrefixMismatch {
        /// The artifact that failed the check
        path: PathBuf,
    },

    /// A portable executable does not contain the sentinel line.
    #[error("no `{sentinel}` line found in {}", path.display())]
    SentinelNotFound {
        /// The sentinel that was searched for
        sentinel: &'static str,
        /// The file that was searched
        path: PathBuf,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Image processing error (icon rendering, resizing).
    #[error("{0}")]
    ImageError(#[from] image::ImageError),

    /// Error walking directory.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// HTTP client error (downloading tools).
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("{0}")]
    UrlParse(#[from] url::ParseError),

    /// Download URL uses a scheme other than http(s).
    #[error("unsupported URL scheme `{scheme}` in {url}")]
    UnsupportedScheme {
        /// The offending scheme
        scheme: String,
        /// The full URL
        url: String,
    },

    /// Binary parsing error (runtime ELF analysis).
    #[error("binary parse error: {0}")]
    BinaryParseError(#[from] goblin::error::Error),

    /// Unsupported CPU architecture.
    #[error("unsupported architecture: {0}")]
    ArchError(String),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl From<handlebars::TemplateError> for Error {
    fn from(error: handlebars::TemplateError) -> Self {
        Error::Template(Box::new(error))
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying entry point".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

impl Error {
    /// Returns the innermost error, looking through [`Error::Context`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// Whether this error means the packaging tool ran but left no usable artifact.
    pub fn is_postcondition_failure(&self) -> bool {
        matches!(
            self.root(),
            Error::MissingOutput { .. } | Error::RuntimePrefixMismatch { .. }
        )
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_and_root_unwraps() {
        let err: Result<()> = Err(Error::MissingOutput {
            path: PathBuf::from("out.AppImage"),
        });
        let wrapped = err.context("finalizing AppImage").unwrap_err();

        assert!(wrapped.to_string().starts_with("finalizing AppImage: "));
        assert!(wrapped.is_postcondition_failure());
    }

    #[test]
    fn test_fs_context_keeps_path() {
        let io: std::io::Result<()> = Err(io::Error::from(io::ErrorKind::NotFound));
        let err = io.fs_context("copying entry point", "dockpanel.py").unwrap_err();

        let message = err.to_string();
        assert!(message.contains("copying entry point"));
        assert!(message.contains("dockpanel.py"));
        assert!(!err.is_postcondition_failure());
    }

    #[test]
    fn test_tool_failed_message() {
        let err = Error::ToolFailed {
            tool: "mksquashfs".into(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "mksquashfs exited with code 2");
    }
}
