//! Error types and handling for Treeferry
//!
//! Errors fall into the categories the rest of the workspace cares about:
//! configuration errors are fatal and raised before any traversal begins,
//! transfer errors abort the traversal that raised them, and submission
//! errors are reported per job without blocking the rest of a batch.

use std::path::PathBuf;

/// Convenience result alias used across the workspace
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for Treeferry operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid configuration detected before or at the start of a run
    #[error("configuration error: {message}")]
    Config {
        /// Description of the invalid configuration
        message: String,
    },

    /// A source path that must exist does not
    #[error("source path does not exist: {path}")]
    SourceMissing {
        /// The missing source path
        path: PathBuf,
    },

    /// A single file transfer failed; fatal for the traversal that issued it
    #[error("transfer failed ({source_path} -> {dest_path}): {message}")]
    Transfer {
        /// Source path of the failing transfer
        source_path: PathBuf,
        /// Destination path of the failing transfer
        dest_path: PathBuf,
        /// Underlying failure description
        message: String,
    },

    /// I/O operation failed outside of a specific transfer
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// A bundle or task-list file violates the expected row format
    #[error("bundle format error in {path}: {message}")]
    BundleFormat {
        /// The offending bundle file
        path: PathBuf,
        /// Description of the format violation
        message: String,
    },

    /// A jobscript conditional-option line could not be parsed
    #[error("invalid jobscript conditional option in {path}, line {line}: {message}")]
    JobscriptSyntax {
        /// The jobscript file containing the bad line
        path: PathBuf,
        /// One-based line number of the bad line
        line: usize,
        /// Description of the syntax problem
        message: String,
    },

    /// A scheduler submission command was rejected
    #[error("job submission failed for '{job_name}': {message}")]
    Submission {
        /// Name of the job whose submission failed
        job_name: String,
        /// Description of the submission failure
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration errors
    Config,
    /// Transfer errors
    Transfer,
    /// I/O errors
    Io,
    /// Bundle format errors
    BundleFormat,
    /// Jobscript syntax errors
    JobscriptSyntax,
    /// Submission errors
    Submission,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::SourceMissing { .. } => ErrorKind::Config,
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::Io { .. } => ErrorKind::Io,
            Self::BundleFormat { .. } => ErrorKind::BundleFormat,
            Self::JobscriptSyntax { .. } => ErrorKind::JobscriptSyntax,
            Self::Submission { .. } => ErrorKind::Submission,
        }
    }

    /// Whether this error must abort the current run
    ///
    /// Submission errors are reported per job and do not block submission of
    /// subsequent jobs in the same batch; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Submission { .. })
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transfer error carrying the failing pair of paths
    pub fn transfer<P1, P2, S>(source_path: P1, dest_path: P2, message: S) -> Self
    where
        P1: Into<PathBuf>,
        P2: Into<PathBuf>,
        S: Into<String>,
    {
        Self::Transfer {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            message: message.into(),
        }
    }

    /// Create a new bundle format error
    pub fn bundle_format<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::BundleFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new jobscript syntax error naming the file and line
    pub fn jobscript_syntax<P: Into<PathBuf>, S: Into<String>>(
        path: P,
        line: usize,
        message: S,
    ) -> Self {
        Self::JobscriptSyntax {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a new submission error
    pub fn submission<S1: Into<String>, S2: Into<String>>(job_name: S1, message: S2) -> Self {
        Self::Submission {
            job_name: job_name.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
