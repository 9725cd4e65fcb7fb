use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all vercon operations.
#[derive(Debug, Error, Diagnostic)]
pub enum VerconError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Global configuration could not be read or parsed.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.vercon/config.toml or the file passed with --config"))]
    Config { message: String },

    /// Invalid or malformed scenario file.
    #[error("Scenario error: {message}")]
    #[diagnostic(help("Check your scenario file for syntax errors"))]
    Scenario { message: String },

    /// Malformed version or version range text.
    #[error("Invalid version: {message}")]
    Version { message: String },

    /// Constraints on one or more packages cannot be met.
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// A contract between the resolver driver and the constraint engine was
    /// broken. The tag identifies the exact call site that noticed it.
    #[error("internal error #{tag}: {message}")]
    #[diagnostic(code(vercon::internal))]
    Internal { tag: u32, message: String },

    /// Metadata for a referenced package could not be obtained.
    #[error("failed to fetch package {package}")]
    FetchPackage { package: String },

    /// A specific version of a package could not be obtained.
    #[error("failed to fetch version {version} of {package}")]
    FetchVersion { package: String, version: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl VerconError {
    /// Build an internal-consistency error for call site `tag`.
    pub fn internal(tag: u32, message: impl Into<String>) -> Self {
        VerconError::Internal {
            tag,
            message: message.into(),
        }
    }

    /// The call-site tag of an internal-consistency error.
    pub fn internal_tag(&self) -> Option<u32> {
        match self {
            VerconError::Internal { tag, .. } => Some(*tag),
            _ => None,
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type VerconResult<T> = miette::Result<T>;
