// src/error.rs

//! Error types for SDK version resolution
//!
//! Every failure here is terminal for the build: resolution is all-or-nothing,
//! so errors are propagated straight to the caller without local recovery.

use thiserror::Error;

/// Errors that can occur while resolving the .NET Core SDK
#[derive(Error, Debug)]
pub enum Error {
    /// A version-source file exists but is malformed
    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// A version string that is not a valid semantic version
    #[error("invalid semantic version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A version constraint expression that cannot be parsed
    #[error("invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Unrecognized roll-forward policy name
    #[error("invalid roll-forward policy '{0}'")]
    InvalidPolicy(String),

    /// The catalog has no entry satisfying a plain version constraint
    #[error(
        "failed to satisfy \"{dependency}\" dependency for stack \"{stack}\" with version constraint \"{requested}\": no compatible versions. Supported versions are: [{}]",
        .supported_versions.join(", ")
    )]
    NoCompatibleVersion {
        dependency: String,
        requested: String,
        stack: String,
        supported_versions: Vec<String>,
    },

    /// No roll-forward constraint matched any catalog entry
    #[error(
        "failed to resolve version {requested} with roll-forward policy '{policy}' for stack \"{stack}\". Supported versions are: [{}]",
        .supported_versions.join(", ")
    )]
    RollForwardExhausted {
        requested: String,
        policy: String,
        stack: String,
        supported_versions: Vec<String>,
    },

    /// The declared SDK conflicts with the installed runtime's mapped SDK
    #[error(
        "SDK version specified in {source_name} ({requested}) is incompatible with installed runtime version ({runtime_version})"
    )]
    IncompatibleRuntime {
        source_name: String,
        requested: String,
        runtime_version: String,
    },

    /// The runtime-to-SDK table has no row for the runtime version
    #[error("no compatible SDK version available for .NET Runtime version {0}")]
    NoRuntimeMapping(String),

    /// The catalog file cannot be read or decoded
    #[error("buildpack.toml could not be parsed ({path}): {reason}")]
    CatalogLoad { path: String, reason: String },

    /// I/O error while reading a version source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error for the named version source
    pub fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error reports a legitimate "no match" outcome rather than
    /// malformed input or build-system misconfiguration
    pub fn is_unsatisfied(&self) -> bool {
        matches!(
            self,
            Error::NoCompatibleVersion { .. }
                | Error::RollForwardExhausted { .. }
                | Error::IncompatibleRuntime { .. }
        )
    }
}

/// Result type for SDK resolution operations
pub type Result<T> = std::result::Result<T, Error>;
