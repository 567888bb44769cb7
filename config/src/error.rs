use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudEnvError {
    #[error("Failed to read mapping file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse mapping JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Mapping document is not a JSON object")]
    NotAnObject,

    #[error("Unsupported mapping version {0} (supported: 1, 2)")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown search pattern prefix '{0}' (supported: user-provided, cloudfoundry, env, file)")]
    UnknownPrefix(String),

    #[error("search pattern '{pattern}' is missing its {argument}")]
    MissingArgument {
        pattern: String,
        argument: &'static str,
    },
}

/// Why a single search pattern did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid JSONPath '{path}': {message}")]
    InvalidJsonPath { path: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl ResolveError {
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    #[must_use]
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::SourceUnavailable(what.into())
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_invalid_json_path(&self) -> bool {
        matches!(self, Self::InvalidJsonPath { .. })
    }

    #[must_use]
    pub const fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
