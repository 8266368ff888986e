//! Error types for ssm-inject
//!
//! Errors are structured: a kind, the configuration location where the
//! failing placeholder sat, an underlying cause and an actionable help message.
//! Every error is fatal to the resolution pass that raised it.

use std::fmt;

/// Result type alias for ssm-inject operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ssm-inject operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Location in the configuration tree (e.g., "database.hosts[1]")
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error parsing YAML/JSON input
    Parse,
    /// Error while resolving a placeholder
    Resolution(ResolutionErrorKind),
    /// A resolved value could not be used the way the placeholder asked
    TypeCoercion,
    /// I/O error (file not found, unreadable, etc.)
    Io,
    /// Internal error (bug in ssm-inject)
    Internal,
}

/// Specific resolution error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// Neither the path nor its parent produced a matching parameter
    UnresolvedPath { path: String },
    /// Environment variable referenced by `${NAME}` is unset or empty
    EnvNotFound { var_name: String },
    /// A JSON-flagged value failed to parse
    MalformedJson { path: String, raw: String },
    /// The parameter store itself failed (network, auth, throttling)
    Store { store: String, message: String },
}

impl Error {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            path: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an unresolved path error
    pub fn unresolved_path(path: impl Into<String>) -> Self {
        let p = path.into();
        Self {
            kind: ErrorKind::Resolution(ResolutionErrorKind::UnresolvedPath { path: p.clone() }),
            path: None,
            help: Some(format!(
                "Check that '{}' exists in the parameter store and that the credentials can read it",
                p
            )),
            cause: None,
        }
    }

    /// Create an env var not found error
    pub fn env_not_found(var_name: impl Into<String>) -> Self {
        let var = var_name.into();
        Self {
            kind: ErrorKind::Resolution(ResolutionErrorKind::EnvNotFound {
                var_name: var.clone(),
            }),
            path: None,
            help: Some(format!(
                "Set the {} environment variable to a non-empty value",
                var
            )),
            cause: None,
        }
    }

    /// Create a malformed JSON error
    pub fn malformed_json(
        path: impl Into<String>,
        raw: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Resolution(ResolutionErrorKind::MalformedJson {
                path: path.into(),
                raw: raw.into(),
            }),
            path: None,
            help: Some("Store valid JSON in the parameter or use aws-ssm:// instead".into()),
            cause: Some(message.into()),
        }
    }

    /// Create a parameter store failure
    pub fn store(store: impl Into<String>, message: impl Into<String>) -> Self {
        let store_name = store.into();
        Self {
            kind: ErrorKind::Resolution(ResolutionErrorKind::Store {
                store: store_name.clone(),
                message: message.into(),
            }),
            path: None,
            help: Some(format!(
                "Check connectivity and permissions for the '{}' parameter store",
                store_name
            )),
            cause: None,
        }
    }

    /// Create a type coercion error
    pub fn type_coercion(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::TypeCoercion,
            path: None,
            help: Some(format!(
                "Parameter '{}' must resolve to a {}",
                path.into(),
                expected.into()
            )),
            cause: Some(format!("Got: {}", got.into())),
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            path: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an internal error (bug in ssm-inject)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            path: None,
            help: Some("This is likely a bug in ssm-inject. Please report it.".into()),
            cause: Some(message.into()),
        }
    }

    /// Add configuration location to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// True for errors that mean the store had nothing at the requested path
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Resolution(ResolutionErrorKind::UnresolvedPath { .. })
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Resolution(r) => match r {
                ResolutionErrorKind::UnresolvedPath { path } => {
                    write!(f, "Path {} not found in parameter store", path)?
                }
                ResolutionErrorKind::EnvNotFound { var_name } => {
                    write!(f, "Environment variable not found: {}", var_name)?
                }
                ResolutionErrorKind::MalformedJson { path, raw } => {
                    write!(f, "Could not JSON parse {} => {}", path, raw)?
                }
                ResolutionErrorKind::Store { store, message } => {
                    write!(f, "Parameter store '{}' error: {}", store, message)?
                }
            },
            ErrorKind::TypeCoercion => write!(f, "Type coercion failed")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
