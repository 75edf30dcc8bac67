//! Error types for stackstrap.
//!
//! This module defines the error taxonomy used throughout stackstrap. The
//! reconciliation errors ([`AlreadyExists`](Error::AlreadyExists),
//! [`NotFound`](Error::NotFound), [`AmbiguousName`](Error::AmbiguousName))
//! carry the resource kind and name so an operator can tell at a glance which
//! topology step refused to proceed. Every error is fatal to the run; there is
//! no retry or partial-success path.

use thiserror::Error;

/// Result type alias for stackstrap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for stackstrap.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Reconciliation Errors
    // ========================================================================
    /// A resource marked for creation already exists under its name.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Resource kind (network, subnet, router, security group)
        kind: &'static str,
        /// Configured resource name
        name: String,
    },

    /// A resource marked as externally provisioned could not be found.
    #[error("{kind} '{name}' was not found")]
    NotFound {
        /// Resource kind
        kind: &'static str,
        /// Configured resource name
        name: String,
    },

    /// More than one existing resource shares the target name.
    #[error("lookup of {kind} named '{name}' failed: there are {matches} matches")]
    AmbiguousName {
        /// Resource kind
        kind: &'static str,
        /// Configured resource name
        name: String,
        /// How many resources matched the name
        matches: usize,
    },

    // ========================================================================
    // Control Plane Errors
    // ========================================================================
    /// Keystone rejected the credentials or returned an unusable token reply.
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message
        message: String,
    },

    /// The service catalog offered no usable network endpoint.
    #[error("endpoint discovery failed: {message}")]
    EndpointDiscovery {
        /// Error message
        message: String,
    },

    /// The Neutron API answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code of the reply
        status: u16,
        /// Response body, as returned by the control plane
        message: String,
    },

    /// HTTP transport error (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Creates a new already-exists error.
    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a new ambiguous-name error.
    pub fn ambiguous_name(kind: &'static str, name: impl Into<String>, matches: usize) -> Self {
        Self::AmbiguousName {
            kind,
            name: name.into(),
            matches,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Creates a new invalid-config error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AlreadyExists { .. } | Error::NotFound { .. } | Error::AmbiguousName { .. } => 2,
            Error::AuthenticationFailed { .. }
            | Error::EndpointDiscovery { .. }
            | Error::Api { .. }
            | Error::Http(_) => 3,
            Error::Config(_)
            | Error::InvalidConfig { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::TomlParse(_) => 4,
            _ => 1,
        }
    }
}
