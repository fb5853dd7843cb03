//! Centralized error types for the console.

use serde::Serialize;
use thiserror::Error;

/// Main error type for console operations.
///
/// Every variant carries a readable message that is shown inline on the
/// panel that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Query syntax error: {0}")]
    QuerySyntax(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Reference error: {0}")]
    Reference(String),

    #[error("Field error: {0}")]
    Field(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Tag identifying the kind of a [`ConsoleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ConnectionError,
    ValidationError,
    QuerySyntaxError,
    StoreError,
    ReferenceError,
    FieldError,
    ConfigError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::QuerySyntaxError => "QuerySyntaxError",
            ErrorKind::StoreError => "StoreError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::FieldError => "FieldError",
            ErrorKind::ConfigError => "ConfigError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConsoleError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn query_syntax(msg: impl Into<String>) -> Self {
        Self::QuerySyntax(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    pub fn field(msg: impl Into<String>) -> Self {
        Self::Field(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::ConnectionError,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::QuerySyntax(_) => ErrorKind::QuerySyntaxError,
            Self::Store(_) => ErrorKind::StoreError,
            Self::Reference(_) => ErrorKind::ReferenceError,
            Self::Field(_) => ErrorKind::FieldError,
            Self::Config(_) => ErrorKind::ConfigError,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(m)
            | Self::Validation(m)
            | Self::QuerySyntax(m)
            | Self::Store(m)
            | Self::Reference(m)
            | Self::Field(m)
            | Self::Config(m) => m,
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("invalid JSON: {}", err))
    }
}
