//! Error types for the Atlas CLI
//!
//! This module defines error types for all components of the application.
//! Fatal errors carry the exact one-line message shown to the user; the
//! single print-and-exit site lives in `main`, never in helper logic.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::messages;

/// Credential-store and session errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token file (or store directory) exists
    #[error("{}", messages::CREDENTIAL_ABSENT)]
    CredentialAbsent,

    /// The token's embedded expiry claim is in the past
    #[error("{}", messages::CREDENTIAL_EXPIRED)]
    CredentialExpired,

    /// The token payload could not be decoded as a JWT claim set
    #[error("Stored token is malformed: {reason}")]
    MalformedToken { reason: String },

    /// File I/O error while reading or writing the store
    #[error("Credential store I/O error at {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user's home directory could not be determined
    #[error("Could not determine a home directory for credential storage")]
    NoHomeDirectory,
}

/// Command-grammar and dispatch errors
#[derive(Error, Debug)]
pub enum CliError {
    /// A multi-level command was missing a required discriminator
    #[error("{}", messages::MISSING_ARGUMENT)]
    MissingArgument,

    /// A flag prefix matched more than one known flag
    #[error("Ambiguous flag --{prefix}: could be {candidates}")]
    AmbiguousFlag { prefix: String, candidates: String },
}

/// Transfer-engine errors for HTTP execution and streaming downloads
#[derive(Error, Debug)]
pub enum TransferError {
    /// HTTP transport failure
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request; body already reported to the user
    #[error("Server returned HTTP {status}")]
    Api { status: u16 },

    /// File I/O error while streaming a download to disk
    #[error("Failed writing download to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A URL could not be constructed for the operation
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The server answered 200 with a body the client could not use
    #[error("Unexpected response body: {reason}")]
    UnexpectedBody { reason: String },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Credential error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Command-grammar error
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Transfer error
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Cli(_) => "cli",
            AppError::Transfer(_) => "transfer",
        }
    }

    /// Whether the diagnostic already reached the user
    ///
    /// Server rejections reproduce their error body on stderr at the point
    /// they occur; the top-level handler only sets the exit code for those,
    /// so each failure prints exactly one diagnostic.
    pub fn is_reported(&self) -> bool {
        matches!(self, AppError::Transfer(TransferError::Api { .. }))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Credential result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Transfer result type alias
pub type TransferResult<T> = std::result::Result<T, TransferError>;
