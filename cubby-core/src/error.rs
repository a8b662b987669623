//! Error types for the session store

use thiserror::Error;

use crate::types::SessionId;

/// Errors surfaced by session store operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session does not exist, or existed but is past its expiry.
    /// Callers cannot tell the two apart.
    #[error("Session not found: {id}")]
    NotFound { id: SessionId },

    /// The consistency token in the submitted store is no longer the
    /// session's current token: another writer saved first. Reload the
    /// store and reapply the change before saving again.
    #[error("Stale consistency token for session: {id}")]
    InvalidToken { id: SessionId },

    /// A request argument could not be understood, e.g. a session id
    /// string that does not parse.
    #[error("Bad parameter: {message}")]
    BadParameter { message: String },

    /// The store worker received a command it does not recognize. The
    /// typed command API cannot produce this; it exists for callers
    /// that bridge the protocol over an untyped transport.
    #[error("Invalid command: {message}")]
    InvalidCommand { message: String },

    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The store worker is unavailable or a reply channel was lost.
    #[error("Session store error: {message}")]
    Other { message: String },
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        Self::NotFound { id }
    }

    pub fn invalid_token(id: SessionId) -> Self {
        Self::InvalidToken { id }
    }

    pub fn bad_parameter<S: Into<String>>(message: S) -> Self {
        Self::BadParameter {
            message: message.into(),
        }
    }

    pub fn invalid_command<S: Into<String>>(message: S) -> Self {
        Self::InvalidCommand {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Result type used throughout the session store.
pub type SessionResult<T> = Result<T, SessionError>;
