//! Error types for the connection client.
//!
//! # Design
//! Every failure a `Connection` reports is a `ConnectionError`. The `kind`
//! says which side failed: `Connection` when no usable response came back
//! (transport failure or an undecodable success body), `Network` when the
//! server answered with a non-2xx status. `data` keeps the underlying cause
//! together with the status and body observed at the failure site.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

/// Failure category, rendered as the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server rejected the request with a non-2xx status.
    Network,

    /// No response was obtained, or its body could not be decoded.
    Connection,
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Network error",
            ErrorKind::Connection => "Connection error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The underlying cause wrapped by a `ConnectionError`.
#[derive(Debug, Error)]
pub enum ErrorCause {
    /// Decoded body of a rejected response.
    #[error("request rejected: {0}")]
    Rejected(Value),

    /// A response body that is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request payload that could not be serialized.
    #[error("request body could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Input to error normalization: either an error that was already
/// normalized further down the call, or a raw cause still to be wrapped.
#[derive(Debug)]
pub enum Failure {
    Normalized(ConnectionError),
    Cause(ErrorCause),
}

impl From<ConnectionError> for Failure {
    fn from(err: ConnectionError) -> Self {
        Failure::Normalized(err)
    }
}

impl From<ErrorCause> for Failure {
    fn from(cause: ErrorCause) -> Self {
        Failure::Cause(cause)
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        Failure::Cause(ErrorCause::Transport(err))
    }
}

/// Status and decoded body seen when the failure happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSnapshot {
    pub status: Option<u16>,
    pub body: Option<Value>,
}

/// Diagnostic payload attached to a `ConnectionError`.
#[derive(Debug)]
pub struct ErrorData {
    pub error: ErrorCause,
    pub response: ResponseSnapshot,
}

/// Error returned by every `Connection` operation.
#[derive(Debug)]
pub struct ConnectionError {
    kind: ErrorKind,
    data: Option<ErrorData>,
    status_code: Option<u16>,
    date: DateTime<Utc>,
}

impl ConnectionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            data: None,
            status_code: None,
            date: Utc::now(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }

    pub fn data(&self) -> Option<&ErrorData> {
        self.data.as_ref()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// When the error was created.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn set_status_code(&mut self, code: u16) {
        self.status_code = Some(code);
    }

    pub fn set_data(&mut self, data: ErrorData) {
        self.data = Some(data);
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.data.as_ref().map(|d| &d.error)
    }

    /// Status recorded in the diagnostic payload.
    pub fn response_status(&self) -> Option<u16> {
        self.data.as_ref().and_then(|d| d.response.status)
    }

    pub fn response_body(&self) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.response.body.as_ref())
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.data, self.status_code) {
            (Some(data), Some(status)) => write!(f, "{} (HTTP {status}): {}", self.kind, data.error),
            (Some(data), None) => write!(f, "{}: {}", self.kind, data.error),
            (None, _) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|c| c as &(dyn std::error::Error + 'static))
    }
}
