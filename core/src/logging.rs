//! Error reporting hook.
//!
//! Each newly normalized `ConnectionError` is handed to an `ErrorLogger`
//! exactly once before it is returned. Loggers are fire-and-forget: they
//! cannot fail and must not panic.

use tracing::warn;

use crate::error::ErrorData;

/// What a logger receives for one failed call.
#[derive(Debug)]
pub struct ErrorLog<'a> {
    pub message: &'a str,
    pub data: &'a ErrorData,
}

pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, entry: &ErrorLog<'_>);
}

/// Default logger: one `warn` event per error on the `tracing` pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log_error(&self, entry: &ErrorLog<'_>) {
        let response = &entry.data.response;
        warn!(
            status = ?response.status,
            cause = %entry.data.error,
            body = ?response.body,
            "{}",
            entry.message
        );
    }
}
