//! Synchronous JSON API client core.
//!
//! # Overview
//! A `Connection` issues GET/POST/PUT/DELETE calls and file uploads against
//! one base URL and hands back decoded JSON, `true` for empty 204 answers,
//! or a `ConnectionError`. The network round-trip itself is delegated to a
//! `Transport`, so the request/response pipeline stays deterministic and
//! testable without sockets.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`).
//! - Default headers live on each `Connection`; there is no global state.
//! - All failures converge on `Connection::handle_error`, which logs each
//!   new error once through an `ErrorLogger` (`tracing` by default).

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod logging;
pub mod multipart;
pub mod query;
pub mod transport;

pub use config::{ConfigError, ConnectionConfig};
pub use connection::Connection;
pub use error::{ConnectionError, ErrorCause, ErrorData, ErrorKind, Failure, ResponseSnapshot};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use logging::{ErrorLog, ErrorLogger, TracingLogger};
pub use multipart::{FileDescriptor, FilePart, MultipartForm};
pub use query::Query;
pub use transport::{Transport, TransportError};
