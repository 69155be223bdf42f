//! Request building, response validation and error normalization for one
//! backend API.
//!
//! # Design
//! `Connection` keeps the host-does-IO split: `build_request` produces an
//! `HttpRequest` and `parse_response` consumes an `HttpResponse`, neither
//! touching the network. The verb methods join the two with a single
//! `Transport::send`. Every failure, whichever step raised it, goes through
//! `handle_error`, which wraps and logs raw causes once and passes
//! already-normalized errors through untouched.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, ErrorCause, ErrorData, ErrorKind, Failure, ResponseSnapshot};
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::logging::{ErrorLog, ErrorLogger, TracingLogger};
use crate::multipart::{file_extension, mime_for_extension, FileDescriptor, MultipartForm};
use crate::query::Query;
use crate::transport::Transport;

pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

fn default_headers() -> Headers {
    Headers::from([
        ("Accept".to_string(), APPLICATION_JSON.to_string()),
        ("Content-Type".to_string(), APPLICATION_JSON.to_string()),
    ])
}

/// Client for a single API behind `base_url`.
///
/// Successful calls resolve to the decoded JSON body, or `Value::Bool(true)`
/// for a 204 response without a body.
pub struct Connection<T> {
    base_url: String,
    headers: Headers,
    transport: T,
    logger: Arc<dyn ErrorLogger>,
}

impl<T> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Connection<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            headers: default_headers(),
            transport,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn from_config(config: ConnectionConfig, transport: T) -> Self {
        let mut connection = Self::new(config.base_url, transport);
        connection.add_headers(config.headers);
        connection
    }

    /// Replace the default `tracing` error logger.
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get(&self, path: &str, params: Option<&Query>) -> Result<Value, ConnectionError> {
        let path = match params {
            Some(query) if !query.is_empty() => format!("{path}?{}", query.encode()),
            _ => path.to_string(),
        };
        self.execute(HttpMethod::Get, &path, None, None)
    }

    pub fn delete(&self, path: &str) -> Result<Value, ConnectionError> {
        self.execute(HttpMethod::Delete, path, None, None)
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, data: &B) -> Result<Value, ConnectionError> {
        let body = self.encode_json(data)?;
        self.execute(HttpMethod::Post, path, Some(body), None)
    }

    pub fn put<B: Serialize + ?Sized>(&self, path: &str, data: &B) -> Result<Value, ConnectionError> {
        let body = self.encode_json(data)?;
        self.execute(HttpMethod::Put, path, Some(body), None)
    }

    /// Upload `file` as the multipart field `field`.
    ///
    /// The uploaded file is renamed to `photo.<ext>` and typed from its
    /// extension. The request is sent as `multipart/form-data`; every other
    /// default header is kept.
    pub fn post_file(
        &self,
        path: &str,
        field: &str,
        file: &FileDescriptor,
    ) -> Result<Value, ConnectionError> {
        let ext = file_extension(&file.uri);
        let part = FileDescriptor {
            name: Some(format!("photo.{ext}")),
            mime_type: mime_for_extension(ext),
            ..file.clone()
        };
        let form = MultipartForm::new().file(field, part);
        let headers = self.get_headers(Some(&Headers::from([(
            "Content-Type".to_string(),
            MULTIPART_FORM_DATA.to_string(),
        )])));
        self.execute(HttpMethod::Post, path, Some(RequestBody::Multipart(form)), Some(headers))
    }

    /// Default headers merged with `overrides`; overrides win on collision.
    pub fn get_headers(&self, overrides: Option<&Headers>) -> Headers {
        let mut headers = self.headers.clone();
        if let Some(overrides) = overrides {
            headers.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        headers
    }

    /// Merge `headers` into the defaults used by every later request.
    pub fn add_headers(&mut self, headers: Headers) {
        self.headers.extend(headers);
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Describe a call as an `HttpRequest` without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: Option<Headers>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}/{path}", self.base_url),
            headers: headers.unwrap_or_else(|| self.get_headers(None)),
            body,
        }
    }

    /// Validate a response and decode its body.
    pub fn parse_response(&self, response: &HttpResponse) -> Result<Value, ConnectionError> {
        self.validate_response(response)?;

        if response.status == 204 && !response.has_body() {
            return Ok(Value::Bool(true));
        }
        response.json().map_err(|e| {
            self.handle_error(
                ErrorKind::Connection,
                ErrorCause::Decode(e).into(),
                Some(response.status),
                None,
            )
        })
    }

    /// Reject non-2xx responses as `Network error`, carrying whatever the
    /// body decodes to.
    pub fn validate_response(&self, response: &HttpResponse) -> Result<(), ConnectionError> {
        if response.is_success() {
            return Ok(());
        }
        let (cause, body) = match response.json() {
            Ok(body) => (ErrorCause::Rejected(body.clone()), Some(body)),
            Err(e) => (ErrorCause::Decode(e), None),
        };
        Err(self.handle_error(ErrorKind::Network, cause.into(), Some(response.status), body))
    }

    /// Turn a failure into the `ConnectionError` handed to the caller.
    ///
    /// Errors that are already normalized come back unchanged and are not
    /// logged again. Anything else is wrapped with `status` and `result`,
    /// logged once, and returned.
    pub fn handle_error(
        &self,
        kind: ErrorKind,
        failure: Failure,
        status: Option<u16>,
        result: Option<Value>,
    ) -> ConnectionError {
        let cause = match failure {
            Failure::Normalized(err) => return err,
            Failure::Cause(cause) => cause,
        };

        let mut error = ConnectionError::new(kind);
        if let Some(status) = status {
            error.set_status_code(status);
        }
        let data = ErrorData {
            error: cause,
            response: ResponseSnapshot { status, body: result },
        };
        self.log_error(kind.message(), &data);
        error.set_data(data);
        error
    }

    fn log_error(&self, message: &str, data: &ErrorData) {
        let entry = ErrorLog { message, data };
        // A panicking logger must not replace the error being reported.
        let _ = catch_unwind(AssertUnwindSafe(|| self.logger.log_error(&entry)));
    }

    fn encode_json<B: Serialize + ?Sized>(&self, data: &B) -> Result<RequestBody, ConnectionError> {
        serde_json::to_string(data).map(RequestBody::Json).map_err(|e| {
            self.handle_error(ErrorKind::Connection, ErrorCause::Encode(e).into(), None, None)
        })
    }

    fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: Option<Headers>,
    ) -> Result<Value, ConnectionError> {
        let request = self.build_request(method, path, body, headers);
        debug!(method = method.as_str(), url = %request.url, "sending request");

        self.transport
            .send(&request)
            .map_err(Failure::from)
            .and_then(|response| {
                debug!(status = response.status, url = %request.url, "received response");
                self.parse_response(&response).map_err(Failure::from)
            })
            .map_err(|failure| self.handle_error(ErrorKind::Connection, failure, None, None))
    }
}
