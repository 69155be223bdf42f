//! File upload payloads.
//!
//! `MultipartForm` is plain data: each part names a form field and the file
//! descriptor to send under it. Reading the file and writing the wire
//! encoding is the transport's job.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file to upload, addressed by `uri`.
///
/// Fields the client does not interpret are kept in `extra` and travel with
/// the descriptor unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Local filesystem path for `file://` uris.
    pub fn local_path(&self) -> Option<&str> {
        self.uri.strip_prefix("file://")
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file: FileDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: impl Into<String>, file: FileDescriptor) -> Self {
        self.parts.push(FilePart {
            field: field.into(),
            file,
        });
        self
    }

    pub fn part(&self, field: &str) -> Option<&FilePart> {
        self.parts.iter().find(|p| p.field == field)
    }
}

/// Text after the last `.` in `uri`, or the whole uri when it has no dot.
pub fn file_extension(uri: &str) -> &str {
    uri.rsplit_once('.').map_or(uri, |(_, ext)| ext)
}

/// MIME type registered for a file extension, if known.
pub fn mime_for_extension(ext: &str) -> Option<String> {
    mime_guess::from_ext(ext).first_raw().map(str::to_string)
}
