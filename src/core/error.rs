use thiserror::Error;

/// Errors that can occur while detecting, parsing, serializing or moving
/// EDI documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdiError {
    /// The document's root element belongs to neither supported dialect.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Well-formed input missing the structure a dialect requires.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON input could not be decoded into orders.
    #[error("JSON error: {0}")]
    Json(String),

    /// One or more pre-flight validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Mailbox transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Local filesystem failure (staging, local fallback).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a mailbox transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("failed to list {path}: {reason}")]
    List { path: String, reason: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("failed to delete {path}: {reason}")]
    Delete { path: String, reason: String },
}

impl TransportError {
    /// True when the session itself is gone and further calls on it are pointless.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// A file in a batch that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileFailure {
    pub filename: String,
    pub reason: String,
}

impl FileFailure {
    pub fn new(filename: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }
}

/// A field that failed to parse and had a default substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionWarning {
    /// Dot-separated path to the field (e.g. "orders[0].po_date").
    pub field: String,
    /// The raw value found in the source.
    pub raw: String,
    /// The value substituted in its place.
    pub fallback: String,
}

impl std::fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: could not coerce '{}', using '{}'",
            self.field, self.raw, self.fallback
        )
    }
}

impl CoercionWarning {
    pub fn new(
        field: impl Into<String>,
        raw: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            raw: raw.into(),
            fallback: fallback.into(),
        }
    }

    /// Prefix the field path, e.g. with the owning order index.
    pub fn within(mut self, prefix: &str) -> Self {
        self.field = format!("{prefix}.{}", self.field);
        self
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "line_items[2].line_no").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
