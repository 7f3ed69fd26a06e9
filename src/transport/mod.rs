//! Mailbox transport contract.
//!
//! The coordinator and the transcoding service never talk SSH or curl
//! themselves: they get a [`Transport`] that opens a [`Session`], use it for
//! one batch, then disconnect. [`LocalTransport`] backs a mailbox with a
//! plain directory.

mod local;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{EdiError, TransportError};

pub use local::LocalTransport;

/// A file in a mailbox directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    pub filename: String,
    pub path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Opens sessions against a mailbox.
pub trait Transport {
    type Session: Session;

    fn connect(&self) -> Result<Self::Session, TransportError>;
}

/// One live connection to a mailbox. Paths are `/`-separated and absolute
/// from the mailbox root.
pub trait Session {
    /// Files directly inside `dir` that carry the transport's extension.
    fn list_files(&mut self, dir: &str) -> Result<Vec<RemoteFile>, TransportError>;

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError>;

    /// Create or replace `path`, creating missing parent directories.
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), TransportError>;

    fn delete_file(&mut self, path: &str) -> Result<(), TransportError>;

    fn disconnect(&mut self) {}
}

/// Join a directory and a file name with exactly one `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Final path component, with any directory part (either separator) removed.
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Whether `name` ends in `.{extension}`, ignoring case.
pub fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    match name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}

/// Reduce `name` to its base name and require `extension`.
pub fn checked_filename(name: &str, extension: &str) -> Result<String, EdiError> {
    let base = basename(name.trim());
    if base.is_empty() || base == "." || base == ".." {
        return Err(EdiError::Validation(format!("invalid file name {name:?}")));
    }
    if !has_extension(base, extension) {
        return Err(EdiError::Validation(format!(
            "{base} is not a .{} file",
            extension.trim_start_matches('.')
        )));
    }
    Ok(base.to_string())
}
