use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use super::{RemoteFile, Session, Transport, has_extension, join_path};
use crate::core::TransportError;

/// A mailbox rooted at a local directory. Mailbox paths are resolved
/// below the root.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    root: PathBuf,
    extension: String,
}

impl LocalTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "xml".into(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Transport for LocalTransport {
    type Session = LocalSession;

    fn connect(&self) -> Result<LocalSession, TransportError> {
        if !self.root.is_dir() {
            return Err(TransportError::Connection(format!(
                "mailbox root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(LocalSession {
            root: self.root.clone(),
            extension: self.extension.clone(),
        })
    }
}

#[derive(Debug)]
pub struct LocalSession {
    root: PathBuf,
    extension: String,
}

impl LocalSession {
    fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        self.root.join(relative)
    }
}

impl Session for LocalSession {
    fn list_files(&mut self, dir: &str) -> Result<Vec<RemoteFile>, TransportError> {
        let list_err = |e: std::io::Error| TransportError::List {
            path: dir.to_string(),
            reason: e.to_string(),
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(self.resolve(dir)).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let meta = entry.metadata().map_err(list_err)?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if !meta.is_file() || !has_extension(&filename, &self.extension) {
                continue;
            }
            files.push(RemoteFile {
                path: join_path(dir, &filename),
                filename,
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        fs::read(self.resolve(path)).map_err(|e| TransportError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let target = self.resolve(path);
        let write_err = |e: std::io::Error| TransportError::Write {
            path: path.to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&target, bytes).map_err(write_err)
    }

    fn delete_file(&mut self, path: &str) -> Result<(), TransportError> {
        fs::remove_file(self.resolve(path)).map_err(|e| TransportError::Delete {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
