//! Verified relocation of processed files into the archive directory.
//!
//! Each file goes through copy, verify, then delete:
//!
//! 1. read the source from the inbound directory,
//! 2. stage the bytes in a local temporary file,
//! 3. upload the staged copy to `<inbound>/<archive_subdir>/<name>`,
//! 4. read the archived copy back and compare its length with the source,
//! 5. delete the source.
//!
//! The source is only deleted after step 4 succeeds, so a failure anywhere
//! before that leaves the mailbox as it was and the file can simply be
//! retried. A failed delete is not an error: the file is archived, and the
//! leftover source is reported in [`ArchiveReport::source_retained`].

use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

use crate::config::MailboxConfig;
use crate::core::{EdiError, FileFailure, TransportError};
use crate::transport::{Session, Transport, checked_filename};

/// Where a file is in the archive protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveState {
    Pending,
    Read,
    Staged,
    Uploaded,
    Verified,
    /// Copy verified; the source was deleted or reported as retained.
    Archived,
    /// Stopped before the source was touched; safe to retry.
    FailedRetryable,
}

impl ArchiveState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived | Self::FailedRetryable)
    }
}

impl fmt::Display for ArchiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Read => "read",
            Self::Staged => "staged",
            Self::Uploaded => "uploaded",
            Self::Verified => "verified",
            Self::Archived => "archived",
            Self::FailedRetryable => "failed_retryable",
        };
        f.write_str(s)
    }
}

/// Result of archiving a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// Files whose archived copy was verified.
    pub archived: Vec<String>,
    /// Files left untouched in the inbound directory.
    pub failed: Vec<FileFailure>,
    /// Archived files whose source could not be deleted.
    pub source_retained: Vec<String>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A file that stopped short of [`ArchiveState::Archived`].
#[derive(Debug)]
struct Stopped {
    /// Last state reached before the failure.
    state: ArchiveState,
    error: EdiError,
}

impl Stopped {
    fn at(state: ArchiveState, error: impl Into<EdiError>) -> Self {
        Self {
            state,
            error: error.into(),
        }
    }

    fn session_lost(&self) -> bool {
        matches!(&self.error, EdiError::Transport(e) if e.is_session_lost())
    }
}

enum Archived {
    SourceDeleted,
    SourceRetained(TransportError),
}

/// Moves processed files from the inbound directory into its archive
/// subdirectory over one transport session per batch.
pub struct ArchiveCoordinator<T: Transport> {
    transport: T,
    config: MailboxConfig,
}

impl<T: Transport> ArchiveCoordinator<T> {
    pub fn new(transport: T, config: MailboxConfig) -> Self {
        Self { transport, config }
    }

    /// Archive each named file independently.
    ///
    /// Only a failure to open the session is returned as an error. If the
    /// session drops part way through, the remaining files are reported as
    /// failed without being attempted.
    pub fn archive_files(&self, names: &[String]) -> Result<ArchiveReport, EdiError> {
        let mut session = self.transport.connect()?;
        tracing::info!(files = names.len(), archive_dir = %self.config.archive_dir(), "archiving batch");

        let mut report = ArchiveReport::default();
        let mut lost: Option<String> = None;

        for name in names {
            if let Some(reason) = &lost {
                report
                    .failed
                    .push(FileFailure::new(name.clone(), format!("not attempted: {reason}")));
                continue;
            }

            let filename = match checked_filename(name, &self.config.extension) {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "rejecting file name");
                    report.failed.push(FileFailure::new(name.clone(), e));
                    continue;
                }
            };

            match self.archive_one(&mut session, &filename) {
                Ok(Archived::SourceDeleted) => {
                    tracing::info!(file = %filename, "archived");
                    report.archived.push(filename);
                }
                Ok(Archived::SourceRetained(e)) => {
                    tracing::warn!(
                        file = %filename,
                        error = %e,
                        "archived copy verified but source could not be deleted"
                    );
                    report.source_retained.push(filename.clone());
                    report.archived.push(filename);
                }
                Err(stopped) => {
                    advance(&filename, stopped.state, ArchiveState::FailedRetryable);
                    tracing::error!(
                        file = %filename,
                        state = %stopped.state,
                        error = %stopped.error,
                        "archiving failed, source left in place"
                    );
                    if stopped.session_lost() {
                        lost = Some(stopped.error.to_string());
                    }
                    report.failed.push(FileFailure::new(
                        filename,
                        format!("failed after {}: {}", stopped.state, stopped.error),
                    ));
                }
            }
        }

        session.disconnect();
        tracing::info!(
            archived = report.archived.len(),
            failed = report.failed.len(),
            retained = report.source_retained.len(),
            "archive batch complete"
        );
        Ok(report)
    }

    fn archive_one(&self, session: &mut T::Session, filename: &str) -> Result<Archived, Stopped> {
        let source = self.config.inbound_path(filename);
        let target = self.config.archive_path(filename);
        let mut state = ArchiveState::Pending;

        let bytes = session
            .read_file(&source)
            .map_err(|e| Stopped::at(state, e))?;
        state = advance(filename, state, ArchiveState::Read);

        let mut staged = stage(&bytes).map_err(|e| Stopped::at(state, e))?;
        state = advance(filename, state, ArchiveState::Staged);

        let staged_bytes = read_staged(&mut staged).map_err(|e| Stopped::at(state, e))?;
        session
            .write_file(&target, &staged_bytes)
            .map_err(|e| Stopped::at(state, e))?;
        state = advance(filename, state, ArchiveState::Uploaded);

        let copy = session
            .read_file(&target)
            .map_err(|e| Stopped::at(state, e))?;
        if copy.len() != bytes.len() {
            return Err(Stopped::at(
                state,
                TransportError::Write {
                    path: target,
                    reason: format!(
                        "verification failed: archived copy is {} bytes, source is {} bytes",
                        copy.len(),
                        bytes.len()
                    ),
                },
            ));
        }
        state = advance(filename, state, ArchiveState::Verified);

        let deleted = session.delete_file(&source);
        advance(filename, state, ArchiveState::Archived);

        if let Err(e) = staged.close() {
            tracing::warn!(file = %filename, error = %e, "could not remove staged copy");
        }

        Ok(match deleted {
            Ok(()) => Archived::SourceDeleted,
            Err(e) => Archived::SourceRetained(e),
        })
    }
}

fn advance(filename: &str, from: ArchiveState, to: ArchiveState) -> ArchiveState {
    tracing::debug!(file = %filename, %from, %to, "archive state");
    to
}

fn stage(bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut staged = NamedTempFile::new()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    Ok(staged)
}

fn read_staged(staged: &mut NamedTempFile) -> std::io::Result<Vec<u8>> {
    let file = staged.as_file_mut();
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ArchiveState::Archived.is_terminal());
        assert!(ArchiveState::FailedRetryable.is_terminal());
        assert!(!ArchiveState::Verified.is_terminal());
        assert_eq!(ArchiveState::FailedRetryable.to_string(), "failed_retryable");
    }

    #[test]
    fn staged_copy_reads_back() {
        let mut staged = stage(b"<File/>").unwrap();
        assert_eq!(read_staged(&mut staged).unwrap(), b"<File/>");
        let path = staged.path().to_path_buf();
        staged.close().unwrap();
        assert!(!path.exists());
    }
}
