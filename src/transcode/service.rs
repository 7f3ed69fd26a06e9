use chrono::Local;
use serde::Serialize;
use std::fs;

use super::{detect_and_parse_with, serialize_lingo};
use crate::config::MailboxConfig;
use crate::core::*;
use crate::transport::{RemoteFile, Session, Transport, checked_filename, join_path};

/// Outcome of parsing a batch of mailbox files.
#[derive(Debug, Default)]
pub struct BatchParse {
    pub documents: Vec<ParsedDocument>,
    pub failures: Vec<FileFailure>,
}

impl BatchParse {
    /// All orders from every successfully parsed file.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.documents.iter().flat_map(|d| d.orders.iter())
    }
}

/// Where an exported invoice file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub filename: String,
    /// Remote path when uploaded, local path when written to the fallback.
    pub location: String,
    pub uploaded: bool,
    pub size: usize,
    pub invoice_count: usize,
}

/// Reads orders from and writes invoices to a partner mailbox.
pub struct TranscodingService<T: Transport> {
    transport: T,
    config: MailboxConfig,
    dates: DateNormalizer,
}

impl<T: Transport> TranscodingService<T> {
    pub fn new(transport: T, config: MailboxConfig) -> Self {
        Self {
            transport,
            config,
            dates: DateNormalizer::new(),
        }
    }

    /// Replace the date normalizer (fixes the fallback date in tests).
    pub fn with_dates(mut self, dates: DateNormalizer) -> Self {
        self.dates = dates;
        self
    }

    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    /// Documents waiting in the inbound directory.
    pub fn list_mailbox(&self) -> Result<Vec<RemoteFile>, EdiError> {
        let mut session = self.transport.connect()?;
        let listed = session.list_files(&self.config.inbound_dir);
        session.disconnect();
        let files = listed?;
        tracing::info!(dir = %self.config.inbound_dir, count = files.len(), "listed mailbox");
        Ok(files)
    }

    /// Download and parse one inbound file. `name` is reduced to its base
    /// name and must carry the configured extension.
    pub fn fetch_file(&self, name: &str) -> Result<ParsedDocument, EdiError> {
        let filename = self.checked_name(name)?;
        let mut session = self.transport.connect()?;
        let result = self.parse_remote(&mut session, &filename);
        session.disconnect();
        result
    }

    /// Download one inbound file unparsed, for viewing the XML as sent.
    /// Name checks match [`fetch_file`](Self::fetch_file); an empty file
    /// is reported as a read failure.
    pub fn fetch_raw(&self, name: &str) -> Result<Vec<u8>, EdiError> {
        let filename = self.checked_name(name)?;
        let path = self.config.inbound_path(&filename);
        let mut session = self.transport.connect()?;
        let result = session.read_file(&path);
        session.disconnect();
        let bytes = result?;
        if bytes.is_empty() {
            tracing::warn!(path = %path, "inbound file is empty");
            return Err(TransportError::Read {
                path,
                reason: "file not found or empty".into(),
            }
            .into());
        }
        tracing::debug!(path = %path, size = bytes.len(), "fetched raw file");
        Ok(bytes)
    }

    /// Parse every file in the inbound directory. Per-file failures are
    /// collected; only failing to connect or list aborts.
    pub fn fetch_orders(&self) -> Result<BatchParse, EdiError> {
        let mut session = self.transport.connect()?;
        let listed = session.list_files(&self.config.inbound_dir);
        let files = match listed {
            Ok(files) => files,
            Err(e) => {
                session.disconnect();
                return Err(e.into());
            }
        };
        let names: Vec<String> = files.into_iter().map(|f| f.filename).collect();
        let batch = self.parse_with(&mut session, &names);
        session.disconnect();
        Ok(batch)
    }

    /// Parse the named inbound files over one session.
    pub fn parse_files(&self, names: &[String]) -> Result<BatchParse, EdiError> {
        let mut session = self.transport.connect()?;
        let batch = self.parse_with(&mut session, names);
        session.disconnect();
        Ok(batch)
    }

    fn parse_with(&self, session: &mut T::Session, names: &[String]) -> BatchParse {
        tracing::info!(files = names.len(), "parsing mailbox batch");
        let mut batch = BatchParse::default();
        for name in names {
            let parsed = self
                .checked_name(name)
                .and_then(|filename| self.parse_remote(session, &filename));
            match parsed {
                Ok(doc) => batch.documents.push(doc),
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "failed to parse mailbox file");
                    batch.failures.push(FileFailure::new(name.clone(), &e));
                }
            }
        }
        tracing::info!(
            parsed = batch.documents.len(),
            failed = batch.failures.len(),
            "mailbox batch complete"
        );
        batch
    }

    fn parse_remote(
        &self,
        session: &mut T::Session,
        filename: &str,
    ) -> Result<ParsedDocument, EdiError> {
        let path = self.config.inbound_path(filename);
        let bytes = session.read_file(&path)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| {
            EdiError::MalformedDocument(format!("{filename} is not UTF-8: {e}"))
        })?;
        let parsed = detect_and_parse_with(text, &self.dates)?;
        for w in &parsed.warnings {
            tracing::warn!(file = %filename, warning = %w, "field coerced");
        }
        Ok(parsed.with_source_file(filename))
    }

    fn checked_name(&self, name: &str) -> Result<String, EdiError> {
        checked_filename(name, &self.config.extension)
    }

    /// Serialize invoices as Lingo and upload them to the outbound
    /// directory. When the upload fails and a local fallback directory is
    /// configured the file is written there instead.
    pub fn export_invoices(&self, invoices: &[Order]) -> Result<ExportReceipt, EdiError> {
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        self.export_invoices_as(invoices, &self.config.invoice_filename(&timestamp))
    }

    /// [`export_invoices`](Self::export_invoices) with an explicit file name.
    pub fn export_invoices_as(
        &self,
        invoices: &[Order],
        filename: &str,
    ) -> Result<ExportReceipt, EdiError> {
        let bytes = serialize_lingo(invoices, &self.config.company_code)?;
        let remote_path = join_path(&self.config.outbound_dir, filename);
        let receipt = |location: String, uploaded: bool| ExportReceipt {
            filename: filename.to_string(),
            location,
            uploaded,
            size: bytes.len(),
            invoice_count: invoices.len(),
        };

        let upload = self.transport.connect().and_then(|mut session| {
            let result = session.write_file(&remote_path, &bytes);
            session.disconnect();
            result
        });

        match upload {
            Ok(()) => {
                tracing::info!(path = %remote_path, invoices = invoices.len(), "uploaded invoices");
                Ok(receipt(remote_path, true))
            }
            Err(e) => {
                let Some(dir) = &self.config.local_fallback_dir else {
                    tracing::error!(path = %remote_path, error = %e, "invoice upload failed");
                    return Err(e.into());
                };
                tracing::warn!(error = %e, dir = %dir.display(), "upload failed, saving invoices locally");
                fs::create_dir_all(dir)?;
                let local = dir.join(filename);
                fs::write(&local, &bytes)?;
                Ok(receipt(local.display().to_string(), false))
            }
        }
    }
}
