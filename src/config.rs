//! Mailbox layout and outbound settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transport::join_path;

/// Where documents live on the trading-partner mailbox and how outbound
/// invoices are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Directory inbound purchase orders are dropped into.
    #[serde(default = "default_inbound_dir")]
    pub inbound_dir: String,
    /// Subdirectory of `inbound_dir` processed files are archived to.
    #[serde(default = "default_archive_subdir")]
    pub archive_subdir: String,
    /// Directory outbound invoices are uploaded to.
    #[serde(default = "default_outbound_dir")]
    pub outbound_dir: String,
    /// File extension (without the dot) of mailbox documents.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Company code written into every outbound document.
    #[serde(default = "default_company_code")]
    pub company_code: String,
    #[serde(default = "default_invoice_file_prefix")]
    pub invoice_file_prefix: String,
    /// Local directory invoices are written to when the upload fails.
    #[serde(default)]
    pub local_fallback_dir: Option<PathBuf>,
}

fn default_inbound_dir() -> String {
    "/EDI850_Orders".into()
}

fn default_archive_subdir() -> String {
    "Archived".into()
}

fn default_outbound_dir() -> String {
    "/EDI810_Invoices".into()
}

fn default_extension() -> String {
    "xml".into()
}

fn default_company_code() -> String {
    "SIL02".into()
}

fn default_invoice_file_prefix() -> String {
    "EDI810_Invoice_".into()
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            inbound_dir: default_inbound_dir(),
            archive_subdir: default_archive_subdir(),
            outbound_dir: default_outbound_dir(),
            extension: default_extension(),
            company_code: default_company_code(),
            invoice_file_prefix: default_invoice_file_prefix(),
            local_fallback_dir: None,
        }
    }
}

impl MailboxConfig {
    pub fn builder() -> MailboxConfigBuilder {
        MailboxConfigBuilder::default()
    }

    /// Defaults overlaid with `SFTP_REMOTE_PATH`, `EDI_OUTBOUND_PATH`,
    /// `EDI_COMPANY_CODE` and `EDI_LOCAL_FALLBACK_DIR` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(dir) = var("SFTP_REMOTE_PATH") {
            config.inbound_dir = dir;
        }
        if let Some(dir) = var("EDI_OUTBOUND_PATH") {
            config.outbound_dir = dir;
        }
        if let Some(code) = var("EDI_COMPANY_CODE") {
            config.company_code = code;
        }
        if let Some(dir) = var("EDI_LOCAL_FALLBACK_DIR") {
            config.local_fallback_dir = Some(PathBuf::from(dir));
        }
        config
    }

    /// `<inbound_dir>/<archive_subdir>`.
    pub fn archive_dir(&self) -> String {
        join_path(&self.inbound_dir, &self.archive_subdir)
    }

    pub fn inbound_path(&self, filename: &str) -> String {
        join_path(&self.inbound_dir, filename)
    }

    pub fn archive_path(&self, filename: &str) -> String {
        join_path(&self.archive_dir(), filename)
    }

    /// Outbound invoice file name for a `YYYYmmddHHMMSS` timestamp.
    pub fn invoice_filename(&self, timestamp: &str) -> String {
        format!(
            "{}{}.{}",
            self.invoice_file_prefix,
            timestamp,
            self.extension.trim_start_matches('.')
        )
    }
}

/// Builder for [`MailboxConfig`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct MailboxConfigBuilder {
    config: MailboxConfig,
}

impl MailboxConfigBuilder {
    pub fn inbound_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.inbound_dir = dir.into();
        self
    }

    pub fn archive_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.config.archive_subdir = subdir.into();
        self
    }

    pub fn outbound_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.outbound_dir = dir.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    pub fn company_code(mut self, code: impl Into<String>) -> Self {
        self.config.company_code = code.into();
        self
    }

    pub fn invoice_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.invoice_file_prefix = prefix.into();
        self
    }

    pub fn local_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.local_fallback_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> MailboxConfig {
        self.config
    }
}
