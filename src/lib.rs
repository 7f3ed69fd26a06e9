//! # edibridge
//!
//! Purchase-order and invoice transcoding for a trading-partner SFTP
//! mailbox. Inbound documents arrive in one of two EDI XML dialects:
//!
//! - **Excel**: a flat SpreadsheetML table of pipe-delimited records,
//! - **Lingo**: hierarchical XML where qualifier codes say what each
//!   repeating element means.
//!
//! Both parse into the same [`Order`] model, which serializes to JSON for
//! the commerce backend. Outbound invoices go the other way, from JSON to
//! Lingo. Processed files are moved into an archive directory with a
//! copy, verify, delete protocol that never loses a file.
//!
//! All monetary values use [`rust_decimal::Decimal`]; dates are
//! [`chrono::NaiveDate`].
//!
//! ## Quick Start
//!
//! ```rust
//! use edibridge::transcode::{detect_and_parse, invoices_from_json, serialize_lingo};
//!
//! let invoices = invoices_from_json(br#"{"invoices": [{
//!     "poNumber": "PO-1001",
//!     "invoiceNumber": "INV-2001",
//!     "invoiceDate": "2025-03-10",
//!     "lineItems": [{"itemNo": "012345", "quantity": 4, "unitPrice": "12.50", "lineAmount": 50}]
//! }]}"#).unwrap();
//!
//! let xml = serialize_lingo(&invoices, "SIL02").unwrap();
//! let text = String::from_utf8(xml).unwrap();
//! assert!(text.contains("<InvoiceDate>3/10/2025</InvoiceDate>"));
//!
//! let back = detect_and_parse(&text).unwrap();
//! assert_eq!(back.orders[0].invoice_number, "INV-2001");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Order model, dates, line numbering, validation, transport contract, config |
//! | `lingo` | Lingo XML parse & serialize |
//! | `excel` | Excel SpreadsheetML parse & serialize |
//! | `transcode` (default) | Dialect detection, JSON in/out, mailbox service |
//! | `archive` (default) | Verified archive coordinator |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod config;

#[cfg(feature = "core")]
pub mod transport;

#[cfg(any(feature = "lingo", feature = "excel"))]
pub(crate) mod xml_utils;

#[cfg(feature = "lingo")]
pub mod lingo;

#[cfg(feature = "excel")]
pub mod excel;

#[cfg(feature = "transcode")]
pub mod transcode;

#[cfg(feature = "archive")]
pub mod archive;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
