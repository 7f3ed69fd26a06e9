//! Convert a JSON invoice batch to Lingo and drop it into a local mailbox.
//!
//! ```sh
//! RUST_LOG=edibridge=debug cargo run --example export_invoices -- invoices.json /srv/mailbox
//! ```
//!
//! Without arguments a built-in invoice is exported into a temporary
//! directory.

use std::path::PathBuf;

use edibridge::config::MailboxConfig;
use edibridge::transcode::{TranscodingService, invoices_from_json};
use edibridge::transport::LocalTransport;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"{"invoices": [{
    "poNumber": "PO-1001",
    "invoiceNumber": "INV-2001",
    "invoiceDate": "2025-03-10",
    "dueDate": "2025-04-09",
    "customerNo": "C-77",
    "totalAmount": "50.00",
    "paymentTerms": "Net 30",
    "shipTo": {"companyName": "Acme DC 7", "city": "Joliet", "state": "IL"},
    "lineItems": [
        {"itemNo": "012345", "quantity": 4, "unitPrice": "12.50", "lineAmount": 50}
    ]
}]}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let json = match args.next() {
        Some(path) => std::fs::read(path)?,
        None => SAMPLE.as_bytes().to_vec(),
    };

    let scratch = tempfile::tempdir()?;
    let root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| scratch.path().to_path_buf());

    let config = MailboxConfig::from_env();
    std::fs::create_dir_all(root.join(config.outbound_dir.trim_start_matches('/')))?;

    let invoices = invoices_from_json(&json)?;
    let service = TranscodingService::new(LocalTransport::new(&root), config);
    let receipt = service.export_invoices(&invoices)?;

    println!(
        "wrote {} invoice(s), {} bytes, to {}",
        receipt.invoice_count, receipt.size, receipt.location
    );
    let written = root.join(receipt.location.trim_start_matches('/'));
    if receipt.uploaded && written.is_file() {
        println!("{}", std::fs::read_to_string(written)?);
    }
    Ok(())
}
