//! Parse every order waiting in a local mailbox, print them as JSON and
//! archive the files that parsed.
//!
//! ```sh
//! SFTP_REMOTE_PATH=/EDI850_Orders cargo run --example archive_mailbox -- /srv/mailbox
//! ```
//!
//! Without an argument a temporary mailbox holding one Lingo order is used.

use std::path::PathBuf;

use edibridge::archive::ArchiveCoordinator;
use edibridge::config::MailboxConfig;
use edibridge::transcode::{TranscodingService, to_json};
use edibridge::transport::LocalTransport;
use tracing_subscriber::EnvFilter;

const SAMPLE_ORDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<File>
  <Document>
    <CompanyCode>SIL02</CompanyCode>
    <CustomerNumber>C-77</CustomerNumber>
    <DocumentType>850</DocumentType>
    <PurchaseOrderNumber>PO-1001</PurchaseOrderNumber>
    <Header>
      <PurchaseOrderDate>3/1/2025</PurchaseOrderDate>
    </Header>
    <Detail>
      <DetailLine>
        <CustomerLineNumber>1</CustomerLineNumber>
        <ItemIDs>
          <IdQualifier>VN</IdQualifier>
          <Id>012345</Id>
        </ItemIDs>
        <Quantities>
          <QtyQualifier>38</QtyQualifier>
          <Qty>4</Qty>
          <QtyUOM>CA</QtyUOM>
        </Quantities>
        <PriceCost>
          <PriceOrCost>12.50</PriceOrCost>
        </PriceCost>
      </DetailLine>
    </Detail>
  </Document>
</File>
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MailboxConfig::from_env();
    let scratch = tempfile::tempdir()?;
    let root = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let inbound = scratch.path().join(config.inbound_dir.trim_start_matches('/'));
            std::fs::create_dir_all(&inbound)?;
            std::fs::write(inbound.join("PO-1001.xml"), SAMPLE_ORDER)?;
            scratch.path().to_path_buf()
        }
    };

    let service = TranscodingService::new(LocalTransport::new(&root), config.clone());
    let batch = service.fetch_orders()?;
    for doc in &batch.documents {
        println!("{}", to_json(doc)?);
    }
    for failure in &batch.failures {
        eprintln!("skipped {}: {}", failure.filename, failure.reason);
    }

    let parsed: Vec<String> = batch
        .documents
        .iter()
        .filter_map(|d| d.orders.first())
        .map(|o| o.source_file.clone())
        .filter(|f| !f.is_empty())
        .collect();

    let coordinator = ArchiveCoordinator::new(LocalTransport::new(&root), config);
    let report = coordinator.archive_files(&parsed)?;
    println!(
        "archived {}, failed {}, source retained {}",
        report.archived.len(),
        report.failed.len(),
        report.source_retained.len()
    );
    Ok(())
}
