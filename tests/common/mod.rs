//! In-memory mailbox with failure injection, shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use edibridge::TransportError;
use edibridge::transport::{RemoteFile, Session, Transport, has_extension};

#[derive(Debug, Default)]
pub struct MailboxState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub fail_connect: bool,
    /// Paths whose write fails.
    pub fail_write: HashSet<String>,
    /// Paths whose write silently stores only half the bytes.
    pub truncate_write: HashSet<String>,
    /// Paths whose delete fails.
    pub fail_delete: HashSet<String>,
    /// Paths whose read drops the connection.
    pub drop_on_read: HashSet<String>,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
    pub deletes: Vec<String>,
    pub connects: usize,
    pub disconnects: usize,
}

/// Cloning shares the same mailbox, so a test keeps one handle for
/// inspection and gives the other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    pub state: Rc<RefCell<MailboxState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, bytes: impl AsRef<[u8]>) -> Self {
        self.put(path, bytes);
        self
    }

    pub fn put(&self, path: &str, bytes: impl AsRef<[u8]>) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), bytes.as_ref().to_vec());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path).cloned()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.borrow().files.contains_key(path)
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.borrow().deletes.clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }
}

impl Transport for MemoryTransport {
    type Session = MemorySession;

    fn connect(&self) -> Result<MemorySession, TransportError> {
        let mut state = self.state.borrow_mut();
        if state.fail_connect {
            return Err(TransportError::Connection("authentication refused".into()));
        }
        state.connects += 1;
        Ok(MemorySession {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MemorySession {
    state: Rc<RefCell<MailboxState>>,
}

impl Session for MemorySession {
    fn list_files(&mut self, dir: &str) -> Result<Vec<RemoteFile>, TransportError> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let state = self.state.borrow();
        Ok(state
            .files
            .iter()
            .filter_map(|(path, bytes)| {
                let name = path.strip_prefix(&prefix)?;
                (!name.contains('/') && has_extension(name, "xml")).then(|| RemoteFile {
                    filename: name.to_string(),
                    path: path.clone(),
                    size: bytes.len() as u64,
                    modified: None,
                })
            })
            .collect())
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.borrow_mut();
        state.reads.push(path.to_string());
        if state.drop_on_read.contains(path) {
            return Err(TransportError::Connection("connection reset by peer".into()));
        }
        state.files.get(path).cloned().ok_or_else(|| TransportError::Read {
            path: path.to_string(),
            reason: "no such file".into(),
        })
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.writes.push(path.to_string());
        if state.fail_write.contains(path) {
            return Err(TransportError::Write {
                path: path.to_string(),
                reason: "permission denied".into(),
            });
        }
        let stored = if state.truncate_write.contains(path) {
            bytes[..bytes.len() / 2].to_vec()
        } else {
            bytes.to_vec()
        };
        state.files.insert(path.to_string(), stored);
        Ok(())
    }

    fn delete_file(&mut self, path: &str) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        state.deletes.push(path.to_string());
        if state.fail_delete.contains(path) {
            return Err(TransportError::Delete {
                path: path.to_string(),
                reason: "file locked".into(),
            });
        }
        state.files.remove(path);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state.borrow_mut().disconnects += 1;
    }
}

pub const LINGO_PO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<File>
  <Document>
    <CompanyCode>SIL02</CompanyCode>
    <CustomerNumber>C-42</CustomerNumber>
    <Direction>Inbound</Direction>
    <DocumentType>850</DocumentType>
    <PurchaseOrderNumber>PO-1001</PurchaseOrderNumber>
    <InternalDocumentNumber>D-77</InternalDocumentNumber>
    <VendorNumber>V-9</VendorNumber>
    <Header>
      <DateLoop>
        <DateQualifier Desc="PurchaseOrderDate">004</DateQualifier>
        <Date>3/10/2025</Date>
      </DateLoop>
      <DateLoop>
        <DateQualifier Desc="RequestedShip">010</DateQualifier>
        <Date>2025-03-17</Date>
      </DateLoop>
      <DateLoop>
        <DateQualifier Desc="Mystery">999</DateQualifier>
        <Date>1/1/2020</Date>
      </DateLoop>
    </Header>
    <Name>
      <BillAndShipToCode>BT</BillAndShipToCode>
      <DUNSOrLocationNumber>0001</DUNSOrLocationNumber>
      <CompanyName>Acme Stores &amp; Co</CompanyName>
      <Address>1 Main St</Address>
      <Address>Suite 5</Address>
      <City>Dallas</City>
      <State>TX</State>
      <Zip>75001</Zip>
    </Name>
    <Name>
      <BillAndShipToCode>ST</BillAndShipToCode>
      <DUNSOrLocationNumber>0420</DUNSOrLocationNumber>
      <CompanyName>Acme Store 420</CompanyName>
      <City>Austin</City>
      <State>TX</State>
      <Zip>73301</Zip>
    </Name>
    <Name>
      <BillAndShipToCode>BY</BillAndShipToCode>
      <CompanyName>Nobody</CompanyName>
    </Name>
    <Detail>
      <DetailLine>
        <LineNumber>1</LineNumber>
        <ItemIDs>
          <IdQualifier>UP</IdQualifier>
          <Id>012345</Id>
        </ItemIDs>
        <ItemIDs>
          <IdQualifier Desc="GTINNumber">UK</IdQualifier>
          <Id>00012345000067</Id>
        </ItemIDs>
        <Quantities>
          <QtyQualifier>38</QtyQualifier>
          <QtyUOM>CA</QtyUOM>
          <Qty>4</Qty>
        </Quantities>
        <PriceCost>
          <PriceOrCost>12.50</PriceOrCost>
        </PriceCost>
        <ItemDescription>Widget</ItemDescription>
      </DetailLine>
    </Detail>
    <Detail>
      <DetailLine>
        <LineNumber>2</LineNumber>
        <ItemIds>
          <IdQualifier Desc="UPCConsumerPackageCode">UA</IdQualifier>
          <Id>099999000011</Id>
        </ItemIds>
        <Quantities>
          <QtyQualifier>39</QtyQualifier>
          <QtyUOM>EA</QtyUOM>
          <Qty>6</Qty>
        </Quantities>
        <PriceCost>
          <PriceOrCost>abc</PriceOrCost>
        </PriceCost>
      </DetailLine>
    </Detail>
    <ChargesAllowances>
      <DetailLineNumber>0002</DetailLineNumber>
      <AllowChrgIndicator>C</AllowChrgIndicator>
      <SpecialServicesCode>D240</SpecialServicesCode>
      <AllowChrgAmt>3.5</AllowChrgAmt>
    </ChargesAllowances>
    <Notes>
      <DetailLineNumber>1</DetailLineNumber>
      <NoteCode>GEN</NoteCode>
      <Note>Fragile</Note>
    </Notes>
    <Notes>
      <NoteCode>GEN</NoteCode>
      <Note>Deliver to dock 4</Note>
    </Notes>
    <Term>
      <TermsType>01</TermsType>
      <TermsBasis>3</TermsBasis>
      <TermsNetDueDays>30</TermsNetDueDays>
      <TermsDescription>Net 30</TermsDescription>
    </Term>
  </Document>
</File>
"#;

/// Excel workbook with two orders: three lines for D1-P1, two for D1-P2.
pub fn excel_workbook() -> String {
    let rows = [
        "DocumentId|PoNumber|PoDate|ShipToName|LineNo|ItemNo|Quantity|UnitPrice|Description",
        "D1|P1|3/10/2025|Store 1|1|A-1|2|1.50|First",
        "D1|P1|3/10/2025|Store 1|2|A-2|3|2.00|Second",
        "D1|P2|2025-03-11|Store 2||B-1|1|9.99|Other order",
        "D1|P1|3/10/2025|Store 1||A-3",
        "D1|P2|2025-03-11|Store 2||B-2|5",
    ];
    workbook(&rows)
}

pub fn workbook(rows: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0"?>
<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet" xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
 <Worksheet ss:Name="Orders">
  <Table>
"#,
    );
    for row in rows {
        xml.push_str(&format!(
            "   <Row><Cell><Data ss:Type=\"String\">{row}</Data></Cell></Row>\n"
        ));
    }
    xml.push_str("  </Table>\n </Worksheet>\n</Workbook>\n");
    xml
}
