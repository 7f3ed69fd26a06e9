//! Excel dialect: a flat SpreadsheetML table with pipe-delimited records.
//!
//! Row 0 names the columns, every later row is one order line with the
//! order-level fields repeated. Lines are grouped back into orders by
//! `documentId-poNumber`.

pub mod columns;
mod parse;
mod write;

pub use columns::Column;
pub use parse::{FIELD_SEPARATOR, from_excel_xml, from_excel_xml_with};
pub use write::to_excel_xml;
