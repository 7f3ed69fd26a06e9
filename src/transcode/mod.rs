//! Detection, parsing and serialization entry points, plus the mailbox
//! batch service.
//!
//! ```
//! use edibridge::transcode::{detect_and_parse, serialize_lingo};
//! use edibridge::Dialect;
//!
//! let xml = r#"<File><Document>
//!   <PurchaseOrderNumber>PO-7</PurchaseOrderNumber>
//!   <DateLoop><DateQualifier>004</DateQualifier><Date>3/10/2025</Date></DateLoop>
//! </Document></File>"#;
//!
//! let parsed = detect_and_parse(xml).unwrap();
//! assert_eq!(parsed.dialect, Dialect::Lingo);
//! assert_eq!(parsed.orders[0].po_date.unwrap().to_string(), "2025-03-10");
//!
//! let bytes = serialize_lingo(&parsed.orders, "SIL02").unwrap();
//! assert!(String::from_utf8(bytes).unwrap().contains("<DocumentType>810</DocumentType>"));
//! ```

mod detect;
mod service;

use serde_json::Value;

use crate::core::*;
use crate::excel::from_excel_xml_with;
use crate::lingo::{from_lingo_xml_with, to_lingo_xml};

pub use detect::detect;
pub use service::{BatchParse, ExportReceipt, TranscodingService};

/// Detect the dialect of `raw` and parse it.
pub fn detect_and_parse(raw: &str) -> Result<ParsedDocument, EdiError> {
    detect_and_parse_with(raw, &DateNormalizer::new())
}

pub fn detect_and_parse_with(
    raw: &str,
    dates: &DateNormalizer,
) -> Result<ParsedDocument, EdiError> {
    let raw = raw.trim_start_matches('\u{feff}');
    let parsed = match detect(raw)? {
        Dialect::Excel => from_excel_xml_with(raw, dates)?,
        Dialect::Lingo => from_lingo_xml_with(raw, dates)?,
    };
    tracing::debug!(
        dialect = %parsed.dialect,
        orders = parsed.orders.len(),
        warnings = parsed.warnings.len(),
        "parsed document"
    );
    Ok(parsed)
}

/// [`detect_and_parse`] over raw bytes, which must be UTF-8.
pub fn detect_and_parse_bytes(raw: &[u8]) -> Result<ParsedDocument, EdiError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| EdiError::MalformedDocument(format!("document is not UTF-8: {e}")))?;
    detect_and_parse(text)
}

/// Validate orders and serialize them as an outbound Lingo file.
pub fn serialize_lingo(orders: &[Order], company_code: &str) -> Result<Vec<u8>, EdiError> {
    let errors = validate_batch(orders);
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(EdiError::Validation(joined));
    }
    Ok(to_lingo_xml(orders, company_code)?.into_bytes())
}

/// Decode outbound invoices from JSON: either `{"invoices": [...]}` or a
/// bare array. Empty input, a missing array and an empty array are errors.
/// Lines without a number are numbered in order.
pub fn invoices_from_json(bytes: &[u8]) -> Result<Vec<Order>, EdiError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(EdiError::Json("empty request body".into()));
    }
    let value: Value = serde_json::from_slice(bytes).map_err(|e| EdiError::Json(e.to_string()))?;
    let array = match value {
        array @ Value::Array(_) => array,
        Value::Object(mut map) => match map.remove("invoices") {
            Some(v @ Value::Array(_)) => v,
            _ => return Err(EdiError::Json("missing \"invoices\" array".into())),
        },
        _ => {
            return Err(EdiError::Json(
                "expected an object with \"invoices\" or an array".into(),
            ));
        }
    };
    let mut invoices: Vec<Order> =
        serde_json::from_value(array).map_err(|e| EdiError::Json(e.to_string()))?;
    if invoices.is_empty() {
        return Err(EdiError::Json("no invoices provided".into()));
    }
    for (i, invoice) in invoices.iter_mut().enumerate() {
        for w in number_lines(invoice) {
            let w = w.within(&format!("invoices[{i}]"));
            tracing::warn!(warning = %w, "line number reassigned");
        }
    }
    Ok(invoices)
}

/// Render a parsed document as pretty JSON (`{"format": ..., "orders": [...]}`).
pub fn to_json(parsed: &ParsedDocument) -> Result<String, EdiError> {
    serde_json::to_string_pretty(parsed).map_err(|e| EdiError::Json(e.to_string()))
}
