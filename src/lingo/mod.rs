//! Lingo dialect: hierarchical, qualifier-coded EDI XML.
//!
//! A Lingo `File` holds one `Document` per purchase order or invoice.
//! Repeating elements (`DateLoop`, address blocks, `ItemIDs`, `Quantities`)
//! say what their value means through a qualifier code; the code tables live
//! in [`qualifiers`].
//!
//! ```
//! use edibridge::lingo::{from_lingo_xml, to_lingo_xml};
//! use edibridge::core::*;
//! use rust_decimal_macros::dec;
//!
//! let order = OrderBuilder::new("PO-1")
//!     .invoice_number("INV-1")
//!     .add_line(LineItemBuilder::new("012345", dec!(4), dec!(2.50)).build())
//!     .build()
//!     .unwrap();
//!
//! let xml = to_lingo_xml(&[order], "SIL02").unwrap();
//! let parsed = from_lingo_xml(&xml).unwrap();
//! assert_eq!(parsed.orders[0].po_number, "PO-1");
//! assert_eq!(parsed.orders[0].line_items[0].quantities.invoiced(), dec!(4));
//! ```

mod parse;
pub mod qualifiers;
mod write;

pub use parse::{from_lingo_xml, from_lingo_xml_with};
pub use write::{ADDRESS_ELEMENT, DEFAULT_UOM, to_lingo_xml};
