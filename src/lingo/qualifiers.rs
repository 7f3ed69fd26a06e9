//! Qualifier code tables for the Lingo dialect.
//!
//! Every repeating Lingo element (dates, addresses, item identifiers,
//! quantities) carries a short code saying what its value means. The tables
//! below are the single place where those codes are mapped to model fields;
//! the parser and serializer only look codes up here.

use crate::core::{AddressSlot, DateField, ItemIdField, QtyField};

/// `DateQualifier` code → order date field.
pub const DATE_QUALIFIERS: &[(&str, DateField, &str)] = &[
    ("001", DateField::Cancel, "CancelAfter"),
    ("002", DateField::Due, "DueDate"),
    ("003", DateField::Invoice, "InvoiceDate"),
    ("004", DateField::PurchaseOrder, "PurchaseOrderDate"),
    ("007", DateField::Effective, "EffectiveDate"),
    ("010", DateField::Ship, "RequestedShip"),
    ("011", DateField::Ship, "Shipped"),
    ("074", DateField::RequestedDelivery, "RequestedDelivery"),
];

/// Look up the order field for a date qualifier. Unknown codes yield `None`.
pub fn date_field(code: &str) -> Option<DateField> {
    DATE_QUALIFIERS
        .iter()
        .find(|(c, _, _)| *c == code.trim())
        .map(|(_, field, _)| *field)
}

/// Qualifier code and `Desc` attribute used when writing a date field.
/// Ship dates are written as `011` (shipped).
pub fn date_qualifier(field: DateField) -> (&'static str, &'static str) {
    DATE_QUALIFIERS
        .iter()
        .rev()
        .find(|(_, f, _)| *f == field)
        .map(|(code, _, desc)| (*code, *desc))
        .unwrap_or(("", ""))
}

/// `BillAndShipToCode` → address slot.
pub const ADDRESS_CODES: &[(&str, AddressSlot)] = &[
    ("BT", AddressSlot::BillTo),
    ("ST", AddressSlot::ShipTo),
    ("SF", AddressSlot::ShipFrom),
    ("RE", AddressSlot::RemitTo),
    ("VN", AddressSlot::Vendor),
];

pub fn address_slot(code: &str) -> Option<AddressSlot> {
    ADDRESS_CODES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
        .map(|(_, slot)| *slot)
}

pub fn address_code(slot: AddressSlot) -> &'static str {
    ADDRESS_CODES
        .iter()
        .find(|(_, s)| *s == slot)
        .map(|(c, _)| *c)
        .unwrap_or("")
}

/// How an item identifier row matches the `Desc` attribute of its qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescMatch {
    /// Any description, including none.
    Any,
    /// Description contains this text (ASCII case-insensitive).
    Contains(&'static str),
}

impl DescMatch {
    fn matches(&self, desc: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Contains(needle) => desc.is_some_and(|d| {
                d.to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase())
            }),
        }
    }
}

/// `IdQualifier` code plus description → item identifier slot.
///
/// `UA` and `UK` are overloaded across document variants: some partners send
/// a GTIN-14 under them and say so only in the description. Rows are
/// checked in order, so the description-specific rows come first.
pub const ITEM_ID_QUALIFIERS: &[(&str, DescMatch, ItemIdField)] = &[
    ("UK", DescMatch::Contains("GTIN"), ItemIdField::Gtin),
    ("UA", DescMatch::Contains("GTIN"), ItemIdField::Gtin),
    ("UP", DescMatch::Any, ItemIdField::VendorItemNo),
    ("UA", DescMatch::Any, ItemIdField::UnitUpc),
    ("UK", DescMatch::Any, ItemIdField::CaseUpc),
    ("IN", DescMatch::Any, ItemIdField::BuyerItemNo),
    ("VN", DescMatch::Any, ItemIdField::VendorPartNo),
];

pub fn item_id_field(code: &str, desc: Option<&str>) -> Option<ItemIdField> {
    let code = code.trim();
    ITEM_ID_QUALIFIERS
        .iter()
        .find(|(c, m, _)| *c == code && m.matches(desc))
        .map(|(_, _, field)| *field)
}

/// Code and `Desc` attribute written for an item identifier slot.
pub fn item_id_qualifier(field: ItemIdField) -> (&'static str, Option<&'static str>) {
    match field {
        ItemIdField::VendorItemNo => ("UP", None),
        ItemIdField::UnitUpc => ("UA", Some("UPCConsumerPackageCode")),
        ItemIdField::CaseUpc => ("UK", Some("UPCCaseCode")),
        ItemIdField::Gtin => ("UK", Some("GTINNumber")),
        ItemIdField::BuyerItemNo => ("IN", Some("BuyerItemNumber")),
        ItemIdField::VendorPartNo => ("VN", Some("VendorItemNumber")),
    }
}

/// Which document family a quantity is read in; `39` means "invoiced" on
/// invoices and "shipped" everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyContext {
    Invoice,
    Other,
}

impl QtyContext {
    /// Context from a `DocumentType` value (`810` is an invoice).
    pub fn from_document_type(document_type: &str) -> Self {
        if document_type.trim() == "810" {
            Self::Invoice
        } else {
            Self::Other
        }
    }
}

/// Target of a quantity qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyTarget {
    Field(QtyField),
    ByContext { invoice: QtyField, other: QtyField },
}

pub const QTY_QUALIFIERS: &[(&str, QtyTarget)] = &[
    ("38", QtyTarget::Field(QtyField::Ordered)),
    ("01", QtyTarget::Field(QtyField::Ordered)),
    (
        "39",
        QtyTarget::ByContext {
            invoice: QtyField::Invoiced,
            other: QtyField::Shipped,
        },
    ),
    ("27", QtyTarget::Field(QtyField::Acknowledged)),
    ("31", QtyTarget::Field(QtyField::Changed)),
    ("ZZ", QtyTarget::Field(QtyField::Original)),
    ("9N", QtyTarget::Field(QtyField::Component)),
];

pub fn qty_field(code: &str, ctx: QtyContext) -> Option<QtyField> {
    let code = code.trim();
    QTY_QUALIFIERS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, target)| match (*target, ctx) {
            (QtyTarget::Field(f), _) => f,
            (QtyTarget::ByContext { invoice, .. }, QtyContext::Invoice) => invoice,
            (QtyTarget::ByContext { other, .. }, QtyContext::Other) => other,
        })
}
