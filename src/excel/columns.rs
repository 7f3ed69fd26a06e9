//! Known columns of the flat order table.

use crate::core::{AddressSlot, DateField, ItemIdField, QtyField};

/// A column the Excel dialect knows how to read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    DocumentId,
    CompanyCode,
    CustomerNo,
    PoNumber,
    VendorNo,
    PoDate,
    ShipDate,
    CancelDate,
    RequestedDeliveryDate,
    TotalAmount,
    TaxAmount,
    TotalCases,
    TotalWeight,
    PaymentTerms,
    ShipToStoreNumber,
    ShipToName,
    ShipToStreet,
    ShipToCity,
    ShipToState,
    ShipToZip,
    LineNo,
    ItemNo,
    UnitUpc,
    Description,
    Quantity,
    UnitOfMeasure,
    UnitPrice,
    LineAmount,
    PackSize,
}

/// Where a column's value lands in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Header,
    Date(DateField),
    Amount,
    Address(AddressSlot),
    ItemId(ItemIdField),
    Qty(QtyField),
    Line,
    LineAmount,
}

impl Column {
    /// All columns in the order they are written.
    pub const ALL: [Column; 29] = [
        Column::DocumentId,
        Column::CompanyCode,
        Column::CustomerNo,
        Column::PoNumber,
        Column::VendorNo,
        Column::PoDate,
        Column::ShipDate,
        Column::CancelDate,
        Column::RequestedDeliveryDate,
        Column::TotalAmount,
        Column::TaxAmount,
        Column::TotalCases,
        Column::TotalWeight,
        Column::PaymentTerms,
        Column::ShipToStoreNumber,
        Column::ShipToName,
        Column::ShipToStreet,
        Column::ShipToCity,
        Column::ShipToState,
        Column::ShipToZip,
        Column::LineNo,
        Column::ItemNo,
        Column::UnitUpc,
        Column::Description,
        Column::Quantity,
        Column::UnitOfMeasure,
        Column::UnitPrice,
        Column::LineAmount,
        Column::PackSize,
    ];

    /// Header text written for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Column::DocumentId => "DocumentId",
            Column::CompanyCode => "CompanyCode",
            Column::CustomerNo => "CustomerNo",
            Column::PoNumber => "PoNumber",
            Column::VendorNo => "VendorNo",
            Column::PoDate => "PoDate",
            Column::ShipDate => "ShipDate",
            Column::CancelDate => "CancelDate",
            Column::RequestedDeliveryDate => "RequestedDeliveryDate",
            Column::TotalAmount => "TotalAmount",
            Column::TaxAmount => "TaxAmount",
            Column::TotalCases => "TotalCases",
            Column::TotalWeight => "TotalWeight",
            Column::PaymentTerms => "PaymentTerms",
            Column::ShipToStoreNumber => "ShipToStoreNumber",
            Column::ShipToName => "ShipToName",
            Column::ShipToStreet => "ShipToStreet",
            Column::ShipToCity => "ShipToCity",
            Column::ShipToState => "ShipToState",
            Column::ShipToZip => "ShipToZip",
            Column::LineNo => "LineNo",
            Column::ItemNo => "ItemNo",
            Column::UnitUpc => "UnitUpc",
            Column::Description => "Description",
            Column::Quantity => "Quantity",
            Column::UnitOfMeasure => "UnitOfMeasure",
            Column::UnitPrice => "UnitPrice",
            Column::LineAmount => "LineAmount",
            Column::PackSize => "PackSize",
        }
    }

    /// Extra spellings seen in partner exports, already normalized.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::DocumentId => &["docid", "documentnumber"],
            Column::PoNumber => &["purchaseordernumber", "po"],
            Column::PoDate => &["purchaseorderdate", "orderdate"],
            Column::ShipToName => &["shiptocompanyname", "storename"],
            Column::ShipToStoreNumber => &["storenumber", "store"],
            Column::ItemNo => &["vendoritemno", "upc", "itemnumber"],
            Column::Quantity => &["orderedquantity", "qty"],
            Column::UnitOfMeasure => &["uom"],
            Column::UnitPrice => &["price", "cost"],
            _ => &[],
        }
    }

    /// Match a header cell, ignoring case, whitespace and separators.
    pub fn from_header(raw: &str) -> Option<Column> {
        let key = normalize_header(raw);
        if key.is_empty() {
            return None;
        }
        Column::ALL.into_iter().find(|c| {
            normalize_header(c.header()) == key || c.aliases().contains(&key.as_str())
        })
    }

    pub fn target(&self) -> Target {
        match self {
            Column::DocumentId
            | Column::CompanyCode
            | Column::CustomerNo
            | Column::PoNumber
            | Column::VendorNo
            | Column::PaymentTerms => Target::Header,
            Column::PoDate => Target::Date(DateField::PurchaseOrder),
            Column::ShipDate => Target::Date(DateField::Ship),
            Column::CancelDate => Target::Date(DateField::Cancel),
            Column::RequestedDeliveryDate => Target::Date(DateField::RequestedDelivery),
            Column::TotalAmount | Column::TaxAmount | Column::TotalCases | Column::TotalWeight => {
                Target::Amount
            }
            Column::ShipToStoreNumber
            | Column::ShipToName
            | Column::ShipToStreet
            | Column::ShipToCity
            | Column::ShipToState
            | Column::ShipToZip => Target::Address(AddressSlot::ShipTo),
            Column::ItemNo => Target::ItemId(ItemIdField::VendorItemNo),
            Column::UnitUpc => Target::ItemId(ItemIdField::UnitUpc),
            Column::Quantity => Target::Qty(QtyField::Ordered),
            Column::LineNo | Column::Description | Column::UnitOfMeasure => Target::Line,
            Column::UnitPrice | Column::LineAmount | Column::PackSize => Target::LineAmount,
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
