use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the two supported XML document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Flat pipe-delimited SpreadsheetML (`<Workbook>`).
    Excel,
    /// Hierarchical qualifier-coded EDI XML (`<File>` / `<Document>`).
    Lingo,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Lingo => "lingo",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase order or invoice: the aggregate root of the document model.
///
/// Monetary and quantity fields are stored as `Option<Decimal>` so that a
/// missing value stays distinguishable from an explicit zero, but every
/// reader goes through an accessor with a declared default of zero, and JSON
/// output always renders the defaulted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub company_code: String,
    #[serde(default)]
    pub customer_no: String,
    #[serde(default)]
    pub po_number: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub vendor_no: String,
    #[serde(default, with = "date_or_empty")]
    pub po_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub ship_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub cancel_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub requested_delivery_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, with = "date_or_empty")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "zero_default")]
    pub total_amount: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub tax_amount: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub total_cases: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub total_weight: Option<Decimal>,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub source_format: Option<Dialect>,
    #[serde(default)]
    pub bill_to: Option<Address>,
    #[serde(default)]
    pub ship_to: Option<Address>,
    #[serde(default)]
    pub ship_from: Option<Address>,
    #[serde(default)]
    pub remit_to: Option<Address>,
    #[serde(default)]
    pub vendor: Option<Address>,
    #[serde(default)]
    pub terms: Option<Terms>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Order {
    pub fn total_amount(&self) -> Decimal {
        self.total_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn total_cases(&self) -> Decimal {
        self.total_cases.unwrap_or(Decimal::ZERO)
    }

    pub fn total_weight(&self) -> Decimal {
        self.total_weight.unwrap_or(Decimal::ZERO)
    }

    /// Grouping key used by the flat dialect, which has no document boundary.
    pub fn group_key(&self) -> String {
        group_key(&self.document_id, &self.po_number)
    }

    pub fn address(&self, slot: AddressSlot) -> Option<&Address> {
        match slot {
            AddressSlot::BillTo => self.bill_to.as_ref(),
            AddressSlot::ShipTo => self.ship_to.as_ref(),
            AddressSlot::ShipFrom => self.ship_from.as_ref(),
            AddressSlot::RemitTo => self.remit_to.as_ref(),
            AddressSlot::Vendor => self.vendor.as_ref(),
        }
    }

    pub fn address_mut(&mut self, slot: AddressSlot) -> &mut Option<Address> {
        match slot {
            AddressSlot::BillTo => &mut self.bill_to,
            AddressSlot::ShipTo => &mut self.ship_to,
            AddressSlot::ShipFrom => &mut self.ship_from,
            AddressSlot::RemitTo => &mut self.remit_to,
            AddressSlot::Vendor => &mut self.vendor,
        }
    }

    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Invoice => self.invoice_date,
            DateField::PurchaseOrder => self.po_date,
            DateField::Ship => self.ship_date,
            DateField::Cancel => self.cancel_date,
            DateField::RequestedDelivery => self.requested_delivery_date,
            DateField::Effective => self.effective_date,
            DateField::Due => self.due_date,
        }
    }

    pub fn set_date(&mut self, field: DateField, date: NaiveDate) {
        let slot = match field {
            DateField::Invoice => &mut self.invoice_date,
            DateField::PurchaseOrder => &mut self.po_date,
            DateField::Ship => &mut self.ship_date,
            DateField::Cancel => &mut self.cancel_date,
            DateField::RequestedDelivery => &mut self.requested_delivery_date,
            DateField::Effective => &mut self.effective_date,
            DateField::Due => &mut self.due_date,
        };
        *slot = Some(date);
    }

    /// Find a line by its `line_no`.
    pub fn line_mut(&mut self, line_no: &str) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|l| l.line_no == line_no)
    }
}

/// Build the `documentId-poNumber` grouping key.
pub fn group_key(document_id: &str, po_number: &str) -> String {
    format!("{document_id}-{po_number}")
}

/// Order-level date fields addressable by qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Invoice,
    PurchaseOrder,
    Ship,
    Cancel,
    RequestedDelivery,
    Effective,
    Due,
}

/// Address slots on an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSlot {
    BillTo,
    ShipTo,
    ShipFrom,
    RemitTo,
    Vendor,
}

/// Postal address of a trading party.
///
/// Every field is a plain string that defaults to empty; the flat dialect
/// has no notion of null and round-trips depend on that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub store_number: String,
    pub duns_qualifier: String,
    #[serde(alias = "name")]
    pub company_name: String,
    pub street: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Order line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Zero-padded 4-digit line number, unique within the order.
    #[serde(default)]
    pub line_no: String,
    #[serde(default)]
    pub internal_line_number: String,
    #[serde(flatten)]
    pub item_ids: ItemIds,
    #[serde(flatten)]
    pub quantities: Quantities,
    #[serde(default)]
    pub unit_of_measure: String,
    #[serde(default, with = "zero_default")]
    pub unit_price: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub line_amount: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub pack_size: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub inners: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub eaches_per_inner: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub inners_per_pack: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub charges: Vec<ChargeOrAllowance>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl LineItem {
    pub fn unit_price(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO)
    }

    pub fn line_amount(&self) -> Decimal {
        self.line_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn pack_size(&self) -> Decimal {
        self.pack_size.unwrap_or(Decimal::ZERO)
    }

    pub fn inners(&self) -> Decimal {
        self.inners.unwrap_or(Decimal::ZERO)
    }

    pub fn eaches_per_inner(&self) -> Decimal {
        self.eaches_per_inner.unwrap_or(Decimal::ZERO)
    }

    pub fn inners_per_pack(&self) -> Decimal {
        self.inners_per_pack.unwrap_or(Decimal::ZERO)
    }
}

/// Item identifiers, one slot per qualifier meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemIds {
    /// `UP`: UPC / vendor item number.
    #[serde(alias = "itemNo")]
    pub vendor_item_no: String,
    /// `UA`: unit (consumer) UPC.
    pub unit_upc: String,
    /// `UK`: case UPC.
    pub case_upc: String,
    /// `UK`/`UA` described as a GTIN.
    pub gtin: String,
    /// `IN`: buyer's item number.
    pub buyer_item_no: String,
    /// `VN`: vendor part number.
    pub vendor_part_no: String,
}

/// Named item identifier slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemIdField {
    VendorItemNo,
    UnitUpc,
    CaseUpc,
    Gtin,
    BuyerItemNo,
    VendorPartNo,
}

impl ItemIds {
    pub fn get(&self, field: ItemIdField) -> &str {
        match field {
            ItemIdField::VendorItemNo => &self.vendor_item_no,
            ItemIdField::UnitUpc => &self.unit_upc,
            ItemIdField::CaseUpc => &self.case_upc,
            ItemIdField::Gtin => &self.gtin,
            ItemIdField::BuyerItemNo => &self.buyer_item_no,
            ItemIdField::VendorPartNo => &self.vendor_part_no,
        }
    }

    pub fn set(&mut self, field: ItemIdField, value: impl Into<String>) {
        let slot = match field {
            ItemIdField::VendorItemNo => &mut self.vendor_item_no,
            ItemIdField::UnitUpc => &mut self.unit_upc,
            ItemIdField::CaseUpc => &mut self.case_upc,
            ItemIdField::Gtin => &mut self.gtin,
            ItemIdField::BuyerItemNo => &mut self.buyer_item_no,
            ItemIdField::VendorPartNo => &mut self.vendor_part_no,
        };
        *slot = value.into();
    }
}

/// Line quantities, one slot per qualifier meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantities {
    #[serde(default, with = "zero_default")]
    pub ordered_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub shipped_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default", alias = "quantity")]
    pub invoiced_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub acknowledged_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub changed_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub original_quantity: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub component_quantity: Option<Decimal>,
}

/// Named quantity slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QtyField {
    Ordered,
    Shipped,
    Invoiced,
    Acknowledged,
    Changed,
    Original,
    Component,
}

impl Quantities {
    pub fn get(&self, field: QtyField) -> Decimal {
        self.slot(field).unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, field: QtyField, qty: Decimal) {
        *self.slot_mut(field) = Some(qty);
    }

    pub fn ordered(&self) -> Decimal {
        self.get(QtyField::Ordered)
    }

    pub fn shipped(&self) -> Decimal {
        self.get(QtyField::Shipped)
    }

    pub fn invoiced(&self) -> Decimal {
        self.get(QtyField::Invoiced)
    }

    fn slot(&self, field: QtyField) -> Option<Decimal> {
        match field {
            QtyField::Ordered => self.ordered_quantity,
            QtyField::Shipped => self.shipped_quantity,
            QtyField::Invoiced => self.invoiced_quantity,
            QtyField::Acknowledged => self.acknowledged_quantity,
            QtyField::Changed => self.changed_quantity,
            QtyField::Original => self.original_quantity,
            QtyField::Component => self.component_quantity,
        }
    }

    fn slot_mut(&mut self, field: QtyField) -> &mut Option<Decimal> {
        match field {
            QtyField::Ordered => &mut self.ordered_quantity,
            QtyField::Shipped => &mut self.shipped_quantity,
            QtyField::Invoiced => &mut self.invoiced_quantity,
            QtyField::Acknowledged => &mut self.acknowledged_quantity,
            QtyField::Changed => &mut self.changed_quantity,
            QtyField::Original => &mut self.original_quantity,
            QtyField::Component => &mut self.component_quantity,
        }
    }
}

/// Allowance or charge indicator (X12 248).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeIndicator {
    /// A: allowance.
    #[default]
    Allowance,
    /// C: charge.
    Charge,
}

impl ChargeIndicator {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Allowance => "A",
            Self::Charge => "C",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Allowance),
            "C" => Some(Self::Charge),
            _ => None,
        }
    }
}

/// Line-level allowance or charge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOrAllowance {
    #[serde(default)]
    pub sequence_no: String,
    #[serde(default)]
    pub indicator: ChargeIndicator,
    #[serde(default)]
    pub special_service_code: String,
    #[serde(default, with = "zero_default")]
    pub amount: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub method_of_handling_code: String,
}

impl ChargeOrAllowance {
    pub fn amount(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    pub fn rate(&self) -> Decimal {
        self.rate.unwrap_or(Decimal::ZERO)
    }
}

/// Payment terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    #[serde(default, rename = "type")]
    pub terms_type: String,
    #[serde(default)]
    pub basis: String,
    #[serde(default, with = "date_or_empty")]
    pub net_due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_due_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_days: Option<u32>,
    #[serde(default, with = "zero_default")]
    pub discount_percent: Option<Decimal>,
    #[serde(default, with = "zero_default")]
    pub discount_amount: Option<Decimal>,
}

impl Terms {
    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent.unwrap_or(Decimal::ZERO)
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount.unwrap_or(Decimal::ZERO)
    }
}

/// Free-text note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub code: String,
    pub text: String,
}

/// Serde adapter: absent decimals render as zero.
mod zero_default {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&value.unwrap_or(Decimal::ZERO), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        Option::<Decimal>::deserialize(d)
    }
}

/// Serde adapter: absent dates render as `""`; input accepts ISO or `M/D/YYYY`.
mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::super::dates::parse_date(s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{s}'"))),
        }
    }
}

/// Result of parsing one XML file: the orders it contained plus any
/// fields that had to be defaulted along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    #[serde(rename = "format")]
    pub dialect: Dialect,
    pub orders: Vec<Order>,
    #[serde(skip)]
    pub warnings: Vec<super::error::CoercionWarning>,
}

impl ParsedDocument {
    /// Stamp every order with the file it came from.
    pub fn with_source_file(mut self, filename: &str) -> Self {
        for order in &mut self.orders {
            order.source_file = filename.to_string();
        }
        self
    }
}
