use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::EdiError;
use super::numbering::number_lines;
use super::types::*;
use super::validation;

/// Builder for constructing outbound orders and invoices.
///
/// ```
/// use edibridge::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = OrderBuilder::new("PO-1001")
///     .invoice_number("INV-2001")
///     .customer_no("C-42")
///     .invoice_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
///     .bill_to(AddressBuilder::new("Acme Stores").city("Dallas").state("TX").build())
///     .add_line(LineItemBuilder::new("012345", dec!(4), dec!(12.50)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.line_items[0].line_no, "0001");
/// ```
pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    pub fn new(po_number: impl Into<String>) -> Self {
        Self {
            order: Order {
                po_number: po_number.into(),
                ..Default::default()
            },
        }
    }

    pub fn document_id(mut self, id: impl Into<String>) -> Self {
        self.order.document_id = id.into();
        self
    }

    pub fn company_code(mut self, code: impl Into<String>) -> Self {
        self.order.company_code = code.into();
        self
    }

    pub fn customer_no(mut self, no: impl Into<String>) -> Self {
        self.order.customer_no = no.into();
        self
    }

    pub fn invoice_number(mut self, no: impl Into<String>) -> Self {
        self.order.invoice_number = no.into();
        self
    }

    pub fn vendor_no(mut self, no: impl Into<String>) -> Self {
        self.order.vendor_no = no.into();
        self
    }

    pub fn po_date(mut self, date: NaiveDate) -> Self {
        self.order.po_date = Some(date);
        self
    }

    pub fn invoice_date(mut self, date: NaiveDate) -> Self {
        self.order.invoice_date = Some(date);
        self
    }

    pub fn ship_date(mut self, date: NaiveDate) -> Self {
        self.order.ship_date = Some(date);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.order.due_date = Some(date);
        self
    }

    pub fn total_amount(mut self, amount: Decimal) -> Self {
        self.order.total_amount = Some(amount);
        self
    }

    pub fn tax_amount(mut self, amount: Decimal) -> Self {
        self.order.tax_amount = Some(amount);
        self
    }

    pub fn payment_terms(mut self, terms: impl Into<String>) -> Self {
        self.order.payment_terms = terms.into();
        self
    }

    pub fn terms(mut self, terms: Terms) -> Self {
        self.order.terms = Some(terms);
        self
    }

    pub fn bill_to(mut self, address: Address) -> Self {
        self.order.bill_to = Some(address);
        self
    }

    pub fn ship_to(mut self, address: Address) -> Self {
        self.order.ship_to = Some(address);
        self
    }

    pub fn remit_to(mut self, address: Address) -> Self {
        self.order.remit_to = Some(address);
        self
    }

    pub fn vendor(mut self, address: Address) -> Self {
        self.order.vendor = Some(address);
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.order.notes.push(Note {
            code: String::new(),
            text: text.into(),
        });
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.order.line_items.push(line);
        self
    }

    /// Assign missing line numbers, then validate.
    pub fn build(mut self) -> Result<Order, EdiError> {
        number_lines(&mut self.order);

        let errors = validation::validate_order(&self.order);
        if !errors.is_empty() {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(EdiError::Validation(msgs.join("; ")));
        }
        Ok(self.order)
    }
}

/// Builder for [`LineItem`].
pub struct LineItemBuilder {
    line: LineItem,
}

impl LineItemBuilder {
    /// Line with vendor item number, invoiced quantity and unit price.
    /// `line_amount` defaults to `quantity * unit_price`.
    pub fn new(item_no: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        let mut line = LineItem {
            unit_price: Some(unit_price),
            line_amount: Some(quantity * unit_price),
            ..Default::default()
        };
        line.item_ids.vendor_item_no = item_no.into();
        line.quantities.set(QtyField::Invoiced, quantity);
        Self { line }
    }

    pub fn line_no(mut self, no: impl Into<String>) -> Self {
        self.line.line_no = no.into();
        self
    }

    pub fn item_id(mut self, field: ItemIdField, value: impl Into<String>) -> Self {
        self.line.item_ids.set(field, value);
        self
    }

    pub fn quantity(mut self, field: QtyField, qty: Decimal) -> Self {
        self.line.quantities.set(field, qty);
        self
    }

    pub fn unit_of_measure(mut self, uom: impl Into<String>) -> Self {
        self.line.unit_of_measure = uom.into();
        self
    }

    pub fn line_amount(mut self, amount: Decimal) -> Self {
        self.line.line_amount = Some(amount);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.line.description = text.into();
        self
    }

    pub fn pack_size(mut self, size: Decimal) -> Self {
        self.line.pack_size = Some(size);
        self
    }

    pub fn charge(mut self, charge: ChargeOrAllowance) -> Self {
        self.line.charges.push(charge);
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.line.notes.push(Note {
            code: String::new(),
            text: text.into(),
        });
        self
    }

    pub fn build(self) -> LineItem {
        self.line
    }
}

/// Builder for [`Address`].
pub struct AddressBuilder {
    address: Address,
}

impl AddressBuilder {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            address: Address {
                company_name: company_name.into(),
                ..Default::default()
            },
        }
    }

    pub fn store_number(mut self, no: impl Into<String>) -> Self {
        self.address.store_number = no.into();
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.address.street = street.into();
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.address.city = city.into();
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.address.state = state.into();
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.address.zip = zip.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.address.country = country.into();
        self
    }

    pub fn build(self) -> Address {
        self.address
    }
}
