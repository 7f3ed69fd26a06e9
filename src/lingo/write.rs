use rust_decimal::Decimal;

use super::qualifiers;
use crate::core::*;
use crate::xml_utils::{XmlResult, XmlWriter, format_fixed, format_quantity};

/// Unit of measure written when a line carries none.
pub const DEFAULT_UOM: &str = "CA";

/// Element name used for address blocks.
pub const ADDRESS_ELEMENT: &str = "n";

/// Serialize orders as an outbound 810 Lingo `File`.
///
/// Every order becomes one `Document`. Bill-to and ship-to blocks are always
/// written (empty when the order has none); other parties only when present.
pub fn to_lingo_xml(orders: &[Order], company_code: &str) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element("File")?;
    for order in orders {
        write_document(&mut w, order, company_code)?;
    }
    w.end_element("File")?;
    w.into_string()
}

fn write_document(w: &mut XmlWriter, order: &Order, company_code: &str) -> Result<(), EdiError> {
    w.start_element("Document")?;
    w.text_element("CompanyCode", company_code)?
        .text_element("CustomerNumber", &order.customer_no)?
        .text_element("Direction", "Outbound")?
        .text_element("DocumentType", "810")?
        .text_element("Footprint", "INV")?
        .text_element("Version", "3.0")?
        .text_element("PurchaseOrderNumber", &order.po_number)?
        .text_element("InvoiceNumber", &order.invoice_number)?;

    write_header(w, order)?;

    write_address(w, AddressSlot::BillTo, order.bill_to.as_ref(), true)?;
    write_address(w, AddressSlot::ShipTo, order.ship_to.as_ref(), true)?;
    for slot in [AddressSlot::ShipFrom, AddressSlot::RemitTo, AddressSlot::Vendor] {
        write_address(w, slot, order.address(slot), false)?;
    }

    for (i, line) in order.line_items.iter().enumerate() {
        write_line(w, i + 1, line)?;
    }

    write_terms(w, order)?;

    w.end_element("Document")?;
    Ok(())
}

fn display_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(to_lingo_display).unwrap_or_default()
}

fn write_date_loop(w: &mut XmlWriter, field: DateField, date: &str) -> Result<(), EdiError> {
    let (code, desc) = qualifiers::date_qualifier(field);
    w.start_element("DateLoop")?
        .text_element_with_attrs("DateQualifier", code, &[("Desc", desc)])?
        .text_element("Date", date)?
        .end_element("DateLoop")?;
    Ok(())
}

fn write_header(w: &mut XmlWriter, order: &Order) -> Result<(), EdiError> {
    let invoice_date = display_date(order.invoice_date);
    w.start_element("Header")?;
    w.text_element("InvoiceDate", &invoice_date)?;

    write_date_loop(w, DateField::Invoice, &invoice_date)?;
    for field in [
        DateField::Due,
        DateField::PurchaseOrder,
        DateField::Ship,
        DateField::Cancel,
        DateField::RequestedDelivery,
        DateField::Effective,
    ] {
        if let Some(date) = order.date(field) {
            write_date_loop(w, field, &to_lingo_display(date))?;
        }
    }

    let cartons: Decimal = order
        .line_items
        .iter()
        .map(|l| l.quantities.invoiced())
        .sum();
    let total = order.total_amount();

    w.start_element("InvoiceTotals")?
        .text_element("InvoiceTotalAmount", &format_fixed(total, 1))?
        .text_element(
            "MerchandiseAmount",
            &format_fixed(total + order.tax_amount(), 1),
        )?
        .text_element("AmountLessTermsDiscount", &format_fixed(total, 1))?;
    if order.tax_amount.is_some() {
        w.text_element("TaxAmount", &format_fixed(order.tax_amount(), 1))?;
    }
    write_uom_quantity(w, "Weight", &format_fixed(order.total_weight(), 1))?;
    write_uom_quantity(w, "Cartons", &format_quantity(cartons))?;
    write_uom_quantity(w, "Volume", "0.0")?;
    w.end_element("InvoiceTotals")?;

    w.text_element("TransactionSetPurposeCode", "00")?;
    w.end_element("Header")?;
    Ok(())
}

fn write_uom_quantity(w: &mut XmlWriter, name: &str, qty: &str) -> Result<(), EdiError> {
    w.start_element(name)?
        .start_element("UOM")?
        .text_element("Quantity", qty)?
        .end_element("UOM")?
        .end_element(name)?;
    Ok(())
}

fn write_address(
    w: &mut XmlWriter,
    slot: AddressSlot,
    address: Option<&Address>,
    always: bool,
) -> Result<(), EdiError> {
    let empty = Address::default();
    let a = match address {
        Some(a) if !a.is_empty() => a,
        _ if always => &empty,
        _ => return Ok(()),
    };

    w.start_element(ADDRESS_ELEMENT)?
        .text_element("BillAndShipToCode", qualifiers::address_code(slot))?
        .optional_element("DUNSOrLocationNumber", &a.store_number)?
        .optional_element("DUNSQualifier", &a.duns_qualifier)?
        .text_element("CompanyName", &a.company_name)?
        .text_element("Address", &a.street)?
        .optional_element("Address2", &a.street2)?
        .text_element("City", &a.city)?
        .text_element("State", &a.state)?
        .text_element("Zip", &a.zip)?
        .optional_element("Country", &a.country)?
        .end_element(ADDRESS_ELEMENT)?;
    Ok(())
}

fn write_line(w: &mut XmlWriter, position: usize, line: &LineItem) -> Result<(), EdiError> {
    let position = position.to_string();
    let line_no = normalize_line_no(&line.line_no);

    w.start_element("Detail")?.start_element("DetailLine")?;
    w.text_element("InternalLineNumber", &position)?
        .text_element("CustomerLineNumber", &line_no)?
        .text_element("OriginalLineNumber", &position)?;

    for field in [
        ItemIdField::VendorItemNo,
        ItemIdField::UnitUpc,
        ItemIdField::CaseUpc,
        ItemIdField::Gtin,
        ItemIdField::BuyerItemNo,
        ItemIdField::VendorPartNo,
    ] {
        let id = line.item_ids.get(field);
        if id.is_empty() {
            continue;
        }
        let (code, desc) = qualifiers::item_id_qualifier(field);
        w.start_element("ItemIDs")?;
        match desc {
            Some(desc) => w.text_element_with_attrs("IdQualifier", code, &[("Desc", desc)])?,
            None => w.text_element("IdQualifier", code)?,
        };
        w.text_element("Id", id)?.end_element("ItemIDs")?;
    }

    let uom = if line.unit_of_measure.is_empty() {
        DEFAULT_UOM
    } else {
        &line.unit_of_measure
    };
    let qty = format_quantity(line.quantities.invoiced());
    for code in ["39", "38"] {
        w.start_element("Quantities")?
            .text_element("QtyQualifier", code)?
            .text_element("QtyUOM", uom)?
            .text_element("Qty", &qty)?
            .end_element("Quantities")?;
    }

    w.start_element("PriceCost")?
        .text_element("PriceOrCost", &format_fixed(line.unit_price(), 2))?
        .text_element("PriceBasicQualifier", "UCP")?
        .end_element("PriceCost")?;

    if line.pack_size.is_some() {
        w.text_element("PackSize", &format_quantity(line.pack_size()))?;
    }
    w.optional_element("ItemDescription", &line.description)?;

    w.start_element("LineTotals")?
        .text_element("TotalAmount", &format_fixed(line.line_amount(), 1))?
        .text_element("TotalSublines", "0")?
        .end_element("LineTotals")?;

    for charge in &line.charges {
        write_charge(w, charge)?;
    }
    for note in &line.notes {
        write_note(w, note)?;
    }

    w.end_element("DetailLine")?.end_element("Detail")?;
    Ok(())
}

fn write_charge(w: &mut XmlWriter, charge: &ChargeOrAllowance) -> Result<(), EdiError> {
    w.start_element("ChargesAllowances")?
        .optional_element("SequenceNumber", &charge.sequence_no)?
        .text_element("AllowChrgIndicator", charge.indicator.code())?
        .optional_element("SpecialServicesCode", &charge.special_service_code)?
        .text_element("AllowChrgAmt", &format_fixed(charge.amount(), 1))?;
    if charge.rate.is_some() {
        w.text_element("AllowChrgRate", &format_fixed(charge.rate(), 4))?;
    }
    w.optional_element("MethodOfHandlingCode", &charge.method_of_handling_code)?
        .end_element("ChargesAllowances")?;
    Ok(())
}

fn write_note(w: &mut XmlWriter, note: &Note) -> Result<(), EdiError> {
    w.start_element("Notes")?
        .optional_element("NoteCode", &note.code)?
        .text_element("Note", &note.text)?
        .end_element("Notes")?;
    Ok(())
}

/// `Term` comes from structured terms when present, otherwise from the
/// free-text payment terms with net due on the due date. The free text
/// itself is only written alongside structured terms.
fn write_terms(w: &mut XmlWriter, order: &Order) -> Result<(), EdiError> {
    if let Some(terms) = &order.terms {
        w.start_element("Term")?
            .text_element("TermsType", &terms.terms_type)?
            .text_element("TermsBasis", &terms.basis)?;
        if let Some(due) = terms.net_due_date.or(order.due_date) {
            w.text_element("NetDueDate", &to_lingo_display(due))?;
        }
        if let Some(days) = terms.net_due_days {
            w.text_element("TermsNetDueDays", &days.to_string())?;
        }
        if let Some(days) = terms.discount_days {
            w.text_element("TermsDiscountDays", &days.to_string())?;
        }
        if terms.discount_percent.is_some() {
            w.text_element(
                "TermsDiscountPercentage",
                &format_fixed(terms.discount_percent(), 4),
            )?;
        }
        if terms.discount_amount.is_some() {
            w.text_element(
                "TermsDiscountAmount",
                &format_fixed(terms.discount_amount(), 1),
            )?;
        }
        w.optional_element("TermsDescription", &order.payment_terms)?;
        w.end_element("Term")?;
    } else if !order.payment_terms.is_empty() {
        w.start_element("Term")?
            .text_element("TermsType", "01")?
            .text_element("TermsBasis", "3")?;
        if let Some(due) = order.due_date {
            w.text_element("NetDueDate", &to_lingo_display(due))?;
        }
        w.end_element("Term")?;
    }
    Ok(())
}
