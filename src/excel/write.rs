use super::columns::Column;
use super::parse::FIELD_SEPARATOR;
use crate::core::*;
use crate::xml_utils::{XmlResult, XmlWriter, format_quantity};

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Serialize orders as an Excel-dialect workbook: a header row, then one
/// row per line item with the order fields repeated.
pub fn to_excel_xml(orders: &[Order]) -> XmlResult {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "Workbook",
        &[("xmlns", SPREADSHEET_NS), ("xmlns:ss", SPREADSHEET_NS)],
    )?
    .start_element_with_attrs("Worksheet", &[("ss:Name", "Orders")])?
    .start_element("Table")?;

    let header: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    write_row(&mut w, &header.join(&FIELD_SEPARATOR.to_string()))?;

    for order in orders {
        for line in &order.line_items {
            let values: Vec<String> = Column::ALL
                .iter()
                .map(|c| cell_value(*c, order, line).replace(FIELD_SEPARATOR, " "))
                .collect();
            write_row(&mut w, &values.join(&FIELD_SEPARATOR.to_string()))?;
        }
    }

    w.end_element("Table")?
        .end_element("Worksheet")?
        .end_element("Workbook")?;
    w.into_string()
}

fn write_row(w: &mut XmlWriter, record: &str) -> Result<(), EdiError> {
    w.start_element("Row")?
        .start_element("Cell")?
        .text_element_with_attrs("Data", record, &[("ss:Type", "String")])?
        .end_element("Cell")?
        .end_element("Row")?;
    Ok(())
}

fn cell_value(column: Column, order: &Order, line: &LineItem) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let amount = |d: Option<rust_decimal::Decimal>| d.map(format_quantity).unwrap_or_default();
    let ship_to = order.ship_to.clone().unwrap_or_default();

    match column {
        Column::DocumentId => order.document_id.clone(),
        Column::CompanyCode => order.company_code.clone(),
        Column::CustomerNo => order.customer_no.clone(),
        Column::PoNumber => order.po_number.clone(),
        Column::VendorNo => order.vendor_no.clone(),
        Column::PoDate => date(order.po_date),
        Column::ShipDate => date(order.ship_date),
        Column::CancelDate => date(order.cancel_date),
        Column::RequestedDeliveryDate => date(order.requested_delivery_date),
        Column::TotalAmount => amount(order.total_amount),
        Column::TaxAmount => amount(order.tax_amount),
        Column::TotalCases => amount(order.total_cases),
        Column::TotalWeight => amount(order.total_weight),
        Column::PaymentTerms => order.payment_terms.clone(),
        Column::ShipToStoreNumber => ship_to.store_number,
        Column::ShipToName => ship_to.company_name,
        Column::ShipToStreet => ship_to.street,
        Column::ShipToCity => ship_to.city,
        Column::ShipToState => ship_to.state,
        Column::ShipToZip => ship_to.zip,
        Column::LineNo => line.line_no.clone(),
        Column::ItemNo => line.item_ids.vendor_item_no.clone(),
        Column::UnitUpc => line.item_ids.unit_upc.clone(),
        Column::Description => line.description.clone(),
        Column::Quantity => format_quantity(line.quantities.ordered()),
        Column::UnitOfMeasure => line.unit_of_measure.clone(),
        Column::UnitPrice => amount(line.unit_price),
        Column::LineAmount => amount(line.line_amount),
        Column::PackSize => amount(line.pack_size),
    }
}
