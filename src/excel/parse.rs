use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use super::columns::{Column, Target};
use crate::core::*;
use crate::xml_utils::element_name;

/// Separator between values of a flat record.
pub const FIELD_SEPARATOR: char = '|';

/// Parse an Excel-dialect workbook into orders grouped by
/// `documentId-poNumber`.
pub fn from_excel_xml(xml: &str) -> Result<ParsedDocument, EdiError> {
    from_excel_xml_with(xml, &DateNormalizer::new())
}

pub fn from_excel_xml_with(
    xml: &str,
    dates: &DateNormalizer,
) -> Result<ParsedDocument, EdiError> {
    let rows = read_rows(xml)?;
    if rows.len() < 2 {
        return Err(EdiError::MalformedDocument(format!(
            "Excel table needs a header and at least one data row, found {} row(s)",
            rows.len()
        )));
    }

    let columns: Vec<Option<Column>> = split_record(&rows[0])
        .iter()
        .map(|h| {
            let column = Column::from_header(h);
            if column.is_none() && !h.trim().is_empty() {
                tracing::debug!(header = %h.trim(), "ignoring unknown Excel column");
            }
            column
        })
        .collect();

    let mut grouper = Grouper::new(dates);
    for (i, row) in rows.iter().enumerate().skip(1) {
        let values = split_record(row);
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let record: Vec<(Column, &str)> = columns
            .iter()
            .zip(values.iter().map(|v| v.trim()))
            .filter_map(|(c, v)| c.map(|c| (c, v)))
            .collect();
        grouper.push(i, &record);
    }

    Ok(grouper.finish())
}

/// Join a row's cell values on the separator; the cells are the fields.
fn join_cells(cells: &[String]) -> String {
    cells.join(&FIELD_SEPARATOR.to_string())
}

fn split_record(row: &str) -> Vec<String> {
    row.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Collect every `Row` of the first `Table` as a pipe-joined record.
fn read_rows(xml: &str) -> Result<Vec<String>, EdiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rows = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut in_data = false;
    let mut tables = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(&element_name(e)) {
                "Table" => tables += 1,
                "Row" if tables == 1 => row = Some(Vec::new()),
                "Cell" => {
                    if let Some(cells) = row.as_mut() {
                        cells.push(String::new());
                    }
                }
                "Data" => in_data = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(&element_name(e)) {
                "Row" if tables == 1 => rows.push(String::new()),
                "Cell" => {
                    if let Some(cells) = row.as_mut() {
                        cells.push(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_data => {
                let text = e
                    .unescape()
                    .map_err(|e| EdiError::MalformedDocument(format!("bad cell text: {e}")))?;
                if let Some(cell) = row.as_mut().and_then(|cells| cells.last_mut()) {
                    cell.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match local_name(&name) {
                    "Data" => in_data = false,
                    "Row" => {
                        if let Some(cells) = row.take() {
                            rows.push(join_cells(&cells));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(EdiError::MalformedDocument(format!(
                    "XML parse error at byte {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    Ok(rows)
}

/// Groups flat records into orders by `documentId-poNumber`.
struct Grouper<'a> {
    dates: &'a DateNormalizer,
    orders: Vec<Order>,
    sequences: Vec<LineNumberSequence>,
    index: HashMap<String, usize>,
    warnings: Vec<CoercionWarning>,
}

impl<'a> Grouper<'a> {
    fn new(dates: &'a DateNormalizer) -> Self {
        Self {
            dates,
            orders: Vec::new(),
            sequences: Vec::new(),
            index: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    fn push(&mut self, row: usize, record: &[(Column, &str)]) {
        let value = |col: Column| {
            record
                .iter()
                .find(|(c, _)| *c == col)
                .map(|(_, v)| *v)
                .unwrap_or("")
        };
        let key = group_key(value(Column::DocumentId), value(Column::PoNumber));
        let prefix = format!("rows[{row}]");

        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let order = self.new_order(&prefix, record);
                self.orders.push(order);
                self.sequences.push(LineNumberSequence::new());
                self.index.insert(key, self.orders.len() - 1);
                self.orders.len() - 1
            }
        };

        let mut line = self.new_line(&prefix, record);
        let (line_no, warning) = self.sequences[idx].assign(value(Column::LineNo));
        if let Some(w) = warning {
            self.warnings.push(w.within(&prefix));
        }
        line.line_no = line_no;
        self.orders[idx].line_items.push(line);
    }

    fn decimal(&mut self, prefix: &str, column: Column, raw: &str) -> Option<Decimal> {
        if raw.is_empty() {
            return None;
        }
        let cleaned = raw.replace([',', '$'], "");
        match Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)) {
            Ok(d) => Some(d),
            Err(_) => {
                let w = CoercionWarning::new(column.header(), raw, "0").within(prefix);
                tracing::warn!(field = %w.field, raw, "unparseable number, using 0");
                self.warnings.push(w);
                Some(Decimal::ZERO)
            }
        }
    }

    fn new_order(&mut self, prefix: &str, record: &[(Column, &str)]) -> Order {
        let mut order = Order {
            source_format: Some(Dialect::Excel),
            ..Default::default()
        };
        let mut ship_to = Address::default();

        for &(column, raw) in record {
            match column.target() {
                Target::Header => {
                    let value = raw.to_string();
                    match column {
                        Column::DocumentId => order.document_id = value,
                        Column::CompanyCode => order.company_code = value,
                        Column::CustomerNo => order.customer_no = value,
                        Column::PoNumber => order.po_number = value,
                        Column::VendorNo => order.vendor_no = value,
                        Column::PaymentTerms => order.payment_terms = value,
                        _ => {}
                    }
                }
                Target::Date(field) if !raw.is_empty() => {
                    let coerced = self
                        .dates
                        .to_canonical(&format!("{prefix}.{}", column.header()), raw);
                    if let Some(w) = coerced.warning {
                        self.warnings.push(w);
                    }
                    order.set_date(field, coerced.value);
                }
                Target::Amount => {
                    let amount = self.decimal(prefix, column, raw);
                    match column {
                        Column::TotalAmount => order.total_amount = amount,
                        Column::TaxAmount => order.tax_amount = amount,
                        Column::TotalCases => order.total_cases = amount,
                        Column::TotalWeight => order.total_weight = amount,
                        _ => {}
                    }
                }
                Target::Address(_) => {
                    let value = raw.to_string();
                    match column {
                        Column::ShipToStoreNumber => ship_to.store_number = value,
                        Column::ShipToName => ship_to.company_name = value,
                        Column::ShipToStreet => ship_to.street = value,
                        Column::ShipToCity => ship_to.city = value,
                        Column::ShipToState => ship_to.state = value,
                        Column::ShipToZip => ship_to.zip = value,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if !ship_to.is_empty() {
            order.ship_to = Some(ship_to);
        }
        order
    }

    fn new_line(&mut self, prefix: &str, record: &[(Column, &str)]) -> LineItem {
        let mut line = LineItem::default();
        for &(column, raw) in record {
            match column.target() {
                Target::ItemId(field) => line.item_ids.set(field, raw),
                Target::Qty(field) => {
                    if let Some(q) = self.decimal(prefix, column, raw) {
                        line.quantities.set(field, q);
                    }
                }
                Target::Line => match column {
                    Column::Description => line.description = raw.to_string(),
                    Column::UnitOfMeasure => line.unit_of_measure = raw.to_string(),
                    _ => {}
                },
                Target::LineAmount => {
                    let amount = self.decimal(prefix, column, raw);
                    match column {
                        Column::UnitPrice => line.unit_price = amount,
                        Column::LineAmount => line.line_amount = amount,
                        Column::PackSize => line.pack_size = amount,
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        line
    }

    fn finish(self) -> ParsedDocument {
        ParsedDocument {
            dialect: Dialect::Excel,
            orders: self.orders,
            warnings: self.warnings,
        }
    }
}
