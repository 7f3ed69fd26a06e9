use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::qualifiers::{self, QtyContext};
use crate::core::*;
use crate::xml_utils::{attribute, element_name};

/// Element names that open an address block.
const ADDRESS_BLOCKS: &[&str] = &["Name", "N1", "n"];

/// Parse a Lingo `File` into one [`Order`] per `Document`.
pub fn from_lingo_xml(xml: &str) -> Result<ParsedDocument, EdiError> {
    from_lingo_xml_with(xml, &DateNormalizer::new())
}

/// Parse with an explicit date normalizer (controls the fallback date).
pub fn from_lingo_xml_with(
    xml: &str,
    dates: &DateNormalizer,
) -> Result<ParsedDocument, EdiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut p = LingoParsed::new(dates);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e);
                p.open(&name, &path, attribute(e, "Desc"));
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| EdiError::MalformedDocument(format!("bad text content: {e}")))?;
                if !text.is_empty() {
                    p.handle_text(&path, &text);
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                if !text.is_empty() {
                    p.handle_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                p.close(&ended, &path);
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

    if p.orders.is_empty() {
        return Err(EdiError::MalformedDocument(
            "Lingo file contains no Document elements".into(),
        ));
    }

    Ok(ParsedDocument {
        dialect: Dialect::Lingo,
        orders: p.orders,
        warnings: p.warnings,
    })
}

struct LingoParsed<'a> {
    dates: &'a DateNormalizer,
    orders: Vec<Order>,
    warnings: Vec<CoercionWarning>,
    doc: Option<DocState>,
}

#[derive(Default)]
struct DocState {
    order: Order,
    document_type: String,
    lines: Vec<LineState>,
    current_line: Option<LineState>,
    current_date: Option<DateLoop>,
    current_address: Option<AddressBlock>,
    current_item_id: Option<ItemIdRow>,
    current_qty: Option<QtyRow>,
    current_charge: Option<LineRef<ChargeOrAllowance>>,
    current_note: Option<LineRef<Note>>,
    pending_charges: Vec<LineRef<ChargeOrAllowance>>,
    pending_notes: Vec<LineRef<Note>>,
    terms: Option<Terms>,
    warnings: Vec<CoercionWarning>,
}

#[derive(Default)]
struct LineState {
    line: LineItem,
    supplied_line_no: String,
    quantities: Vec<QtyRow>,
}

#[derive(Default)]
struct DateLoop {
    qualifier: String,
    date: String,
}

#[derive(Default)]
struct AddressBlock {
    code: String,
    address: Address,
}

#[derive(Default)]
struct ItemIdRow {
    qualifier: String,
    desc: Option<String>,
    id: String,
}

#[derive(Default)]
struct QtyRow {
    qualifier: String,
    uom: String,
    qty: String,
}

/// A charge or note with the `DetailLineNumber` it refers to.
#[derive(Default)]
struct LineRef<T> {
    line_no: String,
    value: T,
}

impl<'a> LingoParsed<'a> {
    fn new(dates: &'a DateNormalizer) -> Self {
        Self {
            dates,
            orders: Vec::new(),
            warnings: Vec::new(),
            doc: None,
        }
    }

    fn open(&mut self, name: &str, path: &[String], desc: Option<String>) {
        if name == "Document" {
            self.doc = Some(DocState::default());
            return;
        }
        let Some(doc) = self.doc.as_mut() else {
            return;
        };
        let parent = path.last().map(|s| s.as_str()).unwrap_or("");

        match name {
            "DateLoop" => doc.current_date = Some(DateLoop::default()),
            "DetailLine" => doc.current_line = Some(LineState::default()),
            "ItemIDs" | "ItemIds" => doc.current_item_id = Some(ItemIdRow::default()),
            "IdQualifier" => {
                if let Some(row) = doc.current_item_id.as_mut() {
                    row.desc = desc;
                }
            }
            "Quantities" => doc.current_qty = Some(QtyRow::default()),
            "ChargesAllowances" => doc.current_charge = Some(LineRef::default()),
            "Notes" => doc.current_note = Some(LineRef::default()),
            "Term" => {
                doc.terms.get_or_insert_with(Terms::default);
            }
            n if parent == "Document" && ADDRESS_BLOCKS.contains(&n) => {
                doc.current_address = Some(AddressBlock::default());
            }
            _ => {}
        }
    }

    fn close(&mut self, ended: &str, path: &[String]) {
        if ended == "Document" {
            if let Some(doc) = self.doc.take() {
                let index = self.orders.len();
                let (order, warnings) = doc.finish();
                let prefix = format!("orders[{index}]");
                self.warnings
                    .extend(warnings.into_iter().map(|w| w.within(&prefix)));
                self.orders.push(order);
            }
            return;
        }
        let Some(doc) = self.doc.as_mut() else {
            return;
        };
        let parent = path.last().map(|s| s.as_str()).unwrap_or("");

        match ended {
            "DateLoop" => {
                if let Some(dl) = doc.current_date.take() {
                    doc.route_date(self.dates, dl);
                }
            }
            "ItemIDs" | "ItemIds" => {
                if let (Some(row), Some(line)) =
                    (doc.current_item_id.take(), doc.current_line.as_mut())
                {
                    match qualifiers::item_id_field(&row.qualifier, row.desc.as_deref()) {
                        Some(field) => line.line.item_ids.set(field, row.id),
                        None => tracing::debug!(
                            qualifier = %row.qualifier,
                            "ignoring unrecognized item id qualifier"
                        ),
                    }
                }
            }
            "Quantities" => {
                if let (Some(row), Some(line)) =
                    (doc.current_qty.take(), doc.current_line.as_mut())
                {
                    line.quantities.push(row);
                }
            }
            "ChargesAllowances" => {
                if let Some(charge) = doc.current_charge.take() {
                    match doc.current_line.as_mut() {
                        Some(line) if charge.line_no.is_empty() => {
                            line.line.charges.push(charge.value)
                        }
                        _ => doc.pending_charges.push(charge),
                    }
                }
            }
            "Notes" => {
                if let Some(note) = doc.current_note.take() {
                    match doc.current_line.as_mut() {
                        Some(line) if note.line_no.is_empty() => line.line.notes.push(note.value),
                        _ => doc.pending_notes.push(note),
                    }
                }
            }
            "DetailLine" => {
                if let Some(line) = doc.current_line.take() {
                    doc.lines.push(line);
                }
            }
            n if parent == "Document" && ADDRESS_BLOCKS.contains(&n) => {
                if let Some(block) = doc.current_address.take() {
                    match qualifiers::address_slot(&block.code) {
                        Some(slot) => *doc.order.address_mut(slot) = Some(block.address),
                        None => tracing::debug!(
                            code = %block.code,
                            "dropping address with unrecognized BillAndShipToCode"
                        ),
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, path: &[String], text: &str) {
        let dates = self.dates;
        let Some(doc) = self.doc.as_mut() else {
            return;
        };
        let leaf = path.last().map(|s| s.as_str()).unwrap_or("");
        let text = text.trim();

        if let Some(row) = doc.current_item_id.as_mut() {
            match leaf {
                "IdQualifier" => row.qualifier = text.to_string(),
                "Id" => row.id = text.to_string(),
                _ => {}
            }
            return;
        }

        if let Some(row) = doc.current_qty.as_mut() {
            match leaf {
                "QtyQualifier" => row.qualifier = text.to_string(),
                "QtyUOM" => row.uom = text.to_string(),
                "Qty" => row.qty = text.to_string(),
                _ => {}
            }
            return;
        }

        if doc.current_charge.is_some() {
            doc.charge_text(leaf, text);
            return;
        }

        if let Some(note) = doc.current_note.as_mut() {
            match leaf {
                "DetailLineNumber" => note.line_no = normalize_line_no(text),
                "NoteCode" => note.value.code = text.to_string(),
                "Note" | "NoteText" => append_text(&mut note.value.text, text),
                _ => {}
            }
            return;
        }

        if let Some(dl) = doc.current_date.as_mut() {
            match leaf {
                "DateQualifier" => dl.qualifier = text.to_string(),
                "Date" => dl.date = text.to_string(),
                _ => {}
            }
            return;
        }

        if let Some(block) = doc.current_address.as_mut() {
            let a = &mut block.address;
            match leaf {
                "BillAndShipToCode" => block.code = text.to_string(),
                "DUNSOrLocationNumber" => a.store_number = text.to_string(),
                "DUNSQualifier" | "DUNSOrLocationNumberQualifier" => {
                    a.duns_qualifier = text.to_string()
                }
                "CompanyName" => a.company_name = text.to_string(),
                "Address" if a.street.is_empty() => a.street = text.to_string(),
                "Address" | "Address2" => a.street2 = text.to_string(),
                "City" => a.city = text.to_string(),
                "State" => a.state = text.to_string(),
                "Zip" | "PostalCode" => a.zip = text.to_string(),
                "Country" => a.country = text.to_string(),
                _ => {}
            }
            return;
        }

        if doc.current_line.is_some() {
            doc.line_text(path, leaf, text);
            return;
        }

        if path.iter().any(|p| p == "Term") {
            doc.terms_text(dates, leaf, text);
            return;
        }

        doc.header_text(dates, path, leaf, text);
    }
}

impl DocState {
    fn decimal(&mut self, field: &str, raw: &str) -> Decimal {
        let cleaned = raw.trim().replace(',', "");
        match Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned)) {
            Ok(d) => d,
            Err(_) => {
                tracing::warn!(field, raw, "unparseable number, using 0");
                self.warnings.push(CoercionWarning::new(field, raw, "0"));
                Decimal::ZERO
            }
        }
    }

    fn date(&mut self, dates: &DateNormalizer, field: &str, raw: &str) -> chrono::NaiveDate {
        let coerced = dates.to_canonical(field, raw);
        if let Some(w) = coerced.warning {
            self.warnings.push(w);
        }
        coerced.value
    }

    fn route_date(&mut self, dates: &DateNormalizer, dl: DateLoop) {
        let Some(field) = qualifiers::date_field(&dl.qualifier) else {
            tracing::debug!(qualifier = %dl.qualifier, "ignoring unrecognized date qualifier");
            return;
        };
        if dl.date.is_empty() {
            return;
        }
        let label = format!("date[{}]", dl.qualifier);
        let date = self.date(dates, &label, &dl.date);
        self.order.set_date(field, date);
    }

    fn header_text(&mut self, dates: &DateNormalizer, path: &[String], leaf: &str, text: &str) {
        let in_path = |name: &str| path.iter().any(|p| p == name);
        match leaf {
            "CompanyCode" => self.order.company_code = text.to_string(),
            "CustomerNumber" => self.order.customer_no = text.to_string(),
            "DocumentType" => self.document_type = text.to_string(),
            "PurchaseOrderNumber" => self.order.po_number = text.to_string(),
            "InvoiceNumber" => self.order.invoice_number = text.to_string(),
            "InternalDocumentNumber" | "DocumentId" => self.order.document_id = text.to_string(),
            "VendorNumber" => self.order.vendor_no = text.to_string(),
            "InvoiceDate" => {
                let d = self.date(dates, "invoice_date", text);
                self.order.invoice_date = Some(d);
            }
            "PurchaseOrderDate" => {
                let d = self.date(dates, "po_date", text);
                self.order.po_date = Some(d);
            }
            "InvoiceTotalAmount" | "TotalAmount" => {
                self.order.total_amount = Some(self.decimal("total_amount", text))
            }
            "TaxAmount" => self.order.tax_amount = Some(self.decimal("tax_amount", text)),
            "TotalCases" => self.order.total_cases = Some(self.decimal("total_cases", text)),
            "TotalWeight" => self.order.total_weight = Some(self.decimal("total_weight", text)),
            "Quantity" if in_path("Cartons") => {
                self.order.total_cases = Some(self.decimal("total_cases", text))
            }
            "Quantity" if in_path("Weight") => {
                self.order.total_weight = Some(self.decimal("total_weight", text))
            }
            "PaymentTerms" => self.order.payment_terms = text.to_string(),
            _ => {}
        }
    }

    fn terms_text(&mut self, dates: &DateNormalizer, leaf: &str, text: &str) {
        let value = match leaf {
            "TermsDiscountPercentage" => Some(self.decimal("terms.discount_percent", text)),
            "TermsDiscountAmount" => Some(self.decimal("terms.discount_amount", text)),
            _ => None,
        };
        let due = (leaf == "NetDueDate").then(|| self.date(dates, "terms.net_due_date", text));
        let days = || text.trim().parse::<u32>().ok();

        let terms = self.terms.get_or_insert_with(Terms::default);
        match leaf {
            "TermsType" => terms.terms_type = text.to_string(),
            "TermsBasis" | "TermsBasisDateCode" => terms.basis = text.to_string(),
            "NetDueDate" => terms.net_due_date = due,
            "TermsNetDueDays" | "NetDueDays" => terms.net_due_days = days(),
            "TermsDiscountDays" | "DiscountDays" => terms.discount_days = days(),
            "TermsDiscountPercentage" => terms.discount_percent = value,
            "TermsDiscountAmount" => terms.discount_amount = value,
            "TermsDescription" => self.order.payment_terms = text.to_string(),
            _ => {}
        }
    }

    fn line_text(&mut self, path: &[String], leaf: &str, text: &str) {
        let in_path = |name: &str| path.iter().any(|p| p == name);
        let amount = match leaf {
            "PriceOrCost" | "PackSize" | "Inners" | "EachesPerInner" | "InnersPerPack" => {
                Some(self.decimal(&format!("line.{leaf}"), text))
            }
            "TotalAmount" if in_path("LineTotals") => Some(self.decimal("line.TotalAmount", text)),
            _ => None,
        };

        let Some(state) = self.current_line.as_mut() else {
            return;
        };
        let line = &mut state.line;
        match leaf {
            "CustomerLineNumber" => state.supplied_line_no = text.to_string(),
            "LineNumber" if state.supplied_line_no.is_empty() => {
                state.supplied_line_no = text.to_string()
            }
            "InternalLineNumber" => line.internal_line_number = text.to_string(),
            "PriceOrCost" => line.unit_price = amount,
            "TotalAmount" if in_path("LineTotals") => line.line_amount = amount,
            "PackSize" => line.pack_size = amount,
            "Inners" => line.inners = amount,
            "EachesPerInner" => line.eaches_per_inner = amount,
            "InnersPerPack" => line.inners_per_pack = amount,
            "ItemDescription" | "ProductDescription" => append_text(&mut line.description, text),
            "UnitOfMeasure" => line.unit_of_measure = text.to_string(),
            _ => {}
        }
    }

    fn charge_text(&mut self, leaf: &str, text: &str) {
        let amount = match leaf {
            "AllowChrgAmt" => Some(self.decimal("charge.amount", text)),
            "AllowChrgRate" | "AllowChrgPercent" => Some(self.decimal("charge.rate", text)),
            _ => None,
        };
        let Some(charge) = self.current_charge.as_mut() else {
            return;
        };
        let c = &mut charge.value;
        match leaf {
            "DetailLineNumber" => charge.line_no = normalize_line_no(text),
            "SequenceNumber" | "AllowChrgSequence" => c.sequence_no = text.to_string(),
            "AllowChrgIndicator" => {
                c.indicator = ChargeIndicator::from_code(text.trim()).unwrap_or_default()
            }
            "SpecialServicesCode" | "AllowChrgCode" => c.special_service_code = text.to_string(),
            "AllowChrgAmt" => c.amount = amount,
            "AllowChrgRate" | "AllowChrgPercent" => c.rate = amount,
            "MethodOfHandlingCode" | "AllowChrgHandlingCode" => {
                c.method_of_handling_code = text.to_string()
            }
            _ => {}
        }
    }

    /// Number the lines, resolve quantity qualifiers and attach
    /// line-referenced charges and notes.
    fn finish(mut self) -> (Order, Vec<CoercionWarning>) {
        let ctx = QtyContext::from_document_type(&self.document_type);
        let mut seq = LineNumberSequence::new();
        let lines = std::mem::take(&mut self.lines);

        for (i, mut state) in lines.into_iter().enumerate() {
            let (line_no, warning) = seq.assign(&state.supplied_line_no);
            if let Some(w) = warning {
                self.warnings.push(w.within(&format!("line_items[{i}]")));
            }
            state.line.line_no = line_no;

            for row in std::mem::take(&mut state.quantities) {
                let Some(field) = qualifiers::qty_field(&row.qualifier, ctx) else {
                    tracing::debug!(qualifier = %row.qualifier, "ignoring unrecognized quantity qualifier");
                    continue;
                };
                if !row.qty.is_empty() {
                    let label = format!("line_items[{i}].qty[{}]", row.qualifier);
                    let qty = self.decimal(&label, &row.qty);
                    state.line.quantities.set(field, qty);
                }
                if state.line.unit_of_measure.is_empty() {
                    state.line.unit_of_measure = row.uom;
                }
            }
            self.order.line_items.push(state.line);
        }

        for charge in std::mem::take(&mut self.pending_charges) {
            match self.order.line_mut(&charge.line_no) {
                Some(line) => line.charges.push(charge.value),
                None => tracing::debug!(
                    line_no = %charge.line_no,
                    "dropping charge/allowance with no matching detail line"
                ),
            }
        }

        for note in std::mem::take(&mut self.pending_notes) {
            match self.order.line_mut(&note.line_no) {
                Some(line) if !note.line_no.is_empty() => line.notes.push(note.value),
                _ => self.order.notes.push(note.value),
            }
        }

        self.order.terms = self.terms.take();
        self.order.source_format = Some(Dialect::Lingo);
        (self.order, self.warnings)
    }
}

fn append_text(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
