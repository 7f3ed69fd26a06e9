#![cfg(feature = "lingo")]

mod common;

use chrono::NaiveDate;
use edibridge::core::*;
use edibridge::lingo::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> DateNormalizer {
    DateNormalizer::with_today(date(2025, 1, 2))
}

fn parse_po() -> ParsedDocument {
    from_lingo_xml_with(common::LINGO_PO, &today()).unwrap()
}

fn invoice() -> Order {
    OrderBuilder::new("PO-1001")
        .invoice_number("INV-2001")
        .customer_no("C-42")
        .invoice_date(date(2025, 3, 10))
        .due_date(date(2025, 4, 9))
        .total_amount(dec!(62.5))
        .tax_amount(dec!(5))
        .payment_terms("Net 30")
        .bill_to(
            AddressBuilder::new("Acme Stores")
                .store_number("0001")
                .street("1 Main St")
                .city("Dallas")
                .state("TX")
                .zip("75001")
                .build(),
        )
        .ship_to(AddressBuilder::new("Acme Store 420").city("Austin").build())
        .add_line(
            LineItemBuilder::new("012345", dec!(4), dec!(12.5))
                .description("Widget")
                .build(),
        )
        .add_line(
            LineItemBuilder::new("012346", dec!(1), dec!(12.5))
                .unit_of_measure("EA")
                .build(),
        )
        .build()
        .unwrap()
}

// --- Parsing ---

#[test]
fn header_fields_map_directly() {
    let parsed = parse_po();
    assert_eq!(parsed.dialect, Dialect::Lingo);
    assert_eq!(parsed.orders.len(), 1);
    let order = &parsed.orders[0];
    assert_eq!(order.company_code, "SIL02");
    assert_eq!(order.customer_no, "C-42");
    assert_eq!(order.po_number, "PO-1001");
    assert_eq!(order.document_id, "D-77");
    assert_eq!(order.vendor_no, "V-9");
    assert_eq!(order.source_format, Some(Dialect::Lingo));
}

#[test]
fn date_loops_route_by_qualifier() {
    let order = &parse_po().orders[0];
    assert_eq!(order.po_date, Some(date(2025, 3, 10)));
    assert_eq!(order.ship_date, Some(date(2025, 3, 17)));
    // 999 is unknown and must not land anywhere
    assert_eq!(order.invoice_date, None);
    assert_eq!(order.cancel_date, None);
    assert_eq!(order.effective_date, None);
}

#[test]
fn due_and_effective_date_qualifiers() {
    let xml = r#"<File><Document>
        <PurchaseOrderNumber>P</PurchaseOrderNumber>
        <DateLoop><DateQualifier>002</DateQualifier><Date>4/9/2025</Date></DateLoop>
        <DateLoop><DateQualifier>007</DateQualifier><Date>2025-03-01</Date></DateLoop>
        <DateLoop><DateQualifier>001</DateQualifier><Date>3/31/2025</Date></DateLoop>
        <DateLoop><DateQualifier>074</DateQualifier><Date>3/20/2025</Date></DateLoop>
    </Document></File>"#;
    let order = &from_lingo_xml(xml).unwrap().orders[0];
    assert_eq!(order.due_date, Some(date(2025, 4, 9)));
    assert_eq!(order.effective_date, Some(date(2025, 3, 1)));
    assert_eq!(order.cancel_date, Some(date(2025, 3, 31)));
    assert_eq!(order.requested_delivery_date, Some(date(2025, 3, 20)));
}

#[test]
fn addresses_route_by_code_and_unknown_codes_drop() {
    let order = &parse_po().orders[0];
    let bill_to = order.bill_to.as_ref().unwrap();
    assert_eq!(bill_to.company_name, "Acme Stores & Co");
    assert_eq!(bill_to.store_number, "0001");
    assert_eq!(bill_to.street, "1 Main St");
    assert_eq!(bill_to.street2, "Suite 5");
    assert_eq!(bill_to.zip, "75001");
    let ship_to = order.ship_to.as_ref().unwrap();
    assert_eq!(ship_to.company_name, "Acme Store 420");
    assert_eq!(ship_to.street, "");
    assert!(order.ship_from.is_none());
    assert!(order.vendor.is_none());
    assert!(order.remit_to.is_none());
}

#[test]
fn item_ids_use_qualifier_description() {
    let order = &parse_po().orders[0];
    let first = &order.line_items[0];
    assert_eq!(first.item_ids.vendor_item_no, "012345");
    assert_eq!(first.item_ids.gtin, "00012345000067");
    assert_eq!(first.item_ids.case_upc, "");
    let second = &order.line_items[1];
    assert_eq!(second.item_ids.unit_upc, "099999000011");
}

#[test]
fn quantities_route_by_qualifier_and_document_type() {
    let order = &parse_po().orders[0];
    assert_eq!(order.line_items[0].quantities.ordered(), dec!(4));
    assert_eq!(order.line_items[0].unit_of_measure, "CA");
    // 850: 39 is the shipped quantity
    assert_eq!(order.line_items[1].quantities.shipped(), dec!(6));
    assert_eq!(order.line_items[1].quantities.invoiced(), dec!(0));

    let invoice_xml = common::LINGO_PO.replace(
        "<DocumentType>850</DocumentType>",
        "<DocumentType>810</DocumentType>",
    );
    let order = &from_lingo_xml_with(&invoice_xml, &today()).unwrap().orders[0];
    assert_eq!(order.line_items[1].quantities.invoiced(), dec!(6));
    assert_eq!(order.line_items[1].quantities.shipped(), dec!(0));
}

#[test]
fn charges_and_notes_attach_by_line_reference() {
    let order = &parse_po().orders[0];
    let lines = &order.line_items;
    assert_eq!(lines[0].line_no, "0001");
    assert_eq!(lines[1].line_no, "0002");

    assert!(lines[0].charges.is_empty());
    assert_eq!(lines[1].charges.len(), 1);
    let charge = &lines[1].charges[0];
    assert_eq!(charge.indicator, ChargeIndicator::Charge);
    assert_eq!(charge.special_service_code, "D240");
    assert_eq!(charge.amount(), dec!(3.5));

    assert_eq!(lines[0].notes.len(), 1);
    assert_eq!(lines[0].notes[0].text, "Fragile");
    assert_eq!(order.notes.len(), 1);
    assert_eq!(order.notes[0].text, "Deliver to dock 4");
}

#[test]
fn terms_are_parsed() {
    let order = &parse_po().orders[0];
    let terms = order.terms.as_ref().unwrap();
    assert_eq!(terms.terms_type, "01");
    assert_eq!(terms.basis, "3");
    assert_eq!(terms.net_due_days, Some(30));
    assert_eq!(order.payment_terms, "Net 30");
}

#[test]
fn unparseable_numbers_fall_back_to_zero_with_warning() {
    let parsed = parse_po();
    assert_eq!(parsed.orders[0].line_items[1].unit_price(), dec!(0));
    assert_eq!(parsed.orders[0].line_items[1].unit_price, Some(dec!(0)));
    let w = parsed
        .warnings
        .iter()
        .find(|w| w.raw == "abc")
        .expect("warning for bad price");
    assert!(w.field.starts_with("orders[0]."));
    assert_eq!(w.fallback, "0");
}

#[test]
fn invalid_date_falls_back_to_today_with_warning() {
    let xml = r#"<File><Document>
        <PurchaseOrderNumber>P</PurchaseOrderNumber>
        <DateLoop><DateQualifier>004</DateQualifier><Date>next tuesday</Date></DateLoop>
    </Document></File>"#;
    let parsed = from_lingo_xml_with(xml, &today()).unwrap();
    assert_eq!(parsed.orders[0].po_date, Some(date(2025, 1, 2)));
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].raw, "next tuesday");
}

#[test]
fn missing_line_numbers_are_assigned_in_order() {
    let xml = r#"<File><Document>
        <PurchaseOrderNumber>P</PurchaseOrderNumber>
        <Detail><DetailLine><ItemIDs><IdQualifier>UP</IdQualifier><Id>A</Id></ItemIDs></DetailLine></Detail>
        <Detail><DetailLine><LineNumber>1</LineNumber></DetailLine></Detail>
        <Detail><DetailLine></DetailLine></Detail>
    </Document></File>"#;
    let parsed = from_lingo_xml(xml).unwrap();
    let numbers: Vec<_> = parsed.orders[0]
        .line_items
        .iter()
        .map(|l| l.line_no.as_str())
        .collect();
    assert_eq!(numbers, ["0001", "0002", "0003"]);
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].raw, "1");
}

#[test]
fn largest_customer_line_number_is_kept_and_numbering_continues() {
    let xml = r#"<File><Document>
        <PurchaseOrderNumber>P</PurchaseOrderNumber>
        <Detail><DetailLine><CustomerLineNumber>18446744073709551615</CustomerLineNumber></DetailLine></Detail>
        <Detail><DetailLine></DetailLine></Detail>
    </Document></File>"#;
    let parsed = from_lingo_xml(xml).unwrap();
    let numbers: Vec<_> = parsed.orders[0]
        .line_items
        .iter()
        .map(|l| l.line_no.as_str())
        .collect();
    assert_eq!(numbers, ["18446744073709551615", "0001"]);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn one_order_per_document() {
    let xml = r#"<File>
        <Document><PurchaseOrderNumber>A</PurchaseOrderNumber></Document>
        <Document><PurchaseOrderNumber>B</PurchaseOrderNumber></Document>
    </File>"#;
    let parsed = from_lingo_xml(xml).unwrap();
    let pos: Vec<_> = parsed.orders.iter().map(|o| o.po_number.as_str()).collect();
    assert_eq!(pos, ["A", "B"]);
}

#[test]
fn file_without_documents_is_malformed() {
    assert!(matches!(
        from_lingo_xml("<File></File>"),
        Err(EdiError::MalformedDocument(_))
    ));
}

#[test]
fn broken_xml_is_malformed() {
    assert!(matches!(
        from_lingo_xml("<File><Document><PurchaseOrderNumber>A</Document></File>"),
        Err(EdiError::MalformedDocument(_))
    ));
}

// --- Serialization ---

#[test]
fn document_elements_in_fixed_order() {
    let xml = to_lingo_xml(&[invoice()], "SIL02").unwrap();
    let order = [
        "<CompanyCode>SIL02</CompanyCode>",
        "<CustomerNumber>C-42</CustomerNumber>",
        "<Direction>Outbound</Direction>",
        "<DocumentType>810</DocumentType>",
        "<Footprint>INV</Footprint>",
        "<Version>3.0</Version>",
        "<PurchaseOrderNumber>PO-1001</PurchaseOrderNumber>",
        "<InvoiceNumber>INV-2001</InvoiceNumber>",
        "<Header>",
        "<InvoiceDate>3/10/2025</InvoiceDate>",
        "<InvoiceTotals>",
        "<TransactionSetPurposeCode>00</TransactionSetPurposeCode>",
        "</Header>",
        "<n>",
        "<BillAndShipToCode>BT</BillAndShipToCode>",
        "</n>",
        "<n>",
        "<BillAndShipToCode>ST</BillAndShipToCode>",
        "</n>",
        "<Detail>",
        "<Term>",
    ];
    let mut cursor = 0;
    for needle in order {
        let found = xml[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("{needle} missing or out of order"));
        cursor += found + needle.len();
    }
}

#[test]
fn every_line_emits_invoiced_and_ordered_quantities() {
    let xml = to_lingo_xml(&[invoice()], "SIL02").unwrap();
    assert_eq!(xml.matches("<QtyQualifier>39</QtyQualifier>").count(), 2);
    assert_eq!(xml.matches("<QtyQualifier>38</QtyQualifier>").count(), 2);
    assert_eq!(xml.matches("<Qty>4</Qty>").count(), 2);
    assert_eq!(xml.matches("<QtyUOM>CA</QtyUOM>").count(), 2);
    assert_eq!(xml.matches("<QtyUOM>EA</QtyUOM>").count(), 2);
    let q39 = xml.find("<QtyQualifier>39</QtyQualifier>").unwrap();
    let q38 = xml.find("<QtyQualifier>38</QtyQualifier>").unwrap();
    assert!(q39 < q38);
}

#[test]
fn fixed_numeric_formatting() {
    let xml = to_lingo_xml(&[invoice()], "SIL02").unwrap();
    assert!(xml.contains("<InvoiceTotalAmount>62.5</InvoiceTotalAmount>"));
    assert!(xml.contains("<MerchandiseAmount>67.5</MerchandiseAmount>"));
    assert!(xml.contains("<PriceOrCost>12.50</PriceOrCost>"));
    assert!(xml.contains("<TotalAmount>50.0</TotalAmount>"));
    assert!(xml.contains("<Cartons>"));
}

#[test]
fn charge_rate_has_four_decimals() {
    let mut order = invoice();
    order.line_items[0].charges.push(ChargeOrAllowance {
        indicator: ChargeIndicator::Allowance,
        amount: Some(dec!(2)),
        rate: Some(dec!(0.025)),
        ..Default::default()
    });
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    assert!(xml.contains("<AllowChrgIndicator>A</AllowChrgIndicator>"));
    assert!(xml.contains("<AllowChrgAmt>2.0</AllowChrgAmt>"));
    assert!(xml.contains("<AllowChrgRate>0.0250</AllowChrgRate>"));
}

#[test]
fn dates_are_written_month_day_year() {
    let xml = to_lingo_xml(&[invoice()], "SIL02").unwrap();
    assert!(xml.contains(r#"<DateQualifier Desc="InvoiceDate">003</DateQualifier>"#));
    assert!(xml.contains(r#"<DateQualifier Desc="DueDate">002</DateQualifier>"#));
    assert!(xml.contains("<Date>4/9/2025</Date>"));
    assert!(xml.contains("<NetDueDate>4/9/2025</NetDueDate>"));
    assert!(!xml.contains("2025-"));
}

#[test]
fn free_text_is_escaped() {
    let mut order = invoice();
    order.bill_to.as_mut().unwrap().company_name = r#"Tom & Jerry's <"Shop">"#.into();
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    assert!(xml.contains(
        "<CompanyName>Tom &amp; Jerry&apos;s &lt;&quot;Shop&quot;&gt;</CompanyName>"
    ));
}

#[test]
fn missing_mandatory_values_render_as_empty_elements() {
    let order = OrderBuilder::new("PO-1").build().unwrap();
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    assert!(xml.contains("<CustomerNumber></CustomerNumber>"));
    assert!(xml.contains("<InvoiceNumber></InvoiceNumber>"));
    assert!(xml.contains("<InvoiceDate></InvoiceDate>"));
    // bill-to and ship-to blocks are always present
    assert_eq!(xml.matches(&format!("<{ADDRESS_ELEMENT}>")).count(), 2);
    assert!(!xml.contains("<Name>"));
    assert!(xml.contains("<CompanyName></CompanyName>"));
    assert!(!xml.contains("<Term>"));
}

#[test]
fn free_text_terms_write_only_the_partner_term_block() {
    let mut order = invoice();
    order.notes.push(Note {
        code: "GEN".into(),
        text: "Deliver to dock 4".into(),
    });
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    let term = &xml[xml.find("<Term>").unwrap()..xml.find("</Term>").unwrap()];
    assert!(term.contains("<TermsType>01</TermsType>"));
    assert!(term.contains("<TermsBasis>3</TermsBasis>"));
    assert!(term.contains("<NetDueDate>4/9/2025</NetDueDate>"));
    assert!(!xml.contains("TermsDescription"));
    assert!(!xml.contains("Deliver to dock 4"));
}

#[test]
fn structured_terms_carry_their_description() {
    let mut order = invoice();
    order.terms = Some(Terms {
        terms_type: "08".into(),
        basis: "3".into(),
        discount_days: Some(10),
        discount_percent: Some(dec!(2)),
        ..Default::default()
    });
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    assert!(xml.contains("<TermsType>08</TermsType>"));
    assert!(xml.contains("<TermsDiscountPercentage>2.0000</TermsDiscountPercentage>"));
    assert!(xml.contains("<TermsDescription>Net 30</TermsDescription>"));
}

#[test]
fn optional_parties_written_only_when_present() {
    let mut order = invoice();
    order.remit_to = Some(AddressBuilder::new("Acme Finance").build());
    let xml = to_lingo_xml(&[order], "SIL02").unwrap();
    assert!(xml.contains("<BillAndShipToCode>RE</BillAndShipToCode>"));
    assert!(!xml.contains("<BillAndShipToCode>SF</BillAndShipToCode>"));
    assert!(!xml.contains("<BillAndShipToCode>VN</BillAndShipToCode>"));
}

#[test]
fn serialized_invoice_parses_back() {
    let original = invoice();
    let xml = to_lingo_xml(std::slice::from_ref(&original), "SIL02").unwrap();
    let parsed = from_lingo_xml(&xml).unwrap();
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    let back = &parsed.orders[0];

    assert_eq!(back.po_number, original.po_number);
    assert_eq!(back.invoice_number, original.invoice_number);
    assert_eq!(back.invoice_date, original.invoice_date);
    assert_eq!(back.due_date, original.due_date);
    assert_eq!(back.total_amount(), dec!(62.5));
    let terms = back.terms.as_ref().unwrap();
    assert_eq!(terms.terms_type, "01");
    assert_eq!(terms.net_due_date, original.due_date);
    assert_eq!(back.bill_to.as_ref().unwrap().store_number, "0001");
    assert_eq!(back.line_items.len(), 2);
    for (a, b) in back.line_items.iter().zip(&original.line_items) {
        assert_eq!(a.line_no, b.line_no);
        assert_eq!(a.item_ids.vendor_item_no, b.item_ids.vendor_item_no);
        assert_eq!(a.quantities.invoiced(), b.quantities.invoiced());
        assert_eq!(a.quantities.ordered(), b.quantities.invoiced());
        assert_eq!(a.unit_price(), b.unit_price());
        assert_eq!(a.line_amount(), b.line_amount());
    }
}
