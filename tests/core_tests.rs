use chrono::NaiveDate;
use edibridge::core::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- Dates ---

#[test]
fn canonical_dates_pass_through() {
    let dates = DateNormalizer::with_today(date(2025, 1, 2));
    let c = dates.to_canonical("po_date", "2025-03-10");
    assert_eq!(c.value, date(2025, 3, 10));
    assert!(!c.fell_back());
}

#[test]
fn month_day_year_is_reinterpreted() {
    let dates = DateNormalizer::with_today(date(2025, 1, 2));
    assert_eq!(dates.to_canonical("d", "3/10/2025").value, date(2025, 3, 10));
    assert_eq!(dates.to_canonical("d", "12/1/2024").value, date(2024, 12, 1));
    assert_eq!(dates.to_canonical("d", "03/09/2025").value, date(2025, 3, 9));
}

#[test]
fn unparseable_date_falls_back_with_warning() {
    let dates = DateNormalizer::with_today(date(2025, 1, 2));
    let c = dates.to_canonical("invoice_date", "2/30/2025");
    assert_eq!(c.value, date(2025, 1, 2));
    let w = c.warning.unwrap();
    assert_eq!(w.field, "invoice_date");
    assert_eq!(w.raw, "2/30/2025");
    assert_eq!(w.fallback, "2025-01-02");
}

#[test]
fn lingo_display_has_no_padding() {
    assert_eq!(to_lingo_display(date(2025, 3, 9)), "3/9/2025");
    assert_eq!(to_lingo_display(date(2025, 12, 31)), "12/31/2025");
}

#[test]
fn canonicalize_is_idempotent() {
    let dates = DateNormalizer::with_today(date(2025, 1, 2));
    for raw in ["2025-03-10", "3/10/2025", "garbage", ""] {
        let once = dates.canonicalize(raw);
        assert_eq!(dates.canonicalize(&once), once);
    }
}

// --- Model ---

#[test]
fn group_key_joins_document_and_po() {
    let order = OrderBuilder::new("P1").document_id("D1").build().unwrap();
    assert_eq!(order.group_key(), "D1-P1");
    assert_eq!(group_key("", "P1"), "-P1");
}

#[test]
fn monetary_fields_default_to_zero() {
    let order = Order::default();
    assert_eq!(order.total_amount(), dec!(0));
    assert_eq!(order.tax_amount(), dec!(0));
    assert_eq!(order.total_cases(), dec!(0));
    assert_eq!(order.total_weight(), dec!(0));
    let line = LineItem::default();
    assert_eq!(line.unit_price(), dec!(0));
    assert_eq!(line.quantities.invoiced(), dec!(0));
}

#[test]
fn json_never_renders_null() {
    let order = OrderBuilder::new("P1")
        .bill_to(AddressBuilder::new("Acme").build())
        .add_line(LineItemBuilder::new("X", dec!(1), dec!(2)).build())
        .build()
        .unwrap();
    let json = serde_json::to_string(&order).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["taxAmount"], "0");
    assert_eq!(value["shipDate"], "");
    assert_eq!(value["billTo"]["zip"], "");
    assert_eq!(value["lineItems"][0]["gtin"], "");
    assert_eq!(value["lineItems"][0]["orderedQuantity"], "0");
    assert!(!json.contains("\"lineNo\":null"));
}

#[test]
fn zero_defaulted_amounts_keep_set_values() {
    let order = OrderBuilder::new("P1")
        .tax_amount(dec!(4.20))
        .add_line(LineItemBuilder::new("X", dec!(1), dec!(2)).build())
        .build()
        .unwrap();
    let json = serde_json::to_string(&order).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["taxAmount"], "4.20");
    let back: Order = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tax_amount, Some(dec!(4.20)));
}

#[test]
fn address_accepts_name_alias() {
    let address: Address =
        serde_json::from_str(r#"{"name": "Acme", "storeNumber": "0420"}"#).unwrap();
    assert_eq!(address.company_name, "Acme");
    assert_eq!(address.store_number, "0420");
}

#[test]
fn date_fields_route() {
    let mut order = Order::default();
    order.set_date(DateField::Cancel, date(2025, 5, 1));
    order.set_date(DateField::Due, date(2025, 5, 2));
    assert_eq!(order.cancel_date, Some(date(2025, 5, 1)));
    assert_eq!(order.date(DateField::Due), Some(date(2025, 5, 2)));
    assert_eq!(order.date(DateField::Ship), None);
}

// --- Builder & validation ---

#[test]
fn builder_numbers_lines() {
    let order = OrderBuilder::new("P1")
        .add_line(LineItemBuilder::new("A", dec!(1), dec!(1)).build())
        .add_line(LineItemBuilder::new("B", dec!(1), dec!(1)).line_no("7").build())
        .add_line(LineItemBuilder::new("C", dec!(1), dec!(1)).build())
        .build()
        .unwrap();
    let numbers: Vec<_> = order.line_items.iter().map(|l| l.line_no.as_str()).collect();
    assert_eq!(numbers, ["0001", "0007", "0008"]);
}

#[test]
fn line_amount_defaults_to_quantity_times_price() {
    let line = LineItemBuilder::new("A", dec!(3), dec!(2.25)).build();
    assert_eq!(line.line_amount(), dec!(6.75));
}

#[test]
fn builder_rejects_order_without_numbers() {
    let result = OrderBuilder::new("").build();
    assert!(matches!(result, Err(EdiError::Validation(_))));
}

#[test]
fn builder_rejects_negative_quantity() {
    let result = OrderBuilder::new("P1")
        .add_line(LineItemBuilder::new("A", dec!(-1), dec!(1)).build())
        .build();
    match result {
        Err(EdiError::Validation(msg)) => assert!(msg.contains("quantities.invoiced")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn batch_validation_prefixes_order_index() {
    let good = OrderBuilder::new("P1").build().unwrap();
    let errors = validate_batch(&[good, Order::default()]);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].field.starts_with("orders[1]."));
}

// --- Errors ---

#[test]
fn transport_errors_classify_session_loss() {
    assert!(TransportError::Connection("reset".into()).is_session_lost());
    assert!(
        !TransportError::Write {
            path: "/a".into(),
            reason: "denied".into()
        }
        .is_session_lost()
    );
    let e: EdiError = TransportError::Connection("reset".into()).into();
    assert_eq!(e.to_string(), "connection failed: reset");
}

#[test]
fn coercion_warning_display() {
    let w = CoercionWarning::new("po_date", "soon", "2025-01-02").within("orders[0]");
    assert_eq!(w.to_string(), "orders[0].po_date: could not coerce 'soon', using '2025-01-02'");
}
