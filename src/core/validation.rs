use std::collections::HashSet;

use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::*;

/// Pre-flight checks for an order about to be serialized.
/// Returns all validation errors found (not just the first).
///
/// This is not EDI schema validation; it only guards the model invariants
/// the serializers rely on.
pub fn validate_order(order: &Order) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if order.po_number.trim().is_empty() && order.invoice_number.trim().is_empty() {
        errors.push(ValidationError::new(
            "po_number",
            "an order needs a purchase order number or an invoice number",
        ));
    }

    let mut seen = HashSet::new();
    for (i, line) in order.line_items.iter().enumerate() {
        if line.line_no.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("line_items[{i}].line_no"),
                "line number must not be empty",
            ));
        } else if !seen.insert(line.line_no.as_str()) {
            errors.push(ValidationError::new(
                format!("line_items[{i}].line_no"),
                format!("duplicate line number '{}'", line.line_no),
            ));
        }

        for (field, value) in [
            ("quantities.invoiced", line.quantities.invoiced()),
            ("unit_price", line.unit_price()),
        ] {
            if value < Decimal::ZERO {
                errors.push(ValidationError::new(
                    format!("line_items[{i}].{field}"),
                    "must not be negative",
                ));
            }
        }
    }

    errors
}

/// Validate a batch of outbound invoices, prefixing field paths by index.
pub fn validate_batch(orders: &[Order]) -> Vec<ValidationError> {
    orders
        .iter()
        .enumerate()
        .flat_map(|(i, order)| {
            validate_order(order).into_iter().map(move |e| ValidationError {
                field: format!("orders[{i}].{}", e.field),
                message: e.message,
            })
        })
        .collect()
}
