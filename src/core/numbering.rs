use std::collections::HashSet;

use super::error::CoercionWarning;
use super::types::Order;

/// Width of a line number (`"0001"`).
pub const LINE_NO_WIDTH: usize = 4;

/// Per-order line number sequence.
///
/// Line numbers are zero-padded to four digits and unique within an order.
/// Lines without a number get the next free one in source order; a supplied
/// number that collides with an earlier line is re-assigned.
#[derive(Debug, Clone, Default)]
pub struct LineNumberSequence {
    next_number: u64,
    issued: HashSet<String>,
}

impl LineNumberSequence {
    /// Create a new sequence starting at 1.
    pub fn new() -> Self {
        Self {
            next_number: 1,
            issued: HashSet::new(),
        }
    }

    /// Preview the next generated number without consuming it.
    /// Once the counter is exhausted the search wraps to the lowest free
    /// number.
    pub fn peek(&self) -> String {
        let start = self.next_number.max(1);
        (start..=u64::MAX)
            .chain(1..start)
            .map(pad)
            .find(|n| !self.issued.contains(n))
            .unwrap_or_else(|| pad(start))
    }

    /// Assign a line number for a line whose source value is `supplied`
    /// (empty when the source had none).
    ///
    /// Returns the number to use and, when the supplied value could not be
    /// kept, a warning describing the substitution.
    pub fn assign(&mut self, supplied: &str) -> (String, Option<CoercionWarning>) {
        let supplied = supplied.trim();
        if supplied.is_empty() {
            return (self.generate(), None);
        }

        let normalized = normalize_line_no(supplied);
        if self.issued.contains(&normalized) {
            let fresh = self.generate();
            let warning = CoercionWarning::new("line_no", supplied, fresh.clone());
            return (fresh, Some(warning));
        }

        if let Ok(n) = normalized.parse::<u64>() {
            self.next_number = self.next_number.max(n.saturating_add(1));
        }
        self.issued.insert(normalized.clone());
        (normalized, None)
    }

    fn generate(&mut self) -> String {
        let number = self.peek();
        self.next_number = number
            .parse::<u64>()
            .map(|n| n.saturating_add(1))
            .unwrap_or(self.next_number.saturating_add(1));
        self.issued.insert(number.clone());
        number
    }
}

/// Number every line of `order` in place: supplied numbers are padded,
/// missing ones generated and collisions re-assigned.
pub fn number_lines(order: &mut Order) -> Vec<CoercionWarning> {
    let mut seq = LineNumberSequence::new();
    let mut warnings = Vec::new();
    for (i, line) in order.line_items.iter_mut().enumerate() {
        let (line_no, warning) = seq.assign(&line.line_no);
        if let Some(w) = warning {
            warnings.push(w.within(&format!("line_items[{i}]")));
        }
        line.line_no = line_no;
    }
    warnings
}

/// Zero-pad a numeric line number to four digits; non-numeric values are kept.
pub fn normalize_line_no(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<u64>() {
        Ok(n) => pad(n),
        Err(_) => raw.to_string(),
    }
}

fn pad(n: u64) -> String {
    format!("{:0>width$}", n, width = LINE_NO_WIDTH)
}
