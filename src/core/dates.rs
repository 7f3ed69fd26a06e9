//! Date conversion between the canonical ISO form and the Lingo display form.
//!
//! Internally every date is a [`NaiveDate`], which renders as `YYYY-MM-DD`.
//! The Lingo dialect displays dates as `M/D/YYYY` without zero padding.

use chrono::{Datelike, Local, NaiveDate};

use super::error::CoercionWarning;

/// A value produced by lenient parsing, with the warning raised when the
/// source could not be read and a default was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coerced<T> {
    pub value: T,
    pub warning: Option<CoercionWarning>,
}

impl<T> Coerced<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn fell_back(&self) -> bool {
        self.warning.is_some()
    }
}

/// Strictly parse `YYYY-MM-DD` or `M/D/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    parse_iso(raw).or_else(|| parse_slashed(raw))
}

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_slashed(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || !(1..=2).contains(&month.len())
        || !(1..=2).contains(&day.len())
        || year.len() != 4
    {
        return None;
    }
    if ![month, day, year]
        .iter()
        .all(|p| p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Render a date the way the Lingo dialect displays it (`3/9/2025`).
pub fn to_lingo_display(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Render a date in canonical ISO form.
pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Lenient date reader with an injectable "today" for the fallback.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    today: NaiveDate,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateNormalizer {
    /// Normalizer falling back to the local calendar date.
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    /// Normalizer with a fixed fallback date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Read `raw` as a canonical date.
    ///
    /// Anything other than `YYYY-MM-DD` or `M/D/YYYY` yields today's date and
    /// a warning naming `field`.
    pub fn to_canonical(&self, field: &str, raw: &str) -> Coerced<NaiveDate> {
        match parse_date(raw) {
            Some(date) => Coerced::exact(date),
            None => {
                let warning = CoercionWarning::new(field, raw, to_iso(self.today));
                tracing::warn!(field, raw, fallback = %self.today, "unparseable date, using today");
                Coerced {
                    value: self.today,
                    warning: Some(warning),
                }
            }
        }
    }

    /// String-to-string form of [`Self::to_canonical`].
    pub fn canonicalize(&self, raw: &str) -> String {
        to_iso(self.to_canonical("date", raw).value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_passes_through() {
        assert_eq!(parse_date("2025-03-10"), Some(date(2025, 3, 10)));
    }

    #[test]
    fn slashed_is_month_first() {
        assert_eq!(parse_date("3/9/2025"), Some(date(2025, 3, 9)));
        assert_eq!(parse_date("12/31/2024"), Some(date(2024, 12, 31)));
        assert_eq!(parse_date("03/09/2025"), Some(date(2025, 3, 9)));
    }

    #[test]
    fn rejects_other_shapes() {
        assert_eq!(parse_date("2025/03/10"), None);
        assert_eq!(parse_date("20250310"), None);
        assert_eq!(parse_date("13/1/2025"), None);
        assert_eq!(parse_date("1/1/25"), None);
        assert_eq!(parse_date("2025-3-10"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn display_drops_padding() {
        assert_eq!(to_lingo_display(date(2025, 3, 9)), "3/9/2025");
        assert_eq!(to_lingo_display(date(2024, 11, 20)), "11/20/2024");
    }

    #[test]
    fn fallback_uses_today_and_warns() {
        let n = DateNormalizer::with_today(date(2026, 1, 2));
        let c = n.to_canonical("po_date", "next tuesday");
        assert_eq!(c.value, date(2026, 1, 2));
        let w = c.warning.unwrap();
        assert_eq!(w.field, "po_date");
        assert_eq!(w.raw, "next tuesday");
        assert_eq!(w.fallback, "2026-01-02");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let n = DateNormalizer::with_today(date(2026, 1, 2));
        for raw in ["2025-03-10", "3/10/2025", "garbage", ""] {
            let once = n.canonicalize(raw);
            assert_eq!(n.canonicalize(&once), once);
        }
    }
}
