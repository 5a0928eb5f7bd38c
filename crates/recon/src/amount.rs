//! Fixed-point amount handling. All money inside the engine is `i64` cents.

use crate::model::Cell;

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Outcome of reading one amount-bearing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAmount {
    Blank,
    Cents(i64),
    Unparseable,
}

/// Largest magnitude accepted for a single amount, in cents (just under ten
/// trillion). Sums of thousands of such rows still fit in `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 999_999_999_999_999;

/// Parse a financial number string into cents:
/// - Strip currency symbols and whitespace, then commas
/// - Handle `(123.45)` and `$(123.45)` → `-12345`
/// - Round half away from zero past the second decimal
/// - Returns None if non-numeric characters remain after stripping, or if
///   the magnitude exceeds [`MAX_AMOUNT_CENTS`]
pub fn parse_amount_cents(s: &str) -> Option<i64> {
    let stripped: String = s
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let (is_negative, inner) = match stripped.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, stripped.as_str()),
    };

    let cleaned: String = inner.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let (signed_negative, body) = match cleaned.as_bytes()[0] {
        b'-' if !is_negative => (true, &cleaned[1..]),
        b'+' if !is_negative => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };

    let cents = decimal_to_cents(body)?;
    if cents > MAX_AMOUNT_CENTS {
        return None;
    }
    Some(if is_negative || signed_negative { -cents } else { cents })
}

/// Unsigned decimal text (`"1234.567"`) to cents.
fn decimal_to_cents(body: &str) -> Option<i64> {
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut cents: i64 = 0;
    for b in int_part.bytes() {
        cents = cents.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }
    cents = cents.checked_mul(100)?;

    let mut frac = frac_part.bytes().map(|b| i64::from(b - b'0'));
    let tenths = frac.next().unwrap_or(0);
    let hundredths = frac.next().unwrap_or(0);
    cents = cents.checked_add(tenths * 10 + hundredths)?;
    if frac.next().is_some_and(|d| d >= 5) {
        cents = cents.checked_add(1)?;
    }
    Some(cents)
}

/// Convert a float (spreadsheet numeric cell) to cents.
pub fn float_to_cents(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let scaled = (n * 100.0).round();
    if scaled.abs() > MAX_AMOUNT_CENTS as f64 {
        return None;
    }
    Some(scaled as i64)
}

/// Read an amount from a cell.
pub fn cell_amount(cell: &Cell) -> CellAmount {
    match cell {
        Cell::Blank => CellAmount::Blank,
        Cell::Number(n) => float_to_cents(*n).map_or(CellAmount::Unparseable, CellAmount::Cents),
        Cell::Text(s) if s.trim().is_empty() => CellAmount::Blank,
        Cell::Text(s) => parse_amount_cents(s).map_or(CellAmount::Unparseable, CellAmount::Cents),
    }
}

pub fn cents_to_decimal(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Render cents with exactly two decimals (`-50000` → `"-500.00"`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
