//! Input masks and field validators.
//!
//! Masks strip everything but digits and re-insert separators at fixed digit
//! offsets, so applying one to its own output is a no-op.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// Number of digits in a CNPJ.
pub const TAX_ID_DIGITS: usize = 14;

/// Number of digits in a national phone number (area code + subscriber).
pub const PHONE_DIGITS: usize = 11;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Keep only ASCII digits.
pub fn strip_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mask a CNPJ as `DD.DDD.DDD/DDDD-DD`, progressively while it is typed.
///
/// Digits past the fourteenth are dropped.
pub fn format_tax_id(value: &str) -> String {
    let digits: Vec<char> = strip_digits(value).chars().take(TAX_ID_DIGITS).collect();
    // (offset, separator inserted before the digit at that offset)
    const SEPARATORS: [(usize, char); 4] = [(2, '.'), (5, '.'), (8, '/'), (12, '-')];

    let mut out = String::with_capacity(digits.len() + SEPARATORS.len());
    for (i, digit) in digits.iter().enumerate() {
        if let Some((_, sep)) = SEPARATORS.iter().find(|(offset, _)| *offset == i) {
            out.push(*sep);
        }
        out.push(*digit);
    }
    out
}

/// A CNPJ is accepted when it has exactly 14 digits and they are not all the
/// same digit. No check-digit verification is done.
pub fn is_valid_tax_id(value: &str) -> bool {
    let digits = strip_digits(value);
    if digits.len() != TAX_ID_DIGITS {
        return false;
    }
    let first = digits.as_bytes()[0];
    !digits.bytes().all(|b| b == first)
}

/// Mask a phone number as `(DD) DDDDD-DDDD`, progressively while it is typed.
///
/// Digits past the eleventh are dropped.
pub fn format_phone(value: &str) -> String {
    let digits: String = strip_digits(value).chars().take(PHONE_DIGITS).collect();
    if digits.len() <= 2 {
        return digits;
    }
    let (area, subscriber) = digits.split_at(2);
    if subscriber.len() <= 5 {
        format!("({area}) {subscriber}")
    } else {
        let (head, tail) = subscriber.split_at(5);
        format!("({area}) {head}-{tail}")
    }
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Local date and time as printed in validation reports.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}
