//! Compiled extraction patterns.
//!
//! The amount families encode a strict priority chain (symbol, then currency
//! code, then amount keyword); callers must preserve that order.

#![allow(clippy::expect_used)] // regex literals are constants, validated by tests

use regex::Regex;
use std::sync::OnceLock;

/// Cue words that classify a debit. Checked before the credit cues.
pub(crate) const DEBIT_CUES: [&str; 5] = ["debit", "debited", "spent", "paid", "purchase"];

/// Cue words that classify a credit.
pub(crate) const CREDIT_CUES: [&str; 3] = ["credit", "credited", "received"];

/// Family (a): currency-symbol-prefixed number, e.g. `₹2,000`.
pub(crate) fn amount_symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"₹\s?([\d,]+(\.\d{1,2})?)").expect("invalid symbol amount regex")
    })
}

/// Family (b): currency-code- or abbreviation-prefixed number, e.g.
/// `INR 500` / `Rs. 1,250.50`.
pub(crate) fn amount_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:INR|Rs\.?)\s?([\d,]+(\.\d{1,2})?)").expect("invalid code amount regex")
    })
}

/// Family (c): number following an amount keyword, e.g. `amount 750`.
pub(crate) fn amount_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:amount|total|sum|by)\s+₹?\s?([\d,]+(\.\d{1,2})?)")
            .expect("invalid keyword amount regex")
    })
}

/// `<day> <month-abbreviation>` date pattern, e.g. `17 Sep`.
pub(crate) fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s?(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)\b")
            .expect("invalid date regex")
    })
}

/// `{at|to|from} <merchant-phrase>` capture, terminated by ` on`, ` for`, a
/// period, or end of text.
pub(crate) fn merchant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:at|to|from)\s+([A-Za-z0-9][A-Za-z0-9 &.\-']+?)(?:\s+on|\s+for|\.|$)")
            .expect("invalid merchant regex")
    })
}
