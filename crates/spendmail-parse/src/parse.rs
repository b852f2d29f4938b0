//! The staged extraction pipeline.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::model::{Amount, Parsed, TransactionKind, DEFAULT_CURRENCY};
use crate::patterns::{
    CREDIT_CUES, DEBIT_CUES, amount_code_re, amount_keyword_re, amount_symbol_re, date_re,
    merchant_re,
};

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract a transaction from message text, using the current time as the
/// fallback transaction date.
///
/// Returns `None` when the text does not describe a transaction; rejection is
/// an expected outcome and carries no error detail.
#[must_use]
pub fn parse_transaction(text: &str) -> Option<Parsed> {
    parse_transaction_at(text, Utc::now())
}

/// Extract a transaction from message text with an explicit extraction time.
///
/// `now` supplies both the fallback transaction date and the year attached to
/// a day-month date found in the text, which keeps the function deterministic
/// under test.
#[must_use]
pub fn parse_transaction_at(text: &str, now: DateTime<Utc>) -> Option<Parsed> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return None;
    }
    let lower = normalized.to_lowercase();

    let kind = classify(&lower)?;

    let amount = extract_amount(&normalized)?;
    if !amount.is_positive() {
        return None;
    }

    let transaction_date = extract_date(&normalized, now);
    let description = extract_description(&normalized, kind);

    Some(Parsed {
        kind,
        amount,
        currency: DEFAULT_CURRENCY.to_string(),
        description,
        transaction_date,
    })
}

/// Stage 1: debit cues take priority over credit cues.
fn classify(lower: &str) -> Option<TransactionKind> {
    if DEBIT_CUES.iter().any(|cue| lower.contains(cue)) {
        Some(TransactionKind::Debit)
    } else if CREDIT_CUES.iter().any(|cue| lower.contains(cue)) {
        Some(TransactionKind::Credit)
    } else {
        None
    }
}

/// Stage 2: the first pattern family to match wins; there is no fallthrough
/// to a lower-priority family when the captured number fails to convert.
fn extract_amount(text: &str) -> Option<Amount> {
    let captures = amount_symbol_re()
        .captures(text)
        .or_else(|| amount_code_re().captures(text))
        .or_else(|| amount_keyword_re().captures(text))?;
    Amount::parse_decimal(captures.get(1)?.as_str())
}

/// Stage 3: a `<day> <month>` mention combined with the current year, else
/// the extraction time. The fallback is deliberately NOT the message header
/// date; duplicate suppression is keyed on message identity, so a defaulted
/// date on a rare message is a soft defect only.
fn extract_date(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(captures) = date_re().captures(text) else {
        return now;
    };
    let Ok(day) = captures[1].parse::<u32>() else {
        return now;
    };
    let Some(month) = month_number(&captures[2].to_lowercase()) else {
        return now;
    };

    // Calendar-invalid combinations like "31 Feb" fall back to `now`.
    NaiveDate::from_ymd_opt(now.year(), month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(now, |midnight| midnight.and_utc())
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" | "sept" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Stage 4: merchant phrase, then short sentence containing the kind
/// keyword, then `"Unknown"`.
fn extract_description(text: &str, kind: TransactionKind) -> String {
    if let Some(captures) = merchant_re().captures(text)
        && let Some(merchant) = captures.get(1)
    {
        return merchant.as_str().trim().to_string();
    }

    let keyword = kind.keyword();
    for segment in text.split('.') {
        if segment.to_lowercase().contains(keyword) && segment.len() < 80 {
            return segment.trim().to_string();
        }
    }

    "Unknown".to_string()
}
