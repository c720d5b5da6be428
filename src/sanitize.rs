//! Validation of raw rows into [`Record`]s.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::parser::RawRow;
use crate::record::Record;

/// Date format used by `TRANSACTION_DT` on input and in the by-date output.
pub const DATE_FORMAT: &str = "%m%d%Y";

const ZIP_CODE_LEN: usize = 5;
const DATE_LEN: usize = 8;
const MIN_YEAR: i32 = 1;

/// Why a row was rejected before reaching any aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    OtherIdPresent,
    MissingRecipient,
    MissingAmount,
}

/// Outcome of sanitizing one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    Valid(Record),
    Skipped(SkipReason),
}

/// Returns the first five digits of `zip_code`, or `None` if it is shorter
/// than five characters or contains a non-digit.
pub fn sanitize_zip_code(zip_code: &str) -> Option<String> {
    if zip_code.len() < ZIP_CODE_LEN || !zip_code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(zip_code[..ZIP_CODE_LEN].to_string())
}

/// Parses an eight-digit `MMDDYYYY` date; any failure yields `None`.
///
/// Year `0000` is rejected, the earliest accepted year is 1.
pub fn sanitize_date(date: &str) -> Option<NaiveDate> {
    if date.len() != DATE_LEN || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .filter(|d| d.year() >= MIN_YEAR)
}

/// Renders a date back into the eight-digit `MMDDYYYY` form.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a whole-unit transaction amount.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidAmount`] when the trimmed value is not an
/// integer. Unlike a bad zip code or date this aborts the run.
pub fn sanitize_amount(amount: &str, line: u64) -> Result<i64> {
    amount
        .trim()
        .parse::<i64>()
        .map_err(|_| PipelineError::InvalidAmount {
            line,
            value: amount.to_string(),
        })
}

/// Converts a raw row into a [`Record`] or a [`SkipReason`].
pub fn sanitize(row: &RawRow) -> Result<Sanitized> {
    let reason = if !row.other_id.is_empty() {
        Some(SkipReason::OtherIdPresent)
    } else if row.cmte_id.is_empty() {
        Some(SkipReason::MissingRecipient)
    } else if row.transaction_amt.is_empty() {
        Some(SkipReason::MissingAmount)
    } else {
        None
    };

    if let Some(reason) = reason {
        debug!(line = row.line, ?reason, "Skipping row");
        return Ok(Sanitized::Skipped(reason));
    }

    let amount = sanitize_amount(&row.transaction_amt, row.line)?;
    let zip_code = sanitize_zip_code(&row.zip_code);
    let date = sanitize_date(&row.transaction_dt);

    if zip_code.is_none() {
        debug!(line = row.line, raw = %row.zip_code, "Invalid zip code");
    }
    if date.is_none() {
        debug!(line = row.line, raw = %row.transaction_dt, "Invalid transaction date");
    }

    Ok(Sanitized::Valid(Record {
        recipient: row.cmte_id.clone(),
        zip_code,
        date,
        amount,
    }))
}
