//! Output formatting for the by-zip and by-date reports and the run summary.
//!
//! Report lines are `|`-delimited with no header and no quoting.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::pipeline::RunSummary;
use crate::sanitize::format_date;

/// One line of the by-zip report: the group's state after one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipSummary {
    pub recipient: String,
    pub zip_code: String,
    pub median: i64,
    pub count: u64,
    pub total: i128,
}

/// One line of the by-date report: a finished (recipient, date) group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub recipient: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub median: i64,
    pub count: u64,
    pub total: i128,
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(date))
}

/// Wraps `wtr` in a headerless, unquoted, `|`-delimited line writer.
pub fn line_writer<W: Write>(wtr: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(wtr)
}

/// Logs a run summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &RunSummary) {
    debug!("{:#?}", summary);
}

/// Logs a run summary as JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    info!("{}", serde_json::to_string(summary)?);
    Ok(())
}
