//! Per-(recipient, date) statistics computed once all records are in.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::aggregators::select::median;
use crate::error::Result;
use crate::output::{DateSummary, line_writer};
use crate::pipeline::RecordHandler;
use crate::record::Record;

/// Buffers amounts per (recipient, date) and, on finalize, writes one line
/// per group ordered by recipient then date.
pub struct BatchGroupAggregator<W: Write, R: Rng = StdRng> {
    groups: BTreeMap<(String, NaiveDate), Vec<i64>>,
    writer: csv::Writer<W>,
    rng: R,
    finalized: bool,
    lines_written: u64,
}

impl<W: Write> BatchGroupAggregator<W, StdRng> {
    pub fn new(wtr: W) -> Self {
        Self::with_rng(wtr, StdRng::from_entropy())
    }
}

impl<W: Write, R: Rng> BatchGroupAggregator<W, R> {
    /// Uses `rng` for pivot selection; seed it for reproducible runs.
    pub fn with_rng(wtr: W, rng: R) -> Self {
        Self {
            groups: BTreeMap::new(),
            writer: line_writer(wtr),
            rng,
            finalized: false,
            lines_written: 0,
        }
    }

    /// Buffers `record`'s amount. Records without a valid date are ignored.
    pub fn observe(&mut self, record: &Record) {
        if let Some(date) = record.date {
            self.groups
                .entry((record.recipient.clone(), date))
                .or_default()
                .push(record.amount);
        }
    }

    /// Median, count and total of every group, sorted by (recipient, date).
    pub fn summaries(&mut self) -> Vec<DateSummary> {
        let rng = &mut self.rng;
        self.groups
            .iter()
            .filter_map(|((recipient, date), amounts)| {
                Some(DateSummary {
                    recipient: recipient.clone(),
                    date: *date,
                    median: median(amounts, &mut *rng)?,
                    count: amounts.len() as u64,
                    total: amounts.iter().map(|&a| i128::from(a)).sum(),
                })
            })
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        Ok(self.writer.into_inner()?)
    }
}

impl<W: Write, R: Rng> RecordHandler for BatchGroupAggregator<W, R> {
    fn name(&self) -> &'static str {
        "by_date"
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        self.observe(record);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            debug!("By-date output already finalized");
            return Ok(());
        }
        self.finalized = true;

        for line in self.summaries() {
            self.writer.serialize(&line)?;
            self.lines_written += 1;
        }
        debug!(groups = self.groups.len(), "Flushing by-date output");
        self.writer.flush()?;
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.lines_written
    }
}
