//! Streaming per-(recipient, zip code) running statistics.

use std::collections::HashMap;
use std::io::Write;

use tracing::debug;

use crate::aggregators::running::RunningGroupState;
use crate::error::Result;
use crate::output::{ZipSummary, line_writer};
use crate::pipeline::RecordHandler;
use crate::record::Record;

/// Emits one by-zip line per record that has a valid zip code, in arrival
/// order, reflecting the group's state after that record.
pub struct StreamingGroupAggregator<W: Write> {
    groups: HashMap<(String, String), RunningGroupState>,
    writer: csv::Writer<W>,
    lines_written: u64,
}

impl<W: Write> StreamingGroupAggregator<W> {
    pub fn new(wtr: W) -> Self {
        Self {
            groups: HashMap::new(),
            writer: line_writer(wtr),
            lines_written: 0,
        }
    }

    /// Folds `record` into its group. Returns `None` if the record has no
    /// valid zip code.
    pub fn observe(&mut self, record: &Record) -> Option<ZipSummary> {
        let zip_code = record.zip_code.as_ref()?;
        let state = self
            .groups
            .entry((record.recipient.clone(), zip_code.clone()))
            .or_default()
            .update(record.amount);

        Some(ZipSummary {
            recipient: record.recipient.clone(),
            zip_code: zip_code.clone(),
            median: state.median,
            count: state.count,
            total: state.total,
        })
    }

    pub fn group(&self, recipient: &str, zip_code: &str) -> Option<&RunningGroupState> {
        self.groups
            .get(&(recipient.to_string(), zip_code.to_string()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        Ok(self.writer.into_inner()?)
    }
}

impl<W: Write> RecordHandler for StreamingGroupAggregator<W> {
    fn name(&self) -> &'static str {
        "by_zip"
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        if let Some(line) = self.observe(record) {
            self.writer.serialize(&line)?;
            self.lines_written += 1;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        debug!(
            groups = self.groups.len(),
            lines = self.lines_written,
            "Flushing by-zip output"
        );
        self.writer.flush()?;
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.lines_written
    }
}
