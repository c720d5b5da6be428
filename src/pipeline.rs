//! Drives raw input through sanitization into every record handler.

use std::collections::BTreeMap;
use std::io::Read;

use csv::ByteRecord;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::parser::{RawRow, pipe_reader};
use crate::record::Record;
use crate::sanitize::{Sanitized, SkipReason, sanitize};

/// A consumer of validated records.
///
/// `update` is called once per record in input order; `finalize` once after
/// the last record.
pub trait RecordHandler {
    fn name(&self) -> &'static str;

    fn update(&mut self, record: &Record) -> Result<()>;

    fn finalize(&mut self) -> Result<()>;

    /// Number of output lines written so far.
    fn lines_written(&self) -> u64;
}

/// Counters describing one pipeline run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows_read: u64,
    pub rows_accepted: u64,
    pub skipped_other_id: u64,
    pub skipped_missing_recipient: u64,
    pub skipped_missing_amount: u64,
    pub invalid_zip_code: u64,
    pub invalid_date: u64,
    /// Lines written per handler, keyed by [`RecordHandler::name`].
    pub lines_written: BTreeMap<String, u64>,
}

impl RunSummary {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::OtherIdPresent => self.skipped_other_id += 1,
            SkipReason::MissingRecipient => self.skipped_missing_recipient += 1,
            SkipReason::MissingAmount => self.skipped_missing_amount += 1,
        }
    }

    pub fn rows_skipped(&self) -> u64 {
        self.skipped_other_id + self.skipped_missing_recipient + self.skipped_missing_amount
    }
}

/// Fans every valid record out to each handler, then finalizes them.
pub struct DonorPipeline<'a> {
    handlers: Vec<&'a mut dyn RecordHandler>,
}

impl<'a> DonorPipeline<'a> {
    pub fn new(handlers: Vec<&'a mut dyn RecordHandler>) -> Self {
        Self { handlers }
    }

    /// Reads every row of `input` and returns the run's counters.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed row, non-integer amount, or I/O failure.
    /// Output already handed to the handlers is not rolled back.
    #[tracing::instrument(skip_all, fields(handlers = self.handlers.len()))]
    pub fn process<R: Read>(&mut self, input: R) -> Result<RunSummary> {
        let mut rdr = pipe_reader(input);
        let mut raw = ByteRecord::new();
        let mut summary = RunSummary::default();

        info!("Processing contributions");

        while rdr.read_byte_record(&mut raw)? {
            summary.rows_read += 1;
            let row = RawRow::from_record(&raw)?;

            let record = match sanitize(&row)? {
                Sanitized::Valid(record) => record,
                Sanitized::Skipped(reason) => {
                    summary.record_skip(reason);
                    continue;
                }
            };

            summary.rows_accepted += 1;
            if record.zip_code.is_none() {
                summary.invalid_zip_code += 1;
            }
            if record.date.is_none() {
                summary.invalid_date += 1;
            }

            for handler in self.handlers.iter_mut() {
                handler.update(&record)?;
            }
        }

        for handler in self.handlers.iter_mut() {
            handler.finalize()?;
            summary
                .lines_written
                .insert(handler.name().to_string(), handler.lines_written());
        }

        info!(
            rows_read = summary.rows_read,
            rows_accepted = summary.rows_accepted,
            rows_skipped = summary.rows_skipped(),
            "Finished processing contributions"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::{BatchGroupAggregator, StreamingGroupAggregator};
    use crate::error::PipelineError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn row(cmte_id: &str, zip: &str, date: &str, amount: &str, other_id: &str) -> String {
        let mut fields = vec![""; 21];
        fields[0] = cmte_id;
        fields[10] = zip;
        fields[13] = date;
        fields[14] = amount;
        fields[15] = other_id;
        fields.join("|") + "\n"
    }

    /// Runs both aggregators over `input`, returning (by_zip, by_date, summary).
    fn run(input: &str) -> Result<(String, String, RunSummary)> {
        let mut by_zip = StreamingGroupAggregator::new(Vec::new());
        let mut by_date = BatchGroupAggregator::with_rng(Vec::new(), StdRng::seed_from_u64(1));
        let handlers: Vec<&mut dyn RecordHandler> = vec![&mut by_zip, &mut by_date];
        let summary = DonorPipeline::new(handlers).process(input.as_bytes())?;
        Ok((
            String::from_utf8(by_zip.into_inner()?).unwrap(),
            String::from_utf8(by_date.into_inner()?).unwrap(),
            summary,
        ))
    }

    #[test]
    fn test_end_to_end_running_median() {
        let input = ["100", "200", "300"]
            .iter()
            .map(|amt| row("C001", "90210", "01152020", amt, ""))
            .collect::<String>();
        let (by_zip, by_date, summary) = run(&input).unwrap();

        assert_eq!(
            by_zip,
            "C001|90210|100|1|100\nC001|90210|150|2|300\nC001|90210|200|3|600\n"
        );
        assert_eq!(by_date, "C001|01152020|200|3|600\n");
        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.rows_accepted, 3);
        assert_eq!(summary.lines_written["by_zip"], 3);
        assert_eq!(summary.lines_written["by_date"], 1);
    }

    #[test]
    fn test_keys_filter_independently() {
        let input = [
            row("C001", "123", "01152020", "10", ""),
            row("C001", "90210", "bad", "20", ""),
            row("C001", "90210", "01152020", "30", "OTHER"),
            row("", "90210", "01152020", "30", ""),
            row("C001", "90210", "01152020", "", ""),
        ]
        .concat();
        let (by_zip, by_date, summary) = run(&input).unwrap();

        assert_eq!(by_zip, "C001|90210|20|1|20\n");
        assert_eq!(by_date, "C001|01152020|10|1|10\n");
        assert_eq!(summary.rows_read, 5);
        assert_eq!(summary.rows_accepted, 2);
        assert_eq!(summary.skipped_other_id, 1);
        assert_eq!(summary.skipped_missing_recipient, 1);
        assert_eq!(summary.skipped_missing_amount, 1);
        assert_eq!(summary.rows_skipped(), 3);
        assert_eq!(summary.invalid_zip_code, 1);
        assert_eq!(summary.invalid_date, 1);
    }

    #[test]
    fn test_by_date_order_ignores_arrival_order() {
        let input = [
            row("B", "90210", "01012020", "1", ""),
            row("A", "90210", "01012020", "2", ""),
        ]
        .concat();
        let (_, by_date, _) = run(&input).unwrap();
        assert_eq!(by_date, "A|01012020|2|1|2\nB|01012020|1|1|1\n");
    }

    #[test]
    fn test_totals_past_i64_range() {
        let max = i64::MAX.to_string();
        let input = [
            row("C001", "90210", "01152020", &max, ""),
            row("C001", "90210", "01152020", &max, ""),
        ]
        .concat();
        let (by_zip, by_date, _) = run(&input).unwrap();

        assert_eq!(
            by_zip.lines().last(),
            Some(format!("C001|90210|{max}|2|18446744073709551614").as_str())
        );
        assert_eq!(by_date, format!("C001|01152020|{max}|2|18446744073709551614\n"));
    }

    #[test]
    fn test_non_integer_amount_aborts() {
        let input = [
            row("C001", "90210", "01152020", "10", ""),
            row("C001", "90210", "01152020", "1.5", ""),
        ]
        .concat();
        match run(&input) {
            Err(PipelineError::InvalidAmount { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "1.5");
            }
            other => panic!("expected invalid amount, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_row_aborts() {
        let input = format!("{}C001|90210\n", row("C001", "90210", "01152020", "10", ""));
        assert!(matches!(
            run(&input),
            Err(PipelineError::MalformedRow { line: 2, found: 2, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let (by_zip, by_date, summary) = run("").unwrap();
        assert_eq!(by_zip, "");
        assert_eq!(by_date, "");
        assert_eq!(summary.rows_read, 0);
    }
}
