//! Pipe-delimited parser for FEC individual contribution files.

use std::io::Read;

use csv::{ByteRecord, ReaderBuilder};

use crate::error::{PipelineError, Result};

/// Column names of the FEC individual contributions file, in file order.
///
/// See <http://classic.fec.gov/finance/disclosure/metadata/indiv_header_file.csv>.
pub const FIELD_NAMES: [&str; 21] = [
    "CMTE_ID",
    "AMNDT_IND",
    "RPT_TP",
    "TRANSACTION_PGI",
    "IMAGE_NUM",
    "TRANSACTION_TP",
    "ENTITY_TP",
    "NAME",
    "CITY",
    "STATE",
    "ZIP_CODE",
    "EMPLOYER",
    "OCCUPATION",
    "TRANSACTION_DT",
    "TRANSACTION_AMT",
    "OTHER_ID",
    "TRAN_ID",
    "FILE_NUM",
    "MEMO_CD",
    "MEMO_TEXT",
    "SUB_ID",
];

pub const CMTE_ID: usize = 0;
pub const ZIP_CODE: usize = 10;
pub const TRANSACTION_DT: usize = 13;
pub const TRANSACTION_AMT: usize = 14;
pub const OTHER_ID: usize = 15;

/// The columns the pipeline consumes from one input line, still unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the input stream.
    pub line: u64,
    pub cmte_id: String,
    pub zip_code: String,
    pub transaction_dt: String,
    pub transaction_amt: String,
    pub other_id: String,
}

impl RawRow {
    /// Extracts the consumed columns from a raw record.
    ///
    /// Fields are decoded lossily so stray non-UTF-8 bytes cannot abort a run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedRow`] if the record does not have
    /// exactly [`FIELD_NAMES`]`.len()` fields.
    pub fn from_record(record: &ByteRecord) -> Result<Self> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != FIELD_NAMES.len() {
            return Err(PipelineError::MalformedRow {
                line,
                found: record.len(),
                expected: FIELD_NAMES.len(),
            });
        }

        let field = |index: usize| -> String {
            let bytes = record.get(index).unwrap_or_default();
            String::from_utf8_lossy(bytes).into_owned()
        };

        Ok(RawRow {
            line,
            cmte_id: field(CMTE_ID),
            zip_code: field(ZIP_CODE),
            transaction_dt: field(TRANSACTION_DT),
            transaction_amt: field(TRANSACTION_AMT),
            other_id: field(OTHER_ID),
        })
    }
}

/// Builds a reader for headerless, unquoted, `|`-delimited input.
///
/// The reader is flexible so that field-count checks happen in
/// [`RawRow::from_record`] with a line-specific error.
pub fn pipe_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(rdr)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "C00629618|N|TER|P|201701230300133512|15C|IND|PEREZ, JOHN A|LOS ANGELES|CA|90017|PRINCIPAL|DOUBLE NICKEL ADVISORS|01032017|40|H6CA34245|SA01251735122|1141239|||2012520171368850783\n";

    fn rows(input: &[u8]) -> Vec<Result<RawRow>> {
        let mut rdr = pipe_reader(input);
        rdr.byte_records()
            .map(|r| RawRow::from_record(&r.unwrap()))
            .collect()
    }

    #[test]
    fn test_column_indexes_match_names() {
        assert_eq!(FIELD_NAMES[CMTE_ID], "CMTE_ID");
        assert_eq!(FIELD_NAMES[ZIP_CODE], "ZIP_CODE");
        assert_eq!(FIELD_NAMES[TRANSACTION_DT], "TRANSACTION_DT");
        assert_eq!(FIELD_NAMES[TRANSACTION_AMT], "TRANSACTION_AMT");
        assert_eq!(FIELD_NAMES[OTHER_ID], "OTHER_ID");
    }

    #[test]
    fn test_parse_valid_row() {
        let parsed = rows(ROW.as_bytes());
        assert_eq!(parsed.len(), 1);
        let row = parsed.into_iter().next().unwrap().unwrap();

        assert_eq!(row.line, 1);
        assert_eq!(row.cmte_id, "C00629618");
        assert_eq!(row.zip_code, "90017");
        assert_eq!(row.transaction_dt, "01032017");
        assert_eq!(row.transaction_amt, "40");
        assert_eq!(row.other_id, "H6CA34245");
    }

    #[test]
    fn test_quotes_are_literal() {
        let input = ROW.replace("PEREZ, JOHN A", "\"PEREZ|JOHN\"");
        let parsed = rows(input.as_bytes());
        // The quoted pipe still splits, so the row gains a field
        assert!(matches!(
            parsed[0],
            Err(PipelineError::MalformedRow {
                found: 22,
                expected: 21,
                ..
            })
        ));
    }

    #[test]
    fn test_short_row_reports_line() {
        let input = format!("{ROW}C001|N|TER\n");
        let parsed = rows(input.as_bytes());
        assert!(parsed[0].is_ok());
        match &parsed[1] {
            Err(PipelineError::MalformedRow { line, found, .. }) => {
                assert_eq!(*line, 2);
                assert_eq!(*found, 3);
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_in_unused_column() {
        let mut input = ROW.as_bytes().to_vec();
        // Latin-1 e-acute inside NAME
        let pos = ROW.find("PEREZ").unwrap() + 1;
        input[pos] = 0xE9;
        let parsed = rows(&input);
        assert_eq!(parsed[0].as_ref().unwrap().cmte_id, "C00629618");
    }
}
