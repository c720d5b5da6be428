use chrono::NaiveDate;

/// A validated contribution, produced by [`crate::sanitize::sanitize`].
///
/// `zip_code` and `date` are `None` when the raw value failed validation; each
/// aggregator filters on its own key independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub recipient: String,
    pub zip_code: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: i64,
}
