//! Group aggregation over validated records.
//!
//! [`by_zip`] keeps a running median per (recipient, zip code) and reports
//! after every record. [`by_date`] buffers amounts per (recipient, date) and
//! computes exact medians by quickselect once the input is exhausted.

pub mod by_date;
pub mod by_zip;
pub mod running;
pub mod select;
pub mod utility;

pub use by_date::BatchGroupAggregator;
pub use by_zip::StreamingGroupAggregator;
