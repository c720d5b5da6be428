pub mod aggregators;
pub mod error;
pub mod input;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod sanitize;
