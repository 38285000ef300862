//! Assembly of per-population results into a report.

pub mod assemble;

pub use assemble::summarize;
