//! Data structures for cell population analysis.

mod population;
mod result;
mod sample;

pub use population::Population;
pub use result::{
    ComparisonContext, PValueMethod, SignificanceReport, SignificanceResult, SIGNIFICANCE_ALPHA,
};
pub use sample::{Response, Sample, SampleSet, DEFAULT_DELIMITER};
