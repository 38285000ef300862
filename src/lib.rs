//! Immune Cell Frequency Analysis Library
//!
//! This library turns raw immune-cell counts into relative frequencies and
//! compares them between treatment responders and non-responders.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Population, Sample, SampleSet, reports)
//! - **normalize**: Relative frequencies per sample
//! - **filter**: Cohort selection by clinical criteria
//! - **partition**: Responder / non-responder grouping
//! - **test**: Hypothesis testing (Mann-Whitney U)
//! - **profile**: Descriptive statistics (median, quartiles, whiskers)
//! - **report**: Assembly of per-population results
//! - **pipeline**: Pipeline composition and execution
//!
//! # Example
//!
//! ```no_run
//! use cellfreq::prelude::*;
//!
//! // Load data
//! let samples = SampleSet::from_csv("cell-count.csv", DEFAULT_DELIMITER).unwrap();
//!
//! // Compare responders and non-responders
//! let output = Pipeline::new()
//!     .name("melanoma-tr1")
//!     .condition("melanoma")
//!     .sample_type("PBMC")
//!     .treatment("tr1")
//!     .run(&samples)
//!     .unwrap();
//!
//! println!("{}", output.report);
//! ```

pub mod data;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        ComparisonContext, PValueMethod, Population, Response, Sample, SampleSet,
        SignificanceReport, SignificanceResult, DEFAULT_DELIMITER, SIGNIFICANCE_ALPHA,
    };
    pub use crate::error::{CellFreqError, Result};
    pub use crate::filter::{filter_cohort, Cohort, CohortCriteria};
    pub use crate::normalize::{
        compute_frequencies, norm_frequencies, FrequencyLayout, FrequencyTable, SampleFrequencies,
    };
    pub use crate::partition::{partition_by_response, ResponseGroups, MIN_GROUP_SIZE};
    pub use crate::pipeline::{run_analysis, AnalysisConfig, Pipeline, PipelineOutput, Stage};
    pub use crate::profile::{profile_distribution, DistributionSummary};
    pub use crate::report::summarize;
    pub use crate::test::{
        test_mann_whitney, test_population, test_populations, MannWhitneyResult,
    };
}
