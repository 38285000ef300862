//! Descriptive profiling of frequency distributions.

pub mod distribution;

pub use distribution::{profile_distribution, quantile_sorted, DistributionSummary};
