//! Sample filtering.

pub mod cohort;

pub use cohort::{filter_cohort, Cohort, CohortCriteria};
