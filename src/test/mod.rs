//! Rank-based hypothesis testing between outcome groups.

pub mod population;

pub use mann_whitney::{test_mann_whitney, MannWhitneyResult, EXACT_MAX_SAMPLES};
pub use population::{test_population, test_populations};
