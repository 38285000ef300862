//! Summary assembly.
//!
//! Turns the per-population results of one comparison into a
//! [`SignificanceReport`] ordered by population name, so the same inputs
//! always produce the same report.

use crate::data::{
    ComparisonContext, Population, SignificanceReport, SignificanceResult, SIGNIFICANCE_ALPHA,
};
use crate::error::{CellFreqError, Result};

/// Assemble a report from one result per population.
///
/// # Errors
/// `InvalidParameter` if a population is missing or reported twice.
pub fn summarize(
    mut results: Vec<SignificanceResult>,
    context: ComparisonContext,
) -> Result<SignificanceReport> {
    let mut seen = [0usize; Population::COUNT];
    for r in &results {
        seen[r.population.index()] += 1;
    }
    for population in Population::ALL {
        match seen[population.index()] {
            1 => {}
            0 => {
                return Err(CellFreqError::InvalidParameter(format!(
                    "No result for population '{}'",
                    population
                )))
            }
            n => {
                return Err(CellFreqError::InvalidParameter(format!(
                    "Population '{}' reported {} times",
                    population, n
                )))
            }
        }
    }

    results.sort_by(|a, b| a.population.name().cmp(b.population.name()));

    Ok(SignificanceReport {
        context,
        alpha: SIGNIFICANCE_ALPHA,
        results,
    })
}
