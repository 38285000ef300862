//! Result types for responder vs non-responder comparisons.

use crate::data::Population;
use crate::error::Result;
use crate::filter::CohortCriteria;
use crate::profile::DistributionSummary;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// P-value threshold below which a population is flagged significant.
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;

/// How a rank test p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    /// Exact null distribution of U (no ties, small samples).
    Exact,
    /// Normal approximation with tie and continuity correction.
    Normal,
    /// Every value identical across both groups; p fixed at 1.
    Constant,
}

impl PValueMethod {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normal => "normal",
            Self::Constant => "constant",
        }
    }
}

/// Comparison of one population between responders and non-responders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// Population tested.
    pub population: Population,
    /// Descriptive statistics of responder frequencies.
    pub responders: DistributionSummary,
    /// Descriptive statistics of non-responder frequencies.
    pub non_responders: DistributionSummary,
    /// Mann-Whitney U of the responder group.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Rank-biserial correlation; positive when responders rank higher.
    pub effect_size: f64,
    /// How the p-value was computed.
    pub method: PValueMethod,
    /// Whether `p_value < SIGNIFICANCE_ALPHA`.
    pub significant: bool,
}

impl SignificanceResult {
    /// Create a result; the significance flag is derived from the p-value.
    pub fn new(
        population: Population,
        responders: DistributionSummary,
        non_responders: DistributionSummary,
        statistic: f64,
        p_value: f64,
        effect_size: f64,
        method: PValueMethod,
    ) -> Self {
        Self {
            population,
            responders,
            non_responders,
            statistic,
            p_value,
            effect_size,
            method,
            significant: p_value < SIGNIFICANCE_ALPHA,
        }
    }
}

/// Cohort bookkeeping carried alongside the per-population results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonContext {
    /// Analysis name.
    pub name: String,
    /// Criteria that selected the cohort.
    pub criteria: CohortCriteria,
    /// Samples in the cohort.
    pub n_cohort: usize,
    /// Samples in the responder group.
    pub n_responders: usize,
    /// Samples in the non-responder group.
    pub n_non_responders: usize,
    /// Cohort samples in neither group.
    pub n_excluded: usize,
}

/// Per-population significance report for one cohort comparison.
///
/// Results are ordered by population name. This is the hand-off artifact for
/// plotting and reporting tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignificanceReport {
    /// Cohort bookkeeping.
    #[serde(flatten)]
    pub context: ComparisonContext,
    /// Significance threshold applied.
    pub alpha: f64,
    /// One result per population.
    pub results: Vec<SignificanceResult>,
}

const TABLE_HEADER: [&str; 16] = [
    "population",
    "responder_median",
    "responder_q1",
    "responder_q3",
    "responder_n",
    "non_responder_median",
    "non_responder_q1",
    "non_responder_q3",
    "non_responder_n",
    "statistic",
    "p_value",
    "significant",
    "effect_size",
    "method",
    "responder_mean",
    "non_responder_mean",
];

impl SignificanceReport {
    /// Number of populations reported.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for one population.
    pub fn get(&self, population: Population) -> Option<&SignificanceResult> {
        self.results.iter().find(|r| r.population == population)
    }

    /// Populations flagged significant.
    pub fn significant(&self) -> Vec<&SignificanceResult> {
        self.results.iter().filter(|r| r.significant).collect()
    }

    /// Iterate over results.
    pub fn iter(&self) -> impl Iterator<Item = &SignificanceResult> {
        self.results.iter()
    }

    /// Write one row per population as a delimited table.
    pub fn write_table<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        wtr.write_record(TABLE_HEADER)?;
        for r in &self.results {
            wtr.write_record(&[
                r.population.name().to_string(),
                format!("{:.6}", r.responders.median),
                format!("{:.6}", r.responders.q1),
                format!("{:.6}", r.responders.q3),
                r.responders.n.to_string(),
                format!("{:.6}", r.non_responders.median),
                format!("{:.6}", r.non_responders.q1),
                format!("{:.6}", r.non_responders.q3),
                r.non_responders.n.to_string(),
                format!("{:.4}", r.statistic),
                format!("{:.6e}", r.p_value),
                r.significant.to_string(),
                format!("{:.4}", r.effect_size),
                r.method.name().to_string(),
                format!("{:.6}", r.responders.mean),
                format!("{:.6}", r.non_responders.mean),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_table(BufWriter::new(file), b'\t')
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for SignificanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Analysis: {}", self.context.name)?;
        writeln!(f, "Cohort: {} ({} samples)", self.context.criteria, self.context.n_cohort)?;
        writeln!(
            f,
            "Responders: {}  Non-responders: {}  Excluded: {}",
            self.context.n_responders, self.context.n_non_responders, self.context.n_excluded
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<12} {:>10} {:>10} {:>8} {:>10}  {}",
            "Population", "Resp.med", "Non.med", "U", "p-value", "Significant"
        )?;
        for r in &self.results {
            writeln!(
                f,
                "{:<12} {:>10.4} {:>10.4} {:>8.1} {:>10.4}  {}",
                r.population.name(),
                r.responders.median,
                r.non_responders.median,
                r.statistic,
                r.p_value,
                if r.significant { "yes" } else { "no" }
            )?;
        }
        writeln!(f)?;
        let significant: Vec<&str> = self
            .significant()
            .iter()
            .map(|r| r.population.name())
            .collect();
        if significant.is_empty() {
            writeln!(f, "No population differs at p < {}", self.alpha)?;
        } else {
            writeln!(f, "Significant at p < {}: {}", self.alpha, significant.join(", "))?;
        }
        Ok(())
    }
}
