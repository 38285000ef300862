//! Pipeline runner for cohort comparisons.
//!
//! A run is strictly linear: Normalize → Filter → Partition → Test →
//! Summarize. The first failing stage aborts the run with its typed error;
//! nothing is retried and no partial report is produced.

use crate::data::{ComparisonContext, SampleSet, SignificanceReport};
use crate::error::Result;
use crate::filter::{filter_cohort, CohortCriteria};
use crate::normalize::{norm_frequencies, FrequencyTable};
use crate::partition::partition_by_response;
use crate::report::summarize;
use crate::test::test_populations;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// A stage of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Filter,
    Partition,
    Test,
    Summarize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normalize => "normalize",
            Self::Filter => "filter",
            Self::Partition => "partition",
            Self::Test => "test",
            Self::Summarize => "summarize",
        };
        write!(f, "{}", name)
    }
}

/// Stored analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cohort selection.
    #[serde(default)]
    pub criteria: CohortCriteria,
}

impl AnalysisConfig {
    /// Melanoma PBMC samples on treatment `tr1`, at any time point.
    pub fn default_melanoma_tr1() -> Self {
        Self {
            name: "melanoma-tr1".to_string(),
            description: Some(
                "Responders vs non-responders among melanoma PBMC samples on tr1".to_string(),
            ),
            criteria: CohortCriteria::any()
                .condition("melanoma")
                .sample_type("PBMC")
                .treatment("tr1"),
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Frequencies of every loaded sample.
    pub frequencies: FrequencyTable,
    /// Responder vs non-responder comparison of the cohort.
    pub report: SignificanceReport,
}

/// Builder for configuring and running a cohort comparison.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    criteria: CohortCriteria,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline over all samples.
    pub fn new() -> Self {
        Self {
            name: "unnamed".to_string(),
            criteria: CohortCriteria::any(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            name: config.name.clone(),
            criteria: config.criteria.clone(),
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Restrict the cohort to a condition.
    pub fn condition(mut self, condition: &str) -> Self {
        self.criteria = self.criteria.condition(condition);
        self
    }

    /// Restrict the cohort to a sample type.
    pub fn sample_type(mut self, sample_type: &str) -> Self {
        self.criteria = self.criteria.sample_type(sample_type);
        self
    }

    /// Restrict the cohort to one time point.
    pub fn days_since_start(mut self, days: u32) -> Self {
        self.criteria = self.criteria.days_since_start(days);
        self
    }

    /// Restrict the cohort to a treatment.
    pub fn treatment(mut self, treatment: &str) -> Self {
        self.criteria = self.criteria.treatment(treatment);
        self
    }

    /// Replace the cohort criteria.
    pub fn criteria(mut self, criteria: CohortCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Current cohort criteria.
    pub fn cohort_criteria(&self) -> &CohortCriteria {
        &self.criteria
    }

    /// Convert to a storable config.
    pub fn to_config(&self, description: Option<&str>) -> AnalysisConfig {
        AnalysisConfig {
            name: self.name.clone(),
            description: description.map(String::from),
            criteria: self.criteria.clone(),
        }
    }

    /// Run the pipeline on a loaded sample set.
    pub fn run(&self, samples: &SampleSet) -> Result<PipelineOutput> {
        info!(analysis = %self.name, samples = samples.len(), "starting analysis");

        let frequencies = stage(Stage::Normalize, || norm_frequencies(samples.iter()))?;

        let cohort = filter_cohort(samples.iter(), &self.criteria);
        info!(
            stage = %Stage::Filter,
            criteria = %self.criteria,
            selected = cohort.len(),
            "cohort selected"
        );
        if cohort.is_empty() {
            warn!(criteria = %self.criteria, "no sample matches the cohort criteria");
        }

        let groups = stage(Stage::Partition, || partition_by_response(&cohort))?;
        info!(
            stage = %Stage::Partition,
            responders = groups.responders().len(),
            non_responders = groups.non_responders().len(),
            excluded = groups.n_excluded(),
            "cohort partitioned"
        );

        let results = stage(Stage::Test, || test_populations(&frequencies, &groups))?;

        let context = ComparisonContext {
            name: self.name.clone(),
            criteria: self.criteria.clone(),
            n_cohort: cohort.len(),
            n_responders: groups.responders().len(),
            n_non_responders: groups.non_responders().len(),
            n_excluded: groups.n_excluded(),
        };
        let report = stage(Stage::Summarize, || summarize(results, context))?;
        info!(
            significant = report.significant().len(),
            populations = report.len(),
            "analysis complete"
        );

        Ok(PipelineOutput {
            frequencies,
            report,
        })
    }
}

fn stage<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| {
        warn!(stage = %stage, error = %e, "pipeline aborted");
        e
    })
}

/// Run a stored analysis on a sample set.
pub fn run_analysis(samples: &SampleSet, config: &AnalysisConfig) -> Result<PipelineOutput> {
    Pipeline::from_config(config).run(samples)
}
