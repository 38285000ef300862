//! Pipeline composition and execution for cohort comparisons.

mod runner;

pub use runner::{run_analysis, AnalysisConfig, Pipeline, PipelineOutput, Stage};
