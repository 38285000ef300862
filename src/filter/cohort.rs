//! Cohort selection by clinical criteria.

use crate::data::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical criteria for selecting a cohort.
///
/// Every field is optional; an unset field matches all samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

impl CohortCriteria {
    /// Criteria matching every sample.
    pub fn any() -> Self {
        Self::default()
    }

    /// Require a condition.
    pub fn condition(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_string());
        self
    }

    /// Require a sample type.
    pub fn sample_type(mut self, sample_type: &str) -> Self {
        self.sample_type = Some(sample_type.to_string());
        self
    }

    /// Require a number of days since treatment start.
    pub fn days_since_start(mut self, days: u32) -> Self {
        self.days_since_start = Some(days);
        self
    }

    /// Require a treatment label.
    pub fn treatment(mut self, treatment: &str) -> Self {
        self.treatment = Some(treatment.to_string());
        self
    }

    /// Whether no criterion is set.
    pub fn is_wildcard(&self) -> bool {
        self == &Self::default()
    }

    /// Check whether a sample satisfies every specified criterion.
    pub fn matches(&self, sample: &Sample) -> bool {
        self.condition
            .as_deref()
            .map_or(true, |c| sample.condition == c)
            && self
                .sample_type
                .as_deref()
                .map_or(true, |t| sample.sample_type == t)
            && self
                .days_since_start
                .map_or(true, |d| sample.days_since_start == d)
            && self
                .treatment
                .as_deref()
                .map_or(true, |t| sample.treatment.as_deref() == Some(t))
    }
}

impl fmt::Display for CohortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(c) = &self.condition {
            parts.push(format!("condition={}", c));
        }
        if let Some(t) = &self.sample_type {
            parts.push(format!("sample_type={}", t));
        }
        if let Some(d) = self.days_since_start {
            parts.push(format!("days_since_start={}", d));
        }
        if let Some(t) = &self.treatment {
            parts.push(format!("treatment={}", t));
        }
        if parts.is_empty() {
            write!(f, "all samples")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Samples selected by a [`CohortCriteria`], borrowed from the full set.
#[derive(Debug, Clone, Default)]
pub struct Cohort<'a> {
    samples: Vec<&'a Sample>,
}

impl<'a> Cohort<'a> {
    /// Samples in their original order.
    pub fn samples(&self) -> &[&'a Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample identifiers in order.
    pub fn sample_ids(&self) -> Vec<&'a str> {
        self.samples.iter().map(|s| s.sample_id.as_str()).collect()
    }

    /// Iterate over samples.
    pub fn iter(&self) -> impl Iterator<Item = &'a Sample> + '_ {
        self.samples.iter().copied()
    }
}

impl<'a> FromIterator<&'a Sample> for Cohort<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Select the samples that satisfy all specified criteria.
///
/// Input order is preserved. No match yields an empty cohort rather than an
/// error; the input is never modified.
pub fn filter_cohort<'a, I>(samples: I, criteria: &CohortCriteria) -> Cohort<'a>
where
    I: IntoIterator<Item = &'a Sample>,
{
    samples
        .into_iter()
        .filter(|s| criteria.matches(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Response;

    fn sample(
        id: &str,
        condition: &str,
        sample_type: &str,
        days: u32,
        treatment: Option<&str>,
    ) -> Sample {
        Sample {
            sample_id: id.to_string(),
            project_id: "prj1".to_string(),
            subject_id: format!("sbj_{}", id),
            condition: condition.to_string(),
            treatment: treatment.map(String::from),
            response: treatment.map(|_| Response::Responder),
            sample_type: sample_type.to_string(),
            days_since_start: days,
            counts: [1, 1, 1, 1, 1],
        }
    }

    fn universe() -> Vec<Sample> {
        vec![
            sample("s01", "melanoma", "PBMC", 0, Some("tr1")),
            sample("s02", "melanoma", "WB", 0, Some("tr1")),
            sample("s03", "carcinoma", "PBMC", 0, Some("tr1")),
            sample("s04", "melanoma", "PBMC", 7, Some("tr1")),
            sample("s05", "melanoma", "PBMC", 0, Some("tr1")),
            sample("s06", "healthy", "PBMC", 0, None),
            sample("s07", "melanoma", "PBMC", 0, Some("tr2")),
            sample("s08", "melanoma", "PBMC", 14, Some("tr1")),
            sample("s09", "melanoma", "PBMC", 0, Some("tr1")),
            sample("s10", "melanoma", "PBMC", 0, None),
        ]
    }

    #[test]
    fn test_filter_all_criteria() {
        let samples = universe();
        let criteria = CohortCriteria::any()
            .condition("melanoma")
            .sample_type("PBMC")
            .days_since_start(0)
            .treatment("tr1");

        let cohort = filter_cohort(&samples, &criteria);
        assert_eq!(cohort.sample_ids(), vec!["s01", "s05", "s09"]);
    }

    #[test]
    fn test_unspecified_criteria_are_wildcards() {
        let samples = universe();

        let all = filter_cohort(&samples, &CohortCriteria::any());
        assert_eq!(all.len(), samples.len());

        let pbmc = filter_cohort(&samples, &CohortCriteria::any().sample_type("PBMC"));
        assert_eq!(pbmc.len(), 9);

        let day7 = filter_cohort(&samples, &CohortCriteria::any().days_since_start(7));
        assert_eq!(day7.sample_ids(), vec!["s04"]);
    }

    #[test]
    fn test_treatment_criterion_skips_untreated() {
        let samples = universe();
        let cohort = filter_cohort(&samples, &CohortCriteria::any().treatment("tr2"));
        assert_eq!(cohort.sample_ids(), vec!["s07"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let samples = universe();
        let cohort = filter_cohort(&samples, &CohortCriteria::any().condition("lupus"));
        assert!(cohort.is_empty());
    }

    #[test]
    fn test_subset_and_idempotent() {
        let samples = universe();
        let criteria = CohortCriteria::any().condition("melanoma").treatment("tr1");

        let once = filter_cohort(&samples, &criteria);
        let twice = filter_cohort(once.iter(), &criteria);

        assert_eq!(once.sample_ids(), twice.sample_ids());
        for id in once.sample_ids() {
            assert!(samples.iter().any(|s| s.sample_id == id));
        }
        assert_eq!(samples.len(), 10);
    }

    #[test]
    fn test_criteria_display_and_yaml() {
        let criteria = CohortCriteria::any().condition("melanoma").days_since_start(0);
        assert_eq!(criteria.to_string(), "condition=melanoma, days_since_start=0");
        assert_eq!(CohortCriteria::any().to_string(), "all samples");

        let yaml = serde_yaml::to_string(&criteria).unwrap();
        let parsed: CohortCriteria = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, criteria);
        assert!(!parsed.is_wildcard());
    }
}
