//! Per-population responder vs non-responder comparison.

use crate::data::{Population, Response, SignificanceResult};
use crate::error::{CellFreqError, Result};
use crate::normalize::FrequencyTable;
use crate::partition::ResponseGroups;
use crate::profile::profile_distribution;
use crate::test::mann_whitney::test_mann_whitney;
use tracing::debug;

/// Compare one population's frequencies between the two outcome groups.
///
/// Summaries are computed for both groups, then a two-sided Mann-Whitney U
/// test is run with responders as the first group.
pub fn test_population(
    population: Population,
    responders: &[f64],
    non_responders: &[f64],
) -> Result<SignificanceResult> {
    let mw = test_mann_whitney(responders, non_responders).map_err(|e| match e {
        CellFreqError::InsufficientData {
            group,
            actual,
            required,
        } => CellFreqError::InsufficientData {
            group: format!(
                "{} ({})",
                if group == "first" {
                    Response::Responder.name()
                } else {
                    Response::NonResponder.name()
                },
                population
            ),
            actual,
            required,
        },
        other => other,
    })?;

    debug!(
        population = population.name(),
        u = mw.u_statistic,
        p = mw.p_value,
        method = mw.method.name(),
        "compared population"
    );

    Ok(SignificanceResult::new(
        population,
        profile_distribution(responders),
        profile_distribution(non_responders),
        mw.u_statistic,
        mw.p_value,
        mw.effect_size,
        mw.method,
    ))
}

/// Compare every population between the partitioned groups.
///
/// Frequencies are looked up in `table` by sample id, so the table must
/// cover every partitioned sample. Results follow [`Population::ALL`] order.
pub fn test_populations(
    table: &FrequencyTable,
    groups: &ResponseGroups<'_>,
) -> Result<Vec<SignificanceResult>> {
    let responder_ids = groups.sample_ids(Response::Responder);
    let non_responder_ids = groups.sample_ids(Response::NonResponder);

    Population::ALL
        .iter()
        .map(|&population| {
            let responders =
                table.population_values(population, responder_ids.iter().copied())?;
            let non_responders =
                table.population_values(population, non_responder_ids.iter().copied())?;
            test_population(population, &responders, &non_responders)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PValueMethod, Sample};
    use crate::filter::{filter_cohort, CohortCriteria};
    use crate::normalize::norm_frequencies;
    use crate::partition::partition_by_response;
    use approx::assert_relative_eq;

    fn sample(id: &str, counts: [u64; 5], response: Response) -> Sample {
        Sample {
            sample_id: id.to_string(),
            project_id: "prj1".to_string(),
            subject_id: format!("sbj_{}", id),
            condition: "melanoma".to_string(),
            treatment: Some("tr1".to_string()),
            response: Some(response),
            sample_type: "PBMC".to_string(),
            days_since_start: 0,
            counts,
        }
    }

    #[test]
    fn test_population_separated() {
        let r = test_population(
            Population::BCell,
            &[0.30, 0.35, 0.40, 0.45],
            &[0.10, 0.15, 0.12, 0.18],
        )
        .unwrap();

        assert_eq!(r.population, Population::BCell);
        assert!(r.significant);
        assert_eq!(r.method, PValueMethod::Exact);
        assert_relative_eq!(r.responders.median, 0.375, epsilon = 1e-12);
        assert_relative_eq!(r.non_responders.median, 0.135, epsilon = 1e-12);
        assert_eq!(r.responders.n, 4);
    }

    #[test]
    fn test_population_identical() {
        let r = test_population(Population::Monocyte, &[0.2, 0.2, 0.2], &[0.2, 0.2, 0.2]).unwrap();
        assert!(!r.significant);
        assert_relative_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_population_insufficient_names_group() {
        let err = test_population(Population::NkCell, &[0.2, 0.3], &[0.1]).unwrap_err();
        match err {
            CellFreqError::InsufficientData { group, actual, .. } => {
                assert_eq!(group, "non_responder (nk_cell)");
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_populations_all_covered() {
        let samples = vec![
            sample("r1", [40, 10, 20, 10, 20], Response::Responder),
            sample("r2", [45, 10, 15, 10, 20], Response::Responder),
            sample("r3", [50, 10, 10, 10, 20], Response::Responder),
            sample("n1", [10, 20, 30, 20, 20], Response::NonResponder),
            sample("n2", [12, 20, 28, 20, 20], Response::NonResponder),
            sample("n3", [14, 20, 26, 20, 20], Response::NonResponder),
        ];
        let table = norm_frequencies(&samples).unwrap();
        let cohort = filter_cohort(&samples, &CohortCriteria::any());
        let groups = partition_by_response(&cohort).unwrap();

        let results = test_populations(&table, &groups).unwrap();
        assert_eq!(results.len(), Population::COUNT);
        for (result, population) in results.iter().zip(Population::ALL.iter()) {
            assert_eq!(result.population, *population);
            assert_eq!(result.responders.n, 3);
            assert_eq!(result.non_responders.n, 3);
        }

        let b_cell = &results[Population::BCell.index()];
        assert_relative_eq!(b_cell.statistic, 9.0);
        assert_relative_eq!(b_cell.effect_size, 1.0);

        let monocyte = &results[Population::Monocyte.index()];
        assert_eq!(monocyte.method, PValueMethod::Constant);
        assert!(!monocyte.significant);
    }

    #[test]
    fn test_populations_missing_from_table() {
        let samples = vec![
            sample("r1", [40, 10, 20, 10, 20], Response::Responder),
            sample("r2", [45, 10, 15, 10, 20], Response::Responder),
            sample("n1", [10, 20, 30, 20, 20], Response::NonResponder),
            sample("n2", [12, 20, 28, 20, 20], Response::NonResponder),
        ];
        let table = norm_frequencies(&samples[..3]).unwrap();
        let cohort = filter_cohort(&samples, &CohortCriteria::any());
        let groups = partition_by_response(&cohort).unwrap();

        assert!(matches!(
            test_populations(&table, &groups),
            Err(CellFreqError::InvalidParameter(_))
        ));
    }
}
