//! Partition a cohort into responders and non-responders.

use crate::data::{Response, Sample};
use crate::error::{CellFreqError, Result};
use crate::filter::Cohort;
use tracing::{debug, warn};

/// Minimum number of samples each outcome group needs for a comparison.
pub const MIN_GROUP_SIZE: usize = 2;

/// Two disjoint outcome groups drawn from one cohort.
#[derive(Debug, Clone)]
pub struct ResponseGroups<'a> {
    responders: Vec<&'a Sample>,
    non_responders: Vec<&'a Sample>,
    n_untreated: usize,
    n_missing_response: usize,
}

impl<'a> ResponseGroups<'a> {
    /// Samples of one outcome group, in cohort order.
    pub fn group(&self, response: Response) -> &[&'a Sample] {
        match response {
            Response::Responder => &self.responders,
            Response::NonResponder => &self.non_responders,
        }
    }

    /// Responder samples.
    pub fn responders(&self) -> &[&'a Sample] {
        &self.responders
    }

    /// Non-responder samples.
    pub fn non_responders(&self) -> &[&'a Sample] {
        &self.non_responders
    }

    /// Sample ids of one outcome group.
    pub fn sample_ids(&self, response: Response) -> Vec<&'a str> {
        self.group(response)
            .iter()
            .map(|s| s.sample_id.as_str())
            .collect()
    }

    /// Cohort samples left out because they had no treatment.
    pub fn n_untreated(&self) -> usize {
        self.n_untreated
    }

    /// Treated cohort samples left out because their outcome was not recorded.
    pub fn n_missing_response(&self) -> usize {
        self.n_missing_response
    }

    /// All cohort samples that ended up in neither group.
    pub fn n_excluded(&self) -> usize {
        self.n_untreated + self.n_missing_response
    }
}

/// Split a cohort by outcome flag.
///
/// Untreated samples, and treated samples without a recorded outcome, are
/// excluded from both groups.
///
/// # Errors
/// `InsufficientData` if either group ends up with fewer than
/// [`MIN_GROUP_SIZE`] samples.
pub fn partition_by_response<'a>(cohort: &Cohort<'a>) -> Result<ResponseGroups<'a>> {
    let mut responders = Vec::new();
    let mut non_responders = Vec::new();
    let mut n_untreated = 0;
    let mut n_missing_response = 0;

    for sample in cohort.iter() {
        if !sample.is_treated() {
            n_untreated += 1;
            continue;
        }
        match sample.response {
            Some(Response::Responder) => responders.push(sample),
            Some(Response::NonResponder) => non_responders.push(sample),
            None => n_missing_response += 1,
        }
    }

    if n_untreated > 0 {
        debug!(n_untreated, "excluded untreated samples from partition");
    }
    if n_missing_response > 0 {
        warn!(
            n_missing_response,
            "treated samples without a response flag were excluded"
        );
    }

    for (response, group) in [
        (Response::Responder, &responders),
        (Response::NonResponder, &non_responders),
    ] {
        if group.len() < MIN_GROUP_SIZE {
            return Err(CellFreqError::InsufficientData {
                group: response.name().to_string(),
                actual: group.len(),
                required: MIN_GROUP_SIZE,
            });
        }
    }

    Ok(ResponseGroups {
        responders,
        non_responders,
        n_untreated,
        n_missing_response,
    })
}
