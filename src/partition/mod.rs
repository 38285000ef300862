//! Outcome partitioning of cohorts.

pub mod response;

pub use response::{partition_by_response, ResponseGroups, MIN_GROUP_SIZE};
