//! Normalization of raw counts into relative frequencies.

pub mod frequency;

pub use frequency::{
    compute_frequencies, norm_frequencies, FrequencyLayout, FrequencyTable, SampleFrequencies,
    SUM_TOLERANCE,
};
