//! Relative population frequencies.
//!
//! Each sample's counts are divided by that sample's total, so the
//! frequencies of one sample sum to 1. Samples are normalized independently;
//! a sample with a zero total cannot be normalized and aborts the batch.

use crate::data::{Population, Sample};
use crate::error::{CellFreqError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Tolerance for the per-sample sum-to-one check.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Relative frequencies of a single sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFrequencies {
    /// Sample identifier.
    pub sample_id: String,
    /// Total count across all populations.
    pub total_count: u64,
    /// Raw counts in [`Population::ALL`] order.
    pub counts: [u64; Population::COUNT],
    /// Frequencies in [`Population::ALL`] order, each in [0, 1].
    pub frequencies: [f64; Population::COUNT],
}

impl SampleFrequencies {
    /// Frequency of one population.
    #[inline]
    pub fn get(&self, population: Population) -> f64 {
        self.frequencies[population.index()]
    }

    /// Frequency of one population as a percentage.
    pub fn percentage(&self, population: Population) -> f64 {
        self.get(population) * 100.0
    }

    /// Sum of all frequencies.
    pub fn sum(&self) -> f64 {
        self.frequencies.iter().sum()
    }
}

/// Compute the relative frequencies of one sample.
///
/// # Errors
/// - `ZeroTotal` when the sample has no counts in any population
/// - `InvalidParameter` when the total count overflows
pub fn compute_frequencies(sample: &Sample) -> Result<SampleFrequencies> {
    let total_count = sample.total_count().ok_or_else(|| {
        CellFreqError::InvalidParameter(format!(
            "Total count of sample '{}' overflows",
            sample.sample_id
        ))
    })?;
    if total_count == 0 {
        return Err(CellFreqError::ZeroTotal {
            sample_id: sample.sample_id.clone(),
        });
    }

    let total = total_count as f64;
    let mut frequencies = [0.0; Population::COUNT];
    for (f, &c) in frequencies.iter_mut().zip(sample.counts.iter()) {
        *f = c as f64 / total;
    }

    Ok(SampleFrequencies {
        sample_id: sample.sample_id.clone(),
        total_count,
        counts: sample.counts,
        frequencies,
    })
}

/// Output layout for frequency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyLayout {
    /// One row per sample, one column per population.
    #[default]
    Wide,
    /// One row per (sample, population) with count and percentage.
    Long,
}

/// Relative frequencies for a batch of samples.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    /// Frequencies (populations × samples).
    data: DMatrix<f64>,
    /// Raw counts (populations × samples).
    counts: DMatrix<u64>,
    sample_ids: Vec<String>,
    totals: Vec<u64>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Check if the table holds no samples.
    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }

    /// Sample identifiers in input order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Total counts per sample.
    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    /// Frequency for a sample (by column) and population.
    #[inline]
    pub fn get(&self, sample: usize, population: Population) -> f64 {
        self.data[(population.index(), sample)]
    }

    /// Frequency for a sample (by id) and population.
    pub fn frequency(&self, sample_id: &str, population: Population) -> Option<f64> {
        self.index.get(sample_id).map(|&j| self.get(j, population))
    }

    /// Reference to the underlying matrix (populations × samples).
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Per-sample record for column `sample`.
    pub fn record(&self, sample: usize) -> SampleFrequencies {
        let mut counts = [0u64; Population::COUNT];
        let mut frequencies = [0.0; Population::COUNT];
        for p in Population::ALL {
            counts[p.index()] = self.counts[(p.index(), sample)];
            frequencies[p.index()] = self.data[(p.index(), sample)];
        }
        SampleFrequencies {
            sample_id: self.sample_ids[sample].clone(),
            total_count: self.totals[sample],
            counts,
            frequencies,
        }
    }

    /// Iterate over per-sample records in input order.
    pub fn records(&self) -> impl Iterator<Item = SampleFrequencies> + '_ {
        (0..self.n_samples()).map(move |j| self.record(j))
    }

    /// Frequencies of one population for the given samples, in the given order.
    ///
    /// # Errors
    /// `InvalidParameter` if a sample id is not in the table.
    pub fn population_values<'a, I>(
        &self,
        population: Population,
        sample_ids: I,
    ) -> Result<Vec<f64>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        sample_ids
            .into_iter()
            .map(|id| {
                self.frequency(id, population).ok_or_else(|| {
                    CellFreqError::InvalidParameter(format!(
                        "Sample '{}' has no computed frequencies",
                        id
                    ))
                })
            })
            .collect()
    }

    /// Write the table in the requested layout.
    pub fn write<W: Write>(
        &self,
        writer: W,
        delimiter: u8,
        layout: FrequencyLayout,
    ) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        match layout {
            FrequencyLayout::Wide => {
                let mut header = vec!["sample".to_string()];
                header.extend(Population::ALL.iter().map(|p| p.name().to_string()));
                wtr.write_record(&header)?;
                for j in 0..self.n_samples() {
                    let mut row = vec![self.sample_ids[j].clone()];
                    row.extend(Population::ALL.iter().map(|&p| self.get(j, p).to_string()));
                    wtr.write_record(&row)?;
                }
            }
            FrequencyLayout::Long => {
                wtr.write_record(["sample", "total_count", "population", "count", "percentage"])?;
                for record in self.records() {
                    for p in Population::ALL {
                        wtr.write_record(&[
                            record.sample_id.clone(),
                            record.total_count.to_string(),
                            p.name().to_string(),
                            record.counts[p.index()].to_string(),
                            format!("{:.2}", record.percentage(p)),
                        ])?;
                    }
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a file.
    pub fn to_csv<P: AsRef<Path>>(
        &self,
        path: P,
        delimiter: u8,
        layout: FrequencyLayout,
    ) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file), delimiter, layout)
    }
}

/// Compute relative frequencies for every sample in a batch.
///
/// Each sample is normalized on its own; output order follows input order.
///
/// # Errors
/// `ZeroTotal` for the first sample whose total count is zero.
pub fn norm_frequencies<'a, I>(samples: I) -> Result<FrequencyTable>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let records = samples
        .into_iter()
        .map(compute_frequencies)
        .collect::<Result<Vec<_>>>()?;

    let n_samples = records.len();
    let data = DMatrix::from_fn(Population::COUNT, n_samples, |i, j| {
        records[j].frequencies[i]
    });
    let counts = DMatrix::from_fn(Population::COUNT, n_samples, |i, j| records[j].counts[i]);

    let totals = records.iter().map(|r| r.total_count).collect();
    let sample_ids: Vec<String> = records.into_iter().map(|r| r.sample_id).collect();
    let index = sample_ids
        .iter()
        .enumerate()
        .map(|(j, id)| (id.clone(), j))
        .collect();

    Ok(FrequencyTable {
        data,
        counts,
        sample_ids,
        totals,
        index,
    })
}
