//! Sample records and the validated load boundary.
//!
//! Input is a delimited table with one row per sample. Columns are located
//! by header name, so their order is free and unknown columns are ignored.
//! Every row is validated here; nothing downstream re-checks field shapes.

use crate::data::Population;
use crate::error::{CellFreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Default field delimiter for sample tables.
pub const DEFAULT_DELIMITER: u8 = b',';

const SAMPLE_HEADER: &str = "sample";
const PROJECT_HEADER: &str = "project";
const SUBJECT_HEADER: &str = "subject";
const CONDITION_HEADER: &str = "condition";
const TREATMENT_HEADER: &str = "treatment";
const RESPONSE_HEADER: &str = "response";
const SAMPLE_TYPE_HEADER: &str = "sample_type";
const DAYS_HEADERS: [&str; 2] = ["time_from_treatment_start", "days_since_start"];

/// Treatment outcome of a treated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Responder,
    NonResponder,
}

impl Response {
    /// Parse a response flag. Empty text means the flag is absent.
    pub fn parse_flag(raw: &str) -> std::result::Result<Option<Self>, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "y" | "yes" | "true" | "1" => Ok(Some(Self::Responder)),
            "n" | "no" | "false" | "0" => Ok(Some(Self::NonResponder)),
            other => Err(format!("expected y/n response flag, got '{}'", other)),
        }
    }

    /// Descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Responder => "responder",
            Self::NonResponder => "non_responder",
        }
    }
}

/// One biological specimen: clinical attributes plus raw population counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique sample identifier.
    pub sample_id: String,
    /// Project the sample belongs to.
    pub project_id: String,
    /// Subject the sample was taken from.
    pub subject_id: String,
    /// Clinical condition (e.g. "melanoma").
    pub condition: String,
    /// Treatment label, absent for untreated subjects.
    pub treatment: Option<String>,
    /// Outcome flag; only meaningful when a treatment is present.
    pub response: Option<Response>,
    /// Specimen type (e.g. "PBMC").
    pub sample_type: String,
    /// Days since treatment start.
    pub days_since_start: u32,
    /// Raw counts in [`Population::ALL`] order.
    pub counts: [u64; Population::COUNT],
}

impl Sample {
    /// Raw count for one population.
    #[inline]
    pub fn count(&self, population: Population) -> u64 {
        self.counts[population.index()]
    }

    /// Sum of all population counts, or `None` if it does not fit in a `u64`.
    pub fn total_count(&self) -> Option<u64> {
        self.counts
            .iter()
            .try_fold(0u64, |acc, &c| acc.checked_add(c))
    }

    /// Whether the subject received a treatment.
    pub fn is_treated(&self) -> bool {
        self.treatment.is_some()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.sample_id.trim().is_empty() {
            return Err("sample id must not be empty".to_string());
        }
        if self.response.is_some() && self.treatment.is_none() {
            return Err(format!(
                "sample '{}' has a response flag but no treatment",
                self.sample_id
            ));
        }
        if self.total_count().is_none() {
            return Err(format!(
                "total count of sample '{}' overflows",
                self.sample_id
            ));
        }
        Ok(())
    }
}

/// Column positions resolved from a header row.
struct ColumnIndex {
    sample: usize,
    project: usize,
    subject: usize,
    condition: usize,
    treatment: usize,
    response: usize,
    sample_type: usize,
    days: (usize, &'static str),
    populations: [usize; Population::COUNT],
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            find(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };

        let sample = require(SAMPLE_HEADER);
        let project = require(PROJECT_HEADER);
        let subject = require(SUBJECT_HEADER);
        let condition = require(CONDITION_HEADER);
        let treatment = require(TREATMENT_HEADER);
        let response = require(RESPONSE_HEADER);
        let sample_type = require(SAMPLE_TYPE_HEADER);
        let mut populations = [usize::MAX; Population::COUNT];
        for p in Population::ALL {
            populations[p.index()] = require(p.name());
        }

        let days = DAYS_HEADERS
            .iter()
            .find_map(|&h| find(h).map(|i| (i, h)));
        if days.is_none() {
            missing.push(DAYS_HEADERS[0].to_string());
        }

        match days {
            Some(days) if missing.is_empty() => Ok(Self {
                sample,
                project,
                subject,
                condition,
                treatment,
                response,
                sample_type,
                days,
                populations,
            }),
            _ => Err(CellFreqError::validation(format!(
                "missing required column(s): {}",
                missing.join(", ")
            ))),
        }
    }

    fn parse_row(&self, row: usize, record: &csv::StringRecord) -> Result<Sample> {
        let get = |idx: usize, column: &str| field(record, row, idx, column);
        let text = |idx: usize, column: &str| required(record, row, idx, column);

        let treatment = match get(self.treatment, TREATMENT_HEADER)? {
            t if t.is_empty() || t.eq_ignore_ascii_case("none") => None,
            t => Some(t.to_string()),
        };
        let response = Response::parse_flag(get(self.response, RESPONSE_HEADER)?)
            .map_err(|reason| CellFreqError::invalid_field(row, RESPONSE_HEADER, reason))?;

        let (days_idx, days_name) = self.days;
        let days_since_start = get(days_idx, days_name)?
            .parse::<u32>()
            .map_err(|_| {
                CellFreqError::invalid_field(row, days_name, "expected a non-negative integer")
            })?;

        let mut counts = [0u64; Population::COUNT];
        for p in Population::ALL {
            let raw = get(self.populations[p.index()], p.name())?;
            counts[p.index()] = raw.parse::<u64>().map_err(|_| {
                CellFreqError::invalid_field(
                    row,
                    p.name(),
                    format!("expected a non-negative integer count, got '{}'", raw),
                )
            })?;
        }

        let sample = Sample {
            sample_id: text(self.sample, SAMPLE_HEADER)?,
            project_id: text(self.project, PROJECT_HEADER)?,
            subject_id: text(self.subject, SUBJECT_HEADER)?,
            condition: text(self.condition, CONDITION_HEADER)?,
            treatment,
            response,
            sample_type: text(self.sample_type, SAMPLE_TYPE_HEADER)?,
            days_since_start,
            counts,
        };
        sample.validate().map_err(|reason| CellFreqError::Validation {
            row: Some(row),
            column: None,
            reason,
        })?;
        Ok(sample)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    row: usize,
    idx: usize,
    column: &str,
) -> Result<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| CellFreqError::invalid_field(row, column, "field is missing"))
}

fn required(record: &csv::StringRecord, row: usize, idx: usize, column: &str) -> Result<String> {
    let value = field(record, row, idx, column)?;
    if value.is_empty() {
        return Err(CellFreqError::invalid_field(row, column, "value is empty"));
    }
    Ok(value.to_string())
}

/// The full, validated sample universe of one study.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Build a sample set from already-constructed samples.
    ///
    /// Applies the same checks as the file loader: unique, non-empty ids and
    /// no response flag without a treatment.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (i, sample) in samples.iter().enumerate() {
            sample.validate().map_err(|reason| CellFreqError::Validation {
                row: Some(i + 1),
                column: None,
                reason,
            })?;
            if !seen.insert(sample.sample_id.as_str()) {
                return Err(CellFreqError::invalid_field(
                    i + 1,
                    SAMPLE_HEADER,
                    format!("duplicate sample id '{}'", sample.sample_id),
                ));
            }
        }
        Ok(Self { samples })
    }

    /// Load samples from a delimited file.
    pub fn from_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading samples");
        let file = File::open(path)?;
        Self::from_reader(file, delimiter)
    }

    /// Load samples from any reader producing delimited text.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().map_err(csv_to_validation(None))?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CellFreqError::validation("input is empty"));
        }
        let columns = ColumnIndex::resolve(&headers)?;

        let mut samples = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let row = i + 1;
            let record = record.map_err(csv_to_validation(Some(row)))?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            samples.push(columns.parse_row(row, &record)?);
        }

        let set = Self::new(samples)?;
        debug!(n_samples = set.len(), "samples loaded");
        Ok(set)
    }

    /// All samples, in input order.
    pub fn samples(&self) -> &[Sample] {
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

    /// Look up a sample by id.
    pub fn get(&self, sample_id: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.sample_id == sample_id)
    }

    /// Iterate over samples in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

fn csv_to_validation(row: Option<usize>) -> impl Fn(csv::Error) -> CellFreqError {
    move |e| {
        let reason = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => CellFreqError::Io(io),
            _ => CellFreqError::Validation {
                row,
                column: None,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

    fn load(body: &str) -> Result<SampleSet> {
        SampleSet::from_reader(format!("{}\n{}", HEADER, body).as_bytes(), DEFAULT_DELIMITER)
    }

    #[test]
    fn test_load_samples() {
        let set = load(
            "prj1,sbj1,melanoma,57,M,tr1,y,s1,PBMC,0,10,20,30,10,30\n\
             prj1,sbj2,healthy,40,F,none,,s2,PBMC,0,1,2,3,4,5\n",
        )
        .unwrap();

        assert_eq!(set.len(), 2);
        let s1 = set.get("s1").unwrap();
        assert_eq!(s1.project_id, "prj1");
        assert_eq!(s1.treatment.as_deref(), Some("tr1"));
        assert_eq!(s1.response, Some(Response::Responder));
        assert_eq!(s1.count(Population::Cd4TCell), 30);
        assert_eq!(s1.total_count(), Some(100));

        let s2 = set.get("s2").unwrap();
        assert!(!s2.is_treated());
        assert_eq!(s2.response, None);
    }

    #[test]
    fn test_column_order_is_free() {
        let text = "monocyte,nk_cell,cd4_t_cell,cd8_t_cell,b_cell,days_since_start,sample_type,sample,response,treatment,condition,subject,project\n\
                    5,4,3,2,1,7,WB,sx,n,tr2,carcinoma,sbj9,prj2\n";
        let set = SampleSet::from_reader(text.as_bytes(), b',').unwrap();
        let s = &set.samples()[0];
        assert_eq!(s.counts, [1, 2, 3, 4, 5]);
        assert_eq!(s.days_since_start, 7);
        assert_eq!(s.response, Some(Response::NonResponder));
    }

    #[test]
    fn test_missing_header() {
        let text = "sample,project,subject\ns1,p,x\n";
        let err = SampleSet::from_reader(text.as_bytes(), b',').unwrap_err();
        match err {
            CellFreqError::Validation { reason, .. } => {
                assert!(reason.contains("condition"));
                assert!(reason.contains("b_cell"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_count() {
        let err = load("prj1,sbj1,melanoma,57,M,tr1,y,s1,PBMC,0,10,-2,30,10,30\n").unwrap_err();
        match err {
            CellFreqError::Validation { row, column, .. } => {
                assert_eq!(row, Some(1));
                assert_eq!(column.as_deref(), Some("cd8_t_cell"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_total_count_overflow() {
        let err = load("prj1,sbj1,melanoma,57,M,tr1,y,s1,PBMC,0,18446744073709551615,1,0,0,0\n")
            .unwrap_err();
        match err {
            CellFreqError::Validation { row, reason, .. } => {
                assert_eq!(row, Some(1));
                assert!(reason.contains("overflows"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let set = load("prj1,sbj1,melanoma,57,M,tr1,y,s1,PBMC,0,18446744073709551615,0,0,0,0\n")
            .unwrap();
        let mut sample = set.samples()[0].clone();
        assert_eq!(sample.total_count(), Some(u64::MAX));

        sample.counts[Population::Monocyte.index()] = 1;
        assert_eq!(sample.total_count(), None);
        assert!(matches!(
            SampleSet::new(vec![sample]),
            Err(CellFreqError::Validation { row: Some(1), .. })
        ));
    }

    #[test]
    fn test_invalid_response_flag() {
        let err = load("prj1,sbj1,melanoma,57,M,tr1,maybe,s1,PBMC,0,1,1,1,1,1\n").unwrap_err();
        assert!(matches!(err, CellFreqError::Validation { .. }));
    }

    #[test]
    fn test_response_without_treatment() {
        let err = load("prj1,sbj1,melanoma,57,M,none,y,s1,PBMC,0,1,1,1,1,1\n").unwrap_err();
        assert!(matches!(err, CellFreqError::Validation { .. }));
    }

    #[test]
    fn test_duplicate_sample_id() {
        let err = load(
            "prj1,sbj1,melanoma,57,M,tr1,y,s1,PBMC,0,1,1,1,1,1\n\
             prj1,sbj2,melanoma,57,M,tr1,n,s1,PBMC,0,1,1,1,1,1\n",
        )
        .unwrap_err();
        match err {
            CellFreqError::Validation { row, reason, .. } => {
                assert_eq!(row, Some(2));
                assert!(reason.contains("duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_input() {
        let err = SampleSet::from_reader("".as_bytes(), b',').unwrap_err();
        assert!(matches!(err, CellFreqError::Validation { .. }));
    }

    #[test]
    fn test_bom_and_tab_delimiter() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\u{feff}{}\n", HEADER.replace(',', "\t")).unwrap();
        writeln!(
            file,
            "prj1\tsbj1\tmelanoma\t57\tM\ttr1\tn\ts1\tPBMC\t7\t1\t2\t3\t4\t5"
        )
        .unwrap();
        file.flush().unwrap();

        let set = SampleSet::from_csv(file.path(), b'\t').unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.samples()[0].sample_id, "s1");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SampleSet::from_csv("/nonexistent/cell-count.csv", b',').unwrap_err();
        assert!(matches!(err, CellFreqError::Io(_)));
    }
}
