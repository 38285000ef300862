//! The fixed set of immune cell populations.

use crate::error::{CellFreqError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An immune cell population measured in every sample.
///
/// The set is closed: every sample carries exactly one count per variant,
/// and every comparison tests every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    BCell,
    #[serde(rename = "cd8_t_cell")]
    Cd8TCell,
    #[serde(rename = "cd4_t_cell")]
    Cd4TCell,
    NkCell,
    Monocyte,
}

impl Population {
    /// Number of populations.
    pub const COUNT: usize = 5;

    /// All populations in canonical column order.
    pub const ALL: [Population; Self::COUNT] = [
        Population::BCell,
        Population::Cd8TCell,
        Population::Cd4TCell,
        Population::NkCell,
        Population::Monocyte,
    ];

    /// Column header and report key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BCell => "b_cell",
            Self::Cd8TCell => "cd8_t_cell",
            Self::Cd4TCell => "cd4_t_cell",
            Self::NkCell => "nk_cell",
            Self::Monocyte => "monocyte",
        }
    }

    /// Position in [`Population::ALL`].
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Population {
    type Err = CellFreqError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == needle)
            .ok_or_else(|| CellFreqError::validation(format!("Unknown cell population '{}'", s)))
    }
}
