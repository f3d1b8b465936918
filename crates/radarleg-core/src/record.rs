//! Canonical record shape shared by every source adapter.
//!
//! A [`BillRecord`] is constructed once by an adapter from a raw source
//! payload and never mutated afterwards. Downstream stages annotate it with
//! wrapper types ([`RelevantBill`], scoring results) instead of writing back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel for display fields a source could not provide.
pub const UNKNOWN: &str = "N/A";

/// Configuration errors surfaced to the caller before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no sources enabled")]
    NoSourcesEnabled,

    #[error("invalid year range: {start} > {end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("no adapter registered for source {0}")]
    SourceNotRegistered(SourceName),
}

/// Legislative chamber a bill was presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    LowerHouse,
    Senate,
    StateAssembly,
    MunicipalCouncil,
}

impl Chamber {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowerHouse => "Câmara",
            Self::Senate => "Senado",
            Self::StateAssembly => "ALESP",
            Self::MunicipalCouncil => "Câmara Municipal",
        }
    }
}

/// Identifies which adapter produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    Camara,
    Senado,
    Alesp,
    MunicipalSp,
}

impl SourceName {
    /// Human-readable source title, used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Camara => "Câmara dos Deputados",
            Self::Senado => "Senado Federal",
            Self::Alesp => "ALESP",
            Self::MunicipalSp => "Câmara Municipal SP",
        }
    }

    /// The chamber records from this source belong to.
    pub fn chamber(&self) -> Chamber {
        match self {
            Self::Camara => Chamber::LowerHouse,
            Self::Senado => Chamber::Senate,
            Self::Alesp => Chamber::StateAssembly,
            Self::MunicipalSp => Chamber::MunicipalCouncil,
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Camara => "camara",
            Self::Senado => "senado",
            Self::Alesp => "alesp",
            Self::MunicipalSp => "municipal-sp",
        };
        f.write_str(tag)
    }
}

impl FromStr for SourceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camara" => Ok(Self::Camara),
            "senado" => Ok(Self::Senado),
            "alesp" => Ok(Self::Alesp),
            "municipal-sp" | "municipal" => Ok(Self::MunicipalSp),
            other => Err(format!(
                "unknown source '{other}' (expected camara, senado, alesp or municipal-sp)"
            )),
        }
    }
}

/// One legislative proposal, normalised from a source payload.
///
/// `identifier` is unique per (type, number, year, chamber) and is the
/// cross-source dedup key. `summary` is the legally operative description;
/// it may be empty, and empty summaries are always excluded downstream.
/// The remaining string fields are best-effort display values defaulting
/// to [`UNKNOWN`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillRecord {
    pub identifier: String,
    pub year: i32,
    pub chamber: Chamber,
    pub summary: String,
    pub authors: String,
    pub presented_date: String,
    pub status_text: String,
    pub source_link: String,
    pub source_name: SourceName,
}

/// Normalise an optional display value to the [`UNKNOWN`] sentinel.
pub fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

/// A bill that passed the relevance filter, annotated with how many
/// term-set entries its summary contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevantBill {
    pub record: BillRecord,
    pub term_matches: usize,
}

/// Inclusive range of legislative years, iterated newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// Number of years in the range (always at least one).
    pub fn year_count(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    /// Years newest-first, so recent legislation is fetched before limits bite.
    pub fn years_desc(&self) -> impl Iterator<Item = i32> {
        (self.start..=self.end).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_rejects_inverted_bounds() {
        let err = YearRange::new(2024, 2020).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidYearRange {
                start: 2024,
                end: 2020
            }
        );
    }

    #[test]
    fn year_range_iterates_newest_first() {
        let range = YearRange::new(2021, 2023).unwrap();
        let years: Vec<i32> = range.years_desc().collect();
        assert_eq!(years, vec![2023, 2022, 2021]);
        assert_eq!(range.year_count(), 3);
    }

    #[test]
    fn year_range_single_year() {
        let range = YearRange::new(2022, 2022).unwrap();
        assert_eq!(range.years_desc().collect::<Vec<_>>(), vec![2022]);
        assert!(range.contains(2022));
        assert!(!range.contains(2021));
    }

    #[test]
    fn or_unknown_defaults_blank_values() {
        assert_eq!(or_unknown(None), UNKNOWN);
        assert_eq!(or_unknown(Some("  ".into())), UNKNOWN);
        assert_eq!(or_unknown(Some("Dep. Fulana".into())), "Dep. Fulana");
    }

    #[test]
    fn source_name_parses_cli_tags() {
        assert_eq!("camara".parse::<SourceName>().unwrap(), SourceName::Camara);
        assert_eq!(
            "Municipal-SP".parse::<SourceName>().unwrap(),
            SourceName::MunicipalSp
        );
        assert!("assembleia".parse::<SourceName>().is_err());
    }

    #[test]
    fn source_maps_to_chamber() {
        assert_eq!(SourceName::Camara.chamber(), Chamber::LowerHouse);
        assert_eq!(SourceName::Senado.chamber(), Chamber::Senate);
        assert_eq!(SourceName::Alesp.chamber(), Chamber::StateAssembly);
        assert_eq!(SourceName::MunicipalSp.chamber(), Chamber::MunicipalCouncil);
    }
}
