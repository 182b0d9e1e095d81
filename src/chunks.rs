//! Splitting of standardized addresses into chunks.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::country::CountryNormalizer;
use crate::tables::CountryTable;

/// Why a chunk was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    PostalBox,
    /// Zip code or other digit code
    ZipCode,
    GeographicSuffix,
    KnownTown,
    DropWord,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::PostalBox => "postal-box",
            DropReason::ZipCode => "zip/digit-code",
            DropReason::GeographicSuffix => "geographic-suffix",
            DropReason::KnownTown => "known-town",
            DropReason::DropWord => "drop-word",
        };
        f.write_str(reason)
    }
}

/// Classification of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Keep,
    Drop(DropReason),
}

impl Decision {
    pub fn is_keep(&self) -> bool {
        matches!(self, Decision::Keep)
    }
}

/// A classified piece of a standardized address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressChunk {
    pub text: String,
    /// Position among the candidate chunks of the address
    pub position: usize,
    pub decision: Decision,
}

/// Candidate chunks of an address and its country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAddress {
    pub country: String,
    /// Trimmed, non-empty chunks in address order, country excluded
    pub chunks: Vec<String>,
}

/// Splits standardized addresses on commas and on isolated ` - ` and ` | `.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter<'a> {
    normalizer: CountryNormalizer<'a>,
}

impl<'a> ChunkSplitter<'a> {
    pub fn new(countries: &'a CountryTable) -> Self {
        Self {
            normalizer: CountryNormalizer::new(countries),
        }
    }

    /// Splits `standardized` into its country and candidate chunks.
    ///
    /// The last comma-separated piece is the country. Repeated pieces keep
    /// their first occurrence only, and pieces naming the country again
    /// are discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use affiliation_resolver::chunks::ChunkSplitter;
    /// use affiliation_resolver::tables::{CountryRecord, CountryTable};
    ///
    /// let mut countries = CountryTable::default();
    /// countries.insert(CountryRecord::new("Sweden"));
    /// let splitter = ChunkSplitter::new(&countries);
    ///
    /// let split = splitter.split("Lund University, Lund - Malmo, Lund University, Sweden");
    /// assert_eq!(split.country, "Sweden");
    /// assert_eq!(split.chunks, vec!["Lund University", "Lund", "Malmo"]);
    /// ```
    pub fn split(&self, standardized: &str) -> SplitAddress {
        let mut pieces: Vec<&str> = standardized.split(',').collect();
        let country = self.normalizer.normalize(pieces.pop().unwrap_or_default());

        let chunks = pieces
            .into_iter()
            .map(str::trim)
            .unique()
            .flat_map(|piece| piece.split(" - "))
            .flat_map(|piece| piece.split(" | "))
            .map(str::trim)
            .filter(|chunk| {
                !chunk.is_empty() && *chunk != country && !CountryNormalizer::is_alias(chunk)
            })
            .map(String::from)
            .collect();

        SplitAddress { country, chunks }
    }
}
