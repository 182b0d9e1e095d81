//! Resolution of countries and normalized institutions from bibliographic
//! affiliation addresses.
//!
//! `affiliation-resolver` takes the free-text addresses found in Web of
//! Science or Scopus records, such as
//! `"CEA, LITEN Solar & Thermodynam Syst Lab L2ST, F-38054 Grenoble, France"`,
//! and reduces them to a canonical country and an ordered list of normalized
//! institution names drawn from curated per-country dictionaries.
//!
//! # Key Features
//!
//! - **Standardization**: diacritics, dash and quote variants, and recurring
//!   institutional abbreviations (`Univ.`, `Dept.`, `Lab.`) are unified.
//! - **Country detection** with aliases for UK nations, USA, China and more.
//! - **Drop heuristics**: postal boxes, postcodes, streets and towns are
//!   recognized and removed before matching, with per-country capabilities.
//! - **Dictionary matching** by word-sets, ordered by institution-type level.
//! - **Reference tables** loaded from CSV files and validated before use.
//! - **Parallel batch resolution** through rayon.
//!
//! # Basic Usage
//!
//! ```rust
//! use affiliation_resolver::AddressInstitutionResolver;
//! use affiliation_resolver::tables::{CountryRecord, ReferenceTables};
//!
//! let mut tables = ReferenceTables::default();
//! tables.countries.insert(CountryRecord::new("Sweden").with_zip_code(&["s", "se"], &[5]));
//! tables.towns.insert("Sweden", "Lund");
//! tables.institution_types.insert("Univ", 3);
//! tables.affiliations.insert("Sweden", "Lund Univ", &["Lund University"]);
//!
//! let resolver = AddressInstitutionResolver::new(&tables).unwrap();
//! let resolved = resolver.resolve("Lund University, Department of Physics, Lund, Sweden");
//!
//! assert_eq!(resolved.country, "Sweden");
//! assert_eq!(resolved.institutions, vec!["Lund Univ"]);
//! assert_eq!(resolved.raw_fragments, vec!["Department of Physics"]);
//! assert_eq!(resolved.joined_institutions(), "Lund Univ");
//! ```
//!
//! # Loading Reference Tables
//!
//! ```rust,no_run
//! use affiliation_resolver::tables::{ReferenceTables, TableFiles};
//!
//! let tables = ReferenceTables::from_dir("reference", &TableFiles::default()).unwrap();
//! ```
//!
//! # Error Handling
//!
//! Resolving an address never fails: unknown countries and unmatched chunks
//! degrade to the `"Unknown"` country and to raw fragments. Loading tables and
//! building a resolver return the crate [`Result`]:
//!
//! ```rust
//! use affiliation_resolver::{AddressInstitutionResolver, AffiliationError};
//! use affiliation_resolver::tables::ReferenceTables;
//!
//! let mut tables = ReferenceTables::default();
//! tables.affiliations.insert("France", "ILL Lab", &["ILL"]);
//!
//! match AddressInstitutionResolver::new(&tables) {
//!     Ok(_) => println!("Tables are consistent"),
//!     Err(AffiliationError::InconsistentInstitutionTypes(report)) => {
//!         assert_eq!(report["France"], vec!["Lab"]);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Reference tables are read-only once loaded and a resolver holds no mutable
//! state, so one resolver can serve many threads. Batches run on the rayon
//! thread pool when [`resolver::ResolverConfig::run_in_parallel`] is set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod authors;
pub mod chunks;
pub mod classify;
pub mod country;
pub mod matcher;
mod regex;
pub mod resolver;
pub mod standardize;
pub mod tables;
mod utils;

#[cfg(test)]
mod test_fixtures;

// Reexports
pub use country::{CountryNormalizer, UNKNOWN_COUNTRY};
pub use resolver::{AddressInstitutionResolver, ResolverConfig, resolve};
pub use tables::ReferenceTables;
pub use utils::DiacriticsMode;

/// Placeholder exported in place of an empty list.
pub const EMPTY: &str = "empty";

/// Separator of the exported lists.
pub const LIST_SEPARATOR: &str = ";";

/// A specialized Result type for affiliation operations.
pub type Result<T> = std::result::Result<T, AffiliationError>;

/// Represents errors that can occur while loading reference tables or
/// building a resolver.
#[derive(Error, Debug)]
pub enum AffiliationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: String, message: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Institution-type abbreviations missing from the type table, per country.
    #[error("Institution types missing from the type table: {0:?}")]
    InconsistentInstitutionTypes(BTreeMap<String, Vec<String>>),
}

#[cfg(feature = "csv")]
impl From<csv::Error> for AffiliationError {
    fn from(err: csv::Error) -> Self {
        AffiliationError::InvalidFormat(err.to_string())
    }
}

/// Country and institutions resolved from one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// Canonical country name, or [`UNKNOWN_COUNTRY`]
    pub country: String,
    /// Normalized institution names by increasing type level
    pub institutions: Vec<String>,
    /// Kept chunks that matched no normalized institution
    pub raw_fragments: Vec<String>,
}

impl ResolvedAddress {
    /// Institutions joined for export, or [`EMPTY`].
    pub fn joined_institutions(&self) -> String {
        join_or_empty(&self.institutions)
    }

    /// Raw fragments joined for export, or [`EMPTY`].
    pub fn joined_fragments(&self) -> String {
        join_or_empty(&self.raw_fragments)
    }
}

fn join_or_empty(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY.to_string()
    } else {
        items.join(LIST_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_joined_lists() {
        let resolved = ResolvedAddress {
            country: "France".to_string(),
            institutions: vec!["CEA Nro".to_string(), "LITEN Rto".to_string()],
            raw_fragments: vec![],
        };
        assert_eq!(resolved.joined_institutions(), "CEA Nro;LITEN Rto");
        assert_eq!(resolved.joined_fragments(), "empty");
    }

    #[test]
    fn test_error_display() {
        let err = AffiliationError::InvalidFieldValue {
            field: "Level".to_string(),
            message: "'high' is not an integer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid field value: Level - 'high' is not an integer"
        );

        let report = BTreeMap::from([("France".to_string(), vec!["Lab".to_string()])]);
        assert_eq!(
            AffiliationError::InconsistentInstitutionTypes(report).to_string(),
            "Institution types missing from the type table: {\"France\": [\"Lab\"]}"
        );
    }
}
