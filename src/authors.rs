//! Aggregation of resolved addresses per author.
//!
//! An author usually signs with several addresses. [`AuthorInstitutions`]
//! merges their countries, institutions and unmatched fragments, and flags
//! the institutions a user wants to follow in dedicated columns.
//!
//! # Example
//!
//! ```
//! use affiliation_resolver::ResolvedAddress;
//! use affiliation_resolver::authors::{AuthorInstitutions, InstitutionFilter};
//!
//! let addresses = vec![
//!     ResolvedAddress {
//!         country: "France".to_string(),
//!         institutions: vec!["CEA Nro".to_string(), "LITEN Rto".to_string()],
//!         raw_fragments: vec![],
//!     },
//!     ResolvedAddress {
//!         country: "France".to_string(),
//!         institutions: vec!["CNRS Nro".to_string(), "CEA Nro".to_string()],
//!         raw_fragments: vec!["Equipe Optique".to_string()],
//!     },
//! ];
//!
//! let author = AuthorInstitutions::aggregate("Dupont J", &addresses);
//! assert_eq!(author.institutions, vec!["CEA Nro", "LITEN Rto", "CNRS Nro"]);
//!
//! let filters = vec![InstitutionFilter::new("LITEN", "liten"), InstitutionFilter::new("INES", "ines")];
//! assert_eq!(
//!     author.flags(&filters),
//!     vec![("liten".to_string(), true), ("ines".to_string(), false)]
//! );
//! ```

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::ResolvedAddress;

/// Institution followed in its own export column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionFilter {
    /// Text searched in the normalized institution names
    pub institution: String,
    /// Name of the export column
    pub column: String,
}

impl InstitutionFilter {
    pub fn new(institution: &str, column: &str) -> Self {
        Self {
            institution: institution.to_string(),
            column: column.to_string(),
        }
    }
}

/// Countries, institutions and unmatched fragments of one author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInstitutions {
    pub author: String,
    pub countries: Vec<String>,
    pub institutions: Vec<String>,
    pub raw_fragments: Vec<String>,
}

impl AuthorInstitutions {
    /// Merges the resolved addresses of `author`, keeping first occurrences
    /// in address order.
    pub fn aggregate(author: &str, addresses: &[ResolvedAddress]) -> Self {
        Self {
            author: author.to_string(),
            countries: addresses
                .iter()
                .map(|address| address.country.clone())
                .unique()
                .collect(),
            institutions: addresses
                .iter()
                .flat_map(|address| address.institutions.iter().cloned())
                .unique()
                .collect(),
            raw_fragments: addresses
                .iter()
                .flat_map(|address| address.raw_fragments.iter().cloned())
                .unique()
                .collect(),
        }
    }

    /// One `(column, flag)` per filter, the flag being set when the filter
    /// text occurs in one of the author's normalized institutions.
    pub fn flags(&self, filters: &[InstitutionFilter]) -> Vec<(String, bool)> {
        filters
            .iter()
            .map(|filter| {
                let found = self
                    .institutions
                    .iter()
                    .any(|institution| institution.contains(&filter.institution));
                (filter.column.clone(), found)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn address(country: &str, institutions: &[&str], fragments: &[&str]) -> ResolvedAddress {
        ResolvedAddress {
            country: country.to_string(),
            institutions: institutions.iter().map(|s| s.to_string()).collect(),
            raw_fragments: fragments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_aggregate() {
        let addresses = vec![
            address("France", &["CEA Nro"], &["Equipe A"]),
            address("Sweden", &["Lund Univ"], &[]),
            address("France", &["CNRS Nro", "CEA Nro"], &["Equipe A", "Equipe B"]),
        ];

        let author = AuthorInstitutions::aggregate("Smith J", &addresses);
        assert_eq!(author.author, "Smith J");
        assert_eq!(author.countries, vec!["France", "Sweden"]);
        assert_eq!(author.institutions, vec!["CEA Nro", "Lund Univ", "CNRS Nro"]);
        assert_eq!(author.raw_fragments, vec!["Equipe A", "Equipe B"]);
    }

    #[test]
    fn test_aggregate_without_addresses() {
        assert_eq!(
            AuthorInstitutions::aggregate("Smith J", &[]),
            AuthorInstitutions {
                author: "Smith J".to_string(),
                ..AuthorInstitutions::default()
            }
        );
    }

    #[test]
    fn test_flags_match_substrings() {
        let author = AuthorInstitutions::aggregate(
            "Smith J",
            &[address("France", &["Paris-Saclay Univ", "CEA Nro"], &[])],
        );
        let filters = vec![
            InstitutionFilter::new("Saclay", "saclay"),
            InstitutionFilter::new("CEA", "cea"),
            InstitutionFilter::new("CNRS", "cnrs"),
        ];

        assert_eq!(
            author.flags(&filters),
            vec![
                ("saclay".to_string(), true),
                ("cea".to_string(), true),
                ("cnrs".to_string(), false),
            ]
        );
    }
}
