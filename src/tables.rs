//! Reference tables consumed by the resolver.
//!
//! The tables are loaded once, validated once and then only read. Every
//! resolver borrows them immutably, so a single [`ReferenceTables`] can be
//! shared by any number of threads resolving addresses at the same time.
//!
//! # Example
//!
//! ```
//! use affiliation_resolver::tables::{CountryRecord, ReferenceTables};
//!
//! let mut tables = ReferenceTables::default();
//! tables.countries.insert(CountryRecord::new("France").with_zip_code(&["f", "fr"], &[5]));
//! tables.institution_types.insert("Nro", 1);
//! tables.affiliations.insert("France", "CEA Nro", &["CEA"]);
//! tables.towns.insert("France", "Grenoble");
//!
//! assert!(tables.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::utils::canonical_town_name;
use crate::{AffiliationError, Result};

#[cfg(feature = "csv")]
mod load;
mod words;

#[cfg(feature = "csv")]
pub use load::TableFiles;
pub use words::{WordSet, build_word_sets};

/// One row of the countries table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Canonical country name
    pub name: String,
    /// ISO short name
    pub short_name: String,
    /// Latitude and longitude of the capital
    pub gps: Option<(f64, f64)>,
    /// Lower-case letter prefixes of zip codes, such as `f` in `F-38054`
    pub zip_letters: Vec<String>,
    /// Possible digit counts of zip codes
    pub zip_digits: Vec<usize>,
    /// Continent name
    pub continent: String,
}

impl CountryRecord {
    /// Creates a record with only the canonical name set.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short_name: String::new(),
            gps: None,
            zip_letters: Vec::new(),
            zip_digits: Vec::new(),
            continent: String::new(),
        }
    }

    /// Sets the zip-code letter prefixes and digit counts.
    #[must_use]
    pub fn with_zip_code(mut self, letters: &[&str], digits: &[usize]) -> Self {
        self.zip_letters = letters.iter().map(|l| l.to_lowercase()).collect();
        self.zip_digits = digits.to_vec();
        self
    }
}

/// Canonical countries keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryTable {
    records: BTreeMap<String, CountryRecord>,
}

impl CountryTable {
    pub fn insert(&mut self, record: CountryRecord) -> &mut Self {
        self.records.insert(record.name.clone(), record);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CountryRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Known town names per country, stored in canonical form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TownsPerCountry {
    towns: HashMap<String, HashSet<String>>,
}

impl TownsPerCountry {
    /// Adds a town; the name is lower-cased, rationalized and stripped of
    /// diacritics before storage.
    pub fn insert(&mut self, country: &str, town: &str) -> &mut Self {
        let town = canonical_town_name(town);
        if !town.is_empty() {
            self.towns.entry(country.to_string()).or_default().insert(town);
        }
        self
    }

    /// Checks a town name already in canonical form.
    pub fn contains(&self, country: &str, canonical_town: &str) -> bool {
        self.towns
            .get(country)
            .is_some_and(|towns| towns.contains(canonical_town))
    }

    /// Number of towns known for `country`.
    pub fn count(&self, country: &str) -> usize {
        self.towns.get(country).map_or(0, HashSet::len)
    }

    pub fn len(&self) -> usize {
        self.towns.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }
}

/// Precedence level of every institution-type abbreviation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionTypeOrder {
    levels: HashMap<String, i64>,
}

impl InstitutionTypeOrder {
    pub fn insert(&mut self, abbreviation: &str, level: i64) -> &mut Self {
        self.levels.insert(abbreviation.trim().to_string(), level);
        self
    }

    pub fn level(&self, abbreviation: &str) -> Option<i64> {
        self.levels.get(abbreviation).copied()
    }

    pub fn contains(&self, abbreviation: &str) -> bool {
        self.levels.contains_key(abbreviation)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Type abbreviation of a normalized institution name: its last word.
pub fn institution_type(normalized_name: &str) -> &str {
    normalized_name
        .rsplit(' ')
        .next()
        .unwrap_or(normalized_name)
}

/// Normalized institution names per country, each with the word-sets
/// that identify it in an address chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedAffiliationDictionary {
    countries: BTreeMap<String, BTreeMap<String, Vec<WordSet>>>,
}

impl NormalizedAffiliationDictionary {
    /// Adds a normalized name with the word-sets built from its raw
    /// affiliation spellings.
    pub fn insert(&mut self, country: &str, normalized_name: &str, raw_affiliations: &[&str]) -> &mut Self {
        self.insert_word_sets(country, normalized_name, build_word_sets(raw_affiliations))
    }

    /// Adds a normalized name with ready-made word-sets. Word-sets already
    /// registered for the same name are kept.
    pub fn insert_word_sets(
        &mut self,
        country: &str,
        normalized_name: &str,
        word_sets: Vec<WordSet>,
    ) -> &mut Self {
        self.countries
            .entry(country.to_string())
            .or_default()
            .entry(normalized_name.trim().to_string())
            .or_default()
            .extend(word_sets);
        self
    }

    /// The normalized names and word-sets of `country`.
    pub fn country(&self, country: &str) -> Option<&BTreeMap<String, Vec<WordSet>>> {
        self.countries.get(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.countries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// All reference data needed to resolve addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub countries: CountryTable,
    pub towns: TownsPerCountry,
    pub institution_types: InstitutionTypeOrder,
    pub affiliations: NormalizedAffiliationDictionary,
}

impl ReferenceTables {
    /// Lists, per country, the type abbreviations used by normalized names
    /// that are missing from the institution-type table.
    pub fn check_institution_types(&self) -> BTreeMap<String, Vec<String>> {
        let mut report = BTreeMap::new();
        for (country, names) in &self.affiliations.countries {
            let mut missing: Vec<String> = names
                .keys()
                .map(|name| institution_type(name))
                .filter(|abbreviation| !self.institution_types.contains(abbreviation))
                .map(String::from)
                .collect();
            missing.sort();
            missing.dedup();
            if !missing.is_empty() {
                report.insert(country.clone(), missing);
            }
        }
        report
    }

    /// Pre-flight check run before any address is resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AffiliationError::InconsistentInstitutionTypes`] carrying the
    /// full report when any normalized name has an unknown type abbreviation.
    pub fn validate(&self) -> Result<()> {
        let report = self.check_institution_types();
        if report.is_empty() {
            return Ok(());
        }
        tracing::warn!(
            countries = report.len(),
            "Normalized affiliations use unknown institution types"
        );
        Err(AffiliationError::InconsistentInstitutionTypes(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::reference_tables;

    #[test]
    fn test_institution_type() {
        assert_eq!(institution_type("LITEN Rto"), "Rto");
        assert_eq!(institution_type("Paris-Cité Univ"), "Univ");
        assert_eq!(institution_type("CNRS"), "CNRS");
    }

    #[test]
    fn test_towns_are_stored_canonical() {
        let mut towns = TownsPerCountry::default();
        towns.insert("France", "Saint-Étienne").insert("France", "  ");

        assert!(towns.contains("France", "st etienne"));
        assert!(!towns.contains("France", "Saint-Étienne"));
        assert!(!towns.contains("Sweden", "st etienne"));
        assert_eq!(towns.count("France"), 1);
    }

    #[test]
    fn test_insert_word_sets_accumulates() {
        let mut dictionary = NormalizedAffiliationDictionary::default();
        dictionary
            .insert("France", "CEA Nro", &["CEA"])
            .insert("France", "CEA Nro ", &["Commissariat Energie Atomique"]);

        let names = dictionary.country("France").unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["CEA Nro"].len(), 2);
    }

    #[test]
    fn test_validate_accepts_consistent_tables() {
        assert!(reference_tables().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_unknown_types() {
        let mut tables = reference_tables();
        tables
            .affiliations
            .insert("France", "ESRF Xyz", &["ESRF"])
            .insert("France", "ILL Abc", &["ILL"])
            .insert("Sweden", "MAX IV Xyz", &["MAX IV"]);

        let report = tables.check_institution_types();
        assert_eq!(report["France"], vec!["Abc", "Xyz"]);
        assert_eq!(report["Sweden"], vec!["Xyz"]);

        match tables.validate() {
            Err(AffiliationError::InconsistentInstitutionTypes(errors)) => {
                assert_eq!(errors, report)
            }
            other => panic!("unexpected validation result: {other:?}"),
        }
    }
}
