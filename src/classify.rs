//! Keep/drop classification of address chunks.
//!
//! The first chunk of an address is always kept, and so are chunks of three
//! characters or less. Every other chunk is run through the detectors of
//! [`detectors`] and the decision table of [`rules`]; a drop verdict may
//! take the rest of the address with it, short chunks included.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;
use crate::chunks::{AddressChunk, Decision, DropReason, SplitAddress};
use crate::tables::{CountryTable, TownsPerCountry};

pub mod detectors;
pub mod profile;
mod rules;

pub use detectors::{DEFAULT_USER_KEEP_WORDS, Detections};
pub use profile::{CountryCapabilities, DigitRescue, PostcodeShape, default_capabilities};

use detectors::Detectors;
use profile::CountryProfile;
use rules::{Outcome, evaluate};

/// Chunks this short are kept without running the detectors.
const MAX_SHORT_CHUNK_LEN: usize = 3;

fn is_short(chunk: &str) -> bool {
    chunk.trim().chars().count() <= MAX_SHORT_CHUNK_LEN
}

/// Options of [`ChunkClassifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Organization names that identify an institution on their own.
    pub user_keep_words: Vec<String>,
    /// Countries whose detection departs from the default.
    pub capabilities: HashMap<String, CountryCapabilities>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            user_keep_words: DEFAULT_USER_KEEP_WORDS.iter().map(|w| w.to_string()).collect(),
            capabilities: default_capabilities(),
        }
    }
}

/// Decides which chunks of an address name institutions.
#[derive(Debug, Clone)]
pub struct ChunkClassifier<'a> {
    towns: &'a TownsPerCountry,
    detectors: Detectors,
    profiles: HashMap<String, CountryProfile>,
    unknown_profile: CountryProfile,
}

impl<'a> ChunkClassifier<'a> {
    /// Compiles the detectors of every country known to `countries` or to
    /// the configured capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AffiliationError::InvalidPattern`] when a user keep
    /// word or a zip-code template does not compile.
    pub fn new(
        countries: &CountryTable,
        towns: &'a TownsPerCountry,
        config: &ClassifierConfig,
    ) -> Result<Self> {
        let mut profiles = HashMap::new();
        for record in countries.iter() {
            let capabilities = config
                .capabilities
                .get(&record.name)
                .cloned()
                .unwrap_or_default();
            profiles.insert(
                record.name.clone(),
                CountryProfile::compile(capabilities, Some(record))?,
            );
        }
        for (country, capabilities) in &config.capabilities {
            if !profiles.contains_key(country) {
                profiles.insert(
                    country.clone(),
                    CountryProfile::compile(capabilities.clone(), None)?,
                );
            }
        }

        Ok(Self {
            towns,
            detectors: Detectors::new(&config.user_keep_words)?,
            profiles,
            unknown_profile: CountryProfile::unknown(),
        })
    }

    fn profile(&self, country: &str) -> &CountryProfile {
        self.profiles.get(country).unwrap_or(&self.unknown_profile)
    }

    /// Flags raised on `chunk` for an address of `country`.
    pub fn detect(&self, chunk: &str, country: &str) -> Detections {
        self.detectors
            .detect(chunk, country, self.profile(country), self.towns)
    }

    /// Classifies the chunks of an address.
    pub fn classify(&self, split: &SplitAddress) -> Vec<AddressChunk> {
        let profile = self.profile(&split.country);
        let candidates = split
            .chunks
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, text)| !is_short(text))
            .count();

        let mut remaining = candidates;
        let mut stopped: Option<DropReason> = None;
        let mut chunks = Vec::with_capacity(split.chunks.len());

        for (position, text) in split.chunks.iter().enumerate() {
            let decision = if position == 0 {
                Decision::Keep
            } else if let Some(reason) = stopped {
                Decision::Drop(reason)
            } else if is_short(text) {
                Decision::Keep
            } else {
                let detections = self.detect(text, &split.country);
                let outcome = evaluate(&detections, &profile.capabilities, remaining);
                remaining -= 1;
                match outcome {
                    Outcome::Keep => Decision::Keep,
                    Outcome::DropChunk(reason) => Decision::Drop(reason),
                    Outcome::DropRun(reason) => {
                        tracing::debug!(
                            chunk = %text,
                            country = %split.country,
                            %reason,
                            run = remaining + 1,
                            "Dropping the rest of the address"
                        );
                        stopped = Some(reason);
                        Decision::Drop(reason)
                    }
                }
            };
            chunks.push(AddressChunk {
                text: text.clone(),
                position,
                decision,
            });
        }
        chunks
    }

    /// Keeps every chunk, for callers that disable the drop heuristics.
    pub fn keep_all(split: &SplitAddress) -> Vec<AddressChunk> {
        split
            .chunks
            .iter()
            .enumerate()
            .map(|(position, text)| AddressChunk {
                text: text.clone(),
                position,
                decision: Decision::Keep,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::reference_tables;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn split(country: &str, chunks: &[&str]) -> SplitAddress {
        SplitAddress {
            country: country.to_string(),
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn decisions(chunks: &[AddressChunk]) -> Vec<Decision> {
        chunks.iter().map(|chunk| chunk.decision).collect()
    }

    #[test]
    fn test_zip_code_drops_rest_of_address() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "France",
            &["CEA", "LITEN Solar & Thermodynam Syst Laboratory L2ST", "F-38054 Grenoble"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Keep,
                Decision::Drop(DropReason::ZipCode)
            ]
        );
        assert_eq!(chunks[2].position, 2);
    }

    #[test]
    fn test_first_chunk_always_kept() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split("France", &["12 Rue Jules Horowitz", "Grenoble"]));
        assert_eq!(
            decisions(&chunks),
            vec![Decision::Keep, Decision::Drop(DropReason::KnownTown)]
        );
    }

    #[test]
    fn test_postal_box_run() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "France",
            &["University X", "Laboratory Y", "BP 53", "ED", "38041 Grenoble"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Keep,
                Decision::Drop(DropReason::PostalBox),
                Decision::Drop(DropReason::PostalBox),
                Decision::Drop(DropReason::PostalBox),
            ]
        );
    }

    #[rstest]
    #[case("France", &["University Grenoble Alpes", "CEA", "F-38000 Grenoble"])]
    #[case("France", &["Laboratory X", "ILL", "Institute Y", "38000 Grenoble"])]
    #[case("United States", &["Department Phys", "MIT", "Cambridge", "MA 02139"])]
    fn test_short_chunk_is_kept(#[case] country: &str, #[case] chunks: &[&str]) {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let classified = classifier.classify(&split(country, chunks));
        assert_eq!(classified[1].text.chars().count(), 3);
        assert_eq!(classified[1].decision, Decision::Keep);
        assert!(!classified.last().unwrap().decision.is_keep());
    }

    #[test]
    fn test_drop_word_not_rescued_by_unit_prefix() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "France",
            &["University X", "Site UMR5256", "Laboratory Y"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Drop(DropReason::DropWord),
                Decision::Drop(DropReason::DropWord),
            ]
        );
    }

    #[test]
    fn test_town_inside_long_run_drops_only_itself() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "France",
            &["University X", "Grenoble", "Laboratory Y", "Institute Z"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Drop(DropReason::KnownTown),
                Decision::Keep,
                Decision::Keep,
            ]
        );
    }

    #[test]
    fn test_town_closing_address_drops_run() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "Sweden",
            &[
                "Lund University",
                "Department of Physical Geography and Ecosystem Science (INES)",
                "Lund",
            ],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Keep,
                Decision::Drop(DropReason::KnownTown)
            ]
        );
    }

    #[test]
    fn test_drop_word_with_user_keep_word_is_kept() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "France",
            &["Laboratory X", "CEA Site de Saclay", "F-91191 Gif Sur Yvette"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Keep,
                Decision::Drop(DropReason::ZipCode)
            ]
        );

        let chunks = classifier.classify(&split("Germany", &["Fraunhofer", "Institute Solar Campus"]));
        assert_eq!(decisions(&chunks), vec![Decision::Keep, Decision::Keep]);
    }

    #[test]
    fn test_geographic_suffix_without_keep_word_drops_run() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "Germany",
            &["Max Planck Institute", "Heisenbergstrasse", "Stuttgart"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Drop(DropReason::GeographicSuffix),
                Decision::Drop(DropReason::GeographicSuffix),
            ]
        );
    }

    #[test]
    fn test_digits_rescued_by_keep_word() {
        let tables = reference_tables();
        let classifier =
            ChunkClassifier::new(&tables.countries, &tables.towns, &ClassifierConfig::default())
                .unwrap();

        let chunks = classifier.classify(&split(
            "Germany",
            &["Max Planck Society", "Institute 2", "Institute Building 2"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![
                Decision::Keep,
                Decision::Keep,
                Decision::Drop(DropReason::ZipCode)
            ]
        );

        let chunks = classifier.classify(&split(
            "France",
            &["University X", "UMR 5256", "Equipe 4 Optique"],
        ));
        assert_eq!(
            decisions(&chunks),
            vec![Decision::Keep, Decision::Keep, Decision::Keep]
        );
    }

    #[test]
    fn test_custom_user_keep_words() {
        let tables = reference_tables();
        let config = ClassifierConfig {
            user_keep_words: vec!["Solvay".to_string()],
            ..ClassifierConfig::default()
        };
        let classifier = ChunkClassifier::new(&tables.countries, &tables.towns, &config).unwrap();

        let detections = classifier.detect("Solvay Campus", "Germany");
        assert!(detections.user_keep_word);
        assert!(!classifier.detect("CEA Saclay", "France").user_keep_word);
    }

    #[test]
    fn test_keep_all() {
        let chunks = ChunkClassifier::keep_all(&split("France", &["A", "BP 53", "Grenoble"]));
        assert_eq!(decisions(&chunks), vec![Decision::Keep; 3]);
    }
}
