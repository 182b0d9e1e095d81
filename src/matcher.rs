//! Matching of kept chunks against the normalized affiliation dictionary.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::tables::{InstitutionTypeOrder, NormalizedAffiliationDictionary, institution_type};
use crate::utils::{DiacriticsMode, SYMBOL_CHANGE, remove_special_symbol, translate};

/// Room left for institutions of the same type within one precedence level.
const TYPE_INDEX_SPAN: i64 = 1_000_000;

/// Normalized name dropped when several Paris universities match.
const PARIS_CITE_UNIVERSITY: &str = "Paris-Cité Univ";

/// Normalized names matched by one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMatch {
    pub chunk: String,
    pub institutions: Vec<String>,
}

/// Result of matching the kept chunks of one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Normalized institution names, in precedence order
    pub institutions: Vec<String>,
    /// Kept chunks that matched nothing, in address order
    pub unmatched: Vec<String>,
    /// Names matched by every kept chunk, in address order
    pub matches: Vec<ChunkMatch>,
}

/// Looks kept chunks up in the dictionary of their country.
#[derive(Debug, Clone, Copy)]
pub struct AffiliationMatcher<'a> {
    dictionary: &'a NormalizedAffiliationDictionary,
    types: &'a InstitutionTypeOrder,
}

/// Spelling of a chunk compared against word-sets.
fn matching_text(chunk: &str) -> String {
    let text = translate(chunk, SYMBOL_CHANGE);
    remove_special_symbol(&text, DiacriticsMode::Unicode)
        .trim()
        .to_lowercase()
}

impl<'a> AffiliationMatcher<'a> {
    pub fn new(
        dictionary: &'a NormalizedAffiliationDictionary,
        types: &'a InstitutionTypeOrder,
    ) -> Self {
        Self { dictionary, types }
    }

    /// Matches `chunks` against the dictionary of `country`.
    ///
    /// A chunk matches a normalized name when every word of at least one of
    /// its word-sets occurs in the chunk. When the country has no
    /// dictionary every chunk is unmatched.
    pub fn match_chunks(&self, country: &str, chunks: &[&str]) -> MatchOutcome {
        let Some(names) = self.dictionary.country(country) else {
            return Self::no_match(chunks);
        };

        let mut matched: BTreeSet<&str> = BTreeSet::new();
        let mut outcome = MatchOutcome::default();
        for chunk in chunks {
            let text = matching_text(chunk);
            let institutions: Vec<&str> = names
                .iter()
                .filter(|(_, word_sets)| word_sets.iter().any(|set| set.matches(&text)))
                .map(|(name, _)| name.as_str())
                .collect();

            if institutions.is_empty() {
                outcome.unmatched.push(chunk.to_string());
            }
            matched.extend(institutions.iter().copied());
            outcome.matches.push(ChunkMatch {
                chunk: chunk.to_string(),
                institutions: institutions.into_iter().map(String::from).collect(),
            });
        }

        drop_paris_cite_duplicate(&mut matched);

        match self.order(&matched) {
            Some(ordered) => {
                outcome.institutions = ordered;
                outcome
            }
            None => Self::no_match(chunks),
        }
    }

    fn no_match(chunks: &[&str]) -> MatchOutcome {
        MatchOutcome {
            institutions: Vec::new(),
            unmatched: chunks.iter().map(|chunk| chunk.to_string()).collect(),
            matches: chunks
                .iter()
                .map(|chunk| ChunkMatch {
                    chunk: chunk.to_string(),
                    institutions: Vec::new(),
                })
                .collect(),
        }
    }

    /// Sorts names by `level * TYPE_INDEX_SPAN + index`, where the index
    /// separates names of the same type. Returns `None` when a name has a
    /// type missing from the type table.
    fn order(&self, matched: &BTreeSet<&str>) -> Option<Vec<String>> {
        let mut next_index: HashMap<&str, i64> = HashMap::new();
        let mut used_keys: HashSet<i64> = HashSet::new();
        let mut keyed: Vec<(i64, &str)> = Vec::with_capacity(matched.len());

        for &name in matched {
            let abbreviation = institution_type(name);
            let Some(level) = self.types.level(abbreviation) else {
                tracing::warn!(
                    institution = %name,
                    institution_type = %abbreviation,
                    "Institution type missing from the type table, address left unmatched"
                );
                return None;
            };

            let index = next_index.entry(abbreviation).or_insert(0);
            let mut key = level * TYPE_INDEX_SPAN + *index;
            while !used_keys.insert(key) {
                *index += 1;
                key = level * TYPE_INDEX_SPAN + *index;
            }
            keyed.push((key, name));
        }

        keyed.sort_by_key(|(key, _)| *key);
        Some(keyed.into_iter().map(|(_, name)| name.to_string()).collect())
    }
}

/// Several Paris universities matching at once means the generic
/// `Paris-Cité Univ` word-set caught a more specific one.
fn drop_paris_cite_duplicate(matched: &mut BTreeSet<&str>) {
    let paris_universities = matched
        .iter()
        .filter(|name| name.contains("Univ") && name.contains("Paris"))
        .count();
    if paris_universities > 1 {
        matched.remove(PARIS_CITE_UNIVERSITY);
    }
}
