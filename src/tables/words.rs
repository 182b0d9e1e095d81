//! Word-sets identifying a normalized institution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::standardize::unify_institution_words;
use crate::utils::{
    APOSTROPHE_CHANGE, DASHES_CHANGE, DiacriticsMode, SYMBOL_CHANGE, SYMBOL_DROP,
    contains_bounded_word, remove_special_symbol, translate,
};

/// Words carrying no identifying information.
const SMALL_WORDS: &[&str] = &[
    "the", "and", "of", "for", "de", "et", "la", "aux", "a", "sur", "pour", "en", "l", "d", "le",
];

/// Unit prefixes often written glued to their number (`UMR5256`).
const MISSING_SPACE_ACRONYMS: &[&str] = &["fr", "fre", "ulr", "umr", "ums", "u", "upr", "ur"];

/// Set of lower-case words that must all occur, as bounded tokens, in an
/// address chunk for the chunk to name an institution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordSet(BTreeSet<String>);

impl WordSet {
    /// Builds a word-set from words used as-is.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks every word against a chunk already translated and lower-cased.
    /// An empty word-set never matches.
    pub fn matches(&self, chunk: &str) -> bool {
        !self.0.is_empty() && self.0.iter().all(|word| contains_bounded_word(chunk, word))
    }
}

/// Distinct words of a raw affiliation, in their order of appearance.
fn normalized_words(raw_affiliation: &str) -> Vec<String> {
    let text = remove_special_symbol(raw_affiliation, DiacriticsMode::Unicode);
    let text = unify_institution_words(&text).to_lowercase();
    let text = translate(&text, DASHES_CHANGE);
    let text = translate(&text, APOSTROPHE_CHANGE);
    let text = translate(&text, SYMBOL_CHANGE);
    let text = translate(&text, SYMBOL_DROP);

    let mut words: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

fn without_small_words(words: &[String]) -> Vec<String> {
    words
        .iter()
        .filter(|w| !SMALL_WORDS.contains(&w.as_str()))
        .cloned()
        .collect()
}

/// Significant words of a raw affiliation, in their order of appearance.
fn significant_words(raw_affiliation: &str) -> Vec<String> {
    without_small_words(&normalized_words(raw_affiliation))
}

/// Builds the word-sets of a normalized name from its raw affiliations.
///
/// Affiliations left without any significant word are skipped. An
/// affiliation of exactly two words, small words counted, containing a unit
/// acronym also yields the glued spelling, so that `UMR 5256` matches
/// `UMR5256` too.
///
/// # Example
///
/// ```
/// use affiliation_resolver::tables::{WordSet, build_word_sets};
///
/// let sets = build_word_sets(&["UMR 5256", "Univ. de Lyon"]);
/// assert_eq!(
///     sets,
///     vec![
///         WordSet::new(["umr", "5256"]),
///         WordSet::new(["umr5256"]),
///         WordSet::new(["university", "lyon"]),
///     ]
/// );
/// ```
pub fn build_word_sets(raw_affiliations: &[&str]) -> Vec<WordSet> {
    let mut word_sets = Vec::new();
    for raw_affiliation in raw_affiliations {
        let all_words = normalized_words(raw_affiliation);
        let words = without_small_words(&all_words);
        if words.is_empty() {
            continue;
        }
        let glued = (all_words.len() == 2
            && all_words
                .iter()
                .any(|w| MISSING_SPACE_ACRONYMS.contains(&w.as_str())))
        .then(|| all_words.concat());

        word_sets.push(WordSet::new(words));
        if let Some(glued) = glued {
            word_sets.push(WordSet::new([glued]));
        }
    }
    word_sets
}
