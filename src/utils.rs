use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// How diacritics are removed from address text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiacriticsMode {
    /// Canonical decomposition, then every non-ASCII character is dropped.
    AsciiOnly,
    /// Compatibility decomposition, then combining marks are dropped.
    /// Non-ASCII letters without a decomposition (`ß`, `ł`) survive.
    #[default]
    Unicode,
}

/// Dash variants unified to the hyphen-minus.
pub(crate) const DASHES_CHANGE: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
];

/// Quote variants unified to the ASCII apostrophe.
pub(crate) const APOSTROPHE_CHANGE: &[(char, &str)] = &[
    ('\u{201D}', "'"),
    ('\u{2019}', "'"),
    ('"', "'"),
    ('\u{201C}', "'"),
];

/// Symbols blanked out of a standardized address.
pub(crate) const SYMBOL_DROP: &[(char, &str)] = &[('\'', " "), ('*', " "), ('#', " "), ('|', " ")];

/// Symbols rewritten before an address chunk is matched against word-sets.
pub(crate) const SYMBOL_CHANGE: &[(char, &str)] = &[
    ('&', "and"),
    ('\u{2019}', "'"),
    ('.', ""),
    ('-', " "),
    ('§', " "),
    ('(', " "),
    (')', " "),
    ('/', " "),
    ('\'', " "),
];

/// Word rewrites applied to town names so that `Saint-Martin-lez-X` and
/// `St Martin les X` compare equal.
const TOWN_WORDS_CHANGE: &[(&str, &str)] = &[(" lez ", " les "), ("saint ", "st ")];

/// Removes diacritics from `text` according to `mode`.
///
/// # Arguments
///
/// * `text` - The text to clean
/// * `mode` - Whether non-ASCII characters are kept after decomposition
pub fn remove_special_symbol(text: &str, mode: DiacriticsMode) -> String {
    match mode {
        DiacriticsMode::AsciiOnly => text.nfd().filter(char::is_ascii).collect(),
        DiacriticsMode::Unicode => text.nfkd().filter(|c| !is_combining_mark(*c)).collect(),
    }
}

/// Applies a fixed character substitution table to `text`.
pub(crate) fn translate(text: &str, table: &[(char, &str)]) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match table.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => result.push_str(to),
            None => result.push(c),
        }
    }
    result
}

/// Rewrites hyphens and a few recurring words of a lower-cased town name.
pub fn rationalize_town_name(text: &str) -> String {
    let mut town = text.replace('-', " ");
    for (from, to) in TOWN_WORDS_CHANGE {
        town = town.replace(from, to);
    }
    town
}

/// Canonical form of a town name, used both for the town tables and for
/// the chunks compared against them.
pub(crate) fn canonical_town_name(text: &str) -> String {
    let town = rationalize_town_name(&text.to_lowercase());
    remove_special_symbol(&town, DiacriticsMode::Unicode)
        .trim()
        .to_string()
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Checks whether `word` occurs in `text` as a bounded token.
///
/// A token is bounded when it starts the text and ends on a word boundary,
/// or when it is preceded by whitespace and followed by whitespace, a closing
/// parenthesis or the end of the text.
///
/// Words never contain whitespace, so two bounded occurrences cannot overlap
/// and a non-overlapping search finds every one of them.
pub fn contains_bounded_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    text.match_indices(word).any(|(start, _)| {
        let after = text[start + word.len()..].chars().next();
        if start == 0 {
            let last_is_word = word.chars().next_back().is_some_and(is_word_char);
            return match after {
                Some(c) => last_is_word != is_word_char(c),
                None => last_is_word,
            };
        }
        let before_is_space = text[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        before_is_space && after.is_none_or(|c| c.is_whitespace() || c == ')')
    })
}

/// Parses a bracketed list cell such as `['f', 'fr']` or `[5, 6]`.
///
/// Quotes and surrounding whitespace are removed from every item; an empty
/// cell or `[]` gives an empty list.
pub fn parse_list_cell(cell: &str) -> Vec<String> {
    cell.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
