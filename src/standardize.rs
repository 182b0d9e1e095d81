//! Address standardization.
//!
//! Cleans the textual noise out of a raw affiliation address so that every
//! later stage works on one canonical spelling:
//!
//! 1. diacritics are removed,
//! 2. abbreviated institutional words (`Univ.`, `Lab`, `Dept`, `Inst.`) are
//!    expanded to `University`, `Laboratory`, `Department`, `Institute`...
//! 3. dash and apostrophe variants are unified and noisy symbols blanked,
//! 4. the trailing country token is replaced by its canonical name.
//!
//! Standardizing an already standardized address returns it unchanged.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::country::{CountryNormalizer, UNKNOWN_COUNTRY};
use crate::regex::Regex;
use crate::tables::CountryTable;
use crate::utils::{
    APOSTROPHE_CHANGE, DASHES_CHANGE, DiacriticsMode, SYMBOL_DROP, remove_special_symbol,
    translate,
};

/// Canonical institutional words, in the order their aliases are applied.
pub(crate) const INSTITUTIONAL_WORDS: &[&str] = &[
    "University",
    "Laboratory",
    "Center",
    "Department",
    "Institute",
    "Faculty",
    "School",
];

static WORD_ALIASES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let patterns = [
        r"\b[a-z]?Univ[aàäcdeéirstyz]{0,8}\b\.?",
        r"'?\bLab\b\.?|'?\bLabor[aeimorstuy]{0,7}\b\.?",
        r"\b[CZ]ent[erum]{1,3}\b\.?",
        r"\bD[eé]p[artemnot]{0,9}\b\.?",
        r"\bInst[ituteosky]{0,7}\b\.?|\bIstituto\b",
        r"\bFac[lutey]{0,4}\b\.?",
        r"\bSch[ol]{0,3}\b\.?",
    ];
    INSTITUTIONAL_WORDS
        .iter()
        .zip(patterns)
        .map(|(word, pattern)| (*word, Regex::new(pattern).unwrap()))
        .collect()
});

static MULTIPLE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s,").unwrap());

/// Collapses whitespace runs, glues commas to the preceding word and trims.
fn tidy_spacing(text: &str) -> String {
    let text = MULTIPLE_SPACES.replace_all(text, " ");
    SPACE_BEFORE_COMMA
        .replace_all(&text, ",")
        .trim()
        .to_string()
}

/// Expands the abbreviated spellings of institutional words.
///
/// Each alias is replaced by the canonical word followed by a space, then
/// spacing is tidied.
pub(crate) fn unify_institution_words(text: &str) -> String {
    let mut text = text.to_string();
    for (word, alias) in WORD_ALIASES.iter() {
        let replacement = format!("{word} ");
        text = alias.replace_all(&text, replacement.as_str()).into_owned();
    }
    tidy_spacing(&text)
}

/// Options of [`AddressStandardizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizerConfig {
    /// How diacritics are removed.
    pub diacritics: DiacriticsMode,
    /// Whether `, Unknown` is appended to addresses whose country token is
    /// not recognized. When disabled such addresses keep their last token.
    pub append_unknown_country: bool,
}

impl Default for StandardizerConfig {
    fn default() -> Self {
        Self {
            diacritics: DiacriticsMode::default(),
            append_unknown_country: true,
        }
    }
}

/// Rewrites raw addresses into their standardized form.
#[derive(Debug, Clone)]
pub struct AddressStandardizer<'a> {
    normalizer: CountryNormalizer<'a>,
    config: StandardizerConfig,
}

impl<'a> AddressStandardizer<'a> {
    pub fn new(countries: &'a CountryTable) -> Self {
        Self {
            normalizer: CountryNormalizer::new(countries),
            config: StandardizerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: StandardizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Standardizes a raw address.
    ///
    /// # Example
    ///
    /// ```
    /// use affiliation_resolver::standardize::AddressStandardizer;
    /// use affiliation_resolver::tables::{CountryRecord, CountryTable};
    ///
    /// let mut countries = CountryTable::default();
    /// countries.insert(CountryRecord::new("France"));
    /// let standardizer = AddressStandardizer::new(&countries);
    ///
    /// assert_eq!(
    ///     standardizer.standardize("Univ. Grenoble Alpes, Lab. LEPMI ,FRANCE"),
    ///     "University Grenoble Alpes, Laboratory LEPMI, France"
    /// );
    /// ```
    pub fn standardize(&self, raw: &str) -> String {
        let text = remove_special_symbol(raw, self.config.diacritics);
        let text = unify_institution_words(&text);
        let text = translate(&text, DASHES_CHANGE);
        let text = translate(&text, APOSTROPHE_CHANGE);
        let text = translate(&text, SYMBOL_DROP);
        self.canonicalize_country(&tidy_spacing(&text))
    }

    fn canonicalize_country(&self, text: &str) -> String {
        let mut chunks: Vec<&str> = text.split(',').collect();
        let token = chunks
            .last()
            .and_then(|chunk| chunk.rsplit(" - ").next())
            .unwrap_or_default()
            .trim();
        let country = self.normalizer.normalize(token);

        if country != UNKNOWN_COUNTRY || token == UNKNOWN_COUNTRY {
            chunks.pop();
        } else if !self.config.append_unknown_country {
            return text.to_string();
        }
        let country = format!(" {country}");
        chunks.push(&country);
        chunks.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::reference_tables;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unify_institution_words() {
        let cases = vec![
            ("Univ. Lyon", "University Lyon"),
            ("Universite de Lyon", "University de Lyon"),
            ("Lab LEPMI", "Laboratory LEPMI"),
            ("Laboratoire de Physique", "Laboratory de Physique"),
            ("Ctr. Energy", "Ctr. Energy"),
            ("Centre Energie", "Center Energie"),
            ("Dept. Chem", "Department Chem"),
            ("Dep. Chem", "Department Chem"),
            ("Departement Chimie", "Department Chimie"),
            ("Inst. Neel", "Institute Neel"),
            ("Istituto Italiano", "Institute Italiano"),
            ("Fac Sci", "Faculty Sci"),
            ("Sch. Engn", "School Engn"),
            ("Labex Science", "Labex Science"),
        ];

        for (input, expected) in cases {
            assert_eq!(unify_institution_words(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_standardize_known_country() {
        let tables = reference_tables();
        let standardizer = AddressStandardizer::new(&tables.countries);

        assert_eq!(
            standardizer.standardize(
                "CEA, LITEN Solar & Thermodynam Syst Lab L2ST, F-38054 Grenoble, France"
            ),
            "CEA, LITEN Solar & Thermodynam Syst Laboratory L2ST, F-38054 Grenoble, France"
        );
        assert_eq!(
            standardizer.standardize("Lund Univ, Dept Phys Geog, S-22362 Lund, Sweden"),
            "Lund University, Department Phys Geog, S-22362 Lund, Sweden"
        );
        assert_eq!(
            standardizer.standardize("Univ Edinburgh, Sch Chem, Edinburgh, Scotland"),
            "University Edinburgh, School Chem, Edinburgh, United Kingdom"
        );
    }

    #[test]
    fn test_standardize_symbols() {
        let tables = reference_tables();
        let standardizer = AddressStandardizer::new(&tables.countries);

        assert_eq!(
            standardizer.standardize("Équipe d\u{2019}Optique | ILM\u{2013}CNRS ,France"),
            "Equipe d Optique ILM-CNRS, France"
        );
    }

    #[test]
    fn test_standardize_country_after_dash() {
        let tables = reference_tables();
        let standardizer = AddressStandardizer::new(&tables.countries);

        assert_eq!(
            standardizer.standardize("Lund University, Lund - Sweden"),
            "Lund University, Sweden"
        );
    }

    #[test]
    fn test_standardize_unknown_country() {
        let tables = reference_tables();
        let standardizer = AddressStandardizer::new(&tables.countries);
        assert_eq!(
            standardizer.standardize("Atlantis Inst, Poseidonia"),
            "Atlantis Institute, Poseidonia, Unknown"
        );

        let standardizer = AddressStandardizer::new(&tables.countries).with_config(
            StandardizerConfig {
                append_unknown_country: false,
                ..StandardizerConfig::default()
            },
        );
        assert_eq!(
            standardizer.standardize("Atlantis Inst, Poseidonia"),
            "Atlantis Institute, Poseidonia"
        );
    }

    #[test]
    fn test_standardize_is_idempotent() {
        let tables = reference_tables();
        let standardizer = AddressStandardizer::new(&tables.countries);
        let addresses = vec![
            "CEA, LITEN Solar & Thermodynam Syst Lab L2ST, F-38054 Grenoble, France",
            "Lund Univ, Dept Phys Geog & Ecosyst Sci, S-22362 Lund, Sweden",
            "Univ. Paris * Cité , Lab.  MSC | UMR 7057, 75013 Paris, FRANCE",
            "Atlantis Inst, Poseidonia",
            "Poseidonia, Unknown",
            "Stanford Univ, Stanford, CA 94305 USA",
            "",
        ];

        for address in addresses {
            let once = standardizer.standardize(address);
            assert_eq!(standardizer.standardize(&once), once, "address: {address}");
        }
    }
}
