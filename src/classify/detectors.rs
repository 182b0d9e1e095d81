//! Pattern detectors run on every address chunk.
//!
//! Each detector raises one flag of [`Detections`]. Drop flags mark chunks
//! that look like street addresses, postcodes or towns; keep flags mark
//! chunks that name an institution.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::profile::{CountryProfile, PostcodeShape, ZipRule};
use crate::regex::{Regex, escape};
use crate::standardize::INSTITUTIONAL_WORDS;
use crate::tables::TownsPerCountry;
use crate::utils::{DiacriticsMode, canonical_town_name, remove_special_symbol};
use crate::{AffiliationError, Result};

/// Street and building words of French addresses.
const FR_DROP_WORDS: &[&str] = &[
    "allee", "antenne", "av", "av.", "ave", "avenue", "ba", "bat", "bat.", "batiment", "blv.",
    "blvd", "boulevard", "campus", "cedex", "ch.", "chemin", "complexe", "cours", "cs",
    "domaine", "esplanade", "foret", "immeuble", "montee", "no.", "p", "p°", "parcelle",
    "parvis", "pl", "pl.", "place", "parc", "plan", "pole", "quai", "r", "r.", "region",
    "route", "rue", "site", "v.", "via", "villa", "voie", "zac", "zi", "z.i.", "zone",
];

/// Street and building words of the other countries, used together with
/// [`FR_DROP_WORDS`].
const GENERIC_DROP_WORDS: &[&str] = &[
    "alle", "alleen", "area", "avda", "avda.", "bd", "bldg", "box", "bp", "building", "c",
    "calla", "calle", "camino", "carrera", "carretera", "cesta", "cho", "circuito", "city",
    "ciudad", "complejo", "corso", "country", "ctra", "cubillos", "district", "edificio",
    "east", "esplanade", "estrada", "floor", "jardim", "jardins", "km", "ku", "lane", "largo",
    "linder", "mall", "marg", "p.", "p.le", "p.o.box", "parcella", "passeig", "pk", "playa",
    "plaza", "parc", "park", "parque", "piazza", "piazzale", "po", "pob", "pola", "pza",
    "pzza", "rambla", "rd", "rua", "road", "sec.", "sc", "s-n", "s/n", "sp", "st", "st.",
    "strada", "street", "str", "str.", "tietotie", "vei", "veien", "vej", "via", "viale",
    "vialle", "voc.", "w", "way", "west", "zona",
];

/// Endings of street and district names (`Helmholtzstrasse`, `Minato-ku`).
const GEOGRAPHIC_SUFFIXES: &[&str] = &[
    "campus", "laan", "park", "platz", "staal", "strae", "strasse", "straße", "vej",
    "waldring", "weg", "schule", "-ku", "-cho", "-ken", "-shi", "-gun", "alleen", "vagen",
    "vei", "-gu", "-do", "-si", "shire",
];

/// Abbreviations of French research units.
const BASIC_KEEP_WORDS: &[&str] = &[
    "beamline", "crg", "ea", "ed", "equipe", "ulr", "umr", "ums", "upr",
];

/// Unit codes written glued to their number (`UMR5256`).
const KEEP_PREFIXES: &[&str] = &["ea", "fr", "u", "ulr", "umr", "ums", "upr"];

/// Organization names that identify an institution on their own.
pub const DEFAULT_USER_KEEP_WORDS: &[&str] = &[
    "CEA",
    "CEMHTI",
    "CNRS",
    "ESRF",
    "FEMTO ST",
    "IMEC",
    "INES",
    "INSA",
    "INSERM",
    "IRCELYON",
    "KU Leuven",
    "LaMCoS",
    "LEPMI",
    "LITEN",
    "LOCIE",
    "spLine",
    "STMicroelectronics",
    "TNO",
    "UMI",
    "VTT",
];

fn alternation(words: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    words
        .into_iter()
        .map(|word| escape(word.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

fn drop_words_pattern(words: &[&str]) -> String {
    let words = alternation(words);
    format!(r"[\s(](?:{words})[\s)]|\s(?:{words})$|^(?:{words})\b")
}

fn whole_words_pattern(words: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    format!(r"\b(?:{})\b", alternation(words))
}

static POSTAL_BOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbp\s?\d+[a-z]?\b|\b\d+bp\b").unwrap());

static UK_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s?[a-z]{1,2}\d{1,2}[a-z]{0,1}\s?\d{1,2}[a-z]{1,2}$").unwrap()
});

static NORTH_AMERICA_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s?[a-z]{2}$|^\s?[a-z]{2}\s[a-z0-9]{3,4}\s[a-z0-9]{2,3}$").unwrap()
});

static GENERIC_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?\d+(-\d+)?\b|\b[a-z]+(-)?\d{2,}\b").unwrap());

/// A unit code such as `umr-5256` suppresses digit detection.
static PREFIXED_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})-?\d{{4}}\b", alternation(KEEP_PREFIXES))).unwrap()
});

static KEEP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\d{{3,4}}\b", alternation(KEEP_PREFIXES))).unwrap()
});

static GEOGRAPHIC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:{})\b", alternation(GEOGRAPHIC_SUFFIXES))).unwrap()
});

static FR_DROP_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&drop_words_pattern(FR_DROP_WORDS)).unwrap());

static GENERIC_DROP_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&drop_words_pattern(GENERIC_DROP_WORDS)).unwrap());

static GENERAL_KEEP_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&whole_words_pattern(
        INSTITUTIONAL_WORDS.iter().map(|word| word.to_lowercase()),
    ))
    .unwrap()
});

static BASIC_KEEP_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&whole_words_pattern(BASIC_KEEP_WORDS)).unwrap());

/// Flags raised on one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detections {
    pub postal_box: bool,
    /// Zip code or other digit code
    pub zip_code: bool,
    pub geographic_suffix: bool,
    pub known_town: bool,
    pub drop_word: bool,
    pub keep_prefix: bool,
    pub general_keep_word: bool,
    pub basic_keep_word: bool,
    pub user_keep_word: bool,
}

impl Detections {
    pub fn any_drop_flag(&self) -> bool {
        self.postal_box || self.zip_code || self.geographic_suffix || self.known_town || self.drop_word
    }

    /// A unit prefix or a keep word of any tier.
    pub fn any_keep_flag(&self) -> bool {
        self.keep_prefix || self.any_keep_word()
    }

    /// A keep word of any tier.
    pub fn any_keep_word(&self) -> bool {
        self.general_keep_word || self.basic_keep_word || self.user_keep_word
    }

    /// A general or user keep word.
    pub fn institutional_keep_word(&self) -> bool {
        self.general_keep_word || self.user_keep_word
    }
}

/// Runs the detectors with a given user keep-word list.
#[derive(Debug, Clone)]
pub(crate) struct Detectors {
    user_keep_words: Option<Regex>,
}

impl Detectors {
    pub(crate) fn new(user_keep_words: &[String]) -> Result<Self> {
        let words: Vec<String> = user_keep_words
            .iter()
            .map(|word| remove_special_symbol(word.trim(), DiacriticsMode::Unicode).to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        let user_keep_words = if words.is_empty() {
            None
        } else {
            let pattern = whole_words_pattern(&words);
            Some(Regex::new(&pattern).map_err(|e| AffiliationError::InvalidPattern(e.to_string()))?)
        };
        Ok(Self { user_keep_words })
    }

    pub(crate) fn detect(
        &self,
        chunk: &str,
        country: &str,
        profile: &CountryProfile,
        towns: &TownsPerCountry,
    ) -> Detections {
        let text = remove_special_symbol(chunk, DiacriticsMode::Unicode).to_lowercase();
        let capabilities = &profile.capabilities;

        let drop_word = if capabilities.french_drop_words_only {
            FR_DROP_WORD.is_match(&text)
        } else {
            FR_DROP_WORD.is_match(&text) || GENERIC_DROP_WORD.is_match(&text)
        };

        Detections {
            postal_box: POSTAL_BOX.is_match(&text),
            zip_code: detect_zip_code(&text, profile),
            geographic_suffix: GEOGRAPHIC_SUFFIX.is_match(&text),
            known_town: towns.contains(country, &canonical_town_name(chunk)),
            drop_word,
            keep_prefix: capabilities.keep_prefixes && KEEP_PREFIX.is_match(&text),
            general_keep_word: GENERAL_KEEP_WORD.is_match(&text),
            basic_keep_word: capabilities.basic_keep_words && BASIC_KEEP_WORD.is_match(&text),
            user_keep_word: self
                .user_keep_words
                .as_ref()
                .is_some_and(|words| words.is_match(&text)),
        }
    }
}

/// Zip codes and other digit codes, unless a unit code explains the digits.
fn detect_zip_code(text: &str, profile: &CountryProfile) -> bool {
    let zip = match &profile.zip {
        ZipRule::Disabled => return false,
        ZipRule::Shape(PostcodeShape::UnitedKingdom) => UK_POSTCODE.is_match(text),
        ZipRule::Shape(PostcodeShape::NorthAmerica) => NORTH_AMERICA_POSTCODE.is_match(text),
        ZipRule::Template(patterns) => patterns.iter().any(|pattern| pattern.is_match(text)),
        ZipRule::DigitsOnly => false,
    };
    if profile.capabilities.keep_prefixes && PREFIXED_DIGITS.is_match(text) {
        return false;
    }
    zip || GENERIC_DIGITS.is_match(text)
}
