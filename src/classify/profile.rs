//! Per-country detection capabilities.
//!
//! Countries differ in how their addresses are written: French addresses
//! carry unit codes such as `UMR5256`, British and North American postcodes
//! have their own shapes, and most other countries use a letter prefix
//! followed by a fixed number of digits. A [`CountryCapabilities`] value
//! records which detectors apply; [`CountryProfile`] holds its compiled form.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;
use crate::regex::{Regex, escape};
use crate::tables::CountryRecord;

/// Postcode layouts that the zip-code template cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostcodeShape {
    /// `SW7 2AZ`, `EH9 3FJ`
    UnitedKingdom,
    /// `CA`, `ON K1A 0B1`
    NorthAmerica,
}

/// Which keep flags rescue a chunk that contains digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitRescue {
    /// A unit prefix or any keep word rescues the chunk.
    AnyKeepFlag,
    /// Only a general or user keep word rescues the chunk, and not when a
    /// drop word is also present.
    #[default]
    InstitutionalKeepFlag,
}

/// Detection capabilities of a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCapabilities {
    /// Postcode layout replacing the zip-code template.
    pub postcode: Option<PostcodeShape>,
    /// Unit prefixes (`UMR`, `EA`, `U`...) count as keep flags and suppress
    /// digit detection.
    pub keep_prefixes: bool,
    /// Basic keep words (`umr`, `equipe`, `crg`...) count as keep flags.
    pub basic_keep_words: bool,
    /// Only the French drop-word list is used.
    pub french_drop_words_only: bool,
    pub digit_rescue: DigitRescue,
}

impl Default for CountryCapabilities {
    fn default() -> Self {
        Self {
            postcode: None,
            keep_prefixes: false,
            basic_keep_words: false,
            french_drop_words_only: false,
            digit_rescue: DigitRescue::InstitutionalKeepFlag,
        }
    }
}

impl CountryCapabilities {
    pub fn france() -> Self {
        Self {
            postcode: None,
            keep_prefixes: true,
            basic_keep_words: true,
            french_drop_words_only: true,
            digit_rescue: DigitRescue::AnyKeepFlag,
        }
    }

    pub fn algeria() -> Self {
        Self {
            digit_rescue: DigitRescue::AnyKeepFlag,
            ..Self::default()
        }
    }

    pub fn with_postcode(shape: PostcodeShape) -> Self {
        Self {
            postcode: Some(shape),
            ..Self::default()
        }
    }
}

/// Capabilities of the countries that depart from the default.
pub fn default_capabilities() -> HashMap<String, CountryCapabilities> {
    HashMap::from([
        ("France".to_string(), CountryCapabilities::france()),
        ("Algeria".to_string(), CountryCapabilities::algeria()),
        (
            "United Kingdom".to_string(),
            CountryCapabilities::with_postcode(PostcodeShape::UnitedKingdom),
        ),
        (
            "United States".to_string(),
            CountryCapabilities::with_postcode(PostcodeShape::NorthAmerica),
        ),
        (
            "Canada".to_string(),
            CountryCapabilities::with_postcode(PostcodeShape::NorthAmerica),
        ),
    ])
}

/// How zip codes are recognized in a country.
#[derive(Debug, Clone)]
pub(crate) enum ZipRule {
    Shape(PostcodeShape),
    /// One pattern per digit count of the countries table.
    Template(Vec<Regex>),
    /// No zip-code layout is known; only the generic digit patterns apply.
    DigitsOnly,
    /// The country is unknown to both the capabilities and the table.
    Disabled,
}

/// Compiled capabilities of one country.
#[derive(Debug, Clone)]
pub(crate) struct CountryProfile {
    pub(crate) capabilities: CountryCapabilities,
    pub(crate) zip: ZipRule,
}

impl CountryProfile {
    /// Profile of a country that neither the capabilities nor the countries
    /// table know.
    pub(crate) fn unknown() -> Self {
        Self {
            capabilities: CountryCapabilities::default(),
            zip: ZipRule::Disabled,
        }
    }

    pub(crate) fn compile(
        capabilities: CountryCapabilities,
        record: Option<&CountryRecord>,
    ) -> Result<Self> {
        let zip = match (capabilities.postcode, record) {
            (Some(shape), _) => ZipRule::Shape(shape),
            (None, Some(record)) if !record.zip_digits.is_empty() => {
                ZipRule::Template(zip_templates(record)?)
            }
            (None, _) => ZipRule::DigitsOnly,
        };
        Ok(Self { capabilities, zip })
    }
}

/// Builds `\b(?:f|fr)[\s-]?\d{5}\b`-like patterns from a countries-table row.
fn zip_templates(record: &CountryRecord) -> Result<Vec<Regex>> {
    let letters: Vec<String> = record
        .zip_letters
        .iter()
        .filter(|letters| !letters.is_empty())
        .map(|letters| escape(&letters.to_lowercase()))
        .collect();
    let prefix = if letters.is_empty() {
        String::new()
    } else {
        format!("(?:{})", letters.join("|"))
    };

    record
        .zip_digits
        .iter()
        .map(|digits| {
            let pattern = format!(r"\b{prefix}[\s-]?\d{{{digits}}}\b");
            Regex::new(&pattern).map_err(|e| {
                crate::AffiliationError::InvalidPattern(format!("{}: {e}", record.name))
            })
        })
        .collect()
}
