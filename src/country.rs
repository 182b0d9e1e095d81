//! Country-name normalization.
//!
//! The last token of an address names its country, in whatever spelling the
//! bibliographic database used. [`CountryNormalizer`] maps it onto a
//! canonical name of the [`CountryTable`] or onto [`UNKNOWN_COUNTRY`].

use crate::tables::CountryTable;

/// Canonical name given to addresses whose country cannot be recognized.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

enum AliasPattern {
    /// The token equals one of the spellings.
    Exact(&'static [&'static str]),
    /// The token contains one of the spellings.
    Contains(&'static [&'static str]),
}

struct CountryAlias {
    pattern: AliasPattern,
    canonical: &'static str,
}

const UNITED_KINGDOM_ALIASES: &[&str] = &["England", "Wales", "North Ireland", "Scotland"];

/// Evaluated in order; the first alias that applies wins.
const COUNTRY_ALIASES: &[CountryAlias] = &[
    CountryAlias {
        pattern: AliasPattern::Exact(UNITED_KINGDOM_ALIASES),
        canonical: "United Kingdom",
    },
    CountryAlias {
        pattern: AliasPattern::Contains(&["USA"]),
        canonical: "United States",
    },
    CountryAlias {
        pattern: AliasPattern::Contains(&["china", "China"]),
        canonical: "China",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&["Russia"]),
        canonical: "Russian Federation",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&["U Arab Emirates"]),
        canonical: "United Arab Emirates",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&["Vietnam"]),
        canonical: "Viet Nam",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&[
            "Palestine",
            "State of Palestine",
            "Palestinian Territory",
            "Palestinian Territories",
        ]),
        canonical: "Palestine",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&["FRANCE", "FR", "Fr"]),
        canonical: "France",
    },
    CountryAlias {
        pattern: AliasPattern::Exact(&["BELARUS", "BLR"]),
        canonical: "Belarus",
    },
];

impl CountryAlias {
    fn applies_to(&self, token: &str) -> bool {
        match self.pattern {
            AliasPattern::Exact(spellings) => spellings.contains(&token),
            AliasPattern::Contains(spellings) => spellings.iter().any(|s| token.contains(s)),
        }
    }
}

/// Maps country tokens onto canonical country names.
#[derive(Debug, Clone, Copy)]
pub struct CountryNormalizer<'a> {
    countries: &'a CountryTable,
}

impl<'a> CountryNormalizer<'a> {
    pub fn new(countries: &'a CountryTable) -> Self {
        Self { countries }
    }

    /// Returns the canonical country name of `token`, or [`UNKNOWN_COUNTRY`].
    ///
    /// A token that already is a canonical name (or the unknown sentinel)
    /// is returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use affiliation_resolver::country::CountryNormalizer;
    /// use affiliation_resolver::tables::{CountryRecord, CountryTable};
    ///
    /// let mut countries = CountryTable::default();
    /// countries.insert(CountryRecord::new("United Kingdom"));
    /// let normalizer = CountryNormalizer::new(&countries);
    ///
    /// assert_eq!(normalizer.normalize("Scotland"), "United Kingdom");
    /// assert_eq!(normalizer.normalize(" Atlantis "), "Unknown");
    /// ```
    pub fn normalize(&self, token: &str) -> String {
        let token = token.trim();
        if token == UNKNOWN_COUNTRY || self.countries.contains(token) {
            return token.to_string();
        }
        COUNTRY_ALIASES
            .iter()
            .find(|alias| alias.applies_to(token))
            .map_or(UNKNOWN_COUNTRY, |alias| alias.canonical)
            .to_string()
    }

    /// Whether `token` is one of the alternative spellings that stand for a
    /// country on their own, such as `Scotland` or `BLR`.
    pub fn is_alias(token: &str) -> bool {
        let token = token.trim();
        COUNTRY_ALIASES.iter().any(|alias| match alias.pattern {
            AliasPattern::Exact(spellings) => spellings.contains(&token),
            AliasPattern::Contains(_) => false,
        })
    }

    pub fn countries(&self) -> &'a CountryTable {
        self.countries
    }
}
