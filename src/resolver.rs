//! Address resolution pipeline.
//!
//! [`AddressInstitutionResolver`] chains the four stages of a resolution:
//!
//! 1. [`AddressStandardizer`] cleans the raw address,
//! 2. [`ChunkSplitter`] extracts the country and the candidate chunks,
//! 3. [`ChunkClassifier`] keeps the chunks that name institutions,
//! 4. [`AffiliationMatcher`] maps kept chunks onto normalized names.
//!
//! # Example
//!
//! ```
//! use affiliation_resolver::resolver::AddressInstitutionResolver;
//! use affiliation_resolver::tables::{CountryRecord, ReferenceTables};
//!
//! let mut tables = ReferenceTables::default();
//! tables.countries.insert(CountryRecord::new("France").with_zip_code(&["f"], &[5]));
//! tables.institution_types.insert("Nro", 1).insert("Rto", 2);
//! tables.affiliations
//!     .insert("France", "CEA Nro", &["CEA"])
//!     .insert("France", "LITEN Rto", &["LITEN"]);
//!
//! let resolver = AddressInstitutionResolver::new(&tables).unwrap();
//! let resolved = resolver.resolve(
//!     "CEA, LITEN Solar & Thermodynam Syst Lab L2ST, F-38054 Grenoble, France",
//! );
//! assert_eq!(resolved.country, "France");
//! assert_eq!(resolved.institutions, vec!["CEA Nro", "LITEN Rto"]);
//! assert!(resolved.raw_fragments.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::chunks::{AddressChunk, ChunkSplitter};
use crate::classify::{ChunkClassifier, ClassifierConfig};
use crate::matcher::{AffiliationMatcher, ChunkMatch};
use crate::standardize::{AddressStandardizer, StandardizerConfig};
use crate::tables::ReferenceTables;
use crate::{ResolvedAddress, Result};

/// Options of [`AddressInstitutionResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Whether chunks looking like street addresses, postcodes or towns are
    /// dropped before matching. When disabled every chunk is matched.
    pub drop_heuristics: bool,
    pub standardizer: StandardizerConfig,
    pub classifier: ClassifierConfig,
    /// Whether [`AddressInstitutionResolver::resolve_all`] spreads addresses
    /// over the rayon thread pool. Requires the `parallel` feature.
    pub run_in_parallel: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            drop_heuristics: true,
            standardizer: StandardizerConfig::default(),
            classifier: ClassifierConfig::default(),
            run_in_parallel: false,
        }
    }
}

/// Every intermediate result of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTrace {
    pub standardized: String,
    pub country: String,
    /// Candidate chunks with their keep/drop decision
    pub chunks: Vec<AddressChunk>,
    /// Normalized names matched by each kept chunk
    pub matches: Vec<ChunkMatch>,
    pub institutions: Vec<String>,
    pub raw_fragments: Vec<String>,
}

impl From<ResolutionTrace> for ResolvedAddress {
    fn from(trace: ResolutionTrace) -> Self {
        Self {
            country: trace.country,
            institutions: trace.institutions,
            raw_fragments: trace.raw_fragments,
        }
    }
}

/// Resolves addresses against a set of validated reference tables.
///
/// The resolver only reads the tables and holds no mutable state, so it can
/// be shared between threads.
#[derive(Debug, Clone)]
pub struct AddressInstitutionResolver<'a> {
    standardizer: AddressStandardizer<'a>,
    splitter: ChunkSplitter<'a>,
    classifier: ChunkClassifier<'a>,
    matcher: AffiliationMatcher<'a>,
    config: ResolverConfig,
}

impl<'a> AddressInstitutionResolver<'a> {
    /// Creates a resolver with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`AddressInstitutionResolver::with_config`].
    pub fn new(tables: &'a ReferenceTables) -> Result<Self> {
        Self::with_config(tables, ResolverConfig::default())
    }

    /// Creates a resolver after validating `tables`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AffiliationError::InconsistentInstitutionTypes`] when
    /// a normalized name uses a type abbreviation missing from the type
    /// table, and [`crate::AffiliationError::InvalidPattern`] when a user keep
    /// word or zip-code template does not compile.
    pub fn with_config(tables: &'a ReferenceTables, config: ResolverConfig) -> Result<Self> {
        tables.validate()?;
        Ok(Self {
            standardizer: AddressStandardizer::new(&tables.countries)
                .with_config(config.standardizer.clone()),
            splitter: ChunkSplitter::new(&tables.countries),
            classifier: ChunkClassifier::new(&tables.countries, &tables.towns, &config.classifier)?,
            matcher: AffiliationMatcher::new(&tables.affiliations, &tables.institution_types),
            config,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Runs the pipeline on `raw` and returns every intermediate result.
    pub fn trace(&self, raw: &str) -> ResolutionTrace {
        let standardized = self.standardizer.standardize(raw);
        let split = self.splitter.split(&standardized);
        let chunks = if self.config.drop_heuristics {
            self.classifier.classify(&split)
        } else {
            ChunkClassifier::keep_all(&split)
        };

        let kept: Vec<&str> = chunks
            .iter()
            .filter(|chunk| chunk.decision.is_keep())
            .map(|chunk| chunk.text.as_str())
            .collect();
        let outcome = self.matcher.match_chunks(&split.country, &kept);

        tracing::debug!(
            address = %raw,
            country = %split.country,
            chunks = chunks.len(),
            kept = kept.len(),
            institutions = outcome.institutions.len(),
            "Address resolved"
        );

        ResolutionTrace {
            standardized,
            country: split.country,
            chunks,
            matches: outcome.matches,
            institutions: outcome.institutions,
            raw_fragments: outcome.unmatched,
        }
    }

    /// Resolves the country and institutions of one address.
    pub fn resolve(&self, raw: &str) -> ResolvedAddress {
        self.trace(raw).into()
    }

    /// Resolves a batch of addresses, preserving their order.
    pub fn resolve_all(&self, addresses: &[&str]) -> Vec<ResolvedAddress> {
        #[cfg(feature = "parallel")]
        if self.config.run_in_parallel {
            use rayon::prelude::*;

            return addresses
                .par_iter()
                .map(|address| self.resolve(address))
                .collect();
        }

        addresses
            .iter()
            .map(|address| self.resolve(address))
            .collect()
    }
}

/// Resolves one address with the default configuration.
///
/// Builds a resolver on every call; prefer [`AddressInstitutionResolver`]
/// when resolving many addresses.
///
/// # Errors
///
/// Returns the errors of [`AddressInstitutionResolver::with_config`].
pub fn resolve(
    raw: &str,
    tables: &ReferenceTables,
    drop_heuristics: bool,
) -> Result<ResolvedAddress> {
    let config = ResolverConfig {
        drop_heuristics,
        ..ResolverConfig::default()
    };
    Ok(AddressInstitutionResolver::with_config(tables, config)?.resolve(raw))
}
