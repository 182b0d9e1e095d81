//! Decision table turning the flags of a chunk into a verdict.
//!
//! Rules are evaluated in order. A rule that keeps the chunk hands over to
//! the next applicable rule; a rule that drops the chunk ends the
//! evaluation. A chunk without any drop flag is kept.

use super::detectors::Detections;
use super::profile::{CountryCapabilities, DigitRescue};
use crate::chunks::DropReason;

/// Outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Keep,
    /// Drops this chunk only; the following chunks are still classified.
    DropChunk,
    /// Drops this chunk and every remaining chunk of the address.
    DropRun,
}

/// Final decision for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Keep,
    DropChunk(DropReason),
    DropRun(DropReason),
}

struct Rule {
    reason: DropReason,
    applies: fn(&Detections) -> bool,
    resolve: fn(&Detections, &CountryCapabilities, usize) -> Verdict,
}

const RULES: &[Rule] = &[
    Rule {
        reason: DropReason::PostalBox,
        applies: |d| d.postal_box,
        resolve: |_, _, _| Verdict::DropRun,
    },
    Rule {
        reason: DropReason::ZipCode,
        applies: |d| d.zip_code,
        resolve: resolve_zip_code,
    },
    Rule {
        reason: DropReason::KnownTown,
        applies: |d| d.known_town,
        resolve: resolve_known_town,
    },
    Rule {
        reason: DropReason::GeographicSuffix,
        applies: |d| d.geographic_suffix && !d.known_town,
        resolve: resolve_geographic_suffix,
    },
    Rule {
        reason: DropReason::DropWord,
        applies: |d| d.drop_word && !d.known_town,
        resolve: resolve_drop_word,
    },
];

fn resolve_zip_code(d: &Detections, capabilities: &CountryCapabilities, _: usize) -> Verdict {
    let rescued = match capabilities.digit_rescue {
        DigitRescue::AnyKeepFlag => d.any_keep_flag(),
        DigitRescue::InstitutionalKeepFlag => d.institutional_keep_word() && !d.drop_word,
    };
    if rescued { Verdict::Keep } else { Verdict::DropRun }
}

/// A town closing the address takes the rest of the run with it; a town in
/// the middle of a longer run is dropped alone.
fn resolve_known_town(_: &Detections, _: &CountryCapabilities, remaining: usize) -> Verdict {
    if remaining <= 2 {
        Verdict::DropRun
    } else {
        Verdict::DropChunk
    }
}

fn resolve_geographic_suffix(d: &Detections, _: &CountryCapabilities, _: usize) -> Verdict {
    if d.institutional_keep_word() {
        Verdict::Keep
    } else {
        Verdict::DropRun
    }
}

/// Only keep words rescue a drop word; a unit prefix such as `UMR5256` does not.
fn resolve_drop_word(d: &Detections, _: &CountryCapabilities, _: usize) -> Verdict {
    if d.any_keep_word() && !d.zip_code {
        Verdict::Keep
    } else {
        Verdict::DropRun
    }
}

/// Evaluates the decision table for one chunk.
///
/// `remaining` counts the candidate chunks from this one to the end of the
/// address, this one included.
pub(crate) fn evaluate(
    detections: &Detections,
    capabilities: &CountryCapabilities,
    remaining: usize,
) -> Outcome {
    if !detections.any_drop_flag() {
        return Outcome::Keep;
    }
    for rule in RULES.iter().filter(|rule| (rule.applies)(detections)) {
        match (rule.resolve)(detections, capabilities, remaining) {
            Verdict::Keep => {}
            Verdict::DropChunk => return Outcome::DropChunk(rule.reason),
            Verdict::DropRun => return Outcome::DropRun(rule.reason),
        }
    }
    Outcome::Keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(set: impl FnOnce(&mut Detections)) -> Detections {
        let mut detections = Detections::default();
        set(&mut detections);
        detections
    }

    #[test]
    fn test_no_drop_flag_keeps() {
        let d = flags(|d| d.user_keep_word = true);
        assert_eq!(evaluate(&d, &CountryCapabilities::default(), 1), Outcome::Keep);
    }

    #[test]
    fn test_postal_box_drops_run() {
        let d = flags(|d| {
            d.postal_box = true;
            d.general_keep_word = true;
        });
        assert_eq!(
            evaluate(&d, &CountryCapabilities::france(), 3),
            Outcome::DropRun(DropReason::PostalBox)
        );
    }

    #[test]
    fn test_zip_code_rescue() {
        let france = CountryCapabilities::france();
        let other = CountryCapabilities::default();

        let basic = flags(|d| {
            d.zip_code = true;
            d.basic_keep_word = true;
        });
        assert_eq!(evaluate(&basic, &france, 2), Outcome::Keep);
        assert_eq!(evaluate(&basic, &other, 2), Outcome::DropRun(DropReason::ZipCode));

        let general = flags(|d| {
            d.zip_code = true;
            d.general_keep_word = true;
        });
        assert_eq!(evaluate(&general, &other, 2), Outcome::Keep);

        let general_with_drop_word = flags(|d| {
            d.zip_code = true;
            d.general_keep_word = true;
            d.drop_word = true;
        });
        assert_eq!(
            evaluate(&general_with_drop_word, &other, 2),
            Outcome::DropRun(DropReason::ZipCode)
        );

        let bare = flags(|d| d.zip_code = true);
        assert_eq!(evaluate(&bare, &france, 1), Outcome::DropRun(DropReason::ZipCode));
        assert_eq!(
            evaluate(&bare, &CountryCapabilities::algeria(), 1),
            Outcome::DropRun(DropReason::ZipCode)
        );
    }

    #[test]
    fn test_zip_code_kept_then_drop_word_retracts() {
        let d = flags(|d| {
            d.zip_code = true;
            d.keep_prefix = true;
            d.drop_word = true;
        });
        assert_eq!(
            evaluate(&d, &CountryCapabilities::france(), 4),
            Outcome::DropRun(DropReason::DropWord)
        );
    }

    #[test]
    fn test_known_town() {
        let d = flags(|d| {
            d.known_town = true;
            d.drop_word = true;
            d.geographic_suffix = true;
        });
        let capabilities = CountryCapabilities::default();
        assert_eq!(evaluate(&d, &capabilities, 1), Outcome::DropRun(DropReason::KnownTown));
        assert_eq!(evaluate(&d, &capabilities, 2), Outcome::DropRun(DropReason::KnownTown));
        assert_eq!(evaluate(&d, &capabilities, 3), Outcome::DropChunk(DropReason::KnownTown));
    }

    #[test]
    fn test_geographic_suffix() {
        let capabilities = CountryCapabilities::default();
        let kept = flags(|d| {
            d.geographic_suffix = true;
            d.user_keep_word = true;
        });
        assert_eq!(evaluate(&kept, &capabilities, 2), Outcome::Keep);

        let basic_only = flags(|d| {
            d.geographic_suffix = true;
            d.basic_keep_word = true;
        });
        assert_eq!(
            evaluate(&basic_only, &CountryCapabilities::france(), 2),
            Outcome::DropRun(DropReason::GeographicSuffix)
        );
    }

    #[test]
    fn test_drop_word() {
        let capabilities = CountryCapabilities::default();
        let kept = flags(|d| {
            d.drop_word = true;
            d.user_keep_word = true;
        });
        assert_eq!(evaluate(&kept, &capabilities, 2), Outcome::Keep);

        let bare = flags(|d| d.drop_word = true);
        assert_eq!(evaluate(&bare, &capabilities, 2), Outcome::DropRun(DropReason::DropWord));

        let prefix_only = flags(|d| {
            d.drop_word = true;
            d.keep_prefix = true;
        });
        assert_eq!(
            evaluate(&prefix_only, &CountryCapabilities::france(), 2),
            Outcome::DropRun(DropReason::DropWord)
        );

        let basic = flags(|d| {
            d.drop_word = true;
            d.basic_keep_word = true;
        });
        assert_eq!(evaluate(&basic, &CountryCapabilities::france(), 2), Outcome::Keep);
    }
}
