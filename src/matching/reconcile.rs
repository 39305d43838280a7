//! Partitioning of the local catalog against a reference catalog.
//!
//! A local album counts as already present when some reference album clears
//! both the title and the contributor threshold. The reference list is
//! scanned in order and the first acceptable record wins; there is no
//! best-score search, so reordering the reference can change the outcome on
//! ambiguous inputs.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::normalize::normalize;
use super::similarity::similarity;
use crate::catalog::AlbumRecord;

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.75;
pub const DEFAULT_CONTRIBUTOR_THRESHOLD: f64 = 0.75;

/// Articles folded away from either end of a contributor name, so
/// "The Beatles", "Beatles, The" and "Beatles" compare equal.
const CONTRIBUTOR_ARTICLES: &[&str] = &["the"];

/// Thresholds deciding when two albums are the same.
///
/// Both comparisons are strict (`>`) and both must hold.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchPolicy {
    pub title_threshold: f64,
    pub contributor_threshold: f64,
    /// Spread the outer loop over the rayon thread pool. Output is identical
    /// to the sequential path.
    pub parallel: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            title_threshold: DEFAULT_TITLE_THRESHOLD,
            contributor_threshold: DEFAULT_CONTRIBUTOR_THRESHOLD,
            parallel: false,
        }
    }
}

/// The normalized fields an album is compared on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchKey {
    pub title: String,
    pub contributor: String,
}

impl MatchKey {
    pub fn from_record(record: &AlbumRecord) -> Self {
        Self {
            title: normalize(&record.title),
            contributor: fold_articles(normalize(&record.primary_contributor)),
        }
    }
}

fn fold_articles(name: String) -> String {
    for article in CONTRIBUTOR_ARTICLES {
        if let Some(rest) = name.strip_prefix(article).and_then(|r| r.strip_prefix(' ')) {
            return rest.to_string();
        }
        if let Some(rest) = name.strip_suffix(article).and_then(|r| r.strip_suffix(' ')) {
            return rest.to_string();
        }
    }
    name
}

impl MatchPolicy {
    /// Whether `reference` is an accepted match for `local`.
    pub fn accepts(&self, local: &MatchKey, reference: &MatchKey) -> bool {
        similarity(&local.title, &reference.title) > self.title_threshold
            && similarity(&local.contributor, &reference.contributor)
                > self.contributor_threshold
    }

    fn has_match(&self, local: &AlbumRecord, reference: &[MatchKey]) -> bool {
        let key = MatchKey::from_record(local);
        match reference.iter().position(|candidate| self.accepts(&key, candidate)) {
            Some(idx) => {
                debug!(
                    "\"{}\" by \"{}\" matches reference entry #{}",
                    local.title, local.primary_contributor, idx
                );
                true
            }
            None => false,
        }
    }
}

/// Outcome of one reconciliation run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReconciliationResult {
    /// Local albums with no accepted match, in their original order.
    pub unique: Vec<AlbumRecord>,
    /// How many local albums were found in the reference catalog.
    pub matched: usize,
}

/// Splits `local` into albums already present in `reference` and albums that
/// are not, returning the latter.
///
/// Pure and stateless: neither input is modified, and an empty reference
/// yields every local album as unique.
pub fn reconcile(
    local: &[AlbumRecord],
    reference: &[AlbumRecord],
    policy: &MatchPolicy,
) -> ReconciliationResult {
    let reference_keys: Vec<MatchKey> = reference.iter().map(MatchKey::from_record).collect();

    let unique: Vec<AlbumRecord> = if policy.parallel {
        local
            .par_iter()
            .filter(|album| !policy.has_match(album, &reference_keys))
            .cloned()
            .collect()
    } else {
        local
            .iter()
            .filter(|album| !policy.has_match(album, &reference_keys))
            .cloned()
            .collect()
    };

    let matched = local.len() - unique.len();
    info!(
        local = local.len(),
        reference = reference.len(),
        matched,
        unique = unique.len(),
        "Reconciliation finished"
    );

    ReconciliationResult { unique, matched }
}
