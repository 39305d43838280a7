//! Text normalization, similarity scoring and catalog reconciliation.

mod normalize;
mod reconcile;
mod similarity;

pub use normalize::normalize;
pub use reconcile::{
    reconcile, MatchKey, MatchPolicy, ReconciliationResult, DEFAULT_CONTRIBUTOR_THRESHOLD,
    DEFAULT_TITLE_THRESHOLD,
};
pub use similarity::{levenshtein_distance, similarity};
