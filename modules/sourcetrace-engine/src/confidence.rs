//! Chain confidence scoring.
//!
//! A weighted structural heuristic, not a probability. Deterministic and
//! purely a function of the chain's sources, so it is testable over
//! constructed fixtures.

use sourcetrace_common::{ReferenceChain, VerificationStatus};

/// Hard ceiling on any chain's score. 1.0 is deliberately unreachable:
/// automated provenance judgments carry irreducible uncertainty.
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Chain-length saturation point for the traversal-depth term.
const LENGTH_SATURATION: f64 = 4.0;

/// Score a reference chain in [0, 0.99]. Empty chains score 0.
pub fn score(chain: &ReferenceChain) -> f64 {
    let total = chain.sources.len();
    if total == 0 {
        return 0.0;
    }
    let total_f = total as f64;

    let mut score = 0.0;

    // Reaching a dead end suggests a terminus; a dead end that holds
    // original information is strong evidence the chain bottomed out at
    // the real origin.
    let endpoints: Vec<_> = chain
        .sources
        .iter()
        .filter(|s| s.markers.has_no_references)
        .collect();
    if !endpoints.is_empty() {
        score += 0.2;
        if endpoints.iter().any(|s| s.contains_original_information) {
            score += 0.3;
        }
    }

    let cites_primary = chain
        .sources
        .iter()
        .filter(|s| s.markers.cites_primary_sources)
        .count() as f64;
    score += 0.2 * (cites_primary / total_f).min(1.0);

    let directly_cited = chain
        .sources
        .iter()
        .filter(|s| s.markers.is_directly_cited)
        .count() as f64;
    score += 0.1 * (directly_cited / total_f).min(1.0);

    score += 0.2 * (total_f / LENGTH_SATURATION).min(1.0);

    let verified = chain
        .sources
        .iter()
        .filter(|s| s.verification_status == VerificationStatus::Verified)
        .count() as f64;
    score += 0.2 * (verified / total_f);

    score.clamp(0.0, MAX_CONFIDENCE)
}
