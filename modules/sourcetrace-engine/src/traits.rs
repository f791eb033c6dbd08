// Trait abstractions for the collaborators the traversal engine calls.
//
// ContentRetriever — fetch cleaned text for a URL. `Ok(None)` is the normal
//   "no content" signal; the engine treats `Err` identically (prune the
//   branch, never propagate).
// SourceClassifier — judge a document and summarize primary sources. The
//   classify boundary is infallible: implementations substitute
//   `SourceAssessment::default()` on internal failure.
// CandidateSearch — best-effort expansion of a claim's starting-URL set.
//
// These enable deterministic testing with MockRetriever, MockClassifier and
// MockSearch: no network, no API keys. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;

use sourcetrace_common::SourceAssessment;

#[async_trait]
pub trait ContentRetriever: Send + Sync {
    /// Fetch cleaned, human-readable text for a URL.
    /// Retry policy belongs to the implementation, not the engine.
    async fn retrieve(&self, url: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait SourceClassifier: Send + Sync {
    /// Classify a document. Must always return a complete assessment,
    /// defaulting fields on internal failure rather than erroring.
    async fn classify(&self, url: &str, content: &str) -> SourceAssessment;

    /// Produce a short human-readable summary of a primary source.
    /// Best-effort; the engine falls back to the assessment's own
    /// content_summary on failure.
    async fn summarize_primary(&self, url: &str, content: &str) -> Result<String>;
}

#[async_trait]
pub trait CandidateSearch: Send + Sync {
    /// Suggest additional starting URLs for a topic, excluding any already
    /// in `existing`. An empty result is a valid, non-error outcome.
    async fn search(&self, topic: &str, existing: &[String]) -> Result<Vec<String>>;
}
