// Test mocks for the traversal engine and orchestrator.
//
// Three mocks matching the three trait boundaries:
// - MockRetriever (ContentRetriever) — HashMap-based URL→content
// - MockClassifier (SourceClassifier) — HashMap-based URL→assessment
// - MockSearch (CandidateSearch) — fixed URL list per topic
//
// Plus helpers for constructing assessments. No network, no API keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use sourcetrace_common::{SourceAssessment, SourceTraceError, SourceType, VerificationStatus};

use crate::traits::{CandidateSearch, ContentRetriever, SourceClassifier};

/// Initialize a tracing subscriber honoring RUST_LOG, for debugging tests.
/// Safe to call from multiple tests; only the first call wins.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// MockRetriever
// ---------------------------------------------------------------------------

/// HashMap-based content retriever. Unregistered URLs return `Ok(None)`.
/// Builder pattern: `.on_page()`, `.failing()`, `.hanging()`.
#[derive(Default)]
pub struct MockRetriever {
    pages: HashMap<String, String>,
    failures: Vec<String>,
    hang: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicU32,
}

impl MockRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    /// Registered URLs return `Err` instead of content.
    pub fn failing(mut self, url: &str) -> Self {
        self.failures.push(url.to_string());
        self
    }

    /// Registered URLs never resolve — for timeout tests.
    pub fn hanging(mut self, url: &str) -> Self {
        self.hang.push(url.to_string());
        self
    }

    /// Registered URLs resolve only after a delay — for completion-order tests.
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Number of retrieve calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentRetriever for MockRetriever {
    async fn retrieve(&self, url: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.iter().any(|u| u == url) {
            // Far longer than any test timeout.
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.iter().any(|u| u == url) {
            return Err(SourceTraceError::Retrieval(format!("mock failure for {url}")).into());
        }
        Ok(self.pages.get(url).cloned())
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

/// HashMap-based classifier. Unregistered URLs get the documented
/// default assessment, exactly like a failed real classification.
#[derive(Default)]
pub struct MockClassifier {
    assessments: HashMap<String, SourceAssessment>,
    summaries: HashMap<String, String>,
    failing_summaries: Vec<String>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url(mut self, url: &str, assessment: SourceAssessment) -> Self {
        self.assessments.insert(url.to_string(), assessment);
        self
    }

    pub fn with_summary(mut self, url: &str, summary: &str) -> Self {
        self.summaries.insert(url.to_string(), summary.to_string());
        self
    }

    /// summarize_primary fails for this URL, forcing the classifier-summary
    /// fallback path.
    pub fn failing_summary(mut self, url: &str) -> Self {
        self.failing_summaries.push(url.to_string());
        self
    }
}

#[async_trait]
impl SourceClassifier for MockClassifier {
    async fn classify(&self, url: &str, _content: &str) -> SourceAssessment {
        self.assessments.get(url).cloned().unwrap_or_default()
    }

    async fn summarize_primary(&self, url: &str, _content: &str) -> Result<String> {
        if self.failing_summaries.iter().any(|u| u == url) {
            bail!("mock summarization failure for {url}");
        }
        Ok(self
            .summaries
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("Summary of {url}")))
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

/// Fixed results per topic; unknown topics return an empty list.
#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_topic(mut self, topic: &str, urls: &[&str]) -> Self {
        self.results
            .insert(topic.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }
}

#[async_trait]
impl CandidateSearch for MockSearch {
    async fn search(&self, topic: &str, existing: &[String]) -> Result<Vec<String>> {
        Ok(self
            .results
            .get(topic)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|u| !existing.contains(u))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Assessment helpers
// ---------------------------------------------------------------------------

/// A secondary source citing the given URLs.
pub fn citing_assessment(title: &str, referenced_urls: &[&str]) -> SourceAssessment {
    SourceAssessment {
        title: title.to_string(),
        source_type: SourceType::Secondary,
        referenced_urls: referenced_urls.iter().map(|u| u.to_string()).collect(),
        content_summary: format!("{title} (cites {} sources)", referenced_urls.len()),
        ..Default::default()
    }
}

/// A primary source with original information and no further references.
pub fn primary_assessment(title: &str) -> SourceAssessment {
    SourceAssessment {
        title: title.to_string(),
        source_type: SourceType::Primary,
        contains_original_information: true,
        has_no_references: true,
        verification_status: VerificationStatus::Verified,
        content_summary: format!("{title} (original material)"),
        ..Default::default()
    }
}
