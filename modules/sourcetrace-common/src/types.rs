use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Enums ---

/// What kind of document a visited source is, as judged by the classifier.
/// `Unknown` is the guaranteed fallback when classification fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Primary,
    Secondary,
    Tertiary,
    SocialMedia,
    Blog,
    News,
    Official,
    Unknown,
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Unknown
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Primary => write!(f, "primary"),
            SourceType::Secondary => write!(f, "secondary"),
            SourceType::Tertiary => write!(f, "tertiary"),
            SourceType::SocialMedia => write!(f, "social_media"),
            SourceType::Blog => write!(f, "blog"),
            SourceType::News => write!(f, "news"),
            SourceType::Official => write!(f, "official"),
            SourceType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Whether a source's claims were corroborated during classification.
/// `Unverified` is the guaranteed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    PartiallyVerified,
    Unverified,
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Unverified
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::PartiallyVerified => write!(f, "partially_verified"),
            VerificationStatus::Unverified => write!(f, "unverified"),
        }
    }
}

// --- Chain structure ---

/// Structural signals about where a source sits in a citation chain.
/// Updated by the traversal engine as later hops confirm relationships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChainDistanceMarkers {
    /// The source cites nothing further — a chain endpoint.
    pub has_no_references: bool,
    /// Another source in the chain cites this one directly.
    pub is_directly_cited: bool,
    /// This source cites at least one primary source.
    pub cites_primary_sources: bool,
}

/// The classifier's judgment of one document. Everything in `Source` except
/// the URL, which the engine fills in. All fields default to the documented
/// fallback values so a failed classification still yields a usable value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SourceAssessment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub contains_original_information: bool,
    #[serde(default)]
    pub referenced_urls: Vec<String>,
    #[serde(default)]
    pub content_summary: String,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub key_claims: Vec<String>,
    #[serde(default)]
    pub has_no_references: bool,
    #[serde(default)]
    pub publication_date: Option<DateTime<Utc>>,
}

/// One visited document in a reference chain. Created once per unique URL;
/// immutable afterwards except for marker updates by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub source_type: SourceType,
    pub contains_original_information: bool,
    pub referenced_urls: Vec<String>,
    pub content_summary: String,
    pub verification_status: VerificationStatus,
    pub key_claims: Vec<String>,
    pub markers: ChainDistanceMarkers,
    pub publication_date: Option<DateTime<Utc>>,
}

impl Source {
    /// Build a source from a classifier assessment plus the URL it came from.
    pub fn from_assessment(url: impl Into<String>, a: SourceAssessment) -> Self {
        Self {
            url: url.into(),
            title: a.title,
            source_type: a.source_type,
            contains_original_information: a.contains_original_information,
            referenced_urls: a.referenced_urls,
            content_summary: a.content_summary,
            verification_status: a.verification_status,
            key_claims: a.key_claims,
            markers: ChainDistanceMarkers {
                has_no_references: a.has_no_references,
                is_directly_cited: false,
                cites_primary_sources: false,
            },
            publication_date: a.publication_date,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.source_type == SourceType::Primary && self.contains_original_information
    }
}

/// An ordered, URL-deduplicated traversal path from one starting URL.
/// Exclusively owned by the branch extending it; the orchestrator only
/// assembles finished chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceChain {
    pub chain_id: Uuid,
    pub sources: Vec<Source>,
    pub confidence_score: f64,
    pub is_complete: bool,
}

impl Default for ReferenceChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceChain {
    pub fn new() -> Self {
        Self {
            chain_id: Uuid::new_v4(),
            sources: Vec::new(),
            confidence_score: 0.0,
            is_complete: false,
        }
    }

    /// The URL this chain's traversal started at, if any source was visited.
    pub fn starting_url(&self) -> Option<&str> {
        self.sources.first().map(|s| s.url.as_str())
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.sources.iter().any(|s| s.url == url)
    }

    /// Append a source, enforcing the no-duplicate-URL invariant.
    /// Returns false (and drops the source) if the URL was already visited.
    pub fn push_source(&mut self, source: Source) -> bool {
        if self.contains_url(&source.url) {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Mark `cited_url` as directly cited, and if the citing source's
    /// reference turned out to be primary, record that it cites primary
    /// sources. Called by the engine when a child hop resolves.
    pub fn record_citation(&mut self, citing_url: &str, cited_url: &str, cited_is_primary: bool) {
        if let Some(cited) = self.sources.iter_mut().find(|s| s.url == cited_url) {
            cited.markers.is_directly_cited = true;
        }
        if cited_is_primary {
            if let Some(citing) = self.sources.iter_mut().find(|s| s.url == citing_url) {
                citing.markers.cites_primary_sources = true;
            }
        }
    }
}

/// The outcome of tracing one claim across all its starting URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimTraceResult {
    pub reference_chains: Vec<ReferenceChain>,
    pub primary_source_found: bool,
    pub primary_source_url: Option<String>,
    pub primary_source_summary: Option<String>,
    /// True once every branch has settled — an inconclusive search is a
    /// valid terminal state, not a failure.
    pub source_tracing_complete: bool,
}

impl ClaimTraceResult {
    /// Take the not-yet-complete chain whose traversal started at `url`,
    /// if this result holds one. Used for idempotent re-entry: complete
    /// chains are never re-traversed.
    pub fn take_incomplete_chain(&mut self, url: &str) -> Option<ReferenceChain> {
        let idx = self
            .reference_chains
            .iter()
            .position(|c| !c.is_complete && c.starting_url() == Some(url))?;
        Some(self.reference_chains.remove(idx))
    }
}
