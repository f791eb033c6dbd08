//! Concurrent traversal orchestration.
//!
//! One claim fans out into up to `max_starting_urls` independent
//! traversals, each under its own timeout. Chains are moved into their
//! branch and returned when it settles, so no chain is ever shared between
//! two live branches. Outcomes are merged in completion order: the first
//! branch to report a finding sets the claim's primary source.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use sourcetrace_common::{ClaimTraceResult, ReferenceChain, SourceTraceError, TraceConfig};

use crate::confidence;
use crate::traits::{CandidateSearch, ContentRetriever, SourceClassifier};
use crate::traversal::{PrimaryFinding, TraversalEngine};
use crate::urlnorm::normalize_url;

/// Path fragments that mark a starting URL as a low-value entry point
/// (document dumps and repository plumbing, not articles to trace from).
const LOW_VALUE_SEGMENTS: &[&str] = &["/publications/", "/papers/", "/bitstream/"];

const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// One claim to trace: free-text topic plus candidate starting URLs.
#[derive(Debug, Clone)]
pub struct ClaimTraceRequest {
    pub topic: String,
    pub candidate_urls: Vec<String>,
}

/// Counters for one `trace_claim` run.
#[derive(Debug, Default, Clone)]
pub struct TraceStats {
    pub branches_launched: u32,
    pub branches_found: u32,
    pub branches_timed_out: u32,
    pub branches_inconclusive: u32,
    pub sources_visited: u32,
    pub chains_carried_over: u32,
}

impl std::fmt::Display for TraceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trace: {} branches launched, {} found, {} timed out, {} inconclusive, \
             {} sources visited, {} chains carried over",
            self.branches_launched,
            self.branches_found,
            self.branches_timed_out,
            self.branches_inconclusive,
            self.sources_visited,
            self.chains_carried_over,
        )
    }
}

struct BranchOutcome {
    chain: ReferenceChain,
    finding: Option<PrimaryFinding>,
    timed_out: bool,
}

pub struct TraceOrchestrator {
    engine: TraversalEngine,
    search: Option<Arc<dyn CandidateSearch>>,
    config: TraceConfig,
}

impl TraceOrchestrator {
    pub fn new(
        retriever: Arc<dyn ContentRetriever>,
        classifier: Arc<dyn SourceClassifier>,
        config: TraceConfig,
    ) -> Self {
        Self {
            engine: TraversalEngine::new(retriever, classifier, config.clone()),
            search: None,
            config,
        }
    }

    /// Attach a candidate-search collaborator used to expand the
    /// starting-URL set from the claim topic.
    pub fn with_search(mut self, search: Arc<dyn CandidateSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Trace one claim. `prior` allows idempotent re-entry: chains already
    /// complete are carried over untouched and never re-traversed.
    pub async fn trace_claim(
        &self,
        request: &ClaimTraceRequest,
        prior: Option<ClaimTraceResult>,
    ) -> (ClaimTraceResult, TraceStats) {
        let mut stats = TraceStats::default();
        let mut prior = prior.unwrap_or_default();

        let starting_urls = self.starting_urls(request, &prior).await;

        let mut result = ClaimTraceResult {
            primary_source_found: prior.primary_source_found,
            primary_source_url: prior.primary_source_url.clone(),
            primary_source_summary: prior.primary_source_summary.clone(),
            ..Default::default()
        };

        if starting_urls.is_empty() {
            // Empty input, not an exceptional case: an exhausted search is
            // a valid terminal state.
            info!(topic = request.topic, "no candidate starting URLs, trace complete");
            result.reference_chains = prior.reference_chains;
            result.source_tracing_complete = true;
            return (result, stats);
        }

        let mut branches = FuturesUnordered::new();
        for url in starting_urls {
            let chain = match prior.take_incomplete_chain(&url) {
                Some(existing) => {
                    stats.chains_carried_over += 1;
                    existing
                }
                None => ReferenceChain::new(),
            };
            stats.branches_launched += 1;
            branches.push(self.run_branch(url, chain));
        }

        // All-settled join in completion order: the first finding wins,
        // later findings never overwrite it.
        while let Some(outcome) = branches.next().await {
            if outcome.timed_out {
                stats.branches_timed_out += 1;
            } else if outcome.finding.is_some() {
                stats.branches_found += 1;
            } else {
                stats.branches_inconclusive += 1;
            }

            if let Some(finding) = outcome.finding {
                if !result.primary_source_found {
                    result.primary_source_found = true;
                    result.primary_source_url = Some(finding.url);
                    result.primary_source_summary = Some(finding.summary);
                }
            }

            let mut chain = outcome.chain;
            chain.confidence_score = confidence::score(&chain);
            stats.sources_visited += chain.sources.len() as u32;
            result.reference_chains.push(chain);
        }

        // Chains not matched to a starting URL this run (complete ones
        // especially) ride along unchanged, rescored for consistency.
        for mut chain in prior.reference_chains {
            chain.confidence_score = confidence::score(&chain);
            result.reference_chains.push(chain);
        }

        result.source_tracing_complete = true;
        info!(topic = request.topic, "{stats}");
        (result, stats)
    }

    /// Trace many claims in fixed-size batches with a fixed inter-batch
    /// delay — a simple fixed-window limiter protecting the retrieval and
    /// classification collaborators. Results align with input order.
    pub async fn trace_claims(&self, requests: &[ClaimTraceRequest]) -> Vec<ClaimTraceResult> {
        let mut results = Vec::with_capacity(requests.len());
        let batch_size = self.config.batch_size.max(1);

        for (i, batch) in requests.chunks(batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }
            let traced = futures::future::join_all(
                batch.iter().map(|req| self.trace_claim(req, None)),
            )
            .await;
            results.extend(traced.into_iter().map(|(result, _)| result));
        }

        results
    }

    /// One traversal branch under its own timeout. A timed-out branch
    /// resolves as not-found; its chain keeps whatever was appended before
    /// the deadline.
    async fn run_branch(&self, url: String, chain: ReferenceChain) -> BranchOutcome {
        let engine = self.engine.clone();
        let mut chain = chain;

        match tokio::time::timeout(
            self.config.branch_timeout,
            engine.follow_reference_chain(url.clone(), &mut chain, 0),
        )
        .await
        {
            Ok(finding) => BranchOutcome {
                chain,
                finding,
                timed_out: false,
            },
            Err(_) => {
                let err = SourceTraceError::BranchTimeout(self.config.branch_timeout.as_secs());
                warn!(url, error = %err, "traversal branch timed out");
                BranchOutcome {
                    chain,
                    finding: None,
                    timed_out: true,
                }
            }
        }
    }

    /// Deduplicate, filter, and cap the candidate starting URLs, expanding
    /// via the search collaborator when one is attached. URLs whose chains
    /// are already complete in `prior` are excluded up front.
    async fn starting_urls(
        &self,
        request: &ClaimTraceRequest,
        prior: &ClaimTraceResult,
    ) -> Vec<String> {
        let mut candidates: Vec<String> = request.candidate_urls.clone();

        if let Some(search) = &self.search {
            if !request.topic.is_empty() {
                match search.search(&request.topic, &candidates).await {
                    Ok(extra) => candidates.extend(extra),
                    Err(e) => warn!(topic = request.topic, error = %e, "candidate search failed"),
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        candidates
            .into_iter()
            .map(|u| normalize_url(&u))
            .filter(|u| seen.insert(u.clone()))
            .filter(|u| !is_low_value_start(u))
            .filter(|u| {
                !prior
                    .reference_chains
                    .iter()
                    .any(|c| c.is_complete && c.starting_url() == Some(u.as_str()))
            })
            .take(self.config.max_starting_urls)
            .collect()
    }
}

/// Document downloads and repository plumbing make poor traversal roots.
fn is_low_value_start(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path_end = lower.split(['?', '#']).next().unwrap_or(&lower);
    DOCUMENT_EXTENSIONS.iter().any(|ext| path_end.ends_with(ext))
        || LOW_VALUE_SEGMENTS.iter().any(|seg| lower.contains(seg))
}
