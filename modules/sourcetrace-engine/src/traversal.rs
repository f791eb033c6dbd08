//! Recursive reference-chain traversal.
//!
//! One traversal walks citation links depth-first from a starting URL
//! toward a primary source, accumulating visited sources into a single
//! mutable `ReferenceChain`. Recursion is strictly sequential: every hop
//! shares the one chain, so there is exactly one writer at any time.
//! Guard order is deliberate and load-bearing: cycle guard, then primary
//! check, then endpoint fallback, then the same-domain filter on children.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, info, warn};

use sourcetrace_common::{ReferenceChain, Source, TraceConfig};

use crate::priority::prioritize;
use crate::traits::{ContentRetriever, SourceClassifier};
use crate::urlnorm::{extract_links, normalize_url, same_domain};

/// Minimum classifier-reported link count before the engine supplements
/// with a raw scan of the fetched content.
const MIN_CLASSIFIED_LINKS: usize = 3;

/// A located primary source (or soft terminus standing in for one).
#[derive(Debug, Clone)]
pub struct PrimaryFinding {
    pub url: String,
    pub summary: String,
}

/// The traversal engine. Cheap to clone; branches each hold their own copy.
#[derive(Clone)]
pub struct TraversalEngine {
    retriever: Arc<dyn ContentRetriever>,
    classifier: Arc<dyn SourceClassifier>,
    config: TraceConfig,
}

impl TraversalEngine {
    pub fn new(
        retriever: Arc<dyn ContentRetriever>,
        classifier: Arc<dyn SourceClassifier>,
        config: TraceConfig,
    ) -> Self {
        Self {
            retriever,
            classifier,
            config,
        }
    }

    /// Visit `url`, classify it, and recurse into a bounded, prioritized
    /// subset of its outbound links. Returns the primary finding if this
    /// branch reached one; `None` prunes the branch without corrupting the
    /// chain (partial appends remain valid visited nodes).
    ///
    /// A top-level traversal that exhausts every candidate leaves a chain
    /// that cannot productively extend, so it is marked complete. A branch
    /// cancelled by its timeout never reaches that mark and stays
    /// incomplete, eligible for reuse on re-entry. An empty chain (root
    /// fetch failed) also stays incomplete so a transient failure does not
    /// freeze it.
    pub fn follow_reference_chain<'a>(
        &'a self,
        url: String,
        chain: &'a mut ReferenceChain,
        depth: usize,
    ) -> BoxFuture<'a, Option<PrimaryFinding>> {
        Box::pin(async move {
            let finding = self.visit(url, chain, depth).await;
            if depth == 0 && finding.is_none() && !chain.sources.is_empty() {
                debug!("chain cannot productively extend, marking complete");
                chain.is_complete = true;
            }
            finding
        })
    }

    /// One hop of the recursion. Async recursion, so the future is boxed.
    fn visit<'a>(
        &'a self,
        url: String,
        chain: &'a mut ReferenceChain,
        depth: usize,
    ) -> BoxFuture<'a, Option<PrimaryFinding>> {
        Box::pin(async move {
            let url = normalize_url(&url);

            // Guards run before any I/O.
            if depth >= self.config.max_depth {
                debug!(url, depth, "depth limit reached, pruning");
                return None;
            }
            if chain.contains_url(&url) {
                if depth == 0 {
                    // Resuming a reused chain whose root was visited in a
                    // prior run: no re-fetch, fan out from the links the
                    // classifier recorded back then.
                    let links: Vec<String> = chain
                        .sources
                        .iter()
                        .find(|s| s.url == url)
                        .map(|s| s.referenced_urls.iter().map(|u| normalize_url(u)).collect())
                        .unwrap_or_default();
                    let links: Vec<String> =
                        links.into_iter().filter(|l| !chain.contains_url(l)).collect();
                    if links.is_empty() {
                        return None;
                    }
                    debug!(url, "resuming previously visited chain root");
                    return self.fan_out(&url, links, chain, depth).await;
                }
                debug!(url, "already visited in this chain, cycle guard");
                return None;
            }

            // Failed fetches leave no trace in the chain, so a transient
            // failure doesn't poison revisits from other branches.
            let content = match self.retriever.retrieve(&url).await {
                Ok(Some(content)) => content,
                Ok(None) => {
                    debug!(url, "no content available, pruning branch");
                    return None;
                }
                Err(e) => {
                    warn!(url, error = %e, "retrieval failed, pruning branch");
                    return None;
                }
            };

            let truncated = truncate_chars(&content, self.config.classification_content_limit);
            let assessment = self.classifier.classify(&url, truncated).await;
            let source = Source::from_assessment(&url, assessment);

            let is_primary = source.is_primary();
            let has_no_references = source.markers.has_no_references;
            let contains_original = source.contains_original_information;
            let classifier_summary = source.content_summary.clone();
            let referenced_urls = source.referenced_urls.clone();

            // Appended unconditionally: a visited-but-unclassifiable node
            // still counts as visited for cycle purposes.
            chain.push_source(source);

            if is_primary {
                chain.is_complete = true;
                let summary = match self.classifier.summarize_primary(&url, truncated).await {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(url, error = %e, "summarization failed, using classifier summary");
                        classifier_summary
                    }
                };
                info!(url, depth, "primary source found");
                return Some(PrimaryFinding { url, summary });
            }

            // Classifier links first; supplement with a raw content scan
            // when the classifier reported few.
            let mut links: Vec<String> =
                referenced_urls.iter().map(|u| normalize_url(u)).collect();
            if links.len() < MIN_CLASSIFIED_LINKS {
                for scanned in extract_links(&content) {
                    if !links.contains(&scanned) {
                        links.push(scanned);
                    }
                }
            }
            links.retain(|l| !chain.contains_url(l));

            if links.is_empty() {
                if has_no_references && contains_original {
                    // Soft terminus: self-evidently original despite not
                    // being classified primary (e.g. a dataset page).
                    chain.is_complete = true;
                    info!(url, depth, "soft terminus with original information");
                    return Some(PrimaryFinding {
                        url,
                        summary: classifier_summary,
                    });
                }
                debug!(url, depth, "no unvisited links, pruning branch");
                return None;
            }

            self.fan_out(&url, links, chain, depth).await
        })
    }

    /// Prioritized, strictly sequential recursion into child links. Stops
    /// at the first finding; same-domain children are skipped.
    async fn fan_out(
        &self,
        url: &str,
        links: Vec<String>,
        chain: &mut ReferenceChain,
        depth: usize,
    ) -> Option<PrimaryFinding> {
        let candidates = prioritize(&links, self.config.max_fan_out);
        for candidate in candidates {
            if same_domain(url, &candidate) {
                debug!(url, candidate, "same-domain link skipped");
                continue;
            }

            let finding = self.visit(candidate.clone(), chain, depth + 1).await;

            // The hop confirmed a citation relationship if the child
            // actually made it into the chain.
            let candidate = normalize_url(&candidate);
            if chain.contains_url(&candidate) {
                let child_is_primary = chain
                    .sources
                    .iter()
                    .find(|s| s.url == candidate)
                    .map(|s| s.is_primary())
                    .unwrap_or(false);
                chain.record_citation(url, &candidate, child_is_primary);
            }

            if finding.is_some() {
                return finding;
            }
        }

        None
    }
}

/// Truncate to a character budget without splitting a UTF-8 boundary.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 4), "héll");
        assert_eq!(truncate_chars(text, 100), text);
    }
}
