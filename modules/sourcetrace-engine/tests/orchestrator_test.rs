//! Orchestrator behavior: concurrent fan-out, per-branch timeouts,
//! completion-order merging, candidate filtering, re-entry, and batching.

use std::sync::Arc;
use std::time::Duration;

use sourcetrace_common::TraceConfig;
use sourcetrace_engine::testing::{
    citing_assessment, primary_assessment, MockClassifier, MockRetriever, MockSearch,
};
use sourcetrace_engine::orchestrator::{ClaimTraceRequest, TraceOrchestrator};

fn fast_config() -> TraceConfig {
    TraceConfig {
        branch_timeout: Duration::from_millis(500),
        batch_delay: Duration::from_millis(10),
        ..Default::default()
    }
}

fn request(urls: &[&str]) -> ClaimTraceRequest {
    ClaimTraceRequest {
        topic: String::new(),
        candidate_urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

// ---------------------------------------------------------------------------
// Concurrency and timeouts
// ---------------------------------------------------------------------------

/// A timed-out branch must not disturb a successful sibling: the winning
/// chain completes, the stalled one settles as a timeout.
#[tokio::test]
async fn timed_out_branch_does_not_affect_successful_sibling() {
    let stuck = "https://stuck.example.com/page";
    let good = "https://www.treasury.gov/press-release";

    let retriever = MockRetriever::new()
        .hanging(stuck)
        .on_page(good, "Treasury announces the figures.");
    let classifier = MockClassifier::new()
        .on_url(good, primary_assessment("Treasury Press Release"));

    let orchestrator =
        TraceOrchestrator::new(Arc::new(retriever), Arc::new(classifier), fast_config());
    let (result, stats) = orchestrator
        .trace_claim(&request(&[stuck, good]), None)
        .await;

    assert!(result.primary_source_found);
    assert_eq!(result.primary_source_url.as_deref(), Some(good));
    assert!(result.source_tracing_complete);
    assert_eq!(stats.branches_launched, 2);
    assert_eq!(stats.branches_timed_out, 1);
    assert_eq!(stats.branches_found, 1);

    let complete: Vec<_> = result.reference_chains.iter().filter(|c| c.is_complete).collect();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].sources.len(), 1);
    assert!(complete[0].confidence_score > 0.0);
}

/// The first branch to complete with a finding wins; a later finding does
/// not overwrite it.
#[tokio::test]
async fn first_completed_finding_wins() {
    let slow = "https://www.epa.gov/slow-report";
    let fast = "https://www.doe.gov/fast-report";

    let retriever = MockRetriever::new()
        .on_page(fast, "fast")
        .on_page(slow, "slow")
        .slow(slow, Duration::from_millis(200));
    let classifier = MockClassifier::new()
        .on_url(fast, primary_assessment("Fast Report"))
        .on_url(slow, primary_assessment("Slow Report"));

    let orchestrator =
        TraceOrchestrator::new(Arc::new(retriever), Arc::new(classifier), fast_config());
    let (result, stats) = orchestrator
        .trace_claim(&request(&[slow, fast]), None)
        .await;

    assert_eq!(result.primary_source_url.as_deref(), Some(fast));
    assert_eq!(stats.branches_found, 2);
    assert_eq!(result.reference_chains.len(), 2);
}

// ---------------------------------------------------------------------------
// Candidate handling
// ---------------------------------------------------------------------------

/// No candidates is a valid terminal state, not an error.
#[tokio::test]
async fn empty_candidates_complete_immediately() {
    let orchestrator = TraceOrchestrator::new(
        Arc::new(MockRetriever::new()),
        Arc::new(MockClassifier::new()),
        fast_config(),
    );
    let (result, stats) = orchestrator.trace_claim(&request(&[]), None).await;

    assert!(result.source_tracing_complete);
    assert!(!result.primary_source_found);
    assert!(result.reference_chains.is_empty());
    assert_eq!(stats.branches_launched, 0);
}

/// Document downloads, repository plumbing, and duplicates never launch
/// branches.
#[tokio::test]
async fn candidates_are_deduplicated_and_filtered() {
    let good = "https://agency.gov/statement";
    let retriever = MockRetriever::new().on_page(good, "text");
    let classifier = MockClassifier::new().on_url(good, primary_assessment("Statement"));

    let orchestrator =
        TraceOrchestrator::new(Arc::new(retriever), Arc::new(classifier), fast_config());
    let (result, stats) = orchestrator
        .trace_claim(
            &request(&[
                good,
                good, // duplicate
                "https://agency.gov/statement?utm_source=feed", // normalizes to duplicate
                "https://uni.edu/papers/thesis.pdf",
                "https://repo.org/bitstream/456/data",
                "https://journal.org/publications/vol2",
            ]),
            None,
        )
        .await;

    assert_eq!(stats.branches_launched, 1);
    assert!(result.primary_source_found);
}

/// The candidate set is capped to bound total work per claim.
#[tokio::test]
async fn candidate_set_is_capped() {
    let urls: Vec<String> = (0..15).map(|i| format!("https://site{i}.com/page")).collect();
    let refs: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();

    let orchestrator = TraceOrchestrator::new(
        Arc::new(MockRetriever::new()),
        Arc::new(MockClassifier::new()),
        fast_config(),
    );
    let (_, stats) = orchestrator.trace_claim(&request(&refs), None).await;

    assert_eq!(
        stats.branches_launched,
        fast_config().max_starting_urls as u32
    );
}

/// A search collaborator expands the starting set from the claim topic.
#[tokio::test]
async fn search_collaborator_expands_candidates() {
    let found_by_search = "https://www.ftc.gov/enforcement-action";
    let retriever = MockRetriever::new().on_page(found_by_search, "text");
    let classifier =
        MockClassifier::new().on_url(found_by_search, primary_assessment("FTC Action"));
    let search = MockSearch::new().on_topic("ftc fine", &[found_by_search]);

    let orchestrator =
        TraceOrchestrator::new(Arc::new(retriever), Arc::new(classifier), fast_config())
            .with_search(Arc::new(search));
    let (result, _) = orchestrator
        .trace_claim(
            &ClaimTraceRequest {
                topic: "ftc fine".to_string(),
                candidate_urls: Vec::new(),
            },
            None,
        )
        .await;

    assert!(result.primary_source_found);
    assert_eq!(result.primary_source_url.as_deref(), Some(found_by_search));
}

// ---------------------------------------------------------------------------
// Re-entry
// ---------------------------------------------------------------------------

/// Tracing the same claim again never re-traverses a chain that already
/// completed, and keeps the previously found primary source.
#[tokio::test]
async fn completed_chains_are_not_retraversed() {
    let start = "https://www.sec.gov/filing";
    let retriever = Arc::new(MockRetriever::new().on_page(start, "text"));
    let classifier = Arc::new(MockClassifier::new().on_url(start, primary_assessment("Filing")));

    let orchestrator =
        TraceOrchestrator::new(retriever.clone(), classifier, fast_config());

    let (first, _) = orchestrator.trace_claim(&request(&[start]), None).await;
    assert!(first.primary_source_found);
    let calls_after_first = retriever.call_count();

    let (second, stats) = orchestrator
        .trace_claim(&request(&[start]), Some(first))
        .await;

    assert_eq!(retriever.call_count(), calls_after_first, "no re-fetch on re-entry");
    assert_eq!(stats.branches_launched, 0);
    assert!(second.primary_source_found);
    assert_eq!(second.primary_source_url.as_deref(), Some(start));
    assert_eq!(second.reference_chains.len(), 1);
}

/// A chain left incomplete by a timeout is reused and extended on
/// re-entry rather than restarted.
#[tokio::test]
async fn incomplete_chains_are_reused_on_reentry() {
    let a = "https://news-site.com/story";
    let c = "https://www.nasa.gov/mission-data";

    // First run: the link target hangs until the branch times out, so the
    // chain stays incomplete.
    let retriever1 = MockRetriever::new().on_page(a, "text").hanging(c);
    let classifier = || {
        MockClassifier::new()
            .on_url(a, citing_assessment("Story", &[c]))
            .on_url(c, primary_assessment("Mission Data"))
    };
    let orchestrator1 = TraceOrchestrator::new(
        Arc::new(retriever1),
        Arc::new(classifier()),
        fast_config(),
    );
    let (first, stats1) = orchestrator1.trace_claim(&request(&[a]), None).await;
    assert!(!first.primary_source_found);
    assert_eq!(stats1.branches_timed_out, 1);
    assert!(
        !first.reference_chains[0].is_complete,
        "a timed-out chain must stay incomplete"
    );
    let first_chain_id = first.reference_chains[0].chain_id;

    // Second run: the target recovers.
    let retriever2 = MockRetriever::new().on_page(a, "text").on_page(c, "data");
    let orchestrator2 = TraceOrchestrator::new(
        Arc::new(retriever2),
        Arc::new(classifier()),
        fast_config(),
    );
    let (second, stats) = orchestrator2.trace_claim(&request(&[a]), Some(first)).await;

    assert_eq!(stats.chains_carried_over, 1);
    assert!(second.primary_source_found);
    assert_eq!(second.reference_chains.len(), 1);
    assert_eq!(second.reference_chains[0].chain_id, first_chain_id);
}

/// A chain that exhausted its candidates (a dead end) is complete: re-entry
/// carries it over untouched instead of re-launching the branch.
#[tokio::test]
async fn exhausted_chains_are_not_relaunched_on_reentry() {
    let dead_end = "https://some-blog.com/post";
    let retriever = Arc::new(MockRetriever::new().on_page(dead_end, "no links here"));
    let classifier = Arc::new(MockClassifier::new().on_url(
        dead_end,
        citing_assessment("Dead-end post", &[]),
    ));

    let orchestrator = TraceOrchestrator::new(retriever.clone(), classifier, fast_config());

    let (first, _) = orchestrator.trace_claim(&request(&[dead_end]), None).await;
    assert!(!first.primary_source_found);
    assert!(
        first.reference_chains[0].is_complete,
        "a dead-end chain must settle as complete"
    );
    let calls_after_first = retriever.call_count();

    let (second, stats) = orchestrator
        .trace_claim(&request(&[dead_end]), Some(first))
        .await;

    assert_eq!(stats.branches_launched, 0);
    assert_eq!(retriever.call_count(), calls_after_first, "no re-fetch of a dead end");
    assert!(!second.primary_source_found);
    assert_eq!(second.reference_chains.len(), 1);
}

// ---------------------------------------------------------------------------
// Batch mode
// ---------------------------------------------------------------------------

/// Batch tracing preserves input order and settles every claim.
#[tokio::test]
async fn batch_mode_traces_all_claims_in_order() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://agency{i}.gov/statement")).collect();

    let mut retriever = MockRetriever::new();
    let mut classifier = MockClassifier::new();
    for u in &urls {
        retriever = retriever.on_page(u, "text");
        classifier = classifier.on_url(u, primary_assessment("Statement"));
    }

    let orchestrator =
        TraceOrchestrator::new(Arc::new(retriever), Arc::new(classifier), fast_config());
    let requests: Vec<ClaimTraceRequest> =
        urls.iter().map(|u| request(&[u.as_str()])).collect();
    let results = orchestrator.trace_claims(&requests).await;

    assert_eq!(results.len(), 5);
    for (i, result) in results.iter().enumerate() {
        assert!(result.source_tracing_complete);
        assert_eq!(result.primary_source_url.as_deref(), Some(urls[i].as_str()));
    }
}
