//! Domain/path heuristics for choosing which links to follow first.
//!
//! Selection is two-stage: rank by score, then enforce a reputable-news
//! diversity floor. Pure score-ranking starves the result set of fast,
//! verifiable news corroboration in favor of SEO-optimized commercial
//! pages with keyword-stuffed paths.

use crate::urlnorm::domain_of;

// --- Reputation tables ---

const SCORE_GOVERNMENT: f64 = 10.0;
const SCORE_INSTITUTIONAL: f64 = 8.0;
const SCORE_NEWS: f64 = 6.0;
const SCORE_COMMERCIAL: f64 = 2.0;
const SCORE_SOCIAL: f64 = -2.0;
const SCORE_TECHNICAL: f64 = -5.0;
/// Assigned to URLs that fail to parse; kept in the ranking rather than dropped.
const SCORE_UNPARSEABLE: f64 = 0.5;

/// Major wire services and newspapers of record.
const NEWS_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bloomberg.com",
    "wsj.com",
    "ft.com",
    "nytimes.com",
    "washingtonpost.com",
    "theguardian.com",
    "bbc.com",
    "bbc.co.uk",
    "economist.com",
    "npr.org",
    "axios.com",
    "politico.com",
];

const SOCIAL_DOMAINS: &[&str] = &[
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "reddit.com",
    "linkedin.com",
    "youtube.com",
    "medium.com",
];

/// Non-content technical/CDN hosts that show up in scraped markup.
const TECHNICAL_DOMAINS: &[&str] = &[
    "cloudflare.com",
    "googleapis.com",
    "gstatic.com",
    "googletagmanager.com",
    "google-analytics.com",
    "doubleclick.net",
    "cdn.jsdelivr.net",
    "unpkg.com",
];

/// Signed path-keyword weights, summed over the URL path.
const PATH_KEYWORDS: &[(&str, f64)] = &[
    ("document", 3.0),
    ("pdf", 3.0),
    ("report", 3.0),
    ("filing", 3.0),
    ("publication", 3.0),
    ("official", 3.0),
    ("press-release", 3.0),
    ("statement", 3.0),
    ("announcement", 3.0),
    ("research", 2.0),
    ("study", 2.0),
    ("data", 2.0),
    ("statistics", 2.0),
    ("regulation", 2.0),
    ("law", 2.0),
    ("legal", 2.0),
    ("financial", 2.0),
    ("earnings", 2.0),
    ("quarterly", 2.0),
    ("blog", -3.0),
    ("opinion", -3.0),
    ("comment", -3.0),
    ("discussion", -3.0),
];

/// Boilerplate/non-content URL fragments dropped before ranking.
const BOILERPLATE_FRAGMENTS: &[&str] = &[
    "/privacy",
    "/terms",
    "/cookie",
    "/legal-notice",
    "schema.org",
    "w3.org",
    "google-analytics",
    "doubleclick",
    "/pixel",
    "/tracking",
];

const ASSET_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf",
];

// --- Scoring ---

fn domain_score(domain: &str) -> f64 {
    if domain.ends_with(".gov") || domain.contains(".gov.") {
        return SCORE_GOVERNMENT;
    }
    if domain.ends_with(".edu") || domain.ends_with(".int") || domain.ends_with(".org") {
        return SCORE_INSTITUTIONAL;
    }
    if TECHNICAL_DOMAINS.iter().any(|d| domain.ends_with(d)) {
        return SCORE_TECHNICAL;
    }
    if SOCIAL_DOMAINS.iter().any(|d| domain_matches(domain, d)) {
        return SCORE_SOCIAL;
    }
    if NEWS_DOMAINS.iter().any(|d| domain_matches(domain, d)) {
        return SCORE_NEWS;
    }
    SCORE_COMMERCIAL
}

/// `www.reuters.com` matches `reuters.com`; `notreuters.com` does not.
fn domain_matches(domain: &str, candidate: &str) -> bool {
    domain == candidate || domain.ends_with(&format!(".{candidate}"))
}

fn path_score(path: &str) -> f64 {
    let lower = path.to_lowercase();
    PATH_KEYWORDS
        .iter()
        .filter(|(kw, _)| lower.contains(kw))
        .map(|(_, w)| w)
        .sum()
}

/// Total priority score for one URL. URLs that fail to parse get a fixed
/// low fallback rather than being dropped.
pub fn score_url(url: &str) -> f64 {
    let Ok(parsed) = url::Url::parse(url) else {
        return SCORE_UNPARSEABLE;
    };
    let Some(host) = parsed.host_str() else {
        return SCORE_UNPARSEABLE;
    };
    domain_score(&host.to_lowercase()) + path_score(parsed.path())
}

/// True if the URL's host is on the curated wire-service/newspaper list.
pub fn is_reputable_news(url: &str) -> bool {
    domain_of(url)
        .map(|d| NEWS_DOMAINS.iter().any(|n| domain_matches(&d, n)))
        .unwrap_or(false)
}

/// Boilerplate and static-asset URLs carry no citation signal.
pub fn is_boilerplate(url: &str) -> bool {
    let lower = url.to_lowercase();
    if BOILERPLATE_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return true;
    }
    let path_end = lower.split(['?', '#']).next().unwrap_or(&lower);
    ASSET_EXTENSIONS.iter().any(|ext| path_end.ends_with(ext))
}

// --- Selection ---

/// Rank candidates and return the top `k`, enforcing the diversity floor:
/// when reputable-news candidates number at least 60% of `k`, at least 60%
/// of the selections come from that subset before the remainder is filled
/// from the overall ranking.
pub fn prioritize(candidates: &[String], k: usize) -> Vec<String> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&String, f64)> = candidates
        .iter()
        .filter(|u| !is_boilerplate(u))
        .map(|u| (u, score_url(u)))
        .collect();
    // Stable sort: ties keep first-occurrence order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let news: Vec<&String> = ranked
        .iter()
        .map(|(u, _)| *u)
        .filter(|u| is_reputable_news(u))
        .collect();

    let floor = (k * 3).div_ceil(5); // 60% of k, rounded up

    let mut selected: Vec<String> = Vec::with_capacity(k);
    if news.len() >= floor {
        for u in news.iter().take(floor) {
            selected.push((*u).clone());
        }
    }
    for (u, _) in &ranked {
        if selected.len() >= k {
            break;
        }
        if !selected.contains(*u) {
            selected.push((*u).clone());
        }
    }
    selected
}
