//! URL normalization and best-effort link extraction.
//!
//! Link extraction runs over whatever the retriever returned — rendered
//! markdown, raw HTML, or plain text — so it layers three scans: anchor
//! hrefs, bare http(s) URLs in body text, and "see example.com/report"
//! phrasing with no scheme at all.

use std::collections::HashSet;

/// Query parameters stripped during normalization. Tracking params cause
/// cycle-guard misses (same page, different utm_campaign) and inflate the
/// visited set.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
    "fbclid", "gclid", "msclkid", "ref", "source",
];

/// Strip tracking query parameters and return a canonical form.
/// Malformed input is returned unchanged — normalization never errors.
pub fn normalize_url(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };

    if parsed.query().is_none() {
        return parsed.to_string();
    }

    let clean_pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| {
            !TRACKING_PARAMS.contains(&key.as_ref()) && !key.starts_with("utm_")
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if clean_pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
    }

    parsed.to_string()
}

/// Extract candidate links from document text. Deduplicated, ordered by
/// first occurrence.
pub fn extract_links(text: &str) -> Vec<String> {
    let href_re = regex::Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex");
    let bare_re =
        regex::Regex::new(r#"https?://[^\s"'<>\)\]]+"#).expect("valid regex");
    // "available at example.com/report", "see: data.gov", "visit whitehouse.gov"
    let phrase_re = regex::Regex::new(
        r#"(?i)\b(?:available at|see|visit)[:\s]+([a-z0-9][a-z0-9.-]*\.[a-z]{2,}(?:/[^\s"'<>\)\]]*)?)"#,
    )
    .expect("valid regex");

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut push = |raw: &str| {
        let trimmed = raw.trim_end_matches(['.', ',', ';', ':']);
        if trimmed.is_empty() {
            return;
        }
        let normalized = normalize_url(trimmed);
        if seen.insert(normalized.clone()) {
            links.push(normalized);
        }
    };

    for cap in href_re.captures_iter(text) {
        let raw = &cap[1];
        if raw.starts_with("http://") || raw.starts_with("https://") {
            push(raw);
        }
    }

    for m in bare_re.find_iter(text) {
        push(m.as_str());
    }

    for cap in phrase_re.captures_iter(text) {
        let bare = cap[1].trim_end_matches(['.', ',', ';', ':']);
        // Skip anything the bare-URL scan already caught with a scheme,
        // and single words that merely end in a TLD-looking suffix.
        if bare.contains("://") {
            continue;
        }
        push(&format!("https://{bare}"));
    }

    links
}

/// Hostname of a URL, if it parses.
pub fn domain_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Same-hostname check. A heuristic redundancy guard, distinct from the
/// exact-URL cycle guard: same-domain links are restatements, not
/// independent corroboration.
pub fn same_domain(a: &str, b: &str) -> bool {
    match (domain_of(a), domain_of(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}
