use std::env;
use std::time::Duration;

/// Tuning knobs for the traversal engine and orchestrator. Every field has
/// a sane default; `from_env` overrides from the environment where set.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Maximum recursion depth per traversal.
    pub max_depth: usize,
    /// Maximum child links followed from any one source.
    pub max_fan_out: usize,
    /// Maximum starting URLs per claim.
    pub max_starting_urls: usize,
    /// Wall-clock budget for one traversal branch.
    pub branch_timeout: Duration,
    /// Content is truncated to this many characters before classification.
    pub classification_content_limit: usize,
    /// Claims processed per batch in evidence-gathering mode.
    pub batch_size: usize,
    /// Pause between batches.
    pub batch_delay: Duration,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_fan_out: 5,
            max_starting_urls: 10,
            branch_timeout: Duration::from_secs(45),
            classification_content_limit: 8_000,
            batch_size: 3,
            batch_delay: Duration::from_secs(2),
        }
    }
}

impl TraceConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            max_depth: env_usize("TRACE_MAX_DEPTH", d.max_depth),
            max_fan_out: env_usize("TRACE_MAX_FAN_OUT", d.max_fan_out),
            max_starting_urls: env_usize("TRACE_MAX_STARTING_URLS", d.max_starting_urls),
            branch_timeout: Duration::from_secs(env_u64(
                "TRACE_BRANCH_TIMEOUT_SECS",
                d.branch_timeout.as_secs(),
            )),
            classification_content_limit: env_usize(
                "TRACE_CONTENT_LIMIT",
                d.classification_content_limit,
            ),
            batch_size: env_usize("TRACE_BATCH_SIZE", d.batch_size),
            batch_delay: Duration::from_secs(env_u64(
                "TRACE_BATCH_DELAY_SECS",
                d.batch_delay.as_secs(),
            )),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
