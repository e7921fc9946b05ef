use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use socialdss_common::Post;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::transport::{HttpTransport, PageTransport};
use crate::types::{PageRequest, SearchListing};

/// Browser identities rotated per source fetch. The endpoint rejects
/// default library user agents.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

// --- Policy ---

/// Pagination, retry and pacing knobs for a source fetch.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub page_size: u32,
    /// `new`, `top` or `relevance`.
    pub sort: String,
    /// 429 retries per page before the source is abandoned.
    pub max_retries: u32,
    /// Upper bound on the exponential part of the backoff.
    pub backoff_cap: Duration,
    /// Random jitter added to each backoff wait.
    pub backoff_jitter: (Duration, Duration),
    /// Random pause between successful pages.
    pub politeness_delay: (Duration, Duration),
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            page_size: 25,
            sort: "new".to_string(),
            max_retries: 3,
            backoff_cap: Duration::from_secs(60),
            backoff_jitter: (Duration::from_secs(1), Duration::from_secs(3)),
            politeness_delay: (Duration::from_millis(1500), Duration::from_secs(3)),
        }
    }
}

impl FetchPolicy {
    /// Same retry semantics with every sleep removed.
    pub fn without_delays() -> Self {
        Self {
            backoff_cap: Duration::ZERO,
            backoff_jitter: (Duration::ZERO, Duration::ZERO),
            politeness_delay: (Duration::ZERO, Duration::ZERO),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// `min(2^retries s, cap) + jitter`.
    pub fn backoff_delay(&self, retries: u32) -> Duration {
        let exponential = Duration::from_secs(2u64.saturating_pow(retries)).min(self.backoff_cap);
        exponential + random_between(self.backoff_jitter)
    }

    pub fn politeness(&self) -> Duration {
        random_between(self.politeness_delay)
    }
}

fn random_between((min, max): (Duration, Duration)) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())]
}

// --- Outcome ---

/// Why a source fetch stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The source ran out of results (empty page or no cursor).
    Exhausted,
    /// The requested number of posts was collected.
    LimitReached,
    /// Still rate limited after the maximum number of retries.
    RateLimited { retries: u32 },
    /// Non-200, non-429 response.
    HttpStatus { status: u16 },
    /// 200 response whose body was not a search listing.
    Malformed { reason: String },
    /// No HTTP response at all (timeout, connection error).
    Transport { reason: String },
    /// The task running the fetch died before reporting.
    TaskFailed { reason: String },
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, FetchOutcome::Exhausted | FetchOutcome::LimitReached)
    }
}

impl std::fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Exhausted => write!(f, "exhausted"),
            FetchOutcome::LimitReached => write!(f, "limit reached"),
            FetchOutcome::RateLimited { retries } => {
                write!(f, "rate limited after {retries} retries")
            }
            FetchOutcome::HttpStatus { status } => write!(f, "HTTP {status}"),
            FetchOutcome::Malformed { reason } => write!(f, "malformed response: {reason}"),
            FetchOutcome::Transport { reason } => write!(f, "network error: {reason}"),
            FetchOutcome::TaskFailed { reason } => write!(f, "fetch task failed: {reason}"),
        }
    }
}

/// Posts collected from one source plus how the fetch ended. Posts are kept
/// even when the outcome is a failure.
#[derive(Debug, Clone)]
pub struct SourceFetch {
    pub source: String,
    pub posts: Vec<Post>,
    pub outcome: FetchOutcome,
}

// --- Fetcher ---

/// Paginates one query against one source, backing off on 429s.
/// Cheap to clone; each `fetch` call owns its own cursor and retry counter.
#[derive(Clone)]
pub struct RateLimitedFetcher {
    transport: Arc<dyn PageTransport>,
    policy: FetchPolicy,
}

impl RateLimitedFetcher {
    pub fn new(transport: Arc<dyn PageTransport>) -> Self {
        Self {
            transport,
            policy: FetchPolicy::default(),
        }
    }

    /// Fetcher backed by the real HTTP endpoint.
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Collect up to `limit` posts for `query` from `source`.
    ///
    /// Never fails: every error ends this source's fetch and is reported in
    /// the outcome alongside whatever was collected before it.
    pub async fn fetch(&self, source: &str, query: &str, limit: usize) -> SourceFetch {
        let user_agent = pick_user_agent();
        let mut posts: Vec<Post> = Vec::new();
        let mut after: Option<String> = None;
        let mut retries: u32 = 0;

        info!(source, query, limit, "Starting source fetch");

        let outcome = loop {
            if posts.len() >= limit {
                break FetchOutcome::LimitReached;
            }

            let request = PageRequest {
                source: source.to_string(),
                query: query.to_string(),
                page_size: self.policy.page_size,
                sort: self.policy.sort.clone(),
                after: after.clone(),
                user_agent: user_agent.to_string(),
            };

            let response = match self.transport.get(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(source, error = %e, collected = posts.len(), "Request failed, abandoning source");
                    break FetchOutcome::Transport {
                        reason: e.to_string(),
                    };
                }
            };

            match response.status {
                200 => {}
                429 => {
                    if retries >= self.policy.max_retries {
                        warn!(source, retries, collected = posts.len(), "Max retries reached, abandoning source");
                        break FetchOutcome::RateLimited { retries };
                    }
                    let wait = self.policy.backoff_delay(retries);
                    warn!(
                        source,
                        attempt = retries + 1,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited (429), backing off"
                    );
                    tokio::time::sleep(wait).await;
                    retries += 1;
                    continue;
                }
                status => {
                    warn!(source, status, collected = posts.len(), "Unexpected status, abandoning source");
                    break FetchOutcome::HttpStatus { status };
                }
            }

            retries = 0;

            let listing: SearchListing = match serde_json::from_str(&response.body) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(source, error = %e, "Malformed search page, abandoning source");
                    break FetchOutcome::Malformed {
                        reason: e.to_string(),
                    };
                }
            };

            let next = listing.next_cursor();
            if listing.data.children.is_empty() {
                info!(source, collected = posts.len(), "No more results");
                break FetchOutcome::Exhausted;
            }

            posts.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .map(|child| child.data.into_post(source)),
            );
            debug!(source, collected = posts.len(), "Collected page");

            match next {
                Some(cursor) => after = Some(cursor),
                None => break FetchOutcome::Exhausted,
            }

            if posts.len() >= limit {
                break FetchOutcome::LimitReached;
            }

            tokio::time::sleep(self.policy.politeness()).await;
        };

        posts.truncate(limit);
        info!(source, count = posts.len(), outcome = %outcome, "Finished source fetch");

        SourceFetch {
            source: source.to_string(),
            posts,
            outcome,
        }
    }
}
