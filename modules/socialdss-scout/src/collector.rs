use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reddit_client::{FetchOutcome, RateLimitedFetcher, SourceFetch};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use socialdss_common::{CollectOptions, Post, SocialDssError, TimeHorizon};

/// How one source's fetch went.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source: String,
    pub count: usize,
    pub outcome: FetchOutcome,
}

/// Flattened result of a multi-source collection: posts in source order,
/// then arrival order within each source.
#[derive(Debug, Clone)]
pub struct Collection {
    pub run_id: Uuid,
    pub posts: Vec<Post>,
    pub sources: Vec<SourceSummary>,
}

impl Collection {
    fn from_fetches(run_id: Uuid, fetches: Vec<SourceFetch>) -> Self {
        let mut posts = Vec::new();
        let mut sources = Vec::with_capacity(fetches.len());
        for fetch in fetches {
            sources.push(SourceSummary {
                source: fetch.source,
                count: fetch.posts.len(),
                outcome: fetch.outcome,
            });
            posts.extend(fetch.posts);
        }
        Self {
            run_id,
            posts,
            sources,
        }
    }

    /// True when every queried source failed and nothing at all was
    /// collected, as opposed to nothing matching. Partial posts from failed
    /// sources still count as a usable result.
    pub fn all_failed(&self) -> bool {
        self.posts.is_empty()
            && !self.sources.is_empty()
            && self.sources.iter().all(|s| s.outcome.is_failure())
    }

    pub fn failed_sources(&self) -> Vec<&SourceSummary> {
        self.sources
            .iter()
            .filter(|s| s.outcome.is_failure())
            .collect()
    }

    /// Drop posts outside `horizon`. Per-source counts keep what was fetched.
    pub fn within(mut self, horizon: TimeHorizon, now: DateTime<Utc>) -> Self {
        self.posts = horizon.retain(self.posts, now);
        self
    }
}

/// Fans one query out across many sources, one task per source.
pub struct ConcurrentCollector {
    fetcher: RateLimitedFetcher,
}

impl ConcurrentCollector {
    pub fn new(fetcher: RateLimitedFetcher) -> Self {
        Self { fetcher }
    }

    /// Validate options, then collect. Nothing touches the network when
    /// validation fails.
    pub async fn run(&self, options: &CollectOptions) -> Result<Collection, SocialDssError> {
        options.validate()?;
        Ok(self
            .collect(&options.query, &options.sources, options.limit_per_source)
            .await)
    }

    /// Fetch `query` from every source concurrently and wait for all of them.
    ///
    /// A failing or panicking source contributes whatever it collected (or
    /// nothing) and never cancels its siblings. Repeated source ids are
    /// fetched once, at their first position.
    pub async fn collect(&self, query: &str, sources: &[String], limit_per_source: usize) -> Collection {
        let run_id = Uuid::new_v4();

        let mut seen = HashSet::new();
        let sources: Vec<String> = sources
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        info!(%run_id, query, sources = sources.len(), limit_per_source, "Starting collection");

        let tasks = sources.into_iter().map(|source| {
            let fetcher = self.fetcher.clone();
            let query = query.to_string();
            let span = info_span!("source_fetch", %run_id, source = source.as_str());
            let task_source = source.clone();
            let handle = tokio::spawn(
                async move { fetcher.fetch(&task_source, &query, limit_per_source).await }
                    .instrument(span),
            );

            async move {
                match handle.await {
                    Ok(fetch) => fetch,
                    Err(e) => {
                        warn!(source = source.as_str(), error = %e, "Fetch task failed");
                        SourceFetch {
                            source,
                            posts: Vec::new(),
                            outcome: FetchOutcome::TaskFailed {
                                reason: e.to_string(),
                            },
                        }
                    }
                }
            }
        });

        let fetches = join_all(tasks).await;
        let collection = Collection::from_fetches(run_id, fetches);

        info!(
            %run_id,
            total = collection.posts.len(),
            failed = collection.failed_sources().len(),
            "Collection complete"
        );
        collection
    }
}
