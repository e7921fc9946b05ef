//! Multi-source collection against scripted transports.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use reddit_client::testing::{listing_page, network_error, status, ScriptedTransport};
use reddit_client::{FetchOutcome, FetchPolicy, PageRequest, PageResponse, PageTransport, RateLimitedFetcher};
use socialdss_common::TimeHorizon;
use socialdss_scout::ConcurrentCollector;

fn collector(transport: Arc<dyn PageTransport>) -> ConcurrentCollector {
    ConcurrentCollector::new(
        RateLimitedFetcher::new(transport).with_policy(FetchPolicy::without_delays()),
    )
}

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn rate_limited_source_does_not_affect_siblings() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .on_source("supplements", listing_page("supplements", 0..10, None))
            .always("nutrition", status(429))
            .on_source("biohackers", listing_page("biohackers", 0..5, None)),
    );

    let collection = collector(transport.clone())
        .collect("AG1", &sources(&["supplements", "nutrition", "biohackers"]), 100)
        .await;

    assert_eq!(collection.posts.len(), 15);
    assert!(collection.posts[..10].iter().all(|p| p.source == "supplements"));
    assert!(collection.posts[10..].iter().all(|p| p.source == "biohackers"));

    let outcomes: Vec<_> = collection.sources.iter().map(|s| s.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            FetchOutcome::Exhausted,
            FetchOutcome::RateLimited { retries: 3 },
            FetchOutcome::Exhausted,
        ]
    );
    assert_eq!(transport.requests_for("nutrition").len(), 4);
    assert!(!collection.all_failed());
    assert_eq!(collection.failed_sources().len(), 1);
}

#[tokio::test]
async fn posts_keep_arrival_order_within_a_source() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .on_source("fitness", listing_page("fitness", 0..3, Some("t3_b")))
            .on_source("fitness", listing_page("fitness", 3..6, None)),
    );

    let collection = collector(transport)
        .collect("creatine", &sources(&["fitness"]), 100)
        .await;

    let ids: Vec<_> = collection.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["fitness-0", "fitness-1", "fitness-2", "fitness-3", "fitness-4", "fitness-5"]
    );
}

#[tokio::test]
async fn partial_results_survive_a_network_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .on_source("frugal", listing_page("frugal", 0..25, Some("t3_x")))
            .on_source("frugal", network_error("connection reset")),
    );

    let collection = collector(transport)
        .collect("protein", &sources(&["frugal"]), 100)
        .await;

    assert_eq!(collection.posts.len(), 25);
    assert!(matches!(
        collection.sources[0].outcome,
        FetchOutcome::Transport { .. }
    ));
    assert_eq!(collection.failed_sources().len(), 1);
    assert!(!collection.all_failed());
}

struct PanicsFor {
    source: &'static str,
    inner: ScriptedTransport,
}

#[async_trait]
impl PageTransport for PanicsFor {
    async fn get(&self, request: &PageRequest) -> reddit_client::Result<PageResponse> {
        if request.source == self.source {
            panic!("transport bug");
        }
        self.inner.get(request).await
    }
}

#[tokio::test]
async fn panicking_task_is_reported_as_failed_source() {
    let transport = Arc::new(PanicsFor {
        source: "gymsnark",
        inner: ScriptedTransport::new()
            .on_source("nutrition", listing_page("nutrition", 0..4, None)),
    });

    let collection = collector(transport)
        .collect("pre-workout", &sources(&["gymsnark", "nutrition"]), 100)
        .await;

    assert_eq!(collection.posts.len(), 4);
    assert_eq!(collection.sources[0].source, "gymsnark");
    assert_eq!(collection.sources[0].count, 0);
    assert!(matches!(
        collection.sources[0].outcome,
        FetchOutcome::TaskFailed { .. }
    ));
    assert_eq!(collection.sources[1].outcome, FetchOutcome::Exhausted);
}

#[tokio::test]
async fn horizon_filter_drops_old_posts() {
    // listing_page timestamps start at 1_700_000_000 (2023-11-14)
    let transport = Arc::new(
        ScriptedTransport::new().on_source("supplements", listing_page("supplements", 0..3, None)),
    );
    let collection = collector(transport)
        .collect("AG1", &sources(&["supplements"]), 100)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let recent = collection.clone().within(TimeHorizon::Last90Days, now);
    assert!(recent.posts.is_empty());

    let all = collection.within(TimeHorizon::AllTime, now);
    assert_eq!(all.posts.len(), 3);
}

/// Answers every request with a one-page listing after a fixed latency.
struct SlowTransport {
    latency: Duration,
}

#[async_trait]
impl PageTransport for SlowTransport {
    async fn get(&self, request: &PageRequest) -> reddit_client::Result<PageResponse> {
        tokio::time::sleep(self.latency).await;
        ScriptedTransport::new()
            .on_source(&request.source, listing_page(&request.source, 0..2, None))
            .get(request)
            .await
    }
}

#[tokio::test(start_paused = true)]
async fn sources_are_fetched_concurrently() {
    let latency = Duration::from_millis(300);
    let names = ["supplements", "nutrition", "frugal", "biohackers"];

    let started = tokio::time::Instant::now();
    let collection = collector(Arc::new(SlowTransport { latency }))
        .collect("AG1", &sources(&names), 100)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(collection.posts.len(), 2 * names.len());
    assert!(elapsed >= latency);
    // sequential fetching would take one latency per source
    assert!(
        elapsed < latency * 2,
        "4 sources took {elapsed:?}, expected about one request's latency"
    );
}
