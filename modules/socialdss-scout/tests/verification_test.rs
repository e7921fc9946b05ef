//! Verification pipeline end to end with a mock extractor and in-memory graph.

use std::sync::Arc;

use socialdss_common::{NoveltyStatus, SocialDssError, ADVERSE_EVENT};
use socialdss_graph::testing::MemoryGraph;
use socialdss_graph::NoveltyVerifier;
use socialdss_scout::testing::{relation, MockExtractor};
use socialdss_scout::{TextOutcome, VerificationPipeline};

const BLOAT_TEXT: &str = "Creatine gummies left me super bloated all week";
const HEADACHE_TEXT: &str = "Two scoops of creatine and I had a headache for hours";

fn creatine_graph() -> Arc<MemoryGraph> {
    Arc::new(MemoryGraph::new().with_edge("Creatine Monohydrate", "CAUSES", "Bloating"))
}

fn pipeline(extractor: Arc<MockExtractor>, graph: Arc<MemoryGraph>) -> VerificationPipeline {
    VerificationPipeline::new(extractor, NoveltyVerifier::new(graph))
}

fn extractor() -> MockExtractor {
    MockExtractor::new()
        .on_text(
            BLOAT_TEXT,
            vec![relation("Creatine", "CAUSES", "Bloat", ADVERSE_EVENT)],
        )
        .on_text(
            HEADACHE_TEXT,
            vec![relation("Creatine", "CAUSES", "Headache", ADVERSE_EVENT)],
        )
}

#[tokio::test]
async fn known_and_novel_claims_in_text_order() {
    let texts = vec![BLOAT_TEXT.to_string(), HEADACHE_TEXT.to_string()];

    let report = pipeline(Arc::new(extractor()), creatine_graph())
        .verify(&texts, 5)
        .await
        .unwrap();

    let statuses: Vec<_> = report
        .records
        .iter()
        .map(|r| (r.object.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![("Bloat", NoveltyStatus::Known), ("Headache", NoveltyStatus::Novel)]
    );
    assert_eq!(report.processed(), 2);
    assert_eq!(report.verified(), 2);
    assert_eq!(report.novel(), 1);
}

#[tokio::test]
async fn short_text_is_skipped_without_calling_the_model() {
    let extractor = Arc::new(extractor());
    let texts = vec![
        BLOAT_TEXT.to_string(),
        "meh".to_string(),
        HEADACHE_TEXT.to_string(),
    ];

    let report = pipeline(extractor.clone(), creatine_graph())
        .verify(&texts, 5)
        .await
        .unwrap();

    assert!(matches!(
        report.extraction_log[1].outcome,
        TextOutcome::Skipped { .. }
    ));
    assert_eq!(report.skipped(), 1);
    assert_eq!(extractor.calls(), vec![BLOAT_TEXT, HEADACHE_TEXT]);
}

#[tokio::test]
async fn max_to_process_bounds_model_calls() {
    let extractor = Arc::new(extractor());
    let texts = vec![BLOAT_TEXT.to_string(), HEADACHE_TEXT.to_string()];

    let report = pipeline(extractor.clone(), creatine_graph())
        .verify(&texts, 1)
        .await
        .unwrap();

    assert_eq!(report.processed(), 1);
    assert_eq!(extractor.calls().len(), 1);
}

#[tokio::test]
async fn extraction_failure_skips_only_that_text() {
    let extractor = Arc::new(extractor().failing_on(BLOAT_TEXT));
    let texts = vec![BLOAT_TEXT.to_string(), HEADACHE_TEXT.to_string()];

    let report = pipeline(extractor, creatine_graph())
        .verify(&texts, 5)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].object, "Headache");
}

#[tokio::test]
async fn relation_with_empty_object_is_never_looked_up() {
    let graph = creatine_graph();
    let extractor = Arc::new(MockExtractor::new().on_text(
        HEADACHE_TEXT,
        vec![relation("Creatine", "CAUSES", "", ADVERSE_EVENT)],
    ));

    let report = pipeline(extractor, graph.clone())
        .verify(&[HEADACHE_TEXT.to_string()], 5)
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(graph.lookups(), 0);
    assert!(matches!(
        report.extraction_log[0].outcome,
        TextOutcome::Extracted { verified: 0, .. }
    ));
}

#[tokio::test]
async fn store_failure_is_fatal() {
    let graph = Arc::new(MemoryGraph::new().unavailable());
    let texts = vec![BLOAT_TEXT.to_string(), HEADACHE_TEXT.to_string()];

    let err = pipeline(Arc::new(extractor()), graph)
        .verify(&texts, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, SocialDssError::Database(_)));
}

#[tokio::test]
async fn claim_turns_known_once_graph_gains_the_edge() {
    let graph = Arc::new(MemoryGraph::new());
    let pipeline = pipeline(Arc::new(extractor()), graph.clone());
    let texts = vec![HEADACHE_TEXT.to_string()];

    let before = pipeline.verify(&texts, 5).await.unwrap();
    assert_eq!(before.records[0].status, NoveltyStatus::Novel);

    graph.insert_edge("Creatine", "CAUSES", "Headache");

    let after = pipeline.verify(&texts, 5).await.unwrap();
    assert_eq!(after.records[0].status, NoveltyStatus::Known);
}
