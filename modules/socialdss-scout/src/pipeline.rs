use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use socialdss_common::{
    source_summary, Extraction, SocialDssError, VerificationRecord, VerifyOptions, ADVERSE_EVENT,
    MIN_CLAIM_TEXT_CHARS,
};
use socialdss_graph::NoveltyVerifier;

use crate::extractor::ClaimExtractor;

/// What happened to one input text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextOutcome {
    /// Too short to carry a claim; the extractor was never called.
    Skipped { reason: String },
    /// The extractor errored. Nothing from this text is recorded.
    Failed { error: String },
    Extracted {
        extraction: Extraction,
        /// Relations that passed the filter and were checked against the graph.
        verified: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionLogEntry {
    pub index: usize,
    pub source: String,
    pub outcome: TextOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub run_id: Uuid,
    pub extraction_log: Vec<ExtractionLogEntry>,
    /// Ordered by text index, then relation index within the text.
    pub records: Vec<VerificationRecord>,
}

impl VerificationReport {
    pub fn processed(&self) -> usize {
        self.extraction_log.len()
    }

    pub fn skipped(&self) -> usize {
        self.count_log(|o| matches!(o, TextOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count_log(|o| matches!(o, TextOutcome::Failed { .. }))
    }

    pub fn verified(&self) -> usize {
        self.records.len()
    }

    pub fn novel(&self) -> usize {
        self.records.iter().filter(|r| r.is_novel()).count()
    }

    pub fn novel_records(&self) -> impl Iterator<Item = &VerificationRecord> {
        self.records.iter().filter(|r| r.is_novel())
    }

    fn count_log(&self, pred: impl Fn(&TextOutcome) -> bool) -> usize {
        self.extraction_log
            .iter()
            .filter(|e| pred(&e.outcome))
            .count()
    }
}

/// Reject options and input that could never produce a report. Runs before
/// the graph store or the model is contacted; blank texts count as no input.
pub fn check_input(raw_texts: &[String], options: &VerifyOptions) -> Result<(), SocialDssError> {
    options.validate()?;
    if raw_texts.iter().all(|t| t.trim().is_empty()) {
        return Err(SocialDssError::Validation(
            "no texts to analyze".to_string(),
        ));
    }
    Ok(())
}

/// Extract claims from raw texts, keep the category of interest and classify
/// each surviving claim as KNOWN or NOVEL. Texts are processed sequentially.
pub struct VerificationPipeline {
    extractor: Arc<dyn ClaimExtractor>,
    verifier: NoveltyVerifier,
}

impl VerificationPipeline {
    pub fn new(extractor: Arc<dyn ClaimExtractor>, verifier: NoveltyVerifier) -> Self {
        Self {
            extractor,
            verifier,
        }
    }

    /// Check input, then verify keeping `options.relation_type`.
    pub async fn run(
        &self,
        raw_texts: &[String],
        options: &VerifyOptions,
    ) -> Result<VerificationReport, SocialDssError> {
        check_input(raw_texts, options)?;
        self.verify_as(raw_texts, options.max_to_process, &options.relation_type)
            .await
    }

    /// Process at most `max_to_process` texts from the front of `raw_texts`,
    /// keeping adverse-event relations.
    ///
    /// Short texts and extraction failures are logged and skipped. A graph
    /// store failure aborts the call with `SocialDssError::Database`.
    pub async fn verify(
        &self,
        raw_texts: &[String],
        max_to_process: usize,
    ) -> Result<VerificationReport, SocialDssError> {
        self.verify_as(raw_texts, max_to_process, ADVERSE_EVENT)
            .await
    }

    async fn verify_as(
        &self,
        raw_texts: &[String],
        max_to_process: usize,
        relation_type: &str,
    ) -> Result<VerificationReport, SocialDssError> {
        let run_id = Uuid::new_v4();
        let batch = &raw_texts[..raw_texts.len().min(max_to_process)];
        let total = batch.len();

        info!(%run_id, total, relation_type, "Starting verification");

        let mut extraction_log = Vec::with_capacity(total);
        let mut records = Vec::new();

        for (index, text) in batch.iter().enumerate() {
            let source = source_summary(text);

            let outcome = if text.chars().count() < MIN_CLAIM_TEXT_CHARS {
                TextOutcome::Skipped {
                    reason: format!("shorter than {MIN_CLAIM_TEXT_CHARS} characters"),
                }
            } else {
                match self.extractor.extract(text).await {
                    Err(e) => {
                        warn!(%run_id, index, error = %e, "Extraction failed, skipping text");
                        TextOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                    Ok(extraction) => {
                        let candidates: Vec<_> = extraction
                            .relations
                            .iter()
                            .filter(|r| r.is_verifiable_as(relation_type))
                            .cloned()
                            .collect();

                        let verified = self
                            .verifier
                            .verify_batch(&candidates)
                            .await
                            .map_err(|e| SocialDssError::Database(format!("{e:#}")))?;

                        let count = verified.len();
                        records.extend(verified.into_iter().map(|r| r.with_source(source.clone())));
                        TextOutcome::Extracted {
                            extraction,
                            verified: count,
                        }
                    }
                }
            };

            extraction_log.push(ExtractionLogEntry {
                index,
                source,
                outcome,
            });

            info!(
                %run_id,
                done = index + 1,
                total,
                progress = (index + 1) as f64 / total as f64,
                "Verification progress"
            );
        }

        let report = VerificationReport {
            run_id,
            extraction_log,
            records,
        };
        info!(
            %run_id,
            processed = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            verified = report.verified(),
            novel = report.novel(),
            "Verification complete"
        );
        Ok(report)
    }
}
