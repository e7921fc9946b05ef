pub mod collector;
pub mod dataset;
pub mod extractor;
pub mod pipeline;
pub mod pulse;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use collector::{Collection, ConcurrentCollector, SourceSummary};
pub use extractor::{ClaimExtractor, LlmClaimExtractor};
pub use pipeline::{ExtractionLogEntry, TextOutcome, VerificationPipeline, VerificationReport};
pub use pulse::MarketPulse;
