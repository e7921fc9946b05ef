pub mod client;
pub mod novelty;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use neo4rs::query;
pub use novelty::{name_matches, normalize_relation_type, EdgeLookup, MatchPolicy, NoveltyVerifier};
