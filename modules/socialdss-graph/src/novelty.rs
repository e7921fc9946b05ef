use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use socialdss_common::{NoveltyStatus, Relation, VerificationRecord};

// ---------------------------------------------------------------------------
// EdgeLookup — read-only existence query against the knowledge graph
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EdgeLookup: Send + Sync {
    /// Whether any directed edge `s -> o` exists where `s.name` contains
    /// `subject` and `o.name` contains `object`, both case-insensitively.
    /// `relation_type`, when given, must equal the edge's type exactly.
    async fn edge_exists(
        &self,
        subject: &str,
        object: &str,
        relation_type: Option<&str>,
    ) -> Result<bool>;
}

/// Case-insensitive containment, the comparison every `EdgeLookup` applies
/// to node names.
pub fn name_matches(stored: &str, query: &str) -> bool {
    stored.to_lowercase().contains(&query.to_lowercase())
}

/// Upper-snake edge type for a free-text predicate: "does not contain" →
/// `DOES_NOT_CONTAIN`.
pub fn normalize_relation_type(predicate: &str) -> String {
    predicate
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

// ---------------------------------------------------------------------------
// Match policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Any edge between fuzzily matched endpoints counts.
    #[default]
    Substring,
    /// The edge type must also equal the claim's normalized predicate.
    Typed,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(MatchPolicy::Substring),
            "typed" => Ok(MatchPolicy::Typed),
            other => Err(format!(
                "unknown match policy '{other}' (expected substring or typed)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// NoveltyVerifier
// ---------------------------------------------------------------------------

/// Classifies claims as KNOWN or NOVEL against the graph. Every call is a
/// fresh read; nothing is cached, so a claim turns KNOWN as soon as the
/// graph gains a matching edge.
#[derive(Clone)]
pub struct NoveltyVerifier {
    store: Arc<dyn EdgeLookup>,
    policy: MatchPolicy,
}

impl NoveltyVerifier {
    pub fn new(store: Arc<dyn EdgeLookup>) -> Self {
        Self {
            store,
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Existence check for one subject/object pair, ignoring edge type.
    pub async fn verify_one(&self, subject: &str, object: &str) -> Result<NoveltyStatus> {
        let found = self
            .store
            .edge_exists(subject, object, None)
            .await
            .with_context(|| format!("verifying '{subject}' -> '{object}'"))?;
        Ok(NoveltyStatus::from_match(found))
    }

    /// Verify one relation under the configured policy. Relations missing
    /// either endpoint yield `None`.
    pub async fn verify_relation(&self, relation: &Relation) -> Result<Option<VerificationRecord>> {
        let Some((subject, object)) = relation.endpoints() else {
            return Ok(None);
        };

        let relation_type = match self.policy {
            MatchPolicy::Substring => None,
            MatchPolicy::Typed => relation
                .predicate
                .as_deref()
                .map(normalize_relation_type)
                .filter(|t| !t.is_empty()),
        };

        let found = self
            .store
            .edge_exists(subject, object, relation_type.as_deref())
            .await
            .with_context(|| format!("verifying '{subject}' -> '{object}'"))?;
        let status = NoveltyStatus::from_match(found);

        debug!(subject, object, %status, "Claim verified");
        Ok(VerificationRecord::for_relation(relation, status))
    }

    /// Verify every relation in order. The first store failure aborts the
    /// whole batch; no partial list is returned.
    pub async fn verify_batch(&self, relations: &[Relation]) -> Result<Vec<VerificationRecord>> {
        let mut records = Vec::with_capacity(relations.len());
        for relation in relations {
            if let Some(record) = self.verify_relation(relation).await? {
                records.push(record);
            }
        }

        let novel = records.iter().filter(|r| r.is_novel()).count();
        info!(verified = records.len(), novel, "Batch verified");
        Ok(records)
    }
}
