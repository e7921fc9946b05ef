// Test doubles for the scout seams.
//
// - MockExtractor (ClaimExtractor): text → relations map, with forced failures
//   and a record of every text it was asked about.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use socialdss_common::{Extraction, Relation};

use crate::extractor::ClaimExtractor;

/// A fully populated relation with negative sentiment.
pub fn relation(subject: &str, predicate: &str, object: &str, relation_type: &str) -> Relation {
    Relation {
        subject: Some(subject.to_string()),
        predicate: Some(predicate.to_string()),
        object: Some(object.to_string()),
        relation_type: Some(relation_type.to_string()),
        sentiment: Some("Negative".to_string()),
    }
}

/// Exact-text extractor. Unregistered texts extract to nothing.
pub struct MockExtractor {
    results: HashMap<String, Extraction>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register the relations returned for `text`.
    pub fn on_text(mut self, text: &str, relations: Vec<Relation>) -> Self {
        self.results.insert(
            text.to_string(),
            Extraction {
                relations,
                ..Default::default()
            },
        );
        self
    }

    /// Make extraction of `text` fail.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Texts passed to `extract`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimExtractor for MockExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.failing.contains(text) {
            bail!("MockExtractor: extraction failed for text");
        }
        Ok(self.results.get(text).cloned().unwrap_or_default())
    }
}
