// In-memory knowledge graph for tests. Applies the same name matching as
// the Cypher lookup in `client.rs`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::novelty::{name_matches, EdgeLookup};

struct Edge {
    subject: String,
    relation_type: String,
    object: String,
}

pub struct MemoryGraph {
    edges: Mutex<Vec<Edge>>,
    unavailable: bool,
    lookups: AtomicUsize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            edges: Mutex::new(Vec::new()),
            unavailable: false,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_edge(self, subject: &str, relation_type: &str, object: &str) -> Self {
        self.insert_edge(subject, relation_type, object);
        self
    }

    /// Every lookup fails as if the connection had dropped.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn insert_edge(&self, subject: &str, relation_type: &str, object: &str) {
        self.edges.lock().unwrap().push(Edge {
            subject: subject.to_string(),
            relation_type: relation_type.to_string(),
            object: object.to_string(),
        });
    }

    /// Number of `edge_exists` calls served (including failed ones).
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeLookup for MemoryGraph {
    async fn edge_exists(
        &self,
        subject: &str,
        object: &str,
        relation_type: Option<&str>,
    ) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            bail!("MemoryGraph: connection refused");
        }

        let edges = self.edges.lock().unwrap();
        Ok(edges.iter().any(|e| {
            name_matches(&e.subject, subject)
                && name_matches(&e.object, object)
                && relation_type.map_or(true, |t| e.relation_type == t)
        }))
    }
}
