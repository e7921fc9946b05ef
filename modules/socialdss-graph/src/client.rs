use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use tracing::{debug, info};

use crate::novelty::EdgeLookup;

/// Thin wrapper around neo4rs::Graph providing connection setup.
///
/// Opened once per process and shared read-only by every verification call;
/// the underlying pool is released when the last clone is dropped.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(4)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Round-trip a trivial query so connection problems surface at startup
    /// rather than on the first verification.
    pub async fn verify_connectivity(&self) -> Result<(), neo4rs::Error> {
        let mut stream = self.graph.execute(query("RETURN 1 AS ping")).await?;
        while stream.next().await?.is_some() {}
        info!("Neo4j connectivity verified");
        Ok(())
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}

const MATCH_ANY_EDGE: &str = "MATCH (s)-[r]->(o)
     WHERE toLower(s.name) CONTAINS toLower($sub)
       AND toLower(o.name) CONTAINS toLower($obj)
     RETURN type(r) AS relation_type
     LIMIT 1";

const MATCH_TYPED_EDGE: &str = "MATCH (s)-[r]->(o)
     WHERE toLower(s.name) CONTAINS toLower($sub)
       AND toLower(o.name) CONTAINS toLower($obj)
       AND type(r) = $rel_type
     RETURN type(r) AS relation_type
     LIMIT 1";

#[async_trait]
impl EdgeLookup for GraphClient {
    async fn edge_exists(
        &self,
        subject: &str,
        object: &str,
        relation_type: Option<&str>,
    ) -> Result<bool> {
        let q = match relation_type {
            Some(rel_type) => query(MATCH_TYPED_EDGE).param("rel_type", rel_type),
            None => query(MATCH_ANY_EDGE),
        }
        .param("sub", subject)
        .param("obj", object);

        let mut stream = self
            .graph
            .execute(q)
            .await
            .context("graph edge lookup failed")?;
        let found = stream
            .next()
            .await
            .context("graph edge lookup failed")?
            .is_some();

        debug!(subject, object, relation_type = ?relation_type, found, "Edge lookup");
        Ok(found)
    }
}
