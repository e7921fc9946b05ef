//! Disposable Neo4j for integration tests (requires Docker).

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use crate::{query, GraphClient};

const BOLT_PORT: u16 = 7687;
const TEST_USER: &str = "neo4j";
const TEST_PASSWORD: &str = "testpassword";

/// Start a community-edition Neo4j and connect to it. Keep the returned
/// container alive for as long as the client is used.
pub async fn neo4j_container() -> (ContainerAsync<GenericImage>, GraphClient) {
    let container = GenericImage::new("neo4j", "5.25.1-community")
        .with_exposed_port(ContainerPort::Tcp(BOLT_PORT))
        .with_wait_for(WaitFor::message_on_stdout("Started."))
        .with_env_var("NEO4J_AUTH", format!("{TEST_USER}/{TEST_PASSWORD}"))
        .start()
        .await
        .expect("neo4j container should start");

    let port = container
        .get_host_port_ipv4(BOLT_PORT)
        .await
        .expect("bolt port should be mapped");

    let client = GraphClient::connect(&format!("bolt://127.0.0.1:{port}"), TEST_USER, TEST_PASSWORD)
        .await
        .expect("neo4j should accept connections");

    (container, client)
}

/// Create `(s {name}) -[:REL_TYPE]-> (o {name})`. Labels are irrelevant to
/// novelty matching, so both ends are plain `:Entity` nodes.
pub async fn seed_edge(client: &GraphClient, subject: &str, relation_type: &str, object: &str) {
    let cypher = format!(
        "MERGE (s:Entity {{name: $sub}})
         MERGE (o:Entity {{name: $obj}})
         MERGE (s)-[:{relation_type}]->(o)"
    );
    let mut stream = client
        .inner()
        .execute(query(&cypher).param("sub", subject).param("obj", object))
        .await
        .expect("seed query should run");
    while stream.next().await.expect("seed stream").is_some() {}
}
