// Scripted transport for exercising the fetch loop without a network.
//
// Responses are queued per source and served in order. A source can also
// be given a response that repeats forever once its queue is empty.

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{RedditError, Result};
use crate::transport::PageTransport;
use crate::types::{PageRequest, PageResponse};

#[derive(Debug, Clone)]
pub enum Scripted {
    Response(PageResponse),
    NetworkError(String),
}

/// A 200 search listing whose posts have ids `{source}-{i}` for `i` in `ids`.
pub fn listing_page(source: &str, ids: Range<usize>, after: Option<&str>) -> Scripted {
    let children: Vec<_> = ids
        .map(|i| {
            json!({
                "kind": "t3",
                "data": {
                    "id": format!("{source}-{i}"),
                    "title": format!("Post {i} in r/{source}"),
                    "selftext": format!("Body of post {i}"),
                    "score": i as i64,
                    "num_comments": 1,
                    "created_utc": 1_700_000_000.0 + i as f64,
                    "url": format!("https://www.reddit.com/r/{source}/comments/{i}/"),
                }
            })
        })
        .collect();

    let listing = json!({
        "kind": "Listing",
        "data": { "after": after, "children": children }
    });
    body(200, &listing.to_string())
}

pub fn status(code: u16) -> Scripted {
    body(code, "")
}

pub fn body(code: u16, body: &str) -> Scripted {
    Scripted::Response(PageResponse {
        status: code,
        body: body.to_string(),
    })
}

pub fn network_error(reason: &str) -> Scripted {
    Scripted::NetworkError(reason.to_string())
}

pub struct ScriptedTransport {
    queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
    repeating: HashMap<String, Scripted>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            repeating: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue one response for `source`.
    pub fn on_source(self, source: &str, response: Scripted) -> Self {
        self.queues
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Serve `response` for `source` whenever its queue is empty.
    pub fn always(mut self, source: &str, response: Scripted) -> Self {
        self.repeating.insert(source.to_string(), response);
        self
    }

    /// Every request seen for `source`, in order.
    pub fn requests_for(&self, source: &str) -> Vec<PageRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source == source)
            .cloned()
            .collect()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageTransport for ScriptedTransport {
    async fn get(&self, request: &PageRequest) -> Result<PageResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self
            .queues
            .lock()
            .unwrap()
            .get_mut(&request.source)
            .and_then(|q| q.pop_front())
            .or_else(|| self.repeating.get(&request.source).cloned());

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::NetworkError(reason)) => Err(RedditError::Network(reason)),
            None => Err(RedditError::Network(format!(
                "ScriptedTransport: no response scripted for r/{}",
                request.source
            ))),
        }
    }
}
