//! Scripted transport for controller tests.

use crate::api::{FetchError, HttpTransport, JikanClient};
use serde_json::{json, Value};
use shared::config::ListingConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

pub(crate) const BASE: &str = "http://jikan.test/v4";

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Duration,
}

/// Answers requests from a table keyed by path and query, relative to [`BASE`]
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, path: &str, reply: Reply, delay: Duration) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{BASE}{path}"), Route { reply, delay });
        self
    }

    pub fn reply(&self, path: &str, body: Value) -> &Self {
        self.route(path, Reply::Body(body.to_string()), Duration::ZERO)
    }

    pub fn reply_after(&self, path: &str, body: Value, delay: Duration) -> &Self {
        self.route(path, Reply::Body(body.to_string()), delay)
    }

    pub fn raw(&self, path: &str, body: &str) -> &Self {
        self.route(path, Reply::Body(body.to_string()), Duration::ZERO)
    }

    pub fn status(&self, path: &str, status: u16) -> &Self {
        self.route(path, Reply::Status(status), Duration::ZERO)
    }

    /// Requested paths, in issue order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|url| url.strip_prefix(BASE).unwrap_or(url).to_string())
            .collect()
    }
}

impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let route = self.routes.lock().unwrap().get(url).cloned();

        let Some(route) = route else {
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: "no route".to_string(),
            });
        };

        if !route.delay.is_zero() {
            sleep(route.delay).await;
        }

        match route.reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

pub(crate) fn client(transport: &MockTransport) -> Arc<JikanClient<MockTransport>> {
    Arc::new(
        JikanClient::with_transport(BASE, ListingConfig::default(), transport.clone()).unwrap(),
    )
}

pub(crate) fn anime(id: u64, title: &str) -> Value {
    json!({
        "mal_id": id,
        "title": title,
        "type": "TV",
        "episodes": 12,
        "score": 8.5,
        "images": { "jpg": { "image_url": format!("https://cdn.test/{id}.jpg") } },
        "genres": [{ "mal_id": 1, "name": "Action" }]
    })
}

pub(crate) fn manga(id: u64, title: &str) -> Value {
    json!({
        "mal_id": id,
        "title": title,
        "type": "Manga",
        "chapters": 100,
        "volumes": 10,
        "score": 9.0
    })
}

pub(crate) fn listing(records: Vec<Value>) -> Value {
    json!({ "data": records })
}
