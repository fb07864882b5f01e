use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tastetag_service::UpstreamService;
use tokio::net::TcpListener;

/// Scripted stand-in for the external recommendation service.
///
/// Serves `GET /instagram/{tag}/full-service` from registered listings and
/// `POST /rewrite` with a fixed revision, recording every request it sees.
#[derive(Clone, Default)]
pub struct FakeUpstream {
    inner: Arc<Mutex<FakeUpstreamState>>,
}

#[derive(Default)]
struct FakeUpstreamState {
    listings: HashMap<String, Value>,
    failing_tags: HashSet<String>,
    rewrite_status: Option<StatusCode>,
    rewrite_reply: Option<Value>,
    full_service_requests: Vec<String>,
    rewrite_requests: Vec<Value>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw full-service body for `tag`.
    pub fn with_listing(self, tag: &str, body: Value) -> Self {
        self.lock().listings.insert(tag.to_string(), body);
        self
    }

    /// Register `names` as the recommendations for `tag`.
    pub fn with_restaurants(self, tag: &str, names: &[&str]) -> Self {
        let recommendations: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "restaurant_name": name,
                    "restaurant_location": format!("{name} Street"),
                    "restaurant_description": format!("About {name}"),
                })
            })
            .collect();
        self.with_listing(
            tag,
            json!({
                "username": tag,
                "recommendations": recommendations,
                "output_files": { "analysis": format!("outputs/{tag}_analysis.json") },
            }),
        )
    }

    /// Answer full-service requests for `tag` with a 500.
    pub fn failing_tag(self, tag: &str) -> Self {
        self.lock().failing_tags.insert(tag.to_string());
        self
    }

    /// Answer rewrite requests with `status` instead of a revision.
    pub fn failing_rewrite(self, status: StatusCode) -> Self {
        self.lock().rewrite_status = Some(status);
        self
    }

    /// Answer rewrite requests with `body` instead of the default revision.
    pub fn with_rewrite_reply(self, body: Value) -> Self {
        self.lock().rewrite_reply = Some(body);
        self
    }

    /// Stop failing a tag that was registered with `failing_tag`.
    pub fn recover_tag(&self, tag: &str) {
        self.lock().failing_tags.remove(tag);
    }

    pub fn full_service_requests(&self) -> Vec<String> {
        self.lock().full_service_requests.clone()
    }

    pub fn rewrite_requests(&self) -> Vec<Value> {
        self.lock().rewrite_requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeUpstreamState> {
        self.inner.lock().unwrap()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/instagram/{tag}/full-service", get(fake_full_service))
            .route("/rewrite", post(fake_rewrite))
            .with_state(self.clone())
    }
}

async fn fake_full_service(
    State(fake): State<FakeUpstream>,
    Path(tag): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut state = fake.lock();
    state.full_service_requests.push(tag.clone());
    if state.failing_tags.contains(&tag) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Error in full service recommendations" })),
        );
    }
    match state.listings.get(&tag) {
        Some(body) => (StatusCode::OK, Json(body.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("unknown user {tag}") })),
        ),
    }
}

async fn fake_rewrite(
    State(fake): State<FakeUpstream>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = fake.lock();
    state.rewrite_requests.push(body);
    if let Some(status) = state.rewrite_status {
        return (status, Json(json!({ "detail": "rewrite failed" })));
    }
    let reply = state.rewrite_reply.clone().unwrap_or_else(|| {
        json!({
            "current_prompt": "Describe this customer.",
            "response": "Describe this customer, favouring bakeries.",
        })
    });
    (StatusCode::OK, Json(reply))
}

/// Build a proxy router pointed at `upstream_url`.
pub fn test_router(upstream_url: &str) -> Router {
    crate::routes::build_router(UpstreamService::new(upstream_url))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}

/// Spawn the fake recommendation service on a random port.
pub async fn spawn_fake_upstream(fake: &FakeUpstream) -> TestServer {
    spawn_router(fake.router()).await
}

/// Spawn the proxy on a random port, forwarding to `upstream_url`.
pub async fn spawn_test_server(upstream_url: &str) -> TestServer {
    spawn_router(test_router(upstream_url)).await
}

/// Fake upstream plus a proxy in front of it: `(upstream, proxy)`.
pub async fn spawn_stack(fake: &FakeUpstream) -> (TestServer, TestServer) {
    let upstream = spawn_fake_upstream(fake).await;
    let proxy = spawn_test_server(&upstream.base_url).await;
    (upstream, proxy)
}
