#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use kvmon_server::app;
use kvmon_server::state::AppState;
use kvmon_storage::MetricStore;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub struct TestContext {
    pub store: Arc<MetricStore>,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context(target_count: usize) -> TestContext {
    let store = Arc::new(MetricStore::new().expect("metric store should build"));
    let state = AppState::new(store.clone(), target_count);
    let app = app::build_http_app(state.clone());

    TestContext { store, state, app }
}

pub async fn request(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, String, HeaderMap) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");

    (status, String::from_utf8_lossy(&bytes).to_string(), headers)
}

/// A stand-in for Consul's `/v1/kv/<dir>/?recurse&dc=<dc>` endpoint.
///
/// Serves one JSON body per dc and answers 404 with an empty body for any
/// other dc, the way Consul does for a missing prefix.
#[derive(Clone, Default)]
pub struct FakeConsul {
    bodies: Arc<Mutex<HashMap<String, String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeConsul {
    pub fn set_body(&self, dc: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(dc.to_string(), body.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Binds an ephemeral port on loopback and serves in the background.
    pub async fn spawn(&self) -> SocketAddr {
        let router = Router::new()
            .route("/v1/kv/*path", get(kv_listing))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("fake consul should bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("fake consul should serve");
        });
        addr
    }
}

async fn kv_listing(
    State(consul): State<FakeConsul>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    consul.requests.lock().unwrap().push(uri.to_string());

    let dc = params.get("dc").cloned().unwrap_or_default();
    let body = consul.bodies.lock().unwrap().get(&dc).cloned();
    match body {
        Some(body) => (
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
