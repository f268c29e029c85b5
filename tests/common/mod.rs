//! In-process mock of the HRMS backend.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use hrms_portal::Portal;
use hrms_portal::api::ApiClient;
use hrms_portal::session::{MemoryStorage, SessionHolder};
use serde_json::{Value, json};

pub const API_PREFIX: &str = "/api/v1";

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Canned responses keyed by `(METHOD, path)`, plus a log of every hit.
#[derive(Clone, Default)]
pub struct MockBackend {
    routes: Arc<Mutex<HashMap<(String, String), (u16, Value)>>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` (path relative to the API prefix) with `status` and `body`.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_uppercase(), path.to_string()), (status, body));
        self
    }

    /// Bind an ephemeral port and return the API base URL.
    pub async fn start(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}{API_PREFIX}")
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, method: &str, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|h| h.method == method && h.path == path)
            .count()
    }

    pub fn last_hit(&self, method: &str, path: &str) -> Option<Hit> {
        self.hits()
            .into_iter()
            .rev()
            .find(|h| h.method == method && h.path == path)
    }
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    mock.hits.lock().unwrap().push(Hit {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let canned = mock
        .routes
        .lock()
        .unwrap()
        .get(&(method.to_string(), path))
        .cloned();
    match canned {
        Some((status, body)) => (StatusCode::from_u16(status).unwrap(), Json(body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response(),
    }
}

/// A portal pointed at `base_url`, with in-memory session storage.
pub fn portal(base_url: &str) -> (Portal, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionHolder::new(storage.clone(), "hrms.session");
    let api = ApiClient::new(base_url, session).unwrap();
    (Portal::new(api), storage)
}

/// Same as [`portal`], already holding `token`.
pub async fn signed_in_portal(base_url: &str, token: &str) -> (Portal, Arc<MemoryStorage>) {
    let (portal, storage) = portal(base_url);
    portal
        .session()
        .login(&json!({ "token": token, "role": "employee" }))
        .await
        .unwrap();
    (portal, storage)
}
