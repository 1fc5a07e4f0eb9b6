//! A stand-in for the hosted store.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use clubsync::{
    ClientConfig, CollectionError, Direction, Fields, InMemoryCollections, ListOptions, RecordId,
    RemoteCollection,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const ANON_KEY: &str = "anon-test-key";

type Reply = (StatusCode, Json<Value>);

#[derive(Clone, Default)]
pub struct FakeStore {
    pub tables: InMemoryCollections,
    pub objects: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl FakeStore {
    pub fn new(tables: InMemoryCollections) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, table: &str, query: &[(String, String)]) {
        let query: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}?{}", method, table, query.join("&")));
    }

    pub fn router(self) -> Router {
        Router::new()
            .route(
                "/rest/v1/:table",
                get(list_rows)
                    .post(insert_rows)
                    .patch(update_rows)
                    .delete(delete_rows),
            )
            .route("/storage/v1/object/:bucket/*path", post(upload_object))
            .with_state(self)
    }
}

/// Serve `router` on a random loopback port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(format!("http://{}", addr), ANON_KEY).unwrap()
}

/// A server whose every table request takes `delay` to answer.
pub fn slow_router(delay: Duration) -> Router {
    Router::new().route(
        "/rest/v1/:table",
        get(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!([]))
        }),
    )
}

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if apikey == Some(ANON_KEY) && bearer == Some(ANON_KEY) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key", "hint": null })),
        ))
    }
}

fn rejection(err: CollectionError) -> Reply {
    let message = match err {
        CollectionError::RemoteWrite { message, .. } => message,
        other => other.to_string(),
    };
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "23502", "message": message, "details": null })),
    )
}

/// `eq.5` -> 5, `eq.Chess` -> "Chess", `is.null` -> null.
fn filter_value(raw: &str) -> Value {
    if raw == "is.null" {
        return Value::Null;
    }
    let raw = raw.strip_prefix("eq.").unwrap_or(raw);
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|v| v.is_number() || v.is_boolean())
        .unwrap_or_else(|| Value::from(raw))
}

fn target_id(query: &[(String, String)]) -> Option<RecordId> {
    query
        .iter()
        .find(|(k, _)| k == "id")
        .and_then(|(_, v)| RecordId::from_value(&filter_value(v)))
}

fn list_options(query: &[(String, String)]) -> ListOptions {
    let mut options = ListOptions::new();
    for (key, value) in query {
        match key.as_str() {
            "select" => {}
            "order" => {
                let (column, direction) = value.rsplit_once('.').unwrap_or((value.as_str(), "asc"));
                let direction = if direction == "desc" {
                    Direction::Descending
                } else {
                    Direction::Ascending
                };
                options = options.order_by(column, direction);
            }
            "limit" => options = options.limit(value.parse().unwrap_or(usize::MAX)),
            field => options = options.where_eq(field, filter_value(value)),
        }
    }
    options
}

async fn list_rows(
    State(store): State<FakeStore>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    store.record("GET", &table, &query);
    match store.tables.list(&table, &list_options(&query)).await {
        Ok(rows) => (StatusCode::OK, Json(json!(rows))),
        Err(err) => rejection(err),
    }
}

async fn insert_rows(
    State(store): State<FakeStore>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(drafts): Json<Vec<Fields>>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    store.record("POST", &table, &[]);
    let mut created = Vec::new();
    for draft in &drafts {
        match store.tables.create(&table, draft).await {
            Ok(record) => created.push(record),
            Err(err) => return rejection(err),
        }
    }
    (StatusCode::CREATED, Json(json!(created)))
}

async fn update_rows(
    State(store): State<FakeStore>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(patch): Json<Fields>,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    store.record("PATCH", &table, &query);
    let Some(id) = target_id(&query) else {
        return (StatusCode::OK, Json(json!([])));
    };
    match store.tables.update(&table, &id, &patch).await {
        Ok(record) => (StatusCode::OK, Json(json!([record]))),
        Err(CollectionError::NotFound { .. }) => (StatusCode::OK, Json(json!([]))),
        Err(err) => rejection(err),
    }
}

async fn delete_rows(
    State(store): State<FakeStore>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    store.record("DELETE", &table, &query);
    let Some(id) = target_id(&query) else {
        return (StatusCode::OK, Json(json!([])));
    };
    let Ok(existing) = store.tables.get(&table, &id).await else {
        return (StatusCode::OK, Json(json!([])));
    };
    match store.tables.delete(&table, &id).await {
        Ok(()) => (StatusCode::OK, Json(json!([existing]))),
        Err(err) => rejection(err),
    }
}

async fn upload_object(
    State(store): State<FakeStore>,
    Path((bucket, path)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    if let Err(reply) = authorized(&headers) {
        return reply;
    }
    let key = format!("{}/{}", bucket, path);
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut objects = store.objects.lock().unwrap();
    if objects.contains_key(&key) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "The resource already exists" })),
        );
    }
    objects.insert(key.clone(), (content_type, body.to_vec()));
    (StatusCode::OK, Json(json!({ "Key": key })))
}
