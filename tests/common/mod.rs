#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use member_qa::{api::routes::create_router, config::Config, AppState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: usize,
    pub limit: usize,
}

/// Serves `router` on an ephemeral local port and returns its `http://` base.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Upstream stub paging over a fixed message list at `/messages/`.
pub fn messages_router(messages: Vec<Value>) -> Router {
    Router::new()
        .route("/messages/", get(page_handler))
        .with_state(Arc::new(messages))
}

async fn page_handler(
    State(messages): State<Arc<Vec<Value>>>,
    Query(query): Query<PageQuery>,
) -> Json<Value> {
    let items: Vec<Value> = messages.iter().skip(query.skip).take(query.limit).cloned().collect();
    Json(json!({ "total": messages.len(), "items": items }))
}

/// Like [`messages_router`], counting every request that reaches it.
pub fn counted_messages_router(messages: Vec<Value>, hits: Hits) -> Router {
    let messages = Arc::new(messages);
    Router::new().route(
        "/messages/",
        get(move |query: Query<PageQuery>| {
            hits.record();
            page_handler(State(messages.clone()), query)
        }),
    )
}

pub fn message(user_name: &str, text: &str) -> Value {
    json!({
        "id": format!("{}-{}", user_name, text.len()),
        "user_name": user_name,
        "message": text,
        "timestamp": "2025-01-01T00:00:00Z",
    })
}

#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn record(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Starts the question-answering service against `upstream_base`.
pub async fn spawn_app(upstream_base: &str, page_limit: usize) -> String {
    let vars: HashMap<&str, String> = HashMap::from([
        ("MESSAGES_API_BASE", upstream_base.to_string()),
        ("MESSAGES_API_TIMEOUT", "5".to_string()),
        ("MESSAGES_API_LIMIT", page_limit.to_string()),
        ("MESSAGES_API_MAX_PAGES", "10".to_string()),
        ("ASK_TIMEOUT", "20".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    serve(create_router(AppState::new(&config))).await
}
