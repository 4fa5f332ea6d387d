use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::api::models::{AskRequest, AskResponse, ServiceInfo};
use crate::{AppState, SERVICE_NAME};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/ask", post(ask_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        endpoints: vec!["/ask"],
        status: "ok",
    })
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start_time = std::time::Instant::now();

    let answer = state.answerer.answer(&req.question).await?;

    info!(elapsed = ?start_time.elapsed(), "Answered question");
    Ok(Json(AskResponse { answer }))
}
