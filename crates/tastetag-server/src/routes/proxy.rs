use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tastetag_core::{ProxyRequest, ProxyResponse};
use tastetag_service::ServiceError;
use tracing::{error, info};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/proxy", post(proxy))
}

/// Forward the tag to the recommendation service and add a `places` alias
/// of its `recommendations` to the body.
async fn proxy(
    State(state): State<AppState>,
    Json(input): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, (StatusCode, Json<Value>)> {
    if input.tag.trim().is_empty() {
        return Err(to_error(ServiceError::InvalidInput(
            "tag must not be empty".into(),
        )));
    }

    let listing = state
        .upstream
        .full_service(&input.tag)
        .await
        .map_err(|e| {
            error!(tag = %input.tag, "upstream fetch failed: {e}");
            to_error(e)
        })?;

    info!(tag = %input.tag, count = listing.len(), "proxied recommendations");
    Ok(Json(ProxyResponse::from_upstream(listing)))
}

fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Transport(_) | ServiceError::Status { .. } | ServiceError::Malformed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}
