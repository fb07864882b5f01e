pub mod health;
pub mod proxy;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use tastetag_service::UpstreamService;
use tower_http::cors::{Any, CorsLayer};

pub struct InnerAppState {
    pub upstream: UpstreamService,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(upstream: UpstreamService) -> Router {
    let state = Arc::new(InnerAppState { upstream });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(health::routes())
        .merge(proxy::routes())
        .layer(cors)
        .with_state(state)
}
