//! # recetario-api
//!
//! HTTP surface for recipe search, publishing, and rating.
//!
//! [`router`] wires the routes over an [`AppState`]; [`build_app`] adds the
//! middleware stack used in production (tracing, request ids, CORS, body
//! limit, panic catching).

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod services;

use axum::http::{header, HeaderName, Method, Request};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use uuid::Uuid;

use recetario_core::Backends;
use recetario_search::SearchExecutor;

use crate::config::ApiConfig;
use crate::services::{Catalogue, RatingAggregator};

/// Request ID generator using UUIDv7 for time-ordered, unique request IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Shared handler state. Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub search: SearchExecutor,
    pub ratings: RatingAggregator,
    pub catalogue: Catalogue,
    pub identity_header: HeaderName,
}

impl AppState {
    pub fn new(backends: Backends, identity_header: HeaderName) -> Self {
        let search = SearchExecutor::new(backends.clone());
        Self {
            catalogue: Catalogue::new(backends.clone(), search.clone()),
            ratings: RatingAggregator::new(backends),
            search,
            identity_header,
        }
    }
}

/// Routes without middleware.
pub fn router(state: AppState) -> Router {
    use handlers::{categories, ratings, recipes};

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi_json))
        .route("/api/recipes", axum::routing::post(recipes::create_recipe))
        .route("/api/recipes/search", get(recipes::search_recipes))
        .route("/api/recipes/latest", get(recipes::latest_recipes))
        .route("/api/recipes/:id", get(recipes::get_recipe))
        .route(
            "/api/recipes/:id/ratings",
            get(ratings::list_ratings).post(ratings::rate_recipe),
        )
        .route("/api/categories", get(categories::list_categories))
        .with_state(state)
}

/// Routes plus the production middleware stack.
pub fn build_app(state: AppState, config: &ApiConfig) -> Router {
    let mut allowed_headers = vec![header::CONTENT_TYPE, header::ACCEPT];
    allowed_headers.push(config.identity_header.clone());

    router(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(allowed_headers)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(CatchPanicLayer::new())
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi::ApiDoc::openapi())
}
