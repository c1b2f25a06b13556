//! Server-rendered blog portal: compose, list, read, search and soft-delete
//! posts with embedded reviews.
//!
//! Pages are rendered with askama templates from `templates/`; posts live in a
//! single `blogs` table managed through sea-orm.

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repository;
pub mod routes;
pub mod views;

use std::sync::Arc;

use poem::{Endpoint, EndpointExt, Route, endpoint::StaticFilesEndpoint, middleware::Tracing};
use poem_openapi::OpenApiService;

use routes::{AppState, BlogApi};

/// Full route tree: pages at `/`, assets under `/static`, Swagger UI under `/docs`.
pub fn build_app(state: Arc<AppState>, server_url: String, static_dir: String) -> impl Endpoint {
    let api = OpenApiService::new(BlogApi::new(state), "Blog Portal", "1.0").server(server_url);
    let ui = api.swagger_ui();

    Route::new()
        .nest("/static", StaticFilesEndpoint::new(static_dir))
        .nest("/docs", ui)
        .nest("/", api)
        .with(Tracing)
}
