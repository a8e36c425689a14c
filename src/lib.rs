//! Document workflows for a small ERP: bills of materials, manufacturing
//! orders, requests for quotation with their vendor bills, and sales
//! quotations, served over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cache;
pub mod config;
pub mod db;
pub mod documents;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod repositories;
pub mod services;

use axum::{http::Request, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{MakeSpan, TraceLayer},
};

use crate::cache::CacheFactory;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::repositories::{Catalog, CatalogRepository};
use crate::services::{AppServices, DocumentContext};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    /// Wires the cache, the catalog, and the document services over one
    /// database handle.
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> Self {
        let cache = CacheFactory::create_cache(&config.cache);
        let catalog: Arc<dyn Catalog> = Arc::new(CatalogRepository::new(db.clone()));
        let ctx = DocumentContext::new(
            db.clone(),
            catalog,
            cache,
            &config.cache,
            config.documents.clone(),
        );

        Self {
            db,
            services: AppServices::new(ctx),
            config,
        }
    }
}

/// Opens a span per request tagged with the `x-request-id` set upstream
#[derive(Clone, Default)]
pub struct RequestSpanMaker;

impl<B> MakeSpan<B> for RequestSpanMaker {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "http.request",
            request_id = %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// Full application router with request ids, tracing, and timeouts
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .nest("/health", handlers::health::health_routes())
        .nest("/api/v1", handlers::api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(RequestSpanMaker))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
}
