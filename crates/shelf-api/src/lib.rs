#![deny(warnings)]
#![allow(missing_docs)]
//! Shelf HTTP API
//!
//! Serves every configured collection resource as JSON endpoints over axum.
//! Each resource gets its own [`ResourceController`] and storage backend,
//! built once at startup and shared through [`AppState`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
};
use chrono::{DateTime, Utc};
use shelf_core::ResourceController;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

pub mod config;
pub mod demo;
pub mod error;
pub mod health;
pub mod routes;
pub mod tracing_setup;

use config::{LimitsConfig, ShelfConfig};
use error::{ApiError, ApiResult};

/// Application state shared by every handler
#[derive(Debug)]
pub struct AppState {
    pub start_time: DateTime<Utc>,
    /// One controller per configured resource, in configuration order
    controllers: Vec<ResourceController>,
}

impl AppState {
    pub fn new(controllers: Vec<ResourceController>) -> Self {
        Self { start_time: Utc::now(), controllers }
    }

    /// Open every configured backend and build its controller.
    pub async fn from_config(config: &ShelfConfig) -> anyhow::Result<Self> {
        config.validate()?;
        info!(resources = config.resources.len(), "Initializing application state");

        let mut controllers = Vec::with_capacity(config.resources.len());
        for resource in &config.resources {
            let backend = resource
                .backend_config()?
                .open()
                .await
                .with_context(|| format!("Failed to open backend for resource '{}'", resource.name))?;
            info!(resource = %resource.name, backend = backend.label(), "Resource mounted");
            controllers.push(ResourceController::new(resource.name.clone(), backend));
        }

        Ok(Self::new(controllers))
    }

    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.start_time).to_std().unwrap_or_default()
    }

    pub fn controllers(&self) -> &[ResourceController] {
        &self.controllers
    }

    pub fn controller(&self, resource: &str) -> ApiResult<&ResourceController> {
        self.controllers
            .iter()
            .find(|c| c.resource() == resource)
            .ok_or_else(|| ApiError::not_found(resource))
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(ResourceController::resource)
    }
}

/// Build the router over an existing state.
pub fn build_router(state: Arc<AppState>, limits: &LimitsConfig) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/{resource}", get(routes::list_records).post(routes::create_record))
        .route(
            "/{resource}/{position}",
            get(routes::get_record).delete(routes::delete_record),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(tracing_setup::request_logging))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(limits.max_body_bytes())),
        )
        .with_state(state)
}

/// Open all configured resources and build the application router.
pub async fn create_app(config: &ShelfConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(config).await?;
    Ok(build_router(Arc::new(state), &config.limits))
}
