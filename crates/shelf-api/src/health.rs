//! Health endpoint reporting the state of every mounted resource

use crate::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Overall health status of the service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every backend answered
    Healthy,
    /// At least one backend failed to answer
    Degraded,
}

/// Health of one resource's backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceHealth {
    pub name: String,
    pub backend: String,
    pub status: HealthStatus,
    /// Record count; absent when the backend failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub startup_time: DateTime<Utc>,
    pub resources: Vec<ResourceHealth>,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut resources = Vec::with_capacity(state.controllers().len());
    for controller in state.controllers() {
        let started = Instant::now();
        let backend = controller.backend();
        let records = match backend.len().await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(resource = controller.resource(), error = %err, "Backend health check failed");
                None
            }
        };
        resources.push(ResourceHealth {
            name: controller.resource().to_string(),
            backend: backend.label().to_string(),
            status: if records.is_some() { HealthStatus::Healthy } else { HealthStatus::Degraded },
            records,
            response_time_ms: duration_ms(started.elapsed()),
        });
    }

    let status = if resources.iter().all(|r| r.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.elapsed().as_secs(),
        startup_time: state.start_time,
        resources,
    })
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
