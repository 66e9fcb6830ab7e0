/// Health endpoints - unauthenticated probes backed by `EntityStore::ping`
use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;

use crate::config::StorageBackend;
use crate::db::EntityStore;

const SERVICE_NAME: &str = "devcommunity-service";

pub struct HealthState {
    store: Arc<dyn EntityStore>,
    backend: StorageBackend,
}

impl HealthState {
    pub fn new(store: Arc<dyn EntityStore>, backend: StorageBackend) -> Self {
        Self { store, backend }
    }
}

#[derive(Debug, Serialize)]
struct StorageCheck {
    backend: StorageBackend,
    healthy: bool,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReadinessReport {
    ready: bool,
    storage: StorageCheck,
    timestamp: String,
}

async fn probe(state: &HealthState) -> StorageCheck {
    let start = Instant::now();
    let result = state.store.ping().await;

    StorageCheck {
        backend: state.backend,
        healthy: result.is_ok(),
        latency_ms: start.elapsed().as_millis() as u64,
        error: result.err().map(|e| e.to_string()),
    }
}

/// `GET /api/v1/health`
pub async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    let check = probe(&state).await;
    if check.healthy {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }))
    } else {
        tracing::warn!(backend = %state.backend, error = ?check.error, "Health check failed");
        HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "service": SERVICE_NAME,
        }))
    }
}

/// `GET /api/v1/health/ready`
pub async fn readiness(state: web::Data<HealthState>) -> HttpResponse {
    let storage = probe(&state).await;
    let report = ReadinessReport {
        ready: storage.healthy,
        storage,
        timestamp: Utc::now().to_rfc3339(),
    };

    if report.ready {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}

/// `GET /api/v1/health/live`
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}

/// Mount the probes; they sit outside the authenticated scope
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health_summary))
        .route("/api/v1/health/ready", web::get().to(readiness))
        .route("/api/v1/health/live", web::get().to(liveness));
}
