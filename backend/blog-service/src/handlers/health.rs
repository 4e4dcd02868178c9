/// Health check endpoints
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::cache::{CacheError, CacheStore};

pub struct HealthState {
    db_pool: PgPool,
    cache: Option<Arc<dyn CacheStore>>,
    cache_timeout: Duration,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    pub fn new(
        db_pool: PgPool,
        cache: Option<Arc<dyn CacheStore>>,
        cache_timeout: Duration,
    ) -> Self {
        Self {
            db_pool,
            cache,
            cache_timeout,
        }
    }

    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_cache(&self) -> Option<Result<(), CacheError>> {
        match &self.cache {
            Some(cache) => Some(ping_cache(cache.as_ref(), self.cache_timeout).await),
            None => None,
        }
    }
}

/// Cache ping bounded by `limit`; a ping that outlives it counts as unavailable.
async fn ping_cache(cache: &dyn CacheStore, limit: Duration) -> Result<(), CacheError> {
    match timeout(limit, cache.ping()).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Unavailable(format!(
            "{} ping timed out after {}ms",
            cache.backend(),
            limit.as_millis()
        ))),
    }
}

/// Register `/health`, `/health/ready` and `/health/live`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_summary))
        .route("/health/ready", web::get().to(readiness_summary))
        .route("/health/live", web::get().to(liveness_check));
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

/// PostgreSQL is required for readiness. The cache only degrades the status since reads
/// fall back to the database without it.
async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;
    let mut degraded = false;

    let start = Instant::now();
    let pg_result = state.check_postgres().await;
    let pg_latency = Some(start.elapsed().as_millis() as u64);
    let postgres_check = match pg_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: pg_latency,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms: pg_latency,
            }
        }
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let start = Instant::now();
    let cache_check = match state.check_cache().await {
        Some(Ok(_)) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Cache ping successful".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Some(Err(e)) => {
            degraded = true;
            ComponentCheck {
                status: ComponentStatus::Degraded,
                message: format!("Cache ping failed: {}", e),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            }
        }
        None => ComponentCheck {
            status: ComponentStatus::Degraded,
            message: "Cache disabled, reads go to PostgreSQL".to_string(),
            latency_ms: None,
        },
    };
    checks.insert("cache".to_string(), cache_check);

    let status = if !ready {
        ComponentStatus::Unhealthy
    } else if degraded {
        ComponentStatus::Degraded
    } else {
        ComponentStatus::Healthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
