//! Liveness and readiness handlers

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

const SERVICE: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Readiness report. Only the database gates readiness; the cache section
/// is informational since listings fall back to the store.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: DatabaseCheck,
    pub cache: CacheState,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub ok: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheState {
    /// Approximate number of cached listing pages
    pub entries: u64,
    /// Writes whose cache clear gave up since startup
    pub invalidation_failures: u64,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
    })
}

/// GET /ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let result = folio_db::sqlx::query("SELECT 1").execute(&*state.pool).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let database = match result {
        Ok(_) => DatabaseCheck {
            ok: true,
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Readiness database check failed");
            DatabaseCheck {
                ok: false,
                latency_ms,
                error: Some(e.to_string()),
            }
        }
    };

    let cache = CacheState {
        entries: state.cache.entry_count(),
        invalidation_failures: state.folio.invalidation_failures(),
    };

    let (status, label) = readiness(&database);
    (
        status,
        Json(ReadyResponse {
            status: label,
            service: SERVICE,
            database,
            cache,
        }),
    )
}

fn readiness(database: &DatabaseCheck) -> (StatusCode, &'static str) {
    if database.ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    }
}
