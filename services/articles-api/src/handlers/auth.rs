//! Registration and login handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use folio_core::metrics::OperationTimer;
use folio_types::Principal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::record_op;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<Principal> for UserInfo {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            email: principal.email,
            name: principal.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserInfo,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let timer = OperationTimer::start("register");
    let result = async {
        let Json(req) = payload?;
        let principal = state
            .folio
            .register(&req.email, &req.password, &req.name)
            .await?;
        let created_at = principal.created_at.to_rfc3339();
        Ok::<_, ApiError>((
            StatusCode::CREATED,
            Json(RegisterResponse {
                user: principal.into(),
                created_at,
            }),
        ))
    }
    .await;
    record_op(timer, &result);
    result
}

/// POST /auth/login
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let timer = OperationTimer::start("login");
    let result = async {
        let Json(req) = payload?;
        let login = state.folio.authenticate(&req.email, &req.password).await?;
        Ok::<_, ApiError>(Json(LoginResponse {
            access_token: login.token.token,
            token_type: "Bearer",
            expires_at: login.token.expires_at.to_rfc3339(),
            user: login.principal.into(),
        }))
    }
    .await;
    record_op(timer, &result);
    result
}
