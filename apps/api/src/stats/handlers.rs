//! Axum route handlers for the admin dashboard.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::{AdminStatsReport, SimpleStats};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub success: bool,
    pub message: String,
    /// Bearer credential for the other admin routes.
    pub token: String,
}

/// Guard for admin routes: requires `Authorization: Bearer <admin password>`.
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match token {
            Some(token) if token == state.config.admin_password => Ok(AdminAuth),
            _ => {
                warn!("rejected admin request with missing or invalid credentials");
                Err(AppError::Unauthorized("Invalid admin password".to_string()))
            }
        }
    }
}

/// POST /admin/login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    if request.password != state.config.admin_password {
        warn!("failed admin login attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    info!("admin logged in");
    Ok(Json(AdminLoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: request.password,
    }))
}

/// GET /admin/stats
pub async fn handle_admin_stats(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Json<AdminStatsReport> {
    Json(state.stats.report(Utc::now().date_naive()).await)
}

/// GET /admin/stats-simple
pub async fn handle_admin_stats_simple(
    _auth: AdminAuth,
    State(state): State<AppState>,
) -> Json<SimpleStats> {
    Json(state.stats.simple().await)
}
