//! HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::auth::{AuthService, LoginInput, LoginResponse, OperatorAccount, RegisterInput};
use crate::AppState;

/// Register a new operator account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<OperatorAccount>)> {
    let service = AuthService::new(state.db, &state.config.jwt);
    let account = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let service = AuthService::new(state.db, &state.config.jwt);
    let response = service.login(input).await?;
    Ok(Json(response))
}
