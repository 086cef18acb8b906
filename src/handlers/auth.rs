use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse};

use super::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    state.validator.validate_register(&request)?;
    let user = state.users.register(&request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    state.validator.validate_login(&request)?;
    let token = state.users.login(&request).await?;
    Ok(Json(TokenResponse { token }))
}
