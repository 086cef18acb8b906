use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::{ContactListError, Result};
use crate::models::{CreateCategoryRequest, UpdateCategoryRequest};

use super::AppState;

pub async fn get_all_categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.categories.get_all_categories().await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let category = state.categories.get_category(category_id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    state.validator.validate_create_category(&request)?;
    let category = state.categories.create_category(&request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse> {
    if category_id != request.category_id {
        return Err(ContactListError::BadRequest(
            "Category id mismatch".to_string(),
        ));
    }
    state.validator.validate_update_category(&request)?;
    state
        .categories
        .update_category(category_id, &request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.categories.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
