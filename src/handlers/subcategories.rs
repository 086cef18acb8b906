use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::{ContactListError, Result};
use crate::models::{CreateSubcategoryRequest, UpdateSubcategoryRequest};

use super::AppState;

pub async fn get_subcategories(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let subcategories = state
        .subcategories
        .get_subcategories_for_category(category_id)
        .await?;
    Ok(Json(subcategories))
}

pub async fn get_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    let subcategory = state.subcategories.get_subcategory(subcategory_id).await?;
    if subcategory.category_id != category_id {
        return Err(subcategory_mismatch());
    }
    Ok(Json(subcategory))
}

pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(mut request): Json<CreateSubcategoryRequest>,
) -> Result<impl IntoResponse> {
    // The route decides which category the subcategory lands in
    request.category_id = category_id;
    state.validator.validate_create_subcategory(&request)?;
    let subcategory = state.subcategories.create_subcategory(&request).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn update_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateSubcategoryRequest>,
) -> Result<impl IntoResponse> {
    if category_id != request.category_id || subcategory_id != request.subcategory_id {
        return Err(ContactListError::BadRequest(
            "Identifier mismatch".to_string(),
        ));
    }
    state.validator.validate_update_subcategory(&request)?;
    state
        .subcategories
        .update_subcategory(subcategory_id, &request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    let subcategory = state.subcategories.get_subcategory(subcategory_id).await?;
    if subcategory.category_id != category_id {
        return Err(subcategory_mismatch());
    }
    state
        .subcategories
        .delete_subcategory(subcategory_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn subcategory_mismatch() -> ContactListError {
    ContactListError::BadRequest("Subcategory does not belong to the given category".to_string())
}
