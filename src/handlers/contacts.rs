use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{CreateContactRequest, UpdateContactRequest};

use super::AppState;

pub async fn get_all_contacts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let contacts = state.contacts.get_all_contacts().await?;
    Ok(Json(contacts))
}

pub async fn get_my_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let contacts = state.contacts.get_contacts_for_user(user.user_id).await?;
    Ok(Json(contacts))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(contact_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let contact = state.contacts.get_contact(contact_id, user.user_id).await?;
    Ok(Json(contact))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateContactRequest>,
) -> Result<impl IntoResponse> {
    state.validator.validate_create_contact(&request)?;
    let contact = state
        .contacts
        .create_contact(&request, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(contact_id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse> {
    state.validator.validate_update_contact(&request)?;
    state
        .contacts
        .update_contact(contact_id, &request, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(contact_id): Path<i64>,
) -> Result<impl IntoResponse> {
    state
        .contacts
        .delete_contact(contact_id, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
