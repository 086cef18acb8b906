/// HTTP handlers for the contact-list REST API
pub mod auth;
pub mod categories;
pub mod contacts;
pub mod subcategories;


use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::{AuthService, AuthUser};
use crate::error::{ContactListError, FieldError};
use crate::services::{CategoryService, ContactService, SubcategoryService, UserService};
use crate::validation::InputValidator;

/// Shared state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactService>,
    pub categories: Arc<CategoryService>,
    pub subcategories: Arc<SubcategoryService>,
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub validator: Arc<InputValidator>,
}

/// Assembles the full route table.
///
/// Contact listing and category reads are public; contact management needs
/// a valid token, and category/subcategory management needs the Admin role.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/contacts/all", get(contacts::get_all_contacts))
        .route("/api/v1/categories", get(categories::get_all_categories))
        .route(
            "/api/v1/categories/:category_id",
            get(categories::get_category),
        );

    let authenticated = Router::new()
        .route("/api/v1/contacts", post(contacts::create_contact))
        .route("/api/v1/contacts/mine", get(contacts::get_my_contacts))
        .route(
            "/api/v1/contacts/:contact_id",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/v1/categories", post(categories::create_category))
        .route(
            "/api/v1/categories/:category_id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route(
            "/api/v1/categories/:category_id/subcategories",
            get(subcategories::get_subcategories).post(subcategories::create_subcategory),
        )
        .route(
            "/api/v1/categories/:category_id/subcategories/:subcategory_id",
            get(subcategories::get_subcategory)
                .put(subcategories::update_subcategory)
                .delete(subcategories::delete_subcategory),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    public.merge(authenticated).merge(admin).with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req) {
        Ok(user) if user.is_admin() => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(_) => ContactListError::Forbidden("Admin role required".to_string()).into_response(),
        Err(err) => err.into_response(),
    }
}

fn authenticate(state: &AppState, req: &Request<Body>) -> crate::error::Result<AuthUser> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ContactListError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.auth.validate_token(token)?;
    Ok(AuthUser {
        user_id: claims.user_id,
        roles: claims.roles,
    })
}

#[derive(Serialize)]
struct ErrorBody {
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ContactListError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Upstream { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactListError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = match self {
            Self::Validation(errors) => ErrorBody {
                status_code: status.as_u16(),
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            Self::NotFound(_)
            | Self::BadRequest(_)
            | Self::Unauthorized(_)
            | Self::Forbidden(_)
            | Self::Upstream { .. } => ErrorBody {
                status_code: status.as_u16(),
                message: self.to_string(),
                errors: None,
            },
            // Storage and serialization details stay in the log
            _ => ErrorBody {
                status_code: status.as_u16(),
                message: "An internal server error occurred".to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
