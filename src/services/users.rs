use std::sync::Arc;

use crate::auth::{self, AuthService};
use crate::error::{ContactListError, Result};
use crate::models::{LoginRequest, RegisterRequest, User, UserDto};
use crate::repository_traits::{RoleRepository, UserRepository};
use crate::validation::is_strong_password;

/// Account registration and login.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self { users, roles, auth }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserDto> {
        if self.users.get_by_email(&request.email).await?.is_some() {
            return Err(ContactListError::BadRequest(
                "A user with this email already exists".to_string(),
            ));
        }

        if !is_strong_password(&request.password) {
            return Err(ContactListError::BadRequest(
                "Password must be at least 8 characters and contain an uppercase letter, \
                 a lowercase letter, a digit and a special character"
                    .to_string(),
            ));
        }

        let default_role = self
            .roles
            .get_by_name("User")
            .await?
            .ok_or_else(|| ContactListError::Internal("Default role not found".to_string()))?;

        let (password_hash, password_salt) = auth::hash_password(&request.password);
        let user = User {
            user_id: 0,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            password_hash,
            password_salt,
            role_ids: vec![default_role.role_id],
        };

        let created = self.users.add(&user).await?;
        tracing::info!("Registered user {} ({})", created.user_id, created.email);

        Ok(UserDto::from_user(&created, vec![default_role.name]))
    }

    /// Returns a signed bearer token. Unknown email and bad password get
    /// the same answer.
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let user = match self.users.get_by_email(&request.email).await? {
            Some(user)
                if auth::verify_password(
                    &request.password,
                    &user.password_hash,
                    &user.password_salt,
                ) =>
            {
                user
            }
            _ => {
                return Err(ContactListError::Unauthorized(
                    "Invalid email or password".to_string(),
                ))
            }
        };

        let roles = self.roles.get_names(&user.role_ids).await?;
        let token = self.auth.issue_token(&user, &roles)?;

        tracing::info!("User {} logged in", user.user_id);
        Ok(token)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserDto> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ContactListError::not_found("User not found"))?;
        let roles = self.roles.get_names(&user.role_ids).await?;
        Ok(UserDto::from_user(&user, roles))
    }
}
