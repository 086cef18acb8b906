pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redis;
pub mod repository;
pub mod repository_traits;
pub mod retry;
pub mod seed;
pub mod services;
pub mod validation;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::handlers::AppState;
use crate::redis::RedisManager;
use crate::repository::{
    RedisCategoryRepository, RedisContactRepository, RedisRoleRepository,
    RedisSubcategoryRepository, RedisUserRepository,
};
use crate::repository_traits::{
    CategoryRepository, ContactRepository, RoleRepository, SubcategoryRepository, UserRepository,
};
use crate::retry::RetryExecutor;
use crate::services::{CategoryService, ContactService, SubcategoryService, UserService};
use crate::validation::InputValidator;

/// Wires the Redis repositories, retry executor and services into the
/// shared handler state. Binaries call this once at startup.
pub fn build_state(config: Arc<Config>, redis: Arc<RedisManager>) -> AppState {
    let contacts: Arc<dyn ContactRepository> = Arc::new(RedisContactRepository::new(redis.clone()));
    let categories: Arc<dyn CategoryRepository> =
        Arc::new(RedisCategoryRepository::new(redis.clone()));
    let subcategories: Arc<dyn SubcategoryRepository> =
        Arc::new(RedisSubcategoryRepository::new(redis.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(RedisUserRepository::new(redis.clone()));
    let roles: Arc<dyn RoleRepository> = Arc::new(RedisRoleRepository::new(redis));

    let retry = RetryExecutor::from_config(&config.retry);
    let auth = Arc::new(AuthService::new(config));

    AppState {
        contacts: Arc::new(ContactService::new(
            contacts.clone(),
            users.clone(),
            categories.clone(),
            subcategories.clone(),
            retry,
        )),
        categories: Arc::new(CategoryService::new(
            categories.clone(),
            subcategories.clone(),
            contacts,
        )),
        subcategories: Arc::new(SubcategoryService::new(subcategories, categories)),
        users: Arc::new(UserService::new(users, roles, auth.clone())),
        auth,
        validator: Arc::new(InputValidator::new()),
    }
}
