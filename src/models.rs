use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Entities ────────────────────────────────────────────────────────────────

/// Contact owned by a user, assigned to a category and optionally a
/// subcategory. For the "Other" category a free-form custom subcategory
/// replaces the predefined one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Contact {
    pub contact_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub custom_subcategory: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subcategory {
    pub subcategory_id: i64,
    pub category_id: i64,
    pub name: String,
}

/// Account record. Passwords are stored as salted HMAC-SHA512 digests,
/// both fields hex-encoded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Role {
    pub role_id: i64,
    pub name: String,
}

// ── Response DTOs ───────────────────────────────────────────────────────────

/// Contact as returned to clients, with category and subcategory names
/// resolved for convenience.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContactDto {
    pub contact_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub category_id: i64,
    pub category_name: String,
    pub subcategory_id: Option<i64>,
    pub subcategory_name: Option<String>,
    pub custom_subcategory: Option<String>,
}

impl ContactDto {
    pub fn from_contact(
        contact: &Contact,
        category_name: String,
        subcategory_name: Option<String>,
    ) -> Self {
        Self {
            contact_id: contact.contact_id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            date_of_birth: contact.date_of_birth,
            category_id: contact.category_id,
            category_name,
            subcategory_id: contact.subcategory_id,
            subcategory_name,
            custom_subcategory: contact.custom_subcategory.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CategoryDto {
    pub category_id: i64,
    pub name: String,
    pub subcategories: Option<Vec<SubcategoryDto>>,
}

impl CategoryDto {
    pub fn from_category(category: &Category, subcategories: Option<Vec<SubcategoryDto>>) -> Self {
        Self {
            category_id: category.category_id,
            name: category.name.clone(),
            subcategories,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubcategoryDto {
    pub subcategory_id: i64,
    pub category_id: i64,
    pub name: String,
}

impl From<&Subcategory> for SubcategoryDto {
    fn from(subcategory: &Subcategory) -> Self {
        Self {
            subcategory_id: subcategory.subcategory_id,
            category_id: subcategory.category_id,
            name: subcategory.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserDto {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl UserDto {
    pub fn from_user(user: &User, roles: Vec<String>) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            roles,
        }
    }
}

/// Bearer token handed out on successful login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenResponse {
    pub token: String,
}

// ── Request DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub custom_subcategory: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateContactRequest {
    pub contact_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub custom_subcategory: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateCategoryRequest {
    pub category_id: i64,
    pub name: String,
}

/// Body for creating a subcategory. The category id is taken from the
/// route and overwrites whatever the body carries.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateSubcategoryRequest {
    pub name: String,
    #[serde(default)]
    pub category_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateSubcategoryRequest {
    pub subcategory_id: i64,
    pub name: String,
    pub category_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
