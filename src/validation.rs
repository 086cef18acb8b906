use crate::error::{ContactListError, FieldError, Result};
use crate::models::{
    CreateCategoryRequest, CreateContactRequest, CreateSubcategoryRequest, LoginRequest,
    RegisterRequest, UpdateCategoryRequest, UpdateContactRequest, UpdateSubcategoryRequest,
};
use crate::seed::OTHER_CATEGORY_ID;

const MAX_NAME_LEN: usize = 100;
const MAX_CATEGORY_NAME_LEN: usize = 50;
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Request validation at the HTTP boundary.
///
/// Only shape checks live here; existence checks that need the store
/// (does the category exist, is the email taken) belong to the services.
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_create_contact(&self, request: &CreateContactRequest) -> Result<()> {
        let mut errors = Vec::new();
        self.check_contact_fields(
            &request.first_name,
            &request.last_name,
            &request.email,
            request.phone_number.as_deref(),
            request.date_of_birth,
            request.category_id,
            request.custom_subcategory.as_deref(),
            &mut errors,
        );
        finish(errors)
    }

    pub fn validate_update_contact(&self, request: &UpdateContactRequest) -> Result<()> {
        let mut errors = Vec::new();
        if request.contact_id <= 0 {
            errors.push(FieldError::new("contact_id", "Contact id is required."));
        }
        self.check_contact_fields(
            &request.first_name,
            &request.last_name,
            &request.email,
            request.phone_number.as_deref(),
            request.date_of_birth,
            request.category_id,
            request.custom_subcategory.as_deref(),
            &mut errors,
        );
        finish(errors)
    }

    pub fn validate_create_category(&self, request: &CreateCategoryRequest) -> Result<()> {
        let mut errors = Vec::new();
        check_category_name(&request.name, &mut errors);
        finish(errors)
    }

    pub fn validate_update_category(&self, request: &UpdateCategoryRequest) -> Result<()> {
        let mut errors = Vec::new();
        if request.category_id <= 0 {
            errors.push(FieldError::new("category_id", "Category id is required."));
        }
        check_category_name(&request.name, &mut errors);
        finish(errors)
    }

    pub fn validate_create_subcategory(&self, request: &CreateSubcategoryRequest) -> Result<()> {
        let mut errors = Vec::new();
        check_subcategory_name(&request.name, &mut errors);
        finish(errors)
    }

    pub fn validate_update_subcategory(&self, request: &UpdateSubcategoryRequest) -> Result<()> {
        let mut errors = Vec::new();
        if request.subcategory_id <= 0 {
            errors.push(FieldError::new("subcategory_id", "Subcategory id is required."));
        }
        if request.category_id <= 0 {
            errors.push(FieldError::new("category_id", "Category id is required."));
        }
        check_subcategory_name(&request.name, &mut errors);
        finish(errors)
    }

    pub fn validate_register(&self, request: &RegisterRequest) -> Result<()> {
        let mut errors = Vec::new();
        check_person_name(&request.first_name, "first_name", "First name", &mut errors);
        check_person_name(&request.last_name, "last_name", "Last name", &mut errors);
        check_email(&request.email, &mut errors);
        if request.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required."));
        } else if request.password.len() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters long.",
            ));
        }
        finish(errors)
    }

    pub fn validate_login(&self, request: &LoginRequest) -> Result<()> {
        let mut errors = Vec::new();
        check_email(&request.email, &mut errors);
        if request.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required."));
        }
        finish(errors)
    }

    #[allow(clippy::too_many_arguments)]
    fn check_contact_fields(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone_number: Option<&str>,
        date_of_birth: Option<chrono::NaiveDate>,
        category_id: i64,
        custom_subcategory: Option<&str>,
        errors: &mut Vec<FieldError>,
    ) {
        check_person_name(first_name, "first_name", "First name", errors);
        check_person_name(last_name, "last_name", "Last name", errors);
        check_email(email, errors);

        if let Some(phone) = phone_number {
            if !is_valid_phone(phone) {
                errors.push(FieldError::new(
                    "phone_number",
                    "Invalid phone number. Enter 9 digits.",
                ));
            }
        }

        if let Some(dob) = date_of_birth {
            if dob >= chrono::Utc::now().date_naive() {
                errors.push(FieldError::new(
                    "date_of_birth",
                    "Date of birth must be earlier than today.",
                ));
            }
        }

        if category_id <= 0 {
            errors.push(FieldError::new("category_id", "Category is required."));
        }

        // "Other" contacts carry their own subcategory label
        if category_id == OTHER_CATEGORY_ID {
            match custom_subcategory {
                Some(label) if !label.trim().is_empty() => {
                    if label.chars().count() > MAX_NAME_LEN {
                        errors.push(FieldError::new(
                            "custom_subcategory",
                            "Custom subcategory must not exceed 100 characters.",
                        ));
                    }
                }
                _ => errors.push(FieldError::new(
                    "custom_subcategory",
                    "Custom subcategory is required for the 'Other' category.",
                )),
            }
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Password strength rule applied at registration: at least 8 characters,
/// with lower case, upper case, a digit and a special character, drawn only
/// from the allowed alphabet.
pub fn is_strong_password(password: &str) -> bool {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    password.len() >= 8 && has_lower && has_upper && has_digit && has_special && allowed
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 9 && phone.chars().all(|c| c.is_ascii_digit())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn check_person_name(value: &str, field: &str, label: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required.")));
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            field,
            format!("{label} must not exceed 100 characters."),
        ));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email address is required."));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Invalid email address."));
    }
}

fn check_category_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Category name is required."));
    } else if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            "Category name must not exceed 50 characters.",
        ));
    }
}

fn check_subcategory_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Subcategory name is required."));
    } else if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            "Subcategory name must not exceed 50 characters.",
        ));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContactListError::Validation(errors))
    }
}
