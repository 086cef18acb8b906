use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use mockall::predicate::eq;

use super::*;
use crate::auth::AuthService;
use crate::config::Config;
use crate::error::{ContactListError, DataError};
use crate::models::{
    Category, Contact, CreateCategoryRequest, CreateContactRequest, CreateSubcategoryRequest,
    LoginRequest, RegisterRequest, Role, Subcategory, User,
};
use crate::repository_traits::{
    MockCategoryRepository, MockContactRepository, MockRoleRepository, MockSubcategoryRepository,
    MockUserRepository,
};
use crate::retry::{CodeListClassifier, RetryExecutor, RetryPolicy};

fn fast_retry() -> RetryExecutor {
    RetryExecutor::new(
        RetryPolicy::new(3, Duration::from_millis(1)),
        Arc::new(CodeListClassifier::default()),
    )
}

fn business_category() -> Category {
    Category {
        category_id: 1,
        name: "Business".to_string(),
    }
}

fn other_category() -> Category {
    Category {
        category_id: 3,
        name: "Other".to_string(),
    }
}

fn sample_contact(contact_id: i64, user_id: i64) -> Contact {
    Contact {
        contact_id,
        first_name: "Anna".to_string(),
        last_name: "Nowak".to_string(),
        email: "anna@example.com".to_string(),
        phone_number: Some("123456789".to_string()),
        date_of_birth: None,
        category_id: 1,
        subcategory_id: None,
        custom_subcategory: None,
        user_id,
    }
}

fn create_contact_request(category_id: i64) -> CreateContactRequest {
    CreateContactRequest {
        first_name: "Anna".to_string(),
        last_name: "Nowak".to_string(),
        email: "anna@example.com".to_string(),
        phone_number: Some("123456789".to_string()),
        category_id,
        subcategory_id: None,
        custom_subcategory: None,
        date_of_birth: None,
    }
}

fn contact_service(
    contacts: MockContactRepository,
    users: MockUserRepository,
    categories: MockCategoryRepository,
    subcategories: MockSubcategoryRepository,
) -> ContactService {
    ContactService::new(
        Arc::new(contacts),
        Arc::new(users),
        Arc::new(categories),
        Arc::new(subcategories),
        fast_retry(),
    )
}

// ── ContactService ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_contact_clears_custom_subcategory_outside_other() {
    let mut contacts = MockContactRepository::new();
    let mut users = MockUserRepository::new();
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    users.expect_exists().returning(|_| Ok(true));
    categories
        .expect_get_by_id()
        .with(eq(1))
        .returning(|_| Ok(Some(business_category())));
    contacts
        .expect_add()
        .withf(|c: &Contact| c.custom_subcategory.is_none() && c.user_id == 9)
        .returning(|c| {
            Ok(Contact {
                contact_id: 7,
                ..c.clone()
            })
        });

    let service = contact_service(contacts, users, categories, subcategories);
    let mut request = create_contact_request(1);
    request.custom_subcategory = Some("should be dropped".to_string());

    let dto = service.create_contact(&request, 9).await.unwrap();
    assert_eq!(dto.contact_id, 7);
    assert_eq!(dto.category_name, "Business");
    assert!(dto.custom_subcategory.is_none());
}

#[tokio::test]
async fn create_contact_keeps_custom_subcategory_for_other() {
    let mut contacts = MockContactRepository::new();
    let mut users = MockUserRepository::new();
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    users.expect_exists().returning(|_| Ok(true));
    // No existence check for the "Other" category; only the DTO lookup
    categories
        .expect_get_by_id()
        .with(eq(3))
        .times(1)
        .returning(|_| Ok(Some(other_category())));
    contacts
        .expect_add()
        .withf(|c: &Contact| c.custom_subcategory.as_deref() == Some("Loose friends"))
        .returning(|c| {
            Ok(Contact {
                contact_id: 8,
                ..c.clone()
            })
        });

    let service = contact_service(contacts, users, categories, subcategories);
    let mut request = create_contact_request(3);
    request.custom_subcategory = Some("Loose friends".to_string());

    let dto = service.create_contact(&request, 9).await.unwrap();
    assert_eq!(dto.custom_subcategory.as_deref(), Some("Loose friends"));
    assert_eq!(dto.subcategory_name.as_deref(), Some("Loose friends"));
}

#[tokio::test]
async fn create_contact_for_unknown_user_is_not_found() {
    let mut contacts = MockContactRepository::new();
    let mut users = MockUserRepository::new();
    let categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    users.expect_exists().returning(|_| Ok(false));
    contacts.expect_add().never();

    let service = contact_service(contacts, users, categories, subcategories);
    let result = service.create_contact(&create_contact_request(1), 9).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

#[tokio::test]
async fn create_contact_for_unknown_category_is_not_found() {
    let mut contacts = MockContactRepository::new();
    let mut users = MockUserRepository::new();
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    users.expect_exists().returning(|_| Ok(true));
    categories.expect_get_by_id().returning(|_| Ok(None));
    contacts.expect_add().never();

    let service = contact_service(contacts, users, categories, subcategories);
    let result = service.create_contact(&create_contact_request(5), 9).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

#[tokio::test]
async fn create_contact_retries_transient_store_failure() {
    let mut contacts = MockContactRepository::new();
    let mut users = MockUserRepository::new();
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    users.expect_exists().returning(|_| Ok(true));
    categories
        .expect_get_by_id()
        .returning(|_| Ok(Some(business_category())));

    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    contacts.expect_add().times(2).returning(move |c| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ContactListError::Data(DataError::with_code(
                "deadlock victim",
                1205,
            )))
        } else {
            Ok(Contact {
                contact_id: 7,
                ..c.clone()
            })
        }
    });

    let service = contact_service(contacts, users, categories, subcategories);
    let dto = service
        .create_contact(&create_contact_request(1), 9)
        .await
        .unwrap();

    assert_eq!(dto.contact_id, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn get_contact_hides_foreign_contacts() {
    let mut contacts = MockContactRepository::new();
    let users = MockUserRepository::new();
    let categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    contacts
        .expect_get_by_id()
        .with(eq(4))
        .returning(|_| Ok(Some(sample_contact(4, 2))));

    let service = contact_service(contacts, users, categories, subcategories);
    let result = service.get_contact(4, 1).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

#[tokio::test]
async fn get_contact_resolves_category_and_subcategory_names() {
    let mut contacts = MockContactRepository::new();
    let users = MockUserRepository::new();
    let mut categories = MockCategoryRepository::new();
    let mut subcategories = MockSubcategoryRepository::new();

    let mut stored = sample_contact(4, 1);
    stored.subcategory_id = Some(2);
    contacts
        .expect_get_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    categories
        .expect_get_by_id()
        .with(eq(1))
        .returning(|_| Ok(Some(business_category())));
    subcategories.expect_get_by_id().with(eq(2)).returning(|_| {
        Ok(Some(Subcategory {
            subcategory_id: 2,
            category_id: 1,
            name: "Employee".to_string(),
        }))
    });

    let service = contact_service(contacts, users, categories, subcategories);
    let dto = service.get_contact(4, 1).await.unwrap();
    assert_eq!(dto.category_name, "Business");
    assert_eq!(dto.subcategory_name.as_deref(), Some("Employee"));
}

#[tokio::test]
async fn non_transient_read_failure_is_not_retried() {
    let mut contacts = MockContactRepository::new();
    let users = MockUserRepository::new();
    let categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    contacts
        .expect_get_all()
        .times(1)
        .returning(|| Err(ContactListError::Internal("schema drift".to_string())));

    let service = contact_service(contacts, users, categories, subcategories);
    let result = service.get_all_contacts().await;
    assert!(matches!(result, Err(ContactListError::Internal(_))));
}

#[tokio::test]
async fn delete_contact_checks_ownership_first() {
    let mut contacts = MockContactRepository::new();
    let users = MockUserRepository::new();
    let categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();

    contacts
        .expect_get_by_id()
        .returning(|_| Ok(Some(sample_contact(4, 2))));
    contacts.expect_delete().never();

    let service = contact_service(contacts, users, categories, subcategories);
    let result = service.delete_contact(4, 1).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

// ── CategoryService ─────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();
    let contacts = MockContactRepository::new();

    categories
        .expect_get_by_name()
        .returning(|_| Ok(Some(business_category())));
    categories.expect_add().never();

    let service = CategoryService::new(
        Arc::new(categories),
        Arc::new(subcategories),
        Arc::new(contacts),
    );
    let request = CreateCategoryRequest {
        name: "Business".to_string(),
    };
    let result = service.create_category(&request).await;
    assert!(matches!(result, Err(ContactListError::BadRequest(_))));
}

#[tokio::test]
async fn category_used_by_contacts_cannot_be_deleted() {
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();
    let mut contacts = MockContactRepository::new();

    categories
        .expect_get_by_id()
        .returning(|_| Ok(Some(business_category())));
    contacts
        .expect_get_all()
        .returning(|| Ok(vec![sample_contact(4, 1)]));
    categories.expect_delete().never();

    let service = CategoryService::new(
        Arc::new(categories),
        Arc::new(subcategories),
        Arc::new(contacts),
    );
    let result = service.delete_category(1).await;
    assert!(matches!(result, Err(ContactListError::BadRequest(_))));
}

#[tokio::test]
async fn category_delete_removes_its_subcategories() {
    let mut categories = MockCategoryRepository::new();
    let mut subcategories = MockSubcategoryRepository::new();
    let mut contacts = MockContactRepository::new();

    categories
        .expect_get_by_id()
        .returning(|_| Ok(Some(business_category())));
    contacts.expect_get_all().returning(|| Ok(vec![]));
    subcategories.expect_get_for_category().returning(|_| {
        Ok(vec![
            Subcategory {
                subcategory_id: 1,
                category_id: 1,
                name: "Boss".to_string(),
            },
            Subcategory {
                subcategory_id: 2,
                category_id: 1,
                name: "Employee".to_string(),
            },
        ])
    });
    subcategories.expect_delete().times(2).returning(|_| Ok(()));
    categories.expect_delete().times(1).returning(|_| Ok(()));

    let service = CategoryService::new(
        Arc::new(categories),
        Arc::new(subcategories),
        Arc::new(contacts),
    );
    service.delete_category(1).await.unwrap();
}

#[tokio::test]
async fn category_lookup_by_name_lists_its_subcategories() {
    let mut categories = MockCategoryRepository::new();
    let mut subcategories = MockSubcategoryRepository::new();
    let contacts = MockContactRepository::new();

    categories
        .expect_get_by_name()
        .with(eq("Business"))
        .returning(|_| Ok(Some(business_category())));
    subcategories.expect_get_for_category().with(eq(1)).returning(|_| {
        Ok(vec![Subcategory {
            subcategory_id: 1,
            category_id: 1,
            name: "Boss".to_string(),
        }])
    });

    let service = CategoryService::new(
        Arc::new(categories),
        Arc::new(subcategories),
        Arc::new(contacts),
    );
    let dto = service.get_category_by_name("Business").await.unwrap();
    assert_eq!(dto.category_id, 1);
    let names: Vec<String> = dto
        .subcategories
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Boss".to_string()]);
}

#[tokio::test]
async fn category_update_allows_keeping_its_own_name() {
    let mut categories = MockCategoryRepository::new();
    let subcategories = MockSubcategoryRepository::new();
    let contacts = MockContactRepository::new();

    categories
        .expect_get_by_id()
        .returning(|_| Ok(Some(business_category())));
    categories
        .expect_get_by_name()
        .returning(|_| Ok(Some(business_category())));
    categories.expect_update().times(1).returning(|_| Ok(()));

    let service = CategoryService::new(
        Arc::new(categories),
        Arc::new(subcategories),
        Arc::new(contacts),
    );
    let request = crate::models::UpdateCategoryRequest {
        category_id: 1,
        name: "Business".to_string(),
    };
    service.update_category(1, &request).await.unwrap();
}

// ── SubcategoryService ──────────────────────────────────────────────────────

#[tokio::test]
async fn subcategory_requires_existing_category() {
    let mut subcategories = MockSubcategoryRepository::new();
    let mut categories = MockCategoryRepository::new();

    categories.expect_get_by_id().returning(|_| Ok(None));
    subcategories.expect_add().never();

    let service = SubcategoryService::new(Arc::new(subcategories), Arc::new(categories));
    let request = CreateSubcategoryRequest {
        name: "Vendor".to_string(),
        category_id: 9,
    };
    let result = service.create_subcategory(&request).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

#[tokio::test]
async fn subcategory_update_rehomes_to_existing_category() {
    let mut subcategories = MockSubcategoryRepository::new();
    let mut categories = MockCategoryRepository::new();

    subcategories.expect_get_by_id().with(eq(5)).returning(|_| {
        Ok(Some(Subcategory {
            subcategory_id: 5,
            category_id: 1,
            name: "Boss".to_string(),
        }))
    });
    categories
        .expect_get_by_id()
        .with(eq(2))
        .returning(|_| Ok(Some(Category {
            category_id: 2,
            name: "Private".to_string(),
        })));
    subcategories
        .expect_update()
        .withf(|s: &Subcategory| s.category_id == 2 && s.name == "Housemate")
        .returning(|_| Ok(()));

    let service = SubcategoryService::new(Arc::new(subcategories), Arc::new(categories));
    let request = crate::models::UpdateSubcategoryRequest {
        subcategory_id: 5,
        name: "Housemate".to_string(),
        category_id: 2,
    };
    service.update_subcategory(5, &request).await.unwrap();
}

// ── UserService ─────────────────────────────────────────────────────────────

fn auth_service() -> Arc<AuthService> {
    let mut config = Config::default();
    config.jwt.secret = "unit-test-secret-0123456789abcdef".to_string();
    Arc::new(AuthService::new(Arc::new(config)))
}

fn register_request(password: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        email: "jan@example.com".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut users = MockUserRepository::new();
    let roles = MockRoleRepository::new();

    users.expect_get_by_email().returning(|_| {
        Ok(Some(User {
            user_id: 1,
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            password_hash: String::new(),
            password_salt: String::new(),
            role_ids: vec![1],
        }))
    });
    users.expect_add().never();

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let result = service.register(&register_request("Str0ng!pass")).await;
    assert!(matches!(result, Err(ContactListError::BadRequest(_))));
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let mut users = MockUserRepository::new();
    let roles = MockRoleRepository::new();

    users.expect_get_by_email().returning(|_| Ok(None));
    users.expect_add().never();

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let result = service.register(&register_request("weakpass")).await;
    assert!(matches!(result, Err(ContactListError::BadRequest(_))));
}

#[tokio::test]
async fn register_assigns_default_role_and_hashes_password() {
    let mut users = MockUserRepository::new();
    let mut roles = MockRoleRepository::new();

    users.expect_get_by_email().returning(|_| Ok(None));
    roles.expect_get_by_name().with(eq("User")).returning(|_| {
        Ok(Some(Role {
            role_id: 1,
            name: "User".to_string(),
        }))
    });
    users
        .expect_add()
        .withf(|u: &User| {
            u.role_ids == vec![1]
                && !u.password_hash.is_empty()
                && u.password_hash != "Str0ng!pass"
        })
        .returning(|u| {
            Ok(User {
                user_id: 12,
                ..u.clone()
            })
        });

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let dto = service
        .register(&register_request("Str0ng!pass"))
        .await
        .unwrap();

    assert_eq!(dto.user_id, 12);
    assert_eq!(dto.roles, vec!["User".to_string()]);
}

#[tokio::test]
async fn login_issues_a_verifiable_token() {
    let mut users = MockUserRepository::new();
    let mut roles = MockRoleRepository::new();
    let auth = auth_service();

    let (hash, salt) = crate::auth::hash_password("Str0ng!pass");
    users.expect_get_by_email().returning(move |_| {
        Ok(Some(User {
            user_id: 7,
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            password_hash: hash.clone(),
            password_salt: salt.clone(),
            role_ids: vec![1],
        }))
    });
    roles
        .expect_get_names()
        .returning(|_| Ok(vec!["User".to_string()]));

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth.clone());
    let token = service
        .login(&LoginRequest {
            email: "jan@example.com".to_string(),
            password: "Str0ng!pass".to_string(),
        })
        .await
        .unwrap();

    let claims = auth.validate_token(&token).unwrap();
    assert_eq!(claims.user_id, 7);
    assert_eq!(claims.roles, vec!["User".to_string()]);
}

#[tokio::test]
async fn get_user_resolves_role_names() {
    let mut users = MockUserRepository::new();
    let mut roles = MockRoleRepository::new();

    users.expect_get_by_id().with(eq(7)).returning(|_| {
        Ok(Some(User {
            user_id: 7,
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            password_hash: String::new(),
            password_salt: String::new(),
            role_ids: vec![1, 2],
        }))
    });
    roles
        .expect_get_names()
        .withf(|ids: &[i64]| ids == [1, 2])
        .returning(|_| Ok(vec!["User".to_string(), "Admin".to_string()]));

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let dto = service.get_user(7).await.unwrap();
    assert_eq!(dto.email, "jan@example.com");
    assert_eq!(dto.roles, vec!["User".to_string(), "Admin".to_string()]);
}

#[tokio::test]
async fn get_user_for_unknown_id_is_not_found() {
    let mut users = MockUserRepository::new();
    let roles = MockRoleRepository::new();

    users.expect_get_by_id().returning(|_| Ok(None));

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let result = service.get_user(99).await;
    assert!(matches!(result, Err(ContactListError::NotFound(_))));
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let mut users = MockUserRepository::new();
    let mut roles = MockRoleRepository::new();

    let (hash, salt) = crate::auth::hash_password("Str0ng!pass");
    users.expect_get_by_email().returning(move |_| {
        Ok(Some(User {
            user_id: 7,
            first_name: "Jan".to_string(),
            last_name: "Kowalski".to_string(),
            email: "jan@example.com".to_string(),
            password_hash: hash.clone(),
            password_salt: salt.clone(),
            role_ids: vec![1],
        }))
    });
    roles.expect_get_names().never();

    let service = UserService::new(Arc::new(users), Arc::new(roles), auth_service());
    let result = service
        .login(&LoginRequest {
            email: "jan@example.com".to_string(),
            password: "Wr0ng!pass".to_string(),
        })
        .await;

    assert!(matches!(result, Err(ContactListError::Unauthorized(_))));
}
