use crate::error::Result;
use crate::models::{Category, Contact, Role, Subcategory, User};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync + 'static {
    async fn get_all(&self) -> Result<Vec<Contact>>;
    async fn get_all_for_user(&self, user_id: i64) -> Result<Vec<Contact>>;
    async fn get_by_id(&self, contact_id: i64) -> Result<Option<Contact>>;
    /// Persist a new contact, assigning its id. Returns the stored record.
    async fn add(&self, contact: &Contact) -> Result<Contact>;
    async fn update(&self, contact: &Contact) -> Result<()>;
    async fn delete(&self, contact_id: i64) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync + 'static {
    async fn get_all(&self) -> Result<Vec<Category>>;
    async fn get_by_id(&self, category_id: i64) -> Result<Option<Category>>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn add(&self, category: &Category) -> Result<Category>;
    async fn update(&self, category: &Category) -> Result<()>;
    async fn delete(&self, category_id: i64) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubcategoryRepository: Send + Sync + 'static {
    async fn get_by_id(&self, subcategory_id: i64) -> Result<Option<Subcategory>>;
    async fn get_for_category(&self, category_id: i64) -> Result<Vec<Subcategory>>;
    async fn get_by_name(&self, category_id: i64, name: &str) -> Result<Option<Subcategory>>;
    async fn add(&self, subcategory: &Subcategory) -> Result<Subcategory>;
    async fn update(&self, subcategory: &Subcategory) -> Result<()>;
    async fn delete(&self, subcategory_id: i64) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn add(&self, user: &User) -> Result<User>;
    async fn exists(&self, user_id: i64) -> Result<bool>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    async fn get_by_id(&self, role_id: i64) -> Result<Option<Role>>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Role>>;
    /// Role names for a set of role ids, skipping ids that no longer exist.
    async fn get_names(&self, role_ids: &[i64]) -> Result<Vec<String>>;
}
