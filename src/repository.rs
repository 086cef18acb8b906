use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Category, Contact, Role, Subcategory, User};
use crate::redis::RedisManager;
use crate::repository_traits::{
    CategoryRepository, ContactRepository, RoleRepository, SubcategoryRepository, UserRepository,
};

/// Redis implementation of ContactRepository
///
/// Layout: `contacts:{id}` holds the JSON record, `contacts:all` the id
/// listing, `users:{user_id}:contacts` the per-owner listing.
pub struct RedisContactRepository {
    redis: Arc<RedisManager>,
}

impl RedisContactRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }

    fn contact_key(&self, contact_id: i64) -> String {
        format!("contacts:{contact_id}")
    }

    fn all_key(&self) -> String {
        "contacts:all".to_string()
    }

    fn user_index_key(&self, user_id: i64) -> String {
        format!("users:{user_id}:contacts")
    }

    async fn fetch_many(&self, ids: Vec<i64>) -> Result<Vec<Contact>> {
        let keys: Vec<String> = ids.iter().map(|id| self.contact_key(*id)).collect();
        let fetches = keys.iter().map(|key| self.redis.get_json::<Contact>(key));
        let mut contacts: Vec<Contact> =
            try_join_all(fetches).await?.into_iter().flatten().collect();
        contacts.sort_by_key(|c| c.contact_id);
        Ok(contacts)
    }
}

#[async_trait]
impl ContactRepository for RedisContactRepository {
    async fn get_all(&self) -> Result<Vec<Contact>> {
        let ids = parse_ids(self.redis.smembers(&self.all_key()).await?);
        self.fetch_many(ids).await
    }

    async fn get_all_for_user(&self, user_id: i64) -> Result<Vec<Contact>> {
        let ids = parse_ids(self.redis.smembers(&self.user_index_key(user_id)).await?);
        self.fetch_many(ids).await
    }

    async fn get_by_id(&self, contact_id: i64) -> Result<Option<Contact>> {
        self.redis.get_json(&self.contact_key(contact_id)).await
    }

    async fn add(&self, contact: &Contact) -> Result<Contact> {
        let id = self.redis.next_id("contacts:next_id").await?;
        let stored = Contact {
            contact_id: id,
            ..contact.clone()
        };
        self.redis.set_json(&self.contact_key(id), &stored).await?;
        self.redis.sadd(&self.all_key(), &id.to_string()).await?;
        self.redis
            .sadd(&self.user_index_key(stored.user_id), &id.to_string())
            .await?;
        Ok(stored)
    }

    async fn update(&self, contact: &Contact) -> Result<()> {
        self.redis
            .set_json(&self.contact_key(contact.contact_id), contact)
            .await
    }

    async fn delete(&self, contact_id: i64) -> Result<()> {
        let key = self.contact_key(contact_id);
        if let Some(existing) = self.redis.get_json::<Contact>(&key).await? {
            self.redis
                .srem(&self.user_index_key(existing.user_id), &contact_id.to_string())
                .await?;
        }
        self.redis.srem(&self.all_key(), &contact_id.to_string()).await?;
        self.redis.delete(&key).await?;
        Ok(())
    }
}

/// Redis implementation of CategoryRepository
///
/// `categories:by_name` maps lowercased names to ids for uniqueness checks.
pub struct RedisCategoryRepository {
    redis: Arc<RedisManager>,
}

impl RedisCategoryRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }

    fn category_key(&self, category_id: i64) -> String {
        format!("categories:{category_id}")
    }

    fn name_index_key(&self) -> String {
        "categories:by_name".to_string()
    }
}

#[async_trait]
impl CategoryRepository for RedisCategoryRepository {
    async fn get_all(&self) -> Result<Vec<Category>> {
        let ids = parse_ids(self.redis.smembers("categories:all").await?);
        let keys: Vec<String> = ids.iter().map(|id| self.category_key(*id)).collect();
        let fetches = keys.iter().map(|key| self.redis.get_json::<Category>(key));
        let mut categories: Vec<Category> =
            try_join_all(fetches).await?.into_iter().flatten().collect();
        categories.sort_by_key(|c| c.category_id);
        Ok(categories)
    }

    async fn get_by_id(&self, category_id: i64) -> Result<Option<Category>> {
        self.redis.get_json(&self.category_key(category_id)).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let id = self
            .redis
            .hget(&self.name_index_key(), &name.to_lowercase())
            .await?;
        match id.and_then(|raw| raw.parse::<i64>().ok()) {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn add(&self, category: &Category) -> Result<Category> {
        let id = self.redis.next_id("categories:next_id").await?;
        let stored = Category {
            category_id: id,
            name: category.name.clone(),
        };
        self.redis.set_json(&self.category_key(id), &stored).await?;
        self.redis.sadd("categories:all", &id.to_string()).await?;
        self.redis
            .hset(&self.name_index_key(), &stored.name.to_lowercase(), &id.to_string())
            .await?;
        Ok(stored)
    }

    async fn update(&self, category: &Category) -> Result<()> {
        let key = self.category_key(category.category_id);
        if let Some(existing) = self.redis.get_json::<Category>(&key).await? {
            if !existing.name.eq_ignore_ascii_case(&category.name) {
                self.redis
                    .hdel(&self.name_index_key(), &existing.name.to_lowercase())
                    .await?;
            }
        }
        self.redis.set_json(&key, category).await?;
        self.redis
            .hset(
                &self.name_index_key(),
                &category.name.to_lowercase(),
                &category.category_id.to_string(),
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, category_id: i64) -> Result<()> {
        let key = self.category_key(category_id);
        if let Some(existing) = self.redis.get_json::<Category>(&key).await? {
            self.redis
                .hdel(&self.name_index_key(), &existing.name.to_lowercase())
                .await?;
        }
        self.redis.srem("categories:all", &category_id.to_string()).await?;
        self.redis.delete(&key).await?;
        Ok(())
    }
}

/// Redis implementation of SubcategoryRepository
pub struct RedisSubcategoryRepository {
    redis: Arc<RedisManager>,
}

impl RedisSubcategoryRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }

    fn subcategory_key(&self, subcategory_id: i64) -> String {
        format!("subcategories:{subcategory_id}")
    }

    fn category_index_key(&self, category_id: i64) -> String {
        format!("categories:{category_id}:subcategories")
    }
}

#[async_trait]
impl SubcategoryRepository for RedisSubcategoryRepository {
    async fn get_by_id(&self, subcategory_id: i64) -> Result<Option<Subcategory>> {
        self.redis.get_json(&self.subcategory_key(subcategory_id)).await
    }

    async fn get_for_category(&self, category_id: i64) -> Result<Vec<Subcategory>> {
        let ids = parse_ids(self.redis.smembers(&self.category_index_key(category_id)).await?);
        let keys: Vec<String> = ids.iter().map(|id| self.subcategory_key(*id)).collect();
        let fetches = keys.iter().map(|key| self.redis.get_json::<Subcategory>(key));
        let mut subcategories: Vec<Subcategory> =
            try_join_all(fetches).await?.into_iter().flatten().collect();
        subcategories.sort_by_key(|s| s.subcategory_id);
        Ok(subcategories)
    }

    async fn get_by_name(&self, category_id: i64, name: &str) -> Result<Option<Subcategory>> {
        // Subcategory sets are small; a filtered fetch beats a second index
        let subcategories = self.get_for_category(category_id).await?;
        Ok(subcategories
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(name)))
    }

    async fn add(&self, subcategory: &Subcategory) -> Result<Subcategory> {
        let id = self.redis.next_id("subcategories:next_id").await?;
        let stored = Subcategory {
            subcategory_id: id,
            category_id: subcategory.category_id,
            name: subcategory.name.clone(),
        };
        self.redis.set_json(&self.subcategory_key(id), &stored).await?;
        self.redis
            .sadd(&self.category_index_key(stored.category_id), &id.to_string())
            .await?;
        Ok(stored)
    }

    async fn update(&self, subcategory: &Subcategory) -> Result<()> {
        let key = self.subcategory_key(subcategory.subcategory_id);
        if let Some(existing) = self.redis.get_json::<Subcategory>(&key).await? {
            // Re-home the index entry if the subcategory moved categories
            if existing.category_id != subcategory.category_id {
                self.redis
                    .srem(
                        &self.category_index_key(existing.category_id),
                        &subcategory.subcategory_id.to_string(),
                    )
                    .await?;
                self.redis
                    .sadd(
                        &self.category_index_key(subcategory.category_id),
                        &subcategory.subcategory_id.to_string(),
                    )
                    .await?;
            }
        }
        self.redis.set_json(&key, subcategory).await
    }

    async fn delete(&self, subcategory_id: i64) -> Result<()> {
        let key = self.subcategory_key(subcategory_id);
        if let Some(existing) = self.redis.get_json::<Subcategory>(&key).await? {
            self.redis
                .srem(
                    &self.category_index_key(existing.category_id),
                    &subcategory_id.to_string(),
                )
                .await?;
        }
        self.redis.delete(&key).await?;
        Ok(())
    }
}

/// Redis implementation of UserRepository
///
/// `users:by_email` maps lowercased emails to ids; registration relies on
/// it for the duplicate check.
pub struct RedisUserRepository {
    redis: Arc<RedisManager>,
}

impl RedisUserRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }

    fn user_key(&self, user_id: i64) -> String {
        format!("users:{user_id}")
    }

    fn email_index_key(&self) -> String {
        "users:by_email".to_string()
    }
}

#[async_trait]
impl UserRepository for RedisUserRepository {
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>> {
        self.redis.get_json(&self.user_key(user_id)).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = self
            .redis
            .hget(&self.email_index_key(), &email.to_lowercase())
            .await?;
        match id.and_then(|raw| raw.parse::<i64>().ok()) {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn add(&self, user: &User) -> Result<User> {
        let id = self.redis.next_id("users:next_id").await?;
        let stored = User {
            user_id: id,
            ..user.clone()
        };
        self.redis.set_json(&self.user_key(id), &stored).await?;
        self.redis
            .hset(&self.email_index_key(), &stored.email.to_lowercase(), &id.to_string())
            .await?;
        Ok(stored)
    }

    async fn exists(&self, user_id: i64) -> Result<bool> {
        self.redis.exists(&self.user_key(user_id)).await
    }
}

/// Redis implementation of RoleRepository
pub struct RedisRoleRepository {
    redis: Arc<RedisManager>,
}

impl RedisRoleRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }

    fn role_key(&self, role_id: i64) -> String {
        format!("roles:{role_id}")
    }

    fn name_index_key(&self) -> String {
        "roles:by_name".to_string()
    }
}

#[async_trait]
impl RoleRepository for RedisRoleRepository {
    async fn get_by_id(&self, role_id: i64) -> Result<Option<Role>> {
        self.redis.get_json(&self.role_key(role_id)).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Role>> {
        let id = self
            .redis
            .hget(&self.name_index_key(), &name.to_lowercase())
            .await?;
        match id.and_then(|raw| raw.parse::<i64>().ok()) {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn get_names(&self, role_ids: &[i64]) -> Result<Vec<String>> {
        let fetches = role_ids.iter().map(|id| self.get_by_id(*id));
        Ok(try_join_all(fetches)
            .await?
            .into_iter()
            .flatten()
            .map(|role| role.name)
            .collect())
    }
}

fn parse_ids(members: Vec<String>) -> Vec<i64> {
    members
        .into_iter()
        .filter_map(|raw| raw.parse::<i64>().ok())
        .collect()
}
