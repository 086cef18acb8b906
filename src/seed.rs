use crate::error::Result;
use crate::models::{Category, Role, Subcategory};
use crate::redis::RedisManager;

/// Category whose contacts use a free-form custom subcategory instead of a
/// predefined one.
pub const OTHER_CATEGORY_ID: i64 = 3;

pub fn seed_roles() -> Vec<Role> {
    vec![
        Role {
            role_id: 1,
            name: "User".to_string(),
        },
        Role {
            role_id: 2,
            name: "Admin".to_string(),
        },
    ]
}

pub fn seed_categories() -> Vec<Category> {
    vec![
        Category {
            category_id: 1,
            name: "Business".to_string(),
        },
        Category {
            category_id: 2,
            name: "Private".to_string(),
        },
        Category {
            category_id: OTHER_CATEGORY_ID,
            name: "Other".to_string(),
        },
    ]
}

pub fn seed_subcategories() -> Vec<Subcategory> {
    vec![
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
        Subcategory {
            subcategory_id: 3,
            category_id: 1,
            name: "Client".to_string(),
        },
        Subcategory {
            subcategory_id: 4,
            category_id: 2,
            name: "Family".to_string(),
        },
        Subcategory {
            subcategory_id: 5,
            category_id: 2,
            name: "Friend".to_string(),
        },
    ]
}

/// Write the baseline roles, categories and subcategories on first startup.
///
/// Guarded by a marker key so concurrent or repeated startups only seed
/// once. Key layout matches the Redis repository implementations.
pub async fn ensure_seed_data(redis: &RedisManager) -> Result<()> {
    if !redis.set_if_absent("seed:version", "1").await? {
        tracing::debug!("Seed data already present, skipping");
        return Ok(());
    }

    let roles = seed_roles();
    for role in &roles {
        redis.set_json(&format!("roles:{}", role.role_id), role).await?;
        redis
            .hset("roles:by_name", &role.name.to_lowercase(), &role.role_id.to_string())
            .await?;
    }
    redis.set_if_absent("roles:next_id", "2").await?;

    let categories = seed_categories();
    for category in &categories {
        redis
            .set_json(&format!("categories:{}", category.category_id), category)
            .await?;
        redis
            .sadd("categories:all", &category.category_id.to_string())
            .await?;
        redis
            .hset(
                "categories:by_name",
                &category.name.to_lowercase(),
                &category.category_id.to_string(),
            )
            .await?;
    }
    redis.set_if_absent("categories:next_id", "3").await?;

    let subcategories = seed_subcategories();
    for subcategory in &subcategories {
        redis
            .set_json(
                &format!("subcategories:{}", subcategory.subcategory_id),
                subcategory,
            )
            .await?;
        redis
            .sadd(
                &format!("categories:{}:subcategories", subcategory.category_id),
                &subcategory.subcategory_id.to_string(),
            )
            .await?;
    }
    redis.set_if_absent("subcategories:next_id", "5").await?;

    tracing::info!(
        "Seeded {} roles, {} categories and {} subcategories",
        roles.len(),
        categories.len(),
        subcategories.len()
    );
    Ok(())
}
