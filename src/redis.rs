use std::sync::Arc;

use deadpool::managed::QueueMode;
use deadpool_redis::{Config as DeadpoolConfig, Pool, PoolConfig, Runtime, Timeouts};
use redis::AsyncCommands;

use crate::error::Result;

/// Redis connection manager
///
/// Entities are stored as JSON strings under typed keys, with hash-based
/// secondary indexes (email, name) and sets for id listings. Entity keys
/// carry no TTL; records live until deleted.
#[derive(Clone)]
pub struct RedisManager {
    pool: Arc<Pool>,
}

impl RedisManager {
    /// Create a new Redis manager with configuration
    pub async fn new_with_config(config: &crate::config::Config) -> Result<Self> {
        let redis_url = config.get_redis_url();

        tracing::info!(
            "Connecting to Redis at {}:{} (db: {})",
            config.redis.host,
            config.redis.port,
            config.redis.database
        );

        // Configure the connection pool with settings from config
        let mut cfg = DeadpoolConfig::from_url(&redis_url);

        // Set pool configuration from config
        cfg.pool = Some(PoolConfig {
            max_size: config.redis.pool.max_size,
            timeouts: Timeouts {
                wait: Some(config.get_pool_timeout()),
                create: Some(config.get_pool_create_timeout()),
                recycle: Some(config.get_pool_recycle_timeout()),
            },
            queue_mode: QueueMode::Fifo,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| crate::error::ContactListError::PoolCreation(e.to_string()))?;

        // Test the connection
        let mut conn = pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis connection established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Pool without the connection probe, for unit tests that never touch
    /// the network.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let cfg = DeadpoolConfig::from_url("redis://127.0.0.1:6379/0");
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .expect("pool config is valid");
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Store a value as JSON under a key
    pub async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        conn.set::<_, _, ()>(key, json).await?;
        Ok(())
    }

    /// Fetch a JSON value by key
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        let result: Option<String> = conn.get(key).await?;
        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Delete a key, reporting whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        Ok(conn.exists(key).await?)
    }

    /// Allocate the next id from a counter key
    pub async fn next_id(&self, counter_key: &str) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        Ok(conn.incr(counter_key, 1).await?)
    }

    /// Set a key only if it does not exist yet. Returns true when this call
    /// created it.
    pub async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let created: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .query_async(&mut *conn)
            .await?;
        Ok(created.is_some())
    }

    // Set primitives, used for id listings

    pub async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    pub async fn srem(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.get_connection().await?;
        Ok(conn.smembers(key).await?)
    }

    // Hash primitives, used for secondary indexes

    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        Ok(conn.hget(key, field).await?)
    }

    pub async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.hdel::<_, _, ()>(key, field).await?;
        Ok(())
    }
}
