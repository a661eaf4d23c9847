//! Persistence backends for global values.
//!
//! Not every backend can hold global values. Callers ask through
//! [`StorageBackend::global_values`] and treat `None` as "nothing stored".

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;

use crate::Result;

/// Read access to process-wide values stored under a fixed key.
#[async_trait]
pub trait GlobalValueStore: Send + Sync {
    async fn get_global_value(&self, key: &str) -> Result<Option<String>>;
}

/// A persistence backend and the capabilities it offers.
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the backend cannot store global values.
    fn global_values(&self) -> Option<&dyn GlobalValueStore>;
}

/// Redis-backed store (`GET key`)
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GlobalValueStore for RedisStore {
    async fn get_global_value(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        tracing::debug!(key = %key, found = value.is_some(), "Redis global value lookup");
        Ok(value)
    }
}

impl StorageBackend for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn global_values(&self) -> Option<&dyn GlobalValueStore> {
        Some(self)
    }
}

/// In-process store, for tests and single-node setups seeded at startup.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global_value(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }
}

#[async_trait]
impl GlobalValueStore for MemoryStore {
    async fn get_global_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }
}

impl StorageBackend for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn global_values(&self) -> Option<&dyn GlobalValueStore> {
        Some(self)
    }
}

/// Backend without any storage capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl StorageBackend for NullStore {
    fn name(&self) -> &'static str {
        "none"
    }

    fn global_values(&self) -> Option<&dyn GlobalValueStore> {
        None
    }
}
