use parking_lot::RwLock;
use std::sync::Arc;

use crate::models::MetaInfo;
use crate::repository::StorageBackend;

/// Process-lifetime cache of the folder metadata index
///
/// The first `get` loads the serialized index from storage; after a
/// successful load the value is served until `reset`. There is no TTL.
///
/// Loads are not coalesced: concurrent first requests may each read storage
/// and overwrite the slot with an equivalent value. The lock only guards the
/// slot swap and is never held across an `.await`.
pub struct MetaInfoCache {
    store: Arc<dyn StorageBackend>,
    key: String,
    slot: RwLock<Option<Arc<MetaInfo>>>,
}

impl MetaInfoCache {
    pub fn new(store: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            slot: RwLock::new(None),
        }
    }

    /// Cached index, loading it on a miss. `None` when nothing usable is stored.
    pub async fn get(&self) -> Option<Arc<MetaInfo>> {
        let cached = self.slot.read().clone();
        if cached.is_some() {
            return cached;
        }

        let loaded = Arc::new(self.load().await?);
        *self.slot.write() = Some(Arc::clone(&loaded));
        tracing::info!(
            key = %self.key,
            folders = loaded.folders.len(),
            "Metadata index loaded"
        );
        Some(loaded)
    }

    /// Drop the cached index; the next `get` reloads from storage.
    pub fn reset(&self) {
        *self.slot.write() = None;
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    async fn load(&self) -> Option<MetaInfo> {
        let Some(values) = self.store.global_values() else {
            tracing::debug!(backend = self.store.name(), "Storage backend has no global values");
            return None;
        };

        let raw = match values.get_global_value(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No metadata index stored");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read metadata index");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored metadata index is not valid JSON");
                None
            }
        }
    }
}
