//! Spin key-value store backend.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::object::{ObjectMeta, StoredObject};
use crate::options::GetOptions;
use crate::store::{read_local, ObjectStore};

/// Object store backed by Spin's key-value store.
///
/// Each object occupies two entries: `meta:<key>` holds the JSON-encoded
/// `ObjectMeta` and `body:<key>` holds the raw content.
pub struct KvObjectStore {
    store: spin_sdk::key_value::Store,
}

impl KvObjectStore {
    /// Open a key-value store by label.
    pub fn open(label: &str) -> Result<Self, StorageError> {
        let store = spin_sdk::key_value::Store::open(label)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self { store })
    }

    fn meta(&self, key: &str) -> Result<Option<ObjectMeta>, StorageError> {
        match self.store.get(format!("meta:{}", key)) {
            Ok(Some(bytes)) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }
}

#[async_trait(?Send)]
impl ObjectStore for KvObjectStore {
    async fn head(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        Ok(self.meta(key)?.map(|meta| StoredObject::from_meta(key, &meta)))
    }

    async fn get(
        &self,
        key: &str,
        options: &GetOptions,
    ) -> Result<Option<StoredObject>, StorageError> {
        let Some(meta) = self.meta(key)? else {
            return Ok(None);
        };

        let content = self
            .store
            .get(format!("body:{}", key))
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match content {
            Some(content) => read_local(key, &meta, &content, options).map(Some),
            // Metadata without content: treat as missing
            None => Ok(None),
        }
    }
}
