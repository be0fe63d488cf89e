//! In-process object store.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::object::{HttpMetadata, ObjectMeta, StoredObject};
use crate::options::GetOptions;
use crate::store::{read_local, ObjectStore};

/// Object store backed by a `HashMap`.
///
/// Entity-tag conditions and ranges are evaluated; date conditions are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: HashMap<String, (ObjectMeta, Vec<u8>)>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object. Returns its metadata.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        content: impl Into<Vec<u8>>,
        http_metadata: HttpMetadata,
    ) -> ObjectMeta {
        let content = content.into();
        let meta = ObjectMeta::for_content(&content, http_metadata);
        self.objects.insert(key.into(), (meta.clone(), content));
        meta
    }

    /// Builder-style insert.
    pub fn with_object(
        mut self,
        key: impl Into<String>,
        content: impl Into<Vec<u8>>,
        http_metadata: HttpMetadata,
    ) -> Self {
        self.put(key, content, http_metadata);
        self
    }
}

#[async_trait(?Send)]
impl ObjectStore for MemoryStore {
    async fn head(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        Ok(self
            .objects
            .get(key)
            .map(|(meta, _)| StoredObject::from_meta(key, meta)))
    }

    async fn get(
        &self,
        key: &str,
        options: &GetOptions,
    ) -> Result<Option<StoredObject>, StorageError> {
        self.objects
            .get(key)
            .map(|(meta, content)| read_local(key, meta, content, options))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ByteRange;
    use futures::executor::block_on;
    use http::{HeaderMap, HeaderValue};

    fn store() -> MemoryStore {
        MemoryStore::new().with_object(
            "robots.txt",
            "User-agent: *\nDisallow:\n",
            HttpMetadata::with_content_type("text/plain"),
        )
    }

    fn options(pairs: &[(&'static str, &str)]) -> GetOptions {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        GetOptions::from_headers(&headers)
    }

    #[test]
    fn test_missing_key() {
        let store = store();
        assert_eq!(block_on(store.head("nope.txt")).unwrap(), None);
        assert_eq!(block_on(store.get("nope.txt", &GetOptions::default())).unwrap(), None);
    }

    #[test]
    fn test_head_has_no_body() {
        let object = block_on(store().head("robots.txt")).unwrap().unwrap();
        assert_eq!(object.size, 24);
        assert!(!object.has_body());
        assert_eq!(object.http_metadata.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_full_get() {
        let object = block_on(store().get("robots.txt", &GetOptions::default()))
            .unwrap()
            .unwrap();
        assert_eq!(object.body.as_deref(), Some(&b"User-agent: *\nDisallow:\n"[..]));
        assert_eq!(object.range, None);
    }

    #[test]
    fn test_range_get() {
        let object = block_on(store().get("robots.txt", &options(&[("range", "bytes=0-9")])))
            .unwrap()
            .unwrap();
        assert_eq!(object.body.as_deref(), Some(&b"User-agent"[..]));
        assert_eq!(object.range, Some(ByteRange { offset: 0, length: 10 }));
        assert_eq!(object.content_range().as_deref(), Some("bytes 0-9/24"));
    }

    #[test]
    fn test_if_none_match_suppresses_body() {
        let mut store = store();
        let meta = store.put("a.css", "body{}", HttpMetadata::default());
        let etag = format!("\"{}\"", meta.etag);

        let object = block_on(store.get("a.css", &options(&[("if-none-match", etag.as_str())])))
            .unwrap()
            .unwrap();
        assert!(!object.has_body());
        assert_eq!(object.etag, meta.etag);
    }

    #[test]
    fn test_unsatisfiable_range_is_an_error() {
        let result = block_on(store().get("robots.txt", &options(&[("range", "bytes=100-")])));
        assert_eq!(result, Err(StorageError::RangeNotSatisfiable { size: 24 }));
    }
}
