//! The object store trait.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::object::{ObjectMeta, StoredObject};
use crate::options::GetOptions;

/// Read-only access to a blob store keyed by object name.
///
/// Spin runs components on a single-threaded executor, so futures are not
/// required to be `Send`.
#[async_trait(?Send)]
pub trait ObjectStore {
    /// Fetch metadata only. `None` if the key does not exist.
    async fn head(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;

    /// Fetch an object honouring range and conditional options.
    ///
    /// `None` if the key does not exist. A failed precondition returns the
    /// object without a body.
    async fn get(&self, key: &str, options: &GetOptions)
        -> Result<Option<StoredObject>, StorageError>;
}

/// Apply `options` to a locally held object.
///
/// Shared by backends that hold the full content in process. Sizes and
/// ranges come from `content` itself, so a stale `meta.size` cannot push a
/// slice out of bounds.
pub(crate) fn read_local(
    key: &str,
    meta: &ObjectMeta,
    content: &[u8],
    options: &GetOptions,
) -> Result<StoredObject, StorageError> {
    let mut object = StoredObject::from_meta(key, meta);
    let size = content.len() as u64;
    object.size = size;

    if !options.only_if.permits(&meta.etag) {
        return Ok(object);
    }

    match options.range {
        Some(spec) => {
            let range = spec.resolve(size)?;
            let slice = usize::try_from(range.offset)
                .ok()
                .zip(usize::try_from(range.length).ok())
                .and_then(|(start, length)| content.get(start..start.checked_add(length)?))
                .ok_or(StorageError::RangeNotSatisfiable { size })?;
            object.body = Some(slice.to_vec());
            object.range = Some(range);
        }
        None => object.body = Some(content.to_vec()),
    }

    Ok(object)
}
