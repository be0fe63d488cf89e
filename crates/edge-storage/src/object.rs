//! Stored object model.

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A resolved byte range within an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte, zero-based.
    pub offset: u64,
    /// Number of bytes.
    pub length: u64,
}

impl ByteRange {
    /// Index of the last byte (inclusive).
    pub fn end(&self) -> u64 {
        (self.offset + self.length).saturating_sub(1)
    }

    /// `content-range` header value for an object of `size` bytes.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.offset, self.end(), size)
    }
}

/// HTTP metadata stored alongside an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl HttpMetadata {
    /// Metadata with only a content type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    /// Set the cache-control value.
    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    /// Read metadata from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        Self {
            content_type: get(header::CONTENT_TYPE),
            content_language: get(header::CONTENT_LANGUAGE),
            content_disposition: get(header::CONTENT_DISPOSITION),
            content_encoding: get(header::CONTENT_ENCODING),
            cache_control: get(header::CACHE_CONTROL),
            expires: get(header::EXPIRES),
        }
    }

    fn pairs(&self) -> [(HeaderName, Option<&String>); 6] {
        [
            (header::CONTENT_TYPE, self.content_type.as_ref()),
            (header::CONTENT_LANGUAGE, self.content_language.as_ref()),
            (header::CONTENT_DISPOSITION, self.content_disposition.as_ref()),
            (header::CONTENT_ENCODING, self.content_encoding.as_ref()),
            (header::CACHE_CONTROL, self.cache_control.as_ref()),
            (header::EXPIRES, self.expires.as_ref()),
        ]
    }

    /// Write the set fields into a header map. Values that are not valid
    /// header text are skipped.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        for (name, value) in self.pairs() {
            if let Some(value) = value.and_then(|v| HeaderValue::from_str(v).ok()) {
                headers.insert(name, value);
            }
        }
    }
}

/// Metadata persisted for every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Content hash, unquoted.
    pub etag: String,
    /// HTTP metadata.
    #[serde(default)]
    pub http_metadata: HttpMetadata,
}

impl ObjectMeta {
    /// Describe `body`, deriving the etag from its content.
    pub fn for_content(body: &[u8], http_metadata: HttpMetadata) -> Self {
        Self {
            size: body.len() as u64,
            etag: content_etag(body),
            http_metadata,
        }
    }
}

/// First 128 bits of the SHA-256 of `body`, as hex.
pub(crate) fn content_etag(body: &[u8]) -> String {
    Sha256::digest(body)[..16]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// An object as returned by a store read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key.
    pub key: String,
    /// Total object size in bytes.
    pub size: u64,
    /// Content hash, unquoted.
    pub etag: String,
    /// HTTP metadata.
    pub http_metadata: HttpMetadata,
    /// The range the body covers, for range reads.
    pub range: Option<ByteRange>,
    /// Object content. `None` for metadata-only reads and failed
    /// preconditions.
    pub body: Option<Vec<u8>>,
}

impl StoredObject {
    /// Metadata-only view of an object.
    pub fn from_meta(key: impl Into<String>, meta: &ObjectMeta) -> Self {
        Self {
            key: key.into(),
            size: meta.size,
            etag: meta.etag.clone(),
            http_metadata: meta.http_metadata.clone(),
            range: None,
            body: None,
        }
    }

    /// The etag in quoted header form.
    pub fn http_etag(&self) -> String {
        format!("\"{}\"", self.etag)
    }

    /// Write the object's HTTP metadata into a header map.
    pub fn write_http_metadata(&self, headers: &mut HeaderMap) {
        self.http_metadata.write_headers(headers);
    }

    /// `content-range` value when the object was read with a range.
    pub fn content_range(&self) -> Option<String> {
        self.range.map(|r| r.content_range(self.size))
    }

    /// Whether the read returned content.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
