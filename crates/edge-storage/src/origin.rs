//! HTTP origin backend.
//!
//! Objects live under a base URL (for example a public bucket endpoint).
//! Range and conditional headers are forwarded as received, and the
//! origin's answer is mapped back onto `StoredObject`.

use http::header::{self, HeaderMap};

use crate::error::StorageError;
use crate::object::{ByteRange, HttpMetadata, StoredObject};

/// Parse a `content-range` value such as `bytes 0-99/1000`.
///
/// Returns the covered range and the total size.
pub fn parse_content_range(value: &str) -> Option<(ByteRange, u64)> {
    let rest = value.trim().strip_prefix("bytes ")?;
    let (span, total) = rest.split_once('/')?;
    let (first, last) = span.split_once('-')?;

    let first: u64 = first.trim().parse().ok()?;
    let last: u64 = last.trim().parse().ok()?;
    let total: u64 = total.trim().parse().ok()?;
    if last < first {
        return None;
    }

    Some((
        ByteRange {
            offset: first,
            length: last - first + 1,
        },
        total,
    ))
}

/// Map an origin response onto a store read result.
///
/// - `404` is a missing object.
/// - `304` and `412` are an existing object whose content was withheld.
/// - `200` / `206` carry content; `206` must include `content-range`.
/// - Anything else is an error.
///
/// For `HEAD` reads (`with_body == false`) the size comes from
/// `content-length` and the body is dropped.
pub fn object_from_response(
    key: &str,
    status: u16,
    headers: &HeaderMap,
    body: Vec<u8>,
    with_body: bool,
) -> Result<Option<StoredObject>, StorageError> {
    let text = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    let etag = text(header::ETAG)
        .map(|v| v.strip_prefix("W/").unwrap_or(v).trim_matches('"').to_string())
        .unwrap_or_default();
    let content_length = text(header::CONTENT_LENGTH).and_then(|v| v.trim().parse::<u64>().ok());

    let mut object = StoredObject {
        key: key.to_string(),
        size: content_length.unwrap_or(0),
        etag,
        http_metadata: HttpMetadata::from_headers(headers),
        range: None,
        body: None,
    };

    match status {
        404 => Ok(None),
        304 | 412 => Ok(Some(object)),
        200 => {
            if with_body {
                object.size = body.len() as u64;
                object.body = Some(body);
            }
            Ok(Some(object))
        }
        206 => {
            let (range, total) = text(header::CONTENT_RANGE)
                .and_then(parse_content_range)
                .ok_or_else(|| StorageError::Origin {
                    status,
                    key: key.to_string(),
                })?;
            object.size = total;
            object.range = Some(range);
            if with_body {
                object.body = Some(body);
            }
            Ok(Some(object))
        }
        _ => Err(StorageError::Origin {
            status,
            key: key.to_string(),
        }),
    }
}

#[cfg(target_arch = "wasm32")]
pub use spin_origin::OriginStore;

#[cfg(target_arch = "wasm32")]
mod spin_origin {
    use async_trait::async_trait;
    use http::header::{HeaderMap, HeaderName, HeaderValue};
    use spin_sdk::http::{Method, Request, Response};

    use super::object_from_response;
    use crate::error::StorageError;
    use crate::object::StoredObject;
    use crate::options::GetOptions;
    use crate::store::ObjectStore;

    /// Object store reached over outbound HTTP.
    pub struct OriginStore {
        base_url: String,
    }

    impl OriginStore {
        /// Create a store rooted at `base_url` (ending in `/`).
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
            }
        }

        async fn send(
            &self,
            method: Method,
            key: &str,
            forwarded: &[(HeaderName, String)],
        ) -> Result<(u16, HeaderMap, Vec<u8>), StorageError> {
            let mut builder = Request::builder();
            builder.method(method);
            builder.uri(format!("{}{}", self.base_url, key));
            for (name, value) in forwarded {
                builder.header(name.as_str(), value.as_str());
            }

            let resp: Response = spin_sdk::http::send(builder.build())
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;

            let mut headers = HeaderMap::new();
            for (name, value) in resp.headers() {
                let parsed = (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_bytes(value.as_bytes()),
                );
                if let (Ok(name), Ok(value)) = parsed {
                    headers.append(name, value);
                }
            }

            Ok((*resp.status(), headers, resp.into_body()))
        }
    }

    #[async_trait(?Send)]
    impl ObjectStore for OriginStore {
        async fn head(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
            let (status, headers, body) = self.send(Method::Head, key, &[]).await?;
            object_from_response(key, status, &headers, body, false)
        }

        async fn get(
            &self,
            key: &str,
            options: &GetOptions,
        ) -> Result<Option<StoredObject>, StorageError> {
            let (status, headers, body) = self.send(Method::Get, key, &options.forwarded).await?;
            object_from_response(key, status, &headers, body, true)
        }
    }
}
