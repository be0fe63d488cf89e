//! Object store access for static assets served at the edge.
//!
//! The handler treats the store as an opaque collaborator with two reads:
//! `head(key)` for metadata and `get(key, options)` for content, where the
//! options carry the request's `Range` and `If-*` headers.
//!
//! Backends:
//! - `MemoryStore` - In-process map, used for tests and local runs
//! - `KvObjectStore` - Spin key-value store (wasm32 only)
//! - `OriginStore` - HTTP origin such as a public bucket endpoint (wasm32 only)
//!
//! # Example
//!
//! ```rust,ignore
//! let options = GetOptions::from_headers(req.headers());
//! match store.get("favicon.ico", &options).await? {
//!     Some(object) => { /* object.body, object.range, ... */ }
//!     None => { /* 404 */ }
//! }
//! ```

mod error;
#[cfg(target_arch = "wasm32")]
mod kv;
mod memory;
mod object;
mod options;
mod origin;
mod store;

pub use error::StorageError;
#[cfg(target_arch = "wasm32")]
pub use kv::KvObjectStore;
pub use memory::MemoryStore;
pub use object::{ByteRange, HttpMetadata, ObjectMeta, StoredObject};
pub use options::{Conditions, EntityTag, GetOptions, RangeSpec};
#[cfg(target_arch = "wasm32")]
pub use origin::OriginStore;
pub use origin::{object_from_response, parse_content_range};
pub use store::ObjectStore;
