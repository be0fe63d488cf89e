//! MultiChzzk edge workload.
//!
//! Serves a page that tiles several live-stream players next to a switchable
//! chat panel. The streams are named by the URL path:
//!
//! ```text
//! /<chzzk uid>/<twitch handle>/a:<afreecatv id>/y:<youtube video id>
//! ```
//!
//! Paths containing a `.` are static assets read from the configured
//! object store. Everything else renders the embed page.
//!
//! The routing core in [`router`] is platform independent and works on
//! `http` types; the Spin component glue is compiled for wasm32 only.

pub mod error;
pub mod layout;
pub mod page;
pub mod router;
pub mod stream;

pub use error::{HandlerError, HandlerResult};
pub use layout::{LayoutParams, TileSize};
pub use router::{handle, Body, WORKLOAD};
pub use stream::{chat_entries, parse_path, ChatEntry, StreamKind, StreamRef};

#[cfg(target_arch = "wasm32")]
mod component {
    use std::cell::OnceCell;
    use std::sync::OnceLock;

    use async_trait::async_trait;
    use edge_core::{ConfigError, SiteConfig, StoreLocation};
    use edge_storage::{GetOptions, KvObjectStore, ObjectStore, OriginStore, StorageError, StoredObject};
    use spin_sdk::http::IntoResponse;
    use spin_sdk::http_component;

    static CONFIG: OnceLock<SiteConfig> = OnceLock::new();

    /// Site configuration from Spin variables, loaded on first use.
    fn site_config() -> Result<&'static SiteConfig, ConfigError> {
        if let Some(config) = CONFIG.get() {
            return Ok(config);
        }
        let config = SiteConfig::from_lookup(|name| spin_sdk::variables::get(name).ok())?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// Opens the configured backend on first access, so page requests never
    /// touch the store.
    struct LazyStore<'a> {
        location: &'a StoreLocation,
        inner: OnceCell<Box<dyn ObjectStore>>,
    }

    impl<'a> LazyStore<'a> {
        fn new(location: &'a StoreLocation) -> Self {
            Self {
                location,
                inner: OnceCell::new(),
            }
        }

        fn open(&self) -> Result<&dyn ObjectStore, StorageError> {
            if let Some(store) = self.inner.get() {
                return Ok(store.as_ref());
            }
            let store: Box<dyn ObjectStore> = match self.location {
                StoreLocation::KeyValue(label) => Box::new(KvObjectStore::open(label)?),
                StoreLocation::Origin(base_url) => Box::new(OriginStore::new(base_url.clone())),
            };
            Ok(self.inner.get_or_init(|| store).as_ref())
        }
    }

    #[async_trait(?Send)]
    impl ObjectStore for LazyStore<'_> {
        async fn head(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
            self.open()?.head(key).await
        }

        async fn get(
            &self,
            key: &str,
            options: &GetOptions,
        ) -> Result<Option<StoredObject>, StorageError> {
            self.open()?.get(key, options).await
        }
    }

    /// Spin entry point.
    #[http_component]
    async fn handle_multichzzk(req: http::Request<()>) -> anyhow::Result<impl IntoResponse> {
        let config = site_config()?;
        let store = LazyStore::new(&config.store);

        let response = crate::router::handle(&req, &store, config).await?;
        Ok(response.map(Option::unwrap_or_default))
    }
}
