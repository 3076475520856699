//! Trust bundle synchronization for federated messaging networks.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trustsync::{
//!     BundleRefresher, BundleTransport, BundleVerifier, CacheUpdater,
//!     EngineConfig, MemoryStore, TrustBundle,
//! };
//!
//! #[tokio::main]
//! async fn main() -> trustsync::Result<()> {
//!     let config = EngineConfig::default();
//!     let store = MemoryStore::new();
//!
//!     store
//!         .insert(TrustBundle::new(
//!             "providers",
//!             "https://bundles.example.org/providers.p7b",
//!             86_400,
//!         ))
//!         .await?;
//!
//!     let transport = BundleTransport::new(&config.transport)?;
//!     let refresher = BundleRefresher::new(
//!         Arc::new(store.clone()),
//!         Arc::new(store.clone()),
//!         transport,
//!         BundleVerifier::new(),
//!     );
//!     let updater = CacheUpdater::new(Arc::new(store), refresher);
//!
//!     trustsync::scheduler::run(updater, config.update_period()).await;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

// Re-export core types
pub use trustsync_core::*;

// Re-export the engine
pub use trustsync_engine::{
    anchor, config, coordinator, decode, pipeline, scheduler, store, transport, verify,
    AnchorStore, BundleRefresher, BundleStore, BundleTransport, BundleVerifier, CacheUpdater,
    DecodeAttempt, EngineConfig, FetchError, MemoryStore, TransportConfig,
};

// Re-export runtime for convenience
pub use tokio;
