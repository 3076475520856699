//! # trustsync-engine
//!
//! The trust bundle synchronization engine.
//!
//! ## Data Flow
//!
//! ```text
//! scheduler tick
//!   -> CacheUpdater::update_bundle_cache()
//!        -> per due bundle (concurrent, isolated):
//!             BundleRefresher::refresh()
//!               -> BundleTransport::fetch()        (file:// or http(s)://)
//!               -> fingerprint compare             (unchanged => done)
//!               -> BundleVerifier::decode_anchors  (bare certs, then CMS)
//!               -> AnchorStore::replace_anchors    (atomic swap)
//!               -> BundleStore status update
//! ```
//!
//! Every refresh attempt terminates in a persisted `(attempt timestamp,
//! outcome)` pair on the bundle; no error escapes to the scheduler.
//!
//! The composition root (normally `trustsyncd`) builds one [`BundleTransport`]
//! and one [`BundleVerifier`] and injects them into the pipeline -- there is
//! no hidden global crypto state to initialize.

pub mod anchor;
pub mod config;
pub mod coordinator;
pub mod decode;
pub mod pipeline;
pub mod scheduler;
pub mod store;
pub mod transport;
pub mod verify;

pub use config::{EngineConfig, TransportConfig};
pub use coordinator::CacheUpdater;
pub use decode::{BundleVerifier, DecodeAttempt};
pub use pipeline::BundleRefresher;
pub use store::{AnchorStore, BundleStore, MemoryStore};
pub use transport::{BundleTransport, FetchError};
