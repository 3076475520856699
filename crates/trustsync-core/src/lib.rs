//! # trustsync-core
//!
//! Core types for the trustsync trust-bundle synchronization engine.
//!
//! A *trust bundle* is a named collection of X.509 trust anchors hosted at a
//! URL. The engine periodically re-fetches each bundle, authenticates it,
//! and replaces the locally held anchor set when the content changed. This
//! crate holds the shared vocabulary: the bundle and anchor records, the
//! refresh outcome codes recorded after every attempt, the error type, and
//! the content fingerprint used for change detection.
//!
//! No I/O happens here -- transport, decoding, and persistence live in
//! `trustsync-engine`.

pub mod error;
pub mod fingerprint;
pub mod types;

pub use error::{Result, SyncError};
pub use types::*;
