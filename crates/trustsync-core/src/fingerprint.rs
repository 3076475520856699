//! Content fingerprinting via `ring::digest`.
//!
//! Fingerprints are used for cheap equality comparison -- deciding whether a
//! re-fetched bundle changed since the last successful refresh -- never for
//! authentication. The same digest family is used for certificate
//! thumbprints so the two render identically in logs.

use ring::digest::SHA256;

/// Compute the SHA-256 fingerprint of raw bytes.
///
/// Returns lowercase hex-encoded digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = ring::digest::digest(&SHA256, data);
    hex::encode(digest.as_ref())
}

/// Thumbprint of a certificate's DER encoding.
///
/// Same algorithm as [`sha256_hex`]; the alias exists so call sites read as
/// what they compute.
#[must_use]
pub fn cert_thumbprint(der: &[u8]) -> String {
    sha256_hex(der)
}
