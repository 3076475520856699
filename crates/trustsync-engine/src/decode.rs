//! Bundle container decoding.
//!
//! Bundles arrive in one of two container formats, detected by trial
//! parsing in a fixed order:
//!
//! 1. a bare certificate container -- one or more concatenated DER
//!    certificates, or a PEM bundle of `CERTIFICATE` blocks;
//! 2. a CMS signed-data structure wrapping the same, optionally
//!    authenticated against the bundle's configured signer certificate.
//!
//! Each attempt returns a tagged [`DecodeAttempt`] instead of relying on
//! error-driven fallthrough: an empty parse and a parse error are the same
//! thing here (some parsers return an empty success where others fail), and
//! both fall through to the next format.

use tracing::debug;
use trustsync_core::RefreshOutcome;

use crate::verify;

/// Result of trying one container format against raw bundle bytes.
#[derive(Debug)]
pub enum DecodeAttempt {
    /// The format matched and yielded at least one certificate (DER).
    Parsed(Vec<Vec<u8>>),
    /// The bytes are not this format; try the next one.
    NotThisFormat,
    /// The format matched but the content must not be applied.
    Rejected(RefreshOutcome),
}

/// Decodes bundle containers and authenticates signed ones.
///
/// Stateless; built once by the composition root and injected into the
/// refresh pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleVerifier;

impl BundleVerifier {
    /// Create a verifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode raw bundle bytes into a set of anchor certificates (DER).
    ///
    /// `signer_der` is the bundle's configured signer certificate; when
    /// present, signed containers must carry at least one signer that
    /// verifies against it. Unsigned containers are never authenticated.
    ///
    /// # Errors
    ///
    /// Returns the refresh outcome to record when no anchors can be
    /// extracted: [`RefreshOutcome::UnmatchedSignature`] when a signed
    /// container fails authentication, [`RefreshOutcome::InvalidFormat`]
    /// when neither container format yields certificates.
    pub fn decode_anchors(
        self,
        raw: &[u8],
        signer_der: Option<&[u8]>,
    ) -> Result<Vec<Vec<u8>>, RefreshOutcome> {
        match decode_bare(raw) {
            DecodeAttempt::Parsed(certs) => {
                debug!(certs = certs.len(), "decoded bare certificate container");
                return Ok(certs);
            }
            DecodeAttempt::Rejected(outcome) => return Err(outcome),
            DecodeAttempt::NotThisFormat => {}
        }

        match verify::decode_signed(raw, signer_der) {
            DecodeAttempt::Parsed(certs) => {
                debug!(certs = certs.len(), "decoded signed certificate container");
                Ok(certs)
            }
            DecodeAttempt::Rejected(outcome) => Err(outcome),
            DecodeAttempt::NotThisFormat => Err(RefreshOutcome::InvalidFormat),
        }
    }
}

/// Try the bare container format: PEM bundle or concatenated DER certs.
pub(crate) fn decode_bare(raw: &[u8]) -> DecodeAttempt {
    if looks_like_pem(raw) {
        decode_pem(raw)
    } else {
        decode_der_sequence(raw)
    }
}

fn looks_like_pem(raw: &[u8]) -> bool {
    raw.iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| raw[start..].starts_with(b"-----BEGIN"))
}

/// Parse a PEM bundle, keeping only `CERTIFICATE` blocks.
fn decode_pem(raw: &[u8]) -> DecodeAttempt {
    let Ok(pems) = pem::parse_many(raw) else {
        return DecodeAttempt::NotThisFormat;
    };

    let certs: Vec<Vec<u8>> = pems
        .iter()
        .filter(|p| p.tag() == "CERTIFICATE")
        .map(|p| p.contents().to_vec())
        .collect();

    if certs.is_empty() {
        DecodeAttempt::NotThisFormat
    } else {
        DecodeAttempt::Parsed(certs)
    }
}

/// Parse a bare sequence of DER certificates, measuring how much input each
/// one consumed so the raw bytes can be carried into anchor rows.
fn decode_der_sequence(raw: &[u8]) -> DecodeAttempt {
    let mut rem = raw;
    let mut certs = Vec::new();

    while !rem.is_empty() {
        match x509_parser::parse_x509_certificate(rem) {
            Ok((rest, _cert)) => {
                let consumed = rem.len() - rest.len();
                certs.push(rem[..consumed].to_vec());
                rem = rest;
            }
            // Not a cert at this offset; the whole blob is some other format.
            Err(_) => return DecodeAttempt::NotThisFormat,
        }
    }

    if certs.is_empty() {
        DecodeAttempt::NotThisFormat
    } else {
        DecodeAttempt::Parsed(certs)
    }
}
