//! Decoded certificate to anchor-row conversion.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use trustsync_core::fingerprint::cert_thumbprint;
use trustsync_core::{BundleId, Result, SyncError, TrustAnchor};

/// Convert decoded certificates into anchor rows for one bundle,
/// deduplicating by thumbprint.
///
/// Any certificate that fails to convert aborts the whole batch -- the
/// anchor set is applied all-or-nothing.
///
/// # Errors
///
/// Returns `SyncError::CertParse` if any certificate's DER cannot be parsed.
pub fn build_anchors(bundle_id: BundleId, cert_ders: Vec<Vec<u8>>) -> Result<Vec<TrustAnchor>> {
    let mut seen = HashSet::new();
    let mut anchors = Vec::with_capacity(cert_ders.len());

    for der in cert_ders {
        let anchor = anchor_from_der(bundle_id, der)?;
        if seen.insert(anchor.thumbprint.clone()) {
            anchors.push(anchor);
        }
    }

    Ok(anchors)
}

/// Build one anchor row from a DER-encoded certificate.
///
/// # Errors
///
/// Returns `SyncError::CertParse` if the DER cannot be parsed as X.509.
pub fn anchor_from_der(bundle_id: BundleId, der: Vec<u8>) -> Result<TrustAnchor> {
    let (_, cert) = x509_parser::parse_x509_certificate(&der)
        .map_err(|e| SyncError::CertParse(e.to_string()))?;

    let valid_from = asn1_to_utc(cert.validity().not_before);
    let valid_until = asn1_to_utc(cert.validity().not_after);
    let thumbprint = cert_thumbprint(&der);

    Ok(TrustAnchor {
        id: Uuid::new_v4(),
        bundle_id,
        der,
        thumbprint,
        valid_from,
        valid_until,
    })
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    let epoch = t.timestamp();
    Utc.timestamp_opt(epoch, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
