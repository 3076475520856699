//! CMS signed-data container parsing and signature verification.
//!
//! A signed bundle is a `ContentInfo` wrapping a `SignedData` whose
//! encapsulated payload is itself a bare certificate container. When the
//! owning bundle carries a signer certificate, at least one `SignerInfo`
//! must verify against that certificate's public key; otherwise
//! authentication is skipped by design.
//!
//! Per RFC 5652: when signed attributes are present, the signature covers
//! the re-encoded attribute SET and the `message-digest` attribute must
//! match the payload digest; without attributes the signature covers the
//! payload directly.

use cms::content_info::ContentInfo;
use cms::signed_data::{SignedAttributes, SignedData, SignerInfo};
use der::asn1::{ObjectIdentifier, OctetString};
use der::{Decode, Encode};
use ring::signature;
use tracing::{debug, warn};
use trustsync_core::RefreshOutcome;

use crate::decode::{self, DecodeAttempt};

const OID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");
const OID_MESSAGE_DIGEST: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");

const OID_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
const OID_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
const OID_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_SHA1_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const OID_SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const OID_SHA384_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const OID_SHA512_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
const OID_ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const OID_ECDSA_WITH_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// Try the signed-container format against raw bundle bytes.
///
/// Returns `NotThisFormat` when the bytes are not a CMS signed-data
/// structure with an embedded payload, `Rejected(UnmatchedSignature)` when a
/// configured signer authenticates nothing, `Rejected(InvalidFormat)` when
/// the authenticated payload is not a certificate container.
pub(crate) fn decode_signed(raw: &[u8], signer_der: Option<&[u8]>) -> DecodeAttempt {
    let Ok(content_info) = ContentInfo::from_der(raw) else {
        return DecodeAttempt::NotThisFormat;
    };
    if content_info.content_type != OID_SIGNED_DATA {
        return DecodeAttempt::NotThisFormat;
    }
    let Ok(signed) = content_info.content.decode_as::<SignedData>() else {
        return DecodeAttempt::NotThisFormat;
    };
    let Some(payload) = extract_payload(&signed) else {
        return DecodeAttempt::NotThisFormat;
    };

    if let Some(signer_der) = signer_der {
        match verify_any_signer(&signed, &payload, signer_der) {
            Ok(true) => debug!("signed bundle authenticated against configured signer"),
            Ok(false) => {
                warn!("no signer on bundle matched the configured signing certificate");
                return DecodeAttempt::Rejected(RefreshOutcome::UnmatchedSignature);
            }
            Err(e) => {
                warn!(error = %e, "signer certificate could not be used for verification");
                return DecodeAttempt::Rejected(RefreshOutcome::UnmatchedSignature);
            }
        }
    }

    match decode::decode_bare(&payload) {
        DecodeAttempt::Parsed(certs) => DecodeAttempt::Parsed(certs),
        // Authenticated (or unauthenticated-by-design) payload that is not a
        // certificate container cannot be applied.
        _ => DecodeAttempt::Rejected(RefreshOutcome::InvalidFormat),
    }
}

/// Pull the encapsulated content bytes out of the signed structure.
fn extract_payload(signed: &SignedData) -> Option<Vec<u8>> {
    let econtent = signed.encap_content_info.econtent.as_ref()?;
    let octets = econtent.decode_as::<OctetString>().ok()?;
    Some(octets.as_bytes().to_vec())
}

/// Check whether any `SignerInfo` verifies against the configured signer.
fn verify_any_signer(
    signed: &SignedData,
    payload: &[u8],
    signer_der: &[u8],
) -> trustsync_core::Result<bool> {
    let (_, signer_cert) = x509_parser::parse_x509_certificate(signer_der)
        .map_err(|e| trustsync_core::SyncError::CertParse(e.to_string()))?;
    let key_bytes = signer_cert.public_key().subject_public_key.data.as_ref();

    Ok(signed
        .signer_infos
        .0
        .iter()
        .any(|si| verify_signer_info(si, payload, key_bytes)))
}

/// Verify one signer against the signer certificate's public key.
fn verify_signer_info(si: &SignerInfo, payload: &[u8], key_bytes: &[u8]) -> bool {
    let Some(alg) = verification_alg(&si.digest_alg.oid, &si.signature_algorithm.oid) else {
        debug!(
            digest = %si.digest_alg.oid,
            signature = %si.signature_algorithm.oid,
            "unsupported signer algorithm pair"
        );
        return false;
    };

    // RFC 5652 5.4: with signed attributes, the attribute SET is signed and
    // must carry a message-digest matching the payload.
    let message: Vec<u8> = match &si.signed_attrs {
        Some(attrs) => {
            if !message_digest_matches(attrs, payload, &si.digest_alg.oid) {
                return false;
            }
            let Ok(encoded) = attrs.to_der() else {
                return false;
            };
            encoded
        }
        None => payload.to_vec(),
    };

    let key = signature::UnparsedPublicKey::new(alg, key_bytes);
    key.verify(&message, si.signature.as_bytes()).is_ok()
}

/// Compare the message-digest signed attribute against the payload digest.
fn message_digest_matches(
    attrs: &SignedAttributes,
    payload: &[u8],
    digest_oid: &ObjectIdentifier,
) -> bool {
    let Some(dig_alg) = digest_algorithm(digest_oid) else {
        return false;
    };
    let expected = ring::digest::digest(dig_alg, payload);

    attrs
        .iter()
        .find(|attr| attr.oid == OID_MESSAGE_DIGEST)
        .and_then(|attr| attr.values.iter().next())
        .and_then(|value| value.decode_as::<OctetString>().ok())
        .is_some_and(|md| md.as_bytes() == expected.as_ref())
}

/// Map a digest OID onto a `ring::digest` algorithm.
fn digest_algorithm(oid: &ObjectIdentifier) -> Option<&'static ring::digest::Algorithm> {
    if *oid == OID_SHA256 {
        Some(&ring::digest::SHA256)
    } else if *oid == OID_SHA384 {
        Some(&ring::digest::SHA384)
    } else if *oid == OID_SHA512 {
        Some(&ring::digest::SHA512)
    } else if *oid == OID_SHA1 {
        Some(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY)
    } else {
        None
    }
}

/// Map a (digest, signature) OID pair onto a ring verification algorithm.
///
/// Signed trust bundles in the wild are RSA PKCS#1 v1.5 or ECDSA; anything
/// else simply fails to verify.
fn verification_alg(
    digest: &ObjectIdentifier,
    sig: &ObjectIdentifier,
) -> Option<&'static dyn signature::VerificationAlgorithm> {
    if *sig == OID_ECDSA_WITH_SHA256 {
        Some(&signature::ECDSA_P256_SHA256_ASN1)
    } else if *sig == OID_ECDSA_WITH_SHA384 {
        Some(&signature::ECDSA_P384_SHA384_ASN1)
    } else if *sig == OID_SHA256_WITH_RSA {
        Some(&signature::RSA_PKCS1_2048_8192_SHA256)
    } else if *sig == OID_SHA384_WITH_RSA {
        Some(&signature::RSA_PKCS1_2048_8192_SHA384)
    } else if *sig == OID_SHA512_WITH_RSA {
        Some(&signature::RSA_PKCS1_2048_8192_SHA512)
    } else if *sig == OID_SHA1_WITH_RSA {
        Some(&signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY)
    } else if *sig == OID_RSA_ENCRYPTION {
        // Older producers put rsaEncryption here and let the digest OID
        // carry the hash choice.
        if *digest == OID_SHA256 {
            Some(&signature::RSA_PKCS1_2048_8192_SHA256)
        } else if *digest == OID_SHA384 {
            Some(&signature::RSA_PKCS1_2048_8192_SHA384)
        } else if *digest == OID_SHA512 {
            Some(&signature::RSA_PKCS1_2048_8192_SHA512)
        } else if *digest == OID_SHA1 {
            Some(&signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY)
        } else {
            None
        }
    } else {
        None
    }
}
