//! Shared fixtures: generated certificates, CMS signed containers, and a
//! wired-up refresher over the in-memory store.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use cms::cert::IssuerAndSerialNumber;
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    EncapsulatedContentInfo, SignedData, SignerIdentifier, SignerInfo, SignerInfos,
};
use der::asn1::{ObjectIdentifier, OctetString, SetOfVec};
use der::{Any, Decode, Encode};
use tempfile::NamedTempFile;
use x509_cert::attr::Attribute;
use x509_cert::spki::AlgorithmIdentifierOwned;
use x509_cert::Certificate;

use trustsync_engine::config::TransportConfig;
use trustsync_engine::{BundleRefresher, BundleTransport, BundleVerifier, CacheUpdater, MemoryStore};

pub const OID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");
pub const OID_SIGNED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");
pub const OID_MESSAGE_DIGEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.4");
pub const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
pub const OID_ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// Generate a self-signed certificate, returning its DER.
pub fn cert_der(cn: &str) -> Vec<u8> {
    let key = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::new(Vec::new()).unwrap();
    params.distinguished_name.push(rcgen::DnType::CommonName, cn);
    params.self_signed(&key).unwrap().der().to_vec()
}

/// Concatenate DER certificates into a bare-container payload.
pub fn bare_payload(cns: &[&str]) -> Vec<u8> {
    let mut payload = Vec::new();
    for cn in cns {
        payload.extend_from_slice(&cert_der(cn));
    }
    payload
}

/// A bundle signer: certificate plus the P-256 key that can produce
/// signatures verifiable against it.
pub struct Signer {
    pub cert_der: Vec<u8>,
    pkcs8: Vec<u8>,
}

impl Signer {
    pub fn generate(cn: &str) -> Self {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        params.distinguished_name.push(rcgen::DnType::CommonName, cn);
        let cert = params.self_signed(&key).unwrap();
        Self {
            cert_der: cert.der().to_vec(),
            pkcs8: key.serialize_der(),
        }
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let rng = ring::rand::SystemRandom::new();
        let key = ring::signature::EcdsaKeyPair::from_pkcs8(
            &ring::signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &self.pkcs8,
            &rng,
        )
        .unwrap();
        key.sign(&rng, message).unwrap().as_ref().to_vec()
    }

    fn issuer_and_serial(&self) -> IssuerAndSerialNumber {
        let cert = Certificate::from_der(&self.cert_der).unwrap();
        IssuerAndSerialNumber {
            issuer: cert.tbs_certificate.issuer,
            serial_number: cert.tbs_certificate.serial_number,
        }
    }
}

/// Assemble a CMS signed-data container over `payload`, signed by `signer`.
///
/// `with_attrs` selects the RFC 5652 signed-attributes form (signature over
/// the attribute SET, message-digest attribute carrying the payload hash);
/// otherwise the signature covers the payload directly.
pub fn signed_container(payload: &[u8], signer: &Signer, with_attrs: bool) -> Vec<u8> {
    let digest_alg = AlgorithmIdentifierOwned {
        oid: OID_SHA256,
        parameters: None,
    };
    let sig_alg = AlgorithmIdentifierOwned {
        oid: OID_ECDSA_WITH_SHA256,
        parameters: None,
    };

    let (signed_attrs, message) = if with_attrs {
        let digest = ring::digest::digest(&ring::digest::SHA256, payload);
        let md_value = Any::encode_from(&OctetString::new(digest.as_ref().to_vec()).unwrap()).unwrap();
        let md_attr = Attribute {
            oid: OID_MESSAGE_DIGEST,
            values: SetOfVec::try_from(vec![md_value]).unwrap(),
        };
        let attrs = SetOfVec::try_from(vec![md_attr]).unwrap();
        let message = attrs.to_der().unwrap();
        (Some(attrs), message)
    } else {
        (None, payload.to_vec())
    };

    let signature = signer.sign(&message);

    let signer_info = SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(signer.issuer_and_serial()),
        digest_alg: digest_alg.clone(),
        signed_attrs,
        signature_algorithm: sig_alg,
        signature: OctetString::new(signature).unwrap(),
        unsigned_attrs: None,
    };

    let econtent = Any::encode_from(&OctetString::new(payload.to_vec()).unwrap()).unwrap();
    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms: SetOfVec::try_from(vec![digest_alg]).unwrap(),
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: OID_DATA,
            econtent: Some(econtent),
        },
        certificates: None,
        crls: None,
        signer_infos: SignerInfos(SetOfVec::try_from(vec![signer_info]).unwrap()),
    };

    let content_info = ContentInfo {
        content_type: OID_SIGNED_DATA,
        content: Any::encode_from(&signed_data).unwrap(),
    };
    content_info.to_der().unwrap()
}

/// Write bundle content to a temp file and return it with its `file://` URL.
pub fn bundle_file(content: &[u8]) -> (NamedTempFile, String) {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(content).unwrap();
    tmp.flush().unwrap();
    let url = format!("file://{}", tmp.path().display());
    (tmp, url)
}

/// Wire a refresher and coordinator over one shared in-memory store.
pub fn engine(store: &MemoryStore) -> (BundleRefresher, CacheUpdater) {
    let transport = BundleTransport::new(&TransportConfig::default()).unwrap();
    let refresher = BundleRefresher::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        transport,
        BundleVerifier::new(),
    );
    let updater = CacheUpdater::new(Arc::new(store.clone()), refresher.clone());
    (refresher, updater)
}
