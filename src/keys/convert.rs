//! Builds [`VerifyingKey`]s from X.509 certificates and key-database records.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_derive::Deserialize;
use sha2::{Digest, Sha256};
use x509_parser::certificate::X509Certificate;
use x509_parser::pem::parse_x509_pem;

use super::asn1::{extract_point, split_point};
use super::{Curve, KeyId, VerifyingKey};
use crate::error::KeyError;

const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_PRIME256V1: &str = "1.2.840.10045.3.1.7";
const OID_SECP384R1: &str = "1.3.132.0.34";

/// DCC key ids are the leading bytes of the signer certificate's SHA-256.
pub const CERTIFICATE_KEY_ID_LEN: usize = 8;

/// One entry of the bulk key database.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRecord {
    #[serde(rename = "publicKeyAlgorithm")]
    pub algorithm: PublicKeyAlgorithm,
    /// Base64 DER SubjectPublicKeyInfo (no PEM armour, despite the name).
    #[serde(rename = "publicKeyPem")]
    pub public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicKeyAlgorithm {
    pub name: String,
    #[serde(rename = "namedCurve", default)]
    pub named_curve: Option<String>,
}

pub fn certificate_key_id(der: &[u8]) -> KeyId {
    KeyId::new(&Sha256::digest(der)[..CERTIFICATE_KEY_ID_LEN])
}

/// Parses a PEM certificate and converts its public key.
pub fn from_pem_certificate(pem: &[u8]) -> Result<VerifyingKey, KeyError> {
    let (_, pem) = parse_x509_pem(pem)
        .map_err(|e| KeyError::Certificate(format!("bad PEM: {e}")))?;
    from_der_certificate(&pem.contents)
}

pub fn from_der_certificate(der: &[u8]) -> Result<VerifyingKey, KeyError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| KeyError::Certificate(e.to_string()))?;
    from_certificate(&cert, certificate_key_id(der))
}

/// Converts the certificate's EC public key.
///
/// The coordinates are cut straight out of the encoded point, so they keep
/// their full curve width.
pub fn from_certificate(
    cert: &X509Certificate<'_>,
    key_id: KeyId,
) -> Result<VerifyingKey, KeyError> {
    let spki = cert.public_key();

    let key_type = spki.algorithm.algorithm.to_id_string();
    if key_type != OID_EC_PUBLIC_KEY {
        return Err(KeyError::UnsupportedKeyType(key_type));
    }

    let curve_oid = spki
        .algorithm
        .parameters
        .as_ref()
        .and_then(|params| params.as_oid().ok())
        .map(|oid| oid.to_id_string())
        .ok_or_else(|| KeyError::UnsupportedCurve("missing named curve".to_string()))?;
    let curve = match curve_oid.as_str() {
        OID_PRIME256V1 => Curve::P256,
        OID_SECP384R1 => Curve::P384,
        _ => return Err(KeyError::UnsupportedCurve(curve_oid)),
    };

    let (x, y) = split_point(&spki.subject_public_key.data, curve.byte_size())?;
    Ok(VerifyingKey {
        curve,
        x,
        y,
        key_id,
    })
}

/// Converts a key-database record. Only EC keys on P-256 are accepted.
pub fn from_key_record(record: &KeyRecord, key_id: KeyId) -> Result<VerifyingKey, KeyError> {
    let curve_name = record.algorithm.named_curve.as_deref().unwrap_or("");
    if record.algorithm.name != "EC" || curve_name != "P-256" {
        return Err(KeyError::UnsupportedKeyType(format!(
            "{} {}",
            record.algorithm.name, curve_name
        )));
    }

    let der = STANDARD
        .decode(record.public_key.trim())
        .map_err(|e| KeyError::MalformedKey(format!("public key is not base64: {e}")))?;
    let curve = Curve::P256;
    let (x, y) = extract_point(&der, curve.byte_size())?;

    Ok(VerifyingKey {
        curve,
        x,
        y,
        key_id,
    })
}
