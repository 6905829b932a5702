//! Verifying keys and the trust store that resolves them.

use std::fmt;

use serde::{Serialize, Serializer};

pub mod asn1;
pub mod convert;
pub mod store;

pub use store::{CertificateDirectory, KeyDatabase, KeySource, KeyStore};

/// Opaque key identifier carried in a COSE header (label 4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(Vec<u8>);

impl KeyId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form, which is also the certificate file stem.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for KeyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Curve {
    P256,
    P384,
}

impl Curve {
    /// Width in bytes of one affine coordinate.
    pub fn byte_size(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
        }
    }

    /// COSE algorithm id of ECDSA with the curve-matched hash.
    pub fn cose_algorithm(self) -> i64 {
        match self {
            Curve::P256 => -7,
            Curve::P384 => -35,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::P256 => f.write_str("P-256"),
            Curve::P384 => f.write_str("P-384"),
        }
    }
}

/// An ECDSA public key with fixed-width big-endian coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    pub curve: Curve,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
    pub key_id: KeyId,
}

impl VerifyingKey {
    /// SEC1 uncompressed encoding, `0x04 || X || Y`.
    pub fn to_sec1_uncompressed(&self) -> Vec<u8> {
        let mut point = Vec::with_capacity(1 + self.x.len() + self.y.len());
        point.push(asn1::UNCOMPRESSED_POINT);
        point.extend_from_slice(&self.x);
        point.extend_from_slice(&self.y);
        point
    }
}
