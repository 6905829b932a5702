use std::collections::BTreeMap;
use std::io::{self, Read};

use flate2::read::ZlibDecoder;
use serde_cbor::{from_slice, Value};
use tracing::warn;

use crate::claims::Claims;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::keys::KeyId;

pub const COSE_SIGN1_TAG: u64 = 18;
pub const SIG_STRUCTURE_CONTEXT_SIGNATURE1: &str = "Signature1";

/// Upper bound on the inflated COSE message. QR-sized inputs stay far below it.
pub const MAX_INFLATED_LEN: u64 = 1 << 20;

const HEADER_ALG: i128 = 1;
const HEADER_KID: i128 = 4;

pub type HeaderMap = BTreeMap<Value, Value>;

/// A parsed COSE_Sign1 message. Nothing in here has been verified.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedEnvelope {
    /// Protected header exactly as it was signed.
    pub protected: Vec<u8>,
    pub protected_header: HeaderMap,
    pub unprotected_header: HeaderMap,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignedEnvelope {
    /// The `alg` header, read from the protected header only.
    pub fn algorithm(&self) -> Option<i64> {
        match self.protected_header.get(&Value::Integer(HEADER_ALG)) {
            Some(Value::Integer(alg)) => i64::try_from(*alg).ok(),
            _ => None,
        }
    }

    pub fn protected_key_id(&self) -> Option<KeyId> {
        header_key_id(&self.protected_header)
    }

    pub fn unprotected_key_id(&self) -> Option<KeyId> {
        header_key_id(&self.unprotected_header)
    }

    /// The key id to resolve, see [`select_key_id`].
    pub fn key_id(&self) -> Option<KeyId> {
        select_key_id(self.protected_key_id(), self.unprotected_key_id())
    }

    /// The `Sig_structure` for a single signer:
    /// `["Signature1", protected, external_aad = h'', payload]`.
    pub fn sig_structure(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(&Value::Array(vec![
            Value::Text(SIG_STRUCTURE_CONTEXT_SIGNATURE1.to_string()),
            Value::Bytes(self.protected.clone()),
            Value::Bytes(Vec::new()),
            Value::Bytes(self.payload.clone()),
        ]))
    }
}

/// Protected header wins; a disagreeing unprotected key id only warns.
pub fn select_key_id(protected: Option<KeyId>, unprotected: Option<KeyId>) -> Option<KeyId> {
    match (protected, unprotected) {
        (Some(protected), Some(unprotected)) => {
            if protected != unprotected {
                warn!(
                    %protected,
                    %unprotected,
                    "protected and unprotected key ids differ, using the protected one"
                );
            }
            Some(protected)
        }
        (protected, unprotected) => protected.or(unprotected),
    }
}

fn header_key_id(header: &HeaderMap) -> Option<KeyId> {
    match header.get(&Value::Integer(HEADER_KID)) {
        Some(Value::Bytes(kid)) if !kid.is_empty() => Some(KeyId::new(kid.as_slice())),
        _ => None,
    }
}

/// A decoded credential: the envelope plus its claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub envelope: SignedEnvelope,
    pub claims: Claims,
}

/// Unwraps `<prefix><base45(zlib(COSE_Sign1))>`.
#[derive(Debug, Clone)]
pub struct PayloadDecoder {
    prefix: String,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl PayloadDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
        }
    }

    pub fn decode(&self, data: &str) -> Result<Credential, DecodeError> {
        let base45_data = data
            .trim_end()
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| DecodeError::Prefix(self.prefix.clone()))?;

        let base45_decoded =
            base45::decode(base45_data).map_err(|e| DecodeError::Base45(format!("{e:?}")))?;

        let mut zlibdecoder =
            ZlibDecoder::new(base45_decoded.as_slice()).take(MAX_INFLATED_LEN + 1);
        let mut cbor_data = Vec::new();
        zlibdecoder
            .read_to_end(&mut cbor_data)
            .map_err(DecodeError::Inflate)?;
        if cbor_data.len() as u64 > MAX_INFLATED_LEN {
            return Err(DecodeError::Inflate(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("inflated payload exceeds {MAX_INFLATED_LEN} bytes"),
            )));
        }

        let envelope = parse_envelope(&cbor_data)?;
        let claims = Claims::from_cbor(&envelope.payload)?;

        Ok(Credential { envelope, claims })
    }
}

/// Parses a COSE_Sign1 array, tagged (18) or untagged.
pub fn parse_envelope(cbor_data: &[u8]) -> Result<SignedEnvelope, DecodeError> {
    let value: Value = from_slice(cbor_data).map_err(|e| DecodeError::Envelope(e.to_string()))?;
    let value = match value {
        Value::Tag(COSE_SIGN1_TAG, inner) => *inner,
        Value::Tag(tag, _) => {
            return Err(DecodeError::Envelope(format!(
                "unexpected CBOR tag {tag} (expected COSE_Sign1 tag 18 or no tag)"
            )))
        }
        other => other,
    };

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(DecodeError::Envelope("top-level item is not an array".to_string())),
    };
    let [protected, unprotected, payload, signature]: [Value; 4] = items
        .try_into()
        .map_err(|_| DecodeError::Envelope("array length was not 4".to_string()))?;

    let protected = into_bytes(protected, "protected header")?;
    if protected.is_empty() {
        return Err(DecodeError::Envelope("protected header is empty".to_string()));
    }
    let protected_header = match from_slice(&protected) {
        Ok(Value::Map(map)) => map,
        Ok(_) => {
            return Err(DecodeError::Envelope(
                "protected header is not a map".to_string(),
            ))
        }
        Err(e) => {
            return Err(DecodeError::Envelope(format!(
                "failed to parse protected header: {e}"
            )))
        }
    };
    match protected_header.get(&Value::Integer(HEADER_ALG)) {
        Some(Value::Integer(alg)) if i64::try_from(*alg).is_ok() => {}
        Some(_) => {
            return Err(DecodeError::Envelope(
                "protected header algorithm is not an integer".to_string(),
            ))
        }
        None => {
            return Err(DecodeError::Envelope(
                "protected header has no algorithm".to_string(),
            ))
        }
    }

    let unprotected_header = match unprotected {
        Value::Map(map) => map,
        _ => {
            return Err(DecodeError::Envelope(
                "unprotected header is not a map".to_string(),
            ))
        }
    };

    Ok(SignedEnvelope {
        protected,
        protected_header,
        unprotected_header,
        payload: into_bytes(payload, "payload")?,
        signature: into_bytes(signature, "signature")?,
    })
}

fn into_bytes(value: Value, what: &str) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        _ => Err(DecodeError::Envelope(format!("{what} is not a byte string"))),
    }
}
