//! ECDSA verification of a COSE_Sign1 envelope against a resolved key.

use p256::ecdsa::signature::DigestVerifier;
use sha2::{Digest, Sha256, Sha384};
use tracing::debug;

use crate::eudcc::SignedEnvelope;
use crate::keys::{Curve, VerifyingKey};

/// Returns whether `envelope` carries a valid signature made by `key`.
pub fn verify(envelope: &SignedEnvelope, key: &VerifyingKey) -> bool {
    match check_signature(envelope, key) {
        Ok(()) => {
            debug!(key_id = %key.key_id, curve = %key.curve, "signature verified");
            true
        }
        Err(reason) => {
            debug!(key_id = %key.key_id, curve = %key.curve, %reason, "signature rejected");
            false
        }
    }
}

fn check_signature(envelope: &SignedEnvelope, key: &VerifyingKey) -> Result<(), String> {
    let alg = envelope
        .algorithm()
        .ok_or_else(|| "protected header has no algorithm".to_string())?;
    if alg != key.curve.cose_algorithm() {
        return Err(format!("alg {alg} does not match a {} key", key.curve));
    }

    let sig_structure = envelope.sig_structure().map_err(|e| e.to_string())?;
    let point = key.to_sec1_uncompressed();

    match key.curve {
        Curve::P256 => verify_es256(&point, &sig_structure, &envelope.signature),
        Curve::P384 => verify_es384(&point, &sig_structure, &envelope.signature),
    }
}

fn verify_es256(point: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), String> {
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| format!("bad P-256 public key: {e}"))?;
    // COSE carries ECDSA signatures as the raw `r || s` concatenation.
    let signature = p256::ecdsa::Signature::from_slice(sig)
        .map_err(|e| format!("bad ES256 signature: {e}"))?;
    vk.verify_digest(Sha256::new_with_prefix(msg), &signature)
        .map_err(|_| "signature verification failed".to_string())
}

fn verify_es384(point: &[u8], msg: &[u8], sig: &[u8]) -> Result<(), String> {
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| format!("bad P-384 public key: {e}"))?;
    let signature = p384::ecdsa::Signature::from_slice(sig)
        .map_err(|e| format!("bad ES384 signature: {e}"))?;
    vk.verify_digest(Sha384::new_with_prefix(msg), &signature)
        .map_err(|_| "signature verification failed".to_string())
}
