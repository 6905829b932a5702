//! Decode → Resolve → Verify → Emit.
//!
//! Only a decode failure or a key consistency fault ends a run early; every
//! other problem is logged and recorded in the emitted [`Verification`].
//!
//! A run logs to the [`Dispatch`] the pipeline was built with, never to the
//! process-wide default.

use serde_derive::Serialize;
use tracing::{dispatcher, warn, Dispatch};

use crate::claims::Claims;
use crate::error::{PipelineError, ResolveError};
use crate::eudcc::{Credential, PayloadDecoder};
use crate::keys::{KeyId, KeyStore, VerifyingKey};
use crate::verify::verify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationStatus {
    Verified,
    KeyNotFound,
    Unsigned,
    SignatureInvalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub status: VerificationStatus,
    pub key_id: Option<KeyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// What a successful run emits.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub claims: Claims,
    pub verification: Verification,
}

enum Stage<'t> {
    Decoding(&'t str),
    Resolving(Credential),
    Verifying(Credential, KeyId, VerifyingKey),
    Emitting(Credential, Verification),
}

pub struct Pipeline<'a> {
    decoder: &'a PayloadDecoder,
    store: &'a KeyStore,
    log: &'a Dispatch,
}

impl<'a> Pipeline<'a> {
    pub fn new(decoder: &'a PayloadDecoder, store: &'a KeyStore, log: &'a Dispatch) -> Self {
        Self {
            decoder,
            store,
            log,
        }
    }

    pub fn run(&self, text: &str) -> Result<Report, PipelineError> {
        dispatcher::with_default(self.log, || self.run_stages(text))
    }

    fn run_stages(&self, text: &str) -> Result<Report, PipelineError> {
        let mut stage = Stage::Decoding(text);
        loop {
            stage = match stage {
                Stage::Decoding(text) => Stage::Resolving(self.decoder.decode(text)?),
                Stage::Resolving(credential) => self.resolve(credential)?,
                Stage::Verifying(credential, key_id, key) => {
                    let verification = if verify(&credential.envelope, &key) {
                        Verification {
                            status: VerificationStatus::Verified,
                            key_id: Some(key_id),
                            detail: None,
                        }
                    } else {
                        warn!(%key_id, "signature is not valid");
                        Verification {
                            status: VerificationStatus::SignatureInvalid,
                            key_id: Some(key_id),
                            detail: None,
                        }
                    };
                    Stage::Emitting(credential, verification)
                }
                Stage::Emitting(credential, verification) => {
                    return Ok(Report {
                        claims: credential.claims,
                        verification,
                    })
                }
            };
        }
    }

    fn resolve<'t>(&self, credential: Credential) -> Result<Stage<'t>, PipelineError> {
        let Some(key_id) = credential.envelope.key_id() else {
            warn!("credential carries no key id, skipping signature verification");
            let verification = Verification {
                status: VerificationStatus::Unsigned,
                key_id: None,
                detail: None,
            };
            return Ok(Stage::Emitting(credential, verification));
        };

        match self.store.resolve(&key_id) {
            Ok(key) => Ok(Stage::Verifying(credential, key_id, key)),
            Err(ResolveError::ConsistencyFault {
                requested,
                resolved,
            }) => Err(PipelineError::KeyConsistency {
                requested,
                resolved,
            }),
            Err(e) => {
                warn!(%key_id, error = %e, "no usable key, skipping signature verification");
                let verification = Verification {
                    status: VerificationStatus::KeyNotFound,
                    key_id: Some(key_id),
                    detail: Some(e.to_string()),
                };
                Ok(Stage::Emitting(credential, verification))
            }
        }
    }
}
