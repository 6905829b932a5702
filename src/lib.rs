//! Decode and verify EU Digital COVID Certificates.
//!
//! A credential travels as `HC1:` + base45(zlib(COSE_Sign1(CWT claims))).
//! [`eudcc::PayloadDecoder`] unwraps it, [`keys::KeyStore`] finds the signer's
//! key in the local trust store, and [`verify::verify`] checks the ECDSA
//! signature. [`pipeline::Pipeline`] ties the steps together.

pub mod claims;
pub mod config;
pub mod error;
pub mod eudcc;
pub mod keys;
pub mod labels;
pub mod pipeline;
pub mod render;
pub mod verify;

pub use config::{DecoderConfig, TrustStoreConfig, DEFAULT_PREFIX};
pub use error::{DecodeError, DecodeStage, KeyError, PipelineError, ResolveError};
pub use eudcc::{Credential, PayloadDecoder, SignedEnvelope};
pub use keys::{Curve, KeyId, KeyStore, VerifyingKey};
pub use pipeline::{Pipeline, Report, Verification, VerificationStatus};
