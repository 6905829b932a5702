use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::keys::KeyId;

/// The layer of the credential that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Prefix,
    Base45,
    Inflate,
    Envelope,
    Claims,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeStage::Prefix => "prefix",
            DecodeStage::Base45 => "base45",
            DecodeStage::Inflate => "inflate",
            DecodeStage::Envelope => "envelope",
            DecodeStage::Claims => "claims",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("data must start with {0} prefix")]
    Prefix(String),

    #[error("invalid base45 data: {0}")]
    Base45(String),

    #[error("can't inflate payload: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("malformed COSE_Sign1 envelope: {0}")]
    Envelope(String),

    #[error("can't decode the EU Digital COVID Certificate claims: {0}")]
    Claims(String),
}

impl DecodeError {
    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::Prefix(_) => DecodeStage::Prefix,
            DecodeError::Base45(_) => DecodeStage::Base45,
            DecodeError::Inflate(_) => DecodeStage::Inflate,
            DecodeError::Envelope(_) => DecodeStage::Envelope,
            DecodeError::Claims(_) => DecodeStage::Claims,
        }
    }
}

/// Failure to turn certificate or key-database material into a verifying key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("invalid certificate: {0}")]
    Certificate(String),

    #[error("invalid key database: {0}")]
    Database(String),

    #[error("can't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no trusted key for key id {0}")]
    NotFound(KeyId),

    #[error("key source '{source_name}' failed: {error}")]
    Source {
        source_name: &'static str,
        error: KeyError,
    },

    #[error("trust store returned key {resolved} for requested key id {requested}")]
    ConsistencyFault { requested: KeyId, resolved: KeyId },
}

/// Errors that abort a pipeline run. Everything else degrades to a
/// verification status on the emitted report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("key consistency fault: requested {requested}, trust store returned {resolved}")]
    KeyConsistency { requested: KeyId, resolved: KeyId },
}
