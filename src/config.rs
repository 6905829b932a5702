use std::path::PathBuf;

/// Scheme prefix of EU Digital COVID Certificates.
pub const DEFAULT_PREFIX: &str = "HC1:";
pub const DEFAULT_CERT_DIR: &str = "certs";
pub const DEFAULT_KEY_DB: &str = "keys.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub prefix: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Locations of the two key sources making up the trust store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStoreConfig {
    /// Directory holding one `<hex key id>.pem` certificate per key.
    pub cert_dir: PathBuf,
    /// JSON key database mapping base64 key ids to public keys.
    pub key_db: PathBuf,
}

impl Default for TrustStoreConfig {
    fn default() -> Self {
        Self {
            cert_dir: PathBuf::from(DEFAULT_CERT_DIR),
            key_db: PathBuf::from(DEFAULT_KEY_DB),
        }
    }
}
