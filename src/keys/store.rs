//! Trust store: an ordered list of key sources, first match wins.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, dispatcher, warn, Dispatch};

use super::convert::{from_key_record, from_pem_certificate, KeyRecord};
use super::{KeyId, VerifyingKey};
use crate::config::TrustStoreConfig;
use crate::error::{KeyError, ResolveError};

/// A place verifying keys can be looked up by key id.
///
/// Contract:
/// - `Ok(None)` when the source holds nothing for the key id.
/// - `Ok(Some(key))` when it built a key.
/// - `Err(..)` when it holds an entry for the key id that cannot be used.
pub trait KeySource: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_resolve(&self, key_id: &KeyId) -> Result<Option<VerifyingKey>, KeyError>;
}

/// Directory of `<hex key id>.pem` signer certificates.
#[derive(Debug, Clone)]
pub struct CertificateDirectory {
    dir: PathBuf,
}

impl CertificateDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key_id: &KeyId) -> PathBuf {
        self.dir.join(format!("{}.pem", key_id.to_hex()))
    }
}

impl KeySource for CertificateDirectory {
    fn name(&self) -> &'static str {
        "certificate-directory"
    }

    fn try_resolve(&self, key_id: &KeyId) -> Result<Option<VerifyingKey>, KeyError> {
        let path = self.path_for(key_id);
        let pem = match fs::read(&path) {
            Ok(pem) => pem,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no certificate file");
                return Ok(None);
            }
            Err(source) => return Err(KeyError::Io { path, source }),
        };

        debug!(path = %path.display(), "loading signer certificate");
        from_pem_certificate(&pem).map(Some)
    }
}

/// Bulk JSON key database, loaded once.
#[derive(Debug, Clone, Default)]
pub struct KeyDatabase {
    entries: Vec<(String, KeyRecord)>,
}

impl KeyDatabase {
    pub fn open(path: &Path) -> Result<Self, KeyError> {
        let json = fs::read_to_string(path).map_err(|source| KeyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, KeyError> {
        let entries: HashMap<String, KeyRecord> =
            serde_json::from_str(json).map_err(|e| KeyError::Database(e.to_string()))?;
        let mut entries: Vec<_> = entries.into_iter().collect();
        // Deterministic scan order.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeySource for KeyDatabase {
    fn name(&self) -> &'static str {
        "key-database"
    }

    fn try_resolve(&self, key_id: &KeyId) -> Result<Option<VerifyingKey>, KeyError> {
        for (encoded_kid, record) in &self.entries {
            let kid = match STANDARD.decode(encoded_kid) {
                Ok(kid) => kid,
                Err(e) => {
                    debug!(entry = %encoded_kid, error = %e, "skipping key database entry");
                    continue;
                }
            };
            if kid == key_id.as_bytes() {
                return from_key_record(record, KeyId::new(kid)).map(Some);
            }
        }
        Ok(None)
    }
}

/// Resolves key ids against its sources in order and caches the result.
pub struct KeyStore {
    sources: Vec<Box<dyn KeySource>>,
    cache: RwLock<HashMap<KeyId, VerifyingKey>>,
}

impl KeyStore {
    pub fn new(sources: Vec<Box<dyn KeySource>>) -> Self {
        Self {
            sources,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Certificate directory first, then the key database if it exists.
    /// Loading is logged to `log`.
    pub fn from_config(config: &TrustStoreConfig, log: &Dispatch) -> Result<Self, KeyError> {
        dispatcher::with_default(log, || Self::load(config))
    }

    fn load(config: &TrustStoreConfig) -> Result<Self, KeyError> {
        let mut sources: Vec<Box<dyn KeySource>> =
            vec![Box::new(CertificateDirectory::new(&config.cert_dir))];

        if config.key_db.exists() {
            let db = KeyDatabase::open(&config.key_db)?;
            debug!(path = %config.key_db.display(), entries = db.len(), "loaded key database");
            sources.push(Box::new(db));
        } else {
            warn!(path = %config.key_db.display(), "key database not found, skipping");
        }

        Ok(Self::new(sources))
    }

    pub fn resolve(&self, key_id: &KeyId) -> Result<VerifyingKey, ResolveError> {
        if let Some(key) = self.cached(key_id) {
            return Ok(key);
        }

        for source in &self.sources {
            let key = match source.try_resolve(key_id) {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(error) => {
                    return Err(ResolveError::Source {
                        source_name: source.name(),
                        error,
                    })
                }
            };

            if key.key_id != *key_id {
                return Err(ResolveError::ConsistencyFault {
                    requested: key_id.clone(),
                    resolved: key.key_id,
                });
            }

            debug!(%key_id, source = source.name(), curve = %key.curve, "resolved key");
            if let Ok(mut cache) = self.cache.write() {
                cache.insert(key_id.clone(), key.clone());
            }
            return Ok(key);
        }

        Err(ResolveError::NotFound(key_id.clone()))
    }

    fn cached(&self, key_id: &KeyId) -> Option<VerifyingKey> {
        self.cache.read().ok()?.get(key_id).cloned()
    }
}
