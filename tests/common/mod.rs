//! Helpers for building signed credentials and throwaway trust stores.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use p256::ecdsa::signature::Signer as _;
use p256::pkcs8::{DecodePrivateKey as _, EncodePublicKey as _};
use serde_cbor::Value;
use tracing::Dispatch;

use eudccverify::keys::convert::certificate_key_id;
use eudccverify::{KeyId, KeyStore, TrustStoreConfig};

pub const P256_CERT: &str = include_str!("../fixtures/p256_cert.pem");
pub const P256_KEY: &str = include_str!("../fixtures/p256_key.pem");
pub const P384_CERT: &str = include_str!("../fixtures/p384_cert.pem");
pub const P384_KEY: &str = include_str!("../fixtures/p384_key.pem");
pub const RSA_CERT: &str = include_str!("../fixtures/rsa_cert.pem");

/// Signer of test credentials.
pub enum TestSigner {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl TestSigner {
    pub fn p256_from_fixture() -> Self {
        TestSigner::P256(p256::ecdsa::SigningKey::from_pkcs8_pem(P256_KEY).unwrap())
    }

    pub fn p384_from_fixture() -> Self {
        TestSigner::P384(p384::ecdsa::SigningKey::from_pkcs8_pem(P384_KEY).unwrap())
    }

    /// A P-256 key that has no certificate in the fixtures.
    pub fn p256_unlisted() -> Self {
        TestSigner::P256(p256::ecdsa::SigningKey::from_slice(&[0x5a; 32]).unwrap())
    }

    fn alg(&self) -> i128 {
        match self {
            TestSigner::P256(_) => -7,
            TestSigner::P384(_) => -35,
        }
    }

    fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            TestSigner::P256(sk) => {
                let sig: p256::ecdsa::Signature = sk.sign(msg);
                sig.to_bytes().to_vec()
            }
            TestSigner::P384(sk) => {
                let sig: p384::ecdsa::Signature = sk.sign(msg);
                sig.to_bytes().to_vec()
            }
        }
    }

    /// Base64 DER SubjectPublicKeyInfo, as stored in the key database.
    pub fn spki_base64(&self) -> String {
        let der = match self {
            TestSigner::P256(sk) => sk.verifying_key().to_public_key_der().unwrap(),
            TestSigner::P384(sk) => sk.verifying_key().to_public_key_der().unwrap(),
        };
        STANDARD.encode(der.as_bytes())
    }
}

pub fn cert_key_id(pem: &str) -> KeyId {
    let (_, pem) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).unwrap();
    certificate_key_id(&pem.contents)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn map(entries: Vec<(Value, Value)>) -> Value {
    Value::Map(entries.into_iter().collect::<BTreeMap<_, _>>())
}

/// CWT claims carrying one vaccination record.
pub fn vaccination_claims() -> Vec<u8> {
    let vaccination = map(vec![
        (text("tg"), text("840539006")),
        (text("vp"), text("1119349007")),
        (text("mp"), text("EU/1/20/1507")),
        (text("ma"), text("ORG-100031184")),
        (text("dn"), Value::Integer(1)),
        (text("sd"), Value::Integer(2)),
        (text("dt"), text("2021-06-01")),
        (text("co"), text("AT")),
        (text("is"), text("Ministry of Health, Austria")),
        (text("ci"), text("URN:UVCI:01:AT:10807843F94AEE0EE5093FBC254BD813#B")),
    ]);
    let dcc = map(vec![
        (text("ver"), text("1.2.1")),
        (text("dob"), text("1998-02-26")),
        (
            text("nam"),
            map(vec![
                (text("fn"), text("Musterfrau-Gößinger")),
                (text("fnt"), text("MUSTERFRAU<GOESSINGER")),
                (text("gn"), text("Gabriele")),
                (text("gnt"), text("GABRIELE")),
            ]),
        ),
        (text("v"), Value::Array(vec![vaccination])),
    ]);
    let claims = map(vec![
        (Value::Integer(1), text("AT")),
        (Value::Integer(4), Value::Integer(1_656_633_600)),
        (Value::Integer(6), Value::Integer(1_622_505_600)),
        (Value::Integer(-260), map(vec![(Value::Integer(1), dcc)])),
    ]);
    serde_cbor::to_vec(&claims).unwrap()
}

/// Where the key id goes in the COSE headers.
#[derive(Default)]
pub struct KeyIds<'a> {
    pub protected: Option<&'a KeyId>,
    pub unprotected: Option<&'a KeyId>,
}

impl<'a> KeyIds<'a> {
    pub fn protected(kid: &'a KeyId) -> Self {
        Self {
            protected: Some(kid),
            unprotected: None,
        }
    }
}

/// Builds the COSE_Sign1 bytes for `payload`.
pub fn sign1(signer: &TestSigner, kids: &KeyIds<'_>, payload: &[u8]) -> Vec<u8> {
    let mut protected_header = vec![(Value::Integer(1), Value::Integer(signer.alg()))];
    if let Some(kid) = kids.protected {
        protected_header.push((Value::Integer(4), Value::Bytes(kid.as_bytes().to_vec())));
    }
    let protected = serde_cbor::to_vec(&map(protected_header)).unwrap();

    let mut unprotected = Vec::new();
    if let Some(kid) = kids.unprotected {
        unprotected.push((Value::Integer(4), Value::Bytes(kid.as_bytes().to_vec())));
    }

    let sig_structure = serde_cbor::to_vec(&Value::Array(vec![
        text("Signature1"),
        Value::Bytes(protected.clone()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]))
    .unwrap();
    let signature = signer.sign(&sig_structure);

    serde_cbor::to_vec(&Value::Array(vec![
        Value::Bytes(protected),
        map(unprotected),
        Value::Bytes(payload.to_vec()),
        Value::Bytes(signature),
    ]))
    .unwrap()
}

/// `HC1:` + base45(zlib(cose)).
pub fn wrap(cose: &[u8]) -> String {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(cose).unwrap();
    let compressed = encoder.finish().unwrap();
    format!("HC1:{}", base45::encode(compressed))
}

pub fn credential(signer: &TestSigner, kids: &KeyIds<'_>) -> String {
    wrap(&sign1(signer, kids, &vaccination_claims()))
}

/// Lays out a trust store under `root` and opens it.
pub fn trust_store(root: &Path, certs: &[(&KeyId, &str)], db: &[(&KeyId, &TestSigner)]) -> KeyStore {
    let config = TrustStoreConfig {
        cert_dir: root.join("certs"),
        key_db: root.join("keys.json"),
    };

    fs::create_dir_all(&config.cert_dir).unwrap();
    for (kid, pem) in certs {
        fs::write(config.cert_dir.join(format!("{kid}.pem")), pem).unwrap();
    }

    if !db.is_empty() {
        let entries: serde_json::Map<String, serde_json::Value> = db
            .iter()
            .map(|(kid, signer)| {
                (
                    STANDARD.encode(kid.as_bytes()),
                    serde_json::json!({
                        "publicKeyAlgorithm": { "name": "EC", "namedCurve": "P-256" },
                        "publicKeyPem": signer.spki_base64(),
                    }),
                )
            })
            .collect();
        fs::write(&config.key_db, serde_json::Value::Object(entries).to_string()).unwrap();
    }

    KeyStore::from_config(&config, &Dispatch::none()).unwrap()
}
