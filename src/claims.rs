//! CWT claims of an EU Digital COVID Certificate.

use serde_cbor::value::from_value;
use serde_cbor::{from_slice, Value};
use serde_derive::{Deserialize, Serialize};

use crate::error::DecodeError;

const ISSUER_CLAIM_KEY: i128 = 1;
const EXPIRY_CLAIM_KEY: i128 = 4;
const ISSUED_AT_CLAIM_KEY: i128 = 6;
const HCERT_CLAIM_KEY: i128 = -260;
const DCC: i128 = 1;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Vaccine {
    pub tg: String,
    pub vp: String,
    pub mp: String,
    pub ma: String,
    pub dn: i32,
    pub sd: i32,
    pub dt: String,
    pub co: String,
    pub is: String,
    pub ci: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Test {
    pub tg: String,
    pub tt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ma: Option<String>,
    pub sc: String,
    pub tr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tc: Option<String>,
    pub co: String,
    pub is: String,
    pub ci: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Recovery {
    pub tg: String,
    pub fr: String,
    pub co: String,
    pub is: String,
    pub df: String,
    pub du: String,
    pub ci: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Name {
    #[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
    pub fn_: Option<String>,
    pub fnt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gnt: Option<String>,
}

/// The `eu_dgc_v1` health certificate.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Certificate {
    pub nam: Name,
    pub dob: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub v: Vec<Vaccine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub t: Vec<Test>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub r: Vec<Recovery>,
    pub ver: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// ISO 3166-1 alpha-2 code of the issuing country.
    pub issuer: Option<String>,
    /// Epoch seconds.
    pub expiry: Option<i64>,
    /// Epoch seconds.
    pub issued: Option<i64>,
    pub hcert: Certificate,
}

impl Claims {
    pub fn from_cbor(payload: &[u8]) -> Result<Self, DecodeError> {
        let payload: Value =
            from_slice(payload).map_err(|e| DecodeError::Claims(e.to_string()))?;
        let claims = match payload {
            Value::Map(m) => m,
            _ => return Err(DecodeError::Claims("payload is not a map".to_string())),
        };

        let eudccv1 = match claims.get(&Value::Integer(HCERT_CLAIM_KEY)) {
            Some(Value::Map(m)) => m.get(&Value::Integer(DCC)),
            _ => None,
        };
        let hcert: Certificate = match eudccv1 {
            Some(eudccv1) => {
                from_value(eudccv1.clone()).map_err(|e| DecodeError::Claims(e.to_string()))?
            }
            None => {
                return Err(DecodeError::Claims(
                    "no health certificate in payload".to_string(),
                ))
            }
        };

        let issuer = match claims.get(&Value::Integer(ISSUER_CLAIM_KEY)) {
            Some(Value::Text(iss)) => Some(iss.clone()),
            _ => None,
        };

        Ok(Claims {
            issuer,
            expiry: timestamp(claims.get(&Value::Integer(EXPIRY_CLAIM_KEY))),
            issued: timestamp(claims.get(&Value::Integer(ISSUED_AT_CLAIM_KEY))),
            hcert,
        })
    }
}

fn timestamp(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Integer(secs) => i64::try_from(*secs).ok(),
        Value::Float(secs) if secs.is_finite() => Some(secs.trunc() as i64),
        _ => None,
    }
}
