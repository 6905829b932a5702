//! JSON rendering of a [`Report`].

use chrono::{DateTime, SecondsFormat};
use serde_json::{json, Map, Value};

use crate::claims::Certificate;
use crate::labels::{self, Field, Values};
use crate::pipeline::Report;

/// Renders the report; `human` expands short claim codes into labels.
pub fn render_report(report: &Report, human: bool) -> Result<Value, serde_json::Error> {
    let claims = &report.claims;
    let issuer = claims
        .issuer
        .as_deref()
        .and_then(labels::country_name)
        .unwrap_or("unknown");

    let hcert = if human {
        render_certificate(&claims.hcert)?
    } else {
        serde_json::to_value(&claims.hcert)?
    };

    Ok(json!({
        "issuer": issuer,
        "expiry": claims.expiry.and_then(format_timestamp),
        "issued": claims.issued.and_then(format_timestamp),
        "verification": report.verification,
        "health_certificate": hcert,
    }))
}

/// Renames DCC fields and translates coded values through the static tables.
pub fn render_certificate(cert: &Certificate) -> Result<Value, serde_json::Error> {
    Ok(relabel(serde_json::to_value(cert)?, labels::CERTIFICATE_FIELDS))
}

pub fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn relabel(value: Value, fields: &'static [Field]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(code, value)| match labels::find_field(fields, &code) {
                    Some(field) => (field.label.to_string(), translate(value, field.values)),
                    None => (code, value),
                })
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

fn translate(value: Value, values: Values) -> Value {
    match (values, value) {
        (Values::Lookup(table), Value::String(code)) => match labels::lookup(table, &code) {
            Some(label) => Value::String(label.to_string()),
            None => Value::String(code),
        },
        (Values::Record(fields), Value::Array(items)) => {
            Value::Array(items.into_iter().map(|item| relabel(item, fields)).collect())
        }
        (Values::Record(fields), record @ Value::Object(_)) => relabel(record, fields),
        (_, value) => value,
    }
}
