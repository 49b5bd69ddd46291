//! Pretty-printing of JSON bodies with known secrets masked.
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::FormatError;

/// Replacement for every masked header or JSON field.
pub const MASK: &str = "***";

/// Signature of the function used to render intercepted bodies.
pub type BodyFormatter = fn(&[u8]) -> Formatted;

/// Rendered body text. When `error` is set, `text` is the raw input decoded
/// lossily and `raw` holds the exact input bytes.
#[derive(Debug)]
pub struct Formatted {
    pub text: String,
    pub raw: Option<Bytes>,
    pub error: Option<FormatError>,
}

impl Formatted {
    const fn clean(text: String) -> Self {
        Self {
            text,
            raw: None,
            error: None,
        }
    }

    fn raw(raw: &[u8], error: FormatError) -> Self {
        Self {
            text: String::from_utf8_lossy(raw).into_owned(),
            raw: Some(Bytes::copy_from_slice(raw)),
            error: Some(error),
        }
    }
}

/// Fields masked in place when the value exists. Paths start at the
/// top-level object.
const MASKED_FIELDS: [&[&str]; 6] = [
    &["auth", "passwordCredentials", "password"],
    &["auth", "token", "id"],
    &["auth", "identity", "password", "user", "password"],
    &["auth", "identity", "application_credential", "secret"],
    &["auth", "identity", "token", "id"],
    &["credentials", "body_hash"],
];

/// Default body formatter.
///
/// Parses `raw` as JSON and pretty-prints it. Top-level objects get identity
/// credentials, EC2 access keys and service catalogs masked; any other JSON
/// value is printed unchanged.
#[must_use]
pub fn format_json(raw: &[u8]) -> Formatted {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(source) => return Formatted::raw(raw, FormatError::Parse { source }),
    };

    let value = match value {
        Value::Object(mut map) => {
            redact(&mut map);
            Value::Object(map)
        }
        other => other,
    };

    match serde_json::to_string_pretty(&value) {
        Ok(text) => Formatted::clean(text),
        Err(source) => Formatted::raw(raw, FormatError::Serialize { source }),
    }
}

fn redact(document: &mut Map<String, Value>) {
    for path in MASKED_FIELDS {
        if let Some((field, parents)) = path.split_last() {
            mask_field(object_at(document, parents), field);
        }
    }

    redact_ec2_access(document);

    // catalogs are not secret, just huge
    mask_field(object_at(document, &["token"]), "catalog");
}

/// Masks `credentials.access` and scrubs the same key from the signed
/// `Authorization` header carried next to it.
fn redact_ec2_access(document: &mut Map<String, Value>) {
    let Some(credentials) = object_at(document, &["credentials"]) else {
        return;
    };
    let Some(access) = credentials.get_mut("access") else {
        return;
    };
    let original = std::mem::replace(access, Value::String(MASK.to_owned()));

    let Some(access) = original.as_str().filter(|access| !access.is_empty()) else {
        return;
    };
    if let Some(Value::String(authorization)) = object_at(credentials, &["headers"])
        .and_then(|headers| headers.get_mut("Authorization"))
        && authorization.contains(access)
    {
        *authorization = authorization.replace(access, MASK);
    }
}

fn object_at<'doc>(
    map: &'doc mut Map<String, Value>,
    path: &[&str],
) -> Option<&'doc mut Map<String, Value>> {
    path.iter()
        .try_fold(map, |current, key| current.get_mut(*key)?.as_object_mut())
}

fn mask_field(map: Option<&mut Map<String, Value>>, field: &str) {
    if let Some(value) = map.and_then(|map| map.get_mut(field)) {
        *value = Value::String(MASK.to_owned());
    }
}
