//! AWS signature v4 over the EC2 credential document the identity service
//! validates.
use std::collections::BTreeMap;
use std::time::SystemTime;

use aws_sigv4::sign::v4::{calculate_signature, generate_signing_key};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::Credentials;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "ec2";
const VERB: &str = "POST";
const PATH: &str = "/";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Serialize)]
pub(crate) struct Ec2TokenRequest<'creds> {
    pub(crate) credentials: SignedCredentials<'creds>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignedCredentials<'creds> {
    pub(crate) access: &'creds str,
    pub(crate) host: &'creds str,
    pub(crate) verb: &'static str,
    pub(crate) path: &'static str,
    pub(crate) params: BTreeMap<String, String>,
    pub(crate) headers: BTreeMap<&'static str, String>,
    pub(crate) body_hash: String,
    pub(crate) signature: String,
    pub(crate) token: String,
}

/// Random stand-in for the hash of the signed request body.
pub(crate) fn random_body_hash() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Signs the credential document for `now`.
///
/// No request headers are signed, so the canonical header block is a single
/// newline and `SignedHeaders` is empty.
pub(crate) fn sign<'creds>(
    credentials: &'creds Credentials,
    region: &str,
    now: DateTime<Utc>,
    body_hash: String,
) -> Ec2TokenRequest<'creds> {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let date = now.format(DATE_FORMAT).to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, region, SERVICE);
    let signed_headers = "";

    let string_to_sign = string_to_sign(&timestamp, &scope, signed_headers, &body_hash);
    let key = generate_signing_key(
        &credentials.secret,
        SystemTime::from(now),
        region,
        SERVICE,
    );
    let signature = calculate_signature(key, string_to_sign.as_bytes());

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access, scope, signed_headers, signature
    );

    let headers = BTreeMap::from([("Authorization", authorization), ("X-Amz-Date", timestamp)]);

    Ec2TokenRequest {
        credentials: SignedCredentials {
            access: &credentials.access,
            host: "",
            verb: VERB,
            path: PATH,
            params: BTreeMap::new(),
            headers,
            body_hash,
            signature,
            token: string_to_sign,
        },
    }
}

fn canonical_request(signed_headers: &str, body_hash: &str) -> String {
    // POST carries no canonical query string; the empty header block is "\n".
    [VERB, PATH, "", "\n", signed_headers, body_hash].join("\n")
}

fn string_to_sign(timestamp: &str, scope: &str, signed_headers: &str, body_hash: &str) -> String {
    let digest = Sha256::digest(canonical_request(signed_headers, body_hash).as_bytes());
    [ALGORITHM, timestamp, scope, &hex::encode(digest)].join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            access: "AKIDEXAMPLE".to_owned(),
            secret: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_owned(),
            auth_url: "http://identity.test/v3".to_owned(),
        }
    }

    #[test]
    fn signed_document_has_expected_shape() -> Result<(), String> {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 12, 30, 5)
            .single()
            .ok_or_else(|| "invalid timestamp".to_owned())?;
        let creds = credentials();
        let request = sign(&creds, "RegionOne", now, "ab".repeat(32));
        let value = serde_json::to_value(&request).map_err(|err| err.to_string())?;

        let doc = value
            .get("credentials")
            .ok_or_else(|| "missing credentials".to_owned())?;
        if doc.get("access").and_then(|v| v.as_str()) != Some("AKIDEXAMPLE") {
            return Err(format!("unexpected access: {}", doc));
        }
        let headers = doc
            .get("headers")
            .ok_or_else(|| "missing headers".to_owned())?;
        if headers.get("X-Amz-Date").and_then(|v| v.as_str()) != Some("20240309T123005Z") {
            return Err(format!("unexpected date header: {}", headers));
        }
        let authorization = headers
            .get("Authorization")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "missing authorization".to_owned())?;
        let expected_prefix =
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240309/RegionOne/ec2/aws4_request, SignedHeaders=, Signature=";
        if !authorization.starts_with(expected_prefix) {
            return Err(format!("unexpected authorization: {}", authorization));
        }
        let signature = request.credentials.signature.as_str();
        if signature.len() != 64 || !signature.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("signature should be hex sha256: {}", signature));
        }
        if !authorization.ends_with(signature) {
            return Err("authorization should carry the signature".to_owned());
        }
        if !request
            .credentials
            .token
            .starts_with("AWS4-HMAC-SHA256\n20240309T123005Z\n20240309/RegionOne/ec2/aws4_request\n")
        {
            return Err(format!("unexpected string to sign: {}", request.credentials.token));
        }
        Ok(())
    }

    #[test]
    fn signature_depends_on_secret_and_time() -> Result<(), String> {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 12, 30, 5)
            .single()
            .ok_or_else(|| "invalid timestamp".to_owned())?;
        let creds = credentials();
        let mut other = credentials();
        other.secret = "another-secret".to_owned();
        let hash = "cd".repeat(32);

        let first = sign(&creds, "RegionOne", now, hash.clone()).credentials.signature;
        let repeat = sign(&creds, "RegionOne", now, hash.clone()).credentials.signature;
        let rekeyed = sign(&other, "RegionOne", now, hash.clone()).credentials.signature;
        let later = sign(
            &creds,
            "RegionOne",
            now + chrono::Duration::seconds(1),
            hash,
        )
        .credentials
        .signature;

        if first != repeat {
            return Err("signing must be deterministic".to_owned());
        }
        if first == rekeyed || first == later {
            return Err("signature should change with secret and timestamp".to_owned());
        }
        Ok(())
    }

    #[test]
    fn body_hash_is_random_hex() -> Result<(), String> {
        let first = random_body_hash();
        let second = random_body_hash();
        if first.len() != 64 || first == second {
            return Err(format!("unexpected body hashes: {} {}", first, second));
        }
        Ok(())
    }
}
