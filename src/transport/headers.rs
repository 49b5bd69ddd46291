use std::collections::HashSet;

use http::HeaderMap;

use super::redact::MASK;

/// Headers whose values never appear in traffic logs unless the caller
/// replaces the set.
pub const DEFAULT_SENSITIVE_HEADERS: [&str; 11] = [
    "x-auth-token",
    "x-auth-key",
    "x-service-token",
    "x-storage-token",
    "x-account-meta-temp-url-key",
    "x-account-meta-temp-url-key-2",
    "x-container-meta-temp-url-key",
    "x-container-meta-temp-url-key-2",
    "set-cookie",
    "x-subject-token",
    "authorization",
];

/// Case-insensitive set of header names to mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveHeaders {
    names: HashSet<String>,
}

impl SensitiveHeaders {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }
}

impl Default for SensitiveHeaders {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_HEADERS)
    }
}

/// Renders one `Name: value` line per header, masking sensitive values.
/// Repeated headers are joined with a space. Lines come back sorted so logs
/// diff cleanly between runs.
#[must_use]
pub fn format_headers(headers: &HeaderMap, sensitive: &SensitiveHeaders) -> Vec<String> {
    let mut lines: Vec<String> = headers
        .keys()
        .map(|name| {
            if sensitive.contains(name.as_str()) {
                return format!("{}: {}", name, MASK);
            }
            let values: Vec<String> = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            format!("{}: {}", name, values.join(" "))
        })
        .collect();
    lines.sort();
    lines
}
